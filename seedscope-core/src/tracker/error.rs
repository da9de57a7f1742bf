//! Probe failures for a single tracker

use std::time::Duration;

/// Why one tracker probe failed.
///
/// Never surfaces from a batch probe; the prober logs it and records the
/// tracker as down.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Invalid tracker URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unsupported tracker scheme '{scheme}'")]
    UnsupportedScheme { scheme: String },

    #[error("Tracker did not answer within {budget:?}")]
    Timeout { budget: Duration },

    #[error("Connection error: {0}")]
    Connection(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Tracker returned HTTP status {status}")]
    HttpStatus { status: u16 },

    #[error("Invalid tracker response: {reason}")]
    InvalidResponse { reason: String },
}

impl ProbeError {
    pub(crate) fn invalid_response(reason: impl Into<String>) -> Self {
        ProbeError::InvalidResponse {
            reason: reason.into(),
        }
    }
}

/// A batch probe was cancelled before every tracker settled.
///
/// No partial status vector is ever produced alongside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Tracker probe was cancelled")]
pub struct ProbeAborted;
