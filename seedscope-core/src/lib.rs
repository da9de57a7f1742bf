//! Seedscope Core - torrent metainfo inspection and tracker health checks
//!
//! This crate decodes BitTorrent `.torrent` files into validated torrents,
//! probes their trackers concurrently, and keeps a persisted list of
//! imported torrents. Front ends call into [`commands`].

pub mod bencode;
pub mod commands;
pub mod config;
pub mod metainfo;
pub mod storage;
pub mod tracing_setup;
pub mod tracker;

// Re-export main types for convenient access
pub use bencode::{BencodeError, BencodeValue};
pub use commands::{Commands, decode_metainfo, probe_trackers};
pub use config::SeedscopeConfig;
pub use metainfo::{File, Info, InfoHash, MetainfoError, Torrent};
pub use storage::{JsonFileStore, MemoryStore, StorageError, TorrentStore};
pub use tracker::{ProbeAborted, ProbeError, TrackerProber, TrackerStatus};

/// Errors that can bubble up from any Seedscope subsystem.
///
/// Per-tracker probe failures never appear here; they are folded into
/// [`TrackerStatus`] values.
#[derive(Debug, thiserror::Error)]
pub enum SeedscopeError {
    #[error("Metainfo error: {0}")]
    Metainfo(#[from] MetainfoError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Cancelled(#[from] ProbeAborted),

    #[error("Configuration error: {reason}")]
    Configuration { reason: String },
}

impl SeedscopeError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            SeedscopeError::Metainfo(e) => match e {
                MetainfoError::MalformedEncoding(_) => {
                    "Not a torrent file: the data is not valid bencode".to_string()
                }
                MetainfoError::InvalidField { field, reason } => {
                    format!("Invalid torrent file: '{field}' {reason}")
                }
            },
            SeedscopeError::Storage(_) => "Could not access the torrent library".to_string(),
            SeedscopeError::Cancelled(_) => "Tracker check was cancelled".to_string(),
            SeedscopeError::Configuration { reason } => format!("Configuration error: {reason}"),
        }
    }

    /// Checks if this error is due to user input validation.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            SeedscopeError::Configuration { .. } | SeedscopeError::Metainfo(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SeedscopeError>;
