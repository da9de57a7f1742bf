//! Centralized configuration for Seedscope.
//!
//! All tunable parameters and settings are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::SeedscopeError;
use crate::bencode::DEFAULT_MAX_DEPTH;

/// Central configuration for all Seedscope components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct SeedscopeConfig {
    pub decoder: DecoderConfig,
    pub probe: ProbeConfig,
    pub storage: StorageConfig,
}

/// Metainfo decoding limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Maximum nesting of bencode lists and dictionaries
    pub max_depth: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Tracker probing configuration.
///
/// Controls per-tracker timeouts and the identity presented in announces.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Budget for a single tracker probe, including DNS and connect
    pub timeout: Duration,
    /// User agent for HTTP announces
    pub user_agent: &'static str,
    /// Azureus-style peer id prefix; the remainder is random
    pub client_id: &'static str,
    /// Port advertised in announce requests
    pub listen_port: u16,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: "seedscope/0.1.0",
            client_id: "-SS0100-",
            listen_port: 6881,
        }
    }
}

/// Location of the persisted torrent list.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// JSON file holding the saved torrents
    pub library_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            library_path: PathBuf::from("seedscope-library.json"),
        }
    }
}

impl SeedscopeConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Allows runtime configuration via environment variables while
    /// maintaining sensible defaults.
    ///
    /// # Errors
    /// - `SeedscopeError::Configuration` - If a numeric override does not parse
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Self::default();

        if let Some(seconds) = parse_env::<u64>("SEEDSCOPE_PROBE_TIMEOUT")? {
            config.probe.timeout = Duration::from_secs(seconds);
        }

        if let Some(max_depth) = parse_env::<usize>("SEEDSCOPE_MAX_DEPTH")? {
            config.decoder.max_depth = max_depth;
        }

        if let Ok(path) = std::env::var("SEEDSCOPE_LIBRARY") {
            config.storage.library_path = PathBuf::from(path);
        }

        Ok(config)
    }

    /// Creates a configuration optimized for testing.
    ///
    /// Short probe timeout so tests against unresponsive endpoints stay fast.
    pub fn for_testing() -> Self {
        Self {
            probe: ProbeConfig {
                timeout: Duration::from_millis(500),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

fn parse_env<T: FromStr>(name: &str) -> crate::Result<Option<T>> {
    let Ok(raw) = std::env::var(name) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|_| SeedscopeError::Configuration {
            reason: format!("{name} must be a non-negative integer, got '{raw}'"),
        })
}
