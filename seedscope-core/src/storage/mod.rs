//! Persisted torrent list.
//!
//! The library is a flat list of decoded [`Torrent`] values kept under one
//! storage location. Stores only load and save the whole list; merge rules
//! live with the callers.

pub mod json_store;
pub mod memory;

use std::path::PathBuf;

use async_trait::async_trait;
pub use json_store::JsonFileStore;
pub use memory::MemoryStore;

use crate::metainfo::Torrent;

/// Storage backend for the torrent library.
#[async_trait]
pub trait TorrentStore: Send + Sync {
    /// Loads the saved list, in saved order.
    ///
    /// A store that was never written loads as an empty list.
    ///
    /// # Errors
    ///
    /// - `StorageError::Io` - If the backing file cannot be read
    /// - `StorageError::Corrupt` - If the stored data does not decode
    async fn load(&self) -> Result<Vec<Torrent>, StorageError>;

    /// Replaces the saved list.
    ///
    /// # Errors
    ///
    /// - `StorageError::Io` - If the backing file cannot be written
    /// - `StorageError::Serialization` - If the list cannot be encoded
    async fn save(&self, torrents: &[Torrent]) -> Result<(), StorageError>;
}

/// Errors that occur while loading or saving the library.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Backing file could not be read or written
    #[error("Library I/O error at {path}: {source}")]
    Io {
        /// Location of the library file
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored data is not a valid torrent list
    #[error("Library at {path} is corrupt: {source}")]
    Corrupt {
        /// Location of the library file
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode library: {0}")]
    Serialization(#[from] serde_json::Error),
}
