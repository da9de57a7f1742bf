//! In-memory torrent store for tests and ephemeral sessions

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{StorageError, TorrentStore};
use crate::metainfo::Torrent;

#[derive(Debug, Default)]
pub struct MemoryStore {
    torrents: RwLock<Vec<Torrent>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with `torrents`.
    pub fn with_torrents(torrents: Vec<Torrent>) -> Self {
        Self {
            torrents: RwLock::new(torrents),
        }
    }
}

#[async_trait]
impl TorrentStore for MemoryStore {
    async fn load(&self) -> Result<Vec<Torrent>, StorageError> {
        Ok(self.torrents.read().await.clone())
    }

    async fn save(&self, torrents: &[Torrent]) -> Result<(), StorageError> {
        *self.torrents.write().await = torrents.to_vec();
        Ok(())
    }
}
