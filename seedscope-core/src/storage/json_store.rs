//! JSON file backed library

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{StorageError, TorrentStore};
use crate::config::StorageConfig;
use crate::metainfo::Torrent;

/// Library stored as a pretty-printed JSON array.
///
/// Writes go to a sibling temporary file first and are renamed into place,
/// so a crash mid-write leaves the previous list intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.library_path.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl TorrentStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<Torrent>, StorageError> {
        let contents = match tokio::fs::read(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No library at {}, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let torrents: Vec<Torrent> =
            serde_json::from_slice(&contents).map_err(|source| StorageError::Corrupt {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!(
            "Loaded {} torrents from {}",
            torrents.len(),
            self.path.display()
        );
        Ok(torrents)
    }

    async fn save(&self, torrents: &[Torrent]) -> Result<(), StorageError> {
        let encoded = serde_json::to_vec_pretty(torrents)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        tokio::fs::write(&staging, &encoded)
            .await
            .map_err(|e| self.io_error(e))?;
        if let Err(e) = tokio::fs::rename(&staging, &self.path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(self.io_error(e));
        }

        tracing::debug!(
            "Saved {} torrents to {}",
            torrents.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::metainfo::{HASH_LEN, Info, InfoHash, PieceHash};

    fn sample_torrent(name: &str, hash_byte: u8) -> Torrent {
        Torrent {
            trackers: vec!["http://tracker.example.com/announce".to_string()],
            info: Info {
                name: name.to_string(),
                piece_length: 262144,
                pieces: vec![PieceHash::new([hash_byte; HASH_LEN])],
                length: Some(1000),
                files: None,
            },
            info_hash: InfoHash::new([hash_byte; HASH_LEN]),
        }
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("library.json"));

        let torrents = store.load().await.unwrap();
        assert!(torrents.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_preserves_order() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("library.json"));
        let torrents = vec![sample_torrent("second", 2), sample_torrent("first", 1)];

        store.save(&torrents).await.unwrap();
        let loaded = store.load().await.unwrap();

        assert_eq!(loaded, torrents);
        assert!(!dir.path().join("nested").join("library.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_save_replaces_previous_list() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("library.json"));

        store
            .save(&[sample_torrent("a", 1), sample_torrent("b", 2)])
            .await
            .unwrap();
        store.save(&[sample_torrent("c", 3)]).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].info.name, "c");
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("library.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();

        let store = JsonFileStore::new(&path);
        let result = store.load().await;

        assert!(matches!(result, Err(StorageError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn test_failed_rename_removes_staging_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("library.json");
        // A non-empty directory in the way makes the final rename fail.
        tokio::fs::create_dir(&path).await.unwrap();
        tokio::fs::write(path.join("occupied"), b"x").await.unwrap();

        let store = JsonFileStore::new(&path);
        let result = store.save(&[sample_torrent("a", 1)]).await;

        assert!(matches!(result, Err(StorageError::Io { .. })));
        assert!(!dir.path().join("library.json.tmp").exists());
    }

    #[test]
    fn test_from_config_uses_library_path() {
        let config = StorageConfig {
            library_path: PathBuf::from("/var/lib/seedscope/library.json"),
        };
        let store = JsonFileStore::from_config(&config);
        assert_eq!(store.path(), Path::new("/var/lib/seedscope/library.json"));
    }
}
