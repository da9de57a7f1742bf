//! Front-end entry points.
//!
//! The free functions are the two operations a display layer needs: decode a
//! metainfo buffer and probe a tracker list. [`Commands`] carries
//! configuration and an injected transport, and adds library management on
//! top of a caller-provided [`TorrentStore`].

use std::future::Future;

use crate::config::{DecoderConfig, ProbeConfig, SeedscopeConfig};
use crate::metainfo::{self, InfoHash, MetainfoError, Torrent};
use crate::storage::{StorageError, TorrentStore};
use crate::tracker::{NetworkTransport, ProbeAborted, TrackerProber, TrackerStatus, TrackerTransport};

/// Decodes a `.torrent` buffer with default limits.
///
/// # Errors
///
/// - `MetainfoError::MalformedEncoding` - If the buffer is not valid bencode
/// - `MetainfoError::InvalidField` - If required metainfo fields are missing or ill-typed
pub fn decode_metainfo(buffer: &[u8]) -> Result<Torrent, MetainfoError> {
    metainfo::parse_metainfo(buffer, &DecoderConfig::default())
}

/// Probes trackers against the network with default settings.
///
/// Returns one status per input tracker, in input order. Never fails.
pub async fn probe_trackers(trackers: &[String]) -> Vec<TrackerStatus> {
    TrackerProber::new(ProbeConfig::default())
        .probe(trackers)
        .await
}

/// Configured command surface.
pub struct Commands<T = NetworkTransport> {
    config: SeedscopeConfig,
    prober: TrackerProber<T>,
}

impl Commands<NetworkTransport> {
    pub fn new(config: SeedscopeConfig) -> Self {
        let transport = NetworkTransport::new(&config.probe);
        Self::with_transport(config, transport)
    }
}

impl<T: TrackerTransport + 'static> Commands<T> {
    /// Creates commands probing through `transport`.
    pub fn with_transport(config: SeedscopeConfig, transport: T) -> Self {
        let prober = TrackerProber::with_transport(config.probe.clone(), transport);
        Self { config, prober }
    }

    pub fn config(&self) -> &SeedscopeConfig {
        &self.config
    }

    /// Decodes a `.torrent` buffer using the configured limits.
    ///
    /// # Errors
    ///
    /// - `MetainfoError::MalformedEncoding` - If the buffer is not valid bencode
    /// - `MetainfoError::InvalidField` - If required metainfo fields are missing or ill-typed
    pub fn decode_metainfo(&self, buffer: &[u8]) -> Result<Torrent, MetainfoError> {
        match metainfo::parse_metainfo(buffer, &self.config.decoder) {
            Ok(torrent) => {
                tracing::debug!(
                    "Decoded torrent '{}' ({}) with {} trackers",
                    torrent.info.name,
                    torrent.info_hash,
                    torrent.trackers.len()
                );
                Ok(torrent)
            }
            Err(e) => {
                tracing::warn!("Rejected metainfo of {} bytes: {}", buffer.len(), e);
                Err(e)
            }
        }
    }

    /// Probes trackers with the all-zero info hash.
    pub async fn probe_trackers(&self, trackers: &[String]) -> Vec<TrackerStatus> {
        tracing::info!("Probing {} trackers", trackers.len());
        self.prober.probe(trackers).await
    }

    /// Probes a torrent's trackers with its own info hash.
    pub async fn probe_torrent(&self, torrent: &Torrent) -> Vec<TrackerStatus> {
        tracing::info!(
            "Probing {} trackers for '{}'",
            torrent.trackers.len(),
            torrent.info.name
        );
        self.prober.probe_torrent(torrent).await
    }

    /// Probes trackers unless `cancel` resolves first.
    ///
    /// # Errors
    ///
    /// - `ProbeAborted` - If cancelled before every tracker settled
    pub async fn probe_trackers_until<F>(
        &self,
        trackers: &[String],
        cancel: F,
    ) -> Result<Vec<TrackerStatus>, ProbeAborted>
    where
        F: Future<Output = ()>,
    {
        self.prober.probe_until(trackers, cancel).await
    }

    /// Decodes a buffer and appends the torrent to the library.
    ///
    /// A torrent whose info hash is already saved is not added twice; the
    /// saved entry is returned instead.
    ///
    /// # Errors
    ///
    /// - `SeedscopeError::Metainfo` - If the buffer does not decode
    /// - `SeedscopeError::Storage` - If the library cannot be loaded or saved
    pub async fn import_torrent<S>(&self, buffer: &[u8], store: &S) -> crate::Result<Torrent>
    where
        S: TorrentStore + ?Sized,
    {
        let torrent = self.decode_metainfo(buffer)?;
        let mut torrents = store.load().await?;

        if let Some(existing) = torrents
            .iter()
            .find(|saved| saved.info_hash == torrent.info_hash)
        {
            tracing::info!("Torrent {} already in library", torrent.info_hash);
            return Ok(existing.clone());
        }

        torrents.push(torrent.clone());
        store.save(&torrents).await?;

        tracing::info!(
            "Added '{}' to library ({} torrents)",
            torrent.info.name,
            torrents.len()
        );
        Ok(torrent)
    }

    /// Lists saved torrents in insertion order.
    ///
    /// # Errors
    ///
    /// - `StorageError` - If the library cannot be loaded
    pub async fn library<S>(&self, store: &S) -> Result<Vec<Torrent>, StorageError>
    where
        S: TorrentStore + ?Sized,
    {
        store.load().await
    }

    /// Removes a torrent from the library.
    ///
    /// Returns `false` when no saved torrent has `info_hash`.
    ///
    /// # Errors
    ///
    /// - `StorageError` - If the library cannot be loaded or saved
    pub async fn remove_torrent<S>(&self, store: &S, info_hash: InfoHash) -> Result<bool, StorageError>
    where
        S: TorrentStore + ?Sized,
    {
        let mut torrents = store.load().await?;
        let before = torrents.len();
        torrents.retain(|torrent| torrent.info_hash != info_hash);

        if torrents.len() == before {
            return Ok(false);
        }

        store.save(&torrents).await?;
        tracing::info!("Removed torrent {} from library", info_hash);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::SeedscopeError;
    use crate::storage::MemoryStore;
    use crate::tracker::{AnnounceParams, ProbeError, ProbeTarget};

    const SINGLE_FILE: &[u8] = b"d8:announce28:http://tracker.example.com/a4:infod6:lengthi1024e4:name5:tests12:piece lengthi16384e6:pieces20:aaaaaaaaaaaaaaaaaaaaee";
    const OTHER_FILE: &[u8] = b"d4:infod6:lengthi2048e4:name5:other12:piece lengthi16384e6:pieces20:bbbbbbbbbbbbbbbbbbbbee";

    /// Transport where every HTTP tracker is up and every UDP tracker is down.
    struct HttpOnlyTransport;

    #[async_trait]
    impl TrackerTransport for HttpOnlyTransport {
        async fn check(
            &self,
            target: &ProbeTarget,
            _params: &AnnounceParams,
        ) -> Result<(), ProbeError> {
            match target {
                ProbeTarget::Http(_) => Ok(()),
                ProbeTarget::Udp { .. } => Err(ProbeError::invalid_response("scripted")),
            }
        }
    }

    fn commands() -> Commands<HttpOnlyTransport> {
        Commands::with_transport(SeedscopeConfig::for_testing(), HttpOnlyTransport)
    }

    #[test]
    fn test_decode_metainfo_free_function() {
        let torrent = decode_metainfo(SINGLE_FILE).unwrap();
        assert_eq!(torrent.info.name, "tests");
        assert_eq!(torrent.trackers, vec!["http://tracker.example.com/a"]);

        let error = decode_metainfo(b"d4:infoi1ee").unwrap_err();
        assert_eq!(error.field(), Some("info"));
    }

    #[tokio::test]
    async fn test_probe_trackers_empty_list() {
        let statuses = probe_trackers(&[]).await;
        assert!(statuses.is_empty());
    }

    #[tokio::test]
    async fn test_probe_trackers_through_transport() {
        let trackers = vec![
            "udp://tracker.example.org:1337".to_string(),
            "http://tracker.example.com/a".to_string(),
            "::garbage::".to_string(),
        ];

        let statuses = commands().probe_trackers(&trackers).await;

        assert_eq!(
            statuses,
            vec![
                TrackerStatus::Offline,
                TrackerStatus::Online,
                TrackerStatus::Offline,
            ]
        );
    }

    #[tokio::test]
    async fn test_import_appends_and_dedupes() {
        let commands = commands();
        let store = MemoryStore::new();

        let first = commands.import_torrent(SINGLE_FILE, &store).await.unwrap();
        let second = commands.import_torrent(OTHER_FILE, &store).await.unwrap();
        let again = commands.import_torrent(SINGLE_FILE, &store).await.unwrap();

        assert_eq!(again, first);
        let library = commands.library(&store).await.unwrap();
        assert_eq!(library, vec![first, second]);
    }

    #[tokio::test]
    async fn test_import_rejects_bad_buffer_without_saving() {
        let commands = commands();
        let store = MemoryStore::new();

        let error = commands
            .import_torrent(b"not bencode", &store)
            .await
            .unwrap_err();

        assert!(matches!(error, SeedscopeError::Metainfo(_)));
        assert!(error.is_user_error());
        assert!(commands.library(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_import_into_existing_library() {
        let commands = commands();
        let saved = decode_metainfo(OTHER_FILE).unwrap();
        let store = MemoryStore::with_torrents(vec![saved.clone()]);

        let again = commands.import_torrent(OTHER_FILE, &store).await.unwrap();
        assert_eq!(again.info_hash, saved.info_hash);

        let added = commands.import_torrent(SINGLE_FILE, &store).await.unwrap();
        let names: Vec<_> = commands
            .library(&store)
            .await
            .unwrap()
            .into_iter()
            .map(|torrent| torrent.info.name)
            .collect();

        assert_eq!(added.info.name, "tests");
        assert_eq!(names, vec!["other", "tests"]);
    }

    #[tokio::test]
    async fn test_remove_torrent() {
        let commands = commands();
        let store = MemoryStore::new();
        let torrent = commands.import_torrent(SINGLE_FILE, &store).await.unwrap();

        assert!(commands.remove_torrent(&store, torrent.info_hash).await.unwrap());
        assert!(!commands.remove_torrent(&store, torrent.info_hash).await.unwrap());
        assert!(commands.library(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_probe_torrent_uses_torrent_trackers() {
        let commands = commands();
        let torrent = commands.decode_metainfo(SINGLE_FILE).unwrap();

        let statuses = commands.probe_torrent(&torrent).await;
        assert_eq!(statuses, vec![TrackerStatus::Online]);
    }
}
