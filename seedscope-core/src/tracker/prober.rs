//! Concurrent tracker liveness probing

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::timeout;

use super::announce::{AnnounceParams, PeerId, ProbeTarget};
use super::error::{ProbeAborted, ProbeError};
use super::status::TrackerStatus;
use super::transport::{NetworkTransport, TrackerTransport};
use crate::config::ProbeConfig;
use crate::metainfo::{InfoHash, Torrent};

/// Probes tracker lists concurrently.
///
/// Every tracker gets its own task and its own time budget. Results are
/// written into slots indexed by input position, so the returned vector is
/// always as long as the input and in input order.
pub struct TrackerProber<T = NetworkTransport> {
    transport: Arc<T>,
    config: ProbeConfig,
    peer_id: PeerId,
}

impl TrackerProber<NetworkTransport> {
    /// Creates a prober that talks to real trackers.
    pub fn new(config: ProbeConfig) -> Self {
        let transport = NetworkTransport::new(&config);
        Self::with_transport(config, transport)
    }
}

impl<T: TrackerTransport + 'static> TrackerProber<T> {
    pub fn with_transport(config: ProbeConfig, transport: T) -> Self {
        let peer_id = PeerId::generate(config.client_id);
        Self {
            transport: Arc::new(transport),
            config,
            peer_id,
        }
    }

    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Probes trackers without a torrent context.
    ///
    /// Announces carry the all-zero info hash. Never fails; each failure is
    /// recorded in that tracker's slot.
    pub async fn probe(&self, trackers: &[String]) -> Vec<TrackerStatus> {
        let params = AnnounceParams::anonymous(self.peer_id, self.config.listen_port);
        self.run(trackers, params).await
    }

    /// Probes trackers announcing a specific info hash.
    pub async fn probe_for(&self, trackers: &[String], info_hash: InfoHash) -> Vec<TrackerStatus> {
        let params = AnnounceParams {
            info_hash,
            peer_id: self.peer_id,
            port: self.config.listen_port,
        };
        self.run(trackers, params).await
    }

    /// Probes every tracker of a torrent with its real info hash.
    pub async fn probe_torrent(&self, torrent: &Torrent) -> Vec<TrackerStatus> {
        self.probe_for(&torrent.trackers, torrent.info_hash).await
    }

    /// Probes trackers unless `cancel` resolves first.
    ///
    /// On cancellation all in-flight probes are aborted and no statuses are
    /// returned.
    ///
    /// # Errors
    ///
    /// - `ProbeAborted` - If `cancel` completed before every probe settled
    pub async fn probe_until<F>(
        &self,
        trackers: &[String],
        cancel: F,
    ) -> Result<Vec<TrackerStatus>, ProbeAborted>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            statuses = self.probe(trackers) => Ok(statuses),
            () = cancel => {
                tracing::info!("Tracker probe of {} trackers cancelled", trackers.len());
                Err(ProbeAborted)
            }
        }
    }

    async fn run(&self, trackers: &[String], params: AnnounceParams) -> Vec<TrackerStatus> {
        if trackers.is_empty() {
            return Vec::new();
        }

        // Slots of tasks that die without reporting stay offline.
        let mut statuses = vec![TrackerStatus::Offline; trackers.len()];
        let mut probes = JoinSet::new();
        let budget = self.config.timeout;

        for (index, tracker) in trackers.iter().enumerate() {
            let transport = Arc::clone(&self.transport);
            let tracker = tracker.clone();
            probes.spawn(async move {
                let outcome = probe_one(transport.as_ref(), &tracker, &params, budget).await;
                (index, status_for(&tracker, outcome))
            });
        }

        while let Some(joined) = probes.join_next().await {
            match joined {
                Ok((index, status)) => statuses[index] = status,
                Err(e) => tracing::warn!("Tracker probe task failed: {}", e),
            }
        }

        let online = statuses.iter().filter(|status| status.is_up()).count();
        tracing::info!("Probed {} trackers: {} online", statuses.len(), online);

        statuses
    }
}

async fn probe_one<T: TrackerTransport + ?Sized>(
    transport: &T,
    tracker: &str,
    params: &AnnounceParams,
    budget: Duration,
) -> Result<(), ProbeError> {
    let target = ProbeTarget::parse(tracker)?;

    match timeout(budget, transport.check(&target, params)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(ProbeError::Timeout { budget }),
    }
}

fn status_for(tracker: &str, outcome: Result<(), ProbeError>) -> TrackerStatus {
    match outcome {
        Ok(()) => TrackerStatus::Online,
        Err(ProbeError::Timeout { budget }) => {
            tracing::debug!("Tracker {} timed out after {:?}", tracker, budget);
            TrackerStatus::TimedOut
        }
        Err(e) => {
            tracing::debug!("Tracker {} is offline: {}", tracker, e);
            TrackerStatus::Offline
        }
    }
}
