//! Network seam between the prober and tracker protocols

use async_trait::async_trait;

use super::announce::{AnnounceParams, ProbeTarget};
use super::error::ProbeError;
use super::{http, udp};
use crate::config::ProbeConfig;

/// Performs one liveness check against one tracker.
///
/// Implementations own no state shared between probes; every call builds
/// its own sockets or clients. The prober enforces the time budget.
#[async_trait]
pub trait TrackerTransport: Send + Sync {
    /// Checks whether the tracker answers with a valid reply.
    ///
    /// # Errors
    ///
    /// - `ProbeError::Connection` - Tracker unreachable or refused
    /// - `ProbeError::Http` / `ProbeError::HttpStatus` - HTTP-level failure
    /// - `ProbeError::InvalidResponse` - Reply is not a tracker reply
    async fn check(&self, target: &ProbeTarget, params: &AnnounceParams)
    -> Result<(), ProbeError>;
}

/// Real transport speaking HTTP announce and UDP connect.
#[derive(Debug, Clone)]
pub struct NetworkTransport {
    user_agent: &'static str,
}

impl NetworkTransport {
    pub fn new(config: &ProbeConfig) -> Self {
        Self {
            user_agent: config.user_agent,
        }
    }
}

impl Default for NetworkTransport {
    fn default() -> Self {
        Self::new(&ProbeConfig::default())
    }
}

#[async_trait]
impl TrackerTransport for NetworkTransport {
    async fn check(
        &self,
        target: &ProbeTarget,
        params: &AnnounceParams,
    ) -> Result<(), ProbeError> {
        match target {
            ProbeTarget::Http(url) => http::probe(url, params, self.user_agent).await,
            ProbeTarget::Udp { host, port } => udp::probe(host, *port).await,
        }
    }
}
