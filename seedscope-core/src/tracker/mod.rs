//! Tracker liveness probing.
//!
//! Fans out one liveness check per tracker URL and folds the outcomes into a
//! status vector aligned with the input list. HTTP(S) trackers receive a
//! single announce; UDP trackers receive a BEP 15 connect request. Individual
//! failures never fail the batch.

pub mod announce;
pub mod error;
pub mod http;
pub mod prober;
pub mod status;
pub mod transport;
pub mod udp;

pub use announce::{AnnounceParams, PEER_ID_LEN, PeerId, ProbeTarget};
pub use error::{ProbeAborted, ProbeError};
pub use prober::TrackerProber;
pub use status::TrackerStatus;
pub use transport::{NetworkTransport, TrackerTransport};
