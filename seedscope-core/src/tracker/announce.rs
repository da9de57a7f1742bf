//! Probe targets and announce parameters

use std::fmt;

use rand::Rng;
use url::{Host, Url};

use super::error::ProbeError;
use crate::metainfo::{HASH_LEN, InfoHash};

/// Length of a peer id in bytes.
pub const PEER_ID_LEN: usize = 20;

/// Identity this client presents to trackers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerId([u8; PEER_ID_LEN]);

impl PeerId {
    pub fn new(id: [u8; PEER_ID_LEN]) -> Self {
        Self(id)
    }

    pub fn as_bytes(&self) -> &[u8; PEER_ID_LEN] {
        &self.0
    }

    /// Generates a peer id from an Azureus-style client prefix.
    ///
    /// The prefix is truncated to the id length; the remaining bytes are
    /// random alphanumerics so the id stays printable in tracker logs.
    pub fn generate(client_id: &str) -> Self {
        const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

        let mut id = [0u8; PEER_ID_LEN];
        let prefix = client_id.as_bytes();
        let prefix_len = prefix.len().min(PEER_ID_LEN);
        id[..prefix_len].copy_from_slice(&prefix[..prefix_len]);

        let mut rng = rand::rng();
        for byte in &mut id[prefix_len..] {
            *byte = ALPHABET[rng.random_range(0..ALPHABET.len())];
        }
        Self(id)
    }
}

/// Announce fields shared by every probe in a batch.
///
/// A probe never downloads anything, so transfer counters are always zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnounceParams {
    pub info_hash: InfoHash,
    pub peer_id: PeerId,
    pub port: u16,
}

impl AnnounceParams {
    /// Parameters for probing a tracker list without a known torrent.
    ///
    /// Uses the all-zero info hash. Trackers that do not know the hash still
    /// answer with a failure reason, which counts as a live reply.
    pub fn anonymous(peer_id: PeerId, port: u16) -> Self {
        Self {
            info_hash: InfoHash::new([0u8; HASH_LEN]),
            peer_id,
            port,
        }
    }
}

/// Parsed tracker endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeTarget {
    /// `http` or `https` announce URL
    Http(Url),
    /// `udp://host:port` tracker
    Udp { host: String, port: u16 },
}

impl ProbeTarget {
    /// Parses a tracker string as found in metainfo.
    ///
    /// Tracker strings are untrusted and never normalized by the decoder,
    /// so surrounding whitespace is trimmed before parsing.
    ///
    /// # Errors
    ///
    /// - `ProbeError::InvalidUrl` - If the string is not a URL or has no host
    /// - `ProbeError::UnsupportedScheme` - If the scheme is neither HTTP(S) nor UDP
    pub fn parse(tracker: &str) -> Result<Self, ProbeError> {
        let url = Url::parse(tracker.trim()).map_err(|e| ProbeError::InvalidUrl {
            url: tracker.to_string(),
            reason: e.to_string(),
        })?;

        let host = match url.host() {
            Some(Host::Domain(domain)) if !domain.is_empty() => domain.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            _ => {
                return Err(ProbeError::InvalidUrl {
                    url: tracker.to_string(),
                    reason: "missing host".to_string(),
                });
            }
        };

        match url.scheme() {
            "http" | "https" => Ok(ProbeTarget::Http(url)),
            "udp" => {
                let port = url.port().ok_or_else(|| ProbeError::InvalidUrl {
                    url: tracker.to_string(),
                    reason: "udp tracker without port".to_string(),
                })?;
                Ok(ProbeTarget::Udp { host, port })
            }
            scheme => Err(ProbeError::UnsupportedScheme {
                scheme: scheme.to_string(),
            }),
        }
    }
}

impl fmt::Display for ProbeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeTarget::Http(url) => write!(f, "{url}"),
            ProbeTarget::Udp { host, port } if host.contains(':') => {
                write!(f, "udp://[{host}]:{port}")
            }
            ProbeTarget::Udp { host, port } => write!(f, "udp://{host}:{port}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peer_id_generation() {
        let peer_id = PeerId::generate("-SS0100-");
        assert_eq!(&peer_id.as_bytes()[..8], b"-SS0100-");
        assert!(peer_id.as_bytes()[8..].iter().all(u8::is_ascii_alphanumeric));

        let long = PeerId::generate("-THIS-PREFIX-IS-FAR-TOO-LONG-");
        assert_eq!(long.as_bytes(), b"-THIS-PREFIX-IS-FAR-");
    }

    #[test]
    fn test_parse_http_targets() {
        let target = ProbeTarget::parse("http://tracker.example.com:8080/announce").unwrap();
        match target {
            ProbeTarget::Http(url) => {
                assert_eq!(url.host_str(), Some("tracker.example.com"));
                assert_eq!(url.port(), Some(8080));
            }
            other => panic!("Expected HTTP target, got {other:?}"),
        }

        assert!(matches!(
            ProbeTarget::parse(" https://tracker.example.com/announce\n"),
            Ok(ProbeTarget::Http(_))
        ));
    }

    #[test]
    fn test_parse_udp_targets() {
        let target = ProbeTarget::parse("udp://tracker.example.org:1337/announce").unwrap();
        assert_eq!(
            target,
            ProbeTarget::Udp {
                host: "tracker.example.org".to_string(),
                port: 1337
            }
        );

        let target = ProbeTarget::parse("udp://[::1]:6969").unwrap();
        assert_eq!(
            target,
            ProbeTarget::Udp {
                host: "::1".to_string(),
                port: 6969
            }
        );
        assert_eq!(target.to_string(), "udp://[::1]:6969");
    }

    #[test]
    fn test_parse_rejects_malformed_trackers() {
        assert!(matches!(
            ProbeTarget::parse("not a url"),
            Err(ProbeError::InvalidUrl { .. })
        ));
        assert!(matches!(
            ProbeTarget::parse(""),
            Err(ProbeError::InvalidUrl { .. })
        ));
        assert!(matches!(
            ProbeTarget::parse("udp://tracker.example.org"),
            Err(ProbeError::InvalidUrl { .. })
        ));
        assert!(matches!(
            ProbeTarget::parse("wss://tracker.example.com"),
            Err(ProbeError::UnsupportedScheme { scheme }) if scheme == "wss"
        ));
        assert!(matches!(
            ProbeTarget::parse("dht://abcdef"),
            Err(ProbeError::UnsupportedScheme { .. })
        ));
    }

    #[test]
    fn test_anonymous_params_use_zero_hash() {
        let params = AnnounceParams::anonymous(PeerId::new([1u8; PEER_ID_LEN]), 6881);
        assert_eq!(params.info_hash.as_bytes(), &[0u8; HASH_LEN]);
        assert_eq!(params.port, 6881);
    }
}
