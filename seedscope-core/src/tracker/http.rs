//! HTTP(S) announce probe

use reqwest::redirect::Policy;
use url::Url;

use super::announce::AnnounceParams;
use super::error::ProbeError;
use crate::bencode::{BencodeValue, Decoder};

/// Largest announce reply read before giving up on a tracker.
pub(crate) const MAX_REPLY_LEN: usize = 64 * 1024;

/// Sends one announce and checks the reply is a bencoded dictionary.
///
/// # Errors
///
/// - `ProbeError::Http` - Connection, TLS, or body read failure
/// - `ProbeError::HttpStatus` - Non-success status code
/// - `ProbeError::InvalidResponse` - Body is not a tracker reply or exceeds `MAX_REPLY_LEN`
pub(crate) async fn probe(
    announce: &Url,
    params: &AnnounceParams,
    user_agent: &str,
) -> Result<(), ProbeError> {
    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .redirect(Policy::limited(3))
        .no_proxy()
        .build()?;

    let request_url = build_announce_url(announce, params);
    tracing::debug!("Probing HTTP tracker: {}", announce);

    let mut response = client.get(&request_url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProbeError::HttpStatus {
            status: status.as_u16(),
        });
    }

    if let Some(length) = response.content_length() {
        check_reply_len(length)?;
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        check_reply_len((body.len() + chunk.len()) as u64)?;
        body.extend_from_slice(&chunk);
    }

    validate_announce_response(&body)
}

/// Appends announce query parameters to a tracker URL.
///
/// Existing query strings are preserved since some private trackers carry a
/// passkey there. Binary fields are percent-encoded byte by byte.
pub(crate) fn build_announce_url(announce: &Url, params: &AnnounceParams) -> String {
    let mut base = announce.clone();
    base.set_fragment(None);

    let query = format!(
        "info_hash={}&peer_id={}&port={}&uploaded=0&downloaded=0&left=0&compact=1&numwant=0",
        url_encode_bytes(params.info_hash.as_bytes()),
        url_encode_bytes(params.peer_id.as_bytes()),
        params.port,
    );

    let separator = if base.query().is_some() { '&' } else { '?' };
    format!("{base}{separator}{query}")
}

fn url_encode_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| format!("%{b:02X}")).collect()
}

fn check_reply_len(length: u64) -> Result<(), ProbeError> {
    if length > MAX_REPLY_LEN as u64 {
        return Err(ProbeError::invalid_response(format!(
            "reply of {length} bytes exceeds {MAX_REPLY_LEN}"
        )));
    }
    Ok(())
}

/// Accepts any bencoded dictionary as a live tracker reply.
///
/// A `failure reason` still proves a tracker is answering announces. Bytes
/// after the leading value, such as a trailing newline, are ignored.
pub(crate) fn validate_announce_response(body: &[u8]) -> Result<(), ProbeError> {
    let reply = Decoder::new(body)
        .decode_value()
        .map_err(|e| ProbeError::invalid_response(format!("body is not bencode: {e}")))?;

    match reply {
        BencodeValue::Dictionary(dict) => {
            if let Some(reason) = dict
                .get(b"failure reason".as_slice())
                .and_then(BencodeValue::as_bytes)
            {
                tracing::debug!(
                    "Tracker answered with failure: {}",
                    String::from_utf8_lossy(reason)
                );
            }
            Ok(())
        }
        other => Err(ProbeError::invalid_response(format!(
            "expected dictionary, found {}",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metainfo::InfoHash;
    use crate::tracker::announce::PeerId;

    fn params() -> AnnounceParams {
        let mut hash = [0u8; 20];
        hash[0] = 0xab;
        hash[19] = b'z';
        AnnounceParams {
            info_hash: InfoHash::new(hash),
            peer_id: PeerId::new(*b"-SS0100-abcdefghijkl"),
            port: 6881,
        }
    }

    #[test]
    fn test_build_announce_url() {
        let announce = Url::parse("http://tracker.example.com/announce").unwrap();
        let url = build_announce_url(&announce, &params());

        assert!(url.starts_with("http://tracker.example.com/announce?info_hash=%AB%00"));
        assert!(url.contains("%7A&peer_id=%2D%53%53"));
        assert!(url.contains("&port=6881&uploaded=0&downloaded=0&left=0&compact=1"));
    }

    #[test]
    fn test_build_announce_url_keeps_passkey() {
        let announce = Url::parse("https://tracker.example.com/announce?passkey=secret#frag").unwrap();
        let url = build_announce_url(&announce, &params());

        assert!(url.starts_with("https://tracker.example.com/announce?passkey=secret&info_hash="));
        assert!(!url.contains('#'));
    }

    #[test]
    fn test_check_reply_len() {
        assert!(check_reply_len(0).is_ok());
        assert!(check_reply_len(MAX_REPLY_LEN as u64).is_ok());
        assert!(matches!(
            check_reply_len(MAX_REPLY_LEN as u64 + 1),
            Err(ProbeError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_url_encode_bytes() {
        assert_eq!(url_encode_bytes(&[0x00, 0x7f, 0xff]), "%00%7F%FF");
        assert_eq!(url_encode_bytes(&[]), "");
    }

    #[test]
    fn test_validate_announce_response() {
        assert!(validate_announce_response(b"d8:intervali1800e5:peers0:e").is_ok());
        assert!(validate_announce_response(b"d14:failure reason17:torrent not founde").is_ok());
        assert!(validate_announce_response(b"d8:intervali1800e5:peers0:e\n").is_ok());
        assert!(validate_announce_response(b"d8:intervali1800e5:peers0:e\r\n\r\n").is_ok());

        assert!(matches!(
            validate_announce_response(b"<html>Not a tracker</html>"),
            Err(ProbeError::InvalidResponse { .. })
        ));
        assert!(matches!(
            validate_announce_response(b"l4:spame"),
            Err(ProbeError::InvalidResponse { .. })
        ));
        assert!(matches!(
            validate_announce_response(b""),
            Err(ProbeError::InvalidResponse { .. })
        ));
    }
}
