//! UDP tracker connect probe (BEP 15)

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use rand::Rng as _;
use tokio::net::{UdpSocket, lookup_host};
use tokio::time::{Instant, timeout_at};

use super::error::ProbeError;

const PROTOCOL_ID: u64 = 0x41727101980;
const ACTION_CONNECT: u32 = 0;
const ACTION_ERROR: u32 = 3;
const CONNECT_REQUEST_LEN: usize = 16;
const CONNECT_RESPONSE_LEN: usize = 16;

/// Resend interval for an unanswered connect request.
///
/// The overall probe budget is enforced by the caller.
pub(crate) const RETRANSMIT_INTERVAL: Duration = Duration::from_secs(3);

/// Sends a connect request and waits for a matching reply.
///
/// Only the connect handshake is performed; a tracker that answers it is
/// live regardless of whether it knows the torrent.
///
/// # Errors
///
/// - `ProbeError::Connection` - Resolution, socket, or ICMP-level failure
/// - `ProbeError::InvalidResponse` - Reply is short or does not match the request
pub(crate) async fn probe(host: &str, port: u16) -> Result<(), ProbeError> {
    let addr = lookup_host((host, port)).await?.next().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("no address found for {host}"),
        )
    })?;

    probe_addr(addr, RETRANSMIT_INTERVAL).await
}

pub(crate) async fn probe_addr(addr: SocketAddr, retransmit: Duration) -> Result<(), ProbeError> {
    let bind_addr = if addr.is_ipv4() {
        "0.0.0.0:0"
    } else {
        "[::]:0"
    };
    let socket = UdpSocket::bind(bind_addr).await?;
    socket.connect(addr).await?;

    let transaction_id: u32 = rand::rng().random();
    let request = connect_request(transaction_id);
    let mut buffer = [0u8; 512];

    tracing::debug!("Probing UDP tracker: {}", addr);

    loop {
        socket.send(&request).await?;
        let resend_at = Instant::now() + retransmit;

        // Datagrams for other transactions are dropped until the resend deadline.
        while let Ok(received) = timeout_at(resend_at, socket.recv(&mut buffer)).await {
            let reply = &buffer[..received?];
            if reply_transaction_id(reply) == Some(transaction_id) {
                return check_connect_response(reply, transaction_id);
            }
            tracing::trace!("Ignoring unrelated datagram from {}", addr);
        }

        tracing::trace!("No reply from {}, resending connect", addr);
    }
}

fn reply_transaction_id(reply: &[u8]) -> Option<u32> {
    let bytes = reply.get(4..8)?;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

pub(crate) fn connect_request(transaction_id: u32) -> [u8; CONNECT_REQUEST_LEN] {
    let mut request = [0u8; CONNECT_REQUEST_LEN];
    request[..8].copy_from_slice(&PROTOCOL_ID.to_be_bytes());
    request[8..12].copy_from_slice(&ACTION_CONNECT.to_be_bytes());
    request[12..].copy_from_slice(&transaction_id.to_be_bytes());
    request
}

/// Validates a connect reply against the request's transaction id.
///
/// An error action with a matching transaction id is still a live tracker.
pub(crate) fn check_connect_response(response: &[u8], transaction_id: u32) -> Result<(), ProbeError> {
    if response.len() < 8 {
        return Err(ProbeError::invalid_response(format!(
            "reply of {} bytes is too short",
            response.len()
        )));
    }

    let action = u32::from_be_bytes([response[0], response[1], response[2], response[3]]);
    let resp_tid = u32::from_be_bytes([response[4], response[5], response[6], response[7]]);

    if resp_tid != transaction_id {
        return Err(ProbeError::invalid_response("transaction id mismatch"));
    }

    match action {
        ACTION_CONNECT if response.len() >= CONNECT_RESPONSE_LEN => Ok(()),
        ACTION_CONNECT => Err(ProbeError::invalid_response("truncated connect reply")),
        ACTION_ERROR => {
            tracing::debug!(
                "UDP tracker answered with error: {}",
                String::from_utf8_lossy(&response[8..])
            );
            Ok(())
        }
        other => Err(ProbeError::invalid_response(format!(
            "unexpected action {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::timeout;

    use super::*;

    fn reply(action: u32, transaction_id: u32, tail: &[u8]) -> Vec<u8> {
        let mut response = Vec::new();
        response.extend_from_slice(&action.to_be_bytes());
        response.extend_from_slice(&transaction_id.to_be_bytes());
        response.extend_from_slice(tail);
        response
    }

    #[test]
    fn test_connect_request_layout() {
        let request = connect_request(0xdead_beef);
        assert_eq!(&request[..8], &[0x00, 0x00, 0x04, 0x17, 0x27, 0x10, 0x19, 0x80]);
        assert_eq!(&request[8..12], &[0, 0, 0, 0]);
        assert_eq!(&request[12..], &[0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_valid_connect_response() {
        let response = reply(ACTION_CONNECT, 42, &[9u8; 8]);
        assert!(check_connect_response(&response, 42).is_ok());
    }

    #[test]
    fn test_error_action_counts_as_live() {
        let response = reply(ACTION_ERROR, 7, b"go away");
        assert!(check_connect_response(&response, 7).is_ok());
    }

    #[test]
    fn test_rejects_mismatched_or_short_replies() {
        let response = reply(ACTION_CONNECT, 1, &[9u8; 8]);
        assert!(check_connect_response(&response, 2).is_err());

        let response = reply(ACTION_CONNECT, 1, &[9u8; 4]);
        assert!(check_connect_response(&response, 1).is_err());

        let response = reply(1, 1, &[9u8; 8]);
        assert!(check_connect_response(&response, 1).is_err());

        assert!(check_connect_response(&[0, 0, 0], 1).is_err());
    }

    #[tokio::test]
    async fn test_probe_addr_against_local_tracker() {
        let tracker = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = tracker.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let mut buffer = [0u8; 64];
            let (len, peer) = tracker.recv_from(&mut buffer).await.unwrap();
            assert_eq!(len, CONNECT_REQUEST_LEN);
            let mut response = buffer[8..16].to_vec();
            response.extend_from_slice(&0x1122_3344_5566_7788u64.to_be_bytes());
            tracker.send_to(&response, peer).await.unwrap();
        });

        let result = probe_addr(addr, Duration::from_secs(1)).await;
        server.await.unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_probe_addr_skips_unrelated_datagrams() {
        let tracker = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = tracker.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let mut buffer = [0u8; 64];
            let (_, peer) = tracker.recv_from(&mut buffer).await.unwrap();
            let transaction_id =
                u32::from_be_bytes([buffer[12], buffer[13], buffer[14], buffer[15]]);

            let stale = reply(ACTION_CONNECT, transaction_id ^ 1, &[0u8; 8]);
            tracker.send_to(&stale, peer).await.unwrap();
            tracker.send_to(&[0u8; 3], peer).await.unwrap();

            let valid = reply(ACTION_CONNECT, transaction_id, &[7u8; 8]);
            tracker.send_to(&valid, peer).await.unwrap();
        });

        let result = probe_addr(addr, Duration::from_secs(2)).await;
        server.await.unwrap();
        assert!(result.is_ok());
    }

    #[test]
    fn test_reply_transaction_id() {
        assert_eq!(reply_transaction_id(&reply(ACTION_CONNECT, 9, &[])), Some(9));
        assert_eq!(reply_transaction_id(&[0, 0, 0, 0, 1]), None);
    }

    #[tokio::test]
    async fn test_probe_addr_resends_after_silence() {
        let tracker = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = tracker.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let mut buffer = [0u8; 64];
            // Drop the first request, answer the resend.
            tracker.recv_from(&mut buffer).await.unwrap();
            let (_, peer) = tracker.recv_from(&mut buffer).await.unwrap();
            let mut response = buffer[8..16].to_vec();
            response.extend_from_slice(&[0u8; 8]);
            tracker.send_to(&response, peer).await.unwrap();
        });

        let result = timeout(
            Duration::from_secs(5),
            probe_addr(addr, Duration::from_millis(100)),
        )
        .await
        .unwrap();
        server.await.unwrap();
        assert!(result.is_ok());
    }
}
