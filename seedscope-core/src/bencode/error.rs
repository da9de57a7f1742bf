//! Malformed-encoding errors raised by the decoder

/// Bencode grammar violation or truncated buffer.
///
/// Every variant records the byte offset where decoding stopped. All of them
/// are fatal to the decode call that produced them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BencodeError {
    #[error("Unexpected byte 0x{byte:02x} at offset {position}")]
    UnexpectedByte { position: usize, byte: u8 },

    #[error("Unexpected end of input at offset {position}")]
    UnexpectedEnd { position: usize },

    #[error("Invalid integer at offset {position}: {reason}")]
    InvalidInteger {
        position: usize,
        reason: &'static str,
    },

    #[error("Invalid byte-string length at offset {position}: {reason}")]
    InvalidLength {
        position: usize,
        reason: &'static str,
    },

    #[error("Dictionary key at offset {position} is not a byte-string")]
    NonStringKey { position: usize },

    #[error("Nesting exceeds {max_depth} levels at offset {position}")]
    DepthExceeded { position: usize, max_depth: usize },

    #[error("{remaining} trailing bytes after top-level value at offset {position}")]
    TrailingData { position: usize, remaining: usize },
}

impl BencodeError {
    /// Byte offset where decoding failed.
    pub fn position(&self) -> usize {
        match self {
            BencodeError::UnexpectedByte { position, .. }
            | BencodeError::UnexpectedEnd { position }
            | BencodeError::InvalidInteger { position, .. }
            | BencodeError::InvalidLength { position, .. }
            | BencodeError::NonStringKey { position }
            | BencodeError::DepthExceeded { position, .. }
            | BencodeError::TrailingData { position, .. } => *position,
        }
    }
}
