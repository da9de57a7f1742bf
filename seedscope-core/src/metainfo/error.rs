//! Invalid-metainfo errors

use crate::bencode::BencodeError;

/// Failure to turn a buffer into a [`Torrent`](super::Torrent).
///
/// Both the decode stage and the mapping stage report through this type, so a
/// caller sees one error surface with the originating cause kept as `source`.
/// No partial torrent is ever produced alongside it.
#[derive(Debug, thiserror::Error)]
pub enum MetainfoError {
    #[error("Malformed encoding: {0}")]
    MalformedEncoding(#[from] BencodeError),

    #[error("Invalid metainfo field '{field}': {reason}")]
    InvalidField { field: String, reason: String },
}

impl MetainfoError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        MetainfoError::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Dotted path of the offending field, e.g. `info.piece length`.
    ///
    /// `None` for encoding failures, which have a byte offset instead.
    pub fn field(&self) -> Option<&str> {
        match self {
            MetainfoError::InvalidField { field, .. } => Some(field),
            MetainfoError::MalformedEncoding(_) => None,
        }
    }

    /// Checks if the buffer was not valid bencode at all.
    pub fn is_malformed_encoding(&self) -> bool {
        matches!(self, MetainfoError::MalformedEncoding(_))
    }
}
