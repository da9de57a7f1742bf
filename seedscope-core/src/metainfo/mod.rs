//! BitTorrent metainfo decoding.
//!
//! Turns raw `.torrent` bytes into a validated [`Torrent`]: the buffer is
//! decoded into a bencode tree, then required fields are checked and mapped
//! onto the domain model. Decoding is pure and synchronous.

pub mod error;
pub mod mapper;
pub mod types;

pub use error::MetainfoError;
pub use mapper::{MetainfoMapper, to_torrent};
pub use types::{File, HASH_LEN, Info, InfoHash, PieceHash, Torrent};

use crate::bencode::{self, Decoder};
use crate::config::DecoderConfig;

/// Decodes and validates a complete metainfo buffer.
///
/// The info hash is computed over the exact bytes of the `info` dictionary as
/// they appear in `buffer`, so non-canonical encodings hash the same way other
/// clients hash them.
///
/// # Errors
///
/// - `MetainfoError::MalformedEncoding` - If the buffer is not valid bencode
/// - `MetainfoError::InvalidField` - If required metainfo fields are missing or ill-typed
pub fn parse_metainfo(buffer: &[u8], config: &DecoderConfig) -> Result<Torrent, MetainfoError> {
    let root = bencode::decode_with_max_depth(buffer, config.max_depth)?;
    let info_span = Decoder::new(buffer)
        .with_max_depth(config.max_depth)
        .dictionary_entry_span(b"info")?;

    MetainfoMapper::map(&root, info_span.map(|span| &buffer[span]))
}
