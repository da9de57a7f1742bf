//! Validated torrent domain model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Length of a SHA-1 digest in bytes.
pub const HASH_LEN: usize = 20;

/// SHA-1 hash identifying a unique torrent.
///
/// 20-byte SHA-1 hash of the info dictionary from a torrent file.
/// Serialized as a 40-character lowercase hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InfoHash(#[serde(with = "hex::serde")] [u8; HASH_LEN]);

impl InfoHash {
    /// Creates InfoHash from 20-byte SHA-1 hash.
    pub fn new(hash: [u8; HASH_LEN]) -> Self {
        Self(hash)
    }

    /// Returns reference to underlying 20-byte hash.
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }
}

impl fmt::Display for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for InfoHash {
    type Err = hex::FromHexError;

    /// Parses a 40-character hex info hash, either case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut hash = [0u8; HASH_LEN];
        hex::decode_to_slice(s.trim(), &mut hash)?;
        Ok(Self(hash))
    }
}

/// Integrity hash of a single piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceHash(#[serde(with = "hex::serde")] [u8; HASH_LEN]);

impl PieceHash {
    pub fn new(hash: [u8; HASH_LEN]) -> Self {
        Self(hash)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }
}

impl fmt::Display for PieceHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Decoded and validated `.torrent` file.
///
/// Created once per successful decode. Tracker URLs keep the order they
/// appear in the source: primary `announce` first, then the flattened
/// `announce-list` tiers. Duplicates are preserved and the list may be empty
/// for trackerless torrents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Torrent {
    pub trackers: Vec<String>,
    pub info: Info,
    pub info_hash: InfoHash,
}

/// Contents of the `info` dictionary.
///
/// Exactly one of `length` (single-file) and `files` (multi-file) is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    /// Suggested save name
    pub name: String,
    /// Bytes per piece, always positive
    pub piece_length: u64,
    /// One hash per piece, in piece order
    pub pieces: Vec<PieceHash>,
    /// Size of the single file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
    /// File listing of a multi-file torrent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<File>>,
}

impl Info {
    /// Total payload size across all files.
    pub fn total_length(&self) -> u64 {
        match (&self.length, &self.files) {
            (Some(length), _) => *length,
            (None, Some(files)) => files.iter().map(|file| file.length).sum(),
            (None, None) => 0,
        }
    }

    pub fn is_multi_file(&self) -> bool {
        self.files.is_some()
    }

    /// Number of files the torrent describes.
    pub fn file_count(&self) -> usize {
        self.files.as_ref().map_or(1, Vec::len)
    }
}

/// Single entry of a multi-file torrent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub length: u64,
    /// Relative path, segments joined with `/`
    pub path: String,
}
