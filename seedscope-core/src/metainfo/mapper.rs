//! Mapping from a decoded bencode tree onto the torrent domain model

use sha1::{Digest, Sha1};

use super::error::MetainfoError;
use super::types::{File, HASH_LEN, Info, InfoHash, PieceHash, Torrent};
use crate::bencode::{self, BencodeDict, BencodeValue};

type MapResult<T> = Result<T, MetainfoError>;

/// Validates metainfo fields and builds [`Torrent`] values.
///
/// Names and path segments are converted with `String::from_utf8_lossy`, so
/// a torrent with a non-UTF-8 name still loads. Tracker URLs that are not
/// valid UTF-8 cannot be probed and are skipped along with other malformed
/// optional tracker entries.
pub struct MetainfoMapper;

impl MetainfoMapper {
    /// Maps a decoded root value onto a [`Torrent`].
    ///
    /// The info hash is taken over the canonical re-encoding of the `info`
    /// dictionary since no raw buffer is available here.
    ///
    /// # Errors
    ///
    /// - `MetainfoError::InvalidField` - If a required field is missing or ill-typed
    pub fn to_torrent(root: &BencodeValue) -> MapResult<Torrent> {
        Self::map(root, None)
    }

    /// Maps a root value, hashing `raw_info` when the original bytes are known.
    pub(crate) fn map(root: &BencodeValue, raw_info: Option<&[u8]>) -> MapResult<Torrent> {
        let root_dict = root
            .as_dictionary()
            .ok_or_else(|| MetainfoError::invalid("root", "metainfo must be a dictionary"))?;

        let info_value = root_dict
            .get(b"info".as_slice())
            .ok_or_else(|| MetainfoError::invalid("info", "missing 'info' dictionary"))?;
        let info_dict = info_value
            .as_dictionary()
            .ok_or_else(|| MetainfoError::invalid("info", "must be a dictionary"))?;

        let info = Self::map_info(info_dict)?;

        let info_hash = match raw_info {
            Some(bytes) => Self::hash(bytes),
            None => Self::hash(&bencode::encode(info_value)),
        };

        Ok(Torrent {
            trackers: Self::extract_trackers(root_dict),
            info,
            info_hash,
        })
    }

    fn map_info(info: &BencodeDict) -> MapResult<Info> {
        let name = Self::required_string(info, "name", "info.name")?;

        let piece_length = Self::required_integer(info, "piece length", "info.piece length")?;
        if piece_length <= 0 {
            return Err(MetainfoError::invalid(
                "info.piece length",
                format!("must be positive, got {piece_length}"),
            ));
        }

        let pieces = Self::map_pieces(info)?;

        let length = match info.get(b"length".as_slice()) {
            Some(value) => Some(Self::non_negative(value, "info.length")?),
            None => None,
        };

        let files = match info.get(b"files".as_slice()) {
            Some(value) => Some(Self::map_files(value)?),
            None => None,
        };

        match (&length, &files) {
            (Some(_), Some(_)) => {
                return Err(MetainfoError::invalid(
                    "info",
                    "both 'length' and 'files' present",
                ));
            }
            (None, None) => {
                return Err(MetainfoError::invalid(
                    "info",
                    "neither 'length' nor 'files' present",
                ));
            }
            _ => {}
        }

        Ok(Info {
            name,
            piece_length: piece_length as u64,
            pieces,
            length,
            files,
        })
    }

    /// Splits the concatenated `pieces` byte-string into 20-byte hashes.
    fn map_pieces(info: &BencodeDict) -> MapResult<Vec<PieceHash>> {
        let bytes = match info.get(b"pieces".as_slice()) {
            Some(BencodeValue::ByteString(bytes)) => bytes,
            Some(other) => {
                return Err(MetainfoError::invalid(
                    "info.pieces",
                    format!("expected byte-string, found {}", other.type_name()),
                ));
            }
            None => return Err(MetainfoError::invalid("info.pieces", "missing")),
        };

        if !bytes.len().is_multiple_of(HASH_LEN) {
            return Err(MetainfoError::invalid(
                "info.pieces",
                format!("length {} is not a multiple of {HASH_LEN}", bytes.len()),
            ));
        }

        Ok(bytes
            .chunks_exact(HASH_LEN)
            .map(|chunk| {
                let mut hash = [0u8; HASH_LEN];
                hash.copy_from_slice(chunk);
                PieceHash::new(hash)
            })
            .collect())
    }

    fn map_files(value: &BencodeValue) -> MapResult<Vec<File>> {
        let entries = value.as_list().ok_or_else(|| {
            MetainfoError::invalid(
                "info.files",
                format!("expected list, found {}", value.type_name()),
            )
        })?;

        if entries.is_empty() {
            return Err(MetainfoError::invalid("info.files", "file list is empty"));
        }

        entries
            .iter()
            .enumerate()
            .map(|(index, entry)| Self::map_file(index, entry))
            .collect()
    }

    fn map_file(index: usize, entry: &BencodeValue) -> MapResult<File> {
        let field = format!("info.files[{index}]");
        let dict = entry
            .as_dictionary()
            .ok_or_else(|| MetainfoError::invalid(&field, "file entry must be a dictionary"))?;

        let length_field = format!("{field}.length");
        let length = dict
            .get(b"length".as_slice())
            .ok_or_else(|| MetainfoError::invalid(&length_field, "missing"))?;
        let length = Self::non_negative(length, &length_field)?;

        let path_field = format!("{field}.path");
        let segments = match dict.get(b"path".as_slice()) {
            Some(BencodeValue::List(segments)) => segments,
            Some(other) => {
                return Err(MetainfoError::invalid(
                    &path_field,
                    format!("expected list, found {}", other.type_name()),
                ));
            }
            None => return Err(MetainfoError::invalid(&path_field, "missing")),
        };

        if segments.is_empty() {
            return Err(MetainfoError::invalid(&path_field, "path has no segments"));
        }

        let mut parts = Vec::with_capacity(segments.len());
        for (position, segment) in segments.iter().enumerate() {
            let bytes = segment.as_bytes().ok_or_else(|| {
                MetainfoError::invalid(
                    format!("{path_field}[{position}]"),
                    format!("expected byte-string, found {}", segment.type_name()),
                )
            })?;
            parts.push(String::from_utf8_lossy(bytes).into_owned());
        }

        Ok(File {
            length,
            path: parts.join("/"),
        })
    }

    /// Collects `announce` followed by every `announce-list` entry.
    ///
    /// Malformed entries are skipped; they never fail the decode.
    fn extract_trackers(root: &BencodeDict) -> Vec<String> {
        let mut trackers = Vec::new();

        if let Some(url) = root.get(b"announce".as_slice()).and_then(Self::tracker_url) {
            trackers.push(url);
        }

        if let Some(BencodeValue::List(tiers)) = root.get(b"announce-list".as_slice()) {
            for tier in tiers {
                if let BencodeValue::List(urls) = tier {
                    trackers.extend(urls.iter().filter_map(Self::tracker_url));
                }
            }
        }

        trackers
    }

    fn tracker_url(value: &BencodeValue) -> Option<String> {
        let bytes = value.as_bytes()?;
        String::from_utf8(bytes.to_vec()).ok()
    }

    fn required_string(dict: &BencodeDict, key: &str, field: &str) -> MapResult<String> {
        match dict.get(key.as_bytes()) {
            Some(BencodeValue::ByteString(bytes)) => {
                Ok(String::from_utf8_lossy(bytes).into_owned())
            }
            Some(other) => Err(MetainfoError::invalid(
                field,
                format!("expected byte-string, found {}", other.type_name()),
            )),
            None => Err(MetainfoError::invalid(field, "missing")),
        }
    }

    fn required_integer(dict: &BencodeDict, key: &str, field: &str) -> MapResult<i64> {
        match dict.get(key.as_bytes()) {
            Some(BencodeValue::Integer(value)) => Ok(*value),
            Some(other) => Err(MetainfoError::invalid(
                field,
                format!("expected integer, found {}", other.type_name()),
            )),
            None => Err(MetainfoError::invalid(field, "missing")),
        }
    }

    fn non_negative(value: &BencodeValue, field: &str) -> MapResult<u64> {
        match value {
            BencodeValue::Integer(n) if *n >= 0 => Ok(*n as u64),
            BencodeValue::Integer(n) => Err(MetainfoError::invalid(
                field,
                format!("must not be negative, got {n}"),
            )),
            other => Err(MetainfoError::invalid(
                field,
                format!("expected integer, found {}", other.type_name()),
            )),
        }
    }

    fn hash(bytes: &[u8]) -> InfoHash {
        let digest = Sha1::digest(bytes);
        let mut hash = [0u8; HASH_LEN];
        hash.copy_from_slice(&digest);
        InfoHash::new(hash)
    }
}

/// Maps a decoded root value onto a [`Torrent`].
///
/// # Errors
///
/// - `MetainfoError::InvalidField` - If a required field is missing or ill-typed
pub fn to_torrent(root: &BencodeValue) -> Result<Torrent, MetainfoError> {
    MetainfoMapper::to_torrent(root)
}
