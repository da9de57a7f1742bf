//! Bencode serialization format.
//!
//! Decoder for untrusted `.torrent` buffers and a canonical encoder. The
//! decoder produces a generic [`BencodeValue`] tree that the metainfo mapper
//! consumes and then discards.

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod value;

pub use decoder::{DEFAULT_MAX_DEPTH, Decoder, decode, decode_with_max_depth};
pub use encoder::{encode, encode_into};
pub use error::BencodeError;
pub use value::{BencodeDict, BencodeValue, dict};
