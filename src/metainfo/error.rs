use thiserror::Error;

use crate::bencode::BencodeError;

/// Errors that can occur when reading, building or writing torrent files.
#[derive(Debug, Error)]
pub enum MetainfoError {
    /// The torrent file contains invalid bencode.
    #[error("bencode error: {0}")]
    Bencode(#[from] BencodeError),

    /// A required field is missing from the torrent.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A field has an invalid value or type.
    #[error("invalid field: {0}")]
    InvalidField(&'static str),

    /// An extra metadata key collides with a standard key.
    #[error("duplicate key in extra meta info: {0:?} already exists")]
    DuplicateKey(String),

    /// The info hash has an invalid length (must be 20 bytes).
    #[error("invalid info hash length")]
    InvalidInfoHashLength,

    /// An I/O error occurred while reading or writing a torrent.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
