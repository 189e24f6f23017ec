use std::collections::BTreeMap;

use bytes::Bytes;
use thiserror::Error;

use crate::bencode::{encode, Value};

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("bencode error: {0}")]
    Bencode(#[from] crate::bencode::BencodeError),

    #[error("missing parameter \"{0}\"")]
    MissingParameter(&'static str),

    #[error("invalid parameter \"{0}\"")]
    InvalidParameter(&'static str),

    #[error("invalid info hash")]
    InvalidInfoHash,

    #[error("invalid peer id")]
    InvalidPeerId,

    #[error("invalid port: {0}")]
    InvalidPort(String),

    #[error("invalid event: {0}")]
    InvalidEvent(String),

    #[error("invalid ip: {0}")]
    InvalidIp(String),

    #[error("torrent not found on this tracker")]
    TorrentNotFound,

    #[error("peer is not known to this tracker")]
    UnknownPeer,

    #[error("tracker returned error: {0}")]
    Failure(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl TrackerError {
    /// Encodes the error as the body a tracker sends back to a client.
    ///
    /// The body is a dictionary with a single `failure reason` key.
    pub fn failure_response(&self) -> Vec<u8> {
        let reason = match self {
            TrackerError::Failure(reason) => reason.clone(),
            other => other.to_string(),
        };

        let mut dict = BTreeMap::new();
        dict.insert(Bytes::from_static(b"failure reason"), Value::from(reason));
        encode(&Value::Dict(dict))
    }
}
