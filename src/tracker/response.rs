use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};

use bytes::{BufMut, Bytes, BytesMut};

use super::error::TrackerError;
use super::peer::{parse_compact_peers, Peer, PeerAddr};
use crate::bencode::{encode, Decoder, DecoderConfig, Value};
use crate::constants::{COMPACT_PEER_LEN, DEFAULT_ANNOUNCE_INTERVAL, MAX_TRACKER_MESSAGE_LEN};

/// The tracker's answer to an announce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnounceResponse {
    /// Seconds the client should wait before announcing again.
    pub interval: u32,
    pub peers: Vec<Peer>,
    /// Emit the peer list as a packed byte string.
    pub compact: bool,
    /// Leave `peer id` out of a non-compact peer list.
    pub no_peer_id: bool,
}

impl Default for AnnounceResponse {
    fn default() -> Self {
        Self::new(DEFAULT_ANNOUNCE_INTERVAL)
    }
}

impl AnnounceResponse {
    pub fn new(interval: u32) -> Self {
        Self {
            interval,
            peers: Vec::new(),
            compact: false,
            no_peer_id: false,
        }
    }

    /// Number of seeds among the peers.
    pub fn complete(&self) -> usize {
        self.peers.iter().filter(|p| p.is_seed()).count()
    }

    /// Number of leechers among the peers.
    pub fn incomplete(&self) -> usize {
        self.peers.len() - self.complete()
    }

    /// Encodes the response body.
    ///
    /// In compact mode IPv6 peers are left out of the peer string, but still
    /// counted in `complete` / `incomplete`.
    pub fn encode(&self) -> Vec<u8> {
        let peers = if self.compact {
            let mut buf = BytesMut::with_capacity(self.peers.len() * COMPACT_PEER_LEN);
            for peer in &self.peers {
                match peer.to_compact() {
                    Some(compact) => buf.put_slice(&compact),
                    None => tracing::warn!(addr = %peer.addr(), "skipping non-IPv4 peer in compact response"),
                }
            }
            Value::Bytes(buf.freeze())
        } else {
            Value::List(self.peers.iter().map(|p| self.peer_dict(p)).collect())
        };

        let mut dict = BTreeMap::new();
        dict.insert(Bytes::from_static(b"interval"), Value::Integer(self.interval.into()));
        dict.insert(Bytes::from_static(b"complete"), Value::Integer(self.complete() as i64));
        dict.insert(Bytes::from_static(b"incomplete"), Value::Integer(self.incomplete() as i64));
        dict.insert(Bytes::from_static(b"peers"), peers);
        encode(&Value::Dict(dict))
    }

    fn peer_dict(&self, peer: &Peer) -> Value {
        let mut dict = BTreeMap::new();
        dict.insert(Bytes::from_static(b"ip"), Value::from(peer.ip.to_string()));
        dict.insert(Bytes::from_static(b"port"), Value::Integer(peer.port.into()));
        if !self.no_peer_id {
            dict.insert(Bytes::from_static(b"peer id"), Value::bytes(peer.id.to_vec()));
        }
        Value::Dict(dict)
    }

    /// Parses a response body as sent by a tracker.
    ///
    /// Both the compact and the dictionary peer list are understood. A body
    /// carrying `failure reason` yields [`TrackerError::Failure`].
    pub fn decode(data: &[u8]) -> Result<DecodedAnnounce, TrackerError> {
        let decoder = Decoder::new(DecoderConfig {
            max_input_len: Some(MAX_TRACKER_MESSAGE_LEN),
            ..DecoderConfig::default()
        });
        let dict = decoder.decode_dictionary(data)?;

        if let Some(failure) = dict.get(b"failure reason".as_slice()) {
            let reason = failure
                .as_bytes()
                .map(|b| String::from_utf8_lossy(b).into_owned())
                .ok_or_else(|| TrackerError::InvalidResponse("failure reason is not a string".into()))?;
            return Err(TrackerError::Failure(reason));
        }

        let interval = dict
            .get(b"interval".as_slice())
            .and_then(|v| v.as_integer())
            .ok_or_else(|| TrackerError::InvalidResponse("missing interval".into()))?;
        let interval = u32::try_from(interval)
            .map_err(|_| TrackerError::InvalidResponse("interval out of range".into()))?;

        let mut response = DecodedAnnounce {
            interval,
            min_interval: get_u32(&dict, b"min interval"),
            complete: get_u32(&dict, b"complete"),
            incomplete: get_u32(&dict, b"incomplete"),
            warning_message: dict
                .get(b"warning message".as_slice())
                .and_then(|v| v.as_str())
                .map(String::from),
            peers: Vec::new(),
        };

        match dict.get(b"peers".as_slice()) {
            Some(Value::Bytes(bytes)) => {
                if bytes.len() % COMPACT_PEER_LEN != 0 {
                    return Err(TrackerError::InvalidResponse(format!(
                        "compact peer list length {} is not a multiple of {}",
                        bytes.len(),
                        COMPACT_PEER_LEN
                    )));
                }
                response.peers = parse_compact_peers(bytes);
            }
            Some(Value::List(list)) => {
                response.peers = list.iter().filter_map(peer_from_dict).collect();
            }
            Some(other) => {
                return Err(TrackerError::InvalidResponse(format!(
                    "peers is a {}",
                    other.kind()
                )))
            }
            None => {}
        }

        Ok(response)
    }
}

/// An announce response read back from its encoded form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAnnounce {
    pub interval: u32,
    pub min_interval: Option<u32>,
    pub complete: Option<u32>,
    pub incomplete: Option<u32>,
    pub warning_message: Option<String>,
    pub peers: Vec<PeerAddr>,
}

fn get_u32(dict: &BTreeMap<Bytes, Value>, key: &[u8]) -> Option<u32> {
    dict.get(key)
        .and_then(|v| v.as_integer())
        .and_then(|n| u32::try_from(n).ok())
}

fn peer_from_dict(value: &Value) -> Option<PeerAddr> {
    let ip: IpAddr = value.get(b"ip")?.as_str()?.parse().ok()?;
    let port = u16::try_from(value.get(b"port")?.as_integer()?).ok()?;
    let addr = SocketAddr::new(ip, port);

    let peer_id = value
        .get(b"peer id")
        .and_then(Value::as_bytes)
        .and_then(|id| <[u8; 20]>::try_from(&id[..]).ok());

    Some(match peer_id {
        Some(id) => PeerAddr::with_id(addr, id),
        None => PeerAddr::new(addr),
    })
}
