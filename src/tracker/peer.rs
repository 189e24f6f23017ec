use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use super::request::AnnounceRequest;
use crate::constants::COMPACT_PEER_LEN;

/// A peer as tracked by the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    pub id: [u8; 20],
    pub ip: IpAddr,
    pub port: u16,
    pub uploaded: u64,
    pub downloaded: u64,
    /// Bytes the peer still needs; zero for a seed.
    pub left: u64,
}

impl Peer {
    pub fn new(id: [u8; 20], ip: IpAddr, port: u16) -> Self {
        Self {
            id,
            ip,
            port,
            uploaded: 0,
            downloaded: 0,
            left: 0,
        }
    }

    /// The peer described by an announce.
    pub fn from_request(request: &AnnounceRequest) -> Self {
        Self {
            id: request.peer_id,
            ip: request.ip,
            port: request.port,
            uploaded: request.uploaded,
            downloaded: request.downloaded,
            left: request.left,
        }
    }

    pub fn is_seed(&self) -> bool {
        self.left == 0
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }

    /// The 6-byte compact form: IPv4 address then port, both big-endian.
    ///
    /// Returns `None` for IPv6 peers, which have no compact IPv4 form.
    pub fn to_compact(&self) -> Option<[u8; COMPACT_PEER_LEN]> {
        let IpAddr::V4(ip) = self.ip else {
            return None;
        };

        let mut out = [0u8; COMPACT_PEER_LEN];
        out[..4].copy_from_slice(&ip.octets());
        out[4..].copy_from_slice(&self.port.to_be_bytes());
        Some(out)
    }
}

/// A peer address read back from an announce response.
///
/// The peer id is only present in non-compact responses that did not ask
/// for `no_peer_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerAddr {
    pub addr: SocketAddr,
    pub peer_id: Option<[u8; 20]>,
}

impl PeerAddr {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            peer_id: None,
        }
    }

    pub fn with_id(addr: SocketAddr, peer_id: [u8; 20]) -> Self {
        Self {
            addr,
            peer_id: Some(peer_id),
        }
    }

    /// Parses a peer from compact IPv4 format (6 bytes).
    pub fn from_compact_v4(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < COMPACT_PEER_LEN {
            return None;
        }
        let ip = Ipv4Addr::new(bytes[0], bytes[1], bytes[2], bytes[3]);
        let port = u16::from_be_bytes([bytes[4], bytes[5]]);
        Some(Self::new(SocketAddr::new(IpAddr::V4(ip), port)))
    }
}

pub(super) fn parse_compact_peers(data: &[u8]) -> Vec<PeerAddr> {
    data.chunks_exact(COMPACT_PEER_LEN)
        .filter_map(PeerAddr::from_compact_v4)
        .collect()
}
