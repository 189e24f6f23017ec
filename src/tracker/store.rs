use std::collections::{BTreeMap, HashMap};

use super::peer::Peer;

/// Persistence for the torrents and peers a tracker knows about.
///
/// Torrents and peers are keyed by their raw 20-byte info hash and peer id.
/// Operations on an unregistered torrent or an unknown peer are no-ops.
pub trait PeerStore {
    fn torrent_exists(&self, info_hash: &[u8; 20]) -> bool;

    /// Registers a torrent. Returns `false` if it was already registered.
    fn add_torrent(&mut self, info_hash: [u8; 20]) -> bool;

    fn peer_exists(&self, info_hash: &[u8; 20], peer_id: &[u8; 20]) -> bool;

    /// Adds a peer to a torrent's swarm, replacing any peer with the same id.
    fn add_peer(&mut self, info_hash: &[u8; 20], peer: Peer);

    /// Refreshes the address and transfer counters of a known peer.
    fn update_peer(&mut self, info_hash: &[u8; 20], peer: Peer);

    fn delete_peer(&mut self, info_hash: &[u8; 20], peer_id: &[u8; 20]);

    /// Updates a known peer and marks it as a seed.
    fn complete_peer(&mut self, info_hash: &[u8; 20], peer: Peer);

    /// Returns up to `limit` peers of a torrent, leaving out `exclude`.
    fn peers(&self, info_hash: &[u8; 20], limit: usize, exclude: Option<&[u8; 20]>) -> Vec<Peer>;
}

/// An in-memory [`PeerStore`].
///
/// Peers of a torrent are kept ordered by peer id, so [`peers`](PeerStore::peers)
/// is deterministic.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    torrents: HashMap<[u8; 20], Swarm>,
}

#[derive(Debug, Default, Clone)]
struct Swarm {
    peers: BTreeMap<[u8; 20], Peer>,
    completed: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn torrent_count(&self) -> usize {
        self.torrents.len()
    }

    /// Number of peers currently in a torrent's swarm.
    pub fn peer_count(&self, info_hash: &[u8; 20]) -> usize {
        self.torrents.get(info_hash).map_or(0, |s| s.peers.len())
    }

    /// How many times peers reported completing a torrent.
    pub fn completed_count(&self, info_hash: &[u8; 20]) -> u64 {
        self.torrents.get(info_hash).map_or(0, |s| s.completed)
    }

    pub fn peer(&self, info_hash: &[u8; 20], peer_id: &[u8; 20]) -> Option<&Peer> {
        self.torrents.get(info_hash)?.peers.get(peer_id)
    }
}

impl PeerStore for MemoryStore {
    fn torrent_exists(&self, info_hash: &[u8; 20]) -> bool {
        self.torrents.contains_key(info_hash)
    }

    fn add_torrent(&mut self, info_hash: [u8; 20]) -> bool {
        if self.torrents.contains_key(&info_hash) {
            return false;
        }
        self.torrents.insert(info_hash, Swarm::default());
        true
    }

    fn peer_exists(&self, info_hash: &[u8; 20], peer_id: &[u8; 20]) -> bool {
        self.peer(info_hash, peer_id).is_some()
    }

    fn add_peer(&mut self, info_hash: &[u8; 20], peer: Peer) {
        if let Some(swarm) = self.torrents.get_mut(info_hash) {
            swarm.peers.insert(peer.id, peer);
        }
    }

    fn update_peer(&mut self, info_hash: &[u8; 20], peer: Peer) {
        if let Some(existing) = self
            .torrents
            .get_mut(info_hash)
            .and_then(|s| s.peers.get_mut(&peer.id))
        {
            *existing = peer;
        }
    }

    fn delete_peer(&mut self, info_hash: &[u8; 20], peer_id: &[u8; 20]) {
        if let Some(swarm) = self.torrents.get_mut(info_hash) {
            swarm.peers.remove(peer_id);
        }
    }

    fn complete_peer(&mut self, info_hash: &[u8; 20], mut peer: Peer) {
        let Some(swarm) = self.torrents.get_mut(info_hash) else {
            return;
        };
        if let Some(existing) = swarm.peers.get_mut(&peer.id) {
            peer.left = 0;
            *existing = peer;
            swarm.completed += 1;
        }
    }

    fn peers(&self, info_hash: &[u8; 20], limit: usize, exclude: Option<&[u8; 20]>) -> Vec<Peer> {
        let Some(swarm) = self.torrents.get(info_hash) else {
            return Vec::new();
        };

        swarm
            .peers
            .values()
            .filter(|p| Some(&p.id) != exclude)
            .take(limit)
            .cloned()
            .collect()
    }
}
