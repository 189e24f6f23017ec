//! btkit - Bencode, torrent files and announce handling
//!
//! This library covers the data side of BitTorrent as described by the BEPs
//! (BitTorrent Enhancement Proposals): the bencode serialization format,
//! `.torrent` metainfo files and the request/response cycle of a tracker.
//! It performs no network I/O.
//!
//! # Modules
//!
//! - [`bencode`] - BEP-3 Bencode encoding/decoding
//! - [`metainfo`] - BEP-3/12 Torrent metainfo, info hashes, torrent creation
//! - [`tracker`] - BEP-3/23 Announce validation, peer bookkeeping and responses
//! - [`constants`] - Protocol constants and defaults

pub mod bencode;
pub mod constants;
pub mod metainfo;
pub mod tracker;

pub use bencode::{decode, encode, BencodeError, Value};
pub use metainfo::{InfoHash, MetainfoError, PieceHasher, Torrent, TorrentBuilder};
pub use tracker::{
    AnnounceEvent, AnnounceRequest, AnnounceResponse, MemoryStore, Peer, PeerStore, Tracker,
    TrackerConfig, TrackerError, TrackerListener,
};
