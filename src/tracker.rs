//! Tracker announce handling ([BEP-3], [BEP-23]).
//!
//! A tracker keeps, per torrent, the set of peers currently sharing it and
//! hands a subset of them to every client that announces. This module covers
//! everything between a decoded HTTP query string and the bencoded response
//! body; transport is left to the caller.
//!
//! - [`AnnounceRequest`] validates the query parameters
//! - [`PeerStore`] abstracts the swarm bookkeeping, with [`MemoryStore`] as
//!   the in-memory implementation
//! - [`Tracker`] applies the announce event and selects peers
//! - [`TrackerListener`] hooks into each step of an announce
//! - [`AnnounceResponse`] encodes the reply, as a peer list or compact string
//!
//! # Events
//!
//! | Event | Known peer | Unknown peer |
//! |-------|------------|--------------|
//! | `started` | replaced | added |
//! | `stopped` | removed | [`TrackerError::UnknownPeer`] |
//! | `completed` | marked as seed | [`TrackerError::UnknownPeer`] |
//! | none | updated | [`TrackerError::UnknownPeer`] |
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html
//! [BEP-23]: http://bittorrent.org/beps/bep_0023.html

mod error;
mod listener;
mod peer;
mod request;
mod response;
mod server;
mod store;

pub use error::TrackerError;
pub use listener::TrackerListener;
pub use peer::{Peer, PeerAddr};
pub use request::{AnnounceEvent, AnnounceRequest};
pub use response::{AnnounceResponse, DecodedAnnounce};
pub use server::{Tracker, TrackerConfig};
pub use store::{MemoryStore, PeerStore};
