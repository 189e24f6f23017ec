//! Protocol constants and defaults.
//!
//! Defaults used by the decoder hardening options, the torrent builder and
//! the tracker live here so that the config structs share one source.

// ============================================================================
// Bencode
// ============================================================================

/// Maximum nesting depth accepted by the decoder before it gives up.
pub const MAX_DECODE_DEPTH: usize = 64;

/// Input size limit applied when decoding tracker responses (1 MiB).
pub const MAX_TRACKER_MESSAGE_LEN: usize = 1024 * 1024;

// ============================================================================
// Metainfo
// ============================================================================

/// Default piece length exponent (2^18 = 256 KiB).
pub const DEFAULT_PIECE_LENGTH_EXP: u32 = 18;

/// Largest accepted piece length exponent (2^30 = 1 GiB).
pub const MAX_PIECE_LENGTH_EXP: u32 = 30;

/// Size of a SHA1 piece hash in bytes.
pub const PIECE_HASH_LEN: usize = 20;

/// Value written to `created by` for torrents made by this crate.
pub const CREATED_BY: &str = concat!("btkit/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Tracker
// ============================================================================

/// Default re-announce interval handed to clients, in seconds.
pub const DEFAULT_ANNOUNCE_INTERVAL: u32 = 3600;

/// Default maximum number of peers returned per announce.
pub const DEFAULT_MAX_GIVE: usize = 200;

/// Size of one IPv4 peer in a compact peer list.
pub const COMPACT_PEER_LEN: usize = 6;
