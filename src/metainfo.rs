//! Torrent metainfo handling ([BEP-3], [BEP-12]).
//!
//! A torrent file (`.torrent`) is a bencoded dictionary describing content
//! to be shared:
//! - File names, sizes and directory structure
//! - Piece hashes for data integrity verification
//! - Tracker URLs for peer discovery
//!
//! [`Torrent`] reads and writes such files, [`InfoHash`] identifies them and
//! [`TorrentBuilder`] creates new ones from in-memory data or readers.
//!
//! # Examples
//!
//! ## Reading a torrent file
//!
//! ```no_run
//! use btkit::metainfo::Torrent;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let torrent = Torrent::from_file("example.torrent", true)?;
//!
//! println!("Name: {}", torrent.name()?);
//! println!("Info hash: {}", torrent.info_hash()?);
//! println!("Total size: {} bytes", torrent.size()?);
//!
//! for path in torrent.file_list()? {
//!     println!("  {}", path);
//! }
//!
//! for tracker in torrent.trackers() {
//!     println!("Tracker: {}", tracker);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Working with info hashes
//!
//! ```
//! use btkit::metainfo::InfoHash;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let hash = InfoHash::from_hex("c12fe1c06bba254a9dc9f519b335aa7c1367a88a")?;
//! assert_eq!(hash.as_bytes().len(), 20);
//! assert_eq!(hash.url_encoded(), "%C1%2F%E1%C0k%BA%25J%9D%C9%F5%19%B35%AA%7C%13g%A8%8A");
//! # Ok(())
//! # }
//! ```
//!
//! # Torrent Structure
//!
//! - **info** - Core torrent metadata (hashed to create the info hash)
//!   - `name` - Suggested file/directory name
//!   - `piece length` - Size of each piece in bytes
//!   - `pieces` - Concatenated SHA1 hashes of each piece
//!   - `length` - Total size (single-file) OR `files` list (multi-file)
//!   - `private` - Set to 1 to disable DHT and peer exchange
//! - **announce** - Primary tracker URL
//! - **announce-list** - Additional tracker tiers (BEP-12)
//! - **creation date** - Unix timestamp when created
//! - **comment** - Optional comment
//! - **created by** - Client that created the torrent
//!
//! Keys outside this list are preserved in [`Torrent::extra`].
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html
//! [BEP-12]: http://bittorrent.org/beps/bep_0012.html

mod builder;
mod error;
mod info_hash;
mod torrent;

pub use builder::{PieceHasher, TorrentBuilder};
pub use error::MetainfoError;
pub use info_hash::InfoHash;
pub use torrent::Torrent;
