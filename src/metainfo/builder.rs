//! Torrent creation from in-memory data or arbitrary readers.
//!
//! [`TorrentBuilder`] assembles the info dictionary of a v1 torrent: it
//! streams every file through a [`PieceHasher`], which cuts the concatenated
//! content into fixed-size pieces and records the SHA1 of each. Pieces run
//! across file boundaries, so the last bytes of one file and the first bytes
//! of the next may share a piece.
//!
//! No directory walking happens here; callers hand in each file's relative
//! path together with its data.
//!
//! # Examples
//!
//! ```
//! use btkit::metainfo::TorrentBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let torrent = TorrentBuilder::new("album")
//!     .piece_length_exp(15)
//!     .add_file("cd1/track01.flac", b"first track")
//!     .add_file("cover.jpg", b"jpeg bytes")
//!     .announce("http://tracker.example.com/announce")
//!     .build()?;
//!
//! assert_eq!(torrent.file_list()?, vec!["cd1/track01.flac", "cover.jpg"]);
//! assert_eq!(torrent.size()?, 21);
//!
//! let bytes = torrent.to_bytes()?;
//! # let _ = bytes;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::io::{self, Read};
use std::path::{Component, Path};

use bytes::Bytes;
use sha1::{Digest, Sha1};

use super::error::MetainfoError;
use super::torrent::Torrent;
use crate::bencode::Value;
use crate::constants::{DEFAULT_PIECE_LENGTH_EXP, MAX_PIECE_LENGTH_EXP, PIECE_HASH_LEN};

const READ_CHUNK: usize = 64 * 1024;

/// Incremental SHA1 piece hashing.
///
/// Bytes are buffered until a full piece is available, then hashed. The
/// buffer carries over between calls, so feeding several sources in a row
/// hashes them as one continuous stream.
#[derive(Debug, Clone)]
pub struct PieceHasher {
    piece_length: usize,
    buf: Vec<u8>,
    pieces: Vec<u8>,
    total: u64,
}

impl PieceHasher {
    /// Creates a hasher for pieces of `piece_length` bytes (at least 1).
    pub fn new(piece_length: usize) -> Self {
        let piece_length = piece_length.max(1);
        Self {
            piece_length,
            buf: Vec::with_capacity(piece_length.min(READ_CHUNK)),
            pieces: Vec::new(),
            total: 0,
        }
    }

    pub fn piece_length(&self) -> usize {
        self.piece_length
    }

    /// Total number of bytes fed so far.
    pub fn total_len(&self) -> u64 {
        self.total
    }

    /// Number of complete pieces hashed so far.
    pub fn piece_count(&self) -> usize {
        self.pieces.len() / PIECE_HASH_LEN
    }

    pub fn update(&mut self, mut data: &[u8]) {
        self.total += data.len() as u64;

        while !data.is_empty() {
            let take = (self.piece_length - self.buf.len()).min(data.len());
            self.buf.extend_from_slice(&data[..take]);
            data = &data[take..];

            if self.buf.len() == self.piece_length {
                self.flush_piece();
            }
        }
    }

    /// Feeds everything `reader` yields, returning the number of bytes read.
    pub fn read_from<R: Read + ?Sized>(&mut self, reader: &mut R) -> io::Result<u64> {
        let mut chunk = vec![0u8; READ_CHUNK];
        let mut read = 0u64;

        loop {
            let n = match reader.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            self.update(&chunk[..n]);
            read += n as u64;
        }

        Ok(read)
    }

    /// Hashes the final partial piece, if any, and returns the concatenated
    /// 20-byte digests.
    pub fn finish(mut self) -> Vec<u8> {
        if !self.buf.is_empty() {
            self.flush_piece();
        }
        self.pieces
    }

    fn flush_piece(&mut self) {
        let digest = Sha1::digest(&self.buf);
        self.pieces.extend_from_slice(&digest);
        self.buf.clear();
        tracing::trace!(piece = self.piece_count() - 1, "hashed piece");
    }
}

struct BuilderFile<'a> {
    path: Vec<String>,
    reader: Box<dyn Read + 'a>,
}

/// Builder for v1 torrents.
///
/// A builder holding one file with a single path component produces a
/// single-file torrent named after the builder; anything else produces a
/// multi-file torrent whose files are listed in path order.
pub struct TorrentBuilder<'a> {
    name: String,
    piece_length_exp: u32,
    private: bool,
    files: Vec<BuilderFile<'a>>,
    announce: Option<String>,
    announce_list: Vec<Vec<String>>,
    comment: Option<String>,
}

impl<'a> TorrentBuilder<'a> {
    /// The name is the file name of a single-file torrent, or the root
    /// directory of a multi-file one.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            piece_length_exp: DEFAULT_PIECE_LENGTH_EXP,
            private: false,
            files: Vec::new(),
            announce: None,
            announce_list: Vec::new(),
            comment: None,
        }
    }

    /// Sets the piece length to `2^exp` bytes.
    pub fn piece_length_exp(mut self, exp: u32) -> Self {
        self.piece_length_exp = exp;
        self
    }

    pub fn private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    pub fn announce(mut self, url: impl Into<String>) -> Self {
        self.announce = Some(url.into());
        self
    }

    pub fn add_tracker_tier(mut self, urls: Vec<String>) -> Self {
        self.announce_list.push(urls);
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Adds a file backed by a byte slice.
    ///
    /// The path is relative to the torrent root.
    pub fn add_file(self, path: impl AsRef<Path>, data: &'a [u8]) -> Self {
        self.add_reader(path, data)
    }

    /// Adds a file whose content is read from `reader` when the torrent is
    /// built.
    pub fn add_reader<R: Read + 'a>(mut self, path: impl AsRef<Path>, reader: R) -> Self {
        // Root, prefix and `.` components are kept as markers so that
        // `validate()` rejects absolute and dot-relative paths.
        let path = path
            .as_ref()
            .components()
            .map(|c| match c {
                Component::Normal(s) => s.to_string_lossy().into_owned(),
                Component::CurDir => ".".to_string(),
                Component::ParentDir => "..".to_string(),
                Component::RootDir | Component::Prefix(_) => String::new(),
            })
            .collect();

        self.files.push(BuilderFile {
            path,
            reader: Box::new(reader),
        });
        self
    }

    /// Hashes the files and returns the info dictionary alone.
    pub fn build_info(mut self) -> Result<BTreeMap<Bytes, Value>, MetainfoError> {
        self.take_info()
    }

    /// Hashes the files and returns the complete torrent.
    pub fn build(mut self) -> Result<Torrent, MetainfoError> {
        let info = self.take_info()?;

        let mut torrent = Torrent::default().with_info(info);
        torrent.announce = self.announce.take();
        torrent.comment = self.comment.take();
        if !self.announce_list.is_empty() {
            torrent = torrent.with_announce_list(std::mem::take(&mut self.announce_list));
        }

        Ok(torrent)
    }

    fn validate(&self) -> Result<(), MetainfoError> {
        if self.name.is_empty() {
            return Err(MetainfoError::MissingField("name"));
        }

        if self.files.is_empty() {
            return Err(MetainfoError::MissingField("files"));
        }

        if self.piece_length_exp > MAX_PIECE_LENGTH_EXP {
            return Err(MetainfoError::InvalidField("piece length"));
        }

        for file in &self.files {
            if file.path.is_empty() {
                return Err(MetainfoError::InvalidField("empty file path"));
            }
            for component in &file.path {
                if component == "." || component == ".." || component.is_empty() {
                    return Err(MetainfoError::InvalidField("invalid path component"));
                }
            }
        }

        Ok(())
    }

    fn take_info(&mut self) -> Result<BTreeMap<Bytes, Value>, MetainfoError> {
        self.validate()?;

        let mut files = std::mem::take(&mut self.files);
        files.sort_by(|a, b| a.path.cmp(&b.path));
        if files.windows(2).any(|w| w[0].path == w[1].path) {
            return Err(MetainfoError::InvalidField("duplicate file path"));
        }

        let single_file = files.len() == 1 && files[0].path.len() == 1;
        let mut hasher = PieceHasher::new(1usize << self.piece_length_exp);
        let mut entries = Vec::with_capacity(files.len());

        for mut file in files {
            let length = hasher.read_from(&mut file.reader)?;
            tracing::trace!(path = %file.path.join("/"), length, "hashed file");
            entries.push((file.path, length));
        }

        let total = hasher.total_len();
        let mut info = BTreeMap::new();
        info.insert(Bytes::from_static(b"name"), Value::from(self.name.as_str()));
        info.insert(
            Bytes::from_static(b"piece length"),
            Value::Integer(1i64 << self.piece_length_exp),
        );
        info.insert(Bytes::from_static(b"pieces"), Value::from(hasher.finish()));

        if self.private {
            info.insert(Bytes::from_static(b"private"), Value::Integer(1));
        }

        if single_file {
            info.insert(Bytes::from_static(b"length"), Value::Integer(to_i64(total)?));
        } else {
            let list = entries
                .into_iter()
                .map(|(path, length)| {
                    let mut file = BTreeMap::new();
                    file.insert(Bytes::from_static(b"length"), Value::Integer(to_i64(length)?));
                    file.insert(
                        Bytes::from_static(b"path"),
                        Value::List(path.into_iter().map(Value::from).collect()),
                    );
                    Ok(Value::Dict(file))
                })
                .collect::<Result<Vec<_>, MetainfoError>>()?;
            info.insert(Bytes::from_static(b"files"), Value::List(list));
        }

        Ok(info)
    }
}

fn to_i64(length: u64) -> Result<i64, MetainfoError> {
    i64::try_from(length).map_err(|_| MetainfoError::InvalidField("file length"))
}
