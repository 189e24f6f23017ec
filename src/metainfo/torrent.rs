use super::error::MetainfoError;
use super::info_hash::{url_encode, InfoHash};
use crate::bencode::{decode_file_contents, encode, Value};
use crate::constants::CREATED_BY;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

const ANNOUNCE: &[u8] = b"announce";
const ANNOUNCE_LIST: &[u8] = b"announce-list";
const COMMENT: &[u8] = b"comment";
const CREATED_BY_KEY: &[u8] = b"created by";
const CREATION_DATE: &[u8] = b"creation date";
const INFO: &[u8] = b"info";

const STANDARD_KEYS: [&[u8]; 6] = [
    ANNOUNCE,
    ANNOUNCE_LIST,
    COMMENT,
    CREATED_BY_KEY,
    CREATION_DATE,
    INFO,
];

/// A `.torrent` file.
///
/// The standard top-level keys are lifted into fields; any other key is kept
/// in [`extra`](Self::extra) and written back unchanged. The info dictionary
/// is kept as a raw dictionary so that its hash is computed over exactly the
/// keys it was read with.
///
/// # Examples
///
/// ```
/// use btkit::metainfo::Torrent;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let data = b"d8:announce18:http://tracker/ann4:infod6:lengthi5e4:name5:a.txt\
///              12:piece lengthi16384e6:pieces20:aaaaaaaaaaaaaaaaaaaaee";
/// let torrent = Torrent::from_bytes(data, true)?;
///
/// assert_eq!(torrent.announce.as_deref(), Some("http://tracker/ann"));
/// assert_eq!(torrent.name()?, "a.txt");
/// assert_eq!(torrent.size()?, 5);
/// println!("info hash: {}", torrent.info_hash()?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Torrent {
    /// Primary tracker URL.
    pub announce: Option<String>,
    /// Tracker tiers ([BEP-12](http://bittorrent.org/beps/bep_0012.html)), a list of lists of URLs.
    pub announce_list: Option<Value>,
    pub comment: Option<String>,
    /// Name/version of the program that created the torrent.
    pub created_by: Option<String>,
    /// Unix timestamp; defaults to the time of writing when unset.
    pub creation_date: Option<i64>,
    /// The info dictionary.
    pub info: Option<BTreeMap<Bytes, Value>>,
    /// Non-standard top-level keys.
    pub extra: BTreeMap<Bytes, Value>,
}

impl Default for Torrent {
    fn default() -> Self {
        Self {
            announce: None,
            announce_list: None,
            comment: None,
            created_by: Some(CREATED_BY.to_string()),
            creation_date: None,
            info: None,
            extra: BTreeMap::new(),
        }
    }
}

impl Torrent {
    pub fn new(announce: impl Into<String>) -> Self {
        Self::default().with_announce(announce)
    }

    pub fn with_announce(mut self, announce: impl Into<String>) -> Self {
        self.announce = Some(announce.into());
        self
    }

    /// Sets the tracker tiers.
    pub fn with_announce_list(mut self, tiers: Vec<Vec<String>>) -> Self {
        let tiers = tiers
            .into_iter()
            .map(|tier| Value::List(tier.into_iter().map(Value::from).collect()))
            .collect();
        self.announce_list = Some(Value::List(tiers));
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = Some(created_by.into());
        self
    }

    pub fn with_creation_date(mut self, timestamp: i64) -> Self {
        self.creation_date = Some(timestamp);
        self
    }

    pub fn with_info(mut self, info: BTreeMap<Bytes, Value>) -> Self {
        self.info = Some(info);
        self
    }

    pub fn with_extra(mut self, extra: BTreeMap<Bytes, Value>) -> Self {
        self.extra = extra;
        self
    }

    /// Parses a torrent from the raw contents of a `.torrent` file.
    ///
    /// With `strict`, a non-empty `announce` string and a non-empty `info`
    /// dictionary are required.
    pub fn from_bytes(data: &[u8], strict: bool) -> Result<Self, MetainfoError> {
        let dict = decode_file_contents(data, strict)?;
        Self::from_dictionary(dict)
    }

    pub fn from_file(path: impl AsRef<Path>, strict: bool) -> Result<Self, MetainfoError> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes(&data, strict)
    }

    /// Builds a torrent from a decoded top-level dictionary.
    ///
    /// Unlike a freshly created torrent, `created by` is only set when the
    /// dictionary carries it.
    pub fn from_dictionary(mut dict: BTreeMap<Bytes, Value>) -> Result<Self, MetainfoError> {
        let announce = take_string(&mut dict, ANNOUNCE, "announce")?;
        let comment = take_string(&mut dict, COMMENT, "comment")?;
        let created_by = take_string(&mut dict, CREATED_BY_KEY, "created by")?;

        let announce_list = match dict.remove(ANNOUNCE_LIST) {
            Some(list @ Value::List(_)) => Some(list),
            Some(_) => return Err(MetainfoError::InvalidField("announce-list")),
            None => None,
        };

        let creation_date = match dict.remove(CREATION_DATE) {
            Some(Value::Integer(ts)) => Some(ts),
            Some(_) => return Err(MetainfoError::InvalidField("creation date")),
            None => None,
        };

        let info = match dict.remove(INFO) {
            Some(Value::Dict(info)) => Some(info),
            Some(_) => return Err(MetainfoError::InvalidField("info")),
            None => None,
        };

        Ok(Self {
            announce,
            announce_list,
            comment,
            created_by,
            creation_date,
            info,
            extra: dict,
        })
    }

    /// Assembles the top-level dictionary written to a `.torrent` file.
    ///
    /// # Errors
    ///
    /// - [`MetainfoError::MissingField`] if `announce` or `info` is unset
    /// - [`MetainfoError::DuplicateKey`] if an extra key is one of the standard
    ///   top-level keys, whether or not that field is set
    pub fn to_dictionary(&self) -> Result<BTreeMap<Bytes, Value>, MetainfoError> {
        let announce = self
            .announce
            .as_deref()
            .ok_or(MetainfoError::MissingField("announce"))?;
        let info = self.info()?;

        let creation_date = self.creation_date.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs() as i64)
                .unwrap_or(0)
        });

        let mut dict = BTreeMap::new();
        dict.insert(Bytes::from_static(ANNOUNCE), Value::from(announce));
        dict.insert(Bytes::from_static(CREATION_DATE), Value::Integer(creation_date));
        dict.insert(Bytes::from_static(INFO), Value::Dict(info.clone()));

        if let Some(ref list) = self.announce_list {
            dict.insert(Bytes::from_static(ANNOUNCE_LIST), list.clone());
        }
        if let Some(ref comment) = self.comment {
            dict.insert(Bytes::from_static(COMMENT), Value::from(comment.as_str()));
        }
        if let Some(ref created_by) = self.created_by {
            dict.insert(Bytes::from_static(CREATED_BY_KEY), Value::from(created_by.as_str()));
        }

        for (key, value) in &self.extra {
            if STANDARD_KEYS.contains(&&key[..]) {
                return Err(MetainfoError::DuplicateKey(
                    String::from_utf8_lossy(key).into_owned(),
                ));
            }
            dict.insert(key.clone(), value.clone());
        }

        Ok(dict)
    }

    /// Encodes the torrent into the contents of a `.torrent` file.
    pub fn to_bytes(&self) -> Result<Vec<u8>, MetainfoError> {
        Ok(encode(&Value::Dict(self.to_dictionary()?)))
    }

    /// Writes the torrent to `path`, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), MetainfoError> {
        let bytes = self.to_bytes()?;
        std::fs::write(path.as_ref(), bytes)?;
        Ok(())
    }

    /// Returns all tracker URLs from both `announce` and `announce-list`.
    ///
    /// The primary tracker comes first; duplicates are removed.
    pub fn trackers(&self) -> Vec<String> {
        let mut trackers = Vec::new();

        if let Some(ref announce) = self.announce {
            trackers.push(announce.clone());
        }

        let tiers = self.announce_list.as_ref().and_then(Value::as_list);
        for tier in tiers.into_iter().flatten().filter_map(Value::as_list) {
            for tracker in tier.iter().filter_map(Value::as_str) {
                if !trackers.iter().any(|t| t == tracker) {
                    trackers.push(tracker.to_string());
                }
            }
        }

        trackers
    }

    pub fn info(&self) -> Result<&BTreeMap<Bytes, Value>, MetainfoError> {
        self.info.as_ref().ok_or(MetainfoError::MissingField("info"))
    }

    /// The suggested file or directory name.
    pub fn name(&self) -> Result<&str, MetainfoError> {
        self.info()?
            .get(b"name".as_slice())
            .ok_or(MetainfoError::MissingField("name"))?
            .as_str()
            .ok_or(MetainfoError::InvalidField("name"))
    }

    /// Total size of the content in bytes.
    pub fn size(&self) -> Result<u64, MetainfoError> {
        let info = self.info()?;

        if let Some(length) = info.get(b"length".as_slice()) {
            return non_negative(length, "length");
        }

        files(info)?.iter().try_fold(0u64, |total, file| {
            let length = file
                .get(b"length")
                .ok_or(MetainfoError::MissingField("file length"))?;
            total
                .checked_add(non_negative(length, "file length")?)
                .ok_or(MetainfoError::InvalidField("length"))
        })
    }

    /// Paths of the files in the torrent.
    ///
    /// A single-file torrent lists its name; a multi-file torrent lists each
    /// file's `path` components joined with `/`.
    pub fn file_list(&self) -> Result<Vec<String>, MetainfoError> {
        let info = self.info()?;

        if info.contains_key(b"length".as_slice()) {
            return Ok(vec![self.name()?.to_string()]);
        }

        files(info)?
            .iter()
            .map(|file| {
                let components = file
                    .get(b"path")
                    .and_then(Value::as_list)
                    .ok_or(MetainfoError::MissingField("file path"))?;
                components
                    .iter()
                    .map(|c| c.as_str().ok_or(MetainfoError::InvalidField("file path")))
                    .collect::<Result<Vec<_>, _>>()
                    .map(|parts| parts.join("/"))
            })
            .collect()
    }

    /// Whether the info dictionary sets `private` to 1.
    pub fn is_private(&self) -> bool {
        self.info
            .as_ref()
            .and_then(|info| info.get(b"private".as_slice()))
            .and_then(Value::as_integer)
            == Some(1)
    }

    /// SHA1 of the canonically encoded info dictionary.
    pub fn info_hash(&self) -> Result<InfoHash, MetainfoError> {
        Ok(InfoHash::from_info(self.info()?))
    }

    /// The raw info hash, percent-encoded for an announce URL.
    pub fn encoded_info_hash(&self) -> Result<String, MetainfoError> {
        Ok(url_encode(self.info_hash()?.as_bytes()))
    }
}

fn take_string(
    dict: &mut BTreeMap<Bytes, Value>,
    key: &[u8],
    name: &'static str,
) -> Result<Option<String>, MetainfoError> {
    match dict.remove(key) {
        Some(value) => value
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or(MetainfoError::InvalidField(name)),
        None => Ok(None),
    }
}

fn files(info: &BTreeMap<Bytes, Value>) -> Result<&Vec<Value>, MetainfoError> {
    info.get(b"files".as_slice())
        .ok_or(MetainfoError::MissingField("length or files"))?
        .as_list()
        .ok_or(MetainfoError::InvalidField("files"))
}

fn non_negative(value: &Value, name: &'static str) -> Result<u64, MetainfoError> {
    value
        .as_integer()
        .and_then(|n| u64::try_from(n).ok())
        .ok_or(MetainfoError::InvalidField(name))
}
