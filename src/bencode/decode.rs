use super::error::BencodeError;
use super::value::Value;
use crate::constants::MAX_DECODE_DEPTH;
use bytes::Bytes;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::Path;

/// What the decoder does when a dictionary repeats a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateKeys {
    /// Fail with [`BencodeError::DuplicateKey`].
    #[default]
    Reject,
    /// Keep the value of the last occurrence.
    LastWins,
}

/// Limits and policies applied while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Maximum number of nested lists and dictionaries. A top-level list
    /// is depth 1; scalars do not count.
    pub max_depth: usize,
    /// Maximum accepted input length, `None` for no limit.
    pub max_input_len: Option<usize>,
    pub duplicate_keys: DuplicateKeys,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_DECODE_DEPTH,
            max_input_len: None,
            duplicate_keys: DuplicateKeys::default(),
        }
    }
}

/// A bencode decoder.
///
/// Every parse reports how many bytes it consumed, which is how list and
/// dictionary elements are delimited. The free functions in this module use
/// [`DecoderConfig::default`].
///
/// # Examples
///
/// ```
/// use btkit::bencode::{Decoder, DecoderConfig, DuplicateKeys, Value};
///
/// let decoder = Decoder::new(DecoderConfig {
///     duplicate_keys: DuplicateKeys::LastWins,
///     ..DecoderConfig::default()
/// });
///
/// let dict = decoder.decode_dictionary(b"d1:ai1e1:ai2ee").unwrap();
/// assert_eq!(dict.get(b"a".as_slice()), Some(&Value::Integer(2)));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decodes the value at the start of `data`, ignoring anything after it.
    pub fn decode(&self, data: &[u8]) -> Result<Value, BencodeError> {
        self.decode_prefix(data).map(|(value, _)| value)
    }

    /// Decodes the value at the start of `data` and returns it together with
    /// the number of bytes it occupied.
    pub fn decode_prefix(&self, data: &[u8]) -> Result<(Value, usize), BencodeError> {
        self.check_input_len(data)?;

        let mut pos = 0;
        let value = self.decode_value(data, &mut pos, 0)?;
        Ok((value, pos))
    }

    /// Decodes a value that must span the whole of `data`.
    pub fn decode_exact(&self, data: &[u8]) -> Result<Value, BencodeError> {
        let (value, consumed) = self.decode_prefix(data)?;

        if consumed != data.len() {
            return Err(BencodeError::TrailingData);
        }

        Ok(value)
    }

    pub fn decode_integer(&self, data: &[u8]) -> Result<i64, BencodeError> {
        self.check_input_len(data)?;
        expect_tag(data, b'i', "integer")?;

        let mut pos = 0;
        decode_integer_at(data, &mut pos)
    }

    /// Decodes a `<length>:<payload>` string, returning exactly `length` bytes.
    pub fn decode_string(&self, data: &[u8]) -> Result<Bytes, BencodeError> {
        self.check_input_len(data)?;

        let mut pos = 0;
        decode_bytes_at(data, &mut pos)
    }

    pub fn decode_list(&self, data: &[u8]) -> Result<Vec<Value>, BencodeError> {
        self.check_input_len(data)?;
        expect_tag(data, b'l', "list")?;

        let mut pos = 0;
        self.decode_list_at(data, &mut pos, 0)
    }

    pub fn decode_dictionary(&self, data: &[u8]) -> Result<BTreeMap<Bytes, Value>, BencodeError> {
        self.check_input_len(data)?;
        expect_tag(data, b'd', "dictionary")?;

        let mut pos = 0;
        self.decode_dict_at(data, &mut pos, 0)
    }

    /// Decodes the contents of a `.torrent` file into its top-level dictionary.
    ///
    /// With `strict`, the dictionary must carry a non-empty string `announce`
    /// and a non-empty dictionary `info`.
    pub fn decode_file_contents(
        &self,
        data: &[u8],
        strict: bool,
    ) -> Result<BTreeMap<Bytes, Value>, BencodeError> {
        let dict = self.decode_dictionary(data)?;

        if strict {
            let announce_ok = matches!(
                dict.get(b"announce".as_slice()),
                Some(Value::Bytes(b)) if !b.is_empty()
            );
            if !announce_ok {
                tracing::debug!("strict decode rejected torrent: bad or missing announce");
                return Err(BencodeError::MissingRequiredField("announce"));
            }

            let info_ok = matches!(
                dict.get(b"info".as_slice()),
                Some(Value::Dict(d)) if !d.is_empty()
            );
            if !info_ok {
                tracing::debug!("strict decode rejected torrent: bad or missing info");
                return Err(BencodeError::MissingRequiredField("info"));
            }
        }

        Ok(dict)
    }

    /// Reads a `.torrent` file from disk and decodes it like
    /// [`decode_file_contents`](Self::decode_file_contents).
    pub fn decode_file(
        &self,
        path: impl AsRef<Path>,
        strict: bool,
    ) -> Result<BTreeMap<Bytes, Value>, BencodeError> {
        let data = std::fs::read(path.as_ref())?;
        self.decode_file_contents(&data, strict)
    }

    fn check_input_len(&self, data: &[u8]) -> Result<(), BencodeError> {
        match self.config.max_input_len {
            Some(max) if data.len() > max => Err(BencodeError::InputTooLarge {
                len: data.len(),
                max,
            }),
            _ => Ok(()),
        }
    }

    fn decode_value(&self, data: &[u8], pos: &mut usize, depth: usize) -> Result<Value, BencodeError> {
        let Some(&tag) = data.get(*pos) else {
            return Err(BencodeError::MalformedInput("unexpected end of input".into()));
        };

        // `depth` counts the containers already open around this value.
        if matches!(tag, b'l' | b'd') && depth >= self.config.max_depth {
            return Err(BencodeError::NestingTooDeep);
        }

        match tag {
            b'i' => decode_integer_at(data, pos).map(Value::Integer),
            b'l' => self.decode_list_at(data, pos, depth).map(Value::List),
            b'd' => self.decode_dict_at(data, pos, depth).map(Value::Dict),
            b'0'..=b'9' => decode_bytes_at(data, pos).map(Value::Bytes),
            c => Err(BencodeError::MalformedInput(format!(
                "unexpected byte {:?} at offset {}",
                c as char, *pos
            ))),
        }
    }

    fn decode_list_at(
        &self,
        data: &[u8],
        pos: &mut usize,
        depth: usize,
    ) -> Result<Vec<Value>, BencodeError> {
        *pos += 1;
        let mut list = Vec::new();

        loop {
            match data.get(*pos) {
                None => return Err(BencodeError::MalformedInput("unterminated list".into())),
                Some(b'e') => break,
                Some(_) => list.push(self.decode_value(data, pos, depth + 1)?),
            }
        }

        *pos += 1;
        Ok(list)
    }

    fn decode_dict_at(
        &self,
        data: &[u8],
        pos: &mut usize,
        depth: usize,
    ) -> Result<BTreeMap<Bytes, Value>, BencodeError> {
        *pos += 1;
        let mut dict = BTreeMap::new();

        loop {
            match data.get(*pos) {
                None => {
                    return Err(BencodeError::MalformedInput("unterminated dictionary".into()))
                }
                Some(b'e') => break,
                Some(c) if !c.is_ascii_digit() => {
                    return Err(BencodeError::MalformedInput(format!(
                        "dictionary key at offset {} is not a string",
                        *pos
                    )))
                }
                Some(_) => {}
            }

            let key = decode_bytes_at(data, pos)?;
            let value = self.decode_value(data, pos, depth + 1)?;

            match dict.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(value);
                }
                Entry::Occupied(mut slot) => match self.config.duplicate_keys {
                    DuplicateKeys::LastWins => {
                        slot.insert(value);
                    }
                    DuplicateKeys::Reject => {
                        return Err(BencodeError::DuplicateKey(
                            String::from_utf8_lossy(slot.key()).into_owned(),
                        ))
                    }
                },
            }
        }

        *pos += 1;
        Ok(dict)
    }
}

fn expect_tag(data: &[u8], tag: u8, what: &str) -> Result<(), BencodeError> {
    if data.first() == Some(&tag) {
        Ok(())
    } else {
        Err(BencodeError::MalformedInput(format!(
            "not an encoded {what}: expected {:?}",
            tag as char
        )))
    }
}

fn decode_integer_at(data: &[u8], pos: &mut usize) -> Result<i64, BencodeError> {
    let start = *pos + 1;
    let end = data[start..]
        .iter()
        .position(|&b| b == b'e')
        .map(|offset| start + offset)
        .ok_or_else(|| BencodeError::MalformedInput("integer is missing its 'e' terminator".into()))?;

    let literal = &data[start..end];
    let text = || String::from_utf8_lossy(literal).into_owned();

    match literal {
        [] => return Err(BencodeError::InvalidInteger("empty".into())),
        [b'0', _, ..] | [b'-', b'0', ..] => {
            return Err(BencodeError::InvalidInteger(format!("leading zero in {}", text())))
        }
        _ => {}
    }

    let digits = literal.strip_prefix(b"-").unwrap_or(literal);
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(BencodeError::InvalidInteger(text()));
    }

    // ASCII only at this point.
    let value = std::str::from_utf8(literal)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| BencodeError::InvalidInteger(format!("{} is out of range", text())))?;

    *pos = end + 1;
    Ok(value)
}

fn decode_bytes_at(data: &[u8], pos: &mut usize) -> Result<Bytes, BencodeError> {
    let start = *pos;
    let colon = data[start..]
        .iter()
        .position(|&b| b == b':')
        .map(|offset| start + offset)
        .ok_or_else(|| BencodeError::MalformedInput("string is missing its ':' separator".into()))?;

    let prefix = &data[start..colon];
    let valid_prefix = !prefix.is_empty()
        && prefix.iter().all(u8::is_ascii_digit)
        && !(prefix.len() > 1 && prefix[0] == b'0');
    if !valid_prefix {
        return Err(BencodeError::MalformedInput(format!(
            "invalid string length prefix {:?}",
            String::from_utf8_lossy(prefix)
        )));
    }

    let available = data.len() - (colon + 1);
    // A prefix too large for usize can never fit in the input either.
    let len: usize = std::str::from_utf8(prefix)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(usize::MAX);

    if len > available {
        return Err(BencodeError::LengthMismatch {
            declared: len,
            available,
        });
    }

    let payload_start = colon + 1;
    let bytes = Bytes::copy_from_slice(&data[payload_start..payload_start + len]);
    *pos = payload_start + len;

    Ok(bytes)
}

/// Decodes the bencoded value at the start of `data`.
///
/// Bytes following the first complete value are ignored; use
/// [`decode_exact`] to reject them or [`decode_prefix`] to learn where the
/// value ended.
///
/// # Errors
///
/// - [`BencodeError::MalformedInput`] for a wrong tag byte or missing delimiter
/// - [`BencodeError::InvalidInteger`] for integers such as `i01e` or `i-0e`
/// - [`BencodeError::LengthMismatch`] when a string is longer than the input
/// - [`BencodeError::DuplicateKey`] when a dictionary repeats a key
/// - [`BencodeError::NestingTooDeep`] beyond 64 levels of nesting
///
/// # Examples
///
/// ```
/// use btkit::bencode::{decode, Value};
///
/// assert_eq!(decode(b"i42e").unwrap(), Value::Integer(42));
/// assert_eq!(decode(b"4:spam").unwrap().as_str(), Some("spam"));
/// assert!(decode(b"foo").is_err());
/// ```
pub fn decode(data: &[u8]) -> Result<Value, BencodeError> {
    Decoder::default().decode(data)
}

/// Decodes the value at the start of `data`, returning it and the number of
/// bytes consumed.
///
/// # Examples
///
/// ```
/// use btkit::bencode::{decode_prefix, Value};
///
/// let (value, consumed) = decode_prefix(b"i1e4:spam").unwrap();
/// assert_eq!(value, Value::Integer(1));
/// assert_eq!(consumed, 3);
/// ```
pub fn decode_prefix(data: &[u8]) -> Result<(Value, usize), BencodeError> {
    Decoder::default().decode_prefix(data)
}

/// Decodes a value that must span all of `data`.
pub fn decode_exact(data: &[u8]) -> Result<Value, BencodeError> {
    Decoder::default().decode_exact(data)
}

pub fn decode_integer(data: &[u8]) -> Result<i64, BencodeError> {
    Decoder::default().decode_integer(data)
}

/// Decodes a byte string; `3:foobar` yields `foo`.
pub fn decode_string(data: &[u8]) -> Result<Bytes, BencodeError> {
    Decoder::default().decode_string(data)
}

pub fn decode_list(data: &[u8]) -> Result<Vec<Value>, BencodeError> {
    Decoder::default().decode_list(data)
}

pub fn decode_dictionary(data: &[u8]) -> Result<BTreeMap<Bytes, Value>, BencodeError> {
    Decoder::default().decode_dictionary(data)
}

pub fn decode_file_contents(
    data: &[u8],
    strict: bool,
) -> Result<BTreeMap<Bytes, Value>, BencodeError> {
    Decoder::default().decode_file_contents(data, strict)
}

pub fn decode_file(
    path: impl AsRef<Path>,
    strict: bool,
) -> Result<BTreeMap<Bytes, Value>, BencodeError> {
    Decoder::default().decode_file(path, strict)
}
