//! Loosely-typed host data.
//!
//! Callers holding data from an untyped source, where lists and dictionaries
//! are both "ordered maps" and scalars may be floats or nulls, build a
//! [`Loose`] tree and let the [`Encoder`](super::Encoder) classify it. A map
//! whose keys are exactly `0..n` becomes a list, anything else a dictionary.

use super::encode::EncoderConfig;
use super::error::BencodeError;
use super::value::Value;
use bytes::Bytes;
use std::collections::{BTreeMap, HashMap};

/// A map key: an integer index or a byte string name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LooseKey {
    Index(i64),
    Name(Bytes),
}

impl LooseKey {
    /// Folds names that spell a canonical decimal integer into indices, the
    /// way untyped hosts treat `"0"` and `0` as the same key.
    fn normalized(&self) -> LooseKey {
        match self {
            LooseKey::Name(name) => match canonical_index(name) {
                Some(i) => LooseKey::Index(i),
                None => self.clone(),
            },
            LooseKey::Index(_) => self.clone(),
        }
    }

    fn to_bytes(&self) -> Bytes {
        match self {
            LooseKey::Index(i) => Bytes::from(i.to_string()),
            LooseKey::Name(name) => name.clone(),
        }
    }
}

impl From<i64> for LooseKey {
    fn from(i: i64) -> Self {
        LooseKey::Index(i)
    }
}

impl From<&str> for LooseKey {
    fn from(s: &str) -> Self {
        LooseKey::Name(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<Bytes> for LooseKey {
    fn from(b: Bytes) -> Self {
        LooseKey::Name(b)
    }
}

/// A dynamically-typed host value.
#[derive(Debug, Clone, PartialEq)]
pub enum Loose {
    Int(i64),
    Str(Bytes),
    Float(f64),
    Bool(bool),
    Null,
    /// An ordered map; a later entry with the same key replaces the value of
    /// the earlier one but keeps its position.
    Map(Vec<(LooseKey, Loose)>),
}

impl Loose {
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<LooseKey>,
        V: Into<Loose>,
    {
        Loose::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn empty_map() -> Self {
        Loose::Map(Vec::new())
    }

    pub fn bytes(b: impl Into<Bytes>) -> Self {
        Loose::Str(b.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Loose::Int(_) => "integer",
            Loose::Str(_) => "string",
            Loose::Float(_) => "float",
            Loose::Bool(_) => "boolean",
            Loose::Null => "null",
            Loose::Map(_) => "map",
        }
    }
}

impl From<i64> for Loose {
    fn from(i: i64) -> Self {
        Loose::Int(i)
    }
}

impl From<&str> for Loose {
    fn from(s: &str) -> Self {
        Loose::Str(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<f64> for Loose {
    fn from(f: f64) -> Self {
        Loose::Float(f)
    }
}

impl From<bool> for Loose {
    fn from(b: bool) -> Self {
        Loose::Bool(b)
    }
}

impl<T: Into<Loose>> From<Vec<T>> for Loose {
    fn from(items: Vec<T>) -> Self {
        Loose::Map(
            items
                .into_iter()
                .enumerate()
                .map(|(i, v)| (LooseKey::Index(i as i64), v.into()))
                .collect(),
        )
    }
}

pub(super) fn to_value(loose: &Loose, config: &EncoderConfig) -> Result<Value, BencodeError> {
    match loose {
        Loose::Int(i) => Ok(Value::Integer(*i)),
        Loose::Str(s) => Ok(Value::Bytes(s.clone())),
        Loose::Float(_) | Loose::Bool(_) | Loose::Null => {
            Err(BencodeError::UnsupportedType(loose.kind()))
        }
        Loose::Map(entries) => map_to_value(entries, config),
    }
}

fn map_to_value(entries: &[(LooseKey, Loose)], config: &EncoderConfig) -> Result<Value, BencodeError> {
    let entries = dedup(entries);

    if entries.is_empty() {
        return Ok(if config.encode_empty_mapping_as_dictionary {
            Value::dict()
        } else {
            Value::List(Vec::new())
        });
    }

    let len = entries.len() as i64;
    let mut by_index: Vec<Option<&Loose>> = vec![None; entries.len()];
    for (key, value) in &entries {
        if let LooseKey::Index(i) = key {
            if (0..len).contains(i) {
                by_index[*i as usize] = Some(*value);
            }
        }
    }

    if by_index.iter().all(Option::is_some) {
        return by_index
            .into_iter()
            .flatten()
            .map(|v| to_value(v, config))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List);
    }

    let mut dict = BTreeMap::new();
    for (key, value) in entries {
        dict.insert(key.to_bytes(), to_value(value, config)?);
    }
    Ok(Value::Dict(dict))
}

fn dedup(entries: &[(LooseKey, Loose)]) -> Vec<(LooseKey, &Loose)> {
    let mut out: Vec<(LooseKey, &Loose)> = Vec::with_capacity(entries.len());
    let mut positions: HashMap<LooseKey, usize> = HashMap::with_capacity(entries.len());
    for (key, value) in entries {
        let key = key.normalized();
        match positions.get(&key) {
            Some(&slot) => out[slot].1 = value,
            None => {
                positions.insert(key.clone(), out.len());
                out.push((key, value));
            }
        }
    }
    out
}

fn canonical_index(name: &[u8]) -> Option<i64> {
    let digits = name.strip_prefix(b"-").unwrap_or(name);
    let canonical = match digits {
        [] => false,
        [b'0'] => name.len() == 1,
        [first, ..] => *first != b'0' && digits.iter().all(u8::is_ascii_digit),
    };
    if !canonical {
        return None;
    }
    std::str::from_utf8(name).ok()?.parse().ok()
}
