//! Bencode encoding and decoding ([BEP-3]).
//!
//! Bencode is the serialization format used throughout BitTorrent for storing
//! and transmitting structured data, including `.torrent` files and tracker
//! responses.
//!
//! # Data Types
//!
//! | Type | Format | Example |
//! |------|--------|---------|
//! | Integer | `i<number>e` | `i42e` → 42 |
//! | Byte String | `<length>:<data>` | `4:spam` → "spam" |
//! | List | `l<items>e` | `l4:spami42ee` → ["spam", 42] |
//! | Dictionary | `d<key><value>...e` | `d3:foo3:bare` → {"foo": "bar"} |
//!
//! Dictionary keys are always written in ascending byte order, so two
//! dictionaries with the same entries encode identically. This is what makes
//! the info hash of a torrent stable.
//!
//! # Examples
//!
//! ```
//! use btkit::bencode::{decode, decode_prefix, encode, Value};
//! use bytes::Bytes;
//! use std::collections::BTreeMap;
//!
//! let value = decode(b"d4:spam4:eggs3:cow3:mooe").unwrap();
//! assert_eq!(value.get(b"cow").and_then(|v| v.as_str()), Some("moo"));
//!
//! // Re-encoding sorts the keys.
//! assert_eq!(encode(&value), b"d3:cow3:moo4:spam4:eggse");
//!
//! // Decoding a value embedded in a longer buffer.
//! let (value, consumed) = decode_prefix(b"li1ei2eetrailing").unwrap();
//! assert_eq!(value, Value::List(vec![Value::Integer(1), Value::Integer(2)]));
//! assert_eq!(consumed, 8);
//!
//! let mut dict = BTreeMap::new();
//! dict.insert(Bytes::from_static(b"key"), Value::string("value"));
//! assert_eq!(encode(&Value::Dict(dict)), b"d3:key5:valuee");
//! ```
//!
//! # Error Handling
//!
//! - [`BencodeError::MalformedInput`] - Wrong tag byte or a missing `:` / `e`
//! - [`BencodeError::InvalidInteger`] - Malformed integer (e.g., leading zeros)
//! - [`BencodeError::LengthMismatch`] - String length prefix exceeds the input
//! - [`BencodeError::UnsupportedType`] - Host value with no bencode form
//! - [`BencodeError::MissingRequiredField`] - Strict torrent check failed
//! - [`BencodeError::NestingTooDeep`] - Recursion limit exceeded (64 levels by default)
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html

mod decode;
mod encode;
mod error;
mod loose;
mod value;

pub use decode::{
    decode, decode_dictionary, decode_exact, decode_file, decode_file_contents, decode_integer,
    decode_list, decode_prefix, decode_string, Decoder, DecoderConfig, DuplicateKeys,
};
pub use encode::{
    encode, encode_dictionary, encode_integer, encode_into, encode_list, encode_string, Encoder,
    EncoderConfig,
};
pub use error::BencodeError;
pub use loose::{Loose, LooseKey};
pub use value::Value;

#[cfg(test)]
mod tests;
