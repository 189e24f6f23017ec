use super::error::BencodeError;
use super::loose::{self, Loose};
use super::value::Value;
use bytes::BufMut;

/// Options for encoding loosely-typed host data, see [`Loose`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncoderConfig {
    /// Encode an empty [`Loose::Map`] as `de` instead of `le`.
    pub encode_empty_mapping_as_dictionary: bool,
}

/// A bencode encoder.
///
/// Typed [`Value`]s always encode; the configuration only affects the
/// [`Loose`] adapter, where a generic map must be classified as a list or a
/// dictionary.
#[derive(Debug, Clone, Copy, Default)]
pub struct Encoder {
    config: EncoderConfig,
}

impl Encoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    pub fn encode(&self, value: &Value) -> Vec<u8> {
        encode(value)
    }

    /// Converts host data into a typed [`Value`].
    ///
    /// # Errors
    ///
    /// Returns [`BencodeError::UnsupportedType`] for floats, booleans and nulls
    /// anywhere in the tree.
    pub fn to_value(&self, loose: &Loose) -> Result<Value, BencodeError> {
        loose::to_value(loose, &self.config)
    }

    /// Encodes host data, classifying each map as a list or a dictionary.
    ///
    /// # Examples
    ///
    /// ```
    /// use btkit::bencode::{Encoder, EncoderConfig, Loose};
    ///
    /// let encoder = Encoder::default();
    /// assert_eq!(encoder.encode_loose(&Loose::from(vec![1i64, 2, 3])).unwrap(), b"li1ei2ei3ee");
    /// assert_eq!(encoder.encode_loose(&Loose::empty_map()).unwrap(), b"le");
    ///
    /// let encoder = Encoder::new(EncoderConfig { encode_empty_mapping_as_dictionary: true });
    /// assert_eq!(encoder.encode_loose(&Loose::empty_map()).unwrap(), b"de");
    /// ```
    pub fn encode_loose(&self, loose: &Loose) -> Result<Vec<u8>, BencodeError> {
        self.to_value(loose).map(|value| encode(&value))
    }
}

/// Encodes a bencode value to a byte vector.
///
/// The output is canonical: dictionary keys are emitted in ascending byte
/// order no matter how the dictionary was built.
///
/// # Examples
///
/// ```
/// use btkit::bencode::{encode, Value};
///
/// assert_eq!(encode(&Value::Integer(1)), b"i1e");
/// assert_eq!(encode(&Value::string("spam")), b"4:spam");
///
/// let list = Value::List(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]);
/// assert_eq!(encode(&list), b"li1ei2ei3ee");
/// ```
pub fn encode(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_into(value, &mut buf);
    buf
}

/// Appends the encoding of `value` to `buf`.
pub fn encode_into<B: BufMut>(value: &Value, buf: &mut B) {
    match value {
        Value::Integer(i) => put_integer(*i, buf),
        Value::Bytes(b) => put_string(b, buf),
        Value::List(l) => {
            buf.put_u8(b'l');
            for item in l {
                encode_into(item, buf);
            }
            buf.put_u8(b'e');
        }
        Value::Dict(d) => {
            buf.put_u8(b'd');
            for (key, val) in d {
                put_string(key, buf);
                encode_into(val, buf);
            }
            buf.put_u8(b'e');
        }
    }
}

pub fn encode_integer(i: i64) -> Vec<u8> {
    let mut buf = Vec::new();
    put_integer(i, &mut buf);
    buf
}

pub fn encode_string(bytes: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(bytes.len() + 8);
    put_string(bytes, &mut buf);
    buf
}

pub fn encode_list(list: &[Value]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.put_u8(b'l');
    for item in list {
        encode_into(item, &mut buf);
    }
    buf.put_u8(b'e');
    buf
}

/// Encodes key/value pairs as a dictionary.
///
/// Pairs are sorted by raw key bytes before they are written, so the output
/// does not depend on the order of `pairs`. When a key repeats, the last pair
/// wins.
///
/// # Examples
///
/// ```
/// use btkit::bencode::{encode_dictionary, Value};
///
/// let spam = Value::string("eggs");
/// let foo = Value::string("bar");
/// let encoded = encode_dictionary([("spam", &spam), ("foo", &foo)]);
/// assert_eq!(encoded, b"d3:foo3:bar4:spam4:eggse");
/// ```
pub fn encode_dictionary<'a, K, I>(pairs: I) -> Vec<u8>
where
    K: AsRef<[u8]>,
    I: IntoIterator<Item = (K, &'a Value)>,
{
    let mut pairs: Vec<(K, &Value)> = pairs.into_iter().collect();
    // Stable, so the last duplicate stays last.
    pairs.sort_by(|a, b| a.0.as_ref().cmp(b.0.as_ref()));

    let mut buf = Vec::new();
    buf.put_u8(b'd');
    for (i, (key, value)) in pairs.iter().enumerate() {
        let shadowed = pairs
            .get(i + 1)
            .is_some_and(|(next, _)| next.as_ref() == key.as_ref());
        if shadowed {
            continue;
        }
        put_string(key.as_ref(), &mut buf);
        encode_into(value, &mut buf);
    }
    buf.put_u8(b'e');
    buf
}

fn put_integer<B: BufMut>(i: i64, buf: &mut B) {
    buf.put_u8(b'i');
    buf.put_slice(i.to_string().as_bytes());
    buf.put_u8(b'e');
}

fn put_string<B: BufMut>(bytes: &[u8], buf: &mut B) {
    buf.put_slice(bytes.len().to_string().as_bytes());
    buf.put_u8(b':');
    buf.put_slice(bytes);
}
