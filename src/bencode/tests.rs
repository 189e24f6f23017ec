use std::collections::BTreeMap;

use bytes::Bytes;

use super::*;

fn dict_of(pairs: &[(&str, Value)]) -> Value {
    let mut dict = BTreeMap::new();
    for (k, v) in pairs {
        dict.insert(Bytes::copy_from_slice(k.as_bytes()), v.clone());
    }
    Value::Dict(dict)
}

#[test]
fn test_decode_integer() {
    assert_eq!(decode_integer(b"i1e").unwrap(), 1);
    assert_eq!(decode_integer(b"i-1e").unwrap(), -1);
    assert_eq!(decode_integer(b"i0e").unwrap(), 0);
    assert_eq!(decode_integer(b"i123e").unwrap(), 123);
    assert_eq!(
        decode_integer(b"i9223372036854775807e").unwrap(),
        i64::MAX
    );
    assert_eq!(
        decode_integer(b"i-9223372036854775808e").unwrap(),
        i64::MIN
    );
}

#[test]
fn test_decode_integer_invalid() {
    for input in [
        b"i01e".as_slice(),
        b"i-01e",
        b"i-0e",
        b"ifoobare",
        b"ie",
        b"i-e",
        b"i+1e",
        b"i 1e",
        b"i1.5e",
        b"i9223372036854775808e",
    ] {
        assert!(
            matches!(decode_integer(input), Err(BencodeError::InvalidInteger(_))),
            "{:?} should be an invalid integer",
            String::from_utf8_lossy(input)
        );
    }
}

#[test]
fn test_decode_integer_malformed() {
    assert!(matches!(
        decode_integer(b"4:spam"),
        Err(BencodeError::MalformedInput(_))
    ));
    assert!(matches!(
        decode_integer(b"i10"),
        Err(BencodeError::MalformedInput(_))
    ));
    assert!(matches!(
        decode_integer(b""),
        Err(BencodeError::MalformedInput(_))
    ));
}

#[test]
fn test_decode_string() {
    assert_eq!(decode_string(b"4:spam").unwrap(), Bytes::from_static(b"spam"));
    assert_eq!(
        decode_string(b"11:test string").unwrap(),
        Bytes::from_static(b"test string")
    );
    assert_eq!(decode_string(b"0:").unwrap(), Bytes::new());
}

#[test]
fn test_decode_string_truncates_to_length() {
    assert_eq!(decode_string(b"3:foobar").unwrap(), Bytes::from_static(b"foo"));
}

#[test]
fn test_decode_string_binary_payload() {
    let data = b"4:\x00\xff:e";
    assert_eq!(
        decode_string(data).unwrap(),
        Bytes::from_static(b"\x00\xff:e")
    );
}

#[test]
fn test_decode_string_invalid() {
    assert!(matches!(
        decode_string(b"4spam"),
        Err(BencodeError::MalformedInput(_))
    ));
    assert!(matches!(
        decode_string(b"x:spam"),
        Err(BencodeError::MalformedInput(_))
    ));
    assert!(matches!(
        decode_string(b"04:spam"),
        Err(BencodeError::MalformedInput(_))
    ));
    assert!(matches!(
        decode_string(b"6:spam"),
        Err(BencodeError::LengthMismatch {
            declared: 6,
            available: 4
        })
    ));
    assert!(matches!(
        decode_string(b"99999999999999999999999:x"),
        Err(BencodeError::LengthMismatch { available: 1, .. })
    ));
}

#[test]
fn test_decode_list() {
    assert_eq!(
        decode_list(b"li1ei2ei3ee").unwrap(),
        vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]
    );
    assert_eq!(decode_list(b"le").unwrap(), Vec::<Value>::new());
}

#[test]
fn test_decode_list_invalid() {
    assert!(matches!(
        decode_list(b"4:spam"),
        Err(BencodeError::MalformedInput(_))
    ));
    assert!(matches!(
        decode_list(b"li1ei2e"),
        Err(BencodeError::MalformedInput(_))
    ));
    assert!(matches!(
        decode_list(b"li1ex"),
        Err(BencodeError::MalformedInput(_))
    ));
}

#[test]
fn test_decode_dictionary() {
    let dict = decode_dictionary(b"d3:foo3:bar4:spam4:eggse").unwrap();
    assert_eq!(dict.len(), 2);
    assert_eq!(
        dict.get(b"foo".as_slice()),
        Some(&Value::string("bar"))
    );
    assert_eq!(
        dict.get(b"spam".as_slice()),
        Some(&Value::string("eggs"))
    );
}

#[test]
fn test_decode_dictionary_unsorted_input() {
    let dict = decode_dictionary(b"d4:spam4:eggs3:foo3:bare").unwrap();
    let keys: Vec<&[u8]> = dict.keys().map(|k| k.as_ref()).collect();
    assert_eq!(keys, vec![b"foo".as_slice(), b"spam".as_slice()]);
}

#[test]
fn test_decode_dictionary_invalid() {
    assert!(matches!(
        decode_dictionary(b"4:spam"),
        Err(BencodeError::MalformedInput(_))
    ));
    assert!(matches!(
        decode_dictionary(b"di1ei2ee"),
        Err(BencodeError::MalformedInput(_))
    ));
    assert!(matches!(
        decode_dictionary(b"d3:foo3:bar"),
        Err(BencodeError::MalformedInput(_))
    ));
    assert!(matches!(
        decode_dictionary(b"d3:fooe"),
        Err(BencodeError::MalformedInput(_))
    ));
}

#[test]
fn test_duplicate_keys_rejected_by_default() {
    assert!(matches!(
        decode(b"d1:ai1e1:ai2ee"),
        Err(BencodeError::DuplicateKey(key)) if key == "a"
    ));
}

#[test]
fn test_duplicate_keys_last_wins() {
    let decoder = Decoder::new(DecoderConfig {
        duplicate_keys: DuplicateKeys::LastWins,
        ..DecoderConfig::default()
    });
    let dict = decoder.decode_dictionary(b"d1:ai1e1:bi5e1:ai2ee").unwrap();
    assert_eq!(dict.len(), 2);
    assert_eq!(dict.get(b"a".as_slice()), Some(&Value::Integer(2)));
}

#[test]
fn test_generic_decode() {
    assert_eq!(decode(b"i1e").unwrap(), Value::Integer(1));
    assert_eq!(decode(b"4:spam").unwrap(), Value::string("spam"));
    assert_eq!(
        decode(b"li1ei2ei3ee").unwrap(),
        Value::List(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)])
    );
    assert_eq!(
        decode(b"d3:foo3:bare").unwrap(),
        dict_of(&[("foo", Value::string("bar"))])
    );
}

#[test]
fn test_generic_decode_invalid() {
    assert!(matches!(decode(b"foo"), Err(BencodeError::MalformedInput(_))));
    assert!(matches!(decode(b""), Err(BencodeError::MalformedInput(_))));
    assert!(matches!(decode(b"-1:"), Err(BencodeError::MalformedInput(_))));
}

#[test]
fn test_decode_prefix_reports_consumed() {
    let (value, consumed) = decode_prefix(b"4:spami42e").unwrap();
    assert_eq!(value, Value::string("spam"));
    assert_eq!(consumed, 6);

    let (value, consumed) = decode_prefix(b"d1:ali1eee1:x").unwrap();
    assert!(value.is_dict());
    assert_eq!(consumed, 10);
}

#[test]
fn test_decode_ignores_trailing_data() {
    assert_eq!(decode(b"i42eextra").unwrap(), Value::Integer(42));
}

#[test]
fn test_decode_exact_rejects_trailing_data() {
    assert!(matches!(
        decode_exact(b"i42eextra"),
        Err(BencodeError::TrailingData)
    ));
    assert_eq!(decode_exact(b"i42e").unwrap(), Value::Integer(42));
}

#[test]
fn test_nesting_limit() {
    let ok = [vec![b'l'; 10], vec![b'e'; 10]].concat();
    assert!(decode(&ok).is_ok());

    let deep = [vec![b'l'; 100], vec![b'e'; 100]].concat();
    assert!(matches!(decode(&deep), Err(BencodeError::NestingTooDeep)));

    let shallow = Decoder::new(DecoderConfig {
        max_depth: 2,
        ..DecoderConfig::default()
    });
    assert!(shallow.decode(b"lli1eee").is_ok());
    assert!(shallow.decode(b"ld1:ai1eee").is_ok());
    assert!(matches!(shallow.decode(b"llleee"), Err(BencodeError::NestingTooDeep)));
    assert!(matches!(shallow.decode(b"ld1:aleee"), Err(BencodeError::NestingTooDeep)));

    let flat = Decoder::new(DecoderConfig {
        max_depth: 0,
        ..DecoderConfig::default()
    });
    assert!(flat.decode(b"i1e").is_ok());
    assert!(matches!(flat.decode(b"le"), Err(BencodeError::NestingTooDeep)));
}

#[test]
fn test_input_size_limit() {
    let decoder = Decoder::new(DecoderConfig {
        max_input_len: Some(8),
        ..DecoderConfig::default()
    });
    assert!(decoder.decode(b"4:spam").is_ok());
    assert!(matches!(
        decoder.decode(b"11:test string"),
        Err(BencodeError::InputTooLarge { len: 14, max: 8 })
    ));
}

#[test]
fn test_decode_file_contents_strict() {
    let valid = b"d8:announce14:http://tracker4:infod4:name4:test6:lengthi1eee";
    let dict = decode_file_contents(valid, true).unwrap();
    assert_eq!(
        dict.get(b"announce".as_slice()).and_then(|v| v.as_str()),
        Some("http://tracker")
    );

    let missing_announce = b"d4:infod4:name4:testee";
    assert!(matches!(
        decode_file_contents(missing_announce, true),
        Err(BencodeError::MissingRequiredField("announce"))
    ));
    assert!(decode_file_contents(missing_announce, false).is_ok());

    let missing_info = b"d8:announce14:http://trackere";
    assert!(matches!(
        decode_file_contents(missing_info, true),
        Err(BencodeError::MissingRequiredField("info"))
    ));

    let empty_info = b"d8:announce14:http://tracker4:infodee";
    assert!(matches!(
        decode_file_contents(empty_info, true),
        Err(BencodeError::MissingRequiredField("info"))
    ));

    let integer_announce = b"d8:announcei1e4:infod4:name4:testee";
    assert!(matches!(
        decode_file_contents(integer_announce, true),
        Err(BencodeError::MissingRequiredField("announce"))
    ));
}

#[test]
fn test_decode_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("valid.torrent");
    std::fs::write(
        &path,
        b"d8:announce17:http://trackerurl7:comment17:This is a comment4:infod4:name3:PHP6:lengthi3eee",
    )
    .unwrap();

    let dict = decode_file(&path, true).unwrap();
    assert_eq!(
        dict.get(b"comment".as_slice()).and_then(|v| v.as_str()),
        Some("This is a comment")
    );

    let missing = dir.path().join("missing.torrent");
    assert!(matches!(
        decode_file(&missing, false),
        Err(BencodeError::Io(_))
    ));
}

#[test]
fn test_encode_integer() {
    assert_eq!(encode_integer(42), b"i42e");
    assert_eq!(encode_integer(-42), b"i-42e");
    assert_eq!(encode_integer(0), b"i0e");
    assert_eq!(encode_integer(i64::MIN), b"i-9223372036854775808e");
}

#[test]
fn test_encode_string() {
    assert_eq!(encode_string(b"spam"), b"4:spam");
    assert_eq!(encode_string(b""), b"0:");
}

#[test]
fn test_encode_list() {
    let list = [Value::Integer(1), Value::Integer(2), Value::Integer(3)];
    assert_eq!(encode_list(&list), b"li1ei2ei3ee");
    assert_eq!(encode_list(&[]), b"le");
}

#[test]
fn test_encode_dictionary_sorts_keys() {
    let eggs = Value::string("eggs");
    let bar = Value::string("bar");
    assert_eq!(
        encode_dictionary([("spam", &eggs), ("foo", &bar)]),
        b"d3:foo3:bar4:spam4:eggse"
    );
    assert_eq!(
        encode_dictionary([("foo", &bar), ("spam", &eggs)]),
        b"d3:foo3:bar4:spam4:eggse"
    );
}

#[test]
fn test_encode_dictionary_sorts_by_raw_bytes() {
    let one = Value::Integer(1);
    let encoded = encode_dictionary([
        (b"b".as_slice(), &one),
        (b"B".as_slice(), &one),
        (b"\xff".as_slice(), &one),
        (b"a".as_slice(), &one),
    ]);
    assert_eq!(encoded, b"d1:Bi1e1:ai1e1:bi1e1:\xffi1ee");
}

#[test]
fn test_encode_dictionary_last_duplicate_wins() {
    let first = Value::Integer(1);
    let second = Value::Integer(2);
    assert_eq!(
        encode_dictionary([("a", &first), ("a", &second)]),
        b"d1:ai2ee"
    );
}

#[test]
fn test_generic_encode() {
    assert_eq!(encode(&Value::Integer(1)), b"i1e");
    assert_eq!(encode(&Value::string("spam")), b"4:spam");
    assert_eq!(
        encode(&Value::List(vec![
            Value::Integer(1),
            Value::Integer(2),
            Value::Integer(3)
        ])),
        b"li1ei2ei3ee"
    );
    assert_eq!(
        encode(&dict_of(&[("spam", Value::string("eggs")), ("foo", Value::string("bar"))])),
        b"d3:foo3:bar4:spam4:eggse"
    );
}

#[test]
fn test_encode_into_appends() {
    let mut buf = b"prefix".to_vec();
    encode_into(&Value::Integer(7), &mut buf);
    assert_eq!(buf, b"prefixi7e");
}

#[test]
fn test_roundtrip() {
    let original = b"d8:announce15:http://test.com4:infod4:name4:test12:piece lengthi16384eee";
    let decoded = decode(original).unwrap();
    assert_eq!(encode(&decoded), original);
}

#[test]
fn test_roundtrip_values() {
    let value = Value::List(vec![
        Value::Integer(-7),
        Value::bytes(vec![0u8, 1, 2, 255]),
        dict_of(&[
            ("list", Value::List(vec![Value::dict(), Value::List(vec![])])),
            ("n", Value::Integer(0)),
        ]),
    ]);
    assert_eq!(decode(&encode(&value)).unwrap(), value);
}

#[test]
fn test_unsorted_input_is_canonicalized() {
    let decoded = decode(b"d1:bi2e1:ai1ee").unwrap();
    assert_eq!(encode(&decoded), b"d1:ai1e1:bi2ee");
}

#[test]
fn test_element_length_matches_reencoding() {
    // Every element of a list or dictionary occupies exactly as many bytes
    // as its canonical re-encoding, even when nested keys were unsorted.
    let data: &[u8] = b"ld1:bi2e1:ai1eei-5e5:hellol3:abcee";
    let mut pos = 1;
    while data[pos] != b'e' {
        let (element, consumed) = decode_prefix(&data[pos..]).unwrap();
        assert_eq!(encode(&element).len(), consumed);
        pos += consumed;
    }
    assert_eq!(pos, data.len() - 1);

    let dict_data: &[u8] = b"d1:zd1:yi1e1:xi2ee1:ali1ei2eee";
    let (value, consumed) = decode_prefix(dict_data).unwrap();
    assert_eq!(consumed, dict_data.len());
    assert_eq!(encode(&value).len(), dict_data.len());
}

#[test]
fn test_loose_dense_map_is_list() {
    let encoder = Encoder::default();
    let list = Loose::map([(1i64, Loose::from("b")), (0i64, Loose::from("a"))]);
    assert_eq!(encoder.encode_loose(&list).unwrap(), b"l1:a1:be");
}

#[test]
fn test_loose_sparse_map_is_dictionary() {
    let encoder = Encoder::default();
    let sparse = Loose::map([(0i64, Loose::from(1i64)), (2i64, Loose::from(2i64))]);
    assert_eq!(encoder.encode_loose(&sparse).unwrap(), b"d1:0i1e1:2i2ee");

    let named = Loose::map([("spam", Loose::from("eggs")), ("foo", Loose::from("bar"))]);
    assert_eq!(
        encoder.encode_loose(&named).unwrap(),
        b"d3:foo3:bar4:spam4:eggse"
    );
}

#[test]
fn test_loose_numeric_names_are_indices() {
    let encoder = Encoder::default();
    let list = Loose::map([("0", Loose::from(1i64)), ("1", Loose::from(2i64))]);
    assert_eq!(encoder.encode_loose(&list).unwrap(), b"li1ei2ee");

    let not_index = Loose::map([("00", Loose::from(1i64))]);
    assert_eq!(encoder.encode_loose(&not_index).unwrap(), b"d2:00i1ee");
}

#[test]
fn test_loose_repeated_key_replaces_value() {
    let encoder = Encoder::default();
    let map = Loose::map([
        (LooseKey::from(0i64), Loose::from("a")),
        (LooseKey::from(1i64), Loose::from("b")),
        (LooseKey::from("0"), Loose::from("c")),
    ]);
    assert_eq!(encoder.encode_loose(&map).unwrap(), b"l1:c1:be");

    let large = Loose::map((0..10_000i64).rev().map(|i| (i, Loose::from(i))));
    match encoder.to_value(&large).unwrap() {
        Value::List(items) => {
            assert_eq!(items.len(), 10_000);
            assert_eq!(items[9_999], Value::Integer(9_999));
        }
        other => panic!("expected a list, got {:?}", other),
    }
}

#[test]
fn test_loose_empty_map() {
    assert_eq!(
        Encoder::default().encode_loose(&Loose::empty_map()).unwrap(),
        b"le"
    );
    let encoder = Encoder::new(EncoderConfig {
        encode_empty_mapping_as_dictionary: true,
    });
    assert_eq!(encoder.encode_loose(&Loose::empty_map()).unwrap(), b"de");
}

#[test]
fn test_loose_unsupported_types() {
    let encoder = Encoder::default();
    assert!(matches!(
        encoder.encode_loose(&Loose::Float(1.5)),
        Err(BencodeError::UnsupportedType("float"))
    ));
    assert!(matches!(
        encoder.encode_loose(&Loose::Null),
        Err(BencodeError::UnsupportedType("null"))
    ));
    let nested = Loose::from(vec![Loose::from(1i64), Loose::from(true)]);
    assert!(matches!(
        encoder.encode_loose(&nested),
        Err(BencodeError::UnsupportedType("boolean"))
    ));
}

#[test]
fn test_value_accessors() {
    let value = Value::Integer(42);
    assert_eq!(value.as_integer(), Some(42));
    assert!(value.as_bytes().is_none());
    assert_eq!(value.kind(), "integer");

    let value = Value::Bytes(Bytes::from_static(b"test"));
    assert_eq!(value.as_str(), Some("test"));
    assert!(value.as_integer().is_none());

    let value = Value::List(vec![]);
    assert!(value.as_list().is_some());
    assert!(value.as_dict().is_none());

    let mut value = Value::dict();
    assert_eq!(value.insert(b"k".as_slice(), 1i64), None);
    assert_eq!(value.insert(b"k".as_slice(), 2i64), Some(Value::Integer(1)));
    assert_eq!(value.get(b"k"), Some(&Value::Integer(2)));
}
