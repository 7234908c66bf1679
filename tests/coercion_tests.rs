use serde::{Deserialize, Serialize};
use serde_bencode::{bencode, coerce, decode_str, fill, from_slice, from_value, Error, Value};
use serde_bytes::ByteBuf;
use std::collections::BTreeMap;

#[derive(Deserialize, Debug, PartialEq)]
struct Track {
    author: String,
    length: String,
}

#[derive(Deserialize, Debug, PartialEq)]
struct Library {
    #[serde(rename = "spam.mp3")]
    spam: Track,
}

#[test]
fn test_nested_record_with_integer_to_text() {
    let library: Library = from_slice(b"d8:spam.mp3d6:author5:Alice6:lengthi100000eee").unwrap();
    assert_eq!(
        library,
        Library {
            spam: Track {
                author: "Alice".to_string(),
                length: "100000".to_string(),
            }
        }
    );
}

#[test]
fn test_generic_then_typed() {
    let value = decode_str("d8:spam.mp3d6:author5:Alice6:lengthi100000eee")
        .unwrap()
        .unwrap();
    let tracks: BTreeMap<String, Track> = coerce(&value).unwrap();
    assert_eq!(tracks["spam.mp3"].length, "100000");

    // The source tree is untouched.
    assert_eq!(
        value.get("spam.mp3").and_then(|t| t.get("length")),
        Some(&Value::Int(100000))
    );
}

#[test]
fn test_text_to_integer() {
    assert_eq!(from_value::<i32>(Value::from("42")).unwrap(), 42);
    assert_eq!(from_value::<u16>(Value::from("65535")).unwrap(), 65535);
    assert_eq!(from_value::<i64>(Value::from("-7")).unwrap(), -7);

    let err = from_value::<u32>(Value::from("-7")).unwrap_err();
    assert!(matches!(err, Error::Parse { ref to, .. } if to == "u32"));
}

#[test]
fn test_integer_truncation() {
    assert_eq!(from_value::<u8>(Value::Int(256 + 5)).unwrap(), 5);
    assert_eq!(from_value::<u16>(Value::Int(-1)).unwrap(), u16::MAX);
    assert_eq!(from_value::<i8>(Value::Int(200)).unwrap(), -56);
}

#[test]
fn test_floats() {
    assert_eq!(from_value::<f64>(Value::Int(2)).unwrap(), 2.0);
    assert_eq!(from_value::<f32>(Value::from("0.5")).unwrap(), 0.5);
    assert!(from_value::<f64>(Value::from("half")).is_err());
    assert!(from_value::<f64>(bencode!([])).is_err());
}

#[test]
fn test_float_round_trip_through_text() {
    let bytes = serde_bencode::to_bytes(&1.25f64).unwrap();
    assert_eq!(bytes, b"8:1.250000");
    assert_eq!(from_slice::<f64>(&bytes).unwrap(), 1.25);
}

#[test]
fn test_renamed_and_defaulted_fields() {
    #[derive(Deserialize, Debug, PartialEq, Default)]
    #[serde(default)]
    struct Info {
        name: String,
        #[serde(rename = "piece length")]
        piece_length: u32,
        private: Option<i64>,
    }

    let info: Info = from_slice(b"d12:piece lengthi16384ee").unwrap();
    assert_eq!(
        info,
        Info {
            name: String::new(),
            piece_length: 16384,
            private: None,
        }
    );
}

#[test]
fn test_missing_required_field() {
    let err = from_slice::<Track>(b"d6:author5:Alicee").unwrap_err();
    assert!(err.to_string().contains("missing field `length`"));
}

#[test]
fn test_fill_keeps_prepopulated_fields() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Entry {
        author: String,
        length: String,
        plays: u32,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Catalog {
        #[serde(rename = "spam.mp3")]
        spam: Entry,
        owner: String,
    }

    let mut catalog = Catalog {
        spam: Entry {
            author: "unknown".to_string(),
            length: "0".to_string(),
            plays: 3,
        },
        owner: "Bob".to_string(),
    };
    let value = decode_str("d8:spam.mp3d6:author5:Alice6:lengthi100000eee")
        .unwrap()
        .unwrap();

    fill(&mut catalog, &value).unwrap();

    assert_eq!(
        catalog,
        Catalog {
            spam: Entry {
                author: "Alice".to_string(),
                length: "100000".to_string(),
                plays: 3,
            },
            owner: "Bob".to_string(),
        }
    );
}

#[test]
fn test_fill_requires_dictionary_for_records() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Entry {
        length: u32,
    }

    let mut entry = Entry { length: 5 };
    let err = fill(&mut entry, &Value::Int(1)).unwrap_err();
    assert!(matches!(err, Error::Coercion { .. }), "{:?}", err);
    assert_eq!(entry, Entry { length: 5 });
}

#[test]
fn test_errors_name_the_field_path() {
    #[derive(Deserialize, Debug)]
    #[allow(dead_code)]
    struct FileInfo {
        length: u64,
    }

    #[derive(Deserialize, Debug)]
    #[allow(dead_code)]
    struct Outer {
        file: FileInfo,
    }

    let err = from_slice::<Outer>(b"d4:filed6:lengthleee").unwrap_err();
    match &err {
        Error::Field { field, source } => {
            assert_eq!(field, "file");
            assert!(matches!(**source, Error::Field { ref field, .. } if field == "length"));
        }
        other => panic!("expected field error, got {:?}", other),
    }
    assert!(err.to_string().contains("Cannot coerce list into u64"));
}

#[test]
fn test_empty_typed_list() {
    let empty: Vec<Track> = from_slice(b"le").unwrap();
    assert!(empty.is_empty());

    let nested: Vec<Vec<u32>> = from_slice(b"llee").unwrap();
    assert_eq!(nested, vec![Vec::<u32>::new()]);
}

#[test]
fn test_list_elements_are_coerced() {
    let values: Vec<u32> = from_slice(b"li1e1:2i3ee").unwrap();
    assert_eq!(values, vec![1, 2, 3]);

    let err = from_slice::<Vec<u32>>(b"li1edee").unwrap_err();
    assert!(matches!(err, Error::Element { index: 1, .. }));
}

#[test]
fn test_kind_mismatches() {
    let err = from_value::<Vec<String>>(Value::from("spam")).unwrap_err();
    assert_eq!(err.to_string(), "Cannot coerce byte string into sequence");

    let err = from_value::<Track>(bencode!(["a"])).unwrap_err();
    assert_eq!(err.to_string(), "Cannot coerce list into Track");

    let err = from_value::<String>(bencode!({})).unwrap_err();
    assert!(matches!(err, Error::Coercion { .. }));

    assert!(from_value::<bool>(Value::Int(1)).is_err());
}

#[test]
fn test_binary_fields_with_serde_bytes() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Pieces {
        #[serde(with = "serde_bytes")]
        pieces: Vec<u8>,
    }

    let pieces = Pieces {
        pieces: vec![0x00, 0xff, b'e', b'd', b':'],
    };
    let bytes = serde_bencode::to_bytes(&pieces).unwrap();
    assert_eq!(bytes, b"d6:pieces5:\x00\xffed:e");
    assert_eq!(from_slice::<Pieces>(&bytes).unwrap(), pieces);

    let buf: ByteBuf = from_value(Value::Str(vec![1, 2, 3])).unwrap();
    assert_eq!(buf.into_vec(), vec![1, 2, 3]);
}

#[test]
fn test_non_utf8_text_is_rejected() {
    let err = from_value::<String>(Value::Str(vec![0xc3, 0x28])).unwrap_err();
    assert!(err.to_string().contains("non-UTF-8"));
}

#[test]
fn test_nil_maps_to_none() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Entry {
        comment: Option<String>,
    }

    let entry = Entry { comment: None };
    let bytes = serde_bencode::to_bytes(&entry).unwrap();
    assert_eq!(bytes, b"d7:comment3:nile");
    assert_eq!(from_slice::<Entry>(&bytes).unwrap(), entry);
}
