use serde_bencode::{bencode, to_string, Dict, Value};

#[test]
fn test_bencode_macro_integers() {
    assert_eq!(bencode!(42), Value::Int(42));
    assert_eq!(bencode!(-123), Value::Int(-123));
    assert_eq!(bencode!(0u8), Value::Int(0));
    assert_eq!(bencode!(i64::MAX), Value::Int(i64::MAX));
}

#[test]
fn test_bencode_macro_strings() {
    assert_eq!(bencode!("hello world"), Value::Str(b"hello world".to_vec()));
    assert_eq!(bencode!(""), Value::Str(Vec::new()));
    assert_eq!(bencode!(String::from("owned")), Value::from("owned"));
    assert_eq!(bencode!(&b"\x00\x01"[..]), Value::Str(vec![0, 1]));
}

#[test]
fn test_bencode_macro_lists() {
    assert_eq!(bencode!([]), Value::List(vec![]));

    assert_eq!(
        bencode!([1, 2, 3]),
        Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
    );

    assert_eq!(
        bencode!([1, "hello", [], {}]),
        Value::List(vec![
            Value::Int(1),
            Value::from("hello"),
            Value::List(vec![]),
            Value::Dict(Dict::new()),
        ])
    );
}

#[test]
fn test_bencode_macro_dicts() {
    assert_eq!(bencode!({}), Value::Dict(Dict::new()));

    let value = bencode!({
        "name": "Alice",
        "age": 30,
        "tags": ["admin", "developer"]
    });

    let dict = value.as_dict().unwrap();
    assert_eq!(dict.len(), 3);
    assert_eq!(dict.get("name"), Some(&Value::from("Alice")));
    assert_eq!(dict.get("age"), Some(&Value::Int(30)));
    assert_eq!(
        dict.get("tags"),
        Some(&Value::List(vec![Value::from("admin"), Value::from("developer")]))
    );
}

#[test]
fn test_bencode_macro_nested() {
    let value = bencode!({
        "info": {
            "files": [
                { "length": 1, "path": ["a"] },
                { "length": 2, "path": ["b", "c"] }
            ],
            "name": "dir"
        }
    });

    let files = value
        .get("info")
        .and_then(|info| info.get("files"))
        .and_then(Value::as_list)
        .unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[1].get("length"), Some(&Value::Int(2)));
}

#[test]
fn test_bencode_macro_trailing_commas() {
    assert_eq!(bencode!([1, 2,]), bencode!([1, 2]));
    assert_eq!(bencode!({ "a": 1, }), bencode!({ "a": 1 }));
}

#[test]
fn test_bencode_macro_encodes_canonically() {
    let value = bencode!({ "zebra": 1, "apple": 2, "mango": 3 });
    assert_eq!(
        to_string(&value).unwrap(),
        "d5:applei2e5:mangoi3e5:zebrai1ee"
    );
}

#[test]
fn test_bencode_macro_with_variables() {
    let name = "Bob";
    let port = 6881;
    let value = bencode!({ "name": name, "port": port });
    assert_eq!(value.get("name").and_then(Value::as_str), Some("Bob"));
    assert_eq!(value.get("port").and_then(Value::as_i64), Some(6881));
}
