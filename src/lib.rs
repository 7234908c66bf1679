//! # serde_bencode
//!
//! A Serde-compatible codec for bencode, the serialization format used by
//! BitTorrent metainfo files and tracker responses.
//!
//! ## What is bencode?
//!
//! Bencode has four kinds of value: byte strings, signed integers, lists and
//! dictionaries with byte-string keys. Byte strings are length-prefixed, so
//! the format is binary-safe, and dictionaries have a canonical encoding with
//! keys sorted by raw bytes, so equal values always encode to equal bytes.
//! See the [`format`] module for the full wire format.
//!
//! ## Key Features
//!
//! - **Canonical Output**: Dictionary and struct keys are always written in
//!   ascending byte order, whatever order the source map iterates in
//! - **Generic Values**: Decode without a schema into [`Value`]
//! - **Lenient Coercion**: Integers decode into `String` fields and decimal
//!   text decodes into integer fields
//! - **Streaming Input**: Decode from any [`std::io::Read`], with byte offsets
//!   in every syntax error
//! - **No Unsafe Code**
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! serde_bencode = "0.1"
//! serde = { version = "1.0", features = ["derive"] }
//! ```
//!
//! ### Basic Serialization and Deserialization
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_bencode::{from_slice, to_bytes};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct File {
//!     path: Vec<String>,
//!     length: u64,
//! }
//!
//! let file = File { path: vec!["dir".into(), "a.txt".into()], length: 42 };
//!
//! let bytes = to_bytes(&file).unwrap();
//! assert_eq!(bytes, b"d6:lengthi42e4:pathl3:dir5:a.txtee");
//!
//! let file_back: File = from_slice(&bytes).unwrap();
//! assert_eq!(file, file_back);
//! ```
//!
//! ### Schema-less Decoding
//!
//! ```rust
//! use serde_bencode::{decode_str, Value};
//!
//! let value = decode_str("d4:spaml1:a1:bee").unwrap().unwrap();
//! let spam = value.get("spam").and_then(Value::as_list).unwrap();
//! assert_eq!(spam, &[Value::from("a"), Value::from("b")]);
//!
//! // Empty input is not an error; there is just no value.
//! assert_eq!(decode_str("").unwrap(), None);
//! ```
//!
//! ### Dynamic Values with bencode! Macro
//!
//! ```rust
//! use serde_bencode::{bencode, to_string};
//!
//! let value = bencode!({ "foo": 42, "bar": "spam" });
//! assert_eq!(to_string(&value).unwrap(), "d3:bar4:spam3:fooi42ee");
//! ```
//!
//! ## Logging
//!
//! The top-level functions emit [`tracing`] events: `debug` for call sizes
//! and failures, `trace` for individual tokens. Install a subscriber to see
//! them; the library never installs one.

pub mod de;
pub mod error;
pub mod format;
pub mod macros;
pub mod map;
pub mod options;
pub mod read;
pub mod ser;
pub mod token;
pub mod value;

pub use de::{Deserializer, ValueDeserializer};
pub use error::{Error, Result};
pub use map::Dict;
pub use options::{DecodeOptions, EncodeOptions};
pub use ser::{Serializer, ValueSerializer};
pub use token::{Delimiter, Token, Tokenizer};
pub use value::Value;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;

/// Decode one [`Value`] from a string.
///
/// Returns `Ok(None)` for empty input.
///
/// # Examples
///
/// ```rust
/// use serde_bencode::{decode_str, Value};
///
/// assert_eq!(decode_str("i-42e").unwrap(), Some(Value::Int(-42)));
/// assert!(decode_str("i3").unwrap_err().is_eof());
/// ```
///
/// # Errors
///
/// Returns an error if the input is malformed or holds more than one value.
pub fn decode_str(s: &str) -> Result<Option<Value>> {
    decode_slice(s.as_bytes())
}

/// Decode one [`Value`] from a byte slice.
///
/// # Examples
///
/// ```rust
/// use serde_bencode::{decode_slice, Value};
///
/// let value = decode_slice(b"l4:spami42ee").unwrap().unwrap();
/// assert_eq!(value, Value::List(vec![Value::from("spam"), Value::Int(42)]));
/// ```
///
/// # Errors
///
/// Returns an error if the input is malformed or holds more than one value.
pub fn decode_slice(v: &[u8]) -> Result<Option<Value>> {
    decode_slice_with_options(v, &DecodeOptions::default())
}

/// Decode one [`Value`] from a byte slice with custom options.
///
/// # Errors
///
/// Returns an error if the input is malformed, violates `options`, or holds
/// more than one value.
pub fn decode_slice_with_options(v: &[u8], options: &DecodeOptions) -> Result<Option<Value>> {
    decode_reader_with_options(v, options)
}

/// Decode one [`Value`] from an I/O stream.
///
/// The reader is buffered internally; there is no need to wrap it in a
/// [`BufReader`](std::io::BufReader).
///
/// # Examples
///
/// ```rust
/// use serde_bencode::{decode_reader, Value};
/// use std::io::Cursor;
///
/// let value = decode_reader(Cursor::new(b"d3:fooi1ee")).unwrap().unwrap();
/// assert_eq!(value.get("foo"), Some(&Value::Int(1)));
/// ```
///
/// # Errors
///
/// Returns an error if reading fails, the input is malformed, or the stream
/// holds more than one value.
pub fn decode_reader<R: io::Read>(reader: R) -> Result<Option<Value>> {
    decode_reader_with_options(reader, &DecodeOptions::default())
}

/// Decode one [`Value`] from an I/O stream with custom options.
///
/// # Errors
///
/// Returns an error if reading fails, the input is malformed, violates
/// `options`, or the stream holds more than one value.
pub fn decode_reader_with_options<R: io::Read>(
    reader: R,
    options: &DecodeOptions,
) -> Result<Option<Value>> {
    let mut deserializer = Deserializer::with_options(reader, options.clone());
    let result = deserializer.parse().and_then(|value| {
        deserializer.end()?;
        Ok(value)
    });
    match &result {
        Ok(value) => tracing::debug!(
            consumed = deserializer.position(),
            kind = value.as_ref().map_or("nothing", |v| v.kind()),
            "decoded value"
        ),
        Err(err) => tracing::debug!(%err, "decode failed"),
    }
    result
}

/// Serialize any `T: Serialize` to a bencode string.
///
/// # Examples
///
/// ```rust
/// use serde_bencode::to_string;
/// use std::collections::HashMap;
///
/// let mut map = HashMap::new();
/// map.insert("foo", 42);
/// map.insert("bar", 7);
/// assert_eq!(to_string(&map).unwrap(), "d3:bari7e3:fooi42ee");
/// ```
///
/// # Errors
///
/// Returns an error if the value has no bencode mapping or the encoded bytes
/// are not valid UTF-8. Use [`to_bytes`] for binary data.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, &EncodeOptions::default())
}

/// Serialize any `T: Serialize` to a bencode string with custom options.
///
/// # Errors
///
/// Returns an error if the value has no bencode mapping or the encoded bytes
/// are not valid UTF-8.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: &EncodeOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let bytes = to_bytes_with_options(value, options)?;
    String::from_utf8(bytes)
        .map_err(|e| Error::custom(format!("encoded output is not valid UTF-8: {}", e)))
}

/// Serialize any `T: Serialize` to bencode bytes.
///
/// # Examples
///
/// ```rust
/// use serde_bencode::to_bytes;
///
/// assert_eq!(to_bytes(&vec!["spam"]).unwrap(), b"l4:spame");
/// ```
///
/// # Errors
///
/// Returns an error if the value has no bencode mapping.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_bytes<T>(value: &T) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    to_bytes_with_options(value, &EncodeOptions::default())
}

/// Serialize any `T: Serialize` to bencode bytes with custom options.
///
/// # Errors
///
/// Returns an error if the value has no bencode mapping.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_bytes_with_options<T>(value: &T, options: &EncodeOptions) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    let mut bytes = Vec::with_capacity(128);
    to_writer_with_options(&mut bytes, value, options)?;
    tracing::debug!(len = bytes.len(), "encoded value");
    Ok(bytes)
}

/// Serialize any `T: Serialize` to a writer.
///
/// Output is written as it is produced; wrap unbuffered sinks in a
/// [`BufWriter`](std::io::BufWriter).
///
/// # Examples
///
/// ```rust
/// use serde_bencode::to_writer;
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &(1, "x")).unwrap();
/// assert_eq!(buffer, b"li1e1:xe");
/// ```
///
/// # Errors
///
/// Returns an error if the value has no bencode mapping or writing fails.
/// Bytes written before the failure are left in the writer.
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    to_writer_with_options(writer, value, &EncodeOptions::default())
}

/// Serialize any `T: Serialize` to a writer with custom options.
///
/// # Errors
///
/// Returns an error if the value has no bencode mapping or writing fails.
pub fn to_writer_with_options<W, T>(writer: W, value: &T, options: &EncodeOptions) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let mut serializer = Serializer::with_options(writer, *options);
    value.serialize(&mut serializer).map_err(|err| {
        tracing::debug!(%err, "encode failed");
        err
    })
}

/// Convert any `T: Serialize` to a [`Value`].
///
/// # Examples
///
/// ```rust
/// use serde_bencode::{to_value, Value};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let value = to_value(&Point { x: 1, y: 2 }).unwrap();
/// assert_eq!(value.get("y"), Some(&Value::Int(2)));
/// ```
///
/// # Errors
///
/// Returns an error if the value has no bencode mapping or holds an integer
/// outside the `i64` range.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    to_value_with_options(value, &EncodeOptions::default())
}

/// Convert any `T: Serialize` to a [`Value`] with custom options.
///
/// Floats are stringified with `options.float_precision` digits, matching
/// what [`to_bytes_with_options`] writes.
///
/// # Errors
///
/// Returns an error if the value has no bencode mapping or holds an integer
/// outside the `i64` range.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value_with_options<T>(value: &T, options: &EncodeOptions) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    value.serialize(ValueSerializer::with_options(*options))
}

/// Coerce a [`Value`] into `T`, consuming it.
///
/// # Examples
///
/// ```rust
/// use serde_bencode::{from_value, Value};
///
/// let n: i32 = from_value(Value::from("42")).unwrap();
/// assert_eq!(n, 42);
///
/// let s: String = from_value(Value::Int(100000)).unwrap();
/// assert_eq!(s, "100000");
/// ```
///
/// # Errors
///
/// Returns an error if no coercion rule leads from the value to `T`.
pub fn from_value<T>(value: Value) -> Result<T>
where
    T: DeserializeOwned,
{
    T::deserialize(ValueDeserializer::new(value))
}

/// Coerce a borrowed [`Value`] into `T`, leaving the source untouched.
///
/// # Errors
///
/// Returns an error if no coercion rule leads from the value to `T`.
pub fn coerce<T>(value: &Value) -> Result<T>
where
    T: DeserializeOwned,
{
    from_value(value.clone())
}

/// Coerce a [`Value`] onto an existing `T`, keeping what the value lacks.
///
/// `dest` is converted to a [`Value`], `source` is merged over it with
/// [`Value::overlay`], and the result is coerced back into `dest`. Fields of
/// `dest` with no entry in a source dictionary keep their current contents,
/// at any nesting depth. `dest` is only replaced once the whole coercion
/// succeeds.
///
/// # Examples
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use serde_bencode::{decode_str, fill};
///
/// #[derive(Serialize, Deserialize, Debug, PartialEq)]
/// struct Track { author: String, length: String }
///
/// let mut track = Track { author: "unknown".into(), length: "0".into() };
/// let value = decode_str("d6:lengthi100000ee").unwrap().unwrap();
/// fill(&mut track, &value).unwrap();
/// assert_eq!(track, Track { author: "unknown".into(), length: "100000".into() });
/// ```
///
/// # Errors
///
/// Returns an error if `dest` has no bencode mapping (for example a `bool`
/// field) or the merged value cannot be coerced into `T`.
pub fn fill<T>(dest: &mut T, source: &Value) -> Result<()>
where
    T: Serialize + DeserializeOwned,
{
    let mut merged = to_value(&*dest)?;
    merged.overlay(source.clone());
    *dest = from_value(merged)?;
    Ok(())
}

/// Deserialize an instance of type `T` from a string of bencode.
///
/// # Errors
///
/// Returns an error if the input is malformed, empty, holds trailing data, or
/// cannot be coerced into `T`.
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    from_slice(s.as_bytes())
}

/// Deserialize an instance of type `T` from bencode bytes.
///
/// # Examples
///
/// ```rust
/// use serde_bencode::from_slice;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_slice(b"d1:xi1e1:yi2ee").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the input is malformed, empty, holds trailing data, or
/// cannot be coerced into `T`.
pub fn from_slice<T>(v: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    from_reader(v)
}

/// Deserialize an instance of type `T` from an I/O stream of bencode.
///
/// # Errors
///
/// Returns an error if reading fails, the input is malformed, empty, holds
/// trailing data, or cannot be coerced into `T`.
pub fn from_reader<R, T>(reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    from_reader_with_options(reader, &DecodeOptions::default())
}

/// Deserialize an instance of type `T` from an I/O stream with custom options.
///
/// # Errors
///
/// Returns an error if reading fails, the input is malformed or violates
/// `options`, is empty, holds trailing data, or cannot be coerced into `T`.
pub fn from_reader_with_options<R, T>(reader: R, options: &DecodeOptions) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut deserializer = Deserializer::with_options(reader, options.clone());
    let value = T::deserialize(&mut deserializer).and_then(|value| {
        deserializer.end()?;
        Ok(value)
    });
    if let Err(err) = &value {
        tracing::debug!(%err, offset = deserializer.position(), "typed decode failed");
    }
    value
}
