//! Generic value representation for decoded bencode.
//!
//! Decoding without a target type produces a [`Value`]: a closed union of the
//! four bencode primitives. Nothing else can appear on the wire, so matching
//! on a `Value` is always exhaustive.
//!
//! ## Usage Patterns
//!
//! ### Creating Values
//!
//! ```rust
//! use serde_bencode::{bencode, Value};
//!
//! let number = Value::from(42);
//! let text = Value::from("spam");
//! let raw = Value::from(vec![0u8, 159, 146, 150]);
//!
//! let dict = bencode!({
//!     "name": "Alice",
//!     "tags": ["rust", "serde"]
//! });
//! assert!(dict.is_dict());
//! ```
//!
//! ### Extracting Values
//!
//! ```rust
//! use serde_bencode::{decode_str, Value};
//!
//! let value = decode_str("d3:bar4:spam3:fooi42ee").unwrap().unwrap();
//! assert_eq!(value.get("bar").and_then(Value::as_str), Some("spam"));
//! assert_eq!(value.get("foo").and_then(Value::as_i64), Some(42));
//!
//! let n: i64 = i64::try_from(Value::Int(7)).unwrap();
//! assert_eq!(n, 7);
//! ```

use crate::Dict;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Byte string written for `None`, `()` and unit structs.
pub(crate) const NIL: &[u8] = b"nil";

/// Any bencode value.
///
/// # Examples
///
/// ```rust
/// use serde_bencode::Value;
///
/// let list = Value::List(vec![Value::from("spam"), Value::Int(42)]);
/// assert!(list.is_list());
/// assert_eq!(list.to_string(), r#"["spam", 42]"#);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// Raw bytes; not necessarily UTF-8.
    Str(Vec<u8>),
    Int(i64),
    List(Vec<Value>),
    Dict(Dict),
}

impl Value {
    /// Name of this value's kind, as used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Value::Str(_) => "byte string",
            Value::Int(_) => "integer",
            Value::List(_) => "list",
            Value::Dict(_) => "dictionary",
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_str(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_dict(&self) -> bool {
        matches!(self, Value::Dict(_))
    }

    /// Returns the raw bytes of a byte string.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Str(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Returns a byte string as `&str` if it is valid UTF-8.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_bencode::Value;
    ///
    /// assert_eq!(Value::from("spam").as_str(), Some("spam"));
    /// assert_eq!(Value::Str(vec![0xff]).as_str(), None);
    /// assert_eq!(Value::Int(1).as_str(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    /// Looks up `key` if this value is a dictionary.
    #[must_use]
    pub fn get<K: AsRef<[u8]>>(&self, key: K) -> Option<&Value> {
        self.as_dict().and_then(|dict| dict.get(key))
    }

    /// Merges `source` into this value.
    ///
    /// When both sides are dictionaries, each source entry is merged into the
    /// entry under the same key, and keys the source lacks are left alone.
    /// Any other source replaces this value outright.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_bencode::bencode;
    ///
    /// let mut value = bencode!({ "name": "a.txt", "info": { "length": 1, "private": 0 } });
    /// value.overlay(bencode!({ "info": { "length": 2 } }));
    /// assert_eq!(value, bencode!({ "name": "a.txt", "info": { "length": 2, "private": 0 } }));
    /// ```
    pub fn overlay(&mut self, source: Value) {
        match (self, source) {
            (Value::Dict(dest), Value::Dict(source)) => {
                for (key, value) in source {
                    match dest.get_mut(&key) {
                        Some(existing) => existing.overlay(value),
                        None => {
                            dest.insert(key, value);
                        }
                    }
                }
            }
            (dest, source) => *dest = source,
        }
    }
}

/// Debug-friendly rendering; dictionaries are shown in canonical order.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(bytes) => write_bytes(f, bytes),
            Value::Int(i) => write!(f, "{}", i),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Dict(dict) => {
                f.write_str("{")?;
                for (i, (key, value)) in dict.canonical_iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_bytes(f, key)?;
                    write!(f, ": {}", value)?;
                }
                f.write_str("}")
            }
        }
    }
}

fn write_bytes(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    match std::str::from_utf8(bytes) {
        Ok(s) => write!(f, "{:?}", s),
        Err(_) => write!(f, "b\"{}\"", bytes.escape_ascii()),
    }
}

/// Passes a byte slice to `serialize_bytes` rather than as a sequence of `u8`.
struct RawBytes<'a>(&'a [u8]);

impl Serialize for RawBytes<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(self.0)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Str(bytes) => serializer.serialize_bytes(bytes),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::List(items) => {
                use serde::ser::SerializeSeq;
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Dict(dict) => {
                use serde::ser::SerializeMap;
                let mut map = serializer.serialize_map(Some(dict.len()))?;
                for (key, value) in dict.canonical_iter() {
                    map.serialize_entry(&RawBytes(key), value)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a bencode byte string, integer, list or dictionary")
            }

            fn visit_i64<E>(self, value: i64) -> Result<Value, E> {
                Ok(Value::Int(value))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Value, E> {
                i64::try_from(value)
                    .map(Value::Int)
                    .map_err(|_| E::custom(format!("integer {} is out of range", value)))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Value, E> {
                Ok(Value::Str(format!("{:.6}", value).into_bytes()))
            }

            fn visit_str<E>(self, value: &str) -> Result<Value, E> {
                Ok(Value::Str(value.as_bytes().to_vec()))
            }

            fn visit_string<E>(self, value: String) -> Result<Value, E> {
                Ok(Value::Str(value.into_bytes()))
            }

            fn visit_bytes<E>(self, value: &[u8]) -> Result<Value, E> {
                Ok(Value::Str(value.to_vec()))
            }

            fn visit_byte_buf<E>(self, value: Vec<u8>) -> Result<Value, E> {
                Ok(Value::Str(value))
            }

            fn visit_unit<E>(self) -> Result<Value, E> {
                Ok(Value::Str(NIL.to_vec()))
            }

            fn visit_none<E>(self) -> Result<Value, E> {
                Ok(Value::Str(NIL.to_vec()))
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(Value::List(items))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut dict = Dict::new();
                while let Some((key, value)) = map.next_entry::<Value, Value>()? {
                    match key {
                        Value::Str(key) => {
                            dict.insert(key, value);
                        }
                        other => {
                            return Err(de::Error::custom(format!(
                                "dictionary keys must be byte strings, found {}",
                                other.kind()
                            )))
                        }
                    }
                }
                Ok(Value::Dict(dict))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

impl TryFrom<Value> for i64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Int(i) => Ok(i),
            other => Err(crate::Error::coercion(other.kind(), "i64")),
        }
    }
}

impl TryFrom<Value> for Vec<u8> {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Str(bytes) => Ok(bytes),
            other => Err(crate::Error::coercion(other.kind(), "bytes")),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Str(bytes) => String::from_utf8(bytes)
                .map_err(|_| crate::Error::coercion("non-UTF-8 byte string", "String")),
            other => Err(crate::Error::coercion(other.kind(), "String")),
        }
    }
}

impl TryFrom<Value> for Vec<Value> {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::List(items) => Ok(items),
            other => Err(crate::Error::coercion(other.kind(), "list")),
        }
    }
}

impl TryFrom<Value> for Dict {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Dict(dict) => Ok(dict),
            other => Err(crate::Error::coercion(other.kind(), "dictionary")),
        }
    }
}

macro_rules! from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Int(i64::from(value))
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value.into_bytes())
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Str(value.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Str(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<Dict> for Value {
    fn from(value: Dict) -> Self {
        Value::Dict(value)
    }
}
