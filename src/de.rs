//! Bencode deserialization.
//!
//! Decoding happens in two stages:
//!
//! 1. [`Deserializer`] pulls tokens from a [`Tokenizer`] and assembles them
//!    into a [`Value`] tree, validating structure along the way.
//! 2. [`ValueDeserializer`] coerces that tree into whatever type the caller
//!    asks for, converting between integers and their decimal text when the
//!    destination calls for it.
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_bencode::from_slice;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Track { author: String, length: String }
//!
//! // `length` is an integer on the wire but a string in the struct.
//! let track: Track = from_slice(b"d6:author5:Alice6:lengthi100000ee").unwrap();
//! assert_eq!(track, Track { author: "Alice".into(), length: "100000".into() });
//! ```
//!
//! ## Coercion Rules
//!
//! | Destination            | Accepted sources                                  |
//! |------------------------|---------------------------------------------------|
//! | integers               | integer (truncated with `as`), decimal text       |
//! | floats                 | integer (widened), decimal text                   |
//! | `String`, `char`       | UTF-8 byte string, integer (formatted)            |
//! | bytes                  | byte string                                       |
//! | `Option<T>`            | `3:nil` as `None`, anything else as `Some`        |
//! | sequences, tuples      | list                                              |
//! | maps, structs          | dictionary                                        |
//! | enums                  | variant name, or a one-entry dictionary           |
//!
//! Everything else fails with [`Error::Coercion`](crate::Error::Coercion).

use crate::token::{Delimiter, Token, Tokenizer};
use crate::value::NIL;
use crate::{DecodeOptions, Dict, Error, Result, Value};
use serde::de::{self, IntoDeserializer};
use std::io::Read;
use std::str::FromStr;

/// The bencode deserializer.
///
/// Reads one value at a time from a byte source. As a serde
/// [`Deserializer`](serde::Deserializer) it parses the next value and hands it
/// to [`ValueDeserializer`] for coercion.
pub struct Deserializer<R> {
    tokenizer: Tokenizer<R>,
    options: DecodeOptions,
}

impl<'a> Deserializer<&'a [u8]> {
    pub fn from_slice(input: &'a [u8]) -> Self {
        Deserializer::from_reader(input)
    }
}

impl<R: Read> Deserializer<R> {
    pub fn from_reader(reader: R) -> Self {
        Self::with_options(reader, DecodeOptions::default())
    }

    pub fn with_options(reader: R, options: DecodeOptions) -> Self {
        Deserializer {
            tokenizer: Tokenizer::with_options(reader, &options),
            options,
        }
    }

    /// Offset of the next unread byte.
    #[inline]
    pub fn position(&self) -> u64 {
        self.tokenizer.position()
    }

    /// Reads the next raw token without building a tree.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        self.tokenizer.next_token()
    }

    /// Parses the next complete value.
    ///
    /// Returns `Ok(None)` if the input is exhausted before the first token.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_bencode::{Deserializer, Value};
    ///
    /// let mut de = Deserializer::from_slice(b"i1e4:spam");
    /// assert_eq!(de.parse().unwrap(), Some(Value::Int(1)));
    /// assert_eq!(de.parse().unwrap(), Some(Value::from("spam")));
    /// assert_eq!(de.parse().unwrap(), None);
    /// ```
    pub fn parse(&mut self) -> Result<Option<Value>> {
        match self.tokenizer.next_token()? {
            Some(token) => self.parse_token(token, 0).map(Some),
            None => Ok(None),
        }
    }

    /// Checks that the input holds nothing after the value just parsed.
    pub fn end(&mut self) -> Result<()> {
        let offset = self.position();
        match self.tokenizer.next_token()? {
            None => Ok(()),
            Some(token) => Err(Error::syntax(
                offset,
                &format!("trailing {} after the top-level value", token.kind()),
            )),
        }
    }

    fn parse_token(&mut self, token: Token, depth: usize) -> Result<Value> {
        match token {
            Token::Integer(i) => Ok(Value::Int(i)),
            Token::ByteString(bytes) => Ok(Value::Str(bytes)),
            Token::Delimiter(Delimiter::ListOpen) => {
                self.collect(depth + 1, Delimiter::ListOpen).map(Value::List)
            }
            Token::Delimiter(Delimiter::DictOpen) => self.parse_dict(depth + 1).map(Value::Dict),
            Token::Delimiter(Delimiter::End) => Err(Error::syntax(
                self.position() - 1,
                "unexpected 'e' outside of a list or dictionary",
            )),
        }
    }

    /// Reads values up to the matching `e`.
    ///
    /// A dictionary cut off after an odd number of elements reports the odd
    /// count rather than the missing terminator.
    fn collect(&mut self, depth: usize, open: Delimiter) -> Result<Vec<Value>> {
        if depth > self.options.max_depth {
            return Err(Error::syntax(
                self.position() - 1,
                &format!("nesting deeper than {} levels", self.options.max_depth),
            ));
        }

        let mut items = Vec::new();
        loop {
            match self.tokenizer.next_token()? {
                None if open == Delimiter::DictOpen && items.len() % 2 != 0 => {
                    return Err(odd_dictionary(self.position(), items.len()))
                }
                None => {
                    let what = match open {
                        Delimiter::DictOpen => "dictionary",
                        _ => "list",
                    };
                    return Err(Error::unexpected_eof(
                        self.position(),
                        &format!("'e' closing {}", what),
                    ));
                }
                Some(Token::Delimiter(Delimiter::End)) => return Ok(items),
                Some(token) => items.push(self.parse_token(token, depth)?),
            }
        }
    }

    fn parse_dict(&mut self, depth: usize) -> Result<Dict> {
        let items = self.collect(depth, Delimiter::DictOpen)?;
        if items.len() % 2 != 0 {
            return Err(odd_dictionary(self.position(), items.len()));
        }

        let mut dict = Dict::with_capacity(items.len() / 2);
        let mut items = items.into_iter();
        while let (Some(key), Some(value)) = (items.next(), items.next()) {
            let key = match key {
                Value::Str(key) => key,
                other => {
                    return Err(Error::syntax(
                        self.position(),
                        &format!("dictionary key must be a byte string, found {}", other.kind()),
                    ))
                }
            };

            if dict.contains_key(&key) {
                if self.options.reject_duplicate_keys {
                    return Err(Error::syntax(
                        self.position(),
                        &format!(
                            "duplicate dictionary key {:?}",
                            String::from_utf8_lossy(&key)
                        ),
                    ));
                }
                tracing::trace!(
                    key = %String::from_utf8_lossy(&key),
                    "duplicate dictionary key, keeping the last value"
                );
            }
            dict.insert(key, value);
        }
        Ok(dict)
    }

    fn parse_value(&mut self) -> Result<ValueDeserializer> {
        match self.parse()? {
            Some(value) => Ok(ValueDeserializer::new(value)),
            None => Err(Error::unexpected_eof(self.position(), "a bencode value")),
        }
    }
}

fn odd_dictionary(offset: u64, count: usize) -> Error {
    Error::syntax(
        offset,
        &format!("odd number of elements ({}) in dictionary", count),
    )
}

macro_rules! delegate_to_value {
    ($($method:ident)*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                de::Deserializer::$method(self.parse_value()?, visitor)
            }
        )*
    };
}

impl<'de, 'a, R: Read> de::Deserializer<'de> for &'a mut Deserializer<R> {
    type Error = Error;

    delegate_to_value! {
        deserialize_any deserialize_bool
        deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64 deserialize_i128
        deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64 deserialize_u128
        deserialize_f32 deserialize_f64 deserialize_char deserialize_str deserialize_string
        deserialize_bytes deserialize_byte_buf deserialize_option deserialize_unit
        deserialize_seq deserialize_map deserialize_identifier deserialize_ignored_any
    }

    fn deserialize_unit_struct<V>(self, name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_unit_struct(self.parse_value()?, name, visitor)
    }

    fn deserialize_newtype_struct<V>(self, name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_newtype_struct(self.parse_value()?, name, visitor)
    }

    fn deserialize_tuple<V>(self, len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_tuple(self.parse_value()?, len, visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_tuple_struct(self.parse_value()?, name, len, visitor)
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_struct(self.parse_value()?, name, fields, visitor)
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_enum(self.parse_value()?, name, variants, visitor)
    }
}

/// Coerces a decoded [`Value`] into a typed destination.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
/// use serde_bencode::{Value, ValueDeserializer};
///
/// let n = u16::deserialize(ValueDeserializer::new(Value::from("8080"))).unwrap();
/// assert_eq!(n, 8080);
/// ```
pub struct ValueDeserializer {
    value: Value,
}

impl ValueDeserializer {
    pub fn new(value: Value) -> Self {
        ValueDeserializer { value }
    }

    fn mismatch(&self, to: &str) -> Error {
        Error::coercion(self.value.kind(), to)
    }

    fn into_text(self, to: &str) -> Result<String> {
        match self.value {
            Value::Str(bytes) => String::from_utf8(bytes)
                .map_err(|_| Error::coercion("non-UTF-8 byte string", to)),
            Value::Int(i) => Ok(i.to_string()),
            other => Err(Error::coercion(other.kind(), to)),
        }
    }
}

fn is_nil(value: &Value) -> bool {
    matches!(value, Value::Str(bytes) if bytes.as_slice() == NIL)
}

/// Parses decimal text held in a byte string.
fn parse_text<T>(bytes: &[u8], to: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let text =
        std::str::from_utf8(bytes).map_err(|_| Error::coercion("non-UTF-8 byte string", to))?;
    text.parse().map_err(|e| Error::parse(text, to, e))
}

macro_rules! deserialize_integer {
    ($($method:ident => $visit:ident, $ty:ty, $parse_as:ty;)*) => {
        $(
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                let n = match self.value {
                    Value::Int(i) => i as $ty,
                    Value::Str(ref bytes) => parse_text::<$parse_as>(bytes, stringify!($ty))? as $ty,
                    _ => return Err(self.mismatch(stringify!($ty))),
                };
                visitor.$visit(n)
            }
        )*
    };
}

macro_rules! deserialize_float {
    ($($method:ident => $visit:ident, $ty:ty;)*) => {
        $(
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                let n = match self.value {
                    Value::Int(i) => i as $ty,
                    Value::Str(ref bytes) => parse_text::<$ty>(bytes, stringify!($ty))?,
                    _ => return Err(self.mismatch(stringify!($ty))),
                };
                visitor.$visit(n)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Int(i) => visitor.visit_i64(i),
            Value::Str(bytes) => match String::from_utf8(bytes) {
                Ok(s) => visitor.visit_string(s),
                Err(e) => visitor.visit_byte_buf(e.into_bytes()),
            },
            Value::List(items) => visitor.visit_seq(SeqDeserializer::new(items)),
            Value::Dict(dict) => visitor.visit_map(MapDeserializer::new(dict)),
        }
    }

    fn deserialize_bool<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.mismatch("bool"))
    }

    deserialize_integer! {
        deserialize_i8 => visit_i8, i8, i64;
        deserialize_i16 => visit_i16, i16, i64;
        deserialize_i32 => visit_i32, i32, i64;
        deserialize_i64 => visit_i64, i64, i64;
        deserialize_i128 => visit_i128, i128, i128;
        deserialize_u8 => visit_u8, u8, u64;
        deserialize_u16 => visit_u16, u16, u64;
        deserialize_u32 => visit_u32, u32, u64;
        deserialize_u64 => visit_u64, u64, u64;
        deserialize_u128 => visit_u128, u128, u128;
    }

    deserialize_float! {
        deserialize_f32 => visit_f32, f32;
        deserialize_f64 => visit_f64, f64;
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_string(self.into_text("char")?)
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_string(self.into_text("string")?)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_byte_buf(visitor)
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Str(bytes) => visitor.visit_byte_buf(bytes),
            _ => Err(self.mismatch("bytes")),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if is_nil(&self.value) {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if is_nil(&self.value) {
            visitor.visit_unit()
        } else {
            Err(self.mismatch("unit"))
        }
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::List(items) => visitor.visit_seq(SeqDeserializer::new(items)),
            _ => Err(self.mismatch("sequence")),
        }
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Dict(dict) => visitor.visit_map(MapDeserializer::new(dict)),
            _ => Err(self.mismatch("map")),
        }
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Dict(dict) => visitor.visit_map(MapDeserializer::new(dict)),
            _ => Err(self.mismatch(name)),
        }
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Str(variant) => visitor.visit_enum(EnumDeserializer::new(variant, None)),
            Value::Dict(dict) if dict.len() == 1 => {
                let mut entries = dict.into_iter();
                match entries.next() {
                    Some((variant, value)) => {
                        visitor.visit_enum(EnumDeserializer::new(variant, Some(value)))
                    }
                    None => Err(Error::coercion("empty dictionary", name)),
                }
            }
            _ => Err(self.mismatch(name)),
        }
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Str(bytes) => match String::from_utf8(bytes) {
                Ok(s) => visitor.visit_string(s),
                Err(e) => visitor.visit_byte_buf(e.into_bytes()),
            },
            _ => Err(self.mismatch("identifier")),
        }
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

impl<'de> IntoDeserializer<'de, Error> for Value {
    type Deserializer = ValueDeserializer;

    fn into_deserializer(self) -> ValueDeserializer {
        ValueDeserializer::new(self)
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
    index: usize,
}

impl SeqDeserializer {
    fn new(vec: Vec<Value>) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
            index: 0,
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => {
                let index = self.index;
                self.index += 1;
                seed.deserialize(ValueDeserializer::new(value))
                    .map(Some)
                    .map_err(|e| Error::element(index, e))
            }
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct MapDeserializer {
    iter: indexmap::map::IntoIter<Vec<u8>, Value>,
    value: Option<(String, Value)>,
}

impl MapDeserializer {
    fn new(dict: Dict) -> Self {
        MapDeserializer {
            iter: dict.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                let name = String::from_utf8_lossy(&key).into_owned();
                let key = seed
                    .deserialize(ValueDeserializer::new(Value::Str(key)))
                    .map_err(|e| Error::field(&name, e))?;
                self.value = Some((name, value));
                Ok(Some(key))
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some((name, value)) => seed
                .deserialize(ValueDeserializer::new(value))
                .map_err(|e| Error::field(&name, e)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct EnumDeserializer {
    variant: Vec<u8>,
    value: Option<Value>,
}

impl EnumDeserializer {
    fn new(variant: Vec<u8>, value: Option<Value>) -> Self {
        EnumDeserializer { variant, value }
    }
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(ValueDeserializer::new(Value::Str(self.variant)))?;
        Ok((variant, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: Option<Value>,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            None => Ok(()),
            Some(ref value) if is_nil(value) => Ok(()),
            Some(other) => Err(Error::coercion(other.kind(), "unit variant")),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.value {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::coercion("byte string", "newtype variant")),
        }
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::List(items)) => visitor.visit_seq(SeqDeserializer::new(items)),
            Some(other) => Err(Error::coercion(other.kind(), "tuple variant")),
            None => Err(Error::coercion("byte string", "tuple variant")),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::Dict(dict)) => visitor.visit_map(MapDeserializer::new(dict)),
            Some(other) => Err(Error::coercion(other.kind(), "struct variant")),
            None => Err(Error::coercion("byte string", "struct variant")),
        }
    }
}
