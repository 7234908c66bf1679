//! Bencode serialization.
//!
//! This module provides two [`serde::Serializer`] implementations:
//!
//! - [`Serializer`] streams canonical bencode into any [`io::Write`]
//! - [`ValueSerializer`] builds a [`Value`] tree instead of bytes
//!
//! ## Type Mapping
//!
//! | Rust                              | Wire form                                  |
//! |-----------------------------------|--------------------------------------------|
//! | integers                          | `i<decimal>e`                              |
//! | `str`, `char`, bytes              | `<len>:<bytes>`                            |
//! | `f32`, `f64`                      | fixed-point text as a byte string          |
//! | sequences, tuples                 | `l ... e`                                  |
//! | maps, structs                     | `d ... e`, keys sorted by raw bytes        |
//! | `None`, `()`, unit structs        | `3:nil`                                    |
//! | unit variant                      | the variant name as a byte string          |
//! | other variants                    | `d<variant name><payload>e`                |
//! | `bool`                            | unsupported                                |
//!
//! ## Direct Serializer Usage
//!
//! ```rust
//! use serde::Serialize;
//! use serde_bencode::Serializer;
//!
//! let mut serializer = Serializer::new(Vec::new());
//! vec![1, 2, 3].serialize(&mut serializer).unwrap();
//! assert_eq!(serializer.into_inner(), b"li1ei2ei3ee");
//! ```

use crate::value::NIL;
use crate::{Dict, EncodeOptions, Error, Result, Value};
use serde::{ser, Serialize};
use std::fmt::Display;
use std::io::Write;

/// The bencode serializer.
///
/// Writes each value to the underlying writer as soon as it is known. Only
/// dictionary entries are staged, because they must be sorted before any of
/// them can be written.
pub struct Serializer<W> {
    writer: W,
    options: EncodeOptions,
}

impl<W: Write> Serializer<W> {
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, EncodeOptions::default())
    }

    pub fn with_options(writer: W, options: EncodeOptions) -> Self {
        Serializer { writer, options }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_integer<I: Display>(&mut self, v: I) -> Result<()> {
        write!(self.writer, "i{}e", v)?;
        Ok(())
    }

    fn write_bytes(&mut self, v: &[u8]) -> Result<()> {
        write!(self.writer, "{}:", v.len())?;
        self.writer.write_all(v)?;
        Ok(())
    }

    fn write_float(&mut self, v: f64) -> Result<()> {
        let text = format!("{:.*}", self.options.float_precision, v);
        self.write_bytes(text.as_bytes())
    }

    fn write_raw(&mut self, v: &[u8]) -> Result<()> {
        self.writer.write_all(v)?;
        Ok(())
    }

    /// Encodes `value` into a fresh buffer using the same options.
    fn encode_nested<T>(&self, value: &T) -> Result<Vec<u8>>
    where
        T: ?Sized + Serialize,
    {
        let mut nested = Serializer::with_options(Vec::new(), self.options);
        value.serialize(&mut nested)?;
        Ok(nested.into_inner())
    }
}

impl<'a, W: Write> ser::Serializer for &'a mut Serializer<W> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = SeqSerializer<'a, W>;
    type SerializeTuple = SeqSerializer<'a, W>;
    type SerializeTupleStruct = SeqSerializer<'a, W>;
    type SerializeTupleVariant = SeqSerializer<'a, W>;
    type SerializeMap = MapSerializer<'a, W>;
    type SerializeStruct = MapSerializer<'a, W>;
    type SerializeStructVariant = MapSerializer<'a, W>;

    fn serialize_bool(self, _v: bool) -> Result<()> {
        Err(Error::unsupported_type("bool"))
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.write_integer(v)
    }

    fn serialize_i16(self, v: i16) -> Result<()> {
        self.write_integer(v)
    }

    fn serialize_i32(self, v: i32) -> Result<()> {
        self.write_integer(v)
    }

    fn serialize_i64(self, v: i64) -> Result<()> {
        self.write_integer(v)
    }

    fn serialize_i128(self, v: i128) -> Result<()> {
        self.write_integer(v)
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.write_integer(v)
    }

    fn serialize_u16(self, v: u16) -> Result<()> {
        self.write_integer(v)
    }

    fn serialize_u32(self, v: u32) -> Result<()> {
        self.write_integer(v)
    }

    fn serialize_u64(self, v: u64) -> Result<()> {
        self.write_integer(v)
    }

    fn serialize_u128(self, v: u128) -> Result<()> {
        self.write_integer(v)
    }

    fn serialize_f32(self, v: f32) -> Result<()> {
        self.write_float(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<()> {
        self.write_float(v)
    }

    fn serialize_char(self, v: char) -> Result<()> {
        let mut buf = [0u8; 4];
        self.write_bytes(v.encode_utf8(&mut buf).as_bytes())
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        self.write_bytes(v.as_bytes())
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        self.write_bytes(v)
    }

    fn serialize_none(self) -> Result<()> {
        self.write_bytes(NIL)
    }

    fn serialize_some<T>(self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        self.write_bytes(NIL)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        self.write_bytes(NIL)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        self.write_bytes(variant.as_bytes())
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.write_raw(b"d")?;
        self.write_bytes(variant.as_bytes())?;
        value.serialize(&mut *self)?;
        self.write_raw(b"e")
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        self.write_raw(b"l")?;
        Ok(SeqSerializer::new(self, b"e"))
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        self.write_raw(b"d")?;
        self.write_bytes(variant.as_bytes())?;
        self.write_raw(b"l")?;
        Ok(SeqSerializer::new(self, b"ee"))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(MapSerializer::new(self, None, len.unwrap_or(0)))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        Ok(MapSerializer::new(self, None, len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Ok(MapSerializer::new(self, Some(variant), len))
    }
}

/// Writes list elements straight through, then the closing trailer.
pub struct SeqSerializer<'a, W> {
    ser: &'a mut Serializer<W>,
    trailer: &'static [u8],
}

impl<'a, W: Write> SeqSerializer<'a, W> {
    fn new(ser: &'a mut Serializer<W>, trailer: &'static [u8]) -> Self {
        SeqSerializer { ser, trailer }
    }

    fn element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(&mut *self.ser)
    }

    fn finish(self) -> Result<()> {
        self.ser.write_raw(self.trailer)
    }
}

impl<'a, W: Write> ser::SerializeSeq for SeqSerializer<'a, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl<'a, W: Write> ser::SerializeTuple for SeqSerializer<'a, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl<'a, W: Write> ser::SerializeTupleStruct for SeqSerializer<'a, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl<'a, W: Write> ser::SerializeTupleVariant for SeqSerializer<'a, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

/// Collects encoded entries, sorts them by key and writes the dictionary on `end`.
pub struct MapSerializer<'a, W> {
    ser: &'a mut Serializer<W>,
    variant: Option<&'static str>,
    entries: Vec<(Vec<u8>, Vec<u8>)>,
    pending_key: Option<Vec<u8>>,
}

impl<'a, W: Write> MapSerializer<'a, W> {
    fn new(ser: &'a mut Serializer<W>, variant: Option<&'static str>, len: usize) -> Self {
        MapSerializer {
            ser,
            variant,
            entries: Vec::with_capacity(len),
            pending_key: None,
        }
    }

    fn entry<T>(&mut self, key: Vec<u8>, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let encoded = self.ser.encode_nested(value)?;
        self.entries.push((key, encoded));
        Ok(())
    }

    fn finish(mut self) -> Result<()> {
        self.entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        if let Some(pair) = self.entries.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            return Err(Error::custom(format!(
                "duplicate dictionary key {:?}",
                String::from_utf8_lossy(&pair[0].0)
            )));
        }

        if let Some(variant) = self.variant {
            self.ser.write_raw(b"d")?;
            self.ser.write_bytes(variant.as_bytes())?;
        }
        self.ser.write_raw(b"d")?;
        for (key, value) in &self.entries {
            self.ser.write_bytes(key)?;
            self.ser.write_raw(value)?;
        }
        self.ser.write_raw(b"e")?;
        if self.variant.is_some() {
            self.ser.write_raw(b"e")?;
        }
        Ok(())
    }
}

impl<'a, W: Write> ser::SerializeMap for MapSerializer<'a, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.pending_key = Some(dict_key(key, self.ser.options)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.entry(key, value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl<'a, W: Write> ser::SerializeStruct for MapSerializer<'a, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.entry(key.as_bytes().to_vec(), value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl<'a, W: Write> ser::SerializeStructVariant for MapSerializer<'a, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.entry(key.as_bytes().to_vec(), value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

/// Turns a map key into dictionary key bytes.
///
/// Strings and bytes are used as-is; integer keys (and anything that
/// serializes as one) are written in decimal.
fn dict_key<T>(key: &T, options: EncodeOptions) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    match key.serialize(ValueSerializer::with_options(options))? {
        Value::Str(bytes) => Ok(bytes),
        Value::Int(i) => Ok(i.to_string().into_bytes()),
        other => Err(Error::unsupported_type(&format!(
            "{} as dictionary key",
            other.kind()
        ))),
    }
}

/// Serializer that produces a [`Value`] tree.
///
/// Follows the same mapping as [`Serializer`], except that integers outside
/// the `i64` range are rejected since [`Value::Int`] cannot hold them.
#[derive(Clone, Copy, Debug, Default)]
pub struct ValueSerializer {
    options: EncodeOptions,
}

impl ValueSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EncodeOptions) -> Self {
        ValueSerializer { options }
    }

    fn integer<I>(v: I) -> Result<Value>
    where
        I: Copy + Display + TryInto<i64>,
    {
        v.try_into()
            .map(Value::Int)
            .map_err(|_| Error::unsupported_type(&format!("integer {} outside the i64 range", v)))
    }
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeVec;
    type SerializeMap = SerializeDict;
    type SerializeStruct = SerializeDict;
    type SerializeStructVariant = SerializeDict;

    fn serialize_bool(self, _v: bool) -> Result<Value> {
        Err(Error::unsupported_type("bool"))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::Int(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value> {
        Self::integer(v)
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Self::integer(v)
    }

    fn serialize_u128(self, v: u128) -> Result<Value> {
        Self::integer(v)
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::Str(
            format!("{:.*}", self.options.float_precision, v).into_bytes(),
        ))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::from(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::from(NIL))
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::from(NIL))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::from(NIL))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::from(variant))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        Ok(wrap_variant(Some(variant), value.serialize(self)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::new(self, None, len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(self, None, len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(self, None, len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeVec> {
        Ok(SerializeVec::new(self, Some(variant), len))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeDict> {
        Ok(SerializeDict::new(self, None, len.unwrap_or(0)))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<SerializeDict> {
        Ok(SerializeDict::new(self, None, len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeDict> {
        Ok(SerializeDict::new(self, Some(variant), len))
    }
}

fn wrap_variant(variant: Option<&'static str>, value: Value) -> Value {
    match variant {
        Some(name) => {
            let mut outer = Dict::with_capacity(1);
            outer.insert(name, value);
            Value::Dict(outer)
        }
        None => value,
    }
}

pub struct SerializeVec {
    ser: ValueSerializer,
    variant: Option<&'static str>,
    vec: Vec<Value>,
}

impl SerializeVec {
    fn new(ser: ValueSerializer, variant: Option<&'static str>, len: usize) -> Self {
        SerializeVec {
            ser,
            variant,
            vec: Vec::with_capacity(len),
        }
    }

    fn push<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(value.serialize(self.ser)?);
        Ok(())
    }

    fn finish(self) -> Result<Value> {
        Ok(wrap_variant(self.variant, Value::List(self.vec)))
    }
}

pub struct SerializeDict {
    ser: ValueSerializer,
    variant: Option<&'static str>,
    dict: Dict,
    pending_key: Option<Vec<u8>>,
}

impl SerializeDict {
    fn new(ser: ValueSerializer, variant: Option<&'static str>, len: usize) -> Self {
        SerializeDict {
            ser,
            variant,
            dict: Dict::with_capacity(len),
            pending_key: None,
        }
    }

    fn entry<T>(&mut self, key: Vec<u8>, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        if self.dict.contains_key(&key) {
            return Err(Error::custom(format!(
                "duplicate dictionary key {:?}",
                String::from_utf8_lossy(&key)
            )));
        }
        let value = value.serialize(self.ser)?;
        self.dict.insert(key, value);
        Ok(())
    }

    fn finish(self) -> Result<Value> {
        Ok(wrap_variant(self.variant, Value::Dict(self.dict)))
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        self.finish()
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        self.finish()
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        self.finish()
    }
}

impl ser::SerializeTupleVariant for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        self.finish()
    }
}

impl ser::SerializeMap for SerializeDict {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.pending_key = Some(dict_key(key, self.ser.options)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.entry(key, value)
    }

    fn end(self) -> Result<Value> {
        self.finish()
    }
}

impl ser::SerializeStruct for SerializeDict {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.entry(key.as_bytes().to_vec(), value)
    }

    fn end(self) -> Result<Value> {
        self.finish()
    }
}

impl ser::SerializeStructVariant for SerializeDict {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.entry(key.as_bytes().to_vec(), value)
    }

    fn end(self) -> Result<Value> {
        self.finish()
    }
}
