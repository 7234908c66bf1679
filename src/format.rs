//! Bencode wire format
//!
//! This module documents the encoding as read and written by this library.
//!
//! # Overview
//!
//! Bencode has four kinds of value. Every value is self-delimiting, so a
//! decoder never needs to look ahead more than one byte, and byte strings are
//! length-prefixed, so they may hold arbitrary binary data.
//!
//! | Kind | Syntax | Example | Decoded |
//! |------|--------|---------|---------|
//! | Byte string | `<length>:<bytes>` | `4:spam` | `"spam"` |
//! | Integer | `i<decimal>e` | `i-42e` | `-42` |
//! | List | `l<values>e` | `l4:spami42ee` | `["spam", 42]` |
//! | Dictionary | `d<key><value>...e` | `d3:bar4:spam3:fooi42ee` | `{"bar": "spam", "foo": 42}` |
//!
//! # Byte Strings
//!
//! The length is a non-negative decimal count of the bytes that follow the
//! colon. Nothing terminates the data, so `3:l:e` is the string `l:e`.
//! Input that ends before the declared count is reached, including right
//! after the colon, is a syntax error ("short read").
//!
//! # Integers
//!
//! Integers are signed decimal numbers between `i` and `e`. Values must fit
//! in an `i64` when decoded. The encoder writes wider Rust integers (`u64`,
//! `i128`, `u128`) as-is.
//!
//! By default the decoder accepts `i007e` and `i-0e`, as most deployed
//! decoders do. [`DecodeOptions::strict`](crate::DecodeOptions::strict)
//! rejects them, along with zero-padded byte string lengths like `04:spam`.
//!
//! # Lists and Dictionaries
//!
//! Lists hold any values in order. Dictionaries hold alternating keys and
//! values; keys must be byte strings, and a dictionary body with an odd
//! number of elements is a syntax error.
//!
//! The canonical encoding sorts dictionary keys in ascending order of their
//! raw bytes (not by Unicode collation):
//!
//! ```text
//! d1:Bi2e1:ai3e1:bi1ee
//! ```
//!
//! The decoder does not require sorted keys. If a key repeats, the last value
//! wins unless [`DecodeOptions::reject_duplicate_keys`](crate::DecodeOptions)
//! is set.
//!
//! # Values Without a Wire Type
//!
//! Bencode has no null, boolean or float. This library maps them as follows:
//!
//! - `None`, `()` and unit structs are written as the byte string `3:nil`,
//!   and `3:nil` decodes back to `None` for `Option` destinations
//! - floats are written as fixed-point text (`8:1.500000`) with
//!   [`EncodeOptions::float_precision`](crate::EncodeOptions) digits
//! - `bool` is rejected with [`Error::UnsupportedType`](crate::Error::UnsupportedType)
//!
//! # Enums
//!
//! Unit variants are written as their name. Newtype, tuple and struct
//! variants are written as a dictionary with a single entry mapping the
//! variant name to its payload:
//!
//! ```text
//! 5:Empty
//! d6:Circlei3ee
//! d4:Rectd1:hi1e1:wi2eee
//! ```
//!
//! # Example
//!
//! A BitTorrent metainfo file is a dictionary:
//!
//! ```text
//! d8:announce31:http://tracker.example/announce4:infod6:lengthi1024e4:name8:file.txtee
//! ```

// Documentation only.
