//! Dictionary type for bencode values.
//!
//! [`Dict`] wraps an [`IndexMap`] keyed by raw byte strings. It remembers the
//! order in which keys were inserted (for a decoded dictionary, the order they
//! appeared on the wire), which helps when inspecting non-canonical input.
//! That order carries no meaning otherwise:
//!
//! - equality ignores it, so `{"a", "b"}` equals `{"b", "a"}`
//! - the encoder always writes keys in ascending byte order
//!
//! ## Examples
//!
//! ```rust
//! use serde_bencode::{Dict, Value};
//!
//! let mut dict = Dict::new();
//! dict.insert("foo", Value::from(42));
//! dict.insert("bar", Value::from("spam"));
//!
//! let keys: Vec<&[u8]> = dict.canonical_iter().map(|(k, _)| k.as_slice()).collect();
//! assert_eq!(keys, vec![&b"bar"[..], &b"foo"[..]]);
//! ```

use crate::Value;
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};

/// A mapping from byte-string keys to bencode values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dict(IndexMap<Vec<u8>, Value>);

impl Dict {
    #[must_use]
    pub fn new() -> Self {
        Dict(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Dict(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair, returning the previous value for the key.
    ///
    /// A replaced key keeps its original position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_bencode::{Dict, Value};
    ///
    /// let mut dict = Dict::new();
    /// assert!(dict.insert("key", Value::from(1)).is_none());
    /// assert_eq!(dict.insert("key", Value::from(2)), Some(Value::from(1)));
    /// ```
    pub fn insert<K: Into<Vec<u8>>>(&mut self, key: K, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Returns the value stored under `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_bencode::{Dict, Value};
    ///
    /// let mut dict = Dict::new();
    /// dict.insert("spam", Value::from("eggs"));
    /// assert_eq!(dict.get("spam").and_then(Value::as_str), Some("eggs"));
    /// assert_eq!(dict.get(b"spam"), dict.get("spam"));
    /// ```
    #[must_use]
    pub fn get<K: AsRef<[u8]>>(&self, key: K) -> Option<&Value> {
        self.0.get(key.as_ref())
    }

    pub fn get_mut<K: AsRef<[u8]>>(&mut self, key: K) -> Option<&mut Value> {
        self.0.get_mut(key.as_ref())
    }

    #[must_use]
    pub fn contains_key<K: AsRef<[u8]>>(&self, key: K) -> bool {
        self.0.contains_key(key.as_ref())
    }

    /// Removes `key`, preserving the order of the remaining entries.
    pub fn remove<K: AsRef<[u8]>>(&mut self, key: K) -> Option<Value> {
        self.0.shift_remove(key.as_ref())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, Vec<u8>, Value> {
        self.0.keys()
    }

    /// Iterates over values in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, Vec<u8>, Value> {
        self.0.values()
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, Vec<u8>, Value> {
        self.0.iter()
    }

    /// Iterates over entries in canonical order: ascending by raw key bytes.
    pub fn canonical_iter(&self) -> impl Iterator<Item = (&Vec<u8>, &Value)> {
        let mut entries: Vec<_> = self.0.iter().collect();
        entries.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));
        entries.into_iter()
    }

    /// Reorders the entries into canonical order in place.
    pub fn sort_keys(&mut self) {
        self.0.sort_keys();
    }
}

impl From<HashMap<Vec<u8>, Value>> for Dict {
    fn from(map: HashMap<Vec<u8>, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl From<BTreeMap<Vec<u8>, Value>> for Dict {
    fn from(map: BTreeMap<Vec<u8>, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl From<Dict> for BTreeMap<Vec<u8>, Value> {
    fn from(dict: Dict) -> Self {
        dict.0.into_iter().collect()
    }
}

impl IntoIterator for Dict {
    type Item = (Vec<u8>, Value);
    type IntoIter = indexmap::map::IntoIter<Vec<u8>, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Dict {
    type Item = (&'a Vec<u8>, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, Vec<u8>, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K: Into<Vec<u8>>> FromIterator<(K, Value)> for Dict {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        Dict(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_insertion_order() {
        let a: Dict = vec![("foo", Value::from(1)), ("bar", Value::from(2))]
            .into_iter()
            .collect();
        let b: Dict = vec![("bar", Value::from(2)), ("foo", Value::from(1))]
            .into_iter()
            .collect();
        assert_eq!(a, b);
        assert_ne!(a.keys().next(), b.keys().next());
    }

    #[test]
    fn test_canonical_iter_sorts_by_raw_bytes() {
        let mut dict = Dict::new();
        dict.insert("b", Value::from(1));
        dict.insert("B", Value::from(2));
        dict.insert("a", Value::from(3));
        dict.insert(vec![0xffu8], Value::from(4));

        let keys: Vec<Vec<u8>> = dict.canonical_iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(
            keys,
            vec![b"B".to_vec(), b"a".to_vec(), b"b".to_vec(), vec![0xff]]
        );
    }

    #[test]
    fn test_sort_keys() {
        let mut dict: Dict = vec![("zebra", Value::from(1)), ("apple", Value::from(2))]
            .into_iter()
            .collect();
        dict.sort_keys();
        assert_eq!(dict.keys().next().map(Vec::as_slice), Some(&b"apple"[..]));
    }

    #[test]
    fn test_remove_and_contains() {
        let mut dict = Dict::new();
        dict.insert("spam", Value::from("eggs"));
        assert!(dict.contains_key("spam"));
        assert_eq!(dict.remove("spam"), Some(Value::from("eggs")));
        assert!(dict.is_empty());
    }
}
