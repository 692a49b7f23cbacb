//! Ordered map type for Strata documents.
//!
//! This module provides [`StrataMap`], a wrapper around [`IndexMap`] that
//! maintains insertion order for map entries. Field order matters here: a
//! document read and written back keeps its entries in the order they
//! appeared.
//!
//! ## Why IndexMap?
//!
//! Strata uses `IndexMap` instead of `HashMap` to ensure:
//!
//! - **Deterministic output**: entries serialize in a consistent order
//! - **Iteration order**: entries are iterated in insertion order
//! - **Compatibility**: easier testing and debugging with predictable output
//!
//! ## Examples
//!
//! ```rust
//! use strata::{StrataMap, Value};
//!
//! let mut map = StrataMap::new();
//! map.insert("name".to_string(), Value::from("Alice"));
//! map.insert("age".to_string(), Value::from(30));
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get("name").and_then(|v| v.as_scalar_text()), Some("Alice"));
//! ```

use indexmap::IndexMap;
use std::collections::HashMap;

/// An ordered map of string keys to Strata values.
///
/// This is a thin wrapper around [`IndexMap`] that maintains insertion order,
/// which is important for deterministic serialization.
///
/// Inserting an existing key overwrites the value and keeps the key's
/// original position.
///
/// # Examples
///
/// ```rust
/// use strata::{StrataMap, Value};
///
/// let mut map = StrataMap::new();
/// map.insert("first".to_string(), Value::from(1));
/// map.insert("second".to_string(), Value::from(2));
///
/// // Iteration maintains insertion order
/// let keys: Vec<_> = map.keys().cloned().collect();
/// assert_eq!(keys, vec!["first", "second"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrataMap(IndexMap<String, crate::Value>);

impl StrataMap {
    /// Creates an empty `StrataMap`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata::StrataMap;
    ///
    /// let map = StrataMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        StrataMap(IndexMap::new())
    }

    /// Creates an empty `StrataMap` with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        StrataMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map already contained this key, the old value is returned and
    /// the key keeps its original position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata::{StrataMap, Value};
    ///
    /// let mut map = StrataMap::new();
    /// assert!(map.insert("key".to_string(), Value::from(42)).is_none());
    /// assert!(map.insert("key".to_string(), Value::from(43)).is_some());
    /// ```
    pub fn insert(&mut self, key: String, value: crate::Value) -> Option<crate::Value> {
        self.0.insert(key, value)
    }

    /// Returns a reference to the value corresponding to the key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&crate::Value> {
        self.0.get(key)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut crate::Value> {
        self.0.get_mut(key)
    }

    /// Returns `true` if the map contains the key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the number of entries in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the keys of the map, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, crate::Value> {
        self.0.keys()
    }

    /// Returns an iterator over the values of the map, in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, crate::Value> {
        self.0.values()
    }

    /// Returns a mutable iterator over the values of the map, in insertion
    /// order.
    pub fn values_mut(&mut self) -> indexmap::map::ValuesMut<'_, String, crate::Value> {
        self.0.values_mut()
    }

    /// Returns an iterator over the key-value pairs of the map, in insertion
    /// order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, crate::Value> {
        self.0.iter()
    }
}

impl From<HashMap<String, crate::Value>> for StrataMap {
    fn from(map: HashMap<String, crate::Value>) -> Self {
        StrataMap(map.into_iter().collect())
    }
}

impl From<StrataMap> for HashMap<String, crate::Value> {
    fn from(map: StrataMap) -> Self {
        map.0.into_iter().collect()
    }
}

impl IntoIterator for StrataMap {
    type Item = (String, crate::Value);
    type IntoIter = indexmap::map::IntoIter<String, crate::Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a StrataMap {
    type Item = (&'a String, &'a crate::Value);
    type IntoIter = indexmap::map::Iter<'a, String, crate::Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, crate::Value)> for StrataMap {
    fn from_iter<T: IntoIterator<Item = (String, crate::Value)>>(iter: T) -> Self {
        StrataMap(IndexMap::from_iter(iter))
    }
}
