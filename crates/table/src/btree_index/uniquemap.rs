use core::option::IntoIter;
use std::collections::btree_map::{BTreeMap, Entry};

/// A "unique map" that relates a `K` to a `V`.
///
/// (This is just a `BTreeMap<K, V>`) with a slightly modified interface.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct UniqueMap<K, V> {
    /// The map is backed by a `BTreeMap` for relating a key to a value.
    map: BTreeMap<K, V>,
}

impl<K, V> Default for UniqueMap<K, V> {
    fn default() -> Self {
        Self { map: BTreeMap::new() }
    }
}

impl<K: Ord, V: Eq> UniqueMap<K, V> {
    /// Inserts the relation `key -> val` to this map.
    ///
    /// If `key` was already present in the map, does not add an association with `val`.
    /// Returns the existing associated value instead.
    pub fn insert(&mut self, key: K, val: V) -> Result<(), &V> {
        match self.map.entry(key) {
            Entry::Vacant(e) => {
                e.insert(val);
                Ok(())
            }
            Entry::Occupied(e) => Err(e.into_mut()),
        }
    }

    /// Deletes `key -> val` from this map.
    ///
    /// Returns whether `key -> val` was present.
    /// A `key` bound to some other value is left untouched.
    pub fn delete(&mut self, key: &K, val: &V) -> bool {
        match self.map.get(key) {
            Some(v) if v == val => self.map.remove(key).is_some(),
            _ => false,
        }
    }

    /// Returns an iterator over the map that yields the potential `V` of the `key: &K`.
    pub fn values_in_point(&self, key: &K) -> IntoIter<&V> {
        self.map.get(key).into_iter()
    }

    /// Returns the total number of entries in the map.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
