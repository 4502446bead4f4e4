use core::slice;
use smallvec::SmallVec;
use std::collections::btree_map::BTreeMap;

/// A multi map that relates a `K` to a *set* of `V`s.
#[derive(Debug)]
pub struct MultiMap<K, V> {
    /// The map is backed by a `BTreeMap` for relating keys to values.
    ///
    /// A value set is stored as a `SmallVec`.
    /// This is an optimization over a `Vec<_>`
    /// as we allow a single element to be stored inline
    /// to improve performance for the common case of one element.
    map: BTreeMap<K, SmallVec<[V; 1]>>,
}

impl<K, V> Default for MultiMap<K, V> {
    fn default() -> Self {
        Self { map: BTreeMap::new() }
    }
}

impl<K: Ord, V: Eq> MultiMap<K, V> {
    /// Inserts the relation `key -> val` to this multimap.
    ///
    /// The map does not check whether `key -> val` was already in the map.
    pub fn insert(&mut self, key: K, val: V) {
        self.map.entry(key).or_default().push(val);
    }

    /// Deletes `key -> val` from this multimap.
    ///
    /// Returns whether `key -> val` was present.
    pub fn delete(&mut self, key: &K, val: &V) -> bool {
        let Some(vset) = self.map.get_mut(key) else {
            return false;
        };
        // The `vset` is not sorted, so we have to do a linear scan first.
        let Some(idx) = vset.iter().position(|v| v == val) else {
            return false;
        };
        vset.swap_remove(idx);
        if vset.is_empty() {
            self.map.remove(key);
        }
        true
    }

    /// Returns an iterator over all the `V`s related to `key`.
    pub fn values_in_point(&self, key: &K) -> slice::Iter<'_, V> {
        self.map.get(key).map(|vset| vset.as_slice()).unwrap_or_default().iter()
    }

    /// Returns the number of unique keys in the multimap.
    pub fn num_keys(&self) -> usize {
        self.map.len()
    }

    /// Returns the total number of entries in the multimap.
    pub fn len(&self) -> usize {
        self.map.values().map(|vset| vset.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_drops_empty_keys() {
        let mut map = MultiMap::default();
        map.insert(1, 'a');
        map.insert(1, 'b');
        assert_eq!(map.num_keys(), 1);
        assert_eq!(map.len(), 2);

        assert!(map.delete(&1, &'a'));
        assert!(!map.delete(&1, &'a'));
        assert_eq!(map.values_in_point(&1).collect::<Vec<_>>(), [&'b']);

        assert!(map.delete(&1, &'b'));
        assert!(map.is_empty());
        assert_eq!(map.values_in_point(&1).next(), None);
    }
}
