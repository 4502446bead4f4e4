use super::indexes::RowPointer;
use multimap::MultiMap;
use partdb_primitives::{ColList, IndexId};
use partdb_sats::{product_value::InvalidFieldError, AlgebraicValue, ProductValue};
use uniquemap::UniqueMap;

mod multimap;
mod uniquemap;

/// An index key storing a mapping to rows via `RowPointer`s
/// as well as the value the rows have for the relevant [`ColId`](partdb_primitives::ColId)s.
///
/// ## Index Key Composition
///
/// `IndexKey` uses an [`AlgebraicValue`] to optimize for the common case of *single columns* as key.
/// Multiple columns are keyed by an `AlgebraicValue::Product` of their values.
///
/// See [`ProductValue::project`] for the logic.
type IndexKey = AlgebraicValue;

enum IdxImpl {
    Unique(UniqueMap<IndexKey, RowPointer>),
    Multi(MultiMap<IndexKey, RowPointer>),
}

/// A B-Tree based index on a set of columns of a table.
///
/// Keys with a `NULL` component follow SQL semantics:
/// `NULL` is never equal to anything, itself included.
/// Such keys are kept apart from the ordered keys,
/// never conflict under a unique constraint, and are never found by [`BTreeIndex::seek_point`].
pub struct BTreeIndex {
    /// The ID of this index.
    pub(crate) index_id: IndexId,
    /// Whether this index is also a unique constraint.
    pub(crate) is_unique: bool,
    /// The columns, in key order, that this index is built on.
    pub(crate) indexed_columns: ColList,
    /// The index name, used for reporting unique constraint violations.
    pub(crate) name: Box<str>,
    /// The actual index.
    idx: IdxImpl,
    /// Rows whose key has a `NULL` component.
    null_keyed: MultiMap<IndexKey, RowPointer>,
}

impl BTreeIndex {
    /// Returns a new possibly unique index, with `index_id` for a set of columns.
    pub fn new(index_id: IndexId, indexed_columns: ColList, is_unique: bool, name: impl Into<Box<str>>) -> Self {
        let idx = if is_unique {
            IdxImpl::Unique(UniqueMap::default())
        } else {
            IdxImpl::Multi(MultiMap::default())
        };
        Self {
            index_id,
            is_unique,
            indexed_columns,
            name: name.into(),
            idx,
            null_keyed: MultiMap::default(),
        }
    }

    pub fn index_id(&self) -> IndexId {
        self.index_id
    }

    pub fn is_unique(&self) -> bool {
        self.is_unique
    }

    pub fn indexed_columns(&self) -> &ColList {
        &self.indexed_columns
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Extracts from `row` the key of `row` in this index.
    pub fn key_of(&self, row: &ProductValue) -> Result<IndexKey, InvalidFieldError> {
        row.project(&self.indexed_columns)
    }

    /// Inserts `ptr` with the key `key` into this index.
    ///
    /// If this index is unique and already binds `key` to a row,
    /// nothing is inserted and the pointer to that row is returned instead.
    pub fn insert(&mut self, key: IndexKey, ptr: RowPointer) -> Result<(), RowPointer> {
        if key.has_null() {
            self.null_keyed.insert(key, ptr);
            return Ok(());
        }
        match &mut self.idx {
            IdxImpl::Unique(idx) => idx.insert(key, ptr).map_err(|existing| *existing),
            IdxImpl::Multi(idx) => {
                idx.insert(key, ptr);
                Ok(())
            }
        }
    }

    /// Deletes `ptr` with its indexed value `key` from this index.
    ///
    /// Returns whether `ptr` was present.
    pub fn delete(&mut self, key: &IndexKey, ptr: RowPointer) -> bool {
        if key.has_null() {
            return self.null_keyed.delete(key, &ptr);
        }
        match &mut self.idx {
            IdxImpl::Unique(idx) => idx.delete(key, &ptr),
            IdxImpl::Multi(idx) => idx.delete(key, &ptr),
        }
    }

    /// Returns an iterator over the rows whose key equals `key`.
    ///
    /// A `key` with a `NULL` component matches nothing.
    pub fn seek_point(&self, key: &IndexKey) -> BTreeIndexPointIter<'_> {
        let iter = if key.has_null() {
            PointIterImpl::Empty
        } else {
            match &self.idx {
                IdxImpl::Unique(idx) => PointIterImpl::Unique(idx.values_in_point(key)),
                IdxImpl::Multi(idx) => PointIterImpl::Multi(idx.values_in_point(key)),
            }
        };
        BTreeIndexPointIter { iter }
    }

    /// Returns an iterator over the rows that would violate the unique constraint of this index,
    /// if a row with `key` were inserted,
    /// or `None`, if this index doesn't have a unique constraint.
    pub fn get_rows_that_violate_unique_constraint<'a>(&'a self, key: &IndexKey) -> Option<BTreeIndexPointIter<'a>> {
        self.is_unique.then(|| self.seek_point(key))
    }

    /// Returns the number of rows indexed, including those keyed by `NULL`.
    pub fn num_rows(&self) -> usize {
        let keyed = match &self.idx {
            IdxImpl::Unique(idx) => idx.len(),
            IdxImpl::Multi(idx) => idx.len(),
        };
        keyed + self.null_keyed.len()
    }
}

/// An iterator over the rows matching a certain key in a [`BTreeIndex`].
pub struct BTreeIndexPointIter<'a> {
    iter: PointIterImpl<'a>,
}

enum PointIterImpl<'a> {
    Unique(core::option::IntoIter<&'a RowPointer>),
    Multi(core::slice::Iter<'a, RowPointer>),
    Empty,
}

impl Iterator for BTreeIndexPointIter<'_> {
    type Item = RowPointer;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.iter {
            PointIterImpl::Unique(iter) => iter.next().copied(),
            PointIterImpl::Multi(iter) => iter.next().copied(),
            PointIterImpl::Empty => None,
        }
    }
}
