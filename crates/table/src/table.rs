use super::{
    btree_index::{BTreeIndex, BTreeIndexPointIter},
    indexes::RowPointer,
    schema::{SchemaError, TableSchema, TableType},
};
use partdb_primitives::{ColId, IndexId, TableId};
use partdb_sats::{
    product_value::InvalidFieldError, satn::Satn, AlgebraicValue, ProductType, ProductValue,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// A database table containing the row schema, the rows, and indices.
///
/// Rows live in slots addressed by [`RowPointer`]s, appended in insertion order.
pub struct Table {
    /// Row storage. `None` marks a free slot.
    rows: Vec<Option<ProductValue>>,
    /// The indices of the table, ordered by ID so that index maintenance is deterministic.
    pub indexes: BTreeMap<IndexId, BTreeIndex>,
    /// The schema of the table, from which the type, and other details are derived.
    pub schema: Arc<TableSchema>,
    /// Store number of rows present in table.
    pub row_count: u64,
}

/// Various error that can happen on table insertion.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InsertError {
    /// The row does not conform to the row type of the table.
    #[error("Row {} has invalid row type for table `{table_name}`", row.to_satn())]
    RowInvalidType { table_name: Box<str>, row: ProductValue },

    /// Some index related error occurred.
    #[error(transparent)]
    IndexError(#[from] UniqueConstraintViolation),
}

/// Various error that can happen on table update.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum UpdateError {
    /// The row to replace is not resident in the table.
    #[error("Row {ptr} to update is not present in table `{table_name}`")]
    RowNotFound { table_name: Box<str>, ptr: RowPointer },

    /// The new row does not conform to the row type of the table.
    #[error("Row {} has invalid row type for table `{table_name}`", row.to_satn())]
    RowInvalidType { table_name: Box<str>, row: ProductValue },

    /// The new row would conflict with another row in some unique index.
    #[error(transparent)]
    IndexError(#[from] UniqueConstraintViolation),
}

/// Errors that can happen when looking up a row by its primary key.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LookupError {
    #[error("Table `{0}` has no primary key index")]
    NoPrimaryKey(Box<str>),

    #[error(transparent)]
    InvalidField(#[from] InvalidFieldError),
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unique constraint violation '{}' in table '{}': column(s): '{:?}' value: {}", constraint_name, table_name, cols, value.to_satn())]
pub struct UniqueConstraintViolation {
    pub constraint_name: Box<str>,
    pub table_name: Box<str>,
    pub cols: Vec<Box<str>>,
    pub value: AlgebraicValue,
}

// Public API:
impl Table {
    /// Creates a new empty table with the given `schema`,
    /// with an empty index for every index in the schema.
    pub fn new(schema: Arc<TableSchema>) -> Result<Self, SchemaError> {
        schema.validate()?;
        let indexes = schema
            .indexes
            .iter()
            .map(|index| {
                let btree = BTreeIndex::new(
                    index.index_id,
                    index.columns.clone(),
                    index.is_unique,
                    index.index_name.clone(),
                );
                (index.index_id, btree)
            })
            .collect();
        Ok(Self {
            rows: Vec::new(),
            indexes,
            schema,
            row_count: 0,
        })
    }

    pub fn get_schema(&self) -> &Arc<TableSchema> {
        &self.schema
    }

    pub fn get_row_type(&self) -> &ProductType {
        self.schema.get_row_type()
    }

    pub fn table_id(&self) -> TableId {
        self.schema.table_id
    }

    pub fn table_name(&self) -> &str {
        &self.schema.table_name
    }

    pub fn table_type(&self) -> TableType {
        self.schema.table_type
    }

    pub fn partition_col(&self) -> Option<ColId> {
        self.schema.partition_col
    }

    pub fn get_index_by_id(&self, index_id: IndexId) -> Option<&BTreeIndex> {
        self.indexes.get(&index_id)
    }

    /// Returns the primary key index, if the table has one.
    pub fn primary_key_index(&self) -> Option<&BTreeIndex> {
        self.schema.primary_key.and_then(|id| self.get_index_by_id(id))
    }

    /// Check if the `row` conflicts with any unique index on `self`,
    /// and if there is a conflict, return `Err`.
    ///
    /// `is_deleted` is a predicate which, for a given row pointer,
    /// returns true if and only if that row should be ignored.
    /// While checking unique constraints for an update,
    /// the row being replaced is ignored.
    pub fn check_unique_constraints(
        &self,
        row: &ProductValue,
        mut is_deleted: impl FnMut(RowPointer) -> bool,
    ) -> Result<(), UniqueConstraintViolation> {
        for index in self.indexes.values() {
            let value = index_key(index, row);
            if let Some(mut conflicts) = index.get_rows_that_violate_unique_constraint(&value) {
                if conflicts.any(|ptr| !is_deleted(ptr)) {
                    return Err(self.build_error_unique(index, value));
                }
            }
        }
        Ok(())
    }

    /// Insert a `row` into this table, and into every index of the table.
    ///
    /// All unique constraints are checked before anything is written,
    /// so a failed insertion leaves the table and its indexes untouched.
    pub fn insert(&mut self, row: &ProductValue) -> Result<RowRef<'_>, InsertError> {
        if !self.get_row_type().is_instance(row) {
            return Err(InsertError::RowInvalidType {
                table_name: self.schema.table_name.clone(),
                row: row.clone(),
            });
        }

        // Check unique constraints.
        // This error should take precedence over any other potential failures.
        self.check_unique_constraints(row, |_| false)?;

        let ptr = self.alloc_slot(row.clone());
        for index in self.indexes.values_mut() {
            let key = index_key(index, row);
            index
                .insert(key, ptr)
                .expect("unique constraints were checked before inserting into any index");
        }
        self.row_count += 1;

        Ok(RowRef::new(self, ptr))
    }

    /// Replace the contents of the row at `ptr` with `row`,
    /// moving the row's entries in every index from its old key to its new key.
    ///
    /// The row keeps its [`RowPointer`].
    /// All constraints are checked before anything is written,
    /// so a failed update leaves the old row and its index entries in place.
    pub fn update(&mut self, ptr: RowPointer, row: &ProductValue) -> Result<RowRef<'_>, UpdateError> {
        if !self.is_row_present(ptr) {
            return Err(UpdateError::RowNotFound {
                table_name: self.schema.table_name.clone(),
                ptr,
            });
        }
        if !self.get_row_type().is_instance(row) {
            return Err(UpdateError::RowInvalidType {
                table_name: self.schema.table_name.clone(),
                row: row.clone(),
            });
        }

        // The old row is replaced 1-1, so it can't conflict with the new one.
        self.check_unique_constraints(row, |other| other == ptr)?;

        let old_row = std::mem::replace(&mut self.rows[ptr.idx()], Some(row.clone()))
            .expect("row presence was checked above");
        for index in self.indexes.values_mut() {
            let old_key = index_key(index, &old_row);
            let new_key = index_key(index, row);
            index.delete(&old_key, ptr);
            index
                .insert(new_key, ptr)
                .expect("unique constraints were checked before updating any index");
        }

        Ok(RowRef::new(self, ptr))
    }

    /// Looks up the row whose primary key equals that of `row`.
    ///
    /// A key with a `NULL` component never matches a resident row.
    pub fn lookup_by_primary_key(&self, row: &ProductValue) -> Result<Option<RowRef<'_>>, LookupError> {
        let index = self
            .primary_key_index()
            .ok_or_else(|| LookupError::NoPrimaryKey(self.schema.table_name.clone()))?;
        let key = index.key_of(row)?;
        Ok(index.seek_point(&key).next().map(|ptr| RowRef::new(self, ptr)))
    }

    /// Returns a [`RowRef`] for `ptr` or `None` if the row isn't present.
    pub fn get_row_ref(&self, ptr: RowPointer) -> Option<RowRef<'_>> {
        self.is_row_present(ptr).then(|| RowRef::new(self, ptr))
    }

    /// Returns an iterator over all the rows of `self`, in slot order.
    pub fn scan_rows(&self) -> TableScanIter<'_> {
        TableScanIter {
            table: self,
            slots: self.rows.iter().enumerate(),
        }
    }

    /// Returns an iterator over the rows whose key in the index `index_id` equals `key`,
    /// or `None` if there is no such index.
    pub fn index_seek_point<'a>(
        &'a self,
        index_id: IndexId,
        key: &AlgebraicValue,
    ) -> Option<impl Iterator<Item = RowRef<'a>> + 'a> {
        let iter: BTreeIndexPointIter<'a> = self.get_index_by_id(index_id)?.seek_point(key);
        Some(iter.map(move |ptr| RowRef::new(self, ptr)))
    }
}

/// Projects the key of `row` in `index`.
///
/// Callers only pass rows that were checked against the table's row type,
/// and the schema was validated to only index existing columns.
fn index_key(index: &BTreeIndex, row: &ProductValue) -> AlgebraicValue {
    index
        .key_of(row)
        .expect("indexed columns are in bounds of rows of the table's type")
}

// Private API:
impl Table {
    /// Returns a unique constraint violation error for the given `index`
    /// and the `value` that would have been duplicated.
    fn build_error_unique(&self, index: &BTreeIndex, value: AlgebraicValue) -> UniqueConstraintViolation {
        let cols = index
            .indexed_columns()
            .iter()
            .map(|col| self.schema.column_name(col))
            .collect();
        UniqueConstraintViolation {
            constraint_name: index.name().into(),
            table_name: self.schema.table_name.clone(),
            cols,
            value,
        }
    }

    /// Stores `row` in a new slot at the end of the row storage.
    fn alloc_slot(&mut self, row: ProductValue) -> RowPointer {
        self.rows.push(Some(row));
        RowPointer(self.rows.len() as u64 - 1)
    }

    /// Returns whether the row at `ptr` is present or not.
    fn is_row_present(&self, ptr: RowPointer) -> bool {
        matches!(self.rows.get(ptr.idx()), Some(Some(_)))
    }
}

/// A reference to a single row within a table.
#[derive(Copy, Clone)]
pub struct RowRef<'a> {
    table: &'a Table,
    pointer: RowPointer,
}

impl<'a> RowRef<'a> {
    /// Constructs a row ref for a row known to be present in `table`.
    fn new(table: &'a Table, pointer: RowPointer) -> Self {
        debug_assert!(table.is_row_present(pointer));
        Self { table, pointer }
    }

    /// Borrows the values of the row.
    pub fn row(&self) -> &'a ProductValue {
        self.table.rows[self.pointer.idx()]
            .as_ref()
            .expect("a `RowRef` only points at present rows")
    }

    /// Extract a `ProductValue` from the table.
    pub fn to_product_value(&self) -> ProductValue {
        self.row().clone()
    }

    /// Read the column `col` of the row.
    pub fn read_col(&self, col: impl Into<ColId>) -> Result<&'a AlgebraicValue, InvalidFieldError> {
        self.row().get_col(col.into())
    }

    /// Returns the row pointer for this row.
    pub fn pointer(&self) -> RowPointer {
        self.pointer
    }
}

impl std::fmt::Debug for RowRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowRef")
            .field("pointer", &self.pointer)
            .field("row", self.row())
            .finish()
    }
}

/// An iterator over the rows of a [`Table`].
pub struct TableScanIter<'table> {
    table: &'table Table,
    slots: std::iter::Enumerate<std::slice::Iter<'table, Option<ProductValue>>>,
}

impl<'a> Iterator for TableScanIter<'a> {
    type Item = RowRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let table = self.table;
        self.slots
            .find_map(|(slot, row)| row.as_ref().map(|_| RowRef::new(table, RowPointer(slot as u64))))
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use partdb_sats::{product, AlgebraicType, ProductTypeElement};
    use pretty_assertions::assert_eq;
    use proptest::collection::hash_set;
    use proptest::prelude::*;

    /// `UniqueIndexed(id: I64 primary key, email: String unique, tag: U32 nullable)`.
    pub(crate) fn table() -> Table {
        let row_type = [
            ProductTypeElement::new_named(AlgebraicType::I64, "id"),
            ProductTypeElement::new_named(AlgebraicType::String, "email"),
            ProductTypeElement::new_named(AlgebraicType::U32, "tag").nullable(),
        ]
        .into_iter()
        .collect();
        let schema = TableSchema::new(TableId(7), "UniqueIndexed", row_type)
            .with_primary_key(0, "UniqueIndexed_id_idx_btree", 0)
            .with_index(1, "UniqueIndexed_email_idx_btree", 1, true)
            .with_index(2, "UniqueIndexed_tag_idx_btree", 2, false);
        Table::new(schema.into()).unwrap()
    }

    fn rows(table: &Table) -> Vec<ProductValue> {
        table.scan_rows().map(|r| r.to_product_value()).collect()
    }

    #[test]
    fn unique_violation_error() {
        let mut table = table();
        table.insert(&product![1i64, "a@x", 0u32]).unwrap();

        let err = table.insert(&product![2i64, "a@x", 0u32]).unwrap_err();
        assert_eq!(
            err,
            InsertError::IndexError(UniqueConstraintViolation {
                constraint_name: "UniqueIndexed_email_idx_btree".into(),
                table_name: "UniqueIndexed".into(),
                cols: vec!["email".into()],
                value: AlgebraicValue::from("a@x"),
            })
        );
        // Nothing was written.
        assert_eq!(table.row_count, 1);
        assert_eq!(table.get_index_by_id(2.into()).unwrap().num_rows(), 1);
    }

    #[test]
    fn rows_get_consecutive_slots() {
        let mut table = table();
        let ptrs: Vec<_> = (0..3i64)
            .map(|id| table.insert(&product![id, format!("{id}@x"), 0u32]).unwrap().pointer())
            .collect();
        assert_eq!(ptrs, [RowPointer(0), RowPointer(1), RowPointer(2)]);

        // A rejected row doesn't take up a slot.
        table.insert(&product![0i64, "dup@x", 0u32]).unwrap_err();
        let next = table.insert(&product![3i64, "3@x", 0u32]).unwrap().pointer();
        assert_eq!(next, RowPointer(3));

        // Updates keep rows in place.
        table.update(RowPointer(1), &product![1i64, "one@x", 1u32]).unwrap();
        let scanned: Vec<_> = table.scan_rows().map(|r| r.pointer()).collect();
        assert_eq!(scanned, [RowPointer(0), RowPointer(1), RowPointer(2), RowPointer(3)]);
    }

    #[test]
    fn insert_rejects_invalid_row_type() {
        let mut table = table();
        let err = table.insert(&product![1u32, "a@x", 0u32]).unwrap_err();
        assert!(matches!(err, InsertError::RowInvalidType { .. }));
        assert_eq!(table.row_count, 0);
    }

    #[test]
    fn update_moves_index_entries() {
        let mut table = table();
        let ptr = table.insert(&product![1i64, "a@x", 3u32]).unwrap().pointer();

        let updated = table.update(ptr, &product![1i64, "b@x", 4u32]).unwrap();
        assert_eq!(updated.pointer(), ptr);
        assert_eq!(updated.read_col(1), Ok(&AlgebraicValue::from("b@x")));

        let seek = |index_id: u32, key: AlgebraicValue| {
            table
                .index_seek_point(index_id.into(), &key)
                .unwrap()
                .map(|r| r.pointer())
                .collect::<Vec<_>>()
        };
        assert!(seek(1, "a@x".into()).is_empty());
        assert_eq!(seek(1, "b@x".into()), [ptr]);
        assert!(seek(2, 3u32.into()).is_empty());
        assert_eq!(seek(2, 4u32.into()), [ptr]);
        assert_eq!(table.row_count, 1);
    }

    #[test]
    fn update_may_keep_its_own_unique_values() {
        let mut table = table();
        let ptr = table.insert(&product![1i64, "a@x", 3u32]).unwrap().pointer();
        // Same primary key and email as the row being replaced.
        table.update(ptr, &product![1i64, "a@x", 9u32]).unwrap();
        assert_eq!(rows(&table), [product![1i64, "a@x", 9u32]]);
    }

    #[test]
    fn failed_update_leaves_row_and_indexes_untouched() {
        let mut table = table();
        let a = table.insert(&product![1i64, "a@x", 1u32]).unwrap().pointer();
        table.insert(&product![2i64, "b@x", 2u32]).unwrap();

        let err = table.update(a, &product![1i64, "b@x", 5u32]).unwrap_err();
        assert!(matches!(err, UpdateError::IndexError(_)));

        assert_eq!(table.get_row_ref(a).unwrap().to_product_value(), product![1i64, "a@x", 1u32]);
        assert_eq!(table.index_seek_point(2.into(), &1u32.into()).unwrap().count(), 1);
        assert_eq!(table.index_seek_point(2.into(), &5u32.into()).unwrap().count(), 0);
    }

    #[test]
    fn update_of_missing_row() {
        let mut table = table();
        let err = table.update(RowPointer(3), &product![1i64, "a@x", 1u32]).unwrap_err();
        assert_eq!(
            err,
            UpdateError::RowNotFound {
                table_name: "UniqueIndexed".into(),
                ptr: RowPointer(3)
            }
        );
    }

    #[test]
    fn lookup_by_primary_key() {
        let mut table = table();
        let ptr = table.insert(&product![1i64, "a@x", None::<u32>]).unwrap().pointer();

        let probe = product![1i64, "other", 2u32];
        let found = table.lookup_by_primary_key(&probe).unwrap().map(|r| r.pointer());
        assert_eq!(found, Some(ptr));
        // Looking up again yields the same answer.
        let again = table.lookup_by_primary_key(&probe).unwrap().map(|r| r.pointer());
        assert_eq!(again, found);

        assert!(table.lookup_by_primary_key(&product![2i64, "a@x", 2u32]).unwrap().is_none());
    }

    #[test]
    fn lookup_without_primary_key() {
        let schema = TableSchema::new(TableId(1), "heap", [("v", AlgebraicType::U32)].into());
        let table = Table::new(schema.into()).unwrap();
        assert_eq!(
            table.lookup_by_primary_key(&product![1u32]).unwrap_err(),
            LookupError::NoPrimaryKey("heap".into())
        );
    }

    #[test]
    fn null_primary_key_never_matches() {
        let row_type = [
            ProductTypeElement::new_named(AlgebraicType::I64, "id").nullable(),
            ProductTypeElement::new_named(AlgebraicType::String, "v"),
        ]
        .into_iter()
        .collect();
        let schema = TableSchema::new(TableId(1), "nullable_pk", row_type).with_primary_key(0, "pk", 0);
        let mut table = Table::new(schema.into()).unwrap();

        let row = product![None::<i64>, "a"];
        table.insert(&row).unwrap();
        assert!(table.lookup_by_primary_key(&row).unwrap().is_none());
        // Null keys are distinct, so a second one is admitted.
        table.insert(&row).unwrap();
        assert_eq!(table.row_count, 2);
    }

    proptest! {
        #[test]
        fn insert_retrieve(ids in hash_set(any::<i64>(), 0..32)) {
            let mut table = table();
            let mut ptrs = Vec::new();
            for (i, id) in ids.iter().enumerate() {
                let row = product![*id, format!("{id}@x"), i as u32];
                let row_ref = table.insert(&row).unwrap();
                prop_assert_eq!(row_ref.to_product_value(), row.clone());
                ptrs.push((row_ref.pointer(), row));
            }
            prop_assert_eq!(table.row_count, ids.len() as u64);
            for (ptr, row) in ptrs {
                prop_assert_eq!(table.get_row_ref(ptr).map(|r| r.to_product_value()), Some(row.clone()));
                let found = table.lookup_by_primary_key(&row).unwrap().map(|r| r.pointer());
                prop_assert_eq!(found, Some(ptr));
            }
            for index in table.indexes.values() {
                prop_assert_eq!(index.num_rows(), ids.len());
            }
        }
    }
}
