//! Transient relations: the inputs and outputs of an execution.
//!
//! A [`TempTable`] holds rows in insertion order, without indexes,
//! and accounts for the bytes its rows occupy against optional [`TempTableLimits`].

use partdb_primitives::ColId;
use partdb_sats::{
    product, satn::Satn, size_of::SizeOf, AlgebraicType, ProductType, ProductTypeElement, ProductValue,
};
use thiserror::Error;

/// The name of the single column of a DML count output relation.
pub const MODIFIED_TUPLES_COL_NAME: &str = "modified_tuples";

/// Memory limits shared by the temp tables of an execution.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct TempTableLimits {
    /// Inserting a row that would take a table past this many bytes fails.
    pub max_bytes: Option<usize>,
    /// Crossing this many bytes is logged, once per table.
    pub log_threshold_bytes: Option<usize>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TempTableError {
    #[error("Row {} has invalid row type for temp table `{table_name}`", row.to_satn())]
    RowInvalidType { table_name: Box<str>, row: ProductValue },

    #[error("Temp table `{table_name}` would use {requested} bytes which exceeds the limit of {limit} bytes")]
    LimitExceeded {
        table_name: Box<str>,
        limit: usize,
        requested: usize,
    },
}

/// An ordered, unindexed, in-memory relation.
#[derive(Debug, Clone)]
pub struct TempTable {
    name: Box<str>,
    row_type: ProductType,
    rows: Vec<ProductValue>,
    limits: TempTableLimits,
    bytes_used: usize,
    /// Whether crossing `limits.log_threshold_bytes` has already been logged.
    logged_threshold: bool,
}

impl TempTable {
    pub fn new(name: impl Into<Box<str>>, row_type: ProductType, limits: TempTableLimits) -> Self {
        Self {
            name: name.into(),
            row_type,
            rows: Vec::new(),
            limits,
            bytes_used: 0,
            logged_threshold: false,
        }
    }

    /// Returns an empty relation with the single column `modified_tuples: I64`
    /// used to report how many rows a DML statement modified.
    pub fn dml_count_output(limits: TempTableLimits) -> Self {
        let row_type = [ProductTypeElement::new_named(AlgebraicType::I64, MODIFIED_TUPLES_COL_NAME)]
            .into_iter()
            .collect();
        Self::new("dml_count_output", row_type, limits)
    }

    /// Returns a relation of `row_type` holding `rows`, in order, without any limits.
    pub fn from_rows(
        name: impl Into<Box<str>>,
        row_type: ProductType,
        rows: impl IntoIterator<Item = ProductValue>,
    ) -> Result<Self, TempTableError> {
        let mut table = Self::new(name, row_type, TempTableLimits::default());
        for row in rows {
            table.insert(row)?;
        }
        Ok(table)
    }

    /// Appends `row` to the relation.
    pub fn insert(&mut self, row: ProductValue) -> Result<(), TempTableError> {
        if !self.row_type.is_instance(&row) {
            return Err(TempTableError::RowInvalidType {
                table_name: self.name.clone(),
                row,
            });
        }

        let requested = self.bytes_used + row.size_of();
        if let Some(limit) = self.limits.max_bytes {
            if requested > limit {
                return Err(TempTableError::LimitExceeded {
                    table_name: self.name.clone(),
                    limit,
                    requested,
                });
            }
        }
        if let Some(threshold) = self.limits.log_threshold_bytes {
            if requested > threshold && !self.logged_threshold {
                log::warn!(
                    "Temp table `{}` uses {requested} bytes, above the logging threshold of {threshold} bytes",
                    self.name
                );
                self.logged_threshold = true;
            }
        }

        self.bytes_used = requested;
        self.rows.push(row);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn row_type(&self) -> &ProductType {
        &self.row_type
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates over the rows in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, ProductValue> {
        self.rows.iter()
    }

    pub fn rows(&self) -> &[ProductValue] {
        &self.rows
    }

    pub fn bytes_used(&self) -> usize {
        self.bytes_used
    }

    /// Returns the count held by a DML count output relation,
    /// or `None` if `self` isn't exactly one `I64` row.
    pub fn modified_tuples(&self) -> Option<i64> {
        match self.rows() {
            [row] => row.get_col(ColId(0)).ok()?.as_i64().copied(),
            _ => None,
        }
    }

    /// Appends the single row of a DML count output.
    pub fn insert_count(&mut self, count: i64) -> Result<(), TempTableError> {
        self.insert(product![count])
    }
}

impl<'a> IntoIterator for &'a TempTable {
    type Item = &'a ProductValue;
    type IntoIter = std::slice::Iter<'a, ProductValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pairs() -> ProductType {
        [("a", AlgebraicType::U32), ("b", AlgebraicType::String)].into()
    }

    #[test]
    fn preserves_insertion_order() {
        let rows = vec![product![2u32, "x"], product![1u32, "y"], product![3u32, "z"]];
        let table = TempTable::from_rows("input", pairs(), rows.clone()).unwrap();
        assert_eq!(table.rows(), &rows[..]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.bytes_used(), 3 * (4 + 4 + 1));
    }

    #[test]
    fn rejects_rows_of_other_types() {
        let err = TempTable::from_rows("input", pairs(), [product![1u32]]).unwrap_err();
        assert_eq!(
            err,
            TempTableError::RowInvalidType {
                table_name: "input".into(),
                row: product![1u32],
            }
        );
    }

    #[test]
    fn dml_count_output() {
        let mut out = TempTable::dml_count_output(TempTableLimits::default());
        assert_eq!(out.modified_tuples(), None);
        out.insert_count(4).unwrap();
        assert_eq!(out.modified_tuples(), Some(4));
        assert_eq!(out.row_type().elements[0].name.as_deref(), Some(MODIFIED_TUPLES_COL_NAME));
    }

    #[test]
    fn limit_exceeded() {
        let limits = TempTableLimits {
            max_bytes: Some(12),
            log_threshold_bytes: Some(4),
        };
        let mut table = TempTable::new("small", [("n", AlgebraicType::I64)].into(), limits);
        table.insert(product![1i64]).unwrap();
        let err = table.insert(product![2i64]).unwrap_err();
        assert_eq!(
            err,
            TempTableError::LimitExceeded {
                table_name: "small".into(),
                limit: 12,
                requested: 16,
            }
        );
        // The failed row was not kept.
        assert_eq!(table.len(), 1);
        assert_eq!(table.bytes_used(), 8);
    }
}
