use partdb_primitives::{ColId, TableId};
use partdb_sats::{ProductType, ProductValue};
use partdb_table::{
    indexes::RowPointer,
    schema::TableType,
    table::{InsertError, LookupError, Table, UpdateError},
};

pub mod config;
pub mod context;
pub mod dml;
pub mod error;
pub mod locality;
pub mod metrics;

pub use context::ExecutionContext;

/// The storage interface required of the target of a DML executor.
///
/// Implementations must check every constraint before mutating anything,
/// so that a failed `insert` or `update` leaves the table and its indexes untouched.
pub trait TargetTable {
    fn table_id(&self) -> TableId;
    fn table_name(&self) -> &str;
    fn table_type(&self) -> TableType;
    fn row_type(&self) -> &ProductType;

    /// The column whose value decides which partition owns a row,
    /// or `None` if the table is not partitioned.
    fn partition_col(&self) -> Option<ColId>;

    fn has_primary_key_index(&self) -> bool;

    /// Returns the resident row whose primary key equals that of `row`, if any.
    fn lookup_by_primary_key(&self, row: &ProductValue) -> Result<Option<RowPointer>, LookupError>;

    /// Inserts `row` as a new row, entering it into every index.
    fn insert(&mut self, row: &ProductValue) -> Result<RowPointer, InsertError>;

    /// Replaces the row at `ptr` with `row`, moving its entries in every index.
    fn update(&mut self, ptr: RowPointer, row: &ProductValue) -> Result<RowPointer, UpdateError>;
}

impl TargetTable for Table {
    fn table_id(&self) -> TableId {
        Table::table_id(self)
    }

    fn table_name(&self) -> &str {
        Table::table_name(self)
    }

    fn table_type(&self) -> TableType {
        Table::table_type(self)
    }

    fn row_type(&self) -> &ProductType {
        self.get_row_type()
    }

    fn partition_col(&self) -> Option<ColId> {
        Table::partition_col(self)
    }

    fn has_primary_key_index(&self) -> bool {
        self.primary_key_index().is_some()
    }

    fn lookup_by_primary_key(&self, row: &ProductValue) -> Result<Option<RowPointer>, LookupError> {
        Ok(Table::lookup_by_primary_key(self, row)?.map(|row_ref| row_ref.pointer()))
    }

    fn insert(&mut self, row: &ProductValue) -> Result<RowPointer, InsertError> {
        Table::insert(self, row).map(|row_ref| row_ref.pointer())
    }

    fn update(&mut self, ptr: RowPointer, row: &ProductValue) -> Result<RowPointer, UpdateError> {
        Table::update(self, ptr, row).map(|row_ref| row_ref.pointer())
    }
}
