use enum_as_inner::EnumAsInner;
use partdb_primitives::TableId;
use partdb_sats::{satn::Satn, InvalidFieldError, ProductValue};
use partdb_table::{
    table::{InsertError, UpdateError},
    temp_table::TempTableError,
};
use thiserror::Error;

/// An executor was set up against a plan or table it cannot run on.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Table `{table_name}` is a stream table and does not support upserts")]
    StreamTable { table_id: TableId, table_name: Box<str> },

    #[error("Plan targets table {expected} but was given table {actual} (`{table_name}`)")]
    TableMismatch {
        expected: TableId,
        actual: TableId,
        table_name: Box<str>,
    },

    #[error("Upsert into table `{table_name}` expects exactly one input relation, but got {count}")]
    InputCardinality {
        table_id: TableId,
        table_name: Box<str>,
        count: usize,
    },

    #[error("Input relation `{input_name}` does not have the row type of table `{table_name}`")]
    InputRowTypeMismatch {
        table_id: TableId,
        table_name: Box<str>,
        input_name: Box<str>,
    },

    #[error("Table `{table_name}` has no primary key index to upsert by")]
    MissingPrimaryKey { table_id: TableId, table_name: Box<str> },
}

impl ConfigurationError {
    /// Returns the ID of the table the plan targets.
    pub fn table_id(&self) -> TableId {
        match self {
            Self::StreamTable { table_id, .. }
            | Self::InputCardinality { table_id, .. }
            | Self::InputRowTypeMismatch { table_id, .. }
            | Self::MissingPrimaryKey { table_id, .. }
            | Self::TableMismatch {
                expected: table_id, ..
            } => *table_id,
        }
    }
}

/// Why an upsert was aborted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumAsInner)]
pub enum UpsertErrorKind {
    Configuration,
    Mispartitioned,
    StorageInsert,
    StorageUpdate,
    Lookup,
    ResultEmission,
}

/// An error that aborts an upsert.
///
/// Rows applied before the failing one remain applied.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum UpsertError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(
        "Mispartitioned tuple in single-partition upsert into table `{table_name}`: {}",
        row.to_satn()
    )]
    Mispartitioned {
        table_id: TableId,
        table_name: Box<str>,
        row: ProductValue,
    },

    #[error("Failed to insert {} into table `{table_name}`", row.to_satn())]
    StorageInsert {
        table_id: TableId,
        table_name: Box<str>,
        row: ProductValue,
        source: InsertError,
    },

    #[error("Failed to update table `{table_name}` with {}", row.to_satn())]
    StorageUpdate {
        table_id: TableId,
        table_name: Box<str>,
        row: ProductValue,
        source: UpdateError,
    },

    #[error("Failed to read the key of {} for table `{table_name}`", row.to_satn())]
    Lookup {
        table_id: TableId,
        table_name: Box<str>,
        row: ProductValue,
        source: InvalidFieldError,
    },

    #[error("Failed to emit the modified row count of table `{table_name}`")]
    ResultEmission {
        table_id: TableId,
        table_name: Box<str>,
        source: TempTableError,
    },
}

impl UpsertError {
    pub fn kind(&self) -> UpsertErrorKind {
        match self {
            Self::Configuration(_) => UpsertErrorKind::Configuration,
            Self::Mispartitioned { .. } => UpsertErrorKind::Mispartitioned,
            Self::StorageInsert { .. } => UpsertErrorKind::StorageInsert,
            Self::StorageUpdate { .. } => UpsertErrorKind::StorageUpdate,
            Self::Lookup { .. } => UpsertErrorKind::Lookup,
            Self::ResultEmission { .. } => UpsertErrorKind::ResultEmission,
        }
    }

    /// Returns the ID of the target table.
    pub fn table_id(&self) -> TableId {
        match self {
            Self::Configuration(err) => err.table_id(),
            Self::Mispartitioned { table_id, .. }
            | Self::StorageInsert { table_id, .. }
            | Self::StorageUpdate { table_id, .. }
            | Self::Lookup { table_id, .. }
            | Self::ResultEmission { table_id, .. } => *table_id,
        }
    }

    /// Returns the input row that caused the error, if a single row did.
    pub fn row(&self) -> Option<&ProductValue> {
        match self {
            Self::Mispartitioned { row, .. }
            | Self::StorageInsert { row, .. }
            | Self::StorageUpdate { row, .. }
            | Self::Lookup { row, .. } => Some(row),
            Self::Configuration(_) | Self::ResultEmission { .. } => None,
        }
    }
}
