//! The schema of a [`Table`](crate::table::Table): its columns, indexes, primary key and partitioning.

use partdb_primitives::{ColId, ColList, IndexId, TableId};
use partdb_sats::ProductType;
use thiserror::Error;

/// Whether a table supports in-place mutation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TableType {
    /// A regular table whose rows can be inserted, updated and deleted.
    Persistent,
    /// An append-only relation whose rows are streamed out to consumers
    /// and never retained for lookups or updates.
    Stream,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSchema {
    pub index_id: IndexId,
    pub index_name: Box<str>,
    /// The indexed columns, in key order.
    pub columns: ColList,
    pub is_unique: bool,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Index `{index_name}` of table `{table_name}` refers to column {col} which does not exist")]
    IndexColumnOutOfBounds {
        table_name: Box<str>,
        index_name: Box<str>,
        col: ColId,
    },
    #[error("Index ID `{index_id}` is used more than once in table `{table_name}`")]
    DuplicateIndexId { table_name: Box<str>, index_id: IndexId },
    #[error("Primary key of table `{table_name}` refers to index `{index_id}` which does not exist")]
    PrimaryKeyNotFound { table_name: Box<str>, index_id: IndexId },
    #[error("Primary key of table `{table_name}` refers to index `{index_name}` which is not unique")]
    PrimaryKeyNotUnique { table_name: Box<str>, index_name: Box<str> },
    #[error("Partition column {col} of table `{table_name}` does not exist")]
    PartitionColumnOutOfBounds { table_name: Box<str>, col: ColId },
}

/// A struct representing the schema of a database table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub table_id: TableId,
    pub table_name: Box<str>,
    pub table_type: TableType,
    /// The type of the rows stored in the table.
    row_type: ProductType,
    pub indexes: Vec<IndexSchema>,
    /// The unique index, if any, that identifies rows.
    pub primary_key: Option<IndexId>,
    /// The column whose value decides which partition owns a row,
    /// or `None` if the table is not partitioned.
    pub partition_col: Option<ColId>,
}

impl TableSchema {
    /// Returns the schema of a persistent, unpartitioned table without any indexes.
    pub fn new(table_id: TableId, table_name: impl Into<Box<str>>, row_type: ProductType) -> Self {
        Self {
            table_id,
            table_name: table_name.into(),
            table_type: TableType::Persistent,
            row_type,
            indexes: Vec::new(),
            primary_key: None,
            partition_col: None,
        }
    }

    pub fn with_type(self, table_type: TableType) -> Self {
        Self { table_type, ..self }
    }

    /// Adds an index named `index_name` on `columns`.
    pub fn with_index(
        mut self,
        index_id: impl Into<IndexId>,
        index_name: impl Into<Box<str>>,
        columns: impl Into<ColList>,
        is_unique: bool,
    ) -> Self {
        self.indexes.push(IndexSchema {
            index_id: index_id.into(),
            index_name: index_name.into(),
            columns: columns.into(),
            is_unique,
        });
        self
    }

    /// Adds a unique index on `columns` and designates it the primary key.
    pub fn with_primary_key(
        self,
        index_id: impl Into<IndexId>,
        index_name: impl Into<Box<str>>,
        columns: impl Into<ColList>,
    ) -> Self {
        let index_id = index_id.into();
        let mut this = self.with_index(index_id, index_name, columns, true);
        this.primary_key = Some(index_id);
        this
    }

    pub fn with_partition_col(self, col: impl Into<ColId>) -> Self {
        Self {
            partition_col: Some(col.into()),
            ..self
        }
    }

    pub fn get_row_type(&self) -> &ProductType {
        &self.row_type
    }

    /// Returns the name of column `col`, falling back to its position for unnamed columns.
    pub fn column_name(&self, col: ColId) -> Box<str> {
        match self.row_type.elements.get(col.idx()).and_then(|e| e.name.as_deref()) {
            Some(name) => name.into(),
            None => col.to_string().into(),
        }
    }

    pub fn index(&self, index_id: IndexId) -> Option<&IndexSchema> {
        self.indexes.iter().find(|index| index.index_id == index_id)
    }

    pub fn primary_key_index(&self) -> Option<&IndexSchema> {
        self.primary_key.and_then(|id| self.index(id))
    }

    /// Checks that every column referred to exists
    /// and that the primary key, if any, is a unique index of this table.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let num_cols = self.row_type.len();
        let table_name = || self.table_name.clone();

        for (pos, index) in self.indexes.iter().enumerate() {
            if let Some(col) = index.columns.iter().find(|col| col.idx() >= num_cols) {
                return Err(SchemaError::IndexColumnOutOfBounds {
                    table_name: table_name(),
                    index_name: index.index_name.clone(),
                    col,
                });
            }
            if self.indexes[..pos].iter().any(|other| other.index_id == index.index_id) {
                return Err(SchemaError::DuplicateIndexId {
                    table_name: table_name(),
                    index_id: index.index_id,
                });
            }
        }

        if let Some(index_id) = self.primary_key {
            let index = self.index(index_id).ok_or_else(|| SchemaError::PrimaryKeyNotFound {
                table_name: table_name(),
                index_id,
            })?;
            if !index.is_unique {
                return Err(SchemaError::PrimaryKeyNotUnique {
                    table_name: table_name(),
                    index_name: index.index_name.clone(),
                });
            }
        }

        match self.partition_col {
            Some(col) if col.idx() >= num_cols => Err(SchemaError::PartitionColumnOutOfBounds {
                table_name: table_name(),
                col,
            }),
            _ => Ok(()),
        }
    }
}
