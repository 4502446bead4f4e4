use std::sync::Arc;

use partdb_primitives::{ColId, TableId};
use partdb_sats::{satn::Satn, size_of::SizeOf, InvalidFieldError, ProductValue};
use partdb_table::{
    indexes::RowPointer, schema::TableType, table::LookupError, temp_table::TempTable,
};

use crate::{
    error::{ConfigurationError, UpsertError},
    ExecutionContext, TargetTable,
};

/// Whether a statement was routed to a single partition
/// or sent to every partition hosting the table.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExecutionScope {
    /// Every row of the input must belong to a local partition.
    SinglePartition,
    /// Each site applies the rows it owns and ignores the rest.
    MultiPartition,
}

/// A physical plan to upsert the rows of `inputs` into the table `table_id`.
#[derive(Debug, Clone)]
pub struct UpsertPlan {
    pub table_id: TableId,
    pub inputs: Vec<Arc<TempTable>>,
    pub scope: ExecutionScope,
}

/// Executes an upsert.
///
/// Each input row whose primary key matches a resident row replaces that row.
/// Every other row is inserted.
/// Rows are applied one at a time, in input order,
/// so a later row sees the effect of an earlier one with the same key.
#[derive(Debug)]
pub struct UpsertExecutor {
    table_id: TableId,
    table_name: Box<str>,
    partition_col: Option<ColId>,
    scope: ExecutionScope,
    input: Arc<TempTable>,
}

impl UpsertExecutor {
    /// Checks that `plan` can run against `target`.
    pub fn new(plan: UpsertPlan, target: &impl TargetTable) -> Result<Self, ConfigurationError> {
        let UpsertPlan {
            table_id,
            mut inputs,
            scope,
        } = plan;
        let table_name: Box<str> = target.table_name().into();

        if target.table_type() == TableType::Stream {
            return Err(ConfigurationError::StreamTable { table_id, table_name });
        }
        if target.table_id() != table_id {
            return Err(ConfigurationError::TableMismatch {
                expected: table_id,
                actual: target.table_id(),
                table_name,
            });
        }
        if inputs.len() != 1 {
            return Err(ConfigurationError::InputCardinality {
                table_id,
                table_name,
                count: inputs.len(),
            });
        }
        let input = inputs.remove(0);
        if !input.row_type().is_structurally_equal(target.row_type()) {
            return Err(ConfigurationError::InputRowTypeMismatch {
                table_id,
                table_name,
                input_name: input.name().into(),
            });
        }
        let partition_col = target.partition_col();
        if partition_col.is_some() && !target.has_primary_key_index() {
            return Err(ConfigurationError::MissingPrimaryKey { table_id, table_name });
        }

        log::trace!(
            "Upsert into table `{table_name}` ({table_id}) initialized with scope {scope:?}, partition column {partition_col:?}"
        );
        Ok(Self {
            table_id,
            table_name,
            partition_col,
            scope,
            input,
        })
    }

    /// Upserts every input row into `target`,
    /// returning a relation holding the number of rows modified.
    ///
    /// On error, the rows applied before the failing one remain applied
    /// and no result relation is produced.
    pub fn execute<T: TargetTable>(
        &self,
        target: &mut T,
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<TempTable, UpsertError> {
        if target.table_id() != self.table_id {
            return Err(ConfigurationError::TableMismatch {
                expected: self.table_id,
                actual: target.table_id(),
                table_name: target.table_name().into(),
            }
            .into());
        }
        log::debug!(
            "Upserting {} rows into table `{}` ({})",
            self.input.len(),
            self.table_name,
            self.table_id
        );

        let mut modified = 0;
        let mut checked_primary_key = false;
        for row in self.input.iter() {
            ctx.metrics.rows_scanned += 1;
            log::trace!("Upserting row {} into table `{}`", row.to_satn(), self.table_name);

            if !self.is_local(row, ctx)? {
                continue;
            }

            if !checked_primary_key {
                self.check_primary_key(target)?;
                checked_primary_key = true;
            }
            self.upsert_row(target, row, ctx)?;
            modified += 1;
        }

        let result = self.emit_modified_count(modified, ctx)?;
        log::debug!("Upsert into table `{}` modified {modified} rows", self.table_name);
        Ok(result)
    }

    /// Returns whether `row` belongs to a partition hosted here.
    ///
    /// Rows of an unpartitioned table are always local.
    /// A row owned elsewhere is skipped in a multi-partition execution
    /// and aborts a single-partition one.
    fn is_local(&self, row: &ProductValue, ctx: &mut ExecutionContext<'_>) -> Result<bool, UpsertError> {
        let Some(col) = self.partition_col else {
            return Ok(true);
        };
        let key = row.get_col(col).map_err(|source| self.lookup_error(row, source))?;
        if ctx.locality().is_local(key) {
            return Ok(true);
        }
        match self.scope {
            ExecutionScope::SinglePartition => {
                log::error!(
                    "Mispartitioned row {} in single-partition upsert into table `{}`",
                    row.to_satn(),
                    self.table_name
                );
                Err(UpsertError::Mispartitioned {
                    table_id: self.table_id,
                    table_name: self.table_name.clone(),
                    row: row.clone(),
                })
            }
            ExecutionScope::MultiPartition => {
                ctx.metrics.rows_skipped += 1;
                Ok(false)
            }
        }
    }

    fn check_primary_key(&self, target: &impl TargetTable) -> Result<(), UpsertError> {
        if target.has_primary_key_index() {
            return Ok(());
        }
        Err(self.missing_primary_key().into())
    }

    /// Applies `row` to `target`, as an update if a resident row has its primary key,
    /// and as an insert otherwise.
    fn upsert_row<T: TargetTable>(
        &self,
        target: &mut T,
        row: &ProductValue,
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<(), UpsertError> {
        ctx.metrics.index_seeks += 1;
        match self.resolve(target, row)? {
            None => {
                target.insert(row).map_err(|source| {
                    log::error!("Failed to insert into table `{}`: {source}", self.table_name);
                    UpsertError::StorageInsert {
                        table_id: self.table_id,
                        table_name: self.table_name.clone(),
                        row: row.clone(),
                        source,
                    }
                })?;
                ctx.metrics.rows_inserted += 1;
            }
            Some(ptr) => {
                target.update(ptr, row).map_err(|source| {
                    log::error!("Failed to update table `{}`: {source}", self.table_name);
                    UpsertError::StorageUpdate {
                        table_id: self.table_id,
                        table_name: self.table_name.clone(),
                        row: row.clone(),
                        source,
                    }
                })?;
                ctx.metrics.rows_updated += 1;
            }
        }
        ctx.metrics.bytes_written += row.size_of();
        Ok(())
    }

    /// Finds the resident row with the primary key of `row`.
    fn resolve(&self, target: &impl TargetTable, row: &ProductValue) -> Result<Option<RowPointer>, UpsertError> {
        target.lookup_by_primary_key(row).map_err(|err| match err {
            LookupError::NoPrimaryKey(_) => self.missing_primary_key().into(),
            LookupError::InvalidField(source) => self.lookup_error(row, source),
        })
    }

    /// Writes `count` as the only row of a fresh DML count output relation
    /// and adds it to the engine-wide total.
    fn emit_modified_count(&self, count: i64, ctx: &mut ExecutionContext<'_>) -> Result<TempTable, UpsertError> {
        let mut result = TempTable::dml_count_output(ctx.temp_table_limits());
        result.insert_count(count).map_err(|source| {
            log::error!(
                "Failed to emit the modified row count of table `{}`: {source}",
                self.table_name
            );
            UpsertError::ResultEmission {
                table_id: self.table_id,
                table_name: self.table_name.clone(),
                source,
            }
        })?;
        ctx.add_tuples_modified(count);
        Ok(result)
    }

    fn missing_primary_key(&self) -> ConfigurationError {
        ConfigurationError::MissingPrimaryKey {
            table_id: self.table_id,
            table_name: self.table_name.clone(),
        }
    }

    fn lookup_error(&self, row: &ProductValue, source: InvalidFieldError) -> UpsertError {
        UpsertError::Lookup {
            table_id: self.table_id,
            table_name: self.table_name.clone(),
            row: row.clone(),
            source,
        }
    }

    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    pub fn scope(&self) -> ExecutionScope {
        self.scope
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locality::AllLocal;
    use partdb_sats::{product, AlgebraicType, ProductType};
    use partdb_table::{
        schema::TableSchema,
        table::Table,
        temp_table::TempTableLimits,
    };
    use pretty_assertions::assert_eq;

    fn users() -> Table {
        let schema = TableSchema::new(
            TableId(1),
            "users",
            [("id", AlgebraicType::I64), ("name", AlgebraicType::String)].into(),
        )
        .with_primary_key(0, "users_id_idx", 0);
        Table::new(schema.into()).unwrap()
    }

    fn input(rows: impl IntoIterator<Item = ProductValue>) -> Arc<TempTable> {
        let row_type: ProductType = [("id", AlgebraicType::I64), ("name", AlgebraicType::String)].into();
        Arc::new(TempTable::from_rows("input", row_type, rows).unwrap())
    }

    fn plan(inputs: Vec<Arc<TempTable>>) -> UpsertPlan {
        UpsertPlan {
            table_id: TableId(1),
            inputs,
            scope: ExecutionScope::SinglePartition,
        }
    }

    #[test]
    fn stream_tables_are_rejected() {
        let schema = TableSchema::new(TableId(1), "events", [("id", AlgebraicType::I64)].into())
            .with_type(TableType::Stream);
        let table = Table::new(schema.into()).unwrap();
        let err = UpsertExecutor::new(plan(vec![input([])]), &table).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::StreamTable {
                table_id: TableId(1),
                table_name: "events".into()
            }
        );
    }

    #[test]
    fn exactly_one_input() {
        let table = users();
        let err = UpsertExecutor::new(plan(vec![]), &table).unwrap_err();
        assert!(matches!(err, ConfigurationError::InputCardinality { count: 0, .. }));
        let err = UpsertExecutor::new(plan(vec![input([]), input([])]), &table).unwrap_err();
        assert!(matches!(err, ConfigurationError::InputCardinality { count: 2, .. }));
    }

    #[test]
    fn input_row_type_must_match() {
        let table = users();
        let narrow = Arc::new(TempTable::new(
            "narrow",
            [("id", AlgebraicType::I64)].into(),
            TempTableLimits::default(),
        ));
        let err = UpsertExecutor::new(plan(vec![narrow]), &table).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::InputRowTypeMismatch {
                table_id: TableId(1),
                table_name: "users".into(),
                input_name: "narrow".into(),
            }
        );
    }

    #[test]
    fn plan_must_target_the_table() {
        let table = users();
        let mut plan = plan(vec![input([])]);
        plan.table_id = TableId(2);
        let err = UpsertExecutor::new(plan, &table).unwrap_err();
        assert!(matches!(err, ConfigurationError::TableMismatch { .. }));
    }

    #[test]
    fn unpartitioned_without_primary_key_fails_on_first_row() {
        let schema = TableSchema::new(
            TableId(1),
            "heap",
            [("id", AlgebraicType::I64), ("name", AlgebraicType::String)].into(),
        );
        let mut table = Table::new(schema.into()).unwrap();
        let mut ctx = ExecutionContext::new(&AllLocal);

        // Nothing to look up, nothing to fail.
        let exec = UpsertExecutor::new(plan(vec![input([])]), &table).unwrap();
        assert_eq!(exec.execute(&mut table, &mut ctx).unwrap().modified_tuples(), Some(0));

        let exec = UpsertExecutor::new(plan(vec![input([product![1i64, "a"]])]), &table).unwrap();
        let err = exec.execute(&mut table, &mut ctx).unwrap_err();
        assert_eq!(
            err,
            UpsertError::Configuration(ConfigurationError::MissingPrimaryKey {
                table_id: TableId(1),
                table_name: "heap".into(),
            })
        );
        assert_eq!(table.row_count, 0);
    }

    #[test]
    fn metrics() {
        let mut table = users();
        table.insert(&product![1i64, "old"]).unwrap();
        let mut ctx = ExecutionContext::new(&AllLocal);

        let rows = [product![1i64, "new"], product![2i64, "b"]];
        let bytes = rows.iter().map(|r| r.size_of()).sum::<usize>();
        let exec = UpsertExecutor::new(plan(vec![input(rows)]), &table).unwrap();
        exec.execute(&mut table, &mut ctx).unwrap();

        assert_eq!(ctx.metrics.rows_scanned, 2);
        assert_eq!(ctx.metrics.index_seeks, 2);
        assert_eq!(ctx.metrics.rows_inserted, 1);
        assert_eq!(ctx.metrics.rows_updated, 1);
        assert_eq!(ctx.metrics.rows_skipped, 0);
        assert_eq!(ctx.metrics.bytes_written, bytes);
    }
}
