/// Metrics collected during the course of an execution
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExecutionMetrics {
    /// How many times is an index probed?
    pub index_seeks: usize,
    /// How many input rows are iterated over?
    ///
    /// Rows skipped because another partition owns them are scanned too.
    pub rows_scanned: usize,
    /// How many rows were inserted as new rows?
    pub rows_inserted: u64,
    /// How many resident rows were replaced?
    pub rows_updated: u64,
    /// How many rows were left alone because another partition owns them?
    pub rows_skipped: u64,
    /// How many bytes are written?
    ///
    /// Updates count the full size of the new row.
    pub bytes_written: usize,
}

impl ExecutionMetrics {
    pub fn merge(
        &mut self,
        ExecutionMetrics {
            index_seeks,
            rows_scanned,
            rows_inserted,
            rows_updated,
            rows_skipped,
            bytes_written,
        }: ExecutionMetrics,
    ) {
        self.index_seeks += index_seeks;
        self.rows_scanned += rows_scanned;
        self.rows_inserted += rows_inserted;
        self.rows_updated += rows_updated;
        self.rows_skipped += rows_skipped;
        self.bytes_written += bytes_written;
    }
}

#[cfg(test)]
mod tests {
    use super::ExecutionMetrics;

    #[test]
    fn test_merge() {
        let mut a = ExecutionMetrics::default();

        a.merge(ExecutionMetrics {
            index_seeks: 1,
            rows_scanned: 1,
            rows_inserted: 1,
            rows_updated: 1,
            rows_skipped: 1,
            bytes_written: 1,
        });

        assert_eq!(a.index_seeks, 1);
        assert_eq!(a.rows_scanned, 1);
        assert_eq!(a.rows_inserted, 1);
        assert_eq!(a.rows_updated, 1);
        assert_eq!(a.rows_skipped, 1);
        assert_eq!(a.bytes_written, 1);

        a.merge(ExecutionMetrics {
            index_seeks: 2,
            rows_updated: 3,
            ..Default::default()
        });

        assert_eq!(a.index_seeks, 3);
        assert_eq!(a.rows_updated, 4);
        assert_eq!(a.rows_inserted, 1);
    }
}
