use crate::{config::ExecutionConfig, locality::PartitionLocality, metrics::ExecutionMetrics};
use partdb_table::temp_table::TempTableLimits;

/// The state an execution engine shares with the executors it runs.
///
/// Passed to each executor explicitly.
/// It outlives any single execution,
/// so its counters accumulate over every statement run with it.
pub struct ExecutionContext<'a> {
    locality: &'a dyn PartitionLocality,
    temp_table_limits: TempTableLimits,
    /// The total number of rows modified by every execution so far.
    tuples_modified: i64,
    pub metrics: ExecutionMetrics,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(locality: &'a dyn PartitionLocality) -> Self {
        Self {
            locality,
            temp_table_limits: TempTableLimits::default(),
            tuples_modified: 0,
            metrics: ExecutionMetrics::default(),
        }
    }

    pub fn from_config(locality: &'a dyn PartitionLocality, config: &ExecutionConfig) -> Self {
        Self::new(locality).with_temp_table_limits(config.temp_table_limits())
    }

    pub fn with_temp_table_limits(self, temp_table_limits: TempTableLimits) -> Self {
        Self {
            temp_table_limits,
            ..self
        }
    }

    pub fn locality(&self) -> &dyn PartitionLocality {
        self.locality
    }

    pub fn temp_table_limits(&self) -> TempTableLimits {
        self.temp_table_limits
    }

    pub fn tuples_modified(&self) -> i64 {
        self.tuples_modified
    }

    pub fn add_tuples_modified(&mut self, count: i64) {
        self.tuples_modified += count;
    }
}
