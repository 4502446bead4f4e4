//! Execution engine settings, read from a TOML file:
//!
//! ```toml
//! [temp-tables]
//! max-bytes = 104857600
//! log-threshold-bytes = 52428800
//! ```

use anyhow::Context;
use partdb_table::temp_table::TempTableLimits;
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize, Default, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ExecutionConfig {
    #[serde(default)]
    pub temp_tables: TempTablesConfig,
}

/// Memory limits for the transient relations of an execution.
/// Unset means unlimited.
#[derive(Deserialize, Default, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct TempTablesConfig {
    pub max_bytes: Option<usize>,
    pub log_threshold_bytes: Option<usize>,
}

impl ExecutionConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&contents).with_context(|| format!("config file {} is invalid", path.display()))
    }

    pub fn temp_table_limits(&self) -> TempTableLimits {
        let TempTablesConfig {
            max_bytes,
            log_threshold_bytes,
        } = self.temp_tables;
        TempTableLimits {
            max_bytes,
            log_threshold_bytes,
        }
    }
}
