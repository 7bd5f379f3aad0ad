// Retention port - age-based deletion across the three record tables
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;

/// Retention configuration
#[derive(Debug, Clone)]
pub struct RetentionConfig {
    /// Records whose start time is older than this many days are deleted
    pub retention_days: i64,

    /// How often the sweeper runs (hours)
    pub sweep_interval_hours: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            retention_days: 30,
            sweep_interval_hours: 24,
        }
    }
}

/// Outcome of one sweep. `None` means that table's deletion failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub cutoff: i64,
    pub logs_deleted: Option<u64>,
    pub runs_deleted: Option<u64>,
    pub checks_deleted: Option<u64>,
}

/// Store-side deletions, one table per call
///
/// Each method deletes rows whose start timestamp is strictly before `cutoff`
/// (epoch ms) and returns the number of rows removed.
#[async_trait]
pub trait RetentionStore: Send + Sync {
    async fn delete_logs_before(&self, cutoff: i64) -> Result<u64>;

    async fn delete_runs_before(&self, cutoff: i64) -> Result<u64>;

    async fn delete_checks_before(&self, cutoff: i64) -> Result<u64>;
}
