// Query filters shared by the read-side repository methods
// All set fields are combined with AND.

use crate::domain::{CheckStatus, InventoryId, RunStatus};

/// Inclusive range over a record's start timestamp (epoch ms)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub from: Option<i64>,
    pub to: Option<i64>,
}

impl TimeRange {
    pub fn contains(&self, ts: i64) -> bool {
        self.from.map_or(true, |from| ts >= from) && self.to.map_or(true, |to| ts <= to)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunFilter {
    pub status: Option<RunStatus>,
    pub playbook: Option<String>,
    pub range: TimeRange,
}

#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub success: Option<bool>,
    pub playbook: Option<String>,
    pub range: TimeRange,
}

#[derive(Debug, Clone, Default)]
pub struct CheckFilter {
    pub status: Option<CheckStatus>,
    pub inventory_id: Option<InventoryId>,
    pub range: TimeRange,
}
