// Execution Log Domain Model
// One immutable row per finished execution attempt

use crate::domain::run::elapsed_secs;
use serde::{Deserialize, Serialize};

/// Log ID (store-assigned)
pub type LogId = i64;

/// A finished execution attempt, before it is persisted
#[derive(Debug, Clone)]
pub struct NewExecutionLog {
    pub playbook: String,
    pub success: bool,
    pub output: String,
    pub error: String,
    pub start_time: i64,
    pub end_time: i64,
    pub duration: f64,
}

impl NewExecutionLog {
    /// `error` is `None` when the attempt succeeded
    pub fn new(
        playbook: impl Into<String>,
        start_time: i64,
        end_time: i64,
        output: impl Into<String>,
        error: Option<String>,
    ) -> Self {
        let end_time = end_time.max(start_time);
        Self {
            playbook: playbook.into(),
            success: error.is_none(),
            output: output.into(),
            error: error.unwrap_or_default(),
            start_time,
            end_time,
            duration: elapsed_secs(start_time, end_time),
        }
    }
}

/// Execution log entity (read-only once stored)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionLog {
    pub id: LogId,
    pub playbook: String,
    pub success: bool,
    pub output: String,
    pub error: String,
    pub start_time: i64,
    pub end_time: i64,
    pub duration: f64,
}

impl ExecutionLog {
    pub fn from_new(id: LogId, new: NewExecutionLog) -> Self {
        Self {
            id,
            playbook: new.playbook,
            success: new.success,
            output: new.output,
            error: new.error,
            start_time: new.start_time,
            end_time: new.end_time,
            duration: new.duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_follows_error() {
        let ok = NewExecutionLog::new("site.yml", 0, 1_500, "ok", None);
        assert!(ok.success);
        assert!(ok.error.is_empty());
        assert_eq!(ok.duration, 1.5);

        let failed = NewExecutionLog::new("site.yml", 0, 10, "", Some("exit status 1".into()));
        assert!(!failed.success);
        assert_eq!(failed.error, "exit status 1");
    }
}
