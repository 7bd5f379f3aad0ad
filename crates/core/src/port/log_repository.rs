// Execution Log Repository Port (Interface)
// Append-only: there is deliberately no update method.

use crate::domain::{ExecutionLog, LogId, NewExecutionLog};
use crate::error::Result;
use crate::port::filter::LogFilter;
use async_trait::async_trait;

#[async_trait]
pub trait LogRepository: Send + Sync {
    /// Append a log row
    async fn insert(&self, log: &NewExecutionLog) -> Result<ExecutionLog>;

    /// Find log by ID
    async fn find_by_id(&self, id: LogId) -> Result<Option<ExecutionLog>>;

    /// Count logs matching the filter
    async fn count(&self, filter: &LogFilter) -> Result<i64>;

    /// List logs matching the filter, newest first
    async fn list(&self, filter: &LogFilter, limit: i64, offset: i64)
        -> Result<Vec<ExecutionLog>>;
}
