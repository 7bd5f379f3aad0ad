// Run Repository Port (Interface)

use crate::domain::{NewRun, Run, RunId};
use crate::error::Result;
use crate::port::filter::RunFilter;
use async_trait::async_trait;

/// Repository interface for Run persistence
#[async_trait]
pub trait RunRepository: Send + Sync {
    /// Insert a new run in `started` state, returning it with its assigned ID
    async fn insert(&self, run: &NewRun) -> Result<Run>;

    /// Find run by ID
    async fn find_by_id(&self, id: RunId) -> Result<Option<Run>>;

    /// Terminal write: status, output, error, end_time and duration in one statement.
    /// Fails with InvalidState if the stored run is no longer `started`.
    async fn finalize(&self, run: &Run) -> Result<()>;

    /// Count runs matching the filter
    async fn count(&self, filter: &RunFilter) -> Result<i64>;

    /// List runs matching the filter, newest first
    async fn list(&self, filter: &RunFilter, limit: i64, offset: i64) -> Result<Vec<Run>>;
}
