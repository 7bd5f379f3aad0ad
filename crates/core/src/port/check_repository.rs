// Inventory Check Repository Port (Interface)

use crate::domain::{CheckId, InventoryCheck, InventoryId};
use crate::error::Result;
use crate::port::filter::CheckFilter;
use async_trait::async_trait;

#[async_trait]
pub trait CheckRepository: Send + Sync {
    /// Insert a `pending` check for an inventory
    async fn insert(&self, inventory_id: InventoryId, started_at: i64) -> Result<InventoryCheck>;

    /// Find check by ID
    async fn find_by_id(&self, id: CheckId) -> Result<Option<InventoryCheck>>;

    /// Persist status, results, error and completed_at
    async fn update(&self, check: &InventoryCheck) -> Result<()>;

    /// Count checks matching the filter
    async fn count(&self, filter: &CheckFilter) -> Result<i64>;

    /// List checks matching the filter, newest first
    async fn list(
        &self,
        filter: &CheckFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<InventoryCheck>>;
}
