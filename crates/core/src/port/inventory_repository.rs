// Inventory Repository Port (Interface)
// Also serves as the inventory content provider for runs and probes.

use crate::domain::{Inventory, InventoryId};
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Create an inventory. Conflict if the name is taken.
    async fn create(&self, name: &str, content: &str, now_millis: i64) -> Result<Inventory>;

    /// Find inventory by unique name
    async fn find_by_name(&self, name: &str) -> Result<Option<Inventory>>;

    /// Find inventory by ID
    async fn find_by_id(&self, id: InventoryId) -> Result<Option<Inventory>>;

    /// List all inventories ordered by name
    async fn list(&self) -> Result<Vec<Inventory>>;

    /// Replace the content of a named inventory. NotFound if absent.
    async fn update_content(&self, name: &str, content: &str, now_millis: i64)
        -> Result<Inventory>;

    /// Hard delete by name. Returns false if nothing was deleted.
    async fn delete(&self, name: &str) -> Result<bool>;
}
