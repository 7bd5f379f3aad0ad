// Inventory Service - CRUD over named inventories

use crate::domain::{validate_inventory_name, Inventory};
use crate::error::{AppError, Result};
use crate::port::{InventoryRepository, TimeProvider};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct InventoryService {
    inventories: Arc<dyn InventoryRepository>,
    time_provider: Arc<dyn TimeProvider>,
}

impl InventoryService {
    pub fn new(
        inventories: Arc<dyn InventoryRepository>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            inventories,
            time_provider,
        }
    }

    /// # Errors
    /// - AppError::Domain for an invalid name
    /// - AppError::Conflict if the name is taken
    pub async fn create(&self, name: &str, content: &str) -> Result<Inventory> {
        let name = name.trim();
        validate_inventory_name(name)?;

        let inventory = self
            .inventories
            .create(name, content, self.time_provider.now_millis())
            .await?;
        info!(inventory_id = inventory.id, name = %inventory.name, "Inventory created");
        Ok(inventory)
    }

    pub async fn get(&self, name: &str) -> Result<Inventory> {
        self.inventories
            .find_by_name(name.trim())
            .await?
            .ok_or_else(|| not_found(name))
    }

    pub async fn list(&self) -> Result<Vec<Inventory>> {
        self.inventories.list().await
    }

    pub async fn update(&self, name: &str, content: &str) -> Result<Inventory> {
        let name = name.trim();
        validate_inventory_name(name)?;

        let inventory = self
            .inventories
            .update_content(name, content, self.time_provider.now_millis())
            .await?;
        info!(inventory_id = inventory.id, name = %inventory.name, "Inventory updated");
        Ok(inventory)
    }

    /// Hard delete. Existing runs keep the name they were submitted with.
    pub async fn delete(&self, name: &str) -> Result<()> {
        let name = name.trim();
        if !self.inventories.delete(name).await? {
            return Err(not_found(name));
        }
        info!(name = %name, "Inventory deleted");
        Ok(())
    }
}

fn not_found(name: &str) -> AppError {
    AppError::NotFound(format!("Inventory {} not found", name.trim()))
}
