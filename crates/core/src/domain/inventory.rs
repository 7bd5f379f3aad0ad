// Inventory Domain Model

use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Inventory ID (store-assigned)
pub type InventoryId = i64;

/// Maximum inventory name length
pub const MAX_INVENTORY_NAME_LEN: usize = 255;

/// Named inventory (raw inventory-file syntax, opaque to the core)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    pub id: InventoryId,
    pub name: String,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Validate an inventory name before it becomes a lookup key
pub fn validate_inventory_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(DomainError::ValidationError(
            "Inventory name cannot be empty".to_string(),
        ));
    }
    if name.len() > MAX_INVENTORY_NAME_LEN {
        return Err(DomainError::ValidationError(format!(
            "Inventory name too long (max {} chars)",
            MAX_INVENTORY_NAME_LEN
        )));
    }
    if name.chars().any(|c| c.is_control()) {
        return Err(DomainError::ValidationError(
            "Inventory name contains control characters".to_string(),
        ));
    }
    Ok(())
}
