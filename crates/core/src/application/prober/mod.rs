// Connectivity Prober - reachability checks for inventories
//
// Probes never take the execution slot: they may run concurrently with each
// other and with playbook runs.

pub mod parser;
pub mod script;

pub use parser::parse_reachability;
pub use script::REACHABILITY_PLAYBOOK;

use crate::application::execution::{execute_isolated, Accepted, ExecutionConfig};
use crate::application::Stores;
use crate::domain::{
    validate_inventory_name, CheckId, ExtraVars, HostResults, InventoryCheck, InventoryId,
};
use crate::error::{AppError, Result};
use crate::port::{ExecutionRequest, PlaybookExecutor, PlaybookSource, TimeProvider};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Connectivity Prober
#[derive(Clone)]
pub struct Prober {
    stores: Stores,
    executor: Arc<dyn PlaybookExecutor>,
    time_provider: Arc<dyn TimeProvider>,
    config: ExecutionConfig,
}

impl Prober {
    pub fn new(
        stores: Stores,
        executor: Arc<dyn PlaybookExecutor>,
        time_provider: Arc<dyn TimeProvider>,
        config: ExecutionConfig,
    ) -> Self {
        Self {
            stores,
            executor,
            time_provider,
            config,
        }
    }

    /// Start a reachability check for a named inventory
    ///
    /// # Errors
    /// - AppError::NotFound if the inventory does not exist (no check is created)
    /// - AppError::Database if the check cannot be recorded
    pub async fn probe(&self, inventory_name: &str) -> Result<Accepted<CheckId>> {
        validate_inventory_name(inventory_name)?;

        let inventory = self
            .stores
            .inventories
            .find_by_name(inventory_name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Inventory {} not found", inventory_name)))?;

        let check = self
            .stores
            .checks
            .insert(inventory.id, self.time_provider.now_millis())
            .await?;

        info!(
            check_id = check.id,
            inventory = %inventory.name,
            "Inventory check accepted"
        );

        let check_id = check.id;
        let this = self.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = this.run_check(check).await {
                error!(check_id = check_id, error = %e, "Inventory check finalization failed");
            }
        });

        Ok(Accepted::new(check_id, handle))
    }

    /// Background continuation: running -> completed | failed
    async fn run_check(&self, mut check: InventoryCheck) -> Result<()> {
        check.start()?;
        self.stores.checks.update(&check).await?;

        let outcome = self.probe_inventory(check.inventory_id).await;
        let now = self.time_provider.now_millis();

        match outcome {
            Ok(results) => {
                info!(
                    check_id = check.id,
                    hosts = results.len(),
                    "Inventory check completed"
                );
                check.complete(now, results)?;
            }
            Err(err) => {
                warn!(check_id = check.id, error = %err, "Inventory check failed");
                check.fail(now, err)?;
            }
        }

        self.stores.checks.update(&check).await
    }

    async fn probe_inventory(&self, inventory_id: InventoryId) -> std::result::Result<HostResults, String> {
        let inventory = match self.stores.inventories.find_by_id(inventory_id).await {
            Ok(Some(inventory)) => inventory,
            Ok(None) => return Err(format!("Inventory {} not found", inventory_id)),
            Err(e) => return Err(e.to_string()),
        };

        let request = ExecutionRequest {
            playbook: PlaybookSource::Inline(REACHABILITY_PLAYBOOK.to_string()),
            inventory: Some(inventory.content),
            extra_vars: ExtraVars::new(),
        };

        let outcome = execute_isolated(&self.executor, request, self.config.timeout)
            .await
            .map_err(|e| e.to_string())?;

        if let Some(failure) = outcome.failure_message() {
            return Err(failure);
        }

        Ok(parse_reachability(&outcome.output))
    }
}
