// Application Layer - Use Cases and Business Logic

pub mod constants;
pub mod execution;
pub mod inventory;
pub mod orchestrator;
pub mod prober;
pub mod query;
pub mod retention;
mod shutdown;

use crate::port::{CheckRepository, InventoryRepository, LogRepository, RunRepository};
use std::sync::Arc;

// Re-exports
pub use execution::{Accepted, ExecutionConfig};
pub use inventory::InventoryService;
pub use orchestrator::{ExecutionSlot, Orchestrator, SubmitRunRequest};
pub use prober::Prober;
pub use query::{Page, QueryService};
pub use retention::RetentionSweeper;
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

/// Record stores shared by the use cases
#[derive(Clone)]
pub struct Stores {
    pub runs: Arc<dyn RunRepository>,
    pub logs: Arc<dyn LogRepository>,
    pub checks: Arc<dyn CheckRepository>,
    pub inventories: Arc<dyn InventoryRepository>,
}
