// Domain Layer - Pure business logic and entities

pub mod check;
pub mod error;
pub mod inventory;
pub mod log;
pub mod run;

// Re-exports
pub use check::{CheckId, CheckStatus, HostResults, InventoryCheck};
pub use error::DomainError;
pub use inventory::{validate_inventory_name, Inventory, InventoryId};
pub use log::{ExecutionLog, LogId, NewExecutionLog};
pub use run::{elapsed_secs, ExtraVars, NewRun, Run, RunId, RunStatus};
