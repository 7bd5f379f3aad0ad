// Port Layer - Interfaces for external dependencies

pub mod check_repository;
pub mod filter;
pub mod inventory_repository;
pub mod log_repository;
pub mod playbook_catalog;
pub mod playbook_executor;
pub mod retention;
pub mod run_repository;
pub mod time_provider;

// Re-exports
pub use check_repository::CheckRepository;
pub use filter::{CheckFilter, LogFilter, RunFilter, TimeRange};
pub use inventory_repository::InventoryRepository;
pub use log_repository::LogRepository;
pub use playbook_catalog::PlaybookCatalog;
pub use playbook_executor::{
    ExecutionError, ExecutionOutcome, ExecutionRequest, PlaybookExecutor, PlaybookSource,
};
pub use retention::{RetentionConfig, RetentionStore, SweepReport};
pub use run_repository::RunRepository;
pub use time_provider::TimeProvider;
