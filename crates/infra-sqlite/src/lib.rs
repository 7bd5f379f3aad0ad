// Playdeck Infrastructure - SQLite Adapter
// Implements: RunRepository, LogRepository, CheckRepository,
// InventoryRepository, RetentionStore

mod check_repository;
mod connection;
mod error;
mod filter;
mod inventory_repository;
mod log_repository;
mod migration;
mod retention_impl;
mod run_repository;

pub use check_repository::SqliteCheckRepository;
pub use connection::create_pool;
pub use inventory_repository::SqliteInventoryRepository;
pub use log_repository::SqliteLogRepository;
pub use migration::run_migrations;
pub use retention_impl::SqliteRetention;
pub use run_repository::SqliteRunRepository;
