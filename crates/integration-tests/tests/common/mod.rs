//! Shared wiring for the integration tests: in-memory SQLite plus mock ports

#![allow(dead_code)]

use std::sync::Arc;

use playdeck_core::application::{
    ExecutionConfig, ExecutionSlot, InventoryService, Orchestrator, Prober, QueryService,
    RetentionSweeper, Stores,
};
use playdeck_core::port::playbook_catalog::mocks::StaticCatalog;
use playdeck_core::port::playbook_executor::mocks::MockExecutor;
use playdeck_core::port::time_provider::mocks::ManualClock;
use playdeck_core::port::{PlaybookCatalog, PlaybookExecutor, RetentionConfig, TimeProvider};
use playdeck_infra_sqlite::{
    create_pool, run_migrations, SqliteCheckRepository, SqliteInventoryRepository,
    SqliteLogRepository, SqliteRetention, SqliteRunRepository,
};

pub const DAY: i64 = 24 * 60 * 60 * 1000;

/// 2024-01-01T00:00:00Z
pub const EPOCH_2024: i64 = 1_704_067_200_000;

pub const PLAYBOOKS: &[&str] = &["deploy.yml", "site.yml", "backup.yml"];

pub struct Harness {
    pub stores: Stores,
    pub executor: Arc<MockExecutor>,
    pub catalog: Arc<dyn PlaybookCatalog>,
    pub time_provider: Arc<dyn TimeProvider>,
    pub orchestrator: Orchestrator,
    pub prober: Prober,
    pub query: QueryService,
    pub inventories: InventoryService,
    pub sweeper: Arc<RetentionSweeper>,
}

pub async fn harness(executor: MockExecutor) -> Harness {
    harness_with_clock(executor, Arc::new(ManualClock::new(EPOCH_2024))).await
}

pub async fn harness_with_clock(
    executor: MockExecutor,
    time_provider: Arc<dyn TimeProvider>,
) -> Harness {
    let pool = create_pool(":memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();

    let stores = Stores {
        runs: Arc::new(SqliteRunRepository::new(pool.clone())),
        logs: Arc::new(SqliteLogRepository::new(pool.clone())),
        checks: Arc::new(SqliteCheckRepository::new(pool.clone())),
        inventories: Arc::new(SqliteInventoryRepository::new(pool.clone())),
    };

    let executor = Arc::new(executor);
    let dyn_executor: Arc<dyn PlaybookExecutor> = executor.clone();
    let catalog: Arc<dyn PlaybookCatalog> = Arc::new(StaticCatalog::new(PLAYBOOKS.iter().copied()));
    let config = ExecutionConfig::default();

    let orchestrator = Orchestrator::new(
        stores.clone(),
        catalog.clone(),
        dyn_executor.clone(),
        ExecutionSlot::new(),
        time_provider.clone(),
        config.clone(),
    );
    let prober = Prober::new(
        stores.clone(),
        dyn_executor,
        time_provider.clone(),
        config,
    );
    let query = QueryService::new(stores.clone(), 10);
    let inventories = InventoryService::new(stores.inventories.clone(), time_provider.clone());
    let sweeper = Arc::new(RetentionSweeper::new(
        Arc::new(SqliteRetention::new(pool)),
        time_provider.clone(),
        RetentionConfig::default(),
    ));

    Harness {
        stores,
        executor,
        catalog,
        time_provider,
        orchestrator,
        prober,
        query,
        inventories,
        sweeper,
    }
}
