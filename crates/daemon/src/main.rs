//! Playdeck - Daemon Entry Point
//! JSON-RPC server + retention sweeper over a SQLite record store

mod settings;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::settings::Settings;
use playdeck_api_rpc::{RpcHandler, RpcServer, RpcServerConfig};
use playdeck_core::application::{
    shutdown_channel, ExecutionSlot, InventoryService, Orchestrator, Prober, QueryService,
    RetentionSweeper, Stores,
};
use playdeck_core::port::time_provider::SystemTimeProvider;
use playdeck_core::port::{PlaybookCatalog, PlaybookExecutor, TimeProvider};
use playdeck_infra_sqlite::{
    create_pool, run_migrations, SqliteCheckRepository, SqliteInventoryRepository,
    SqliteLogRepository, SqliteRetention, SqliteRunRepository,
};
use playdeck_infra_system::{AnsibleExecutor, FsPlaybookCatalog};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn init_tracing() -> Result<()> {
    let log_format =
        std::env::var("PLAYDECK_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("playdeck=info"))
        .context("Failed to create env filter")?;

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Logging
    init_tracing()?;
    info!("Playdeck v{} starting...", VERSION);

    // 2. Configuration
    let settings = Settings::load()?;
    let playbooks_dir = settings.playbooks_dir();
    std::fs::create_dir_all(&playbooks_dir).with_context(|| {
        format!(
            "Failed to create playbooks directory {}",
            playbooks_dir.display()
        )
    })?;
    if let Some(parent) = settings.database_file().as_deref().and_then(|p| p.parent()) {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    // 3. Database
    let database_url = settings.database_url();
    info!(database = %database_url, "Initializing database...");
    let pool = create_pool(&database_url)
        .await
        .context("DB pool creation failed")?;
    run_migrations(&pool).await.context("Migration failed")?;

    // 4. Dependencies (DI wiring)
    let time_provider: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
    let stores = Stores {
        runs: Arc::new(SqliteRunRepository::new(pool.clone())),
        logs: Arc::new(SqliteLogRepository::new(pool.clone())),
        checks: Arc::new(SqliteCheckRepository::new(pool.clone())),
        inventories: Arc::new(SqliteInventoryRepository::new(pool.clone())),
    };
    let playbooks: Arc<dyn PlaybookCatalog> = Arc::new(FsPlaybookCatalog::new(&playbooks_dir));
    let executor: Arc<dyn PlaybookExecutor> = Arc::new(AnsibleExecutor::new(
        settings.playbooks.binary.clone(),
        time_provider.clone(),
    ));
    let execution_config = settings.execution_config();

    let orchestrator = Orchestrator::new(
        stores.clone(),
        playbooks.clone(),
        executor.clone(),
        ExecutionSlot::new(),
        time_provider.clone(),
        execution_config.clone(),
    );
    let prober = Prober::new(
        stores.clone(),
        executor,
        time_provider.clone(),
        execution_config,
    );
    let query = QueryService::new(stores.clone(), settings.query.page_size);
    let inventories = InventoryService::new(stores.inventories.clone(), time_provider.clone());
    let sweeper = Arc::new(RetentionSweeper::new(
        Arc::new(SqliteRetention::new(pool.clone())),
        time_provider,
        settings.retention_config(),
    ));
    let scheduled_sweeper = sweeper.clone();

    info!(
        playbooks_dir = %playbooks_dir.display(),
        binary = %settings.playbooks.binary,
        page_size = settings.query.page_size,
        retention_days = settings.retention.days,
        "Services configured"
    );

    // 5. JSON-RPC server
    let rpc_server = RpcServer::new(
        RpcServerConfig {
            host: settings.server.host.clone(),
            port: settings.server.port,
        },
        RpcHandler::new(
            orchestrator,
            prober,
            query,
            inventories,
            playbooks,
            sweeper,
        ),
    );
    let (addr, rpc_handle) = rpc_server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    // 6. Retention sweeper
    let (shutdown_tx, shutdown_token) = shutdown_channel();
    let sweeper_handle = tokio::spawn(async move { scheduled_sweeper.run(shutdown_token).await });

    info!(addr = %addr, "System ready");
    info!("Press Ctrl+C to shutdown");

    // 7. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Exiting gracefully...");

    // 8. Graceful shutdown; in-flight runs are abandoned with the process
    shutdown_tx.shutdown();
    if let Err(e) = rpc_handle.stop() {
        error!(error = %e, "RPC server stop failed");
    }
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), sweeper_handle).await;
    pool.close().await;

    info!("Shutdown complete.");
    Ok(())
}
