// Execution Orchestrator - accepts runs and serializes playbook execution

pub mod submit;
mod submit_test;

pub use submit::{validate_request, SubmitRunRequest};

use crate::application::execution::{execute_isolated, Accepted, ExecutionConfig};
use crate::application::Stores;
use crate::domain::{NewExecutionLog, NewRun, Run, RunId};
use crate::error::{AppError, Result};
use crate::port::{ExecutionRequest, PlaybookCatalog, PlaybookExecutor, PlaybookSource, TimeProvider};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, error, info, warn};

/// The single permit required to invoke the automation binary for a run
///
/// Cloning shares the permit. Waiters are served in whatever order the lock
/// grants them; no queue ordering is promised to callers.
#[derive(Clone, Default)]
pub struct ExecutionSlot {
    inner: Arc<Mutex<()>>,
}

impl ExecutionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self) -> OwnedMutexGuard<()> {
        Arc::clone(&self.inner).lock_owned().await
    }
}

/// Execution Orchestrator
#[derive(Clone)]
pub struct Orchestrator {
    stores: Stores,
    playbooks: Arc<dyn PlaybookCatalog>,
    executor: Arc<dyn PlaybookExecutor>,
    slot: ExecutionSlot,
    time_provider: Arc<dyn TimeProvider>,
    config: ExecutionConfig,
}

impl Orchestrator {
    pub fn new(
        stores: Stores,
        playbooks: Arc<dyn PlaybookCatalog>,
        executor: Arc<dyn PlaybookExecutor>,
        slot: ExecutionSlot,
        time_provider: Arc<dyn TimeProvider>,
        config: ExecutionConfig,
    ) -> Self {
        Self {
            stores,
            playbooks,
            executor,
            slot,
            time_provider,
            config,
        }
    }

    /// Accept a run request
    ///
    /// Validates, resolves the playbook, persists a `started` run and returns
    /// without waiting for execution.
    ///
    /// # Errors
    /// - AppError::Validation for malformed requests
    /// - AppError::NotFound for an unknown playbook or inventory
    /// - AppError::Database if the run cannot be recorded
    pub async fn submit(&self, req: SubmitRunRequest) -> Result<Accepted<RunId>> {
        validate_request(&req)?;

        let playbook = req.playbook.trim().to_string();
        let playbook_path = self.playbooks.resolve(&playbook).await?;

        let inventory = req.inventory_name().map(str::to_string);
        if let Some(name) = &inventory {
            if self.stores.inventories.find_by_name(name).await?.is_none() {
                return Err(AppError::NotFound(format!("Inventory {} not found", name)));
            }
        }

        let run = self
            .stores
            .runs
            .insert(&NewRun {
                playbook,
                inventory,
                start_time: self.time_provider.now_millis(),
                triggered_by: req.originator(),
                extra_vars: req.extra_vars,
            })
            .await?;

        info!(
            run_id = run.id,
            playbook = %run.playbook,
            inventory = ?run.inventory,
            triggered_by = %run.triggered_by,
            "Run accepted"
        );

        let run_id = run.id;
        let this = self.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = this.execute_run(run, playbook_path).await {
                error!(run_id = run_id, error = %e, "Run finalization failed");
            }
        });

        Ok(Accepted::new(run_id, handle))
    }

    /// Background continuation: wait for the slot, execute, finalize
    async fn execute_run(&self, mut run: Run, playbook_path: PathBuf) -> Result<()> {
        let permit = self.slot.acquire().await;
        debug!(run_id = run.id, "Execution slot acquired");

        let started_at = self.time_provider.now_millis();
        let (output, failure) = self.attempt(&run, playbook_path).await;
        let finished_at = self.time_provider.now_millis();

        drop(permit);

        // One log row per attempt, whatever happens to the run update
        let log = NewExecutionLog::new(
            run.playbook.clone(),
            started_at,
            finished_at,
            output.clone(),
            failure.clone(),
        );
        if let Err(e) = self.stores.logs.insert(&log).await {
            error!(run_id = run.id, error = %e, "Failed to write execution log");
        }

        match failure {
            None => run.complete(finished_at, output)?,
            Some(err) => {
                warn!(run_id = run.id, error = %err, "Run failed");
                run.fail(finished_at, output, err)?
            }
        }
        self.stores.runs.finalize(&run).await?;

        info!(
            run_id = run.id,
            status = %run.status,
            duration_secs = run.duration.unwrap_or_default(),
            "Run finished"
        );
        Ok(())
    }

    /// Execute once; returns captured output and the failure text, if any
    async fn attempt(&self, run: &Run, playbook_path: PathBuf) -> (String, Option<String>) {
        let inventory = match &run.inventory {
            None => None,
            Some(name) => match self.stores.inventories.find_by_name(name).await {
                Ok(Some(inventory)) => Some(inventory.content),
                Ok(None) => {
                    return (String::new(), Some(format!("Inventory {} not found", name)));
                }
                Err(e) => return (String::new(), Some(e.to_string())),
            },
        };

        let request = ExecutionRequest {
            playbook: PlaybookSource::Path(playbook_path),
            inventory,
            extra_vars: run.extra_vars.clone(),
        };

        match execute_isolated(&self.executor, request, self.config.timeout).await {
            Ok(outcome) => {
                let failure = outcome.failure_message();
                (outcome.output, failure)
            }
            Err(e) => (String::new(), Some(e.to_string())),
        }
    }
}
