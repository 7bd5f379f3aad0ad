// Shared execution plumbing for runs and probes
//
// - `Accepted`: handle returned by non-blocking submissions
// - `execute_isolated`: runs the executor on its own task so a panic or a
//   deadline turns into an error instead of a stuck record

use crate::port::{ExecutionError, ExecutionOutcome, ExecutionRequest, PlaybookExecutor};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, warn};

/// Execution settings shared by the orchestrator and the prober
#[derive(Debug, Clone, Default)]
pub struct ExecutionConfig {
    /// Hard wall-clock deadline for one subprocess call (None = unbounded)
    pub timeout: Option<Duration>,
}

/// A submission whose record exists and whose work runs in the background
///
/// Dropping this value detaches the background task; it keeps running.
#[derive(Debug)]
pub struct Accepted<Id> {
    pub id: Id,
    handle: JoinHandle<()>,
}

impl<Id: Copy> Accepted<Id> {
    pub(crate) fn new(id: Id, handle: JoinHandle<()>) -> Self {
        Self { id, handle }
    }

    /// Wait until the background task has finalized the record
    pub async fn finished(self) -> Id {
        if let Err(e) = self.handle.await {
            error!(error = %e, "Background task did not finish cleanly");
        }
        self.id
    }
}

/// Run the executor on a dedicated task with an optional deadline
///
/// On deadline the task is aborted and awaited, so the executor future has
/// been dropped (child killed, temporary files removed) before this returns.
pub(crate) async fn execute_isolated(
    executor: &Arc<dyn PlaybookExecutor>,
    request: ExecutionRequest,
    timeout: Option<Duration>,
) -> Result<ExecutionOutcome, ExecutionError> {
    let executor = Arc::clone(executor);
    let mut handle = tokio::spawn(async move { executor.execute(&request).await });

    let joined = match timeout {
        Some(limit) => match tokio::time::timeout(limit, &mut handle).await {
            Ok(joined) => joined,
            Err(_) => {
                handle.abort();
                let _ = handle.await;
                warn!(timeout_ms = limit.as_millis() as i64, "Execution deadline exceeded");
                return Err(ExecutionError::Timeout(limit.as_millis() as i64));
            }
        },
        None => handle.await,
    };

    match joined {
        Ok(result) => result,
        Err(join_err) if join_err.is_panic() => {
            let msg = panic_message(join_err.into_panic());
            error!(panic_msg = %msg, "Executor panicked");
            Err(ExecutionError::Panicked(msg))
        }
        Err(join_err) => Err(ExecutionError::IoError(join_err.to_string())),
    }
}

/// Extract a readable message from a panic payload
fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
