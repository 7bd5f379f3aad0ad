// Playbook Executor Port
// Abstraction over the external automation binary (opaque subprocess)

use crate::domain::ExtraVars;
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// What to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybookSource {
    /// Existing playbook file
    Path(PathBuf),
    /// Script content, materialized to a temporary file by the executor
    Inline(String),
}

/// One invocation of the automation binary
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub playbook: PlaybookSource,
    /// Raw inventory content, materialized to a temporary file when present
    pub inventory: Option<String>,
    pub extra_vars: ExtraVars,
}

/// Outcome of a process that was launched and ran to exit
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    /// Combined stdout + stderr, captured verbatim
    pub output: String,
    /// Exit code, `None` if the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub duration_ms: i64,
}

impl ExecutionOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Error text for a non-successful exit, `None` on success
    pub fn failure_message(&self) -> Option<String> {
        match self.exit_code {
            Some(0) => None,
            Some(code) => Some(format!("exit status {}", code)),
            None => Some("process terminated by signal".to_string()),
        }
    }
}

/// Execution errors (the process never produced an exit status)
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Process timeout after {0}ms")]
    Timeout(i64),

    #[error("Failed to materialize temporary file: {0}")]
    Materialize(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Executor panicked: {0}")]
    Panicked(String),
}

/// Playbook Executor trait
///
/// Implementations:
/// - AnsibleExecutor: spawns the configured automation binary
#[async_trait]
pub trait PlaybookExecutor: Send + Sync {
    /// Run the binary to completion and capture its output
    ///
    /// A non-zero exit is returned as `Ok` with the exit code set; the caller
    /// decides success from it.
    ///
    /// # Errors
    /// - ExecutionError::SpawnFailed if the binary cannot be started
    /// - ExecutionError::Materialize if a temporary file cannot be written
    async fn execute(&self, request: &ExecutionRequest)
        -> Result<ExecutionOutcome, ExecutionError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    /// Mock executor behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Exit with the given code and output
        Exit { code: i32, output: String },
        /// Fail to launch
        LaunchFailure(String),
    }

    /// Entry/exit timestamps of one mock invocation
    #[derive(Debug, Clone, Copy)]
    pub struct Interval {
        pub entered: Instant,
        pub exited: Instant,
    }

    impl Interval {
        pub fn overlaps(&self, other: &Interval) -> bool {
            self.entered < other.exited && other.entered < self.exited
        }
    }

    /// Mock Playbook Executor for testing
    pub struct MockExecutor {
        behavior: Arc<Mutex<MockBehavior>>,
        delay: Duration,
        requests: Arc<Mutex<Vec<ExecutionRequest>>>,
        intervals: Arc<Mutex<Vec<Interval>>>,
    }

    impl MockExecutor {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                delay: Duration::ZERO,
                requests: Arc::new(Mutex::new(Vec::new())),
                intervals: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn new_success(output: impl Into<String>) -> Self {
            Self::new(MockBehavior::Exit {
                code: 0,
                output: output.into(),
            })
        }

        pub fn new_exit(code: i32, output: impl Into<String>) -> Self {
            Self::new(MockBehavior::Exit {
                code,
                output: output.into(),
            })
        }

        pub fn new_launch_failure(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::LaunchFailure(message.into()))
        }

        /// Hold each invocation open for `delay`
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub fn set_behavior(&self, behavior: MockBehavior) {
            *self.behavior.lock().unwrap() = behavior;
        }

        pub fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn requests(&self) -> Vec<ExecutionRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn intervals(&self) -> Vec<Interval> {
            self.intervals.lock().unwrap().clone()
        }

        /// True if any two recorded invocations overlapped in time
        pub fn any_overlap(&self) -> bool {
            let intervals = self.intervals();
            intervals.iter().enumerate().any(|(i, a)| {
                intervals[i + 1..].iter().any(|b| a.overlaps(b))
            })
        }
    }

    #[async_trait]
    impl PlaybookExecutor for MockExecutor {
        async fn execute(
            &self,
            request: &ExecutionRequest,
        ) -> Result<ExecutionOutcome, ExecutionError> {
            self.requests.lock().unwrap().push(request.clone());
            let entered = Instant::now();

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let exited = Instant::now();
            self.intervals
                .lock()
                .unwrap()
                .push(Interval { entered, exited });

            let behavior = self.behavior.lock().unwrap().clone();
            match behavior {
                MockBehavior::Exit { code, output } => Ok(ExecutionOutcome {
                    output,
                    exit_code: Some(code),
                    duration_ms: (exited - entered).as_millis() as i64,
                }),
                MockBehavior::LaunchFailure(msg) => Err(ExecutionError::SpawnFailed(msg)),
            }
        }
    }
}
