// Ansible executor: runs the automation binary as an opaque subprocess
//
// Invocation: <binary> <playbook> [-i <inventory-file>] [--extra-vars "k=v k=v"]
// No shell is involved; every argument is passed as its own argv element.
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, info};

use playdeck_core::domain::ExtraVars;
use playdeck_core::port::{
    ExecutionError, ExecutionOutcome, ExecutionRequest, PlaybookExecutor, PlaybookSource,
    TimeProvider,
};
use std::sync::Arc;

/// Default automation binary, resolved through PATH
pub const DEFAULT_BINARY: &str = "ansible-playbook";

/// Spawns `ansible-playbook` (or a configured stand-in) per request
///
/// Temporary files live exactly as long as the call: they are removed when
/// the call returns and also when its future is dropped mid-flight, in which
/// case the child process is killed as well.
pub struct AnsibleExecutor {
    binary: String,
    time_provider: Arc<dyn TimeProvider>,
    scratch_dir: Option<PathBuf>,
}

impl AnsibleExecutor {
    pub fn new(binary: impl Into<String>, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            binary: binary.into(),
            time_provider,
            scratch_dir: None,
        }
    }

    /// Materialize temporary files under `dir` instead of the system temp dir
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    fn materialize(&self, content: &str, suffix: &str) -> Result<NamedTempFile, ExecutionError> {
        materialize(content, suffix, self.scratch_dir.as_deref())
    }
}

/// `key=value` pairs joined by single spaces; `None` when there is nothing to pass
pub fn format_extra_vars(vars: &ExtraVars) -> Option<String> {
    if vars.is_empty() {
        return None;
    }
    Some(
        vars.iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" "),
    )
}

/// Full argument vector after the binary name
pub fn build_args(playbook: &Path, inventory: Option<&Path>, vars: &ExtraVars) -> Vec<String> {
    let mut args = vec![playbook.to_string_lossy().into_owned()];
    if let Some(inventory) = inventory {
        args.push("-i".to_string());
        args.push(inventory.to_string_lossy().into_owned());
    }
    if let Some(vars) = format_extra_vars(vars) {
        args.push("--extra-vars".to_string());
        args.push(vars);
    }
    args
}

/// Write content to a uniquely named temporary file (removed on drop)
fn materialize(
    content: &str,
    suffix: &str,
    dir: Option<&Path>,
) -> Result<NamedTempFile, ExecutionError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("playdeck-").suffix(suffix);
    let mut file = match dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    }
    .map_err(|e| ExecutionError::Materialize(e.to_string()))?;
    file.write_all(content.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| ExecutionError::Materialize(e.to_string()))?;
    Ok(file)
}

/// stdout followed by stderr
fn combine_output(stdout: &[u8], stderr: &[u8]) -> String {
    let mut output = String::from_utf8_lossy(stdout).into_owned();
    output.push_str(&String::from_utf8_lossy(stderr));
    output
}

#[async_trait]
impl PlaybookExecutor for AnsibleExecutor {
    async fn execute(
        &self,
        request: &ExecutionRequest,
    ) -> Result<ExecutionOutcome, ExecutionError> {
        // Guards must outlive the child process
        let mut _script_guard: Option<NamedTempFile> = None;
        let playbook: PathBuf = match &request.playbook {
            PlaybookSource::Path(path) => path.clone(),
            PlaybookSource::Inline(content) => {
                let file = self.materialize(content, ".yml")?;
                let path = file.path().to_path_buf();
                _script_guard = Some(file);
                path
            }
        };

        let inventory_guard = request
            .inventory
            .as_deref()
            .map(|content| self.materialize(content, ".ini"))
            .transpose()?;

        let args = build_args(
            &playbook,
            inventory_guard.as_ref().map(|f| f.path()),
            &request.extra_vars,
        );

        let start_time = self.time_provider.now_millis();
        info!(
            binary = %self.binary,
            playbook = %playbook.display(),
            has_inventory = inventory_guard.is_some(),
            extra_vars = request.extra_vars.len(),
            "Starting playbook execution"
        );

        let child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ExecutionError::SpawnFailed(format!("{}: {}", self.binary, e)))?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ExecutionError::IoError(e.to_string()))?;

        let duration_ms = self.time_provider.now_millis() - start_time;
        let outcome = ExecutionOutcome {
            output: combine_output(&output.stdout, &output.stderr),
            exit_code: output.status.code(),
            duration_ms,
        };

        info!(
            binary = %self.binary,
            duration_ms = duration_ms,
            exit_code = ?outcome.exit_code,
            "Playbook execution completed"
        );
        debug!(output_bytes = outcome.output.len(), "Captured process output");

        Ok(outcome)
    }
}
