// Run Domain Model

use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Run ID (store-assigned, monotonic)
pub type RunId = i64;

/// Override variables passed to the automation binary (name -> value)
pub type ExtraVars = BTreeMap<String, String>;

/// Run lifecycle status
///
/// `Started` covers both "waiting for the execution slot" and "executing".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Started,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunStatus::Started)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Started => write!(f, "started"),
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for RunStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "started" => Ok(RunStatus::Started),
            "completed" => Ok(RunStatus::Completed),
            "failed" => Ok(RunStatus::Failed),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

/// Elapsed seconds between two epoch-ms timestamps
pub fn elapsed_secs(start_millis: i64, end_millis: i64) -> f64 {
    (end_millis - start_millis) as f64 / 1000.0
}

/// A run that has been accepted but not yet persisted
#[derive(Debug, Clone)]
pub struct NewRun {
    pub playbook: String,
    pub inventory: Option<String>,
    pub start_time: i64, // epoch ms
    pub triggered_by: String,
    pub extra_vars: ExtraVars,
}

/// Run Entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub playbook: String,
    pub inventory: Option<String>,
    pub status: RunStatus,

    pub start_time: i64,
    pub end_time: Option<i64>,
    pub duration: Option<f64>, // seconds, terminal only

    pub triggered_by: String,
    pub extra_vars: ExtraVars,
    pub output: String,
    pub error: String,
}

impl Run {
    /// Build the `started` entity for a freshly inserted row
    pub fn from_new(id: RunId, new: NewRun) -> Self {
        Self {
            id,
            playbook: new.playbook,
            inventory: new.inventory,
            status: RunStatus::Started,
            start_time: new.start_time,
            end_time: None,
            duration: None,
            triggered_by: new.triggered_by,
            extra_vars: new.extra_vars,
            output: String::new(),
            error: String::new(),
        }
    }

    /// Transition to Completed with explicit timestamp
    pub fn complete(&mut self, now_millis: i64, output: String) -> Result<()> {
        self.finish(RunStatus::Completed, now_millis, output, String::new())
    }

    /// Transition to Failed with explicit timestamp
    pub fn fail(&mut self, now_millis: i64, output: String, error: String) -> Result<()> {
        self.finish(RunStatus::Failed, now_millis, output, error)
    }

    fn finish(
        &mut self,
        status: RunStatus,
        now_millis: i64,
        output: String,
        error: String,
    ) -> Result<()> {
        if self.status != RunStatus::Started {
            return Err(DomainError::InvalidStateTransition {
                from: self.status.to_string(),
                to: status.to_string(),
            });
        }
        // end_time >= start_time even if the wall clock stepped backwards
        let end_time = now_millis.max(self.start_time);
        self.status = status;
        self.end_time = Some(end_time);
        self.duration = Some(elapsed_secs(self.start_time, end_time));
        self.output = output;
        self.error = error;
        Ok(())
    }
}
