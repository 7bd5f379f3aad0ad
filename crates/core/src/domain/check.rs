// Inventory Check Domain Model (connectivity probe lifecycle)

use crate::domain::error::{DomainError, Result};
use crate::domain::inventory::InventoryId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Check ID (store-assigned)
pub type CheckId = i64;

/// Hostname -> reachability status
pub type HostResults = BTreeMap<String, String>;

/// Check lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckStatus::Pending => write!(f, "pending"),
            CheckStatus::Running => write!(f, "running"),
            CheckStatus::Completed => write!(f, "completed"),
            CheckStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for CheckStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(CheckStatus::Pending),
            "running" => Ok(CheckStatus::Running),
            "completed" => Ok(CheckStatus::Completed),
            "failed" => Ok(CheckStatus::Failed),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

/// Inventory check entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryCheck {
    pub id: CheckId,
    pub inventory_id: InventoryId,
    pub status: CheckStatus,
    pub results: HostResults, // populated only when Completed
    pub error: String,
    pub started_at: i64,
    pub completed_at: Option<i64>,
}

impl InventoryCheck {
    /// Build the `pending` entity for a freshly inserted row
    pub fn pending(id: CheckId, inventory_id: InventoryId, started_at: i64) -> Self {
        Self {
            id,
            inventory_id,
            status: CheckStatus::Pending,
            results: HostResults::new(),
            error: String::new(),
            started_at,
            completed_at: None,
        }
    }

    /// pending -> running
    pub fn start(&mut self) -> Result<()> {
        self.expect_status(CheckStatus::Pending, CheckStatus::Running)?;
        self.status = CheckStatus::Running;
        Ok(())
    }

    /// running -> completed
    pub fn complete(&mut self, now_millis: i64, results: HostResults) -> Result<()> {
        self.expect_status(CheckStatus::Running, CheckStatus::Completed)?;
        self.status = CheckStatus::Completed;
        self.results = results;
        self.completed_at = Some(now_millis.max(self.started_at));
        Ok(())
    }

    /// running -> failed (results stay empty)
    pub fn fail(&mut self, now_millis: i64, error: impl Into<String>) -> Result<()> {
        self.expect_status(CheckStatus::Running, CheckStatus::Failed)?;
        self.status = CheckStatus::Failed;
        self.results.clear();
        self.error = error.into();
        self.completed_at = Some(now_millis.max(self.started_at));
        Ok(())
    }

    fn expect_status(&self, expected: CheckStatus, to: CheckStatus) -> Result<()> {
        if self.status != expected {
            return Err(DomainError::InvalidStateTransition {
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_happy_path() {
        let mut check = InventoryCheck::pending(1, 7, 1_000);
        check.start().unwrap();

        let mut results = HostResults::new();
        results.insert("web1".to_string(), "reachable".to_string());
        check.complete(2_000, results).unwrap();

        assert_eq!(check.status, CheckStatus::Completed);
        assert_eq!(check.results.len(), 1);
        assert_eq!(check.completed_at, Some(2_000));
    }

    #[test]
    fn test_cannot_skip_running() {
        let mut check = InventoryCheck::pending(1, 7, 1_000);
        assert!(check.complete(2_000, HostResults::new()).is_err());
        assert!(check.fail(2_000, "boom").is_err());
        assert_eq!(check.status, CheckStatus::Pending);
    }

    #[test]
    fn test_failed_check_has_no_results() {
        let mut check = InventoryCheck::pending(1, 7, 1_000);
        check.start().unwrap();
        check.fail(1_500, "exit status 4").unwrap();

        assert_eq!(check.status, CheckStatus::Failed);
        assert!(check.results.is_empty());
        assert_eq!(check.error, "exit status 4");
    }

    #[test]
    fn test_terminal_check_is_final() {
        let mut check = InventoryCheck::pending(1, 7, 1_000);
        check.start().unwrap();
        check.complete(2_000, HostResults::new()).unwrap();
        assert!(check.start().is_err());
        assert!(check.fail(3_000, "late").is_err());
    }
}
