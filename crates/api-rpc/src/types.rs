//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results. Timestamps travel as
//! RFC3339 strings; the core works in epoch milliseconds.

use crate::caller::CallerAddress;
use chrono::{DateTime, SecondsFormat};
use playdeck_core::application::{Page, SubmitRunRequest};
use playdeck_core::domain::{
    CheckStatus, ExecutionLog, ExtraVars, HostResults, Inventory, InventoryCheck, InventoryId,
    Run, RunStatus,
};
use playdeck_core::error::{AppError, Result};
use playdeck_core::port::{CheckFilter, LogFilter, RunFilter, SweepReport, TimeRange};
use serde::{Deserialize, Serialize};

// ============================================================================
// Time conversion
// ============================================================================

pub fn format_millis(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| millis.to_string())
}

pub fn parse_rfc3339(field: &str, value: &str) -> Result<i64> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.timestamp_millis())
        .map_err(|e| {
            AppError::Validation(format!(
                "Invalid '{}' timestamp '{}': {} (expected RFC3339)",
                field, value, e
            ))
        })
}

fn parse_range(from: Option<&str>, to: Option<&str>) -> Result<TimeRange> {
    Ok(TimeRange {
        from: from.map(|v| parse_rfc3339("from", v)).transpose()?,
        to: to.map(|v| parse_rfc3339("to", v)).transpose()?,
    })
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// A boolean query parameter given either as JSON bool or as text
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FlagParam {
    Bool(bool),
    Text(String),
}

impl FlagParam {
    pub fn to_bool(&self) -> Result<bool> {
        match self {
            FlagParam::Bool(b) => Ok(*b),
            FlagParam::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                other => Err(AppError::Validation(format!(
                    "Invalid 'success' value '{}': expected true or false",
                    other
                ))),
            },
        }
    }
}

// ============================================================================
// Runs
// ============================================================================

/// run.submit.v1 - Submit a playbook run
#[derive(Debug, Deserialize)]
pub struct SubmitRunParams {
    pub playbook: String,
    #[serde(default)]
    pub inventory: Option<String>,
    #[serde(default)]
    pub extra_vars: ExtraVars,
}

impl SubmitRunParams {
    /// The run's originator is the address the request came from
    pub fn into_request(self, caller: Option<CallerAddress>) -> SubmitRunRequest {
        SubmitRunRequest {
            playbook: self.playbook,
            inventory: self.inventory,
            extra_vars: self.extra_vars,
            triggered_by: caller.map(|c| c.0),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitRunResponse {
    pub run_id: i64,
    pub status: String,
}

/// *.get.v1 - Fetch one record by id
#[derive(Debug, Deserialize)]
pub struct GetByIdParams {
    pub id: i64,
}

/// run.list.v1
#[derive(Debug, Default, Deserialize)]
pub struct ListRunsParams {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub playbook: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

impl ListRunsParams {
    pub fn to_filter(&self) -> Result<RunFilter> {
        let status = match non_empty(&self.status) {
            Some(s) => Some(s.parse::<RunStatus>()?),
            None => None,
        };
        Ok(RunFilter {
            status,
            playbook: non_empty(&self.playbook),
            range: parse_range(self.from.as_deref(), self.to.as_deref())?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunView {
    pub id: i64,
    pub playbook: String,
    pub inventory: Option<String>,
    pub status: RunStatus,
    pub start_time: String,
    pub end_time: Option<String>,
    pub duration: Option<f64>,
    pub triggered_by: String,
    pub extra_vars: ExtraVars,
    pub output: String,
    pub error: String,
}

impl From<Run> for RunView {
    fn from(run: Run) -> Self {
        Self {
            id: run.id,
            playbook: run.playbook,
            inventory: run.inventory,
            status: run.status,
            start_time: format_millis(run.start_time),
            end_time: run.end_time.map(format_millis),
            duration: run.duration,
            triggered_by: run.triggered_by,
            extra_vars: run.extra_vars,
            output: run.output,
            error: run.error,
        }
    }
}

// ============================================================================
// Logs
// ============================================================================

/// log.list.v1
#[derive(Debug, Default, Deserialize)]
pub struct ListLogsParams {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub success: Option<FlagParam>,
    #[serde(default)]
    pub playbook: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

impl ListLogsParams {
    pub fn to_filter(&self) -> Result<LogFilter> {
        Ok(LogFilter {
            success: self.success.as_ref().map(FlagParam::to_bool).transpose()?,
            playbook: non_empty(&self.playbook),
            range: parse_range(self.from.as_deref(), self.to.as_deref())?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LogView {
    pub id: i64,
    pub playbook: String,
    pub success: bool,
    pub output: String,
    pub error: String,
    pub start_time: String,
    pub end_time: String,
    pub duration: f64,
}

impl From<ExecutionLog> for LogView {
    fn from(log: ExecutionLog) -> Self {
        Self {
            id: log.id,
            playbook: log.playbook,
            success: log.success,
            output: log.output,
            error: log.error,
            start_time: format_millis(log.start_time),
            end_time: format_millis(log.end_time),
            duration: log.duration,
        }
    }
}

// ============================================================================
// Inventories & checks
// ============================================================================

/// inventory.create.v1 / inventory.update.v1
#[derive(Debug, Deserialize)]
pub struct InventoryParams {
    pub name: String,
    pub content: String,
}

/// inventory.get.v1 / inventory.delete.v1 / inventory.check.v1
#[derive(Debug, Deserialize)]
pub struct InventoryNameParams {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryView {
    pub id: i64,
    pub name: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Inventory> for InventoryView {
    fn from(inventory: Inventory) -> Self {
        Self {
            id: inventory.id,
            name: inventory.name,
            content: inventory.content,
            created_at: format_millis(inventory.created_at),
            updated_at: format_millis(inventory.updated_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryListResponse {
    pub inventories: Vec<InventoryView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteInventoryResponse {
    pub name: String,
    pub deleted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckInventoryResponse {
    pub check_id: i64,
    pub status: CheckStatus,
}

/// check.list.v1
#[derive(Debug, Default, Deserialize)]
pub struct ListChecksParams {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub inventory_id: Option<InventoryId>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

impl ListChecksParams {
    pub fn to_filter(&self) -> Result<CheckFilter> {
        let status = match non_empty(&self.status) {
            Some(s) => Some(s.parse::<CheckStatus>()?),
            None => None,
        };
        Ok(CheckFilter {
            status,
            inventory_id: self.inventory_id,
            range: parse_range(self.from.as_deref(), self.to.as_deref())?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckView {
    pub id: i64,
    pub inventory_id: i64,
    pub status: CheckStatus,
    pub results: HostResults,
    pub error: String,
    pub started_at: String,
    pub completed_at: Option<String>,
}

impl From<InventoryCheck> for CheckView {
    fn from(check: InventoryCheck) -> Self {
        Self {
            id: check.id,
            inventory_id: check.inventory_id,
            status: check.status,
            results: check.results,
            error: check.error,
            started_at: format_millis(check.started_at),
            completed_at: check.completed_at.map(format_millis),
        }
    }
}

// ============================================================================
// Catalog, admin, pages
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PlaybookListResponse {
    pub playbooks: Vec<String>,
}

/// admin.sweep.v1 - per-table deletion counts, `null` where a table failed
#[derive(Debug, Clone, Serialize)]
pub struct SweepResponse {
    pub cutoff: String,
    pub logs_deleted: Option<u64>,
    pub runs_deleted: Option<u64>,
    pub checks_deleted: Option<u64>,
}

impl From<SweepReport> for SweepResponse {
    fn from(report: SweepReport) -> Self {
        Self {
            cutoff: format_millis(report.cutoff),
            logs_deleted: report.logs_deleted,
            runs_deleted: report.runs_deleted,
            checks_deleted: report.checks_deleted,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub current_page: i64,
    pub total_pages: i64,
}

impl<T> PageResponse<T> {
    pub fn from_page<U: Into<T>>(page: Page<U>) -> Self {
        Self {
            items: page.items.into_iter().map(Into::into).collect(),
            total_count: page.total_count,
            current_page: page.current_page,
            total_pages: page.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_round_trip_precision() {
        let millis = 1_700_000_000_123;
        let text = format_millis(millis);
        assert_eq!(text, "2023-11-14T22:13:20.123Z");
        assert_eq!(parse_rfc3339("from", &text).unwrap(), millis);
    }

    #[test]
    fn test_malformed_timestamp_is_validation_error() {
        let params = ListRunsParams {
            from: Some("yesterday".to_string()),
            ..Default::default()
        };
        match params.to_filter() {
            Err(AppError::Validation(msg)) => assert!(msg.contains("from")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_run_filter_from_params() {
        let params = ListRunsParams {
            status: Some("failed".to_string()),
            playbook: Some("  ".to_string()),
            to: Some("2024-01-01T00:00:00+00:00".to_string()),
            ..Default::default()
        };
        let filter = params.to_filter().unwrap();
        assert_eq!(filter.status, Some(RunStatus::Failed));
        assert_eq!(filter.playbook, None);
        assert_eq!(filter.range.to, Some(1_704_067_200_000));

        let bad_status = ListRunsParams {
            status: Some("running".to_string()),
            ..Default::default()
        };
        assert!(bad_status.to_filter().is_err());
    }

    #[test]
    fn test_success_flag_forms() {
        let parse = |json: &str| -> Result<LogFilter> {
            let params: ListLogsParams = serde_json::from_str(json).unwrap();
            params.to_filter()
        };
        assert_eq!(parse(r#"{"success": true}"#).unwrap().success, Some(true));
        assert_eq!(parse(r#"{"success": "false"}"#).unwrap().success, Some(false));
        assert_eq!(parse(r#"{}"#).unwrap().success, None);
        assert!(parse(r#"{"success": "maybe"}"#).is_err());
    }

    #[test]
    fn test_submit_records_caller_address() {
        let params: SubmitRunParams =
            serde_json::from_str(r#"{"playbook": "deploy.yml"}"#).unwrap();
        let req = params.into_request(Some(CallerAddress("127.0.0.1".to_string())));
        assert_eq!(req.triggered_by.as_deref(), Some("127.0.0.1"));
        assert!(req.extra_vars.is_empty());
        assert!(req.inventory.is_none());
    }

    #[test]
    fn test_submit_ignores_self_reported_originator() {
        let params: SubmitRunParams = serde_json::from_str(
            r#"{"playbook": "deploy.yml", "triggered_by": "someone-else"}"#,
        )
        .unwrap();
        let req = params.into_request(Some(CallerAddress("10.0.0.7".to_string())));
        assert_eq!(req.triggered_by.as_deref(), Some("10.0.0.7"));

        let params: SubmitRunParams =
            serde_json::from_str(r#"{"playbook": "deploy.yml"}"#).unwrap();
        assert_eq!(params.into_request(None).triggered_by, None);
    }
}
