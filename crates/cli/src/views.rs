//! Wire shapes returned by the daemon and their table rows

use colored::Colorize;
use serde::Deserialize;
use std::collections::BTreeMap;
use tabled::Tabled;

const PREVIEW_CHARS: usize = 48;

#[derive(Debug, Deserialize)]
pub struct PageOf<T> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub current_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Deserialize)]
pub struct RunView {
    pub id: i64,
    pub playbook: String,
    pub inventory: Option<String>,
    pub status: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub duration: Option<f64>,
    pub triggered_by: String,
    pub extra_vars: BTreeMap<String, String>,
    pub output: String,
    pub error: String,
}

#[derive(Debug, Deserialize)]
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

#[derive(Debug, Deserialize)]
pub struct InventoryView {
    pub id: i64,
    pub name: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckView {
    pub id: i64,
    pub inventory_id: i64,
    pub status: String,
    pub results: BTreeMap<String, String>,
    pub error: String,
    pub started_at: String,
    pub completed_at: Option<String>,
}

#[derive(Tabled)]
pub struct RunRow {
    id: i64,
    playbook: String,
    inventory: String,
    status: String,
    started: String,
    duration: String,
    by: String,
}

impl From<&RunView> for RunRow {
    fn from(run: &RunView) -> Self {
        Self {
            id: run.id,
            playbook: run.playbook.clone(),
            inventory: run.inventory.clone().unwrap_or_else(|| "-".to_string()),
            status: paint_status(&run.status),
            started: run.start_time.clone(),
            duration: format_duration(run.duration),
            by: run.triggered_by.clone(),
        }
    }
}

#[derive(Tabled)]
pub struct LogRow {
    id: i64,
    playbook: String,
    result: String,
    started: String,
    duration: String,
    error: String,
}

impl From<&LogView> for LogRow {
    fn from(log: &LogView) -> Self {
        Self {
            id: log.id,
            playbook: log.playbook.clone(),
            result: if log.success {
                "success".green().to_string()
            } else {
                "failure".red().to_string()
            },
            started: log.start_time.clone(),
            duration: format_duration(Some(log.duration)),
            error: preview(&log.error),
        }
    }
}

#[derive(Tabled)]
pub struct InventoryRow {
    id: i64,
    name: String,
    hosts_preview: String,
    updated: String,
}

impl From<&InventoryView> for InventoryRow {
    fn from(inventory: &InventoryView) -> Self {
        Self {
            id: inventory.id,
            name: inventory.name.clone(),
            hosts_preview: preview(&inventory.content),
            updated: inventory.updated_at.clone(),
        }
    }
}

#[derive(Tabled)]
pub struct CheckRow {
    id: i64,
    inventory_id: i64,
    status: String,
    hosts: String,
    started: String,
}

impl From<&CheckView> for CheckRow {
    fn from(check: &CheckView) -> Self {
        let reachable = check
            .results
            .values()
            .filter(|status| status.as_str() == "reachable")
            .count();
        Self {
            id: check.id,
            inventory_id: check.inventory_id,
            status: paint_status(&check.status),
            hosts: format!("{}/{} reachable", reachable, check.results.len()),
            started: check.started_at.clone(),
        }
    }
}

#[derive(Tabled)]
pub struct HostRow {
    pub host: String,
    pub status: String,
}

pub fn paint_status(status: &str) -> String {
    match status {
        "completed" | "reachable" => status.green().to_string(),
        "failed" | "unreachable" => status.red().to_string(),
        "started" | "running" | "pending" => status.yellow().to_string(),
        other => other.to_string(),
    }
}

pub fn format_duration(secs: Option<f64>) -> String {
    match secs {
        Some(secs) => format!("{:.1}s", secs),
        None => "-".to_string(),
    }
}

/// First line, shortened for table cells
pub fn preview(text: &str) -> String {
    let first = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    if first.chars().count() > PREVIEW_CHARS {
        let cut: String = first.chars().take(PREVIEW_CHARS - 3).collect();
        format!("{}...", cut)
    } else {
        first.to_string()
    }
}
