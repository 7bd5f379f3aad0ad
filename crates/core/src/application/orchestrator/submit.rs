// Submit Use Case - request type and validation

use crate::application::constants::{MAX_PLAYBOOK_NAME_LEN, UNKNOWN_ORIGINATOR};
use crate::domain::{validate_inventory_name, ExtraVars};
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};

/// Run submission request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRunRequest {
    pub playbook: String,

    #[serde(default)]
    pub inventory: Option<String>,

    #[serde(default)]
    pub extra_vars: ExtraVars,

    /// Caller address recorded on the run
    #[serde(default)]
    pub triggered_by: Option<String>,
}

impl SubmitRunRequest {
    pub fn new(playbook: impl Into<String>) -> Self {
        Self {
            playbook: playbook.into(),
            inventory: None,
            extra_vars: ExtraVars::new(),
            triggered_by: None,
        }
    }

    pub fn with_inventory(mut self, inventory: impl Into<String>) -> Self {
        self.inventory = Some(inventory.into());
        self
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_vars.insert(key.into(), value.into());
        self
    }

    pub fn triggered_by(mut self, originator: impl Into<String>) -> Self {
        self.triggered_by = Some(originator.into());
        self
    }

    /// Empty inventory names mean "no inventory"
    pub(crate) fn inventory_name(&self) -> Option<&str> {
        self.inventory
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    pub(crate) fn originator(&self) -> String {
        self.triggered_by
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_ORIGINATOR)
            .to_string()
    }
}

/// Validate a submission before any record is created
pub fn validate_request(req: &SubmitRunRequest) -> Result<()> {
    let playbook = req.playbook.trim();
    if playbook.is_empty() {
        return Err(AppError::Validation(
            "Playbook name cannot be empty".to_string(),
        ));
    }
    if playbook.len() > MAX_PLAYBOOK_NAME_LEN {
        return Err(AppError::Validation(format!(
            "Playbook name too long (max {} chars)",
            MAX_PLAYBOOK_NAME_LEN
        )));
    }

    if let Some(name) = req.inventory_name() {
        validate_inventory_name(name)?;
    }

    for key in req.extra_vars.keys() {
        if !is_identifier(key) {
            return Err(AppError::Validation(format!(
                "Invalid extra var name '{}': must match [A-Za-z_][A-Za-z0-9_]*",
                key
            )));
        }
    }

    Ok(())
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
