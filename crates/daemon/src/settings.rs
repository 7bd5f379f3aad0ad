//! Daemon configuration
//!
//! Layers, lowest priority first: built-in defaults, an optional YAML file,
//! then `PLAYDECK__SECTION__KEY` environment variables.

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use playdeck_core::application::constants::{
    DEFAULT_PAGE_SIZE, DEFAULT_RETENTION_DAYS, DEFAULT_SWEEP_INTERVAL_HOURS,
};
use playdeck_core::application::ExecutionConfig;
use playdeck_core::port::RetentionConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Explicit config file location, overrides the search list
pub const CONFIG_PATH_ENV: &str = "PLAYDECK_CONFIG";

/// Upper bound for `retention.days` (about a century)
pub const MAX_RETENTION_DAYS: i64 = 36_500;

/// Searched in order; the first existing file wins
pub const CONFIG_SEARCH_PATHS: [&str; 3] = [
    "./playdeck.yml",
    "./config/playdeck.yml",
    "/etc/playdeck/playdeck.yml",
];

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub playbooks: PlaybookSettings,
    pub retention: RetentionSettings,
    pub query: QuerySettings,
    pub execution: ExecutionSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file path or `sqlite:` URL; `~` is expanded
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaybookSettings {
    pub dir: String,
    pub binary: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetentionSettings {
    pub days: i64,
    pub sweep_interval_hours: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuerySettings {
    pub page_size: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecutionSettings {
    /// Wall-clock limit per subprocess call; unset means unbounded
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Settings {
    /// Load from the environment-selected or first existing config file
    pub fn load() -> Result<Self> {
        let file = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Some(PathBuf::from(shellexpand::tilde(&path).into_owned())),
            Err(_) => CONFIG_SEARCH_PATHS
                .iter()
                .map(PathBuf::from)
                .find(|p| p.is_file()),
        };
        Self::load_from(file.as_deref())
    }

    pub fn load_from(file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 9627)?
            .set_default("database.url", "~/.playdeck/playdeck.db")?
            .set_default("playbooks.dir", "./playbooks")?
            .set_default("playbooks.binary", "ansible-playbook")?
            .set_default("retention.days", DEFAULT_RETENTION_DAYS)?
            .set_default("retention.sweep_interval_hours", DEFAULT_SWEEP_INTERVAL_HOURS)?
            .set_default("query.page_size", DEFAULT_PAGE_SIZE)?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).format(FileFormat::Yaml).required(true));
        }

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix("PLAYDECK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.retention.days > 0, "retention.days must be positive");
        anyhow::ensure!(
            self.retention.days <= MAX_RETENTION_DAYS,
            "retention.days cannot exceed {}",
            MAX_RETENTION_DAYS
        );
        anyhow::ensure!(
            self.retention.sweep_interval_hours > 0,
            "retention.sweep_interval_hours must be positive"
        );
        anyhow::ensure!(self.query.page_size > 0, "query.page_size must be positive");
        anyhow::ensure!(
            !self.playbooks.binary.trim().is_empty(),
            "playbooks.binary cannot be empty"
        );
        Ok(())
    }

    /// Database URL with a leading `~` expanded
    pub fn database_url(&self) -> String {
        let url = self.database.url.as_str();
        for prefix in ["sqlite://", "sqlite:"] {
            if let Some(rest) = url.strip_prefix(prefix) {
                return format!("{}{}", prefix, shellexpand::tilde(rest));
            }
        }
        shellexpand::tilde(url).into_owned()
    }

    /// On-disk database file, if the URL names one
    pub fn database_file(&self) -> Option<PathBuf> {
        let url = self.database_url();
        let path = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(&url);
        let path = path.split('?').next().unwrap_or(path);
        if path.is_empty() || path.contains(":memory:") {
            None
        } else {
            Some(PathBuf::from(path))
        }
    }

    pub fn playbooks_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.playbooks.dir).into_owned())
    }

    pub fn retention_config(&self) -> RetentionConfig {
        RetentionConfig {
            retention_days: self.retention.days,
            sweep_interval_hours: self.retention.sweep_interval_hours,
        }
    }

    pub fn execution_config(&self) -> ExecutionConfig {
        ExecutionConfig {
            timeout: self.execution.timeout_secs.map(Duration::from_secs),
        }
    }
}
