// Application error type shared by every crate in the workspace

use thiserror::Error;

/// Application-level error type
///
/// Adapters convert their own failures into one of these variants at the
/// boundary; the RPC layer maps each variant to a stable error code.
#[derive(Error, Debug)]
pub enum AppError {
    /// Rejected state transition or malformed stored value
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    /// Caller input rejected before any record was created
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Extra vars or host results could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Unknown run, log, check, inventory or playbook
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate inventory name
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A run was finalized twice
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// sqlx errors are converted to AppError::Database inside infra-sqlite
