// Application constants (no magic values)

/// Default page size for list queries
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Default retention horizon (days)
pub const DEFAULT_RETENTION_DAYS: i64 = 30;

/// Default sweep interval (hours)
pub const DEFAULT_SWEEP_INTERVAL_HOURS: u64 = 24;

/// Originator recorded when the caller does not identify itself
pub const UNKNOWN_ORIGINATOR: &str = "unknown";

/// Maximum playbook name length
pub const MAX_PLAYBOOK_NAME_LEN: usize = 255;
