// Playdeck Infrastructure - System Adapters
// Implements: PlaybookExecutor, PlaybookCatalog

pub mod ansible_executor;
pub mod fs_catalog;

pub use ansible_executor::{AnsibleExecutor, DEFAULT_BINARY};
pub use fs_catalog::FsPlaybookCatalog;
