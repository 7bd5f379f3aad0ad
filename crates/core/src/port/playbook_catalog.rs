// Playbook Catalog Port
// Resolves playbook names against the playbooks root.

use crate::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

#[async_trait]
pub trait PlaybookCatalog: Send + Sync {
    /// Resolve a playbook name to an existing file
    ///
    /// # Errors
    /// - AppError::NotFound if no such file exists under the root
    async fn resolve(&self, name: &str) -> Result<PathBuf>;

    /// List playbook file names under the root, sorted
    async fn list(&self) -> Result<Vec<String>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;

    /// Catalog backed by a fixed list of names
    pub struct StaticCatalog {
        names: Vec<String>,
    }

    impl StaticCatalog {
        pub fn new<I, S>(names: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                names: names.into_iter().map(Into::into).collect(),
            }
        }
    }

    #[async_trait]
    impl PlaybookCatalog for StaticCatalog {
        async fn resolve(&self, name: &str) -> Result<PathBuf> {
            if self.names.iter().any(|n| n == name) {
                Ok(PathBuf::from("/playbooks").join(name))
            } else {
                Err(AppError::NotFound(format!("Playbook {} not found", name)))
            }
        }

        async fn list(&self) -> Result<Vec<String>> {
            let mut names = self.names.clone();
            names.sort();
            Ok(names)
        }
    }
}
