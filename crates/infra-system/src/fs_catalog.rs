// Filesystem playbook catalog: names are file names under one root directory

use async_trait::async_trait;
use playdeck_core::error::{AppError, Result};
use playdeck_core::port::PlaybookCatalog;
use std::path::{Path, PathBuf};
use tracing::debug;

const PLAYBOOK_EXTENSIONS: [&str; 2] = ["yml", "yaml"];

pub struct FsPlaybookCatalog {
    root: PathBuf,
}

impl FsPlaybookCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn is_playbook_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| PLAYBOOK_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

#[async_trait]
impl PlaybookCatalog for FsPlaybookCatalog {
    /// The name is joined to the root as given; `..` segments are not rejected.
    async fn resolve(&self, name: &str) -> Result<PathBuf> {
        let path = self.root.join(name);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {
                debug!(playbook = %name, path = %path.display(), "Playbook resolved");
                Ok(path)
            }
            _ => Err(AppError::NotFound(format!("Playbook {} not found", name))),
        }
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !is_playbook_file(&path) || !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }

        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_with(files: &[&str]) -> (tempfile::TempDir, FsPlaybookCatalog) {
        let dir = tempfile::tempdir().unwrap();
        for file in files {
            std::fs::write(dir.path().join(file), "- hosts: all\n").unwrap();
        }
        let catalog = FsPlaybookCatalog::new(dir.path());
        (dir, catalog)
    }

    #[tokio::test]
    async fn test_resolve_existing_and_missing() {
        let (dir, catalog) = catalog_with(&["deploy.yml"]);

        let path = catalog.resolve("deploy.yml").await.unwrap();
        assert_eq!(path, dir.path().join("deploy.yml"));

        let err = catalog.resolve("missing.yml").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_directory_is_not_a_playbook() {
        let (dir, catalog) = catalog_with(&[]);
        std::fs::create_dir(dir.path().join("roles.yml")).unwrap();

        assert!(catalog.resolve("roles.yml").await.is_err());
        assert!(catalog.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_filters_and_sorts() {
        let (_dir, catalog) = catalog_with(&["site.yaml", "deploy.yml", "README.md", "backup.yml"]);

        let names = catalog.list().await.unwrap();
        assert_eq!(names, vec!["backup.yml", "deploy.yml", "site.yaml"]);
    }
}
