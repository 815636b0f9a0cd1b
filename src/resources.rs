//! Filesystem-backed [`strata_core::Resources`]: mapper XML, included
//! fragments, and `<properties resource="...">` files are read relative
//! to a configured root directory.

use std::path::{Path, PathBuf};
use strata_core::{MapperError, Resources, Result};

pub struct FileResources {
    root: PathBuf,
}

impl FileResources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl Resources for FileResources {
    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let resolved = self.resolve(path);
        tokio::fs::read(&resolved).await.map_err(|source| {
            MapperError::Binding(format!("cannot read resource `{path}` at {}: {source}", resolved.display())).into()
        })
    }

    async fn exists(&self, path: &str) -> bool {
        tokio::fs::try_exists(self.resolve(path)).await.unwrap_or(false)
    }
}

/// Builds a [`FileResources`] rooted at the directory containing `path`
/// itself — the common case of pointing the engine at a top-level
/// `mybatis-config.xml`-equivalent and letting every `<mapper
/// resource="...">` underneath resolve relative to it.
pub fn rooted_at_parent_of(path: impl AsRef<Path>) -> FileResources {
    let parent = path.as_ref().parent().unwrap_or_else(|| Path::new("."));
    FileResources::new(parent.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_resource_reports_exists_false() {
        let resources = FileResources::new(std::env::temp_dir());
        assert!(!resources.exists("definitely-not-a-real-file.xml").await);
    }
}
