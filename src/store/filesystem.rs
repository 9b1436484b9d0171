//! File system object store
//!
//! Serves uploaded file bytes from a base directory. Path operations are
//! validated so a stored path can never escape the base directory.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::{ObjectStore, StoreError};

/// Object store backed by a local directory
pub struct FileSystemObjectStore {
    base_path: PathBuf,
}

impl FileSystemObjectStore {
    /// Create a store rooted at `base_path`. All reads are restricted to
    /// that directory; traversal attempts (`..`) are rejected.
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StoreError> {
        let normalized = path.trim_start_matches('/');
        if normalized.contains("..") {
            return Err(StoreError::Io("path traversal not allowed".to_string()));
        }
        let full = self.base_path.join(normalized);
        for component in full.components() {
            if matches!(component, Component::ParentDir) {
                return Err(StoreError::Io("path traversal not allowed".to_string()));
            }
        }
        Ok(full)
    }
}

#[async_trait]
impl ObjectStore for FileSystemObjectStore {
    async fn get(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        let full = self.resolve(path)?;
        if !full.exists() {
            return Err(StoreError::NotFound(path.to_string()));
        }
        fs::read(&full)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))
    }
}
