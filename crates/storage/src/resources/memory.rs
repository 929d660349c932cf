use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use url::Url;

use super::{ResourceError, ResourceStore, checked_path};

/// Resource store backed by a map, for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResourceStore {
    files: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryResourceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a resource.
    pub fn insert(&self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        if let Ok(mut files) = self.files.write() {
            files.insert(path.into(), bytes.into());
        }
    }

    #[must_use]
    pub fn with(self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes);
        self
    }

    pub fn remove(&self, path: &str) {
        if let Ok(mut files) = self.files.write() {
            files.remove(path);
        }
    }
}

#[async_trait]
impl ResourceStore for InMemoryResourceStore {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, ResourceError> {
        let path = checked_path(path)?;
        let files = self
            .files
            .read()
            .map_err(|e| ResourceError::InvalidRoot(e.to_string()))?;
        files.get(path).cloned().ok_or_else(|| ResourceError::NotFound {
            path: path.to_string(),
        })
    }

    fn locate(&self, path: &str) -> Result<Url, ResourceError> {
        let path = checked_path(path)?;
        Url::parse("memory:///")
            .and_then(|base| base.join(path))
            .map_err(|_| ResourceError::InvalidPath {
                path: path.to_string(),
            })
    }
}
