use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use url::Url;

use super::{ResourceError, ResourceStore, checked_path};

/// Serves resources from a local directory tree.
#[derive(Debug, Clone)]
pub struct FsResourceStore {
    root: PathBuf,
}

impl FsResourceStore {
    /// # Errors
    ///
    /// Returns `ResourceError::InvalidRoot` if the root cannot be made absolute.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, ResourceError> {
        let root = std::path::absolute(root.as_ref())
            .map_err(|e| ResourceError::InvalidRoot(e.to_string()))?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, ResourceError> {
        let path = checked_path(path)?;
        Ok(path.split('/').fold(self.root.clone(), |acc, part| acc.join(part)))
    }
}

#[async_trait]
impl ResourceStore for FsResourceStore {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, ResourceError> {
        let full = self.resolve(path)?;
        tracing::debug!(path = %full.display(), "reading resource");
        tokio::fs::read(&full).await.map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                ResourceError::NotFound {
                    path: path.to_string(),
                }
            } else {
                ResourceError::Io {
                    path: path.to_string(),
                    source,
                }
            }
        })
    }

    fn locate(&self, path: &str) -> Result<Url, ResourceError> {
        let full = self.resolve(path)?;
        Url::from_file_path(&full).map_err(|()| ResourceError::InvalidPath {
            path: path.to_string(),
        })
    }
}
