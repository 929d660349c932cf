//! Read-only access to the viewer's static resources (catalog JSON, answer
//! keys, exam PDFs), either from a local directory or an HTTP origin.

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

mod fs;
mod http;
mod layout;
mod memory;

pub use fs::FsResourceStore;
pub use http::HttpResourceStore;
pub use layout::ResourceLayout;
pub use memory::InMemoryResourceStore;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResourceError {
    #[error("resource not found: {path}")]
    NotFound { path: String },
    #[error("invalid resource path: {path}")]
    InvalidPath { path: String },
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("request for {path} failed with status {status}")]
    HttpStatus {
        path: String,
        status: reqwest::StatusCode,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("invalid resource root: {0}")]
    InvalidRoot(String),
}

impl ResourceError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Source of resource bytes addressed by relative, `/`-separated paths.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Read the whole resource.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::NotFound` when the resource does not exist, or
    /// another variant when it cannot be read.
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, ResourceError>;

    /// URL under which a webview can display the resource.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::InvalidPath` if the path cannot be addressed.
    fn locate(&self, path: &str) -> Result<Url, ResourceError>;
}

/// Rejects absolute paths and any `..` segment so lookups stay under the root.
pub(crate) fn checked_path(path: &str) -> Result<&str, ResourceError> {
    let invalid = || ResourceError::InvalidPath {
        path: path.to_string(),
    };
    if path.is_empty() || path.starts_with('/') || path.contains('\\') {
        return Err(invalid());
    }
    if path.split('/').any(|segment| segment.is_empty() || segment == "..") {
        return Err(invalid());
    }
    Ok(path)
}
