use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use super::{ResourceError, ResourceStore, checked_path};

/// Serves resources from an HTTP(S) origin, e.g. the site the PDFs are hosted on.
#[derive(Debug, Clone)]
pub struct HttpResourceStore {
    client: Client,
    base: Url,
}

impl HttpResourceStore {
    /// # Errors
    ///
    /// Returns `ResourceError::InvalidRoot` unless `base` is an absolute
    /// `http` or `https` URL.
    pub fn new(base: &str) -> Result<Self, ResourceError> {
        let mut base = Url::parse(base).map_err(|e| ResourceError::InvalidRoot(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ResourceError::InvalidRoot(format!(
                "unsupported scheme: {}",
                base.scheme()
            )));
        }
        // `Url::join` replaces the last segment unless the base ends with '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            client: Client::new(),
            base,
        })
    }

    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }
}

#[async_trait]
impl ResourceStore for HttpResourceStore {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, ResourceError> {
        let url = self.locate(path)?;
        tracing::debug!(%url, "fetching resource");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ResourceError::NotFound {
                path: path.to_string(),
            });
        }
        if !status.is_success() {
            return Err(ResourceError::HttpStatus {
                path: path.to_string(),
                status,
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    fn locate(&self, path: &str) -> Result<Url, ResourceError> {
        let path = checked_path(path)?;
        self.base
            .join(path)
            .map_err(|_| ResourceError::InvalidPath {
                path: path.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_keeps_base_directory() {
        let store = HttpResourceStore::new("https://example.org/quiz").unwrap();
        let url = store.locate("pdf/75/75_kanka.pdf").unwrap();
        assert_eq!(url.as_str(), "https://example.org/quiz/pdf/75/75_kanka.pdf");
    }

    #[test]
    fn rejects_non_http_base() {
        assert!(matches!(
            HttpResourceStore::new("ftp://example.org/"),
            Err(ResourceError::InvalidRoot(_))
        ));
    }
}
