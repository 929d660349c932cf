//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{PageIndex, SessionSummaryError};
use quiz_core::navigation::NavigationError;
use storage::repository::StorageError;
use storage::resources::ResourceError;
use storage::sqlite::SqliteInitError;

/// Errors raised while decoding catalog, field or answer-key JSON.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Resource {
        path: String,
        #[source]
        source: ResourceError,
    },
    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CatalogError {
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Resource { path, .. } | Self::Json { path, .. } => path,
        }
    }
}

/// Errors emitted by `DocumentService` and renderers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DocumentError {
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error("cannot read {path} as PDF: {message}")]
    Parse { path: String, message: String },
    #[error("page {} is outside a document of {page_count} pages", .page.value())]
    PageOutOfRange { page: PageIndex, page_count: u32 },
}

impl DocumentError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Resource(e) if e.is_not_found())
    }
}

/// Errors emitted by `ViewerController`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ViewerError {
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error("the current question is still loading")]
    QuestionNotReady,
    #[error("choice {provided} is not offered (1..={max})")]
    ChoiceNotOffered { provided: u8, max: u8 },
    #[error("unknown field {name}")]
    UnknownField { name: String },
}

/// Errors emitted by `SessionSummaryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResultsServiceError {
    #[error("no session to summarise")]
    NoSession,
    #[error(transparent)]
    Summary(#[from] SessionSummaryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
}
