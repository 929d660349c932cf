use async_trait::async_trait;
use quiz_core::model::SessionSummary;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A stored summary together with its row id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummaryRow {
    pub id: i64,
    pub summary: SessionSummary,
}

impl SessionSummaryRow {
    #[must_use]
    pub fn new(id: i64, summary: SessionSummary) -> Self {
        Self { id, summary }
    }
}

/// Repository contract for finished-session summaries.
#[async_trait]
pub trait SessionSummaryRepository: Send + Sync {
    /// Store a new summary and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the summary cannot be stored.
    async fn append_summary(&self, summary: &SessionSummary) -> Result<i64, StorageError>;

    /// Overwrite an existing summary.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no row has this id.
    async fn replace_summary(&self, id: i64, summary: &SessionSummary)
    -> Result<(), StorageError>;

    /// Fetch a summary by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_summary(&self, id: i64) -> Result<SessionSummary, StorageError>;

    /// Most recently completed summaries first, at most `limit` rows.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if rows cannot be read or decoded.
    async fn list_summary_rows(&self, limit: u32) -> Result<Vec<SessionSummaryRow>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    summaries: Arc<Mutex<BTreeMap<i64, SessionSummary>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionSummaryRepository for InMemoryRepository {
    async fn append_summary(&self, summary: &SessionSummary) -> Result<i64, StorageError> {
        let mut guard = self
            .summaries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let id = guard.keys().next_back().map_or(1, |last| last + 1);
        guard.insert(id, summary.clone());
        Ok(id)
    }

    async fn replace_summary(
        &self,
        id: i64,
        summary: &SessionSummary,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .summaries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let slot = guard.get_mut(&id).ok_or(StorageError::NotFound)?;
        *slot = summary.clone();
        Ok(())
    }

    async fn get_summary(&self, id: i64) -> Result<SessionSummary, StorageError> {
        let guard = self
            .summaries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn list_summary_rows(&self, limit: u32) -> Result<Vec<SessionSummaryRow>, StorageError> {
        let guard = self
            .summaries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut rows: Vec<SessionSummaryRow> = guard
            .iter()
            .map(|(id, summary)| SessionSummaryRow::new(*id, summary.clone()))
            .collect();
        rows.sort_by(|a, b| {
            b.summary
                .completed_at()
                .cmp(&a.summary.completed_at())
                .then(b.id.cmp(&a.id))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub summaries: Arc<dyn SessionSummaryRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let summaries: Arc<dyn SessionSummaryRepository> = Arc::new(InMemoryRepository::new());
        Self { summaries }
    }
}
