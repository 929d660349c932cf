use std::sync::Arc;

use tracing::{debug, warn};

use quiz_core::Clock;
use quiz_core::navigation::Session;
pub use storage::repository::SessionSummaryRow;
use storage::repository::{SessionSummaryRepository, StorageError};

use crate::error::ResultsServiceError;
use crate::viewer::ViewerController;

/// Persists session summaries when results are shown and lists past ones.
#[derive(Clone)]
pub struct SessionSummaryService {
    clock: Clock,
    summaries: Arc<dyn SessionSummaryRepository>,
}

impl SessionSummaryService {
    #[must_use]
    pub fn new(clock: Clock, summaries: Arc<dyn SessionSummaryRepository>) -> Self {
        Self { clock, summaries }
    }

    /// Save `session`, replacing the row `existing` if given.
    ///
    /// # Errors
    ///
    /// Returns `ResultsServiceError` if the summary is inconsistent or storage fails.
    pub async fn save(
        &self,
        existing: Option<i64>,
        session: &Session,
    ) -> Result<i64, ResultsServiceError> {
        let summary = session.summary(self.clock.now())?;
        if let Some(id) = existing {
            match self.summaries.replace_summary(id, &summary).await {
                Ok(()) => {
                    debug!(id, "replaced session summary");
                    return Ok(id);
                }
                Err(StorageError::NotFound) => {
                    warn!(id, "summary row vanished, appending a new one");
                }
                Err(err) => return Err(err.into()),
            }
        }
        let id = self.summaries.append_summary(&summary).await?;
        debug!(id, label = summary.label(), "saved session summary");
        Ok(id)
    }

    /// Save the controller's current session and remember the row id, so
    /// re-opening results for the same session updates the same row.
    ///
    /// # Errors
    ///
    /// Returns `ResultsServiceError::NoSession` when idle, or a save error.
    pub async fn record_results(
        &self,
        controller: &mut ViewerController,
    ) -> Result<i64, ResultsServiceError> {
        let session = controller
            .state()
            .session()
            .cloned()
            .ok_or(ResultsServiceError::NoSession)?;
        let id = self.save(controller.summary_id(), &session).await?;
        controller.set_summary_id(id);
        Ok(id)
    }

    /// Most recent summaries first.
    ///
    /// # Errors
    ///
    /// Returns `ResultsServiceError::Storage` if the rows cannot be read.
    pub async fn list_recent(&self, limit: u32) -> Result<Vec<SessionSummaryRow>, ResultsServiceError> {
        Ok(self.summaries.list_summary_rows(limit).await?)
    }
}
