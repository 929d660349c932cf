use std::sync::Arc;

use tracing::debug;

use quiz_core::model::{EditionCatalog, EditionId, FieldCatalog, Subject};
use quiz_core::navigation::{Event, LoadTicket};
use storage::resources::{ResourceLayout, ResourceStore};

use crate::alert::Alert;
use crate::answer_keys::AnswerKeyService;
use crate::catalog::CatalogService;
use crate::documents::{DocumentRenderer, DocumentService};
use crate::error::{DocumentError, ViewerError};
use crate::viewer::controller::{QuestionLoad, ViewerController};

/// Edition list and field groupings as loaded at startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSnapshot {
    pub editions: EditionCatalog,
    pub fields: FieldCatalog,
    pub alerts: Vec<Alert>,
}

/// Async side of the viewer: catalogs, answer keys and documents.
///
/// The `*_question_count` / `load_question` methods are the building blocks a
/// UI calls between short borrows of its `ViewerController`; `start_edition`,
/// `start_field` and `navigate` chain them for callers that can hold the
/// controller across awaits.
pub struct ViewerService {
    catalog: CatalogService,
    answer_keys: AnswerKeyService,
    documents: DocumentService,
}

impl ViewerService {
    #[must_use]
    pub fn new(
        store: Arc<dyn ResourceStore>,
        renderer: Arc<dyn DocumentRenderer>,
        layout: ResourceLayout,
    ) -> Self {
        Self {
            catalog: CatalogService::new(Arc::clone(&store), layout.clone()),
            answer_keys: AnswerKeyService::new(store, layout.clone()),
            documents: DocumentService::new(renderer, layout),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.catalog
    }

    #[must_use]
    pub fn answer_keys(&self) -> &AnswerKeyService {
        &self.answer_keys
    }

    #[must_use]
    pub fn documents(&self) -> &DocumentService {
        &self.documents
    }

    pub async fn load_catalog(&self) -> CatalogSnapshot {
        let editions = self.catalog.load_editions().await;
        let fields = self.catalog.load_fields().await;
        let alerts = editions.alert.into_iter().chain(fields.alert).collect();
        CatalogSnapshot {
            editions: editions.value,
            fields: fields.value,
            alerts,
        }
    }

    /// Drop per-session caches. Call when a new session starts.
    ///
    /// Best effort: a load still running for the previous session may put
    /// its answer key back afterwards. Keys are per edition, so the new
    /// session reads the same data either way.
    pub fn reset_session_caches(&self) {
        self.answer_keys.clear();
    }

    /// Number of questions in one edition's paper.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError` if the paper cannot be opened.
    pub async fn edition_question_count(
        &self,
        edition: EditionId,
        subject: &Subject,
    ) -> Result<u32, DocumentError> {
        self.documents.question_count(edition, subject).await
    }

    /// Fetch the answer key entry and page for `ticket`.
    pub async fn load_question(&self, ticket: LoadTicket) -> QuestionLoad {
        let key = self.answer_keys.load(ticket.question.edition).await;
        let correct = key.value.correct_choice(&ticket.question);
        let page = self.documents.render(&ticket.question).await;
        debug!(question = %ticket.question.id(), has_key = correct.is_some(), "loaded question");
        QuestionLoad {
            ticket,
            correct,
            page,
            alerts: key.alert.into_iter().collect(),
        }
    }

    /// Start an edition session and load its first question.
    pub async fn start_edition(
        &self,
        controller: &mut ViewerController,
        edition: EditionId,
        subject: Subject,
    ) {
        let start = controller.begin_start();
        self.reset_session_caches();
        let count = self.edition_question_count(edition, &subject).await;
        let ticket = controller.finish_edition_start(start, edition, subject, count);
        self.follow(controller, ticket).await;
    }

    /// Start a field session and load its first question.
    ///
    /// # Errors
    ///
    /// Returns `ViewerError::UnknownField` if the field does not exist.
    pub async fn start_field(
        &self,
        controller: &mut ViewerController,
        fields: &FieldCatalog,
        subject: &Subject,
        name: &str,
    ) -> Result<(), ViewerError> {
        let ticket = controller.start_field(fields, subject, name)?;
        self.reset_session_caches();
        self.follow(controller, ticket).await;
        Ok(())
    }

    /// Dispatch a navigation event and load the new question if any.
    ///
    /// # Errors
    ///
    /// Returns `ViewerError` if the event is rejected.
    pub async fn navigate(
        &self,
        controller: &mut ViewerController,
        event: Event,
    ) -> Result<(), ViewerError> {
        let ticket = controller.dispatch(event)?;
        self.follow(controller, ticket).await;
        Ok(())
    }

    async fn follow(&self, controller: &mut ViewerController, ticket: Option<LoadTicket>) {
        if let Some(ticket) = ticket {
            let load = self.load_question(ticket).await;
            controller.apply_load(load);
        }
    }
}
