use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::model::ViewerSettings;
use storage::repository::Storage;
use storage::resources::{FsResourceStore, HttpResourceStore, ResourceLayout, ResourceStore};

use crate::documents::{DocumentRenderer, PdfRenderer};
use crate::error::AppServicesError;
use crate::results_service::SessionSummaryService;
use crate::viewer::{ViewerController, ViewerService};

/// Open `root` as an HTTP origin when it looks like a URL, else as a directory.
///
/// # Errors
///
/// Returns `ResourceError` if the root is unusable.
pub fn open_resource_store(
    root: &str,
) -> Result<Arc<dyn ResourceStore>, storage::resources::ResourceError> {
    let store: Arc<dyn ResourceStore> =
        if root.starts_with("http://") || root.starts_with("https://") {
            Arc::new(HttpResourceStore::new(root)?)
        } else {
            Arc::new(FsResourceStore::new(root)?)
        };
    Ok(store)
}

/// Assembles app-facing services.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    settings: ViewerSettings,
    viewer: Arc<ViewerService>,
    session_summaries: Arc<SessionSummaryService>,
}

impl AppServices {
    /// Build services over any resource store and storage backend.
    #[must_use]
    pub fn new(
        clock: Clock,
        settings: ViewerSettings,
        store: Arc<dyn ResourceStore>,
        layout: ResourceLayout,
        storage: &Storage,
    ) -> Self {
        let renderer: Arc<dyn DocumentRenderer> = Arc::new(PdfRenderer::new(Arc::clone(&store)));
        Self::with_renderer(clock, settings, store, renderer, layout, storage)
    }

    #[must_use]
    pub fn with_renderer(
        clock: Clock,
        settings: ViewerSettings,
        store: Arc<dyn ResourceStore>,
        renderer: Arc<dyn DocumentRenderer>,
        layout: ResourceLayout,
        storage: &Storage,
    ) -> Self {
        let viewer = Arc::new(ViewerService::new(store, renderer, layout));
        let session_summaries = Arc::new(SessionSummaryService::new(
            clock,
            Arc::clone(&storage.summaries),
        ));
        Self {
            clock,
            settings,
            viewer,
            session_summaries,
        }
    }

    /// Build services backed by `SQLite` storage and a resource root that is
    /// either a directory or an `http(s)://` base URL.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage or the resource root cannot be opened.
    pub async fn new_sqlite(
        db_url: &str,
        resources: &str,
        clock: Clock,
        settings: ViewerSettings,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let store = open_resource_store(resources)?;
        Ok(Self::new(
            clock,
            settings,
            store,
            ResourceLayout::default(),
            &storage,
        ))
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn settings(&self) -> &ViewerSettings {
        &self.settings
    }

    /// Fresh controller using these settings and clock.
    #[must_use]
    pub fn new_controller(&self) -> ViewerController {
        ViewerController::new(self.settings.clone(), self.clock)
    }

    #[must_use]
    pub fn viewer(&self) -> Arc<ViewerService> {
        Arc::clone(&self.viewer)
    }

    #[must_use]
    pub fn session_summaries(&self) -> Arc<SessionSummaryService> {
        Arc::clone(&self.session_summaries)
    }
}
