use std::sync::Arc;

use quiz_core::model::ViewerSettings;
use services::{AppServices, SessionSummaryService, ViewerController, ViewerService};

/// What the UI needs from the composition root.
pub trait UiApp: Send + Sync {
    fn settings(&self) -> ViewerSettings;

    fn viewer(&self) -> Arc<ViewerService>;
    fn session_summaries(&self) -> Arc<SessionSummaryService>;

    /// Fresh controller for one viewer window.
    fn new_controller(&self) -> ViewerController;
}

impl UiApp for AppServices {
    fn settings(&self) -> ViewerSettings {
        AppServices::settings(self).clone()
    }

    fn viewer(&self) -> Arc<ViewerService> {
        AppServices::viewer(self)
    }

    fn session_summaries(&self) -> Arc<SessionSummaryService> {
        AppServices::session_summaries(self)
    }

    fn new_controller(&self) -> ViewerController {
        AppServices::new_controller(self)
    }
}

#[derive(Clone)]
pub struct AppContext {
    app: Arc<dyn UiApp>,
    settings: ViewerSettings,
    viewer: Arc<ViewerService>,
    session_summaries: Arc<SessionSummaryService>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: Arc<dyn UiApp>) -> Self {
        let settings = app.settings();
        let viewer = app.viewer();
        let session_summaries = app.session_summaries();

        Self {
            app,
            settings,
            viewer,
            session_summaries,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &ViewerSettings {
        &self.settings
    }

    #[must_use]
    pub fn viewer(&self) -> Arc<ViewerService> {
        Arc::clone(&self.viewer)
    }

    #[must_use]
    pub fn session_summaries(&self) -> Arc<SessionSummaryService> {
        Arc::clone(&self.session_summaries)
    }

    #[must_use]
    pub fn new_controller(&self) -> ViewerController {
        self.app.new_controller()
    }
}

// Provided by the composition root (`crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
