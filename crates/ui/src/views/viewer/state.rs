use dioxus::prelude::*;
use quiz_core::model::{FieldCatalog, Subject};
use services::ViewerController;
use services::viewer::CatalogSnapshot;

use crate::context::AppContext;
use crate::views::ViewError;

/// Signals shared by the viewer page and its dispatcher.
#[derive(Clone, Copy)]
pub struct ViewerSignals {
    pub controller: Signal<ViewerController>,
    pub catalog: Resource<Result<CatalogSnapshot, ViewError>>,
    pub subject: Signal<Subject>,
    /// Last rejected action, shown until the next intent.
    pub notice: Signal<Option<String>>,
}

impl ViewerSignals {
    /// Field groupings, once the catalog has loaded.
    #[must_use]
    pub fn fields(&self) -> Option<FieldCatalog> {
        self.catalog
            .value()
            .read()
            .as_ref()
            .and_then(|value| value.as_ref().ok())
            .map(|snapshot| snapshot.fields.clone())
    }
}

pub fn use_viewer_state(ctx: &AppContext) -> ViewerSignals {
    let controller = use_signal({
        let ctx = ctx.clone();
        move || ctx.new_controller()
    });
    let subject = use_signal({
        let subject = ctx.settings().default_subject().clone();
        move || subject
    });
    let notice = use_signal(|| None::<String>);

    let viewer = ctx.viewer();
    let catalog = use_resource(move || {
        let viewer = viewer.clone();
        async move { Ok::<_, ViewError>(viewer.load_catalog().await) }
    });

    ViewerSignals {
        controller,
        catalog,
        subject,
        notice,
    }
}
