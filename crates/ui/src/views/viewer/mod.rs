use dioxus::prelude::*;

use crate::context::AppContext;
use crate::vm::ViewerIntent;

mod actions;
mod components;
mod state;
mod view;

#[cfg(test)]
pub(crate) use actions::ViewerTestHandles;
pub use state::ViewerSignals;
pub use view::ViewerView;

/// Viewer state and its dispatcher, owned above the router outlet so a
/// session outlives visits to other pages.
#[derive(Clone, Copy)]
pub struct ViewerSession {
    pub state: ViewerSignals,
    pub dispatch: Callback<ViewerIntent>,
}

/// Create the viewer session and provide it to descendants.
pub fn use_viewer_session_provider(ctx: &AppContext) -> ViewerSession {
    let state = state::use_viewer_state(ctx);
    let dispatch = actions::use_viewer_dispatcher(state, ctx);
    use_context_provider(|| ViewerSession { state, dispatch })
}
