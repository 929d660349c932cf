mod history;
mod state;
mod viewer;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use history::HistoryView;
pub use state::{ViewError, ViewState, view_state_from_resource};
pub use viewer::{ViewerSession, ViewerSignals, ViewerView, use_viewer_session_provider};
