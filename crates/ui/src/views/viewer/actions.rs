use std::sync::Arc;

use dioxus::prelude::*;
use quiz_core::navigation::{Event, LoadTicket};
use services::{SessionSummaryService, ViewerController, ViewerService};
use tracing::debug;

use crate::context::AppContext;
use crate::vm::ViewerIntent;

use super::state::ViewerSignals;

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::rc::Rc;

/// Callback that turns viewer intents into controller updates and loads.
///
/// The controller signal is only borrowed between awaits, so a slow load
/// never blocks the buttons; the controller drops results that arrive after
/// the user has moved on.
pub fn use_viewer_dispatcher(state: ViewerSignals, ctx: &AppContext) -> Callback<ViewerIntent> {
    let viewer = ctx.viewer();
    let summaries = ctx.session_summaries();
    use_callback(move |intent: ViewerIntent| {
        handle_intent(state, Arc::clone(&viewer), Arc::clone(&summaries), intent);
    })
}

fn handle_intent(
    state: ViewerSignals,
    viewer: Arc<ViewerService>,
    summaries: Arc<SessionSummaryService>,
    intent: ViewerIntent,
) {
    let mut controller = state.controller;
    let mut notice = state.notice;
    notice.set(None);

    match intent {
        ViewerIntent::StartEdition { edition, subject } => {
            let start = controller.write().begin_start();
            viewer.reset_session_caches();
            spawn(async move {
                let count = viewer.edition_question_count(edition, &subject).await;
                let ticket = controller
                    .write()
                    .finish_edition_start(start, edition, subject, count);
                load_question(controller, &viewer, ticket).await;
            });
        }
        ViewerIntent::StartField {
            subject,
            field_name,
        } => {
            let Some(fields) = state.fields() else {
                notice.set(Some("The field list is still loading.".to_string()));
                return;
            };
            let started = controller.write().start_field(&fields, &subject, &field_name);
            match started {
                Ok(ticket) => {
                    viewer.reset_session_caches();
                    spawn(async move {
                        load_question(controller, &viewer, ticket).await;
                    });
                }
                Err(err) => notice.set(Some(err.to_string())),
            }
        }
        ViewerIntent::Answer(choice) => {
            let answered = controller.write().answer(choice);
            if let Err(err) = answered {
                notice.set(Some(err.to_string()));
            }
        }
        ViewerIntent::DismissAlerts => {
            controller.write().take_alerts();
        }
        other => {
            let Some(event) = other.navigation_event() else {
                return;
            };
            let opens_results = event == Event::ShowResults;
            let dispatched = controller.write().dispatch(event);
            match dispatched {
                Ok(ticket) => {
                    if opens_results {
                        spawn(save_summary(controller, summaries));
                    }
                    if ticket.is_some() {
                        spawn(async move {
                            load_question(controller, &viewer, ticket).await;
                        });
                    }
                }
                Err(err) => {
                    debug!(%err, "navigation rejected");
                    notice.set(Some(err.to_string()));
                }
            }
        }
    }
}

async fn load_question(
    mut controller: Signal<ViewerController>,
    viewer: &ViewerService,
    ticket: Option<LoadTicket>,
) {
    let Some(ticket) = ticket else {
        return;
    };
    let load = viewer.load_question(ticket).await;
    controller.write().apply_load(load);
}

/// Persist the session shown in the results view. Writes for one session
/// run one at a time, so reopening results replaces the first row.
async fn save_summary(
    mut controller: Signal<ViewerController>,
    summaries: Arc<SessionSummaryService>,
) {
    let mut next = controller.write().begin_summary_save();
    while let Some(save) = next {
        let generation = save.session.generation();
        let saved = summaries.save(save.existing, &save.session).await;
        next = controller.write().finish_summary_save(generation, saved);
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct ViewerTestHandles {
    dispatch: Rc<RefCell<Option<Callback<ViewerIntent>>>>,
    controller: Rc<RefCell<Option<Signal<ViewerController>>>>,
}

#[cfg(test)]
impl ViewerTestHandles {
    pub(crate) fn register(
        &self,
        dispatch: Callback<ViewerIntent>,
        controller: Signal<ViewerController>,
    ) {
        *self.dispatch.borrow_mut() = Some(dispatch);
        *self.controller.borrow_mut() = Some(controller);
    }

    pub(crate) fn dispatch(&self) -> Callback<ViewerIntent> {
        (*self.dispatch.borrow()).expect("viewer dispatch registered")
    }

    pub(crate) fn controller(&self) -> Signal<ViewerController> {
        (*self.controller.borrow()).expect("viewer controller registered")
    }
}
