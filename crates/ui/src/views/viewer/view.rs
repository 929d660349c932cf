use dioxus::prelude::*;
use quiz_core::model::{Choice, Subject};

use crate::context::AppContext;
use crate::views::{ViewState, view_state_from_resource};
use crate::vm::{ViewerIntent, ViewerMode, map_picker, map_viewer};

use super::ViewerSession;
use super::components::{
    AlertList, EditionControls, FieldControls, ModePicker, QuestionPanel, ResultsPanel, SessionBar,
};

/// Arrow keys move between questions, digit keys answer.
fn intent_for_key(key: &Key) -> Option<ViewerIntent> {
    match key {
        Key::ArrowLeft => Some(ViewerIntent::Prev),
        Key::ArrowRight => Some(ViewerIntent::Next),
        Key::Character(text) => text
            .parse::<u8>()
            .ok()
            .and_then(Choice::new)
            .map(ViewerIntent::Answer),
        _ => None,
    }
}

#[component]
pub fn ViewerView() -> Element {
    let ctx = use_context::<AppContext>();
    let ViewerSession { state, dispatch } = use_context::<ViewerSession>();

    #[cfg(test)]
    {
        let mut registered = use_signal(|| false);
        if !registered() {
            registered.set(true);
            if let Some(handles) = try_consume_context::<super::ViewerTestHandles>() {
                handles.register(dispatch, state.controller);
            }
        }
    }

    let mut subject_signal = state.subject;
    let on_subject = use_callback(move |subject: Subject| subject_signal.set(subject));
    let subject = (state.subject)();

    let vm = map_viewer(&state.controller.read());
    let notice = (state.notice)();
    let catalog_state = view_state_from_resource(&state.catalog);
    let subjects = ctx.settings().subjects().to_vec();

    let on_key = move |evt: KeyboardEvent| {
        if let Some(intent) = intent_for_key(&evt.key()) {
            evt.prevent_default();
            dispatch.call(intent);
        }
    };

    rsx! {
        div { class: "page viewer-page", tabindex: "0", onkeydown: on_key,
            header { class: "view-header",
                h2 { class: "view-title", "Exam viewer" }
            }

            match catalog_state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                },
                ViewState::Ready(snapshot) => {
                    let picker = map_picker(&subjects, &snapshot.editions, &snapshot.fields, &subject);
                    let catalog_alerts = snapshot
                        .alerts
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>();
                    rsx! {
                        if !catalog_alerts.is_empty() {
                            ul { class: "alerts alerts--catalog",
                                for (index, alert) in catalog_alerts.iter().enumerate() {
                                    li { key: "{index}", "{alert}" }
                                }
                            }
                        }
                        ModePicker {
                            picker,
                            subject: subject.clone(),
                            on_subject,
                            dispatch,
                            starting: vm.starting,
                        }
                    }
                },
            }

            AlertList { alerts: vm.alerts.clone(), dispatch }
            if let Some(text) = notice {
                p { class: "notice", "{text}" }
            }

            SessionBar { vm: vm.clone(), dispatch }

            match vm.mode.clone() {
                ViewerMode::Idle => rsx! {
                    if vm.starting {
                        p { class: "page-loading", "Opening paper..." }
                    } else {
                        p { class: "view-hint", "Pick an edition or a field to start." }
                    }
                },
                ViewerMode::Edition => rsx! {
                    EditionControls {
                        can_prev: vm.can_prev,
                        can_next: vm.can_next,
                        jump_max: vm.jump_max.unwrap_or(1),
                        dispatch,
                    }
                    if let Some(question) = vm.question.clone() {
                        QuestionPanel { question, dispatch }
                    }
                },
                ViewerMode::Field => rsx! {
                    FieldControls {
                        can_prev: vm.can_prev,
                        can_next: vm.can_next,
                        dispatch,
                    }
                    if let Some(question) = vm.question.clone() {
                        QuestionPanel { question, dispatch }
                    }
                },
                ViewerMode::Results(results) => rsx! {
                    ResultsPanel { results, dispatch }
                },
            }
        }
    }
}
