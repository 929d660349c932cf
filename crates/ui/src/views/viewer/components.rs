use dioxus::prelude::*;
use quiz_core::model::{EditionId, QuestionNumber, Subject};

use crate::vm::{
    ChoiceButtonVm, PickerVm, QuestionVm, ResultRowVm, ResultsVm, SelectOptionVm, ViewerIntent,
    ViewerVm,
};

fn selected_or_first(selected: &str, options: &[SelectOptionVm]) -> Option<String> {
    options
        .iter()
        .find(|option| option.value == selected)
        .or_else(|| options.first())
        .map(|option| option.value.clone())
}

#[component]
pub fn ModePicker(
    picker: PickerVm,
    subject: Subject,
    on_subject: Callback<Subject>,
    dispatch: Callback<ViewerIntent>,
    starting: bool,
) -> Element {
    let mut edition_choice = use_signal(String::new);
    let mut field_choice = use_signal(String::new);

    let edition_value = selected_or_first(&edition_choice(), &picker.editions);
    let field_value = selected_or_first(&field_choice(), &picker.fields);
    let subject_for_edition = subject.clone();
    let subject_for_field = subject.clone();
    let edition_for_start = edition_value.clone();
    let field_for_start = field_value.clone();

    rsx! {
        section { class: "mode-picker",
            label { class: "picker-row",
                span { "Subject" }
                select {
                    value: "{subject}",
                    onchange: move |evt| {
                        if let Ok(subject) = Subject::new(evt.value()) {
                            on_subject.call(subject);
                        }
                    },
                    for item in picker.subjects.iter() {
                        option { key: "{item.value}", value: "{item.value}", "{item.label}" }
                    }
                }
            }
            div { class: "picker-row",
                select {
                    value: edition_value.clone().unwrap_or_default(),
                    onchange: move |evt| edition_choice.set(evt.value()),
                    for item in picker.editions.iter() {
                        option { key: "{item.value}", value: "{item.value}", "{item.label}" }
                    }
                }
                button {
                    class: "btn btn-primary",
                    r#type: "button",
                    disabled: starting || edition_value.is_none(),
                    onclick: move |_| {
                        let edition = edition_for_start
                            .as_deref()
                            .and_then(|raw| raw.parse::<EditionId>().ok());
                        if let Some(edition) = edition {
                            dispatch.call(ViewerIntent::StartEdition {
                                edition,
                                subject: subject_for_edition.clone(),
                            });
                        }
                    },
                    "Open edition"
                }
            }
            div { class: "picker-row",
                if picker.fields.is_empty() {
                    span { class: "picker-empty", "No fields for this subject." }
                } else {
                    select {
                        value: field_value.clone().unwrap_or_default(),
                        onchange: move |evt| field_choice.set(evt.value()),
                        for item in picker.fields.iter() {
                            option { key: "{item.value}", value: "{item.value}", "{item.label}" }
                        }
                    }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| {
                            if let Some(field_name) = field_for_start.clone() {
                                dispatch.call(ViewerIntent::StartField {
                                    subject: subject_for_field.clone(),
                                    field_name,
                                });
                            }
                        },
                        "Open field"
                    }
                }
            }
        }
    }
}

#[component]
pub fn SessionBar(vm: ViewerVm, dispatch: Callback<ViewerIntent>) -> Element {
    rsx! {
        div { class: "session-bar",
            if let Some(label) = vm.session_label.as_ref() {
                span { class: "session-label", "{label}" }
            }
            if let Some(position) = vm.position_label.as_ref() {
                span { class: "session-position", "{position}" }
            }
            span { class: "session-score", "{vm.score_label}" }
            if vm.session_label.is_some() {
                button {
                    class: "btn btn-ghost",
                    r#type: "button",
                    onclick: move |_| dispatch.call(ViewerIntent::Reset),
                    "Close session"
                }
            }
        }
    }
}

/// Controls for browsing one edition: prev/next, jump and results.
#[component]
pub fn EditionControls(
    can_prev: bool,
    can_next: bool,
    jump_max: u32,
    dispatch: Callback<ViewerIntent>,
) -> Element {
    let mut jump_text = use_signal(String::new);

    rsx! {
        div { class: "nav-controls",
            button {
                class: "btn",
                r#type: "button",
                disabled: !can_prev,
                onclick: move |_| dispatch.call(ViewerIntent::Prev),
                "Prev"
            }
            button {
                class: "btn",
                r#type: "button",
                disabled: !can_next,
                onclick: move |_| dispatch.call(ViewerIntent::Next),
                "Next"
            }
            input {
                class: "jump-input",
                r#type: "number",
                min: "1",
                max: "{jump_max}",
                placeholder: "1-{jump_max}",
                value: "{jump_text}",
                oninput: move |evt| jump_text.set(evt.value()),
            }
            button {
                class: "btn",
                r#type: "button",
                onclick: move |_| {
                    let number = jump_text().trim().parse::<u32>().ok().and_then(QuestionNumber::new);
                    if let Some(number) = number {
                        dispatch.call(ViewerIntent::JumpTo(number));
                        jump_text.set(String::new());
                    }
                },
                "Go"
            }
            button {
                class: "btn btn-primary",
                r#type: "button",
                onclick: move |_| dispatch.call(ViewerIntent::ShowResults),
                "Show results"
            }
        }
    }
}

/// Controls for browsing a field; fields have no jump.
#[component]
pub fn FieldControls(can_prev: bool, can_next: bool, dispatch: Callback<ViewerIntent>) -> Element {
    rsx! {
        div { class: "nav-controls",
            button {
                class: "btn",
                r#type: "button",
                disabled: !can_prev,
                onclick: move |_| dispatch.call(ViewerIntent::Prev),
                "Prev"
            }
            button {
                class: "btn",
                r#type: "button",
                disabled: !can_next,
                onclick: move |_| dispatch.call(ViewerIntent::Next),
                "Next"
            }
            button {
                class: "btn btn-primary",
                r#type: "button",
                onclick: move |_| dispatch.call(ViewerIntent::ShowResults),
                "Show results"
            }
        }
    }
}

#[component]
pub fn QuestionPanel(question: QuestionVm, dispatch: Callback<ViewerIntent>) -> Element {
    rsx! {
        section { class: "question",
            div { class: "page-frame",
                if let Some(src) = question.page_src.as_ref() {
                    iframe { class: "page", src: "{src}", title: "{question.id_label}" }
                }
                if question.loading {
                    p { class: "page-loading", "Loading..." }
                }
            }
            div { class: "answers",
                for button in question.choices.iter().cloned() {
                    AnswerButton { key: "{button.label}", button, dispatch }
                }
            }
            if let Some(feedback) = question.feedback.as_ref() {
                p { class: "feedback {feedback.class}", "{feedback.text}" }
            }
        }
    }
}

#[component]
fn AnswerButton(button: ChoiceButtonVm, dispatch: Callback<ViewerIntent>) -> Element {
    let class = if button.selected {
        "btn answer answer--selected"
    } else {
        "btn answer"
    };
    let choice = button.choice;
    rsx! {
        button {
            class: "{class}",
            r#type: "button",
            disabled: button.disabled,
            onclick: move |_| dispatch.call(ViewerIntent::Answer(choice)),
            "{button.label}"
        }
    }
}

#[component]
pub fn ResultsPanel(results: ResultsVm, dispatch: Callback<ViewerIntent>) -> Element {
    rsx! {
        section { class: "results",
            h3 { "{results.title}" }
            p { class: "results-score",
                span { "{results.correct_label}" }
                " | "
                span { "{results.accuracy_label}" }
            }
            if let Some(note) = results.unknown_label.as_ref() {
                p { class: "results-note", "{note}" }
            }
            table { class: "results-table",
                thead {
                    tr {
                        th { "Question" }
                        th { "Your answer" }
                        th { "Correct" }
                        th { "Result" }
                        th {}
                    }
                }
                tbody {
                    for row in results.rows.iter().cloned() {
                        ResultLine { key: "{row.row}", row, dispatch }
                    }
                }
            }
            button {
                class: "btn",
                r#type: "button",
                onclick: move |_| dispatch.call(ViewerIntent::CloseResults),
                "Back to question"
            }
        }
    }
}

#[component]
fn ResultLine(row: ResultRowVm, dispatch: Callback<ViewerIntent>) -> Element {
    let index = row.row;
    rsx! {
        tr { class: "{row.status_class}",
            td { "{row.question_label}" }
            td { "{row.selected_label}" }
            td { "{row.correct_label}" }
            td { "{row.status_label}" }
            td {
                button {
                    class: "btn btn-ghost",
                    r#type: "button",
                    onclick: move |_| dispatch.call(ViewerIntent::Review(index)),
                    "Review"
                }
            }
        }
    }
}

#[component]
pub fn AlertList(alerts: Vec<String>, dispatch: Callback<ViewerIntent>) -> Element {
    if alerts.is_empty() {
        return rsx! {};
    }
    rsx! {
        div { class: "alerts", role: "alert",
            ul {
                for (index, alert) in alerts.iter().enumerate() {
                    li { key: "{index}", "{alert}" }
                }
            }
            button {
                class: "btn btn-ghost",
                r#type: "button",
                onclick: move |_| dispatch.call(ViewerIntent::DismissAlerts),
                "Dismiss"
            }
        }
    }
}
