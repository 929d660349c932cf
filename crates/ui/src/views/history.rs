use dioxus::prelude::*;

use crate::context::AppContext;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{SummaryCardVm, map_summary_cards};

const RECENT_LIMIT: u32 = 20;

#[derive(Clone, Debug, PartialEq)]
struct HistoryData {
    cards: Vec<SummaryCardVm>,
}

#[component]
pub fn HistoryView() -> Element {
    let ctx = use_context::<AppContext>();
    let summaries = ctx.session_summaries();

    let resource = use_resource(move || {
        let summaries = summaries.clone();
        async move {
            let items = summaries
                .list_recent(RECENT_LIMIT)
                .await
                .map_err(|_| ViewError::Storage)?;
            let cards = map_summary_cards(&items);
            Ok(HistoryData { cards })
        }
    });

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page",
            h2 { "History" }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(data) => rsx! {
                    if data.cards.is_empty() {
                        p { "No finished sessions yet." }
                    } else {
                        ul { class: "summary-list",
                            for card in data.cards {
                                SummaryCard { key: "{card.id}", card }
                            }
                        }
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| {
                            let mut resource = resource;
                            resource.restart();
                        },
                        "Retry"
                    }
                },
            }
        }
    }
}

#[component]
fn SummaryCard(card: SummaryCardVm) -> Element {
    rsx! {
        li { class: "summary-card",
            div { class: "summary-head",
                span { class: "summary-label", "{card.label}" }
                span { class: "summary-date", "{card.completed_at_str}" }
            }
            p {
                "Correct: {card.correct} / {card.total} | Answered: {card.answered} | No data: {card.unknown} | Accuracy: {card.accuracy_label}"
            }
        }
    }
}
