use services::SessionSummaryRow;

use crate::vm::time_fmt::format_datetime;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummaryCardVm {
    pub id: i64,
    pub label: String,
    pub completed_at_str: String,

    pub total: u32,
    pub answered: u32,
    pub correct: u32,
    pub unknown: u32,
    pub accuracy_label: String,
}

impl From<&SessionSummaryRow> for SummaryCardVm {
    fn from(item: &SessionSummaryRow) -> Self {
        let summary = &item.summary;
        Self {
            id: item.id,
            label: summary.label().to_string(),
            completed_at_str: format_datetime(summary.completed_at()),
            total: summary.total(),
            answered: summary.answered(),
            correct: summary.correct(),
            unknown: summary.unknown(),
            accuracy_label: format!("{}%", summary.accuracy()),
        }
    }
}

#[must_use]
pub fn map_summary_cards(items: &[SessionSummaryRow]) -> Vec<SummaryCardVm> {
    items.iter().map(SummaryCardVm::from).collect()
}
