use quiz_core::model::Choice;
use quiz_core::navigation::Session;
use quiz_core::results::{ResultRow, RowStatus};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultRowVm {
    /// Session row to pass back with a review intent.
    pub row: usize,
    pub question_label: String,
    pub selected_label: String,
    pub correct_label: String,
    pub status_label: &'static str,
    pub status_class: &'static str,
}

impl From<&ResultRow> for ResultRowVm {
    fn from(row: &ResultRow) -> Self {
        let (status_label, status_class) = match row.status {
            RowStatus::Correct => ("correct", "result-correct"),
            RowStatus::Incorrect => ("incorrect", "result-incorrect"),
            RowStatus::Unknown => ("no answer data", "result-unknown"),
            RowStatus::Unanswered => ("not answered", "result-unanswered"),
        };
        Self {
            row: row.row,
            question_label: format!(
                "{} Q{}",
                row.question.edition, row.question.number
            ),
            selected_label: choice_label(row.selected),
            correct_label: choice_label(row.correct),
            status_label,
            status_class,
        }
    }
}

fn choice_label(choice: Option<Choice>) -> String {
    choice.map_or_else(|| "-".to_string(), |choice| choice.to_string())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultsVm {
    pub title: String,
    pub rows: Vec<ResultRowVm>,
    pub correct_label: String,
    pub accuracy_label: String,
    pub unknown_label: Option<String>,
}

#[must_use]
pub fn map_results(session: &Session) -> ResultsVm {
    let table = session.results();
    let unknown_label = match table.unknown() {
        0 => None,
        1 => Some("1 answer had no key data".to_string()),
        n => Some(format!("{n} answers had no key data")),
    };
    ResultsVm {
        title: format!("Results: {}", session.kind().label()),
        rows: table.rows().iter().map(ResultRowVm::from).collect(),
        correct_label: format!("Correct: {} / {}", table.correct(), table.total()),
        accuracy_label: format!("Accuracy: {}%", table.accuracy()),
        unknown_label,
    }
}
