use crate::model::{AnswerHistory, Choice, QuestionRef, Verdict};
use crate::scoring::Accuracy;

/// Status of one row in the end-of-session table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    Correct,
    Incorrect,
    Unknown,
    Unanswered,
}

impl From<Verdict> for RowStatus {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Correct => Self::Correct,
            Verdict::Incorrect => Self::Incorrect,
            Verdict::Unknown => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    /// 0-based position in the session question list; pass it to `Event::Review`.
    pub row: usize,
    pub question: QuestionRef,
    pub selected: Option<Choice>,
    pub correct: Option<Choice>,
    pub status: RowStatus,
}

/// Session question list merged with the recorded history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsTable {
    rows: Vec<ResultRow>,
    correct: usize,
    answered: usize,
    unknown: usize,
}

impl ResultsTable {
    #[must_use]
    pub fn build(questions: &[QuestionRef], history: &AnswerHistory) -> Self {
        let rows = questions
            .iter()
            .enumerate()
            .map(|(row, question)| {
                let entry = history.get(&question.id());
                ResultRow {
                    row,
                    question: question.clone(),
                    selected: entry.map(|e| e.selected),
                    correct: entry.and_then(|e| e.correct),
                    status: entry.map_or(RowStatus::Unanswered, |e| e.verdict.into()),
                }
            })
            .collect();

        Self {
            rows,
            correct: history.correct_count(),
            answered: history.len(),
            unknown: history.count(Verdict::Unknown),
        }
    }

    #[must_use]
    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn correct(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn answered(&self) -> usize {
        self.answered
    }

    #[must_use]
    pub fn unknown(&self) -> usize {
        self.unknown
    }

    #[must_use]
    pub fn accuracy(&self) -> Accuracy {
        Accuracy::from_counts(self.correct, self.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerPolicy, EditionId, HistoryEntry, QuestionNumber, Subject};

    fn q(number: u32) -> QuestionRef {
        QuestionRef::new(
            EditionId::new(75),
            Subject::new("kanka").unwrap(),
            QuestionNumber::new(number).unwrap(),
        )
    }

    fn c(value: u8) -> Choice {
        Choice::new(value).unwrap()
    }

    #[test]
    fn merges_history_into_rows() {
        let questions = vec![q(1), q(2), q(3), q(4)];
        let mut history = AnswerHistory::new();
        let policy = AnswerPolicy::default();
        history.record(q(1).id(), HistoryEntry::judge(c(2), Some(c(2))), policy);
        history.record(q(2).id(), HistoryEntry::judge(c(1), Some(c(3))), policy);
        history.record(q(4).id(), HistoryEntry::judge(c(5), None), policy);

        let table = ResultsTable::build(&questions, &history);
        let statuses: Vec<RowStatus> = table.rows().iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![
                RowStatus::Correct,
                RowStatus::Incorrect,
                RowStatus::Unanswered,
                RowStatus::Unknown
            ]
        );
        assert_eq!(table.rows()[1].correct, Some(c(3)));
        assert_eq!(table.rows()[2].selected, None);
        assert_eq!(table.correct(), 1);
        assert_eq!(table.answered(), 3);
        assert_eq!(table.unknown(), 1);
        assert_eq!(table.accuracy().to_string(), "25.0");
    }
}
