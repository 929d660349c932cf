use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{AnswerPolicy, Choice, QuestionId};

//
// ─── VERDICT ───────────────────────────────────────────────────────────────────
//

/// Outcome of checking one answer against the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Correct,
    Incorrect,
    /// The answer key had no entry for the question.
    Unknown,
}

impl Verdict {
    #[must_use]
    pub fn judge(selected: Choice, correct: Option<Choice>) -> Self {
        match correct {
            Some(expected) if expected == selected => Self::Correct,
            Some(_) => Self::Incorrect,
            None => Self::Unknown,
        }
    }
}

//
// ─── HISTORY ───────────────────────────────────────────────────────────────────
//

/// First answer given for a question in this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub selected: Choice,
    pub verdict: Verdict,
    pub correct: Option<Choice>,
}

impl HistoryEntry {
    #[must_use]
    pub fn judge(selected: Choice, correct: Option<Choice>) -> Self {
        Self {
            selected,
            verdict: Verdict::judge(selected, correct),
            correct,
        }
    }
}

/// Result of trying to record an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded(HistoryEntry),
    /// An `Unknown` entry was overwritten once the key became available
    /// (only when the policy allows it).
    Replaced {
        previous: HistoryEntry,
        entry: HistoryEntry,
    },
    /// The question already has a verdict; nothing changed.
    AlreadyAnswered(HistoryEntry),
}

/// Per-session answer history, write-once per question id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerHistory {
    entries: HashMap<QuestionId, HistoryEntry>,
}

impl AnswerHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: &QuestionId) -> Option<&HistoryEntry> {
        self.entries.get(id)
    }

    pub fn record(
        &mut self,
        id: QuestionId,
        entry: HistoryEntry,
        policy: AnswerPolicy,
    ) -> RecordOutcome {
        match self.entries.get(&id).copied() {
            Some(previous)
                if previous.verdict == Verdict::Unknown
                    && entry.verdict != Verdict::Unknown
                    && policy.allow_retry_after_unknown() =>
            {
                self.entries.insert(id, entry);
                RecordOutcome::Replaced { previous, entry }
            }
            Some(previous) => RecordOutcome::AlreadyAnswered(previous),
            None => {
                self.entries.insert(id, entry);
                RecordOutcome::Recorded(entry)
            }
        }
    }

    #[must_use]
    pub fn count(&self, verdict: Verdict) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.verdict == verdict)
            .count()
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.count(Verdict::Correct)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
