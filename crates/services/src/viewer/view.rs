use std::fmt;

use quiz_core::model::{AnswerPolicy, Choice, HistoryEntry, Verdict};
use quiz_core::navigation::LoadTicket;

use crate::documents::RenderedPage;

/// What the viewer shows for the question on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionView {
    ticket: LoadTicket,
    ready: bool,
    page: Option<RenderedPage>,
    correct: Option<Choice>,
    entry: Option<HistoryEntry>,
}

impl QuestionView {
    /// Placeholder while the answer key and page are loading.
    ///
    /// `previous_page` keeps the last good page on screen until the new one
    /// arrives.
    pub(crate) fn loading(
        ticket: LoadTicket,
        previous_page: Option<RenderedPage>,
        entry: Option<HistoryEntry>,
    ) -> Self {
        Self {
            ticket,
            ready: false,
            page: previous_page,
            correct: None,
            entry,
        }
    }

    pub(crate) fn finish(&mut self, correct: Option<Choice>, page: Option<RenderedPage>) {
        self.ready = true;
        self.correct = correct;
        if page.is_some() {
            self.page = page;
        }
    }

    pub(crate) fn set_entry(&mut self, entry: HistoryEntry) {
        self.entry = Some(entry);
    }

    #[must_use]
    pub fn ticket(&self) -> &LoadTicket {
        &self.ticket
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    #[must_use]
    pub fn page(&self) -> Option<&RenderedPage> {
        self.page.as_ref()
    }

    /// Key's choice for this question once loaded.
    #[must_use]
    pub fn correct(&self) -> Option<Choice> {
        self.correct
    }

    #[must_use]
    pub fn entry(&self) -> Option<&HistoryEntry> {
        self.entry.as_ref()
    }

    /// Whether the answer buttons are disabled.
    #[must_use]
    pub fn answers_locked(&self, policy: AnswerPolicy) -> bool {
        if !self.ready {
            return true;
        }
        match self.entry {
            None => false,
            Some(entry) => {
                !(entry.verdict == Verdict::Unknown
                    && policy.allow_retry_after_unknown()
                    && self.correct.is_some())
            }
        }
    }

    /// Verdict line for the recorded answer, if any.
    #[must_use]
    pub fn feedback(&self) -> Option<Feedback> {
        let entry = self.entry?;
        Some(Feedback {
            number: self.ticket.question.number.value(),
            entry,
        })
    }
}

/// Verdict message shown under the answer buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feedback {
    pub number: u32,
    pub entry: HistoryEntry,
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.entry.verdict, self.entry.correct) {
            (Verdict::Correct, _) => write!(f, "Q{}: correct!", self.number),
            (Verdict::Incorrect, Some(correct)) => {
                write!(f, "Q{}: incorrect (answer: {correct})", self.number)
            }
            (Verdict::Incorrect, None) => write!(f, "Q{}: incorrect", self.number),
            (Verdict::Unknown, _) => f.write_str("no answer data for this question"),
        }
    }
}
