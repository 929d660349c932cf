use thiserror::Error;

use crate::model::{Choice, Subject, SubjectError};

/// Largest number of answer buttons a paper can have.
pub const MAX_CHOICES: u8 = 9;

/// What to do when a question answered without key data is answered again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnswerPolicy {
    allow_retry_after_unknown: bool,
}

impl AnswerPolicy {
    #[must_use]
    pub fn new(allow_retry_after_unknown: bool) -> Self {
        Self {
            allow_retry_after_unknown,
        }
    }

    #[must_use]
    pub fn allow_retry_after_unknown(&self) -> bool {
        self.allow_retry_after_unknown
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewerSettings {
    subjects: Vec<Subject>,
    choice_count: u8,
    answer_policy: AnswerPolicy,
}

#[derive(Clone, Debug, Default)]
pub struct ViewerSettingsDraft {
    pub subjects: Vec<String>,
    pub choice_count: Option<u8>,
    pub allow_retry_after_unknown: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ViewerSettingsError {
    #[error("at least one subject must be configured")]
    NoSubjects,
    #[error("invalid subject {raw:?}: {source}")]
    InvalidSubject {
        raw: String,
        #[source]
        source: SubjectError,
    },
    #[error("choice count must be between 1 and 9, got {provided}")]
    InvalidChoiceCount { provided: u8 },
}

impl ViewerSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and normalize the draft.
    ///
    /// Subjects are trimmed, blank entries dropped and duplicates removed
    /// while keeping the configured order.
    ///
    /// # Errors
    ///
    /// Returns `ViewerSettingsError` if no subject remains, a subject tag is
    /// invalid, or the choice count is out of range.
    pub fn validate(self) -> Result<ViewerSettings, ViewerSettingsError> {
        let mut subjects: Vec<Subject> = Vec::new();
        for raw in self.subjects {
            if raw.trim().is_empty() {
                continue;
            }
            let subject = Subject::new(raw.as_str())
                .map_err(|source| ViewerSettingsError::InvalidSubject { raw, source })?;
            if !subjects.contains(&subject) {
                subjects.push(subject);
            }
        }
        if subjects.is_empty() {
            return Err(ViewerSettingsError::NoSubjects);
        }

        let choice_count = self.choice_count.unwrap_or(ViewerSettings::DEFAULT_CHOICES);
        if choice_count == 0 || choice_count > MAX_CHOICES {
            return Err(ViewerSettingsError::InvalidChoiceCount {
                provided: choice_count,
            });
        }

        Ok(ViewerSettings {
            subjects,
            choice_count,
            answer_policy: AnswerPolicy::new(self.allow_retry_after_unknown),
        })
    }
}

impl ViewerSettings {
    pub const DEFAULT_CHOICES: u8 = 5;

    #[must_use]
    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    #[must_use]
    pub fn default_subject(&self) -> &Subject {
        // validate() guarantees at least one subject.
        &self.subjects[0]
    }

    #[must_use]
    pub fn choice_count(&self) -> u8 {
        self.choice_count
    }

    /// Answer buttons in display order.
    #[must_use]
    pub fn choices(&self) -> Vec<Choice> {
        (1..=self.choice_count).filter_map(Choice::new).collect()
    }

    #[must_use]
    pub fn answer_policy(&self) -> AnswerPolicy {
        self.answer_policy
    }
}
