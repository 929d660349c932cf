use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::{EditionId, PageIndex, QuestionNumber, Subject};

/// Points at one question: which sitting, which subject paper, which number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestionRef {
    pub edition: EditionId,
    pub subject: Subject,
    pub number: QuestionNumber,
}

impl QuestionRef {
    #[must_use]
    pub fn new(edition: EditionId, subject: Subject, number: QuestionNumber) -> Self {
        Self {
            edition,
            subject,
            number,
        }
    }

    /// History key for this question.
    ///
    /// Every entry path (sequential, jump, review) goes through here, so the
    /// same question always maps to the same key.
    #[must_use]
    pub fn id(&self) -> QuestionId {
        QuestionId {
            edition: self.edition,
            subject: self.subject.clone(),
            number: self.number,
        }
    }

    #[must_use]
    pub fn page_index(&self) -> PageIndex {
        self.number.page_index()
    }
}

/// Composite history key, rendered as `edition-subject-number`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionId {
    edition: EditionId,
    subject: Subject,
    number: QuestionNumber,
}

impl QuestionId {
    #[must_use]
    pub fn edition(&self) -> EditionId {
        self.edition
    }

    #[must_use]
    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    #[must_use]
    pub fn number(&self) -> QuestionNumber {
        self.number
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.edition, self.subject, self.number)
    }
}

/// Error returned when a composite question id cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid question id: {raw}")]
pub struct ParseQuestionIdError {
    raw: String,
}

impl FromStr for QuestionId {
    type Err = ParseQuestionIdError;

    // Subjects may contain '-', so the edition is split off the front and the
    // number off the back.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseQuestionIdError { raw: s.to_string() };
        let (edition, rest) = s.split_once('-').ok_or_else(invalid)?;
        let (subject, number) = rest.rsplit_once('-').ok_or_else(invalid)?;

        Ok(Self {
            edition: edition.parse().map_err(|_| invalid())?,
            subject: Subject::new(subject).map_err(|_| invalid())?,
            number: number.parse().map_err(|_| invalid())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(edition: u32, subject: &str, number: u32) -> QuestionRef {
        QuestionRef::new(
            EditionId::new(edition),
            Subject::new(subject).unwrap(),
            QuestionNumber::new(number).unwrap(),
        )
    }

    #[test]
    fn id_renders_composite_key() {
        assert_eq!(question(75, "kanka", 1).id().to_string(), "75-kanka-1");
    }

    #[test]
    fn id_is_stable_across_clones() {
        let a = question(70, "kiso", 12);
        let b = a.clone();
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), question(72, "kiso", 12).id());
    }

    #[test]
    fn id_parses_subject_with_dash() {
        let id: QuestionId = "72-kiso-b-14".parse().unwrap();
        assert_eq!(id, question(72, "kiso-b", 14).id());
    }

    #[test]
    fn id_parse_rejects_garbage() {
        assert!("kanka".parse::<QuestionId>().is_err());
        assert!("75-kanka-0".parse::<QuestionId>().is_err());
    }
}
