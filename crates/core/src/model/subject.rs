use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubjectError {
    #[error("subject tag cannot be empty")]
    Empty,
    #[error("subject tag contains invalid character {found:?}")]
    InvalidCharacter { found: char },
}

/// Exam category tag (e.g. `kanka`).
///
/// Subjects are chosen from a configured list, never derived from content.
/// The tag doubles as a path segment in resource names, so it is restricted
/// to lowercase ASCII letters, digits, `_` and `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Subject(String);

impl Subject {
    /// Create a validated subject tag.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError` if the tag is empty after trimming or contains
    /// characters outside `[a-z0-9_-]`.
    pub fn new(value: impl Into<String>) -> Result<Self, SubjectError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SubjectError::Empty);
        }
        if let Some(found) = trimmed
            .chars()
            .find(|ch| !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || *ch == '_' || *ch == '-'))
        {
            return Err(SubjectError::InvalidCharacter { found });
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Subject {
    type Error = SubjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Subject> for String {
    fn from(value: Subject) -> Self {
        value.0
    }
}
