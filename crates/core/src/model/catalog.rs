use std::collections::BTreeMap;

use thiserror::Error;

use crate::model::{EditionId, QuestionRef, Subject};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FieldError {
    #[error("field name cannot be empty")]
    EmptyName,
    #[error("field {name:?} has no questions")]
    NoQuestions { name: String },
    #[error("field {name:?} mixes subjects ({found} in a {expected} field)")]
    SubjectMismatch {
        name: String,
        expected: Subject,
        found: Subject,
    },
}

/// A selectable exam sitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edition {
    id: EditionId,
    label: String,
}

impl Edition {
    /// Falls back to the default label when `label` is missing or blank.
    #[must_use]
    pub fn new(id: EditionId, label: Option<String>) -> Self {
        let label = label
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| default_edition_label(id));
        Self { id, label }
    }

    #[must_use]
    pub fn id(&self) -> EditionId {
        self.id
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

#[must_use]
pub fn default_edition_label(id: EditionId) -> String {
    format!("第{id}回")
}

/// Available editions, newest first, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditionCatalog {
    editions: Vec<Edition>,
}

impl EditionCatalog {
    #[must_use]
    pub fn new(mut editions: Vec<Edition>) -> Self {
        editions.sort_by(|a, b| b.id.cmp(&a.id));
        editions.dedup_by_key(|edition| edition.id);
        Self { editions }
    }

    #[must_use]
    pub fn editions(&self) -> &[Edition] {
        &self.editions
    }

    #[must_use]
    pub fn latest(&self) -> Option<&Edition> {
        self.editions.first()
    }

    #[must_use]
    pub fn get(&self, id: EditionId) -> Option<&Edition> {
        self.editions.iter().find(|edition| edition.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.editions.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.editions.len()
    }
}

/// Topic bucket of questions drawn from several editions of one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldGroup {
    name: String,
    subject: Subject,
    questions: Vec<QuestionRef>,
}

impl FieldGroup {
    /// Build a field, keeping question order as given.
    ///
    /// # Errors
    ///
    /// Returns `FieldError` if the name is blank, the list is empty, or a
    /// question belongs to another subject.
    pub fn new(
        name: impl Into<String>,
        subject: Subject,
        questions: Vec<QuestionRef>,
    ) -> Result<Self, FieldError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(FieldError::EmptyName);
        }
        if questions.is_empty() {
            return Err(FieldError::NoQuestions { name });
        }
        if let Some(stray) = questions.iter().find(|q| q.subject != subject) {
            return Err(FieldError::SubjectMismatch {
                name,
                expected: subject,
                found: stray.subject.clone(),
            });
        }
        Ok(Self {
            name,
            subject,
            questions,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    #[must_use]
    pub fn questions(&self) -> &[QuestionRef] {
        &self.questions
    }

    /// Editions referenced by this field, in first-seen order.
    #[must_use]
    pub fn editions(&self) -> Vec<EditionId> {
        let mut seen = Vec::new();
        for question in &self.questions {
            if !seen.contains(&question.edition) {
                seen.push(question.edition);
            }
        }
        seen
    }
}

/// Field groupings keyed by subject.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldCatalog {
    by_subject: BTreeMap<Subject, Vec<FieldGroup>>,
}

impl FieldCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: FieldGroup) {
        self.by_subject
            .entry(field.subject.clone())
            .or_default()
            .push(field);
    }

    #[must_use]
    pub fn fields_for(&self, subject: &Subject) -> &[FieldGroup] {
        self.by_subject.get(subject).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn find(&self, subject: &Subject, name: &str) -> Option<&FieldGroup> {
        self.fields_for(subject)
            .iter()
            .find(|field| field.name == name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_subject.values().all(Vec::is_empty)
    }
}
