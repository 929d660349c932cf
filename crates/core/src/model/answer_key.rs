use std::collections::HashMap;

use crate::model::{Choice, EditionId, QuestionNumber, QuestionRef, Subject};

/// Correct choices for one edition, per subject and question number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerKey {
    edition: Option<EditionId>,
    entries: HashMap<Subject, HashMap<QuestionNumber, Choice>>,
}

impl AnswerKey {
    #[must_use]
    pub fn new(edition: EditionId) -> Self {
        Self {
            edition: Some(edition),
            entries: HashMap::new(),
        }
    }

    pub fn insert(&mut self, subject: Subject, number: QuestionNumber, choice: Choice) {
        self.entries.entry(subject).or_default().insert(number, choice);
    }

    #[must_use]
    pub fn with(mut self, subject: &Subject, number: QuestionNumber, choice: Choice) -> Self {
        self.insert(subject.clone(), number, choice);
        self
    }

    #[must_use]
    pub fn edition(&self) -> Option<EditionId> {
        self.edition
    }

    /// Correct choice for `question`, or `None` when the key has no entry.
    ///
    /// A key built for another edition never answers.
    #[must_use]
    pub fn correct_choice(&self, question: &QuestionRef) -> Option<Choice> {
        if self.edition.is_some_and(|edition| edition != question.edition) {
            return None;
        }
        self.entries
            .get(&question.subject)
            .and_then(|by_number| by_number.get(&question.number))
            .copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn subjects(&self) -> Vec<&Subject> {
        let mut subjects: Vec<_> = self.entries.keys().collect();
        subjects.sort();
        subjects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kanka() -> Subject {
        Subject::new("kanka").unwrap()
    }

    fn q(edition: u32, number: u32) -> QuestionRef {
        QuestionRef::new(EditionId::new(edition), kanka(), QuestionNumber::new(number).unwrap())
    }

    #[test]
    fn looks_up_by_subject_and_number() {
        let key = AnswerKey::new(EditionId::new(75)).with(
            &kanka(),
            QuestionNumber::new(1).unwrap(),
            Choice::new(2).unwrap(),
        );
        assert_eq!(key.correct_choice(&q(75, 1)), Choice::new(2));
        assert_eq!(key.correct_choice(&q(75, 2)), None);
        assert_eq!(key.len(), 1);
    }

    #[test]
    fn ignores_questions_from_other_editions() {
        let key = AnswerKey::new(EditionId::new(75)).with(
            &kanka(),
            QuestionNumber::new(1).unwrap(),
            Choice::new(2).unwrap(),
        );
        assert_eq!(key.correct_choice(&q(74, 1)), None);
    }

    #[test]
    fn default_key_is_empty() {
        let key = AnswerKey::default();
        assert!(key.is_empty());
        assert_eq!(key.correct_choice(&q(75, 1)), None);
    }
}
