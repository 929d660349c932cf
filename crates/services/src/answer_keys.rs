use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::{debug, warn};

use quiz_core::model::{AnswerKey, Choice, EditionId, MAX_CHOICES, QuestionNumber, Subject};
use storage::resources::{ResourceLayout, ResourceStore};

use crate::alert::{Alert, AlertKind, Loaded};
use crate::error::CatalogError;

/// Decode `{edition}_answer.json`.
///
/// Entries whose key is not a positive question number, or whose value is not
/// a choice between 1 and `MAX_CHOICES` (number or numeric string), are skipped with a warning.
///
/// # Errors
///
/// Returns `CatalogError::Json` if the document is not an object of objects.
pub fn parse_answer_key(
    path: &str,
    edition: EditionId,
    bytes: &[u8],
) -> Result<AnswerKey, CatalogError> {
    let file: BTreeMap<String, BTreeMap<String, Value>> =
        serde_json::from_slice(bytes).map_err(|source| CatalogError::Json {
            path: path.to_string(),
            source,
        })?;

    let mut key = AnswerKey::new(edition);
    for (raw_subject, answers) in file {
        let Ok(subject) = Subject::new(&raw_subject) else {
            warn!(path, subject = %raw_subject, "skipping answers of invalid subject");
            continue;
        };
        for (raw_number, raw_choice) in answers {
            let number = raw_number.parse::<QuestionNumber>().ok();
            let choice = choice_from_json(&raw_choice);
            match (number, choice) {
                (Some(number), Some(choice)) => key.insert(subject.clone(), number, choice),
                _ => warn!(
                    path,
                    subject = %subject,
                    question = %raw_number,
                    value = %raw_choice,
                    "skipping invalid answer entry"
                ),
            }
        }
    }
    Ok(key)
}

fn choice_from_json(value: &Value) -> Option<Choice> {
    let choice: Choice = match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u8::try_from(n).ok())
            .and_then(Choice::new),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    (choice.value() <= MAX_CHOICES).then_some(choice)
}

/// Per-edition answer keys, fetched lazily and cached until the next session.
///
/// A failed fetch is cached as an empty key so the alert is raised once per
/// edition rather than on every question.
pub struct AnswerKeyService {
    store: Arc<dyn ResourceStore>,
    layout: ResourceLayout,
    cache: Mutex<HashMap<EditionId, Arc<AnswerKey>>>,
}

impl AnswerKeyService {
    #[must_use]
    pub fn new(store: Arc<dyn ResourceStore>, layout: ResourceLayout) -> Self {
        Self {
            store,
            layout,
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn cached(&self, edition: EditionId) -> Option<Arc<AnswerKey>> {
        self.cache
            .lock()
            .ok()
            .and_then(|cache| cache.get(&edition).cloned())
    }

    fn remember(&self, edition: EditionId, key: Arc<AnswerKey>) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(edition, key);
        }
    }

    /// Answer key for `edition`. The alert is only set on the fetch that failed.
    pub async fn load(&self, edition: EditionId) -> Loaded<Arc<AnswerKey>> {
        if let Some(key) = self.cached(edition) {
            return Loaded::ok(key);
        }

        let path = self.layout.answer_key(edition);
        let result = match self.store.fetch(&path).await {
            Ok(bytes) => parse_answer_key(&path, edition, &bytes),
            Err(source) => Err(CatalogError::Resource {
                path: path.clone(),
                source,
            }),
        };
        match result {
            Ok(key) => {
                debug!(path, entries = key.len(), "loaded answer key");
                let key = Arc::new(key);
                self.remember(edition, Arc::clone(&key));
                Loaded::ok(key)
            }
            Err(err) => {
                warn!(%err, "answer key unavailable, answers will be unjudged");
                let key = Arc::new(AnswerKey::new(edition));
                self.remember(edition, Arc::clone(&key));
                Loaded::fallback(
                    key,
                    Alert::new(AlertKind::AnswerKeyMissing, "answer file not found")
                        .with_path(path),
                )
            }
        }
    }

    /// Forget every cached key. Loads already in flight may refill entries.
    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::QuestionRef;
    use storage::resources::InMemoryResourceStore;

    fn question(edition: u32, number: u32) -> QuestionRef {
        QuestionRef::new(
            EditionId::new(edition),
            Subject::new("kanka").unwrap(),
            QuestionNumber::new(number).unwrap(),
        )
    }

    #[test]
    fn parses_numbers_and_numeric_strings() {
        let json = br#"{"kanka": {"1": 2, "2": "4", "3": 0, "x": 1, "4": "five", "5": 12}}"#;
        let key = parse_answer_key("pdf/75/75_answer.json", EditionId::new(75), json).unwrap();
        assert_eq!(key.len(), 2);
        assert_eq!(key.correct_choice(&question(75, 1)), Choice::new(2));
        assert_eq!(key.correct_choice(&question(75, 2)), Choice::new(4));
        assert_eq!(key.correct_choice(&question(75, 3)), None);
    }

    #[tokio::test]
    async fn caches_keys_and_alerts_once() {
        let store = Arc::new(
            InMemoryResourceStore::new().with("pdf/75/75_answer.json", r#"{"kanka": {"1": 2}}"#),
        );
        let service = AnswerKeyService::new(store.clone(), ResourceLayout::default());

        let first = service.load(EditionId::new(75)).await;
        assert!(!first.is_fallback());
        store.remove("pdf/75/75_answer.json");
        let second = service.load(EditionId::new(75)).await;
        assert_eq!(second.value.len(), 1);

        let missing = service.load(EditionId::new(74)).await;
        assert_eq!(missing.alert.unwrap().kind(), AlertKind::AnswerKeyMissing);
        let again = service.load(EditionId::new(74)).await;
        assert!(again.alert.is_none());
        assert!(again.value.is_empty());

        service.clear();
        let reloaded = service.load(EditionId::new(75)).await;
        assert!(reloaded.is_fallback());
    }

    #[tokio::test]
    async fn load_after_clear_refills_the_cache() {
        let store = Arc::new(
            InMemoryResourceStore::new().with("pdf/70/70_answer.json", r#"{"kanka": {"3": 4}}"#),
        );
        let service = AnswerKeyService::new(store.clone(), ResourceLayout::default());
        service.load(EditionId::new(70)).await;

        service.clear();
        let late = service.load(EditionId::new(70)).await;
        assert!(!late.is_fallback());

        store.remove("pdf/70/70_answer.json");
        let cached = service.load(EditionId::new(70)).await;
        assert!(cached.alert.is_none());
        assert_eq!(cached.value.correct_choice(&question(70, 3)), Choice::new(4));
    }
}
