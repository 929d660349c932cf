use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use quiz_core::model::{
    Edition, EditionCatalog, EditionId, FieldCatalog, FieldGroup, QuestionNumber, QuestionRef,
    Subject,
};
use storage::resources::{ResourceLayout, ResourceStore};

use crate::alert::{Alert, AlertKind, Loaded};
use crate::error::CatalogError;

//
// ─── WIRE FORMAT ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
struct EditionsFile {
    available: Vec<EditionEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EditionEntry {
    Number(u32),
    Text(String),
    Labeled {
        value: NumberOrText,
        #[serde(rename = "displayText")]
        display_text: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(u32),
    Text(String),
}

impl NumberOrText {
    fn edition(&self) -> Option<EditionId> {
        match self {
            Self::Number(n) => Some(EditionId::new(*n)),
            Self::Text(raw) => raw.parse().ok(),
        }
    }
}

impl EditionEntry {
    fn into_edition(self) -> Option<Edition> {
        match self {
            Self::Number(n) => Some(Edition::new(EditionId::new(n), None)),
            Self::Text(raw) => raw.parse().ok().map(|id| Edition::new(id, None)),
            Self::Labeled {
                value,
                display_text,
            } => value.edition().map(|id| Edition::new(id, display_text)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FieldEntry {
    #[serde(rename = "fieldName")]
    field_name: String,
    #[serde(default)]
    questions: Vec<FieldQuestion>,
}

#[derive(Debug, Deserialize)]
struct FieldQuestion {
    edition: NumberOrText,
    #[serde(rename = "pageNum")]
    page_num: u32,
}

//
// ─── PARSING ───────────────────────────────────────────────────────────────────
//

/// Decode `editions.json`. Unparsable items are skipped.
///
/// # Errors
///
/// Returns `CatalogError::Json` if the document shape is wrong.
pub fn parse_editions(path: &str, bytes: &[u8]) -> Result<EditionCatalog, CatalogError> {
    let file: EditionsFile = serde_json::from_slice(bytes).map_err(|source| CatalogError::Json {
        path: path.to_string(),
        source,
    })?;
    let total = file.available.len();
    let editions: Vec<Edition> = file
        .available
        .into_iter()
        .filter_map(EditionEntry::into_edition)
        .collect();
    if editions.len() < total {
        warn!(path, skipped = total - editions.len(), "ignored invalid edition entries");
    }
    Ok(EditionCatalog::new(editions))
}

/// Decode `fields.json`. Unknown subjects, empty fields and bad question
/// references are skipped with a warning.
///
/// # Errors
///
/// Returns `CatalogError::Json` if the document shape is wrong.
pub fn parse_fields(path: &str, bytes: &[u8]) -> Result<FieldCatalog, CatalogError> {
    let file: BTreeMap<String, Vec<FieldEntry>> =
        serde_json::from_slice(bytes).map_err(|source| CatalogError::Json {
            path: path.to_string(),
            source,
        })?;

    let mut catalog = FieldCatalog::new();
    for (raw_subject, entries) in file {
        let subject = match Subject::new(&raw_subject) {
            Ok(subject) => subject,
            Err(err) => {
                warn!(path, subject = %raw_subject, %err, "skipping fields of invalid subject");
                continue;
            }
        };
        for entry in entries {
            let questions: Vec<QuestionRef> = entry
                .questions
                .iter()
                .filter_map(|q| {
                    let edition = q.edition.edition()?;
                    let number = QuestionNumber::new(q.page_num)?;
                    Some(QuestionRef::new(edition, subject.clone(), number))
                })
                .collect();
            if questions.len() < entry.questions.len() {
                warn!(path, field = %entry.field_name, "ignored invalid question references");
            }
            match FieldGroup::new(entry.field_name, subject.clone(), questions) {
                Ok(field) => catalog.push(field),
                Err(err) => warn!(path, %err, "skipping field"),
            }
        }
    }
    Ok(catalog)
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Loads the edition list and the field groupings.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn ResourceStore>,
    layout: ResourceLayout,
}

impl CatalogService {
    #[must_use]
    pub fn new(store: Arc<dyn ResourceStore>, layout: ResourceLayout) -> Self {
        Self { store, layout }
    }

    /// Edition list, or an empty catalog plus an alert.
    pub async fn load_editions(&self) -> Loaded<EditionCatalog> {
        let path = self.layout.editions();
        let result = match self.store.fetch(&path).await {
            Ok(bytes) => parse_editions(&path, &bytes),
            Err(source) => Err(CatalogError::Resource {
                path: path.clone(),
                source,
            }),
        };
        match result {
            Ok(catalog) => {
                debug!(path, editions = catalog.len(), "loaded edition catalog");
                Loaded::ok(catalog)
            }
            Err(err) => {
                warn!(%err, "falling back to an empty edition catalog");
                Loaded::fallback(
                    EditionCatalog::default(),
                    Alert::new(AlertKind::CatalogUnavailable, "could not load the edition list")
                        .with_path(path),
                )
            }
        }
    }

    /// Field groupings, or an empty catalog plus an alert.
    pub async fn load_fields(&self) -> Loaded<FieldCatalog> {
        let path = self.layout.fields();
        let result = match self.store.fetch(&path).await {
            Ok(bytes) => parse_fields(&path, &bytes),
            Err(source) => Err(CatalogError::Resource {
                path: path.clone(),
                source,
            }),
        };
        match result {
            Ok(catalog) => {
                debug!(path, "loaded field catalog");
                Loaded::ok(catalog)
            }
            Err(err) => {
                warn!(%err, "falling back to an empty field catalog");
                Loaded::fallback(
                    FieldCatalog::default(),
                    Alert::new(AlertKind::FieldsUnavailable, "could not load the field list")
                        .with_path(path),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::resources::InMemoryResourceStore;

    #[test]
    fn editions_accept_numbers_strings_and_labels() {
        let json = br#"{"available": [72, "75", {"value": 74, "displayText": "74th"}, "x", {"value": "73"}]}"#;
        let catalog = parse_editions("data/editions.json", json).unwrap();
        let ids: Vec<u32> = catalog.editions().iter().map(|e| e.id().value()).collect();
        assert_eq!(ids, vec![75, 74, 73, 72]);
        assert_eq!(catalog.get(EditionId::new(74)).unwrap().label(), "74th");
        assert_eq!(catalog.get(EditionId::new(73)).unwrap().label(), "第73回");
    }

    #[test]
    fn fields_skip_bad_entries() {
        let json = br#"{
            "kanka": [
                {"fieldName": "circulatory", "questions": [
                    {"edition": 70, "pageNum": 3},
                    {"edition": "72", "pageNum": 1},
                    {"edition": 72, "pageNum": 0}
                ]},
                {"fieldName": "empty", "questions": []}
            ],
            "Bad Subject": [{"fieldName": "x", "questions": [{"edition": 70, "pageNum": 1}]}]
        }"#;
        let catalog = parse_fields("data/fields.json", json).unwrap();
        let kanka = Subject::new("kanka").unwrap();
        let fields = catalog.fields_for(&kanka);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name(), "circulatory");
        assert_eq!(fields[0].questions().len(), 2);
    }

    #[test]
    fn malformed_editions_is_an_error() {
        let err = parse_editions("data/editions.json", b"[1, 2]").unwrap_err();
        assert!(matches!(err, CatalogError::Json { .. }));
        assert_eq!(err.path(), "data/editions.json");
    }

    #[tokio::test]
    async fn missing_catalog_falls_back_with_alert() {
        let service = CatalogService::new(
            Arc::new(InMemoryResourceStore::new()),
            ResourceLayout::default(),
        );
        let loaded = service.load_editions().await;
        assert!(loaded.value.is_empty());
        let alert = loaded.alert.unwrap();
        assert_eq!(alert.kind(), AlertKind::CatalogUnavailable);
        assert_eq!(alert.path(), Some("data/editions.json"));

        let fields = service.load_fields().await;
        assert!(fields.value.is_empty());
        assert_eq!(fields.alert.unwrap().kind(), AlertKind::FieldsUnavailable);
    }
}
