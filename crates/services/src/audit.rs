//! Consistency check over a resource tree, used by the `check` command.

use std::collections::HashMap;
use std::fmt;

use quiz_core::model::{EditionId, Subject};

use crate::alert::Alert;
use crate::viewer::ViewerService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentStatus {
    Questions(u32),
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditionAudit {
    pub edition: EditionId,
    pub label: String,
    /// `None` when the answer file is missing or unreadable.
    pub answer_entries: Option<usize>,
    pub documents: Vec<(Subject, DocumentStatus)>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditReport {
    pub editions: Vec<EditionAudit>,
    pub field_issues: Vec<String>,
    pub alerts: Vec<Alert>,
}

impl AuditReport {
    /// No alerts, no field issues and every document readable.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.alerts.is_empty()
            && self.field_issues.is_empty()
            && self.editions.iter().all(|edition| {
                edition.answer_entries.is_some()
                    && edition
                        .documents
                        .iter()
                        .all(|(_, status)| matches!(status, DocumentStatus::Questions(n) if *n > 0))
            })
    }
}

impl fmt::Display for AuditReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for alert in &self.alerts {
            writeln!(f, "! {alert}")?;
        }
        for edition in &self.editions {
            let answers = edition
                .answer_entries
                .map_or_else(|| "missing".to_string(), |n| n.to_string());
            writeln!(
                f,
                "{} ({}): answers {answers}",
                edition.edition, edition.label
            )?;
            for (subject, status) in &edition.documents {
                match status {
                    DocumentStatus::Questions(n) => writeln!(f, "  {subject}: {n} questions")?,
                    DocumentStatus::Unavailable(reason) => {
                        writeln!(f, "  {subject}: unavailable ({reason})")?;
                    }
                }
            }
        }
        for issue in &self.field_issues {
            writeln!(f, "field: {issue}")?;
        }
        Ok(())
    }
}

/// Load every catalog entry the viewer could reach and report what is broken.
pub async fn audit_resources(viewer: &ViewerService, subjects: &[Subject]) -> AuditReport {
    let snapshot = viewer.load_catalog().await;
    let mut report = AuditReport {
        alerts: snapshot.alerts,
        ..AuditReport::default()
    };
    let mut question_counts: HashMap<(EditionId, Subject), u32> = HashMap::new();

    for edition in snapshot.editions.editions() {
        let key = viewer.answer_keys().load(edition.id()).await;
        let answer_entries = if key.is_fallback() {
            None
        } else {
            Some(key.value.len())
        };

        let mut documents = Vec::with_capacity(subjects.len());
        for subject in subjects {
            let status = match viewer.edition_question_count(edition.id(), subject).await {
                Ok(count) => {
                    question_counts.insert((edition.id(), subject.clone()), count);
                    DocumentStatus::Questions(count)
                }
                Err(err) => DocumentStatus::Unavailable(err.to_string()),
            };
            documents.push((subject.clone(), status));
        }

        report.editions.push(EditionAudit {
            edition: edition.id(),
            label: edition.label().to_string(),
            answer_entries,
            documents,
        });
    }

    for subject in subjects {
        for field in snapshot.fields.fields_for(subject) {
            for question in field.questions() {
                if snapshot.editions.get(question.edition).is_none() {
                    report.field_issues.push(format!(
                        "{} refers to edition {} which is not in the catalog",
                        field.name(),
                        question.edition
                    ));
                    continue;
                }
                let known = question_counts.get(&(question.edition, subject.clone()));
                if let Some(&count) = known
                    && question.number.value() > count
                {
                    report.field_issues.push(format!(
                        "{} refers to {} but the paper has {count} questions",
                        field.name(),
                        question.id()
                    ));
                }
            }
        }
    }

    viewer.reset_session_caches();
    report
}
