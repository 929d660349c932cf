use quiz_core::model::{EditionId, Subject};

/// Maps catalog entities to resource paths.
///
/// Defaults: `data/editions.json`, `data/fields.json`,
/// `pdf/{e}/{e}_answer.json` and `pdf/{e}/{e}_{subject}.pdf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLayout {
    data_dir: String,
    pdf_dir: String,
}

impl Default for ResourceLayout {
    fn default() -> Self {
        Self::new("data", "pdf")
    }
}

impl ResourceLayout {
    #[must_use]
    pub fn new(data_dir: impl Into<String>, pdf_dir: impl Into<String>) -> Self {
        let trim = |dir: String| dir.trim_matches('/').to_string();
        Self {
            data_dir: trim(data_dir.into()),
            pdf_dir: trim(pdf_dir.into()),
        }
    }

    #[must_use]
    pub fn editions(&self) -> String {
        format!("{}/editions.json", self.data_dir)
    }

    #[must_use]
    pub fn fields(&self) -> String {
        format!("{}/fields.json", self.data_dir)
    }

    #[must_use]
    pub fn answer_key(&self, edition: EditionId) -> String {
        format!("{}/{edition}/{edition}_answer.json", self.pdf_dir)
    }

    #[must_use]
    pub fn document(&self, edition: EditionId, subject: &Subject) -> String {
        format!("{}/{edition}/{edition}_{subject}.pdf", self.pdf_dir)
    }
}
