use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use quiz_core::model::{EditionId, PageIndex, QuestionRef, Subject, question_count_for_pages};
use storage::resources::{ResourceLayout, ResourceStore};

use crate::error::DocumentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentInfo {
    pub page_count: u32,
}

impl DocumentInfo {
    /// Questions in the paper; the first page is a cover.
    #[must_use]
    pub fn question_count(&self) -> u32 {
        question_count_for_pages(self.page_count)
    }
}

/// Something the webview can display for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub source: Url,
    pub page_index: PageIndex,
}

/// Opens exam documents and produces displayable pages.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// # Errors
    ///
    /// Returns `DocumentError` if the document is missing or unreadable.
    async fn open(&self, path: &str) -> Result<DocumentInfo, DocumentError>;

    /// # Errors
    ///
    /// Returns `DocumentError` if the page cannot be produced.
    async fn render_page(&self, path: &str, page: PageIndex)
    -> Result<RenderedPage, DocumentError>;
}

/// Counts pages with `lopdf` and lets the webview's PDF viewer draw them.
pub struct PdfRenderer {
    store: Arc<dyn ResourceStore>,
}

impl PdfRenderer {
    #[must_use]
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl DocumentRenderer for PdfRenderer {
    async fn open(&self, path: &str) -> Result<DocumentInfo, DocumentError> {
        let bytes = self.store.fetch(path).await?;
        let document = lopdf::Document::load_mem(&bytes).map_err(|e| DocumentError::Parse {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        let page_count = u32::try_from(document.get_pages().len()).unwrap_or(u32::MAX);
        Ok(DocumentInfo { page_count })
    }

    async fn render_page(
        &self,
        path: &str,
        page: PageIndex,
    ) -> Result<RenderedPage, DocumentError> {
        let mut source = self.store.locate(path)?;
        source.set_fragment(Some(&format!("page={}", page.value())));
        Ok(RenderedPage {
            source,
            page_index: page,
        })
    }
}

/// Resolves documents through the layout and caches page counts per path.
pub struct DocumentService {
    renderer: Arc<dyn DocumentRenderer>,
    layout: ResourceLayout,
    page_counts: Mutex<HashMap<String, DocumentInfo>>,
}

impl DocumentService {
    #[must_use]
    pub fn new(renderer: Arc<dyn DocumentRenderer>, layout: ResourceLayout) -> Self {
        Self {
            renderer,
            layout,
            page_counts: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn path_for(&self, edition: EditionId, subject: &Subject) -> String {
        self.layout.document(edition, subject)
    }

    /// Page count of one edition's paper, opening it on first use.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError` if the document cannot be opened.
    pub async fn info(
        &self,
        edition: EditionId,
        subject: &Subject,
    ) -> Result<DocumentInfo, DocumentError> {
        let path = self.path_for(edition, subject);
        let cached = self
            .page_counts
            .lock()
            .ok()
            .and_then(|counts| counts.get(&path).copied());
        if let Some(info) = cached {
            return Ok(info);
        }

        let info = self.renderer.open(&path).await?;
        debug!(path, pages = info.page_count, "opened document");
        if let Ok(mut counts) = self.page_counts.lock() {
            counts.insert(path, info);
        }
        Ok(info)
    }

    /// # Errors
    ///
    /// Returns `DocumentError` if the document cannot be opened.
    pub async fn question_count(
        &self,
        edition: EditionId,
        subject: &Subject,
    ) -> Result<u32, DocumentError> {
        Ok(self.info(edition, subject).await?.question_count())
    }

    /// Page showing `question`, which sits one page after its number.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError` if the document cannot be opened or is too
    /// short to contain the question.
    pub async fn render(&self, question: &QuestionRef) -> Result<RenderedPage, DocumentError> {
        let info = self.info(question.edition, &question.subject).await?;
        let page = question.page_index();
        if page.value() > info.page_count {
            warn!(question = %question.id(), pages = info.page_count, "question beyond document end");
            return Err(DocumentError::PageOutOfRange {
                page,
                page_count: info.page_count,
            });
        }
        let path = self.path_for(question.edition, &question.subject);
        self.renderer.render_page(&path, page).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::{Document, Object, dictionary};
    use quiz_core::model::QuestionNumber;
    use storage::resources::InMemoryResourceStore;

    pub(crate) fn pdf_with_pages(pages: u32) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let kids: Vec<Object> = (0..pages)
            .map(|_| {
                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
                })
                .into()
            })
            .collect();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => i64::from(pages),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    fn kanka() -> Subject {
        Subject::new("kanka").unwrap()
    }

    #[tokio::test]
    async fn pdf_renderer_counts_pages_and_links_fragment() {
        let store = Arc::new(
            InMemoryResourceStore::new().with("pdf/75/75_kanka.pdf", pdf_with_pages(26)),
        );
        let service = DocumentService::new(
            Arc::new(PdfRenderer::new(store.clone())),
            ResourceLayout::default(),
        );

        assert_eq!(
            service.question_count(EditionId::new(75), &kanka()).await.unwrap(),
            25
        );

        let question = QuestionRef::new(EditionId::new(75), kanka(), QuestionNumber::new(1).unwrap());
        let page = service.render(&question).await.unwrap();
        assert_eq!(page.page_index.value(), 2);
        assert_eq!(page.source.as_str(), "memory:///pdf/75/75_kanka.pdf#page=2");

        // page count stays cached after the file goes away
        store.remove("pdf/75/75_kanka.pdf");
        assert!(service.info(EditionId::new(75), &kanka()).await.is_ok());
    }

    #[tokio::test]
    async fn missing_and_garbage_documents_fail() {
        let store = Arc::new(
            InMemoryResourceStore::new().with("pdf/70/70_kanka.pdf", b"not a pdf".to_vec()),
        );
        let service =
            DocumentService::new(Arc::new(PdfRenderer::new(store)), ResourceLayout::default());

        let missing = service.info(EditionId::new(75), &kanka()).await.unwrap_err();
        assert!(missing.is_not_found());
        let garbage = service.info(EditionId::new(70), &kanka()).await.unwrap_err();
        assert!(matches!(garbage, DocumentError::Parse { .. }));
    }

    #[tokio::test]
    async fn render_rejects_question_past_last_page() {
        let store = Arc::new(
            InMemoryResourceStore::new().with("pdf/75/75_kanka.pdf", pdf_with_pages(3)),
        );
        let service =
            DocumentService::new(Arc::new(PdfRenderer::new(store)), ResourceLayout::default());
        let question = QuestionRef::new(EditionId::new(75), kanka(), QuestionNumber::new(3).unwrap());
        let err = service.render(&question).await.unwrap_err();
        assert!(matches!(err, DocumentError::PageOutOfRange { page_count: 3, .. }));
    }
}
