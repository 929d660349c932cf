use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use async_trait::async_trait;
use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use quiz_core::model::{PageIndex, ViewerSettingsDraft};
use quiz_core::time::fixed_clock;
use services::documents::{DocumentInfo, DocumentRenderer, RenderedPage};
use services::{AppServices, DocumentError, ViewerController};
use storage::repository::{SessionSummaryRepository, Storage};
use storage::resources::{InMemoryResourceStore, ResourceError, ResourceLayout};
use url::Url;

use crate::context::{UiApp, build_app_context};
use crate::views::viewer::ViewerTestHandles;
use crate::views::{HistoryView, ViewerView, use_viewer_session_provider};
use crate::vm::ViewerIntent;

/// Renderer with fixed page counts; pages point at `memory:///`.
struct ScriptedRenderer {
    pages: HashMap<String, u32>,
}

#[async_trait]
impl DocumentRenderer for ScriptedRenderer {
    async fn open(&self, path: &str) -> Result<DocumentInfo, DocumentError> {
        self.pages
            .get(path)
            .map(|&page_count| DocumentInfo { page_count })
            .ok_or_else(|| {
                DocumentError::Resource(ResourceError::NotFound {
                    path: path.to_string(),
                })
            })
    }

    async fn render_page(
        &self,
        path: &str,
        page: PageIndex,
    ) -> Result<RenderedPage, DocumentError> {
        let source = Url::parse(&format!("memory:///{path}#page={}", page.value()))
            .expect("valid memory url");
        Ok(RenderedPage {
            source,
            page_index: page,
        })
    }
}

pub fn sample_resources() -> InMemoryResourceStore {
    InMemoryResourceStore::new()
        .with("data/editions.json", r#"{"available": [70, 72, 75]}"#)
        .with(
            "data/fields.json",
            r#"{"kanka": [{"fieldName": "circulatory", "questions": [
                {"edition": 70, "pageNum": 3},
                {"edition": 70, "pageNum": 8},
                {"edition": 72, "pageNum": 1},
                {"edition": 72, "pageNum": 15},
                {"edition": 70, "pageNum": 22}
            ]}]}"#,
        )
        .with("pdf/75/75_answer.json", r#"{"kanka": {"1": 2, "2": 5}}"#)
        .with("pdf/70/70_answer.json", r#"{"kanka": {"3": 4, "8": 1}}"#)
}

fn sample_renderer() -> ScriptedRenderer {
    let pages = [
        ("pdf/75/75_kanka.pdf", 26),
        ("pdf/70/70_kanka.pdf", 30),
        ("pdf/72/72_kanka.pdf", 30),
    ]
    .into_iter()
    .map(|(path, pages)| (path.to_string(), pages))
    .collect();
    ScriptedRenderer { pages }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Viewer,
    History,
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<dyn UiApp>,
    view: ViewKind,
    handles: ViewerTestHandles,
    view_slot: Rc<RefCell<Option<Signal<ViewKind>>>>,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for ViewHarnessProps {}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app = Arc::clone(&props.app);
    let ctx = use_context_provider(|| build_app_context(app));
    use_viewer_session_provider(&ctx);
    let view = use_signal(|| props.view);
    use_hook(|| *props.view_slot.borrow_mut() = Some(view));
    use_context_provider(|| view);
    use_context_provider(|| props.handles.clone());
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<Signal<ViewKind>>();
    match view() {
        ViewKind::Viewer => rsx! { ViewerView {} },
        ViewKind::History => rsx! { HistoryView {} },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub storage: Storage,
    handles: ViewerTestHandles,
    view_slot: Rc<RefCell<Option<Signal<ViewKind>>>>,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Let spawned loads finish and re-render.
    pub async fn settle(&mut self) {
        for _ in 0..4 {
            self.drive_async().await;
        }
    }

    pub async fn dispatch(&mut self, intent: ViewerIntent) {
        let dispatch = self.handles.dispatch();
        self.dom.in_runtime(|| dispatch.call(intent));
        self.settle().await;
    }

    /// Switch the page under the shared layout, like a sidebar link would.
    pub async fn show(&mut self, kind: ViewKind) {
        let slot = *self.view_slot.borrow();
        let mut view = slot.expect("harness view registered");
        self.dom.in_runtime(|| view.set(kind));
        self.settle().await;
    }

    pub fn with_controller<T>(&self, read: impl FnOnce(&ViewerController) -> T) -> T {
        let controller = self.handles.controller();
        self.dom.in_runtime(|| read(&controller.read()))
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn setup_view_harness(view: ViewKind) -> ViewHarness {
    setup_view_harness_with(view, Storage::in_memory(), sample_resources())
}

pub fn setup_view_harness_with_summary_repo(
    view: ViewKind,
    summaries: Arc<dyn SessionSummaryRepository>,
) -> ViewHarness {
    let storage = Storage { summaries };
    setup_view_harness_with(view, storage, sample_resources())
}

pub fn setup_view_harness_with(
    view: ViewKind,
    storage: Storage,
    resources: InMemoryResourceStore,
) -> ViewHarness {
    let settings = ViewerSettingsDraft {
        subjects: vec!["kanka".into()],
        choice_count: Some(5),
        allow_retry_after_unknown: false,
    }
    .validate()
    .expect("valid settings");
    let services = AppServices::with_renderer(
        fixed_clock(),
        settings,
        Arc::new(resources),
        Arc::new(sample_renderer()),
        ResourceLayout::default(),
        &storage,
    );
    let app: Arc<dyn UiApp> = Arc::new(services);
    let handles = ViewerTestHandles::default();
    let view_slot = Rc::new(RefCell::new(None));

    let dom = VirtualDom::new_with_props(
        ViewRouterHarness,
        ViewHarnessProps {
            app,
            view,
            handles: handles.clone(),
            view_slot: Rc::clone(&view_slot),
        },
    );

    ViewHarness {
        dom,
        storage,
        handles,
        view_slot,
    }
}
