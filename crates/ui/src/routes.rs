use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::context::AppContext;
use crate::views::{HistoryView, ViewerView, use_viewer_session_provider};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", ViewerView)] Viewer {},
        #[route("/history", HistoryView)] History {},
}

#[component]
fn Layout() -> Element {
    let ctx = use_context::<AppContext>();
    use_viewer_session_provider(&ctx);

    rsx! {
        div { class: "app",
            Sidebar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Sidebar() -> Element {
    rsx! {
        nav { class: "sidebar",
            h1 { "Exams" }
            ul {
                li { Link { to: Route::Viewer {}, "Viewer" } }
                li { Link { to: Route::History {}, "History" } }
            }
        }
    }
}
