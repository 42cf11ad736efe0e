use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use pathway_core::model::{CompletionRecord, LevelDefinition, LevelId, StudentId};
use services::{AppServices, PathwayService, SessionService};
use storage::repository::{InMemoryRepository, Storage};

use crate::context::{UiApp, build_app_context};
use crate::views::{LevelView, LoginView, PathwaysView};

#[derive(Clone)]
struct TestApp {
    pathway: Arc<PathwayService>,
    sessions: Arc<SessionService>,
}

impl UiApp for TestApp {
    fn pathway_service(&self) -> Arc<PathwayService> {
        Arc::clone(&self.pathway)
    }

    fn session_service(&self) -> Arc<SessionService> {
        Arc::clone(&self.sessions)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Pathways,
    Level(u32),
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for ViewHarnessProps {}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view);
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
    #[route("/pathways/level/:level_id", LevelView)]
    Level { level_id: u32 },
    #[route("/login", LoginView)]
    Login {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Pathways => rsx! { PathwaysView {} },
        ViewKind::Level(level_id) => rsx! { LevelView { level_id } },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub app: AppServices,
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

    /// Rebuild, then let pending resources settle.
    pub async fn settle(&mut self) {
        self.rebuild();
        for _ in 0..4 {
            self.drive_async().await;
        }
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

pub fn seeded_repo(level_count: u32) -> InMemoryRepository {
    let repo = InMemoryRepository::new();
    for n in 1..=level_count {
        repo.upsert_level(
            LevelDefinition::new(
                LevelId::new(n),
                format!("Level title {n}"),
                format!("About level {n}"),
                n,
                100,
                false,
            )
            .expect("valid level"),
        )
        .expect("upsert level");
    }
    repo
}

pub fn record(repo: &InMemoryRepository, student: &str, level: u32, points: u32) {
    let student = StudentId::new(student).expect("student id");
    repo.record_completion(&student, CompletionRecord::new(LevelId::new(level), points))
        .expect("record completion");
}

pub fn setup_view_harness(view: ViewKind, repo: &InMemoryRepository) -> ViewHarness {
    setup_view_harness_with_storage(view, &Storage::from_in_memory(repo))
}

pub fn setup_view_harness_with_storage(view: ViewKind, storage: &Storage) -> ViewHarness {
    let services = AppServices::from_storage(storage);
    let app = Arc::new(TestApp {
        pathway: services.pathway(),
        sessions: services.sessions(),
    });

    let dom = VirtualDom::new_with_props(ViewRouterHarness, ViewHarnessProps { app, view });

    ViewHarness { dom, app: services }
}
