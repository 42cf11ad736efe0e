use std::sync::Arc;

use services::{PathwayService, SessionService};

pub trait UiApp: Send + Sync {
    fn pathway_service(&self) -> Arc<PathwayService>;
    fn session_service(&self) -> Arc<SessionService>;
}

#[derive(Clone)]
pub struct AppContext {
    pathway: Arc<PathwayService>,
    sessions: Arc<SessionService>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            pathway: app.pathway_service(),
            sessions: app.session_service(),
        }
    }

    #[must_use]
    pub fn pathway_service(&self) -> Arc<PathwayService> {
        Arc::clone(&self.pathway)
    }

    #[must_use]
    pub fn session_service(&self) -> Arc<SessionService> {
        Arc::clone(&self.sessions)
    }
}

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
