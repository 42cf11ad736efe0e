use std::sync::Arc;

use storage::remote::{RemoteConfig, RemoteStore};
use storage::repository::{CompletionRepository, LevelRepository, Storage};

use crate::error::AppServicesError;
use crate::pathway_service::PathwayService;
use crate::session_service::SessionService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    pathway: Arc<PathwayService>,
    sessions: Arc<SessionService>,
}

impl AppServices {
    #[must_use]
    pub fn from_storage(storage: &Storage) -> Self {
        Self {
            pathway: Arc::new(PathwayService::new(
                Arc::clone(&storage.levels),
                Arc::clone(&storage.completions),
            )),
            sessions: Arc::new(SessionService::new(Arc::clone(&storage.session))),
        }
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage))
    }

    /// Levels and completions come from the hosted store; session values stay
    /// in the local database.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the local database cannot be opened.
    pub async fn new_sqlite_with_remote(
        db_url: &str,
        remote: RemoteConfig,
    ) -> Result<Self, AppServicesError> {
        let mut storage = Storage::sqlite(db_url).await?;
        tracing::info!(store = %remote.base_url(), "using hosted pathway store");

        let store = RemoteStore::new(remote);
        let levels: Arc<dyn LevelRepository> = Arc::new(store.clone());
        let completions: Arc<dyn CompletionRepository> = Arc::new(store);
        storage.levels = levels;
        storage.completions = completions;
        Ok(Self::from_storage(&storage))
    }

    /// Pick the hosted store when `PATHWAY_STORE_URL` is set.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the environment is misconfigured or the
    /// local database cannot be opened.
    pub async fn from_env(db_url: &str) -> Result<Self, AppServicesError> {
        match RemoteConfig::from_env()? {
            Some(remote) => Self::new_sqlite_with_remote(db_url, remote).await,
            None => Self::new_sqlite(db_url).await,
        }
    }

    #[must_use]
    pub fn pathway(&self) -> Arc<PathwayService> {
        Arc::clone(&self.pathway)
    }

    #[must_use]
    pub fn sessions(&self) -> Arc<SessionService> {
        Arc::clone(&self.sessions)
    }
}
