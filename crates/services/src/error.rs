//! Shared error types for the services crate.

use thiserror::Error;

use storage::remote::RemoteConfigError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `PathwayService`.
///
/// Completion lookups never surface here: they degrade to the fallback view.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PathwayServiceError {
    #[error("level definitions unavailable: {0}")]
    Levels(#[source] StorageError),
    #[error("pathway load cancelled")]
    Cancelled,
}

/// Errors emitted by `SessionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("could not encode session value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    RemoteConfig(#[from] RemoteConfigError),
}
