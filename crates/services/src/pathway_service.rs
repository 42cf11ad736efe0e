use std::future::Future;
use std::sync::Arc;

use pathway_core::model::{
    AccessMode, LevelDefinition, LevelId, NavigationIntent, PathwayView, SessionContext, UnlockSet,
};
use pathway_core::reconcile::{fallback, open_levels, reconcile};
use storage::repository::{CompletionRepository, LevelRepository};
use tokio_util::sync::CancellationToken;

use crate::error::PathwayServiceError;

/// Outcome of one pathway load.
#[derive(Debug, Clone, PartialEq)]
pub enum PathwayLoad {
    /// A view to render: open, reconciled or fallback.
    Ready(PathwayView),
    /// The session cannot show student data; send the user elsewhere.
    Redirect(NavigationIntent),
}

/// Loads level definitions and, for students, their completions.
///
/// Each load fetches levels first, then decides the view mode from the
/// session, and only then queries completions. Both fetches stop early when
/// the caller's token is cancelled.
#[derive(Clone)]
pub struct PathwayService {
    levels: Arc<dyn LevelRepository>,
    completions: Arc<dyn CompletionRepository>,
}

impl PathwayService {
    #[must_use]
    pub fn new(
        levels: Arc<dyn LevelRepository>,
        completions: Arc<dyn CompletionRepository>,
    ) -> Self {
        Self {
            levels,
            completions,
        }
    }

    /// Run a full load for the given session.
    ///
    /// # Errors
    ///
    /// Returns `PathwayServiceError::Levels` if level definitions cannot be
    /// fetched, and `PathwayServiceError::Cancelled` if `cancel` fires first.
    pub async fn load(
        &self,
        session: &SessionContext,
        cancel: &CancellationToken,
    ) -> Result<PathwayLoad, PathwayServiceError> {
        let levels = until_cancelled(cancel, self.levels.list_levels())
            .await?
            .map_err(PathwayServiceError::Levels)?;

        match session.access_mode() {
            AccessMode::Open => {
                tracing::debug!(levels = levels.len(), "rendering open pathway");
                Ok(PathwayLoad::Ready(open_levels(&levels)))
            }
            AccessMode::LoginRequired => {
                tracing::info!("student session is not logged in, redirecting to login");
                Ok(PathwayLoad::Redirect(NavigationIntent::Login))
            }
            AccessMode::Student => self.reconcile_student(&levels, session, cancel).await,
        }
    }

    /// Merge a student's completions into already-fetched levels.
    ///
    /// A missing user record redirects to login. Any other identity problem
    /// or a failed completion query yields the fallback view.
    ///
    /// # Errors
    ///
    /// Returns `PathwayServiceError::Cancelled` if `cancel` fires while the
    /// completion query is outstanding.
    pub async fn reconcile_student(
        &self,
        levels: &[LevelDefinition],
        session: &SessionContext,
        cancel: &CancellationToken,
    ) -> Result<PathwayLoad, PathwayServiceError> {
        let student = match session.resolve_student() {
            Ok(student) => student,
            Err(err) if err.requires_login() => {
                tracing::info!(error = %err, "no student identity, redirecting to login");
                return Ok(PathwayLoad::Redirect(NavigationIntent::Login));
            }
            Err(err) => {
                tracing::warn!(error = %err, "unresolvable student identity, using fallback view");
                return Ok(PathwayLoad::Ready(fallback(levels)));
            }
        };

        match until_cancelled(cancel, self.completions.list_completions(&student)).await? {
            Ok(records) => {
                log_unlock_drift(session.unlocked(), levels);
                tracing::debug!(
                    student = %student,
                    completions = records.len(),
                    "reconciled pathway"
                );
                Ok(PathwayLoad::Ready(reconcile(levels, &records)))
            }
            Err(err) => {
                tracing::warn!(
                    student = %student,
                    error = %err,
                    "completion query failed, using fallback view"
                );
                Ok(PathwayLoad::Ready(fallback(levels)))
            }
        }
    }

    /// Fetch a single level for the detail route.
    ///
    /// Returns `Ok(None)` when the level does not exist.
    ///
    /// # Errors
    ///
    /// Returns `PathwayServiceError::Levels` if the query fails.
    pub async fn level(&self, id: LevelId) -> Result<Option<LevelDefinition>, PathwayServiceError> {
        self.levels
            .get_level(id)
            .await
            .map_err(PathwayServiceError::Levels)
    }
}

async fn until_cancelled<T>(
    cancel: &CancellationToken,
    work: impl Future<Output = T>,
) -> Result<T, PathwayServiceError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => {
            tracing::debug!("pathway load cancelled");
            Err(PathwayServiceError::Cancelled)
        }
        out = work => Ok(out),
    }
}

// The cached unlock list never decides lock state; it is only compared here.
fn log_unlock_drift(unlocked: &UnlockSet, levels: &[LevelDefinition]) {
    let drift = levels
        .iter()
        .filter(|level| unlocked.contains(level.id()) == level.admin_locked())
        .count();
    if drift > 0 {
        tracing::debug!(drift, "cached unlock list disagrees with server lock flags");
    }
}
