use std::sync::Arc;

use pathway_core::model::{
    CurrentUser, LevelId, RawSession, Role, SessionContext, StudentId, UnlockSet,
};
use storage::repository::{SessionKey, SessionStore};

use crate::error::SessionServiceError;

/// Values written by the login flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignIn {
    pub role: Role,
    pub user: CurrentUser,
    pub student_id: Option<StudentId>,
}

/// Owns the persisted session values and turns them into a `SessionContext`.
///
/// Values are populated on sign-in and cleared on sign-out; loads only ever
/// see the context built by `current`.
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn SessionStore>,
}

impl SessionService {
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Snapshot the stored session.
    ///
    /// Malformed values do not fail here; the context keeps them so the load
    /// can degrade.
    ///
    /// # Errors
    ///
    /// Returns `SessionServiceError::Storage` if the store cannot be read.
    pub async fn current(&self) -> Result<SessionContext, SessionServiceError> {
        let raw = RawSession {
            logged_in: self.store.get_value(SessionKey::LoggedIn).await?,
            role: self.store.get_value(SessionKey::UserRole).await?,
            unlocked_levels: self.store.get_value(SessionKey::UnlockedLevels).await?,
            current_user: self.store.get_value(SessionKey::CurrentUser).await?,
            student_id: self.store.get_value(SessionKey::StudentId).await?,
        };
        Ok(SessionContext::from_raw(&raw))
    }

    /// Persist a new login. An existing unlock list is kept.
    ///
    /// # Errors
    ///
    /// Returns `SessionServiceError` if encoding or any write fails.
    pub async fn sign_in(&self, sign_in: &SignIn) -> Result<(), SessionServiceError> {
        let user = serde_json::to_string(&sign_in.user)?;

        self.store.set_value(SessionKey::LoggedIn, "true").await?;
        self.store
            .set_value(SessionKey::UserRole, sign_in.role.as_str())
            .await?;
        self.store.set_value(SessionKey::CurrentUser, &user).await?;
        match &sign_in.student_id {
            Some(id) => self.store.set_value(SessionKey::StudentId, id.as_str()).await?,
            None => self.store.remove_value(SessionKey::StudentId).await?,
        }
        if self
            .store
            .get_value(SessionKey::UnlockedLevels)
            .await?
            .is_none()
        {
            self.record_unlocked(&UnlockSet::default()).await?;
        }

        tracing::info!(role = %sign_in.role, "session signed in");
        Ok(())
    }

    /// Clear every session value.
    ///
    /// # Errors
    ///
    /// Returns `SessionServiceError::Storage` if a value cannot be removed.
    pub async fn sign_out(&self) -> Result<(), SessionServiceError> {
        for key in SessionKey::ALL {
            self.store.remove_value(key).await?;
        }
        tracing::info!("session signed out");
        Ok(())
    }

    /// Persist the advisory unlock list.
    ///
    /// # Errors
    ///
    /// Returns `SessionServiceError::Storage` if the write fails.
    pub async fn record_unlocked(&self, unlocked: &UnlockSet) -> Result<(), SessionServiceError> {
        self.store
            .set_value(SessionKey::UnlockedLevels, &unlocked.to_json())
            .await?;
        Ok(())
    }

    /// Add one level to the stored unlock list and return the new list.
    ///
    /// # Errors
    ///
    /// Returns `SessionServiceError::Storage` if the list cannot be read or written.
    pub async fn unlock_level(&self, level: LevelId) -> Result<UnlockSet, SessionServiceError> {
        let current = self.current().await?;
        let unlocked =
            UnlockSet::from_levels(current.unlocked().iter().chain(std::iter::once(level)));
        self.record_unlocked(&unlocked).await?;
        tracing::debug!(%level, "level unlocked");
        Ok(unlocked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pathway_core::model::AccessMode;
    use storage::repository::InMemoryRepository;

    fn service() -> (SessionService, InMemoryRepository) {
        let repo = InMemoryRepository::new();
        (SessionService::new(Arc::new(repo.clone())), repo)
    }

    #[tokio::test]
    async fn empty_store_is_anonymous() {
        let (service, _) = service();
        let ctx = service.current().await.unwrap();
        assert_eq!(ctx, SessionContext::anonymous());
        assert_eq!(ctx.access_mode(), AccessMode::Open);
    }

    #[tokio::test]
    async fn sign_in_populates_student_context() {
        let (service, _) = service();
        service
            .sign_in(&SignIn {
                role: Role::Student,
                user: CurrentUser::with_account_number("AC-9"),
                student_id: None,
            })
            .await
            .unwrap();

        let ctx = service.current().await.unwrap();
        assert_eq!(ctx.access_mode(), AccessMode::Student);
        assert_eq!(ctx.resolve_student().unwrap().as_str(), "AC-9");
        assert!(ctx.unlocked().contains(LevelId::new(1)));
    }

    #[tokio::test]
    async fn unlock_level_extends_stored_list() {
        let (service, repo) = service();
        let unlocked = service.unlock_level(LevelId::new(3)).await.unwrap();
        assert_eq!(unlocked, UnlockSet::from_levels([LevelId::new(1), LevelId::new(3)]));

        service.unlock_level(LevelId::new(3)).await.unwrap();
        assert_eq!(
            repo.get_value(SessionKey::UnlockedLevels).await.unwrap().as_deref(),
            Some("[1,3]")
        );
    }

    #[tokio::test]
    async fn sign_in_keeps_existing_unlocks() {
        let (service, _) = service();
        service.unlock_level(LevelId::new(2)).await.unwrap();
        service
            .sign_in(&SignIn {
                role: Role::Student,
                user: CurrentUser::with_id("1"),
                student_id: StudentId::new("S-1"),
            })
            .await
            .unwrap();

        let ctx = service.current().await.unwrap();
        assert!(ctx.unlocked().contains(LevelId::new(2)));
        assert_eq!(ctx.resolve_student().unwrap().as_str(), "S-1");
    }

    #[tokio::test]
    async fn sign_out_clears_every_key() {
        let (service, repo) = service();
        service
            .sign_in(&SignIn {
                role: Role::Other("admin".into()),
                user: CurrentUser::with_id("1"),
                student_id: StudentId::new("S-1"),
            })
            .await
            .unwrap();
        service.sign_out().await.unwrap();

        for key in SessionKey::ALL {
            assert!(repo.get_value(key).await.unwrap().is_none(), "{key} left behind");
        }
    }

    #[tokio::test]
    async fn malformed_user_survives_snapshot() {
        let (service, repo) = service();
        repo.set_value(SessionKey::LoggedIn, "true").await.unwrap();
        repo.set_value(SessionKey::UserRole, "student").await.unwrap();
        repo.set_value(SessionKey::CurrentUser, "{broken").await.unwrap();

        let ctx = service.current().await.unwrap();
        assert_eq!(ctx.access_mode(), AccessMode::Student);
        assert!(ctx.resolve_student().is_err());
    }
}
