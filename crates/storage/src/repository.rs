use async_trait::async_trait;
use pathway_core::model::{CompletionRecord, LevelDefinition, LevelId, StudentId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("remote store responded with status {status}")]
    Remote { status: u16 },
}

/// Read contract for pathway level definitions.
#[async_trait]
pub trait LevelRepository: Send + Sync {
    /// All level definitions, ordered by level number ascending.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on transport or mapping failures.
    async fn list_levels(&self) -> Result<Vec<LevelDefinition>, StorageError>;

    /// Fetch a single level definition.
    ///
    /// Returns `Ok(None)` when the level does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on transport or mapping failures.
    async fn get_level(&self, id: LevelId) -> Result<Option<LevelDefinition>, StorageError>;
}

/// Read contract for per-student completion records.
#[async_trait]
pub trait CompletionRepository: Send + Sync {
    /// Completion rows for one student, zero or more.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on transport or mapping failures.
    async fn list_completions(
        &self,
        student: &StudentId,
    ) -> Result<Vec<CompletionRecord>, StorageError>;
}

/// Keys persisted by the session store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    LoggedIn,
    UserRole,
    UnlockedLevels,
    CurrentUser,
    StudentId,
}

impl SessionKey {
    pub const ALL: [SessionKey; 5] = [
        SessionKey::LoggedIn,
        SessionKey::UserRole,
        SessionKey::UnlockedLevels,
        SessionKey::CurrentUser,
        SessionKey::StudentId,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionKey::LoggedIn => "isLoggedIn",
            SessionKey::UserRole => "userRole",
            SessionKey::UnlockedLevels => "unlockedLevels",
            SessionKey::CurrentUser => "currentUser",
            SessionKey::StudentId => "studentId",
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted key/value session state.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn get_value(&self, key: SessionKey) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set_value(&self, key: SessionKey, value: &str) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be removed.
    async fn remove_value(&self, key: SessionKey) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    levels: Arc<Mutex<HashMap<LevelId, LevelDefinition>>>,
    completions: Arc<Mutex<HashMap<StudentId, Vec<CompletionRecord>>>>,
    session: Arc<Mutex<HashMap<SessionKey, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a level definition.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn upsert_level(&self, level: LevelDefinition) -> Result<(), StorageError> {
        let mut guard = self
            .levels
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(level.id(), level);
        Ok(())
    }

    /// Append a completion row for a student.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn record_completion(
        &self,
        student: &StudentId,
        record: CompletionRecord,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .completions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.entry(student.clone()).or_default().push(record);
        Ok(())
    }
}

#[async_trait]
impl LevelRepository for InMemoryRepository {
    async fn list_levels(&self) -> Result<Vec<LevelDefinition>, StorageError> {
        let guard = self
            .levels
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut levels: Vec<LevelDefinition> = guard.values().cloned().collect();
        levels.sort_by_key(LevelDefinition::id);
        Ok(levels)
    }

    async fn get_level(&self, id: LevelId) -> Result<Option<LevelDefinition>, StorageError> {
        let guard = self
            .levels
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&id).cloned())
    }
}

#[async_trait]
impl CompletionRepository for InMemoryRepository {
    async fn list_completions(
        &self,
        student: &StudentId,
    ) -> Result<Vec<CompletionRecord>, StorageError> {
        let guard = self
            .completions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(student).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl SessionStore for InMemoryRepository {
    async fn get_value(&self, key: SessionKey) -> Result<Option<String>, StorageError> {
        let guard = self
            .session
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&key).cloned())
    }

    async fn set_value(&self, key: SessionKey, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key, value.to_owned());
        Ok(())
    }

    async fn remove_value(&self, key: SessionKey) -> Result<(), StorageError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(&key);
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub levels: Arc<dyn LevelRepository>,
    pub completions: Arc<dyn CompletionRepository>,
    pub session: Arc<dyn SessionStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_in_memory(&InMemoryRepository::new())
    }

    /// Wrap an existing in-memory repository so callers can keep seeding it.
    #[must_use]
    pub fn from_in_memory(repo: &InMemoryRepository) -> Self {
        let levels: Arc<dyn LevelRepository> = Arc::new(repo.clone());
        let completions: Arc<dyn CompletionRepository> = Arc::new(repo.clone());
        let session: Arc<dyn SessionStore> = Arc::new(repo.clone());
        Self {
            levels,
            completions,
            session,
        }
    }
}
