use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::LevelId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LevelError {
    #[error("level title cannot be empty")]
    EmptyTitle,

    #[error("level week must be >= 1")]
    InvalidWeek,
}

//
// ─── LEVEL ─────────────────────────────────────────────────────────────────────
//

/// A level on the learning pathway, as defined by an administrator.
///
/// Read-only to the progress screen. `admin_locked` is the server-side lock
/// flag and is authoritative for the lock state of a reconciled level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDefinition {
    id: LevelId,
    title: String,
    description: String,
    week: u32,
    base_points: u32,
    admin_locked: bool,
}

impl LevelDefinition {
    /// Creates a validated level definition.
    ///
    /// # Errors
    ///
    /// Returns `LevelError::EmptyTitle` if the title is blank.
    /// Returns `LevelError::InvalidWeek` if `week` is zero.
    pub fn new(
        id: LevelId,
        title: impl Into<String>,
        description: impl Into<String>,
        week: u32,
        base_points: u32,
        admin_locked: bool,
    ) -> Result<Self, LevelError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(LevelError::EmptyTitle);
        }
        if week == 0 {
            return Err(LevelError::InvalidWeek);
        }

        Ok(Self {
            id,
            title,
            description: description.into(),
            week,
            base_points,
            admin_locked,
        })
    }

    #[must_use]
    pub fn id(&self) -> LevelId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn week(&self) -> u32 {
        self.week
    }

    #[must_use]
    pub fn base_points(&self) -> u32 {
        self.base_points
    }

    #[must_use]
    pub fn admin_locked(&self) -> bool {
        self.admin_locked
    }
}
