use serde::{Deserialize, Serialize};

use crate::model::ids::LevelId;

/// Evidence that the current student finished a level.
///
/// Completion rows are always fetched for a single student, so the record
/// only carries the level and the points that were awarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub level_id: LevelId,
    pub points: u32,
}

impl CompletionRecord {
    #[must_use]
    pub const fn new(level_id: LevelId, points: u32) -> Self {
        Self { level_id, points }
    }
}
