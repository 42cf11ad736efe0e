use crate::model::ids::LevelId;
use crate::model::level::LevelDefinition;

/// Display state for one level, recomputed on every load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelViewState {
    pub id: LevelId,
    pub title: String,
    pub description: String,
    pub week: u32,
    pub base_points: u32,
    pub is_locked: bool,
    pub is_completed: bool,
    /// Points shown on the card: awarded points when completed, otherwise
    /// the base value (zero in open and fallback views).
    pub user_points: u32,
}

impl LevelViewState {
    pub(crate) fn from_definition(
        level: &LevelDefinition,
        is_locked: bool,
        is_completed: bool,
        user_points: u32,
    ) -> Self {
        Self {
            id: level.id(),
            title: level.title().to_owned(),
            description: level.description().to_owned(),
            week: level.week(),
            base_points: level.base_points(),
            is_locked,
            is_completed,
            user_points,
        }
    }
}

/// Aggregated progress over a pathway.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AggregateProgress {
    pub total_points: u64,
    pub completed_count: usize,
    pub level_count: usize,
    /// Always within `0.0..=100.0`.
    pub percentage: f64,
}

impl AggregateProgress {
    /// Percentage rounded to the nearest whole number, half up.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn rounded_percentage(&self) -> u32 {
        (self.percentage + 0.5).floor().clamp(0.0, 100.0) as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Non-student view: all levels open, nothing completed.
    Open,
    /// Student view merged from completion records.
    Reconciled,
    /// Student view after completion data could not be fetched.
    Fallback,
}

/// A pathway ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct PathwayView {
    pub mode: ViewMode,
    pub levels: Vec<LevelViewState>,
    pub aggregate: AggregateProgress,
}

impl PathwayView {
    #[must_use]
    pub fn is_student_view(&self) -> bool {
        !matches!(self.mode, ViewMode::Open)
    }

    #[must_use]
    pub fn level(&self, id: LevelId) -> Option<&LevelViewState> {
        self.levels.iter().find(|level| level.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounded_percentage_rounds_half_up() {
        let progress = |percentage| AggregateProgress {
            percentage,
            ..AggregateProgress::default()
        };
        assert_eq!(progress(0.0).rounded_percentage(), 0);
        assert_eq!(progress(33.333).rounded_percentage(), 33);
        assert_eq!(progress(66.666).rounded_percentage(), 67);
        assert_eq!(progress(12.5).rounded_percentage(), 13);
        assert_eq!(progress(100.0).rounded_percentage(), 100);
    }
}
