//! Merges level definitions and completion records into display state.
//!
//! Everything here is pure. Fetching, session handling and cancellation live
//! in the services crate; these functions only see the data once it arrived.

use std::collections::HashMap;

use crate::model::{
    AggregateProgress, CompletionRecord, LevelDefinition, LevelId, LevelViewState, PathwayView,
    ViewMode,
};

/// Map each completed level to its awarded points. Later duplicates win.
#[must_use]
pub fn completion_map(records: &[CompletionRecord]) -> HashMap<LevelId, u32> {
    records
        .iter()
        .map(|record| (record.level_id, record.points))
        .collect()
}

/// Merge a student's completions into the ordered level list.
///
/// Input order is preserved. Lock state comes from the administrator flag on
/// each definition; completed levels show their awarded points and all other
/// levels their base points.
#[must_use]
pub fn reconcile(levels: &[LevelDefinition], completions: &[CompletionRecord]) -> PathwayView {
    let completed = completion_map(completions);

    let views: Vec<LevelViewState> = levels
        .iter()
        .map(|level| {
            let awarded = completed.get(&level.id()).copied();
            LevelViewState::from_definition(
                level,
                level.admin_locked(),
                awarded.is_some(),
                awarded.unwrap_or(level.base_points()),
            )
        })
        .collect();

    let aggregate = aggregate(&views);
    PathwayView {
        mode: ViewMode::Reconciled,
        levels: views,
        aggregate,
    }
}

/// Degraded student view used when completions cannot be fetched: only the
/// first level is open, nothing is completed and every total is zero.
#[must_use]
pub fn fallback(levels: &[LevelDefinition]) -> PathwayView {
    let views: Vec<LevelViewState> = levels
        .iter()
        .enumerate()
        .map(|(index, level)| LevelViewState::from_definition(level, index != 0, false, 0))
        .collect();

    PathwayView {
        mode: ViewMode::Fallback,
        aggregate: AggregateProgress {
            level_count: views.len(),
            ..AggregateProgress::default()
        },
        levels: views,
    }
}

/// Non-student view: every level open, nothing completed, zero points.
#[must_use]
pub fn open_levels(levels: &[LevelDefinition]) -> PathwayView {
    let views: Vec<LevelViewState> = levels
        .iter()
        .map(|level| LevelViewState::from_definition(level, false, false, 0))
        .collect();

    PathwayView {
        mode: ViewMode::Open,
        aggregate: AggregateProgress {
            level_count: views.len(),
            ..AggregateProgress::default()
        },
        levels: views,
    }
}

/// Totals over completed levels only.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn aggregate(levels: &[LevelViewState]) -> AggregateProgress {
    let (completed_count, total_points) = levels
        .iter()
        .filter(|level| level.is_completed)
        .fold((0_usize, 0_u64), |(count, total), level| {
            (count + 1, total + u64::from(level.user_points))
        });

    let level_count = levels.len();
    let percentage = if level_count > 0 {
        completed_count as f64 / level_count as f64 * 100.0
    } else {
        0.0
    };

    AggregateProgress {
        total_points,
        completed_count,
        level_count,
        percentage,
    }
}
