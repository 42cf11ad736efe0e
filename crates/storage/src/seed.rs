use pathway_core::model::{CompletionRecord, LevelDefinition, LevelId, StudentId};

use crate::repository::StorageError;
use crate::sqlite::SqliteRepository;

const DEFAULT_TITLES: [(&str, &str); 10] = [
    ("Foundations", "Getting started with the pathway"),
    ("First Steps", "Core vocabulary and habits"),
    ("Building Blocks", "Combining the basics"),
    ("Practice Week", "Consolidate what you learned"),
    ("Deeper Dive", "Working through longer material"),
    ("Checkpoint", "Mid-pathway review"),
    ("Application", "Using skills in context"),
    ("Challenge", "Harder exercises"),
    ("Mastery", "Polish and refine"),
    ("Capstone", "Final project"),
];

pub const DEFAULT_LEVEL_POINTS: u32 = 100;

/// Ten sequential levels, one per week, each worth the default points.
#[must_use]
pub fn default_levels() -> Vec<LevelDefinition> {
    DEFAULT_TITLES
        .iter()
        .zip(1_u32..)
        .filter_map(|((title, description), n)| {
            LevelDefinition::new(
                LevelId::new(n),
                *title,
                *description,
                n,
                DEFAULT_LEVEL_POINTS,
                false,
            )
            .ok()
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct SeedPlan {
    pub levels: Vec<LevelDefinition>,
    pub completions: Vec<(StudentId, CompletionRecord)>,
}

impl SeedPlan {
    #[must_use]
    pub fn with_default_levels() -> Self {
        Self {
            levels: default_levels(),
            completions: Vec::new(),
        }
    }
}

/// Write a seed plan. Existing levels are updated in place.
///
/// # Errors
///
/// Returns `StorageError` if any write fails.
pub async fn seed_sqlite(repo: &SqliteRepository, plan: &SeedPlan) -> Result<(), StorageError> {
    for level in &plan.levels {
        repo.upsert_level(level).await?;
    }
    for (student, record) in &plan.completions {
        repo.record_completion(student, *record).await?;
    }
    tracing::info!(
        levels = plan.levels.len(),
        completions = plan.completions.len(),
        "seeded pathway"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_levels_are_sequential_weeks() {
        let levels = default_levels();
        assert_eq!(levels.len(), 10);
        for (index, level) in levels.iter().enumerate() {
            let n = u32::try_from(index).unwrap() + 1;
            assert_eq!(level.id(), LevelId::new(n));
            assert_eq!(level.week(), n);
            assert_eq!(level.base_points(), DEFAULT_LEVEL_POINTS);
            assert!(!level.admin_locked());
        }
    }
}
