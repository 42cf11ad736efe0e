use pathway_core::model::{AggregateProgress, LevelId, LevelViewState, PathwayView, ViewMode};

pub const LATE_COMPLETION_NOTICE: &str =
    "Levels completed in a week after their scheduled week count for half points.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardStatus {
    Locked,
    Completed,
    Active,
    /// Any card in the open (non-student) grid.
    Open,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelCardVm {
    pub id: LevelId,
    pub title: String,
    pub description: String,
    pub week_label: String,
    pub points_label: String,
    pub status: CardStatus,
    /// Server lock flag; a completed card can still be locked.
    pub locked: bool,
}

impl LevelCardVm {
    fn from_state(level: &LevelViewState, mode: ViewMode) -> Self {
        let status = match mode {
            ViewMode::Open => CardStatus::Open,
            ViewMode::Reconciled | ViewMode::Fallback if level.is_completed => {
                CardStatus::Completed
            }
            ViewMode::Reconciled | ViewMode::Fallback if level.is_locked => CardStatus::Locked,
            ViewMode::Reconciled | ViewMode::Fallback => CardStatus::Active,
        };

        Self {
            id: level.id,
            title: level.title.clone(),
            description: level.description.clone(),
            week_label: format!("Week {}", level.week),
            points_label: format!("{} pts", level.user_points),
            status,
            locked: mode != ViewMode::Open && level.is_locked,
        }
    }

    /// Locked cards hide title and description, completed or not.
    #[must_use]
    pub fn shows_details(&self) -> bool {
        !self.locked
    }

    #[must_use]
    pub fn links_to_level(&self) -> bool {
        matches!(self.status, CardStatus::Active | CardStatus::Open)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressHeaderVm {
    pub percentage: u32,
    pub percentage_label: String,
    pub total_points: u64,
    pub completed_label: String,
}

impl From<&AggregateProgress> for ProgressHeaderVm {
    fn from(aggregate: &AggregateProgress) -> Self {
        let percentage = aggregate.rounded_percentage();
        Self {
            percentage,
            percentage_label: format!("{percentage}% complete"),
            total_points: aggregate.total_points,
            completed_label: format!(
                "{} of {} levels",
                aggregate.completed_count, aggregate.level_count
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathwayVm {
    /// `None` for the open grid, which has no student progress.
    pub header: Option<ProgressHeaderVm>,
    pub cards: Vec<LevelCardVm>,
    pub degraded: bool,
}

#[must_use]
pub fn map_pathway(view: &PathwayView) -> PathwayVm {
    let cards = view
        .levels
        .iter()
        .map(|level| LevelCardVm::from_state(level, view.mode))
        .collect();

    PathwayVm {
        header: view
            .is_student_view()
            .then(|| ProgressHeaderVm::from(&view.aggregate)),
        cards,
        degraded: view.mode == ViewMode::Fallback,
    }
}
