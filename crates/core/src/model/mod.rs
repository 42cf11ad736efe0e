mod completion;
mod ids;
mod level;
mod navigation;
mod session;
mod view;

pub use ids::{LevelId, ParseIdError, StudentId};

pub use completion::CompletionRecord;
pub use level::{LevelDefinition, LevelError};
pub use navigation::NavigationIntent;
pub use session::{
    AccessMode, CurrentUser, CurrentUserEntry, IdentityValue, RawSession, Role, SessionContext,
    SessionResolutionError, UnlockSet,
};
pub use view::{AggregateProgress, LevelViewState, PathwayView, ViewMode};
