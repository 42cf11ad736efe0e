mod level;
mod login;
mod pathways;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use level::LevelView;
pub use login::LoginView;
pub use pathways::PathwaysView;
pub use state::{ViewError, ViewState, view_state_from_resource};
