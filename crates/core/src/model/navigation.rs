use crate::model::ids::LevelId;

/// Where the pathway screen asks the router to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationIntent {
    Login,
    Level(LevelId),
}

impl NavigationIntent {
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::Level(id) => format!("/pathways/level/{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths() {
        assert_eq!(NavigationIntent::Login.path(), "/login");
        assert_eq!(
            NavigationIntent::Level(LevelId::new(4)).path(),
            "/pathways/level/4"
        );
    }
}
