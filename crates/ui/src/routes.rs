use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};
use pathway_core::model::NavigationIntent;

use crate::views::{LevelView, LoginView, PathwaysView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", PathwaysView)] Pathways {},
        #[route("/pathways/level/:level_id", LevelView)] Level { level_id: u32 },
        #[route("/login", LoginView)] Login {},
}

impl From<NavigationIntent> for Route {
    fn from(intent: NavigationIntent) -> Self {
        match intent {
            NavigationIntent::Login => Self::Login {},
            NavigationIntent::Level(id) => Self::Level {
                level_id: id.value(),
            },
        }
    }
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            Sidebar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Sidebar() -> Element {
    rsx! {
        nav { class: "sidebar",
            h1 { "Pathway" }
            ul {
                li { Link { to: Route::Pathways {}, "Levels" } }
                li { Link { to: Route::Login {}, "Sign in" } }
            }
        }
    }
}
