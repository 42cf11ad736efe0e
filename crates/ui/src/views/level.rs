use dioxus::prelude::*;
use dioxus_router::Link;
use pathway_core::model::LevelId;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};

#[derive(Clone, Debug, PartialEq, Eq)]
struct LevelDetail {
    title: String,
    description: String,
    week_label: String,
    points_label: String,
}

#[component]
pub fn LevelView(level_id: u32) -> Element {
    let ctx = use_context::<AppContext>();
    let pathway = ctx.pathway_service();

    let resource = use_resource(use_reactive((&level_id,), move |(level_id,)| {
        let pathway = pathway.clone();
        async move {
            let level = pathway
                .level(LevelId::new(level_id))
                .await
                .map_err(|err| {
                    tracing::warn!(level_id, error = %err, "level lookup failed");
                    ViewError::LevelsUnavailable
                })?
                .ok_or(ViewError::NotFound)?;
            Ok(LevelDetail {
                title: level.title().to_string(),
                description: level.description().to_string(),
                week_label: format!("Week {}", level.week()),
                points_label: format!("{} pts", level.base_points()),
            })
        }
    }));

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page level",
            Link { class: "back", to: Route::Pathways {}, "Back to levels" }
            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { class: "loading", "Loading level..." }
                },
                ViewState::Ready(detail) => rsx! {
                    h2 { "Level {level_id}: {detail.title}" }
                    p { class: "week", "{detail.week_label}" }
                    p { class: "description", "{detail.description}" }
                    p { class: "points", "{detail.points_label}" }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "error", "{err.message()}" }
                },
            }
        }
    }
}
