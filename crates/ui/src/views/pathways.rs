use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use pathway_core::model::NavigationIntent;
use services::{CancellationToken, PathwayLoad, PathwayServiceError};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{
    CardStatus, LATE_COMPLETION_NOTICE, LevelCardVm, PathwayVm, ProgressHeaderVm, map_pathway,
};

#[derive(Clone, Debug, PartialEq)]
enum PathwayPage {
    Ready(PathwayVm),
    Redirect(NavigationIntent),
}

#[component]
pub fn PathwaysView() -> Element {
    let ctx = use_context::<AppContext>();
    let pathway = ctx.pathway_service();
    let sessions = ctx.session_service();

    let cancel = use_hook(CancellationToken::new);
    use_drop({
        let cancel = cancel.clone();
        move || cancel.cancel()
    });

    let resource = use_resource(move || {
        let pathway = pathway.clone();
        let sessions = sessions.clone();
        let cancel = cancel.clone();
        async move {
            let session = sessions.current().await.map_err(|err| {
                tracing::warn!(error = %err, "could not read session");
                ViewError::SessionUnavailable
            })?;
            match pathway.load(&session, &cancel).await {
                Ok(PathwayLoad::Ready(view)) => Ok(PathwayPage::Ready(map_pathway(&view))),
                Ok(PathwayLoad::Redirect(intent)) => Ok(PathwayPage::Redirect(intent)),
                Err(PathwayServiceError::Levels(err)) => {
                    tracing::warn!(error = %err, "level definitions unavailable");
                    Err(ViewError::LevelsUnavailable)
                }
                Err(_) => Err(ViewError::Unknown),
            }
        }
    });

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page pathways",
            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { class: "loading", "Loading levels..." }
                },
                ViewState::Ready(PathwayPage::Redirect(intent)) => rsx! {
                    RedirectNotice { intent }
                },
                ViewState::Ready(PathwayPage::Ready(vm)) => rsx! {
                    if let Some(header) = vm.header.clone() {
                        StudentHeader { header, degraded: vm.degraded }
                    } else {
                        h2 { "Pathway (admin view)" }
                        p { class: "subtitle", "All levels are open for staff." }
                    }
                    if vm.cards.is_empty() {
                        p { "No levels have been published yet." }
                    } else {
                        ul { class: "level-grid",
                            for card in vm.cards {
                                LevelCard { key: "{card.id}", card }
                            }
                        }
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "error", "{err.message()}" }
                },
            }
        }
    }
}

#[component]
fn StudentHeader(header: ProgressHeaderVm, degraded: bool) -> Element {
    rsx! {
        h2 { "Pathway" }
        p { class: "notice", "{LATE_COMPLETION_NOTICE}" }
        section { class: "progress",
            div { class: "progress-bar",
                progress { max: "100", value: "{header.percentage}" }
                p { "{header.percentage_label}" }
                p { class: "muted", "{header.completed_label}" }
            }
            div { class: "progress-points",
                strong { "{header.total_points}" }
                p { "Total points" }
            }
        }
        if degraded {
            p { class: "warning", "Progress could not be loaded. Showing the first level only." }
        }
    }
}

#[component]
fn LevelCard(card: LevelCardVm) -> Element {
    let class = match card.status {
        CardStatus::Completed => "level-card completed",
        CardStatus::Locked => "level-card locked",
        CardStatus::Active | CardStatus::Open => "level-card",
    };
    let level_id = card.id.value();
    let cta = if card.status == CardStatus::Open { "Enter level" } else { "Start" };

    rsx! {
        li { class: "{class}",
            if card.status == CardStatus::Completed {
                span { class: "marker", "✓" }
            }
            if card.locked {
                span { class: "marker", "🔒" }
            }
            div { class: "level-number", "{level_id}" }
            if card.shows_details() {
                h3 { "{card.title}" }
                p { class: "description", "{card.description}" }
            } else {
                p { class: "week", "{card.week_label}" }
            }
            if card.status == CardStatus::Open {
                p { class: "week", "{card.week_label}" }
            }
            footer {
                span { class: "points", "{card.points_label}" }
                if card.links_to_level() {
                    Link { class: "cta", to: Route::from(NavigationIntent::Level(card.id)), "{cta}" }
                } else if card.status == CardStatus::Completed {
                    button { disabled: true, "Completed" }
                }
            }
        }
    }
}

#[component]
fn RedirectNotice(intent: NavigationIntent) -> Element {
    let navigator = use_navigator();
    use_effect(move || {
        let _ = navigator.replace(Route::from(intent));
    });

    rsx! {
        p { "Sign in to see your progress." }
        Link { to: Route::from(intent), "Go to sign in" }
    }
}
