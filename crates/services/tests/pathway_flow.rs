use pathway_core::model::{
    CompletionRecord, CurrentUser, LevelId, NavigationIntent, Role, StudentId, ViewMode,
};
use services::{AppServices, CancellationToken, PathwayLoad, SignIn};
use storage::repository::Storage;
use storage::seed::{SeedPlan, seed_sqlite};
use storage::sqlite::SqliteRepository;

async fn seeded_services(name: &str, completions: &[(u32, u32)]) -> AppServices {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect sqlite");
    repo.migrate().await.expect("migrate");

    let student = StudentId::new("stu-42").expect("student id");
    let mut plan = SeedPlan::with_default_levels();
    plan.completions = completions
        .iter()
        .map(|(level, points)| {
            (
                student.clone(),
                CompletionRecord::new(LevelId::new(*level), *points),
            )
        })
        .collect();
    seed_sqlite(&repo, &plan).await.expect("seed");

    AppServices::from_storage(&Storage::from_sqlite(repo))
}

#[tokio::test]
async fn signed_in_student_sees_reconciled_progress() {
    let services = seeded_services("memdb_pathway_flow_student", &[(1, 100), (3, 80)]).await;
    services
        .sessions()
        .sign_in(&SignIn {
            role: Role::Student,
            user: CurrentUser::with_id("1"),
            student_id: StudentId::new("stu-42"),
        })
        .await
        .expect("sign in");

    let session = services.sessions().current().await.expect("session");
    let load = services
        .pathway()
        .load(&session, &CancellationToken::new())
        .await
        .expect("load");

    let PathwayLoad::Ready(view) = load else {
        panic!("expected a rendered pathway, got {load:?}");
    };
    assert_eq!(view.mode, ViewMode::Reconciled);
    assert_eq!(view.levels.len(), 10);
    assert_eq!(view.aggregate.completed_count, 2);
    assert_eq!(view.aggregate.total_points, 180);
    assert_eq!(view.aggregate.rounded_percentage(), 20);

    let third = view.level(LevelId::new(3)).expect("level 3");
    assert!(third.is_completed);
    assert_eq!(third.user_points, 80);
    assert!(!view.level(LevelId::new(2)).expect("level 2").is_completed);
}

#[tokio::test]
async fn signing_out_returns_to_open_view() {
    let services = seeded_services("memdb_pathway_flow_signout", &[(1, 100)]).await;
    let sessions = services.sessions();
    sessions
        .sign_in(&SignIn {
            role: Role::Student,
            user: CurrentUser::with_id("stu-42"),
            student_id: None,
        })
        .await
        .expect("sign in");
    sessions.sign_out().await.expect("sign out");

    let session = sessions.current().await.expect("session");
    let load = services
        .pathway()
        .load(&session, &CancellationToken::new())
        .await
        .expect("load");

    let PathwayLoad::Ready(view) = load else {
        panic!("expected a rendered pathway, got {load:?}");
    };
    assert_eq!(view.mode, ViewMode::Open);
    assert!(view.levels.iter().all(|level| !level.is_locked));
}

#[tokio::test]
async fn student_role_without_login_redirects() {
    let services = seeded_services("memdb_pathway_flow_redirect", &[]).await;
    let session = services
        .sessions()
        .current()
        .await
        .expect("session")
        .with_role(Some(Role::Student));

    let load = services
        .pathway()
        .load(&session, &CancellationToken::new())
        .await
        .expect("load");
    assert_eq!(load, PathwayLoad::Redirect(NavigationIntent::Login));
}
