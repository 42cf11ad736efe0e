use std::sync::Arc;

use async_trait::async_trait;
use pathway_core::model::{
    CompletionRecord, CurrentUser, LevelDefinition, LevelId, Role, StudentId,
};
use services::SignIn;
use storage::repository::{
    CompletionRepository, LevelRepository, SessionKey, SessionStore, Storage, StorageError,
};

use super::test_harness::{
    ViewKind, record, seeded_repo, setup_view_harness, setup_view_harness_with_storage,
};
use crate::vm::LATE_COMPLETION_NOTICE;

struct FailingCompletions;

#[async_trait]
impl CompletionRepository for FailingCompletions {
    async fn list_completions(
        &self,
        _student: &StudentId,
    ) -> Result<Vec<CompletionRecord>, StorageError> {
        Err(StorageError::Connection("offline".to_string()))
    }
}

struct FailingLevels;

#[async_trait]
impl LevelRepository for FailingLevels {
    async fn list_levels(&self) -> Result<Vec<LevelDefinition>, StorageError> {
        Err(StorageError::Remote { status: 500 })
    }

    async fn get_level(&self, _id: LevelId) -> Result<Option<LevelDefinition>, StorageError> {
        Err(StorageError::Remote { status: 500 })
    }
}

fn student_sign_in() -> SignIn {
    SignIn {
        role: Role::Student,
        user: CurrentUser::with_id("stu-1"),
        student_id: None,
    }
}

#[tokio::test(flavor = "current_thread")]
async fn pathways_view_renders_open_grid_for_anonymous_session() {
    let repo = seeded_repo(3);
    record(&repo, "stu-1", 1, 100);
    let mut harness = setup_view_harness(ViewKind::Pathways, &repo);

    harness.settle().await;
    let html = harness.render();

    assert!(html.contains("Pathway (admin view)"), "missing admin heading in {html}");
    assert_eq!(html.matches("Enter level").count(), 3, "expected 3 open cards in {html}");
    assert!(html.contains("Level title 2"), "missing level title in {html}");
    assert!(!html.contains("Completed"), "open grid marks completion in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn pathways_view_renders_student_progress() {
    let repo = seeded_repo(10);
    record(&repo, "stu-1", 3, 80);
    record(&repo, "stu-1", 1, 100);
    let mut harness = setup_view_harness(ViewKind::Pathways, &repo);
    harness
        .app
        .sessions()
        .sign_in(&student_sign_in())
        .await
        .expect("sign in");

    harness.settle().await;
    let html = harness.render();

    assert!(html.contains("20% complete"), "missing percentage in {html}");
    assert!(html.contains("180"), "missing total points in {html}");
    assert!(html.contains("2 of 10 levels"), "missing completed count in {html}");
    assert!(html.contains(LATE_COMPLETION_NOTICE), "missing notice in {html}");
    assert_eq!(html.matches("Completed").count(), 2, "expected 2 completed cards in {html}");
    assert_eq!(html.matches("Start").count(), 8, "expected 8 active cards in {html}");
    assert!(html.contains("80 pts"), "missing awarded points in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn pathways_view_hides_details_of_completed_locked_level() {
    let repo = seeded_repo(2);
    repo.upsert_level(
        LevelDefinition::new(LevelId::new(3), "Hidden capstone", "Secret", 3, 100, true)
            .expect("valid level"),
    )
    .expect("upsert level");
    record(&repo, "stu-1", 3, 90);
    let mut harness = setup_view_harness(ViewKind::Pathways, &repo);
    harness
        .app
        .sessions()
        .sign_in(&student_sign_in())
        .await
        .expect("sign in");

    harness.settle().await;
    let html = harness.render();

    assert!(html.contains("✓"), "missing completed marker in {html}");
    assert!(html.contains("🔒"), "missing lock marker in {html}");
    assert!(!html.contains("Hidden capstone"), "locked title leaked in {html}");
    assert!(html.contains("Week 3"), "locked card should show its week in {html}");
    assert_eq!(html.matches("Start").count(), 2, "expected 2 active cards in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn pathways_view_falls_back_when_completions_fail() {
    let repo = seeded_repo(4);
    let mut storage = Storage::from_in_memory(&repo);
    storage.completions = Arc::new(FailingCompletions);
    let mut harness = setup_view_harness_with_storage(ViewKind::Pathways, &storage);
    harness
        .app
        .sessions()
        .sign_in(&student_sign_in())
        .await
        .expect("sign in");

    harness.settle().await;
    let html = harness.render();

    assert!(html.contains("Progress could not be loaded"), "missing warning in {html}");
    assert!(html.contains("0% complete"), "missing zero progress in {html}");
    assert_eq!(html.matches("Start").count(), 1, "expected only level 1 active in {html}");
    assert!(html.contains("Level title 1"), "first level should be visible in {html}");
    assert!(!html.contains("Level title 2"), "locked title should be hidden in {html}");
    assert!(html.contains("Week 2"), "locked card should show its week in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn pathways_view_sends_logged_out_student_to_sign_in() {
    let repo = seeded_repo(2);
    let storage = Storage::from_in_memory(&repo);
    storage
        .session
        .set_value(SessionKey::UserRole, "student")
        .await
        .expect("set role");
    let mut harness = setup_view_harness_with_storage(ViewKind::Pathways, &storage);

    harness.settle().await;
    let html = harness.render();

    assert!(html.contains("Sign in"), "missing sign-in prompt in {html}");
    assert!(!html.contains("Level title 1"), "levels leaked to logged-out student in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn pathways_view_reports_level_failure() {
    let repo = seeded_repo(2);
    let mut storage = Storage::from_in_memory(&repo);
    storage.levels = Arc::new(FailingLevels);
    let mut harness = setup_view_harness_with_storage(ViewKind::Pathways, &storage);

    harness.settle().await;
    let html = harness.render();

    assert!(html.contains("Levels could not be loaded"), "missing error in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn level_view_renders_definition() {
    let repo = seeded_repo(5);
    let mut harness = setup_view_harness(ViewKind::Level(4), &repo);

    harness.settle().await;
    let html = harness.render();

    assert!(html.contains("Level 4: Level title 4"), "missing heading in {html}");
    assert!(html.contains("Week 4"), "missing week in {html}");
    assert!(html.contains("100 pts"), "missing points in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn level_view_reports_unknown_level() {
    let repo = seeded_repo(2);
    let mut harness = setup_view_harness(ViewKind::Level(42), &repo);

    harness.settle().await;
    let html = harness.render();

    assert!(html.contains("This level does not exist."), "missing not-found text in {html}");
}
