use std::sync::Arc;

use chrono::Duration;
use quiz_core::model::{
    Choice, EditionId, QuestionNumber, SessionSummary, Subject, Verdict,
};
use quiz_core::time::fixed_now;
use storage::repository::{SessionSummaryRepository, SessionSummaryRow, StorageError};

use super::test_harness::{ViewKind, setup_view_harness, setup_view_harness_with_summary_repo};
use crate::vm::ViewerIntent;

fn kanka() -> Subject {
    Subject::new("kanka").unwrap()
}

fn choice(value: u8) -> Choice {
    Choice::new(value).unwrap()
}

#[tokio::test(flavor = "current_thread")]
async fn viewer_smoke_renders_catalog_picker() {
    let mut harness = setup_view_harness(ViewKind::Viewer);
    harness.rebuild();
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("第75回"), "missing edition label in {html}");
    assert!(html.contains("circulatory (5)"), "missing field option in {html}");
    assert!(html.contains("Pick an edition or a field"), "missing idle hint in {html}");
    assert!(html.contains("Score: 0"), "missing score in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn viewer_smoke_edition_answer_and_results() {
    let mut harness = setup_view_harness(ViewKind::Viewer);
    harness.rebuild();
    harness.settle().await;

    harness
        .dispatch(ViewerIntent::StartEdition {
            edition: EditionId::new(75),
            subject: kanka(),
        })
        .await;
    let html = harness.render();
    assert!(html.contains("Question 1 / 25"), "missing position in {html}");
    assert!(html.contains("edition 75 / kanka"), "missing session label in {html}");
    assert!(
        html.contains("memory:///pdf/75/75_kanka.pdf#page=2"),
        "missing page frame in {html}"
    );
    assert!(html.contains("jump-input"), "edition mode offers jump: {html}");

    harness.dispatch(ViewerIntent::Answer(choice(2))).await;
    let html = harness.render();
    assert!(html.contains("Q1: correct!"), "missing verdict in {html}");
    assert!(html.contains("Score: 1"), "missing score in {html}");

    // a second answer for the same question changes nothing
    harness.dispatch(ViewerIntent::Answer(choice(3))).await;
    let (score, verdict) = harness.with_controller(|ctl| {
        (
            ctl.state().score(),
            ctl.state().current_entry().map(|entry| entry.verdict),
        )
    });
    assert_eq!(score, 1);
    assert_eq!(verdict, Some(Verdict::Correct));

    harness.dispatch(ViewerIntent::ShowResults).await;
    let html = harness.render();
    assert!(html.contains("Correct: 1 / 25"), "missing results score in {html}");
    assert!(html.contains("Accuracy: 4.0%"), "missing accuracy in {html}");
    assert!(html.contains("Review"), "missing review buttons in {html}");

    let rows = harness
        .storage
        .summaries
        .list_summary_rows(10)
        .await
        .expect("list summaries");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].summary.correct(), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn viewer_smoke_field_mode_has_no_jump() {
    let mut harness = setup_view_harness(ViewKind::Viewer);
    harness.rebuild();
    harness.settle().await;

    harness
        .dispatch(ViewerIntent::StartField {
            subject: kanka(),
            field_name: "circulatory".to_string(),
        })
        .await;
    let html = harness.render();
    assert!(html.contains("Question 1 / 5"), "missing position in {html}");
    assert!(html.contains("70-kanka-3"), "missing question id in {html}");
    assert!(!html.contains("jump-input"), "field mode must not offer jump: {html}");

    harness
        .dispatch(ViewerIntent::JumpTo(QuestionNumber::new(2).unwrap()))
        .await;
    let html = harness.render();
    assert!(
        html.contains("jumping is only available when browsing by edition"),
        "missing rejection notice in {html}"
    );
    let index = harness.with_controller(|ctl| ctl.state().position());
    assert_eq!(index, Some((1, 5)));
}

#[tokio::test(flavor = "current_thread")]
async fn viewer_smoke_missing_paper_returns_to_idle() {
    let mut harness = setup_view_harness(ViewKind::Viewer);
    harness.rebuild();
    harness.settle().await;

    harness
        .dispatch(ViewerIntent::StartEdition {
            edition: EditionId::new(71),
            subject: kanka(),
        })
        .await;
    let html = harness.render();
    assert!(html.contains("exam paper not available"), "missing alert in {html}");
    assert!(html.contains("Pick an edition or a field"), "not idle: {html}");

    harness.dispatch(ViewerIntent::DismissAlerts).await;
    let html = harness.render();
    assert!(!html.contains("exam paper not available"), "alert not dismissed: {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn history_view_smoke_renders_summary_card() {
    let mut harness = setup_view_harness(ViewKind::History);
    let now = fixed_now();
    let summary = SessionSummary::from_persisted(
        "edition 75 / kanka",
        now - Duration::minutes(20),
        now,
        25,
        4,
        3,
        0,
    )
    .unwrap();
    harness
        .storage
        .summaries
        .append_summary(&summary)
        .await
        .expect("append summary");

    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("edition 75 / kanka"), "missing label in {html}");
    assert!(html.contains("Correct: 3 / 25"), "missing counts in {html}");
    assert!(html.contains("Accuracy: 12.0%"), "missing accuracy in {html}");
}

struct FailingSummaryRepo;

#[async_trait::async_trait]
impl SessionSummaryRepository for FailingSummaryRepo {
    async fn append_summary(&self, _summary: &SessionSummary) -> Result<i64, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn replace_summary(
        &self,
        _id: i64,
        _summary: &SessionSummary,
    ) -> Result<(), StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn get_summary(&self, _id: i64) -> Result<SessionSummary, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn list_summary_rows(&self, _limit: u32) -> Result<Vec<SessionSummaryRow>, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }
}

#[tokio::test(flavor = "current_thread")]
async fn history_view_smoke_renders_error_state() {
    let mut harness =
        setup_view_harness_with_summary_repo(ViewKind::History, Arc::new(FailingSummaryRepo));
    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Saved sessions could not be read."), "missing error in {html}");
    assert!(html.contains("Retry"), "missing retry in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn viewer_smoke_reports_unsaved_results() {
    let mut harness =
        setup_view_harness_with_summary_repo(ViewKind::Viewer, Arc::new(FailingSummaryRepo));
    harness.rebuild();
    harness.settle().await;

    harness
        .dispatch(ViewerIntent::StartEdition {
            edition: EditionId::new(75),
            subject: kanka(),
        })
        .await;
    harness.dispatch(ViewerIntent::ShowResults).await;
    let html = harness.render();
    assert!(html.contains("Correct: 0 / 25"), "results still shown: {html}");
    assert!(html.contains("results were not saved"), "missing alert in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn viewer_session_survives_a_visit_to_history() {
    let mut harness = setup_view_harness(ViewKind::Viewer);
    harness.rebuild();
    harness.settle().await;

    harness
        .dispatch(ViewerIntent::StartEdition {
            edition: EditionId::new(75),
            subject: kanka(),
        })
        .await;
    harness.dispatch(ViewerIntent::Answer(choice(2))).await;
    harness.dispatch(ViewerIntent::Next).await;

    harness.show(ViewKind::History).await;
    let html = harness.render();
    assert!(!html.contains("Question 2 / 25"), "viewer still mounted: {html}");

    harness.show(ViewKind::Viewer).await;
    let html = harness.render();
    assert!(html.contains("Question 2 / 25"), "position lost in {html}");
    assert!(html.contains("Score: 1"), "score lost in {html}");
    let answered = harness.with_controller(|ctl| ctl.state().score());
    assert_eq!(answered, 1);
}
