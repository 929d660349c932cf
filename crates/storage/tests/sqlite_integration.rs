use chrono::Duration;
use quiz_core::model::SessionSummary;
use quiz_core::time::fixed_now;
use storage::repository::{SessionSummaryRepository, StorageError};
use storage::sqlite::SqliteRepository;

fn summary(label: &str, minutes: i64, answered: u32, correct: u32, unknown: u32) -> SessionSummary {
    let started = fixed_now();
    SessionSummary::from_persisted(
        label,
        started,
        started + Duration::minutes(minutes),
        25,
        answered,
        correct,
        unknown,
    )
    .unwrap()
}

#[tokio::test]
async fn sqlite_roundtrip_persists_summary_counts() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_summary_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let saved = summary("edition 75 / kanka", 12, 10, 7, 1);
    let id = repo.append_summary(&saved).await.unwrap();
    let fetched = repo.get_summary(id).await.unwrap();
    assert_eq!(fetched, saved);
    assert_eq!(fetched.incorrect(), 2);
    assert_eq!(fetched.accuracy().to_string(), "28.0");
}

#[tokio::test]
async fn sqlite_replace_updates_existing_row() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_summary_replace?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    // running twice must be harmless
    repo.migrate().await.expect("migrate again");

    let id = repo
        .append_summary(&summary("field circulatory / kanka", 3, 2, 1, 0))
        .await
        .unwrap();
    repo.replace_summary(id, &summary("field circulatory / kanka", 8, 5, 4, 0))
        .await
        .unwrap();

    let rows = repo.list_summary_rows(10).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, id);
    assert_eq!(rows[0].summary.answered(), 5);

    let missing = repo
        .replace_summary(id + 100, &summary("x", 1, 0, 0, 0))
        .await;
    assert!(matches!(missing, Err(StorageError::NotFound)));
    assert!(matches!(
        repo.get_summary(id + 100).await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn sqlite_lists_newest_first() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_summary_list?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    for (label, minutes) in [("first", 1), ("third", 30), ("second", 10)] {
        repo.append_summary(&summary(label, minutes, 1, 1, 0))
            .await
            .unwrap();
    }

    let labels: Vec<String> = repo
        .list_summary_rows(2)
        .await
        .unwrap()
        .into_iter()
        .map(|row| row.summary.label().to_string())
        .collect();
    assert_eq!(labels, vec!["third", "second"]);
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_summary_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    let id = repo
        .append_summary(&summary("field circulatory / kanka", 5, 2, 1, 1))
        .await
        .unwrap();
    repo.migrate().await.expect("second migrate");
    assert_eq!(repo.get_summary(id).await.unwrap().unknown(), 1);
}
