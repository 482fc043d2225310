use std::sync::Arc;

use quiz_core::model::{AreaKey, QuestionIndex, QuestionStatus, StatusMap};
use storage::repository::KeyValueStore;
use storage::sqlite::SqliteRepository;
use storage::{ProgressStore, Storage};

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_kv_overwrites_and_removes() {
    let repo = connect("memdb_kv_basic").await;

    assert_eq!(repo.get("currentArea").await.unwrap(), None);
    repo.set("currentArea", "\"log1\"").await.unwrap();
    repo.set("currentArea", "\"ipc\"").await.unwrap();
    assert_eq!(
        repo.get("currentArea").await.unwrap().as_deref(),
        Some("\"ipc\"")
    );

    repo.remove("currentArea").await.unwrap();
    repo.remove("currentArea").await.unwrap();
    assert_eq!(repo.get("currentArea").await.unwrap(), None);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_kv_migrate").await;
    repo.set("k", "1").await.unwrap();
    repo.migrate().await.expect("second migrate");
    assert_eq!(repo.get("k").await.unwrap().as_deref(), Some("1"));
}

#[tokio::test]
async fn progress_store_round_trips_over_sqlite() {
    let storage = Storage::sqlite("sqlite:file:memdb_progress?mode=memory&cache=shared")
        .await
        .expect("storage");
    let progress = ProgressStore::new(Arc::clone(&storage.kv));
    let area = AreaKey::new("ipc");

    let mut status = StatusMap::all_pending((0..3).map(QuestionIndex::new));
    status.record(QuestionIndex::new(2), false);
    progress.save_status(&area, &status).await.unwrap();
    progress.save_cursor(&area, 2).await.unwrap();

    let saved = progress.load(&area).await.unwrap();
    assert_eq!(saved.cursor, Some(2));
    assert_eq!(
        saved.status.unwrap().get(QuestionIndex::new(2)),
        Some(QuestionStatus::Fail)
    );
}
