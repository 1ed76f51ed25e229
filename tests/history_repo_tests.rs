// HistoryRepo tests: connect, init, insert, find_records, delete

mod common;

use chrono::{Duration, Utc};
use common::{payload_with, temp_repo};
use hoststats::history_repo::{CreatedFilter, SortOrder};

#[tokio::test]
async fn history_repo_connect_and_init() {
    let (_dir, repo) = temp_repo().await;
    // Second init is no-op (IF NOT EXISTS)
    repo.init().await.unwrap();
    assert_eq!(repo.count().await.unwrap(), 0);
    assert!(repo.latest().await.unwrap().is_none());
}

#[tokio::test]
async fn history_repo_connect_creates_parent_dir() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("nested/data/history.db");
    let repo = hoststats::history_repo::HistoryRepo::connect(path.to_str().unwrap(), 1)
        .await
        .unwrap();
    repo.init().await.unwrap();
    assert!(path.exists());
}

#[tokio::test]
async fn insert_assigns_non_decreasing_created() {
    let (_dir, repo) = temp_repo().await;
    let future = Utc::now() + Duration::hours(1);
    repo.insert_at(future, &payload_with(1)).await.unwrap();

    // Wall clock is behind the newest record; the store must not go backwards.
    let id = repo.insert(&payload_with(2)).await.unwrap();
    let latest = repo.latest().await.unwrap().unwrap();
    assert_eq!(latest.id, id);
    assert_eq!(
        latest.created.timestamp_millis(),
        future.timestamp_millis()
    );
}

#[tokio::test]
async fn insert_roundtrips_payload() {
    let (_dir, repo) = temp_repo().await;
    let before = Utc::now() - Duration::seconds(1);
    let data = payload_with(7);
    let id = repo.insert(&data).await.unwrap();

    let records = repo
        .find_records(CreatedFilter::After(before), None, None)
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, id);
    assert_eq!(records[0].data, data);
}

#[tokio::test]
async fn find_records_filters_strictly_and_orders() {
    let (_dir, repo) = temp_repo().await;
    let now = Utc::now();
    let t1 = now - Duration::hours(3);
    let t2 = now - Duration::hours(2);
    let t3 = now - Duration::hours(1);
    // Inserted out of order on purpose.
    repo.insert_at(t2, &payload_with(2)).await.unwrap();
    repo.insert_at(t3, &payload_with(3)).await.unwrap();
    repo.insert_at(t1, &payload_with(1)).await.unwrap();

    let after = repo
        .find_records(CreatedFilter::After(t1), Some(SortOrder::Asc), None)
        .await
        .unwrap();
    let created: Vec<_> = after.iter().map(|r| r.created.timestamp_millis()).collect();
    assert_eq!(created, vec![t2.timestamp_millis(), t3.timestamp_millis()]);

    let before = repo
        .find_records(CreatedFilter::Before(t3), Some(SortOrder::Desc), None)
        .await
        .unwrap();
    let created: Vec<_> = before.iter().map(|r| r.created.timestamp_millis()).collect();
    assert_eq!(created, vec![t2.timestamp_millis(), t1.timestamp_millis()]);

    let limited = repo
        .find_records(
            CreatedFilter::After(now - Duration::days(1)),
            Some(SortOrder::Asc),
            Some(1),
        )
        .await
        .unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].created.timestamp_millis(), t1.timestamp_millis());
}

#[tokio::test]
async fn delete_removes_only_that_record() {
    let (_dir, repo) = temp_repo().await;
    let a = repo.insert(&payload_with(1)).await.unwrap();
    let b = repo.insert(&payload_with(2)).await.unwrap();

    assert!(repo.delete(a).await.unwrap());
    assert!(!repo.delete(a).await.unwrap());
    assert_eq!(repo.count().await.unwrap(), 1);
    assert_eq!(repo.latest().await.unwrap().unwrap().id, b);
}
