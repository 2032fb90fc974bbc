#![cfg(feature = "test-utils")]

//! End-to-end pipeline tests against a real Postgres instance.
//!
//! These tests require a reachable server, configured through the
//! `TESTS_DATABASE_*` environment variables; each test creates its own
//! uniquely named database.

use config::shared::{PipelineConfig, RetryConfig};
use ingest::pipeline::Pipeline;
use ingest::store::{StorePool, TableNames};
use ingest::test_utils::database::{TestDatabase, spawn_test_database};
use ingest::test_utils::records::{record_with, sample_record};
use ingest::types::InputRecord;

async fn create_pipeline(database: &TestDatabase, chunk_size: usize, max_workers: u16) -> Pipeline {
    let config = PipelineConfig {
        chunk_size,
        max_workers,
        ..PipelineConfig::default()
    };

    let pool = StorePool::connect(
        &database.config,
        &config.pool,
        RetryConfig {
            max_attempts: 1,
            ..RetryConfig::default()
        },
    )
    .await
    .expect("failed to establish the pool against the test database");

    Pipeline::new(pool, TableNames::new(&database.tables), &config)
}

#[tokio::test(flavor = "multi_thread")]
async fn single_record_creates_three_linked_rows() {
    let database = spawn_test_database().await;
    let pipeline = create_pipeline(&database, 10, 4).await;

    let summary = pipeline.run(vec![sample_record()]).await;

    assert_eq!(summary.counts.completed, 1);
    assert_eq!(summary.counts.total(), 1);
    assert_eq!(database.count_rows("groups").await, 1);
    assert_eq!(database.count_rows("locations").await, 1);
    assert_eq!(database.count_rows("users").await, 1);

    // The user points at the location and the location at the group.
    let mut conn = database.connect().await;
    let linked: i64 = sqlx::query_scalar(
        "SELECT count(*) FROM users u \
         JOIN locations l ON u.location_id = l.location_id \
         JOIN groups g ON l.group_id = g.group_id \
         WHERE u.email = 'b@x.com' AND l.location_name = 'L1' AND g.group_name = 'A'",
    )
    .fetch_one(&mut conn)
    .await
    .unwrap();
    assert_eq!(linked, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn rerunning_the_same_input_updates_rows_in_place() {
    let database = spawn_test_database().await;
    let pipeline = create_pipeline(&database, 10, 4).await;

    pipeline.run(vec![sample_record()]).await;

    let mut conn = database.connect().await;
    let (first_group_id, first_description): (i64, String) =
        sqlx::query_as("SELECT group_id, description FROM groups WHERE group_name = 'A'")
            .fetch_one(&mut conn)
            .await
            .unwrap();
    let first_location_id: i64 =
        sqlx::query_scalar("SELECT location_id FROM locations WHERE location_name = 'L1'")
            .fetch_one(&mut conn)
            .await
            .unwrap();
    let first_user_id: i64 =
        sqlx::query_scalar("SELECT user_id FROM users WHERE email = 'b@x.com'")
            .fetch_one(&mut conn)
            .await
            .unwrap();
    assert_eq!(first_description, "d1");

    let mut updated = sample_record();
    updated.group_description = "d2".to_owned();
    let summary = pipeline.run(vec![updated]).await;
    assert_eq!(summary.counts.completed, 1);

    // Same row counts, same ids, only the description changed.
    assert_eq!(database.count_rows("groups").await, 1);
    assert_eq!(database.count_rows("locations").await, 1);
    assert_eq!(database.count_rows("users").await, 1);

    let (second_group_id, second_description): (i64, String) =
        sqlx::query_as("SELECT group_id, description FROM groups WHERE group_name = 'A'")
            .fetch_one(&mut conn)
            .await
            .unwrap();
    let second_location_id: i64 =
        sqlx::query_scalar("SELECT location_id FROM locations WHERE location_name = 'L1'")
            .fetch_one(&mut conn)
            .await
            .unwrap();
    let second_user_id: i64 =
        sqlx::query_scalar("SELECT user_id FROM users WHERE email = 'b@x.com'")
            .fetch_one(&mut conn)
            .await
            .unwrap();

    assert_eq!(second_description, "d2");
    assert_eq!(first_group_id, second_group_id);
    assert_eq!(first_location_id, second_location_id);
    assert_eq!(first_user_id, second_user_id);
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_workers_collapse_identical_natural_keys() {
    let database = spawn_test_database().await;
    // Small chunks and more workers than pooled connections to force
    // concurrent upserts against the same group name.
    let pipeline = create_pipeline(&database, 2, 8).await;

    let records: Vec<InputRecord> = (0..40)
        .map(|i| record_with("shared", "hq", &format!("user{i}@x.com")))
        .collect();

    let summary = pipeline.run(records).await;

    assert_eq!(summary.counts.completed, 40);
    assert_eq!(database.count_rows("groups").await, 1);
    assert_eq!(database.count_rows("locations").await, 1);
    assert_eq!(database.count_rows("users").await, 40);
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_group_stage_writes_nothing_and_chunk_continues() {
    let database = spawn_test_database().await;
    // Make overly long group names fail the group stage.
    database
        .run_sql("ALTER TABLE groups ADD CONSTRAINT short_group_names CHECK (char_length(group_name) <= 16)")
        .await;

    let pipeline = create_pipeline(&database, 10, 2).await;

    let records = vec![
        record_with("alpha", "hq", "first@x.com"),
        record_with("a-group-name-well-beyond-the-limit", "hq", "second@x.com"),
        record_with("beta", "hq", "third@x.com"),
    ];

    let summary = pipeline.run(records).await;

    assert_eq!(summary.counts.completed, 2);
    assert_eq!(summary.counts.partial_group, 1);

    // The failed record left no group, location or user row behind, and the
    // records after it in the same chunk still went through.
    assert_eq!(database.count_rows("groups").await, 2);
    assert_eq!(database.count_rows("locations").await, 2);
    assert_eq!(database.count_rows("users").await, 2);

    let mut conn = database.connect().await;
    let failed_user: i64 =
        sqlx::query_scalar("SELECT count(*) FROM users WHERE email = 'second@x.com'")
            .fetch_one(&mut conn)
            .await
            .unwrap();
    assert_eq!(failed_user, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn chunked_run_covers_every_record() {
    let database = spawn_test_database().await;
    let pipeline = create_pipeline(&database, 10, 4).await;

    let records: Vec<InputRecord> = (0..25)
        .map(|i| record_with(&format!("group{}", i % 3), &format!("loc{i}"), &format!("user{i}@x.com")))
        .collect();

    let summary = pipeline.run(records).await;

    assert_eq!(summary.chunks, 3);
    assert_eq!(summary.counts.completed, 25);
    assert_eq!(summary.counts.total(), 25);
    assert_eq!(database.count_rows("groups").await, 3);
    assert_eq!(database.count_rows("users").await, 25);
}
