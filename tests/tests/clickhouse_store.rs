//! Round trips through a real ClickHouse.
//!
//! Requires Docker to be running for testcontainers, or
//! `LEARNING_ANALYTICS_TEST_CLICKHOUSE_URL` pointing at a server.
//! Each context truncates the tables, so against a shared server run with
//! `cargo test -p integration-tests -- --ignored --test-threads=1`.

use analytics_core::{EventFamily, EventField, EventIndex, EventSink, EventStore, TimelineItem};
use integration_tests::fixtures::{course_id, course_structure, problem_log, video_log, Item};
use integration_tests::setup::ClickHouseContext;
use serde_json::{json, Value};

/// Test ingested events come back in store order and feed both curves
#[tokio::test]
#[ignore]
async fn test_events_round_trip() {
    let ctx = ClickHouseContext::new().await;
    let course = course_id("CS101");

    let outcome = ctx
        .ingest(
            EventFamily::Video,
            &[
                video_log("alice", &course, "play_video", "intro", 0.0, 2),
                video_log("bob", &course, "play_video", "intro", 2.0, 3),
                video_log("alice", &course, "pause_video", "intro", 4.0, 4),
                video_log("bob", &course, "stop_video", "intro", 6.0, 5),
            ],
        )
        .await
        .unwrap();
    assert_eq!(outcome.stored, 4);

    let outcome = ctx
        .ingest(EventFamily::Problem, &[problem_log("alice", &course, "quiz", 1)])
        .await
        .unwrap();
    assert_eq!(outcome.stored, 1);

    let timeline = ctx.clickhouse.user_timeline_events("alice", &course).await.unwrap();
    let items: Vec<TimelineItem> = timeline.into_iter().map(|e| e.item).collect();
    assert_eq!(
        items,
        vec![
            TimelineItem::Problem("quiz".into()),
            TimelineItem::Video("intro".into()),
            TimelineItem::Video("intro".into()),
        ]
    );

    // Both users first appear in the same insert block
    let users = ctx
        .clickhouse
        .unique_field_values_filtered(
            EventIndex::Video,
            EventField::Username,
            EventField::CourseId,
            &course,
        )
        .await
        .unwrap();
    assert_eq!(users, vec!["alice", "bob"]);

    let server = axum_test::TestServer::new(ctx.router.clone()).unwrap();
    let body: Value = server
        .get("/users-watchings")
        .add_query_param("video_id", "intro")
        .await
        .json();
    assert_eq!(body, json!({"x": [0.0, 2.0, 4.0, 6.0], "y": [2, 1, 0, -1]}));
}

/// Test the latest structure upload wins
#[tokio::test]
#[ignore]
async fn test_course_structure_round_trip() {
    let ctx = ClickHouseContext::new().await;

    ctx.clickhouse
        .insert_course_structure(course_structure("CS101", &[Item::Video("old")]))
        .await
        .unwrap();
    let latest = course_structure("CS101", &[Item::Problem("quiz"), Item::Video("intro")]);
    ctx.clickhouse
        .insert_course_structure(latest.clone())
        .await
        .unwrap();

    let stored = ctx.clickhouse.course_structure("CS101").await.unwrap();
    assert_eq!(stored, Some(latest));
    assert_eq!(ctx.clickhouse.course_structure("CS404").await.unwrap(), None);
    assert_eq!(
        ctx.clickhouse.course_codes_with_structure().await.unwrap(),
        vec!["CS101"]
    );
}
