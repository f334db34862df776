//! Tests for raw log ingestion through the worker into the store.

use analytics_core::{CanonicalEvent, EventFamily, VideoEventKind};
use integration_tests::fixtures::{
    bookmark_log, course_id, link_log, payload, problem_log, sequential_log, video_log,
};
use integration_tests::mocks::{MockEventStore, MockLogSource};
use integration_tests::setup::TestContext;
use serde_json::Value;
use std::sync::Arc;
use telemetry::metrics;
use worker::{BatchOutcome, IngestWorker};

/// Test every family reaches the store as its canonical event
#[tokio::test]
async fn test_all_families_are_stored() {
    let ctx = TestContext::new();
    let course = course_id("CS101");

    let stored = ctx
        .ingest_all(&[
            video_log("alice", &course, "play_video", "intro", 1.5, 1),
            problem_log("alice", &course, "quiz", 2),
            sequential_log("alice", &course, 1, 2, 3),
            link_log("alice", &course, "https://example.com/reading", 4),
            bookmark_log("alice", &course, "block-v1:org+CS101+2024+type@video+block@intro", true, 5),
            bookmark_log("alice", &course, "block-v1:org+CS101+2024+type@video+block@intro", false, 6),
        ])
        .await
        .unwrap();
    assert_eq!(stored, 6);

    let events = ctx.store.stored_events();
    let families: Vec<EventFamily> = events.iter().map(|e| e.family()).collect();
    assert_eq!(
        families,
        vec![
            EventFamily::Video,
            EventFamily::Problem,
            EventFamily::Sequential,
            EventFamily::Link,
            EventFamily::Bookmark,
            EventFamily::Bookmark,
        ]
    );

    match &events[1] {
        CanonicalEvent::Problem(problem) => {
            assert_eq!(problem.problem_id, "quiz");
            assert_eq!(problem.weighted_earned, 1.0);
            assert_eq!(problem.weighted_possible, 2.0);
        }
        other => panic!("expected problem event, got {:?}", other),
    }

    match (&events[4], &events[5]) {
        (CanonicalEvent::Bookmark(added), CanonicalEvent::Bookmark(removed)) => {
            assert!(added.is_added);
            assert!(!removed.is_added);
        }
        other => panic!("expected bookmarks, got {:?}", other),
    }
}

/// Test stop and seek logs normalize to the pause kind
#[tokio::test]
async fn test_video_kinds() {
    let ctx = TestContext::new();
    let course = course_id("CS101");

    let outcome = ctx
        .ingest(
            EventFamily::Video,
            &[
                video_log("alice", &course, "play_video", "intro", 0.0, 1),
                video_log("alice", &course, "stop_video", "intro", 3.0, 2),
                video_log("alice", &course, "seek_video", "intro", 42.0, 3),
            ],
        )
        .await
        .unwrap();
    assert_eq!(outcome.stored, 3);

    let kinds: Vec<(VideoEventKind, f64)> = ctx
        .store
        .stored_events()
        .into_iter()
        .filter_map(|e| match e {
            CanonicalEvent::Video(v) => Some((v.kind, v.video_time)),
            _ => None,
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            (VideoEventKind::Play, 0.0),
            (VideoEventKind::Pause, 3.0),
            (VideoEventKind::Pause, 42.0),
        ]
    );
}

/// Test unparseable logs are dropped without failing the batch
#[tokio::test]
async fn test_bad_logs_are_rejected() {
    let ctx = TestContext::new();
    let course = course_id("CS101");
    let rejected_before = metrics().logs_rejected.get();

    let mut missing_time = video_log("alice", &course, "play_video", "intro", 0.0, 1);
    missing_time["event"]
        .as_object_mut()
        .unwrap()
        .remove("currentTime");

    let mut wrong_family = problem_log("alice", &course, "quiz", 2);
    wrong_family["event_type"] = "problem_show".into();

    let outcome = ctx
        .ingest(
            EventFamily::Video,
            &[
                missing_time,
                wrong_family,
                Value::from("not an object"),
                video_log("alice", &course, "play_video", "intro", 7.0, 4),
            ],
        )
        .await
        .unwrap();

    assert_eq!(
        outcome,
        BatchOutcome {
            fetched: 4,
            rejected: 3,
            stored: 1,
        }
    );

    let mut bad_block = problem_log("alice", &course, "quiz", 5);
    bad_block["event"]["problem_id"] = "not-a-usage-key".into();
    let outcome = ctx.ingest(EventFamily::Problem, &[bad_block]).await.unwrap();
    assert_eq!(outcome.rejected, 1);

    assert_eq!(ctx.store.event_count(), 1);
    assert!(metrics().logs_rejected.get() >= rejected_before + 4);
}

/// Test a payload encoded as a JSON string is accepted
#[tokio::test]
async fn test_string_encoded_event_payload() {
    let ctx = TestContext::new();
    let course = course_id("CS101");

    let mut log = video_log("alice", &course, "pause_video", "intro", 12.5, 1);
    log["event"] = log["event"].to_string().into();

    let outcome = ctx.ingest(EventFamily::Video, &[log]).await.unwrap();
    assert_eq!(outcome.stored, 1);

    match &ctx.store.stored_events()[0] {
        CanonicalEvent::Video(video) => {
            assert_eq!(video.video_id, "intro");
            assert_eq!(video.video_time, 12.5);
            assert_eq!(video.kind, VideoEventKind::Pause);
        }
        other => panic!("expected video event, got {:?}", other),
    }
}

/// Test a failing store still commits when batches may be skipped
#[tokio::test]
async fn test_store_failure_commits_skipped_batch() {
    let store = Arc::new(MockEventStore::new());
    store.set_should_fail(true);

    let source = Arc::new(MockLogSource::new(EventFamily::Link));
    source.push_batch([payload(&link_log(
        "alice",
        &course_id("CS101"),
        "https://example.com",
        1,
    ))]);

    let worker = IngestWorker::with_config(
        source.clone(),
        store.clone(),
        worker::IngestWorkerConfig {
            retry_backoff: std::time::Duration::from_millis(1),
            ..Default::default()
        },
    );

    let outcome = worker.process_batch().await.unwrap();
    assert_eq!(outcome.stored, 0);
    assert_eq!(source.committed().len(), 1);
    assert_eq!(source.pending_batches(), 0);
    assert_eq!(store.event_count(), 0);
}
