//! ClickHouse table schemas.
//!
//! One table per event family plus the course structure table. Tables are
//! created in the client's configured database.
//! - `event_time` keeps the raw log timestamp; ordering parses it
//! - `ingested_at` breaks ties between events with the same timestamp
//! - `ingest_seq` orders rows written in the same insert block
//! - LowCardinality for tag-like fields

/// Video playback events.
pub const CREATE_VIDEO_EVENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS video_events (
    event_time String,
    username String,
    course_id String,
    event_type LowCardinality(String),
    video_id String,
    video_time Float64,
    kind LowCardinality(String),
    ingest_seq UInt64,
    ingested_at DateTime64(6) DEFAULT now64(6)
)
ENGINE = MergeTree()
ORDER BY (video_id, video_time, ingested_at, ingest_seq)
"#;

/// Problem submissions, shows and answer reveals.
pub const CREATE_PROBLEM_EVENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS problem_events (
    event_time String,
    username String,
    course_id String,
    event_type LowCardinality(String),
    problem_id String,
    weighted_earned Float64,
    weighted_possible Float64,
    ingest_seq UInt64,
    ingested_at DateTime64(6) DEFAULT now64(6)
)
ENGINE = MergeTree()
ORDER BY (course_id, username, ingested_at)
"#;

pub const CREATE_SEQUENTIAL_EVENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS sequential_events (
    event_time String,
    username String,
    course_id String,
    event_type LowCardinality(String),
    old Int64,
    new Int64,
    ingest_seq UInt64,
    ingested_at DateTime64(6) DEFAULT now64(6)
)
ENGINE = MergeTree()
ORDER BY (course_id, username, ingested_at)
"#;

pub const CREATE_LINK_EVENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS link_events (
    event_time String,
    username String,
    course_id String,
    event_type LowCardinality(String),
    current_url String,
    target_url String,
    ingest_seq UInt64,
    ingested_at DateTime64(6) DEFAULT now64(6)
)
ENGINE = MergeTree()
ORDER BY (course_id, username, ingested_at)
"#;

pub const CREATE_BOOKMARK_EVENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS bookmark_events (
    event_time String,
    username String,
    course_id String,
    event_type LowCardinality(String),
    item_id String,
    is_added Bool,
    ingest_seq UInt64,
    ingested_at DateTime64(6) DEFAULT now64(6)
)
ENGINE = MergeTree()
ORDER BY (course_id, username, ingested_at)
"#;

/// Course structures as JSON documents, latest upload per course code wins.
pub const CREATE_COURSE_STRUCTURES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS course_structures (
    course_code String,
    body String,
    updated_at DateTime64(6) DEFAULT now64(6)
)
ENGINE = ReplacingMergeTree(updated_at)
ORDER BY course_code
"#;

/// All table DDL statements in creation order.
pub fn all_tables() -> Vec<&'static str> {
    vec![
        CREATE_VIDEO_EVENTS_TABLE,
        CREATE_PROBLEM_EVENTS_TABLE,
        CREATE_SEQUENTIAL_EVENTS_TABLE,
        CREATE_LINK_EVENTS_TABLE,
        CREATE_BOOKMARK_EVENTS_TABLE,
        CREATE_COURSE_STRUCTURES_TABLE,
    ]
}
