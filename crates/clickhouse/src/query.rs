//! Read queries backing the analyser.
//!
//! Table and column names come from [`EventIndex`] and [`EventField`];
//! every free-form value is bound as a parameter.

use crate::client::{store_error, ClickHouseClient};
use crate::insert::{CourseStructureRow, VideoEventRow};
use analytics_core::{
    CourseStructure, Error, EventField, EventIndex, Result, TimelineEntry, TimelineItem, VideoEvent,
};
use clickhouse::Row;
use serde::Deserialize;
use std::time::Instant;
use telemetry::metrics;
use tracing::warn;

/// Single string column, aliased `value`.
#[derive(Debug, Clone, Row, Deserialize)]
struct ValueRow {
    value: String,
}

#[derive(Debug, Clone, Row, Deserialize)]
struct TimelineRow {
    problem_id: String,
    video_id: String,
    event_time: String,
}

impl From<TimelineRow> for TimelineEntry {
    fn from(row: TimelineRow) -> Self {
        let item = if row.problem_id.is_empty() {
            TimelineItem::Video(row.video_id)
        } else {
            TimelineItem::Problem(row.problem_id)
        };
        TimelineEntry {
            item,
            event_time: row.event_time,
        }
    }
}

/// Parsed event time, then arrival order.
const EVENT_TIME_ORDER: &str =
    "parseDateTime64BestEffortOrZero(event_time, 6), ingested_at, ingest_seq";

fn check_field(index: EventIndex, field: EventField) -> Result<()> {
    if index.has_field(field) {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "{} events have no {} field",
            index.as_str(),
            field.column()
        )))
    }
}

/// SQL for distinct values of `field`, in order of first ingestion.
fn unique_values_sql(index: EventIndex, field: EventField, filter: Option<EventField>) -> String {
    let column = field.column();
    let filter = filter
        .map(|f| format!(" WHERE {} = ?", f.column()))
        .unwrap_or_default();
    format!(
        "SELECT {column} AS value FROM {table}{filter} GROUP BY {column} \
         ORDER BY min(ingested_at), min(ingest_seq)",
        column = column,
        table = index.table(),
        filter = filter,
    )
}

pub async fn unique_field_values(
    client: &ClickHouseClient,
    index: EventIndex,
    field: EventField,
) -> Result<Vec<String>> {
    check_field(index, field)?;
    let start = Instant::now();

    let rows: Vec<ValueRow> = client
        .inner()
        .query(&unique_values_sql(index, field, None))
        .fetch_all()
        .await
        .map_err(|e| store_error("unique values query", e))?;

    metrics().store_latency_ms.observe_since(start);
    Ok(rows.into_iter().map(|r| r.value).collect())
}

pub async fn unique_field_values_filtered(
    client: &ClickHouseClient,
    index: EventIndex,
    field: EventField,
    filter_field: EventField,
    filter_value: &str,
) -> Result<Vec<String>> {
    check_field(index, field)?;
    check_field(index, filter_field)?;
    let start = Instant::now();

    let rows: Vec<ValueRow> = client
        .inner()
        .query(&unique_values_sql(index, field, Some(filter_field)))
        .bind(filter_value)
        .fetch_all()
        .await
        .map_err(|e| store_error("filtered unique values query", e))?;

    metrics().store_latency_ms.observe_since(start);
    Ok(rows.into_iter().map(|r| r.value).collect())
}

/// A user's video and problem events in a course, by event time ascending.
pub async fn user_timeline_events(
    client: &ClickHouseClient,
    username: &str,
    course_id: &str,
) -> Result<Vec<TimelineEntry>> {
    let sql = format!(
        "SELECT problem_id, video_id, event_time FROM ( \
            SELECT problem_id, '' AS video_id, event_time, ingested_at, ingest_seq \
            FROM problem_events WHERE username = ? AND course_id = ? \
            UNION ALL \
            SELECT '' AS problem_id, video_id, event_time, ingested_at, ingest_seq \
            FROM video_events WHERE username = ? AND course_id = ? \
         ) ORDER BY {}",
        EVENT_TIME_ORDER
    );
    let start = Instant::now();

    let rows: Vec<TimelineRow> = client
        .inner()
        .query(&sql)
        .bind(username)
        .bind(course_id)
        .bind(username)
        .bind(course_id)
        .fetch_all()
        .await
        .map_err(|e| store_error("timeline query", e))?;

    metrics().store_latency_ms.observe_since(start);
    Ok(rows.into_iter().map(TimelineEntry::from).collect())
}

/// All events of a video, by video time ascending.
pub async fn video_events(client: &ClickHouseClient, video_id: &str) -> Result<Vec<VideoEvent>> {
    let start = Instant::now();

    let rows: Vec<VideoEventRow> = client
        .inner()
        .query(
            "SELECT event_time, username, course_id, event_type, video_id, video_time, kind, \
             ingest_seq FROM video_events WHERE video_id = ? \
             ORDER BY video_time, ingested_at, ingest_seq",
        )
        .bind(video_id)
        .fetch_all()
        .await
        .map_err(|e| store_error("video events query", e))?;

    metrics().store_latency_ms.observe_since(start);

    let mut events = Vec::with_capacity(rows.len());
    for row in rows {
        let kind = row.kind.clone();
        match row.into_event() {
            Some(event) => events.push(event),
            None => warn!(video_id = %video_id, kind = %kind, "Skipping stored event with unknown kind"),
        }
    }
    Ok(events)
}

/// Latest structure stored for the course code.
pub async fn course_structure(
    client: &ClickHouseClient,
    course_code: &str,
) -> Result<Option<CourseStructure>> {
    let row: Option<CourseStructureRow> = client
        .inner()
        .query(
            "SELECT course_code, body FROM course_structures \
             WHERE course_code = ? ORDER BY updated_at DESC LIMIT 1",
        )
        .bind(course_code)
        .fetch_optional()
        .await
        .map_err(|e| store_error("course structure query", e))?;

    match row {
        Some(row) => Ok(Some(serde_json::from_str(&row.body)?)),
        None => Ok(None),
    }
}

pub async fn course_codes_with_structure(client: &ClickHouseClient) -> Result<Vec<String>> {
    let rows: Vec<ValueRow> = client
        .inner()
        .query("SELECT DISTINCT course_code AS value FROM course_structures ORDER BY value")
        .fetch_all()
        .await
        .map_err(|e| store_error("course codes query", e))?;
    Ok(rows.into_iter().map(|r| r.value).collect())
}

/// Truncates every table (test cleanup).
pub async fn truncate_all(client: &ClickHouseClient) -> Result<()> {
    for table in [
        "video_events",
        "problem_events",
        "sequential_events",
        "link_events",
        "bookmark_events",
        "course_structures",
    ] {
        client
            .inner()
            .query(&format!("TRUNCATE TABLE IF EXISTS {}", table))
            .execute()
            .await
            .map_err(|e| store_error("truncate", e))?;
    }
    Ok(())
}
