//! Row types and batch inserts.

use crate::client::{store_error, ClickHouseClient};
use analytics_core::{
    BookmarkEvent, CanonicalEvent, CourseStructure, EventHeader, LinkEvent, ProblemEvent, Result,
    SequentialEvent, VideoEvent,
};
use clickhouse::Row;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use telemetry::metrics;
use tracing::debug;

/// Row for the `video_events` table.
#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct VideoEventRow {
    pub event_time: String,
    pub username: String,
    pub course_id: String,
    pub event_type: String,
    pub video_id: String,
    pub video_time: f64,
    pub kind: String,
    /// Arrival order, set when the batch is inserted
    pub ingest_seq: u64,
}

impl From<VideoEvent> for VideoEventRow {
    fn from(event: VideoEvent) -> Self {
        Self {
            kind: event.kind.as_str().to_string(),
            event_time: event.header.event_time,
            username: event.header.username,
            course_id: event.header.course_id,
            event_type: event.header.event_type,
            video_id: event.video_id,
            video_time: event.video_time,
            ingest_seq: 0,
        }
    }
}

#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct ProblemEventRow {
    pub event_time: String,
    pub username: String,
    pub course_id: String,
    pub event_type: String,
    pub problem_id: String,
    pub weighted_earned: f64,
    pub weighted_possible: f64,
    pub ingest_seq: u64,
}

impl From<ProblemEvent> for ProblemEventRow {
    fn from(event: ProblemEvent) -> Self {
        Self {
            event_time: event.header.event_time,
            username: event.header.username,
            course_id: event.header.course_id,
            event_type: event.header.event_type,
            problem_id: event.problem_id,
            weighted_earned: event.weighted_earned,
            weighted_possible: event.weighted_possible,
            ingest_seq: 0,
        }
    }
}

#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct SequentialEventRow {
    pub event_time: String,
    pub username: String,
    pub course_id: String,
    pub event_type: String,
    pub old: i64,
    pub new: i64,
    pub ingest_seq: u64,
}

impl From<SequentialEvent> for SequentialEventRow {
    fn from(event: SequentialEvent) -> Self {
        Self {
            event_time: event.header.event_time,
            username: event.header.username,
            course_id: event.header.course_id,
            event_type: event.header.event_type,
            old: event.old,
            new: event.new,
            ingest_seq: 0,
        }
    }
}

#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct LinkEventRow {
    pub event_time: String,
    pub username: String,
    pub course_id: String,
    pub event_type: String,
    pub current_url: String,
    pub target_url: String,
    pub ingest_seq: u64,
}

impl From<LinkEvent> for LinkEventRow {
    fn from(event: LinkEvent) -> Self {
        Self {
            event_time: event.header.event_time,
            username: event.header.username,
            course_id: event.header.course_id,
            event_type: event.header.event_type,
            current_url: event.current_url,
            target_url: event.target_url,
            ingest_seq: 0,
        }
    }
}

#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct BookmarkEventRow {
    pub event_time: String,
    pub username: String,
    pub course_id: String,
    pub event_type: String,
    pub item_id: String,
    pub is_added: bool,
    pub ingest_seq: u64,
}

impl From<BookmarkEvent> for BookmarkEventRow {
    fn from(event: BookmarkEvent) -> Self {
        Self {
            event_time: event.header.event_time,
            username: event.header.username,
            course_id: event.header.course_id,
            event_type: event.header.event_type,
            item_id: event.item_id,
            is_added: event.is_added,
            ingest_seq: 0,
        }
    }
}

/// Row for the `course_structures` table.
#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct CourseStructureRow {
    pub course_code: String,
    /// Structure serialized as JSON
    pub body: String,
}

impl VideoEventRow {
    pub fn into_event(self) -> Option<VideoEvent> {
        let kind = match self.kind.as_str() {
            "play" => analytics_core::VideoEventKind::Play,
            "pause" => analytics_core::VideoEventKind::Pause,
            _ => return None,
        };
        Some(VideoEvent {
            header: EventHeader {
                event_time: self.event_time,
                username: self.username,
                course_id: self.course_id,
                event_type: self.event_type,
            },
            video_id: self.video_id,
            video_time: self.video_time,
            kind,
        })
    }
}

/// Canonical events grouped by destination table.
#[derive(Debug, Default)]
pub struct FamilyBatches {
    pub video: Vec<VideoEventRow>,
    pub problem: Vec<ProblemEventRow>,
    pub sequential: Vec<SequentialEventRow>,
    pub link: Vec<LinkEventRow>,
    pub bookmark: Vec<BookmarkEventRow>,
}

impl FamilyBatches {
    pub fn len(&self) -> usize {
        self.video.len()
            + self.problem.len()
            + self.sequential.len()
            + self.link.len()
            + self.bookmark.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shifts every row's batch position by `first`, the start of a range
    /// reserved with [`ClickHouseClient::reserve_sequence`].
    pub fn offset_sequence(&mut self, first: u64) {
        self.video.iter_mut().for_each(|r| r.ingest_seq += first);
        self.problem.iter_mut().for_each(|r| r.ingest_seq += first);
        self.sequential.iter_mut().for_each(|r| r.ingest_seq += first);
        self.link.iter_mut().for_each(|r| r.ingest_seq += first);
        self.bookmark.iter_mut().for_each(|r| r.ingest_seq += first);
    }
}

/// Groups events by table. Each row's `ingest_seq` is its position in the
/// incoming batch.
impl FromIterator<CanonicalEvent> for FamilyBatches {
    fn from_iter<I: IntoIterator<Item = CanonicalEvent>>(iter: I) -> Self {
        let mut batches = Self::default();
        for (position, event) in iter.into_iter().enumerate() {
            let seq = position as u64;
            match event {
                CanonicalEvent::Video(e) => batches.video.push(VideoEventRow {
                    ingest_seq: seq,
                    ..e.into()
                }),
                CanonicalEvent::Problem(e) => batches.problem.push(ProblemEventRow {
                    ingest_seq: seq,
                    ..e.into()
                }),
                CanonicalEvent::Sequential(e) => batches.sequential.push(SequentialEventRow {
                    ingest_seq: seq,
                    ..e.into()
                }),
                CanonicalEvent::Link(e) => batches.link.push(LinkEventRow {
                    ingest_seq: seq,
                    ..e.into()
                }),
                CanonicalEvent::Bookmark(e) => batches.bookmark.push(BookmarkEventRow {
                    ingest_seq: seq,
                    ..e.into()
                }),
            }
        }
        batches
    }
}

/// Inserts rows into one table.
pub async fn insert_rows<T>(client: &ClickHouseClient, table: &str, rows: &[T]) -> Result<usize>
where
    T: Row + Serialize,
{
    if rows.is_empty() {
        return Ok(0);
    }

    let mut insert = client
        .inner()
        .insert::<T>(table)
        .map_err(|e| store_error("insert", e))?;

    for row in rows {
        insert.write(row).await.map_err(|e| store_error("write", e))?;
    }

    insert.end().await.map_err(|e| store_error("insert end", e))?;

    Ok(rows.len())
}

/// Inserts canonical events, one insert per family present in the batch.
pub async fn insert_events(client: &ClickHouseClient, events: Vec<CanonicalEvent>) -> Result<usize> {
    let mut batches: FamilyBatches = events.into_iter().collect();
    if batches.is_empty() {
        return Ok(0);
    }
    batches.offset_sequence(client.reserve_sequence(batches.len()));

    let start = Instant::now();
    let mut count = 0;
    count += insert_rows(client, "video_events", &batches.video).await?;
    count += insert_rows(client, "problem_events", &batches.problem).await?;
    count += insert_rows(client, "sequential_events", &batches.sequential).await?;
    count += insert_rows(client, "link_events", &batches.link).await?;
    count += insert_rows(client, "bookmark_events", &batches.bookmark).await?;

    metrics().store_latency_ms.observe_since(start);
    metrics().events_stored.inc_by(count as u64);

    debug!(
        count = count,
        latency_ms = %start.elapsed().as_millis(),
        "Inserted events to ClickHouse"
    );

    Ok(count)
}

pub async fn insert_course_structure(
    client: &ClickHouseClient,
    structure: &CourseStructure,
) -> Result<()> {
    let row = CourseStructureRow {
        course_code: structure.course_code.clone(),
        body: serde_json::to_string(structure)?,
    };
    insert_rows(client, "course_structures", &[row]).await?;

    metrics().structures_stored.inc();
    debug!(course_code = %structure.course_code, "Stored course structure");
    Ok(())
}
