//! Mock implementations for testing.

use analytics_core::{
    CanonicalEvent, CourseStructure, Error, EventFamily, EventField, EventIndex, EventSink,
    EventStore, Result, TimelineEntry, TimelineItem, VideoEvent,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use redpanda::{LogRecord, LogSource, Offset};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

/// In-memory event store.
///
/// Implements both `EventStore` and `EventSink` with the same ordering
/// guarantees as the ClickHouse store: unique values in first-seen order,
/// timelines by event time, video events by video time.
#[derive(Clone, Default)]
pub struct MockEventStore {
    events: Arc<Mutex<Vec<CanonicalEvent>>>,
    structures: Arc<Mutex<HashMap<String, CourseStructure>>>,
    /// Simulate store failures if set.
    should_fail: Arc<Mutex<bool>>,
}

impl MockEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored events in insertion order.
    pub fn stored_events(&self) -> Vec<CanonicalEvent> {
        self.events.lock().clone()
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().len()
    }

    pub fn structure_count(&self) -> usize {
        self.structures.lock().len()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
        self.structures.lock().clear();
    }

    /// Set failure mode for testing error handling.
    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.lock() = fail;
    }

    fn check_failure(&self) -> Result<()> {
        if *self.should_fail.lock() {
            Err(Error::store("Mock store failure"))
        } else {
            Ok(())
        }
    }
}

fn field_value(event: &CanonicalEvent, field: EventField) -> Option<&str> {
    let header = event.header();
    match (field, event) {
        (EventField::Username, _) => Some(header.username.as_str()),
        (EventField::CourseId, _) => Some(header.course_id.as_str()),
        (EventField::EventType, _) => Some(header.event_type.as_str()),
        (EventField::VideoId, CanonicalEvent::Video(e)) => Some(e.video_id.as_str()),
        (EventField::ProblemId, CanonicalEvent::Problem(e)) => Some(e.problem_id.as_str()),
        _ => None,
    }
}

#[async_trait]
impl EventStore for MockEventStore {
    async fn unique_field_values(
        &self,
        index: EventIndex,
        field: EventField,
    ) -> Result<Vec<String>> {
        self.check_failure()?;
        if !index.has_field(field) {
            return Err(Error::validation(format!("{:?} has no {:?}", index, field)));
        }

        let events = self.events.lock();
        let mut seen = HashSet::new();
        Ok(events
            .iter()
            .filter(|e| EventIndex::from(e.family()) == index)
            .filter_map(|e| field_value(e, field))
            .filter(|v| seen.insert(v.to_string()))
            .map(str::to_string)
            .collect())
    }

    async fn unique_field_values_filtered(
        &self,
        index: EventIndex,
        field: EventField,
        filter_field: EventField,
        filter_value: &str,
    ) -> Result<Vec<String>> {
        self.check_failure()?;
        if !index.has_field(field) || !index.has_field(filter_field) {
            return Err(Error::validation(format!("{:?} has no {:?}", index, field)));
        }

        let events = self.events.lock();
        let mut seen = HashSet::new();
        Ok(events
            .iter()
            .filter(|e| EventIndex::from(e.family()) == index)
            .filter(|e| field_value(e, filter_field) == Some(filter_value))
            .filter_map(|e| field_value(e, field))
            .filter(|v| seen.insert(v.to_string()))
            .map(str::to_string)
            .collect())
    }

    async fn user_timeline_events(
        &self,
        username: &str,
        course_id: &str,
    ) -> Result<Vec<TimelineEntry>> {
        self.check_failure()?;

        let events = self.events.lock();
        let mut timeline: Vec<TimelineEntry> = events
            .iter()
            .filter(|e| e.username() == username && e.header().course_id == course_id)
            .filter_map(|e| {
                let item = match e {
                    CanonicalEvent::Video(v) => TimelineItem::Video(v.video_id.clone()),
                    CanonicalEvent::Problem(p) => TimelineItem::Problem(p.problem_id.clone()),
                    _ => return None,
                };
                Some(TimelineEntry {
                    item,
                    event_time: e.event_time().to_string(),
                })
            })
            .collect();

        // Stable: ties keep insertion order.
        timeline.sort_by(|a, b| a.event_time.cmp(&b.event_time));
        Ok(timeline)
    }

    async fn video_events(&self, video_id: &str) -> Result<Vec<VideoEvent>> {
        self.check_failure()?;

        let events = self.events.lock();
        let mut videos: Vec<VideoEvent> = events
            .iter()
            .filter_map(|e| match e {
                CanonicalEvent::Video(v) if v.video_id == video_id => Some(v.clone()),
                _ => None,
            })
            .collect();

        videos.sort_by(|a, b| a.video_time.total_cmp(&b.video_time));
        Ok(videos)
    }

    async fn course_structure(&self, course_code: &str) -> Result<Option<CourseStructure>> {
        self.check_failure()?;
        Ok(self.structures.lock().get(course_code).cloned())
    }

    async fn course_codes_with_structure(&self) -> Result<Vec<String>> {
        self.check_failure()?;
        let mut codes: Vec<String> = self.structures.lock().keys().cloned().collect();
        codes.sort();
        Ok(codes)
    }
}

#[async_trait]
impl EventSink for MockEventStore {
    async fn insert_events(&self, events: Vec<CanonicalEvent>) -> Result<usize> {
        self.check_failure()?;
        let count = events.len();
        self.events.lock().extend(events);
        Ok(count)
    }

    async fn insert_course_structure(&self, structure: CourseStructure) -> Result<()> {
        self.check_failure()?;
        self.structures
            .lock()
            .insert(structure.course_code.clone(), structure);
        Ok(())
    }
}

/// Log source replaying queued batches of raw payloads.
pub struct MockLogSource {
    family: EventFamily,
    topic: String,
    batches: Mutex<VecDeque<Vec<LogRecord>>>,
    next_offset: Mutex<i64>,
    committed: Mutex<Vec<Offset>>,
}

impl MockLogSource {
    pub fn new(family: EventFamily) -> Self {
        Self {
            family,
            topic: redpanda::TopicNames::default().topic_for(family).to_string(),
            batches: Mutex::new(VecDeque::new()),
            next_offset: Mutex::new(0),
            committed: Mutex::new(Vec::new()),
        }
    }

    /// Queues one batch of raw payloads, assigning consecutive offsets.
    pub fn push_batch<I, P>(&self, payloads: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<Vec<u8>>,
    {
        let mut next = self.next_offset.lock();
        let batch = payloads
            .into_iter()
            .map(|payload| {
                let record = LogRecord {
                    offset: *next,
                    payload: payload.into(),
                };
                *next += 1;
                record
            })
            .collect();
        self.batches.lock().push_back(batch);
    }

    pub fn committed(&self) -> Vec<Offset> {
        self.committed.lock().clone()
    }

    pub fn pending_batches(&self) -> usize {
        self.batches.lock().len()
    }
}

#[async_trait]
impl LogSource for MockLogSource {
    fn family(&self) -> EventFamily {
        self.family
    }

    fn topic(&self) -> &str {
        &self.topic
    }

    async fn fetch_batch(&self) -> Result<(Vec<LogRecord>, Option<Offset>)> {
        let batch = self.batches.lock().pop_front().unwrap_or_default();
        let offset = batch.last().map(|r| Offset {
            partition: 0,
            offset: r.offset + 1,
        });
        Ok((batch, offset))
    }

    async fn commit(&self, offset: Offset) -> Result<()> {
        self.committed.lock().push(offset);
        Ok(())
    }

    async fn reset_connection(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics_core::{EventHeader, VideoEventKind};

    fn video(username: &str, video_id: &str, time: f64) -> CanonicalEvent {
        CanonicalEvent::Video(VideoEvent {
            header: EventHeader {
                event_time: "2019-05-06T10:00:00+00:00".into(),
                username: username.into(),
                course_id: "course-v1:org+CS101+2024".into(),
                event_type: "play_video".into(),
            },
            video_id: video_id.into(),
            video_time: time,
            kind: VideoEventKind::Play,
        })
    }

    #[tokio::test]
    async fn test_unique_values_keep_first_seen_order() {
        let store = MockEventStore::new();
        store
            .insert_events(vec![video("bob", "v1", 0.0), video("alice", "v1", 1.0), video("bob", "v2", 2.0)])
            .await
            .unwrap();

        let users = store
            .unique_field_values(EventIndex::Video, EventField::Username)
            .await
            .unwrap();
        assert_eq!(users, vec!["bob", "alice"]);
    }

    #[tokio::test]
    async fn test_failure_mode() {
        let store = MockEventStore::new();
        store.set_should_fail(true);
        assert!(store.insert_events(vec![video("bob", "v1", 0.0)]).await.is_err());
        store.set_should_fail(false);
        assert_eq!(store.insert_events(vec![video("bob", "v1", 0.0)]).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_log_source_assigns_offsets() {
        let source = MockLogSource::new(EventFamily::Video);
        source.push_batch(["a", "b"]);
        source.push_batch(["c"]);

        let (first, offset) = source.fetch_batch().await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(offset.unwrap().offset, 2);

        let (second, offset) = source.fetch_batch().await.unwrap();
        assert_eq!(second[0].offset, 2);
        assert_eq!(offset.unwrap().offset, 3);
        assert_eq!(source.topic(), "VideoEvents");
    }
}
