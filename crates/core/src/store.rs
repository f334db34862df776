//! Storage seams: the read side used by the analyser and the write side
//! used by ingest workers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::course::CourseStructure;
use crate::error::Result;
use crate::events::{CanonicalEvent, EventFamily, VideoEvent};

/// Event collection a query runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventIndex {
    Video,
    Problem,
    Sequential,
    Link,
    Bookmark,
}

impl EventIndex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Problem => "problem",
            Self::Sequential => "sequential",
            Self::Link => "link",
            Self::Bookmark => "bookmark",
        }
    }

    /// Storage table backing the index.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Video => "video_events",
            Self::Problem => "problem_events",
            Self::Sequential => "sequential_events",
            Self::Link => "link_events",
            Self::Bookmark => "bookmark_events",
        }
    }

    /// Whether rows of this index carry `field`.
    pub fn has_field(&self, field: EventField) -> bool {
        match field {
            EventField::Username | EventField::CourseId | EventField::EventType => true,
            EventField::VideoId => *self == Self::Video,
            EventField::ProblemId => *self == Self::Problem,
        }
    }
}

impl From<EventFamily> for EventIndex {
    fn from(family: EventFamily) -> Self {
        match family {
            EventFamily::Video => Self::Video,
            EventFamily::Problem => Self::Problem,
            EventFamily::Sequential => Self::Sequential,
            EventFamily::Link => Self::Link,
            EventFamily::Bookmark => Self::Bookmark,
        }
    }
}

/// Queryable event field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventField {
    Username,
    CourseId,
    VideoId,
    ProblemId,
    EventType,
}

impl EventField {
    /// Storage column holding the field.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::CourseId => "course_id",
            Self::VideoId => "video_id",
            Self::ProblemId => "problem_id",
            Self::EventType => "event_type",
        }
    }
}

/// Content item a timeline entry refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum TimelineItem {
    Problem(String),
    Video(String),
}

impl TimelineItem {
    pub fn id(&self) -> &str {
        match self {
            Self::Problem(id) | Self::Video(id) => id,
        }
    }
}

/// One video or problem interaction of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub item: TimelineItem,
    pub event_time: String,
}

/// Read side of event storage.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Distinct values of `field` across the index, in first-seen order.
    async fn unique_field_values(&self, index: EventIndex, field: EventField)
        -> Result<Vec<String>>;

    /// Distinct values of `field` among rows where `filter_field = filter_value`.
    async fn unique_field_values_filtered(
        &self,
        index: EventIndex,
        field: EventField,
        filter_field: EventField,
        filter_value: &str,
    ) -> Result<Vec<String>>;

    /// The user's video and problem events in the course, by event time ascending.
    async fn user_timeline_events(
        &self,
        username: &str,
        course_id: &str,
    ) -> Result<Vec<TimelineEntry>>;

    /// All events of a video, by video time ascending.
    async fn video_events(&self, video_id: &str) -> Result<Vec<VideoEvent>>;

    async fn course_structure(&self, course_code: &str) -> Result<Option<CourseStructure>>;

    async fn course_codes_with_structure(&self) -> Result<Vec<String>>;
}

/// Write side of event storage.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Persists a batch, returning the number of events written.
    async fn insert_events(&self, events: Vec<CanonicalEvent>) -> Result<usize>;

    /// Stores a structure, replacing any earlier one with the same course code.
    async fn insert_course_structure(&self, structure: CourseStructure) -> Result<()>;
}
