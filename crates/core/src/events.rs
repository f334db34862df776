//! Canonical event model.
//!
//! Every raw tracking-log record that survives normalization becomes one
//! [`CanonicalEvent`]. Events are immutable once built.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;
use validator::Validate;

use crate::error::ParseError;

/// Event family. Each family has its own log topic and storage table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventFamily {
    Video,
    Problem,
    Sequential,
    Link,
    Bookmark,
}

impl EventFamily {
    pub const ALL: [EventFamily; 5] = [
        Self::Video,
        Self::Problem,
        Self::Sequential,
        Self::Link,
        Self::Bookmark,
    ];

    /// Returns the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Problem => "problem",
            Self::Sequential => "sequential",
            Self::Link => "link",
            Self::Bookmark => "bookmark",
        }
    }
}

/// Raw `event_type` values understood by the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogEventType {
    PlayVideo,
    PauseVideo,
    StopVideo,
    SeekVideo,
    ProblemSubmitted,
    ProblemShow,
    ShowAnswer,
    SeqGoto,
    SeqNext,
    SeqPrev,
    LinkClicked,
    BookmarkAdded,
    BookmarkRemoved,
}

/// Dispatch table from raw tag to event type, built once.
static LOG_EVENT_TYPES: LazyLock<HashMap<&'static str, LogEventType>> = LazyLock::new(|| {
    LogEventType::ALL
        .iter()
        .map(|event_type| (event_type.as_str(), *event_type))
        .collect()
});

impl LogEventType {
    pub const ALL: [LogEventType; 13] = [
        Self::PlayVideo,
        Self::PauseVideo,
        Self::StopVideo,
        Self::SeekVideo,
        Self::ProblemSubmitted,
        Self::ProblemShow,
        Self::ShowAnswer,
        Self::SeqGoto,
        Self::SeqNext,
        Self::SeqPrev,
        Self::LinkClicked,
        Self::BookmarkAdded,
        Self::BookmarkRemoved,
    ];

    /// Returns the raw tag as it appears in tracking logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlayVideo => "play_video",
            Self::PauseVideo => "pause_video",
            Self::StopVideo => "stop_video",
            Self::SeekVideo => "seek_video",
            Self::ProblemSubmitted => "edx.grades.problem.submitted",
            Self::ProblemShow => "problem_show",
            Self::ShowAnswer => "showanswer",
            Self::SeqGoto => "seq_goto",
            Self::SeqNext => "seq_next",
            Self::SeqPrev => "seq_prev",
            Self::LinkClicked => "edx.ui.lms.link_clicked",
            Self::BookmarkAdded => "edx.bookmark.added",
            Self::BookmarkRemoved => "edx.bookmark.removed",
        }
    }

    /// Family the event type belongs to.
    pub fn family(&self) -> EventFamily {
        match self {
            Self::PlayVideo | Self::PauseVideo | Self::StopVideo | Self::SeekVideo => {
                EventFamily::Video
            }
            Self::ProblemSubmitted | Self::ProblemShow | Self::ShowAnswer => EventFamily::Problem,
            Self::SeqGoto | Self::SeqNext | Self::SeqPrev => EventFamily::Sequential,
            Self::LinkClicked => EventFamily::Link,
            Self::BookmarkAdded | Self::BookmarkRemoved => EventFamily::Bookmark,
        }
    }

    /// Resolves a raw tag, `None` for tags outside the known set.
    pub fn from_raw(raw: &str) -> Option<Self> {
        LOG_EVENT_TYPES.get(raw).copied()
    }
}

/// Video event classification used by the watching curve.
///
/// `Pause` covers pause, stop and seek: a seek carries no information
/// that the following play event does not repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoEventKind {
    Play,
    Pause,
}

impl VideoEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Pause => "pause",
        }
    }

    /// Change in concurrent watchers caused by one event of this kind.
    pub fn watcher_delta(&self) -> i64 {
        match self {
            Self::Play => 1,
            Self::Pause => -1,
        }
    }
}

/// Fields every canonical event carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct EventHeader {
    #[validate(length(min = 1))]
    pub event_time: String,
    #[validate(length(min = 1))]
    pub username: String,
    /// Empty when the log carried no course context.
    #[serde(default)]
    pub course_id: String,
    /// Raw subtype tag, kept for diagnostics.
    pub event_type: String,
}

impl EventHeader {
    /// Rejects headers with empty identifying fields.
    pub fn validated(self) -> Result<Self, ParseError> {
        self.validate().map_err(|errors| {
            let field = errors
                .field_errors()
                .keys()
                .next()
                .map(|name| name.to_string())
                .unwrap_or_else(|| "header".to_string());
            ParseError::MissingField(field)
        })?;
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoEvent {
    #[serde(flatten)]
    pub header: EventHeader,
    pub video_id: String,
    /// Position in the video, seconds.
    pub video_time: f64,
    pub kind: VideoEventKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemEvent {
    #[serde(flatten)]
    pub header: EventHeader,
    pub problem_id: String,
    pub weighted_earned: f64,
    pub weighted_possible: f64,
}

/// Move between positions of a sequential unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequentialEvent {
    #[serde(flatten)]
    pub header: EventHeader,
    pub old: i64,
    pub new: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEvent {
    #[serde(flatten)]
    pub header: EventHeader,
    pub current_url: String,
    pub target_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkEvent {
    #[serde(flatten)]
    pub header: EventHeader,
    pub item_id: String,
    /// `true` when the bookmark was added, `false` when removed.
    pub is_added: bool,
}

/// A normalized event of any family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "lowercase")]
pub enum CanonicalEvent {
    Video(VideoEvent),
    Problem(ProblemEvent),
    Sequential(SequentialEvent),
    Link(LinkEvent),
    Bookmark(BookmarkEvent),
}

impl CanonicalEvent {
    pub fn header(&self) -> &EventHeader {
        match self {
            Self::Video(e) => &e.header,
            Self::Problem(e) => &e.header,
            Self::Sequential(e) => &e.header,
            Self::Link(e) => &e.header,
            Self::Bookmark(e) => &e.header,
        }
    }

    pub fn family(&self) -> EventFamily {
        match self {
            Self::Video(_) => EventFamily::Video,
            Self::Problem(_) => EventFamily::Problem,
            Self::Sequential(_) => EventFamily::Sequential,
            Self::Link(_) => EventFamily::Link,
            Self::Bookmark(_) => EventFamily::Bookmark,
        }
    }

    pub fn username(&self) -> &str {
        &self.header().username
    }

    pub fn event_time(&self) -> &str {
        &self.header().event_time
    }
}
