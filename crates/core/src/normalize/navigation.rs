//! Flat-payload families: sequential moves, link clicks and bookmarks.

use crate::error::ParseError;
use crate::events::{
    BookmarkEvent, EventFamily, LinkEvent, LogEventType, SequentialEvent,
};
use crate::raw::{FieldSource, RawLog};

use super::expect_family;

pub fn normalize_sequential(bytes: &[u8]) -> Result<SequentialEvent, ParseError> {
    let (raw, event_type) = expect_family(bytes, EventFamily::Sequential)?;
    sequential_from_raw(&raw, event_type)
}

pub fn normalize_link(bytes: &[u8]) -> Result<LinkEvent, ParseError> {
    let (raw, event_type) = expect_family(bytes, EventFamily::Link)?;
    link_from_raw(&raw, event_type)
}

pub fn normalize_bookmark(bytes: &[u8]) -> Result<BookmarkEvent, ParseError> {
    let (raw, event_type) = expect_family(bytes, EventFamily::Bookmark)?;
    bookmark_from_raw(&raw, event_type)
}

pub(super) fn sequential_from_raw(
    raw: &RawLog,
    event_type: LogEventType,
) -> Result<SequentialEvent, ParseError> {
    let header = raw.header(event_type)?;
    let event = raw.payload()?;
    Ok(SequentialEvent {
        header,
        old: event.i64_field("old")?,
        new: event.i64_field("new")?,
    })
}

pub(super) fn link_from_raw(raw: &RawLog, event_type: LogEventType) -> Result<LinkEvent, ParseError> {
    let header = raw.header(event_type)?;
    let event = raw.payload()?;
    Ok(LinkEvent {
        header,
        current_url: event.str_field("current_url")?.to_string(),
        target_url: event.str_field("target_url")?.to_string(),
    })
}

pub(super) fn bookmark_from_raw(
    raw: &RawLog,
    event_type: LogEventType,
) -> Result<BookmarkEvent, ParseError> {
    let header = raw.header(event_type)?;
    let event = raw.payload()?;
    Ok(BookmarkEvent {
        header,
        item_id: event.str_field("component_usage_id")?.to_string(),
        is_added: event_type == LogEventType::BookmarkAdded,
    })
}
