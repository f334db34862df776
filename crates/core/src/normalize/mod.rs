//! Log normalizer: raw tracking-log bytes to [`CanonicalEvent`].
//!
//! Every function here is pure. Failures come back as [`ParseError`]
//! values and the caller decides whether to drop the record.

mod navigation;
mod problem;
mod video;

pub use navigation::{normalize_bookmark, normalize_link, normalize_sequential};
pub use problem::{normalize_problem, problem_id_from_block};
pub use video::normalize_video;

use crate::error::ParseError;
use crate::events::{CanonicalEvent, EventFamily, LogEventType};
use crate::raw::RawLog;

/// Normalizes a record of any family, dispatching on `event_type`.
pub fn normalize(bytes: &[u8]) -> Result<CanonicalEvent, ParseError> {
    let raw = RawLog::from_slice(bytes)?;
    let event_type = raw.log_event_type()?;
    from_raw(&raw, event_type)
}

/// Normalizes a record that must belong to `family`.
///
/// Used by ingest workers, where each topic carries a single family.
pub fn normalize_family(family: EventFamily, bytes: &[u8]) -> Result<CanonicalEvent, ParseError> {
    match family {
        EventFamily::Video => normalize_video(bytes).map(CanonicalEvent::Video),
        EventFamily::Problem => normalize_problem(bytes).map(CanonicalEvent::Problem),
        EventFamily::Sequential => normalize_sequential(bytes).map(CanonicalEvent::Sequential),
        EventFamily::Link => normalize_link(bytes).map(CanonicalEvent::Link),
        EventFamily::Bookmark => normalize_bookmark(bytes).map(CanonicalEvent::Bookmark),
    }
}

fn from_raw(raw: &RawLog, event_type: LogEventType) -> Result<CanonicalEvent, ParseError> {
    match event_type.family() {
        EventFamily::Video => video::from_raw(raw, event_type).map(CanonicalEvent::Video),
        EventFamily::Problem => problem::from_raw(raw, event_type).map(CanonicalEvent::Problem),
        EventFamily::Sequential => {
            navigation::sequential_from_raw(raw, event_type).map(CanonicalEvent::Sequential)
        }
        EventFamily::Link => navigation::link_from_raw(raw, event_type).map(CanonicalEvent::Link),
        EventFamily::Bookmark => {
            navigation::bookmark_from_raw(raw, event_type).map(CanonicalEvent::Bookmark)
        }
    }
}

/// Parses the record and resolves its event type, which must belong to `family`.
fn expect_family(bytes: &[u8], family: EventFamily) -> Result<(RawLog, LogEventType), ParseError> {
    let raw = RawLog::from_slice(bytes)?;
    let event_type = raw.log_event_type()?;
    if event_type.family() != family {
        return Err(ParseError::UnknownEventType(event_type.as_str().to_string()));
    }
    Ok((raw, event_type))
}
