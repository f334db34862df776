use crate::error::ParseError;
use crate::events::{EventFamily, EventHeader, LogEventType, VideoEvent, VideoEventKind};
use crate::raw::{FieldSource, RawLog, RawObject, VideoLog};

use super::expect_family;

/// Normalizes a `play_video`, `pause_video`, `stop_video` or `seek_video` record.
pub fn normalize_video(bytes: &[u8]) -> Result<VideoEvent, ParseError> {
    let (raw, event_type) = expect_family(bytes, EventFamily::Video)?;
    from_raw(&raw, event_type)
}

/// Payload fields read from either encoding. Times stay unset until the
/// event type says which one is required.
#[derive(Debug, Default)]
struct VideoFields {
    video_id: String,
    current_time: Option<f64>,
    new_time: Option<f64>,
}

pub(super) fn from_raw(raw: &RawLog, event_type: LogEventType) -> Result<VideoEvent, ParseError> {
    let (header, fields) = match raw.decode::<VideoLog>() {
        Some(log) => typed_fields(log, event_type)?,
        None => (raw.header(event_type)?, generic_fields(&raw.payload()?, event_type)?),
    };

    match event_type {
        LogEventType::PlayVideo => play(header, fields),
        LogEventType::PauseVideo | LogEventType::StopVideo => Ok(VideoEvent {
            kind: VideoEventKind::Pause,
            ..play(header, fields)?
        }),
        LogEventType::SeekVideo => {
            let video_time = fields
                .new_time
                .ok_or_else(|| ParseError::missing("event.new_time"))?;
            Ok(VideoEvent {
                header,
                video_id: fields.video_id,
                video_time,
                kind: VideoEventKind::Pause,
            })
        }
        other => Err(ParseError::UnknownEventType(other.as_str().to_string())),
    }
}

fn play(header: EventHeader, fields: VideoFields) -> Result<VideoEvent, ParseError> {
    let video_time = fields
        .current_time
        .ok_or_else(|| ParseError::missing("event.currentTime"))?;
    Ok(VideoEvent {
        header,
        video_id: fields.video_id,
        video_time,
        kind: VideoEventKind::Play,
    })
}

/// Strongly shaped logs: everything already decoded by serde.
fn typed_fields(
    log: VideoLog,
    event_type: LogEventType,
) -> Result<(EventHeader, VideoFields), ParseError> {
    let header = EventHeader {
        event_time: log.time,
        username: log.username,
        course_id: log.context.and_then(|c| c.course_id).unwrap_or_default(),
        event_type: event_type.as_str().to_string(),
    }
    .validated()?;

    let fields = VideoFields {
        video_id: log.event.id,
        current_time: log.event.current_time,
        new_time: log.event.new_time,
    };
    Ok((header, fields))
}

/// Generic maps: only the time field the event type needs is read, so a
/// field error always names the field that was actually required.
fn generic_fields(event: &RawObject, event_type: LogEventType) -> Result<VideoFields, ParseError> {
    let mut fields = VideoFields {
        video_id: event.str_field("id")?.to_string(),
        ..Default::default()
    };
    match event_type {
        LogEventType::SeekVideo => fields.new_time = Some(event.f64_field("new_time")?),
        _ => fields.current_time = Some(event.f64_field("currentTime")?),
    }
    Ok(fields)
}
