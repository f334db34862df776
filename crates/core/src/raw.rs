//! Raw tracking-log records as they arrive from the log stream.
//!
//! A record is validated once into a [`RawLog`] (a JSON object) and then
//! read through the typed accessors of [`FieldSource`]. Accessors report
//! absent fields as [`ParseError::MissingField`] and mistyped fields as
//! [`ParseError::WrongFieldType`], using dotted paths (`event.id`).

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ParseError;
use crate::events::{EventHeader, LogEventType};
use crate::limits::MAX_LOG_SIZE_BYTES;

/// Typed read access to a JSON object.
pub trait FieldSource {
    fn fields(&self) -> &Map<String, Value>;

    /// Dotted path of this object inside the record, empty at the top level.
    fn path(&self) -> &str;

    fn qualified(&self, name: &str) -> String {
        if self.path().is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.path(), name)
        }
    }

    /// Looks up a field. JSON `null` counts as absent.
    fn raw_field(&self, name: &str) -> Option<&Value> {
        self.fields().get(name).filter(|value| !value.is_null())
    }

    fn opt_str_field(&self, name: &str) -> Result<Option<&str>, ParseError> {
        match self.raw_field(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(ParseError::wrong_type(self.qualified(name))),
        }
    }

    fn str_field(&self, name: &str) -> Result<&str, ParseError> {
        self.opt_str_field(name)?
            .ok_or_else(|| ParseError::missing(self.qualified(name)))
    }

    fn opt_f64_field(&self, name: &str) -> Result<Option<f64>, ParseError> {
        match self.raw_field(name) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_f64()
                .map(Some)
                .ok_or_else(|| ParseError::wrong_type(self.qualified(name))),
            Some(_) => Err(ParseError::wrong_type(self.qualified(name))),
        }
    }

    fn f64_field(&self, name: &str) -> Result<f64, ParseError> {
        self.opt_f64_field(name)?
            .ok_or_else(|| ParseError::missing(self.qualified(name)))
    }

    fn i64_field(&self, name: &str) -> Result<i64, ParseError> {
        match self.raw_field(name) {
            None => Err(ParseError::missing(self.qualified(name))),
            Some(Value::Number(n)) => n
                .as_i64()
                .ok_or_else(|| ParseError::wrong_type(self.qualified(name))),
            Some(_) => Err(ParseError::wrong_type(self.qualified(name))),
        }
    }

    /// Reads a nested object.
    ///
    /// Browser-emitted logs carry the payload as a string holding a JSON
    /// object; both encodings are accepted.
    fn object_field(&self, name: &str) -> Result<RawObject, ParseError> {
        let path = self.qualified(name);
        match self.raw_field(name) {
            None => Err(ParseError::missing(path)),
            Some(Value::Object(fields)) => Ok(RawObject::new(path, fields.clone())),
            Some(Value::String(encoded)) => match serde_json::from_str::<Value>(encoded) {
                Ok(Value::Object(fields)) => Ok(RawObject::new(path, fields)),
                _ => Err(ParseError::wrong_type(path)),
            },
            Some(_) => Err(ParseError::wrong_type(path)),
        }
    }
}

/// A nested object of a raw record, such as the `event` payload.
#[derive(Debug, Clone)]
pub struct RawObject {
    path: String,
    fields: Map<String, Value>,
}

impl RawObject {
    pub fn new(path: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            path: path.into(),
            fields,
        }
    }
}

impl FieldSource for RawObject {
    fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    fn path(&self) -> &str {
        &self.path
    }
}

/// A raw tracking-log record, known to be a JSON object.
#[derive(Debug, Clone)]
pub struct RawLog {
    fields: Map<String, Value>,
}

impl RawLog {
    /// Validates raw bytes into a record.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ParseError> {
        if bytes.len() > MAX_LOG_SIZE_BYTES {
            return Err(ParseError::Malformed(format!(
                "log {}KB exceeds {}KB limit",
                bytes.len() / 1024,
                MAX_LOG_SIZE_BYTES / 1024
            )));
        }

        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(fields)) => Ok(Self { fields }),
            Ok(other) => Err(ParseError::Malformed(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
            Err(e) => Err(ParseError::Malformed(e.to_string())),
        }
    }

    /// The raw `event_type` tag.
    pub fn event_type(&self) -> Result<&str, ParseError> {
        self.str_field("event_type")
    }

    /// Resolves the `event_type` tag against the dispatch table.
    pub fn log_event_type(&self) -> Result<LogEventType, ParseError> {
        let raw = self.event_type()?;
        LogEventType::from_raw(raw).ok_or_else(|| ParseError::UnknownEventType(raw.to_string()))
    }

    /// Course ID from `context.course_id`, empty when the log has no context.
    pub fn course_id(&self) -> Result<String, ParseError> {
        if self.raw_field("context").is_none() {
            return Ok(String::new());
        }
        let context = self.object_field("context")?;
        Ok(context
            .opt_str_field("course_id")?
            .unwrap_or_default()
            .to_string())
    }

    /// Builds the validated header shared by every family.
    pub fn header(&self, event_type: LogEventType) -> Result<EventHeader, ParseError> {
        EventHeader {
            event_time: self.str_field("time")?.to_string(),
            username: self.str_field("username")?.to_string(),
            course_id: self.course_id()?,
            event_type: event_type.as_str().to_string(),
        }
        .validated()
    }

    /// The `event` payload object.
    pub fn payload(&self) -> Result<RawObject, ParseError> {
        self.object_field("event")
    }

    /// Decodes the record into a strongly shaped type.
    pub fn decode<T: for<'de> Deserialize<'de>>(&self) -> Option<T> {
        serde_json::from_value(Value::Object(self.fields.clone())).ok()
    }
}

impl FieldSource for RawLog {
    fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    fn path(&self) -> &str {
        ""
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Course context attached by the LMS.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogContext {
    #[serde(default)]
    pub course_id: Option<String>,
}

/// Strongly shaped video log (`play_video`, `pause_video`, `stop_video`,
/// `seek_video`) with an object payload.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoLog {
    pub username: String,
    pub event_type: String,
    pub time: String,
    pub event: VideoPayload,
    #[serde(default)]
    pub context: Option<LogContext>,
}

/// Payload of a [`VideoLog`].
#[derive(Debug, Clone, Deserialize)]
pub struct VideoPayload {
    pub id: String,
    #[serde(rename = "currentTime", default)]
    pub current_time: Option<f64>,
    #[serde(default)]
    pub new_time: Option<f64>,
}
