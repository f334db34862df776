//! Unified error types for the analytics engine.
//!
//! Error codes:
//! - PARSE_001: A raw log record could not be normalized
//! - FORMAT_001: Course ID is not in `course-v1:org+Code+Run` notation
//! - LOOKUP_001-003: Structure or event lookups that found nothing
//! - STORE_001: Event store failure
//! - VALID_001: Request validation failure

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure to turn one raw log record into a canonical event.
///
/// Field names are dotted paths into the raw record (`event.id`,
/// `context.course_id`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("field has wrong type: {0}")]
    WrongFieldType(String),

    #[error("unknown event type: {0}")]
    UnknownEventType(String),

    #[error("invalid identifier format: {0}")]
    InvalidIdentifierFormat(String),

    #[error("malformed log record: {0}")]
    Malformed(String),
}

impl ParseError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    pub fn wrong_type(field: impl Into<String>) -> Self {
        Self::WrongFieldType(field.into())
    }
}

/// Lookup error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupErrorCode {
    /// LOOKUP_001: Item is not part of the course structure
    ItemNotInStructure,
    /// LOOKUP_002: No structure stored for the course code
    CourseStructureNotFound,
    /// LOOKUP_003: No events stored for the video
    NoEventsForVideo,
}

impl LookupErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ItemNotInStructure => "LOOKUP_001",
            Self::CourseStructureNotFound => "LOOKUP_002",
            Self::NoEventsForVideo => "LOOKUP_003",
        }
    }
}

/// Unified error type for the analytics engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("invalid course id format: {0}")]
    InvalidCourseIdFormat(String),

    /// Soft: route curves skip the point instead of failing.
    #[error("item {0} is not in the course structure")]
    ItemNotInStructure(String),

    #[error("no course structure found for course code {0}")]
    CourseStructureNotFound(String),

    #[error("no events found for video {0}")]
    NoEventsForVideo(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn invalid_course_id(course_id: impl Into<String>) -> Self {
        Self::InvalidCourseIdFormat(course_id.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the error only invalidates a single point of a curve.
    pub fn is_soft(&self) -> bool {
        matches!(self, Self::ItemNotInStructure(_))
    }

    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "PARSE_001",
            Self::InvalidCourseIdFormat(_) => "FORMAT_001",
            Self::ItemNotInStructure(_) => LookupErrorCode::ItemNotInStructure.code(),
            Self::CourseStructureNotFound(_) => LookupErrorCode::CourseStructureNotFound.code(),
            Self::NoEventsForVideo(_) => LookupErrorCode::NoEventsForVideo.code(),
            Self::Store(_) => "STORE_001",
            Self::Validation(_) => "VALID_001",
            Self::Serialization(_) | Self::Internal(_) => "INTERNAL_001",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Parse(_) => 400,
            Self::InvalidCourseIdFormat(_) => 400,
            Self::ItemNotInStructure(_) => 404,
            Self::CourseStructureNotFound(_) => 404,
            Self::NoEventsForVideo(_) => 404,
            Self::Store(_) => 502,
            Self::Validation(_) => 400,
            Self::Serialization(_) => 500,
            Self::Internal(_) => 500,
        }
    }
}
