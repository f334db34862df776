//! Size limits for raw logs and uploaded course structures.
//!
//! The `#[validate]` derive macro requires literal values in attributes,
//! so identifier limits are duplicated there. Keep both in sync when modifying.

/// Maximum raw tracking-log record size in bytes (64KB).
///
/// Tracking logs are a few hundred bytes. Larger records are dropped at
/// the normalizer boundary.
pub const MAX_LOG_SIZE_BYTES: usize = 64 * 1024;

/// Maximum uploaded course structure size in bytes (8MB).
pub const MAX_COURSE_STRUCTURE_BYTES: usize = 8 * 1024 * 1024;

/// Maximum length of a course, video or user identifier in queries.
pub const MAX_ID_LEN: usize = 512;
