//! Raw tracking-log and course-structure generators.

use analytics_core::{Chapter, ContentItem, CourseStructure, LibraryContent, Sequential, Vertical};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};

/// Course ID in the `course-v1:<org>+<code>+<run>` form.
pub fn course_id(code: &str) -> String {
    format!("course-v1:org+{}+2024", code)
}

/// Problem usage key whose last `@` segment is `problem_id`.
pub fn problem_block(code: &str, problem_id: &str) -> String {
    format!("block-v1:org+{}+2024+type@problem+block@{}", code, problem_id)
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2019, 5, 6, 10, 0, 0).unwrap()
}

/// Log timestamp `secs` seconds after a fixed base time.
pub fn log_time(secs: i64) -> String {
    (base_time() + Duration::seconds(secs)).to_rfc3339()
}

fn envelope(username: &str, course: &str, event_type: &str, event: Value, secs: i64) -> Value {
    json!({
        "username": username,
        "event_type": event_type,
        "time": log_time(secs),
        "event": event,
        "context": { "course_id": course },
    })
}

/// Video log; `video_time` becomes `currentTime` or, for seeks, `new_time`.
pub fn video_log(
    username: &str,
    course: &str,
    event_type: &str,
    video_id: &str,
    video_time: f64,
    secs: i64,
) -> Value {
    let event = if event_type == "seek_video" {
        json!({ "id": video_id, "old_time": 0.0, "new_time": video_time })
    } else {
        json!({ "id": video_id, "currentTime": video_time })
    };
    envelope(username, course, event_type, event, secs)
}

/// Graded submission with the problem usage key in `problem_id`.
pub fn problem_log(username: &str, course: &str, problem_id: &str, secs: i64) -> Value {
    let code = analytics_core::course::course_code_from_course_id(course).unwrap_or("CS101");
    envelope(
        username,
        course,
        "edx.grades.problem.submitted",
        json!({
            "problem_id": problem_block(code, problem_id),
            "weighted_earned": 1.0,
            "weighted_possible": 2.0,
        }),
        secs,
    )
}

pub fn sequential_log(username: &str, course: &str, old: i64, new: i64, secs: i64) -> Value {
    envelope(username, course, "seq_goto", json!({ "old": old, "new": new }), secs)
}

pub fn link_log(username: &str, course: &str, target_url: &str, secs: i64) -> Value {
    envelope(
        username,
        course,
        "edx.ui.lms.link_clicked",
        json!({ "current_url": "https://lms.example.com/courseware", "target_url": target_url }),
        secs,
    )
}

pub fn bookmark_log(username: &str, course: &str, item_id: &str, added: bool, secs: i64) -> Value {
    let event_type = if added {
        "edx.bookmark.added"
    } else {
        "edx.bookmark.removed"
    };
    envelope(
        username,
        course,
        event_type,
        json!({ "component_usage_id": item_id }),
        secs,
    )
}

/// Serialized payload as a consumer would read it from a topic.
pub fn payload(log: &Value) -> Vec<u8> {
    log.to_string().into_bytes()
}

/// Content leaf of a single-vertical course.
pub enum Item<'a> {
    Video(&'a str),
    Problem(&'a str),
    Library(&'a [&'a str]),
}

/// One chapter, one sequential, one vertical per item.
pub fn course_structure(code: &str, items: &[Item<'_>]) -> CourseStructure {
    let verticals = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let mut vertical = Vertical {
                url_name: format!("vertical{}", i),
                display_name: String::new(),
                videos: Vec::new(),
                problems: Vec::new(),
                library_contents: Vec::new(),
            };
            match item {
                Item::Video(id) => vertical.videos.push(ContentItem::new(*id)),
                Item::Problem(id) => vertical.problems.push(ContentItem::new(*id)),
                Item::Library(ids) => vertical.library_contents.push(LibraryContent {
                    url_name: format!("library{}", i),
                    display_name: String::new(),
                    problems: ids.iter().map(|id| ContentItem::new(*id)).collect(),
                }),
            }
            vertical
        })
        .collect();

    CourseStructure {
        course_code: code.to_string(),
        course_run: "2024".to_string(),
        display_name: format!("Course {}", code),
        chapters: vec![Chapter {
            url_name: "chapter1".to_string(),
            display_name: String::new(),
            sequentials: vec![Sequential {
                url_name: "sequential1".to_string(),
                display_name: String::new(),
                verticals,
            }],
        }],
    }
}
