use crate::error::ParseError;
use crate::events::{EventFamily, LogEventType, ProblemEvent};
use crate::raw::{FieldSource, RawLog};

use super::expect_family;

/// Normalizes a graded submission, `problem_show` or `showanswer` record.
pub fn normalize_problem(bytes: &[u8]) -> Result<ProblemEvent, ParseError> {
    let (raw, event_type) = expect_family(bytes, EventFamily::Problem)?;
    from_raw(&raw, event_type)
}

pub(super) fn from_raw(raw: &RawLog, event_type: LogEventType) -> Result<ProblemEvent, ParseError> {
    let header = raw.header(event_type)?;
    let event = raw.payload()?;

    // `problem` wins when set; older logs only carry `problem_id`.
    let block_id = match event.opt_str_field("problem")? {
        Some(problem) if !problem.is_empty() => problem,
        _ => event.str_field("problem_id")?,
    };
    let problem_id = problem_id_from_block(block_id)?;

    let (weighted_earned, weighted_possible) = if event_type == LogEventType::ProblemSubmitted {
        (
            event.f64_field("weighted_earned")?,
            event.f64_field("weighted_possible")?,
        )
    } else {
        (
            event.opt_f64_field("weighted_earned")?.unwrap_or(0.0),
            event.opt_f64_field("weighted_possible")?.unwrap_or(0.0),
        )
    };

    Ok(ProblemEvent {
        header,
        problem_id,
        weighted_earned,
        weighted_possible,
    })
}

/// Extracts the problem ID from a usage key such as
/// `block-v1:org+CS101+run+type@problem+block@prob17`.
pub fn problem_id_from_block(block_id: &str) -> Result<String, ParseError> {
    let segments: Vec<&str> = block_id.split('@').collect();
    match segments.as_slice() {
        [_, _, problem_id] => Ok((*problem_id).to_string()),
        _ => Err(ParseError::InvalidIdentifierFormat(block_id.to_string())),
    }
}
