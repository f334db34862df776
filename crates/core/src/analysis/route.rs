use tracing::warn;

use crate::course::OrdinalIndex;
use crate::curve::RouteCurve;
use crate::store::TimelineEntry;

/// Builds one user's route through the course.
///
/// Each point is (position of the visited item, action number). Repeated
/// interactions with the same item collapse into one action. Items outside
/// the structure are skipped without consuming an action number.
pub fn route_curve(timeline: &[TimelineEntry], index: &OrdinalIndex) -> RouteCurve {
    let mut curve = RouteCurve::new();
    let mut action_number = 0;
    let mut previous_item: Option<&str> = None;

    for entry in timeline {
        let item_id = entry.item.id();
        if previous_item == Some(item_id) {
            continue;
        }

        match index.position(item_id) {
            Ok(position) => {
                curve.push(position, action_number);
                action_number += 1;
                previous_item = Some(item_id);
            }
            Err(e) => {
                warn!(item_id = %item_id, error = %e, "Skipping item without a course position");
            }
        }
    }

    curve
}

/// Usernames in first-seen order, video users before problem users.
pub fn union_usernames(video_users: Vec<String>, problem_users: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    video_users
        .into_iter()
        .chain(problem_users)
        .filter(|username| seen.insert(username.clone()))
        .collect()
}
