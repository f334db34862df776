//! Curve builders and the store-backed analyser.

mod route;
mod watching;

pub use route::{route_curve, union_usernames};
pub use watching::watching_curve;

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::course::{course_code_from_course_id, OrdinalIndex};
use crate::curve::{RouteCurve, WatchingCurve};
use crate::error::{Error, Result};
use crate::store::{EventField, EventIndex, EventStore};

/// Answers analysis queries from freshly fetched store data.
#[derive(Clone)]
pub struct Analyser {
    store: Arc<dyn EventStore>,
}

impl Analyser {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn EventStore> {
        &self.store
    }

    /// One route curve per user with video or problem activity in the course.
    pub async fn course_users_route(&self, course_id: &str) -> Result<Vec<RouteCurve>> {
        let course_code = course_code_from_course_id(course_id)?;
        let structure = self
            .store
            .course_structure(course_code)
            .await?
            .ok_or_else(|| Error::CourseStructureNotFound(course_code.to_string()))?;
        let index = OrdinalIndex::build(&structure);

        let video_users = self.course_usernames(EventIndex::Video, course_id).await?;
        let problem_users = self.course_usernames(EventIndex::Problem, course_id).await?;
        let usernames = union_usernames(video_users, problem_users);

        debug!(
            course_id = %course_id,
            users = usernames.len(),
            items = index.len(),
            "Building course routes"
        );

        let mut curves = Vec::with_capacity(usernames.len());
        for username in &usernames {
            let timeline = self.store.user_timeline_events(username, course_id).await?;
            curves.push(route_curve(&timeline, &index));
        }
        Ok(curves)
    }

    /// Concurrent watchers over video time.
    pub async fn video_watching_curve(&self, video_id: &str) -> Result<WatchingCurve> {
        let events = self.store.video_events(video_id).await?;
        watching_curve(&events).ok_or_else(|| Error::NoEventsForVideo(video_id.to_string()))
    }

    /// Course IDs seen in video or problem events whose course has a stored structure.
    pub async fn course_ids_with_logs_and_structure(&self) -> Result<Vec<String>> {
        let with_structure: HashSet<String> = self
            .store
            .course_codes_with_structure()
            .await?
            .into_iter()
            .collect();

        let mut course_ids = self
            .store
            .unique_field_values(EventIndex::Video, EventField::CourseId)
            .await?;
        course_ids.extend(
            self.store
                .unique_field_values(EventIndex::Problem, EventField::CourseId)
                .await?,
        );

        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for course_id in course_ids {
            if course_id.is_empty() || seen.contains(&course_id) {
                continue;
            }
            match course_code_from_course_id(&course_id) {
                Ok(code) if with_structure.contains(code) => {
                    seen.insert(course_id.clone());
                    result.push(course_id);
                }
                Ok(_) => {}
                Err(_) => {
                    warn!(course_id = %course_id, "Skipping events with malformed course id");
                }
            }
        }
        Ok(result)
    }

    /// Unique video IDs with events in the course.
    pub async fn course_video_ids(&self, course_id: &str) -> Result<Vec<String>> {
        self.store
            .unique_field_values_filtered(
                EventIndex::Video,
                EventField::VideoId,
                EventField::CourseId,
                course_id,
            )
            .await
    }

    async fn course_usernames(&self, index: EventIndex, course_id: &str) -> Result<Vec<String>> {
        self.store
            .unique_field_values_filtered(index, EventField::Username, EventField::CourseId, course_id)
            .await
    }
}
