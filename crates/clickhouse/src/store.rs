//! `EventStore` and `EventSink` backed by ClickHouse.

use crate::client::ClickHouseClient;
use crate::{insert, query};
use analytics_core::{
    CanonicalEvent, CourseStructure, EventField, EventIndex, EventSink, EventStore, Result,
    TimelineEntry, VideoEvent,
};
use async_trait::async_trait;

#[async_trait]
impl EventStore for ClickHouseClient {
    async fn unique_field_values(
        &self,
        index: EventIndex,
        field: EventField,
    ) -> Result<Vec<String>> {
        query::unique_field_values(self, index, field).await
    }

    async fn unique_field_values_filtered(
        &self,
        index: EventIndex,
        field: EventField,
        filter_field: EventField,
        filter_value: &str,
    ) -> Result<Vec<String>> {
        query::unique_field_values_filtered(self, index, field, filter_field, filter_value).await
    }

    async fn user_timeline_events(
        &self,
        username: &str,
        course_id: &str,
    ) -> Result<Vec<TimelineEntry>> {
        query::user_timeline_events(self, username, course_id).await
    }

    async fn video_events(&self, video_id: &str) -> Result<Vec<VideoEvent>> {
        query::video_events(self, video_id).await
    }

    async fn course_structure(&self, course_code: &str) -> Result<Option<CourseStructure>> {
        query::course_structure(self, course_code).await
    }

    async fn course_codes_with_structure(&self) -> Result<Vec<String>> {
        query::course_codes_with_structure(self).await
    }
}

#[async_trait]
impl EventSink for ClickHouseClient {
    async fn insert_events(&self, events: Vec<CanonicalEvent>) -> Result<usize> {
        insert::insert_events(self, events).await
    }

    async fn insert_course_structure(&self, structure: CourseStructure) -> Result<()> {
        insert::insert_course_structure(self, &structure).await
    }
}
