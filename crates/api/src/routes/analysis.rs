//! Curve and catalogue endpoints.

use analytics_core::{RouteCurve, WatchingCurve};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use std::future::Future;
use std::time::Instant;
use telemetry::metrics;
use tracing::{debug, warn};
use validator::Validate;

use crate::response::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CourseQuery {
    #[validate(length(min = 1, max = 512))]
    pub course: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VideoQuery {
    #[validate(length(min = 1, max = 512))]
    pub video_id: String,
}

/// Unwraps and validates a query string.
fn validated<T: Validate>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    let Query(query) = query?;
    query.validate()?;
    Ok(query)
}

/// Runs a curve computation, recording request count, latency and errors.
async fn measured<T>(
    name: &'static str,
    target: &str,
    work: impl Future<Output = analytics_core::Result<T>>,
) -> Result<T, ApiError> {
    let start = Instant::now();
    metrics().curve_requests.inc();

    let result = work.await;
    metrics().curve_latency_ms.observe_since(start);

    match result {
        Ok(value) => {
            debug!(
                curve = name,
                target = %target,
                latency_ms = %start.elapsed().as_millis(),
                "Curve computed"
            );
            Ok(value)
        }
        Err(e) => {
            metrics().curve_errors.inc();
            warn!(curve = name, target = %target, error = %e, "Curve request failed");
            Err(e.into())
        }
    }
}

/// GET /course-routes?course=<id> - One route curve per user of the course.
pub async fn course_routes_handler(
    State(state): State<AppState>,
    query: Result<Query<CourseQuery>, QueryRejection>,
) -> Result<Json<Vec<RouteCurve>>, ApiError> {
    let query = validated(query)?;
    let curves = measured(
        "route",
        &query.course,
        state.analyser.course_users_route(&query.course),
    )
    .await?;
    Ok(Json(curves))
}

/// GET /users-watchings?video_id=<id> - Concurrent viewers over video time.
pub async fn users_watchings_handler(
    State(state): State<AppState>,
    query: Result<Query<VideoQuery>, QueryRejection>,
) -> Result<Json<WatchingCurve>, ApiError> {
    let query = validated(query)?;
    let curve = measured(
        "watching",
        &query.video_id,
        state.analyser.video_watching_curve(&query.video_id),
    )
    .await?;
    Ok(Json(curve))
}

/// GET /course-ids-with-logs-and-structs
pub async fn course_ids_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, ApiError> {
    let ids = state.analyser.course_ids_with_logs_and_structure().await?;
    Ok(Json(ids))
}

/// GET /video-ids-by-course?course=<id>
pub async fn video_ids_handler(
    State(state): State<AppState>,
    query: Result<Query<CourseQuery>, QueryRejection>,
) -> Result<Json<Vec<String>>, ApiError> {
    let query = validated(query)?;
    let ids = state.analyser.course_video_ids(&query.course).await?;
    Ok(Json(ids))
}
