//! API routes.

pub mod analysis;
pub mod health;
pub mod structures;

use analytics_core::limits::MAX_COURSE_STRUCTURE_BYTES;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::state::AppState;

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/course-routes", get(analysis::course_routes_handler))
        .route("/users-watchings", get(analysis::users_watchings_handler))
        .route(
            "/course-ids-with-logs-and-structs",
            get(analysis::course_ids_handler),
        )
        .route("/video-ids-by-course", get(analysis::video_ids_handler))
        .route("/course-structures", post(structures::upload_structure_handler))
        .route("/health", get(health::health_handler))
        .route("/health/ready", get(health::ready_handler))
        .route("/health/live", get(health::live_handler))
        .route("/metrics", get(health::metrics_handler))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_COURSE_STRUCTURE_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
