//! Course structure upload.

use analytics_core::{build_ordinal_index, CourseStructure};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::response::{ApiError, StructureStored};
use crate::state::AppState;

/// POST /course-structures - Stores a structure, replacing the previous
/// upload for the same course code.
pub async fn upload_structure_handler(
    State(state): State<AppState>,
    body: Result<Json<CourseStructure>, JsonRejection>,
) -> Result<(StatusCode, Json<StructureStored>), ApiError> {
    let Json(structure) = body?;
    let structure = structure.validated()?;

    let items = build_ordinal_index(&structure).len();
    let course_code = structure.course_code.clone();

    state.sink.insert_course_structure(structure).await?;

    info!(course_code = %course_code, items = items, "Course structure stored");

    Ok((StatusCode::CREATED, Json(StructureStored { course_code, items })))
}
