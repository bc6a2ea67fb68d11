//! Course endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use campusdb_core::{Course, CourseDraft, CourseView};

use super::parse_id;
use crate::error::AppError;
use crate::json::MessageResponse;
use crate::AppState;

/// Course routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses).post(create_course))
        .route(
            "/courses/:id",
            get(get_course)
                .patch(patch_course)
                .put(replace_course)
                .delete(delete_course),
        )
}

/// List courses with rosters expanded to brief summaries.
async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<CourseView>>, AppError> {
    Ok(Json(state.registrar.list_courses()?))
}

/// Fetch one course with its roster expanded.
async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CourseView>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(state.registrar.get_course(&id)?))
}

/// Create a course.
async fn create_course(
    State(state): State<AppState>,
    Json(draft): Json<CourseDraft>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    let course = state.registrar.create_course(&draft)?;
    Ok((StatusCode::CREATED, Json(course)))
}

/// Partially update a course.
async fn patch_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<CourseDraft>,
) -> Result<Json<Course>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(state.registrar.patch_course(&id, &patch)?))
}

/// Fully replace a course; every core field must be present.
async fn replace_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<CourseDraft>,
) -> Result<Json<Course>, AppError> {
    let id = parse_id(&id)?;
    if draft.title.is_none()
        || draft.description.is_none()
        || draft.duration.is_none()
        || draft.instructor.is_none()
    {
        return Err(AppError::BadRequest(
            "replace requires every field: title, description, duration, instructor".to_string(),
        ));
    }
    Ok(Json(state.registrar.replace_course(&id, &draft)?))
}

/// Delete a course, cascading its removal from every student.
async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&id)?;
    let touched = state.registrar.delete_course(&id)?;
    Ok(Json(MessageResponse::new(format!(
        "course deleted; removed from {} student(s)",
        touched
    ))))
}
