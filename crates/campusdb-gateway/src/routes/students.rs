//! Student endpoints, including enrollment.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use campusdb_core::{Student, StudentDraft, StudentView};

use super::parse_id;
use crate::error::AppError;
use crate::json::EnrollmentResponse;
use crate::AppState;

/// Student routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/students", get(list_students).post(create_student))
        .route(
            "/students/:id",
            get(get_student)
                .patch(patch_student)
                .put(replace_student)
                .delete(delete_student),
        )
        .route(
            "/students/:student_id/courses/:course_id",
            axum::routing::post(enroll).delete(unenroll),
        )
}

/// List students with courses expanded to brief summaries.
async fn list_students(
    State(state): State<AppState>,
) -> Result<Json<Vec<StudentView>>, AppError> {
    Ok(Json(state.registrar.list_students()?))
}

/// Fetch one student with courses expanded, instructor included.
async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StudentView>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(state.registrar.get_student(&id)?))
}

/// Create a student.
async fn create_student(
    State(state): State<AppState>,
    Json(draft): Json<StudentDraft>,
) -> Result<(StatusCode, Json<Student>), AppError> {
    let student = state.registrar.create_student(&draft)?;
    Ok((StatusCode::CREATED, Json(student)))
}

/// Partially update a student.
async fn patch_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<StudentDraft>,
) -> Result<Json<Student>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(state.registrar.patch_student(&id, &patch)?))
}

/// Fully replace a student; every core field must be present.
async fn replace_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<StudentDraft>,
) -> Result<Json<Student>, AppError> {
    let id = parse_id(&id)?;
    if draft.full_name.is_none()
        || draft.email.is_none()
        || draft.field_of_study.is_none()
        || draft.year_of_enrollment.is_none()
    {
        return Err(AppError::BadRequest(
            "replace requires every field: fullName, email, fieldOfStudy, yearOfEnrollment"
                .to_string(),
        ));
    }
    Ok(Json(state.registrar.replace_student(&id, &draft)?))
}

/// Delete a student and clear it from every course roster.
async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    state.registrar.delete_student(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Enroll a student in a course.
async fn enroll(
    State(state): State<AppState>,
    Path((student_id, course_id)): Path<(String, String)>,
) -> Result<Json<EnrollmentResponse>, AppError> {
    let student_id = parse_id(&student_id)?;
    let course_id = parse_id(&course_id)?;
    let student = state.registrar.enroll(&student_id, &course_id)?;
    Ok(Json(EnrollmentResponse {
        message: "student enrolled in course".to_string(),
        student,
    }))
}

/// Remove an enrollment edge; removing an absent edge succeeds.
async fn unenroll(
    State(state): State<AppState>,
    Path((student_id, course_id)): Path<(String, String)>,
) -> Result<Json<EnrollmentResponse>, AppError> {
    let student_id = parse_id(&student_id)?;
    let course_id = parse_id(&course_id)?;
    let student = state.registrar.unenroll(&student_id, &course_id)?;
    Ok(Json(EnrollmentResponse {
        message: "student unenrolled from course".to_string(),
        student,
    }))
}
