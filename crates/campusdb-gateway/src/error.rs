//! Error handling for the gateway.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use campusdb_core::Error as CoreError;
use serde::Serialize;

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Internal server error.
    Internal(String),
    /// Bad request.
    BadRequest(String),
    /// Not found.
    NotFound(String),
}

/// Error response body.
#[derive(Serialize)]
pub struct ErrorResponse {
    /// Human-readable summary.
    pub message: String,
    /// Error detail.
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, error) = match self {
            AppError::Internal(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error",
                detail,
            ),
            AppError::BadRequest(detail) => (StatusCode::BAD_REQUEST, "bad request", detail),
            AppError::NotFound(detail) => (StatusCode::NOT_FOUND, "not found", detail),
        };

        let body = ErrorResponse {
            message: message.to_string(),
            error,
        };

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::StudentNotFound(_) | CoreError::CourseNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            CoreError::AlreadyEnrolled { .. }
            | CoreError::Validation(_)
            | CoreError::InvalidId(_) => AppError::BadRequest(err.to_string()),
            CoreError::Storage(_)
            | CoreError::Serialization(_)
            | CoreError::Deserialization(_) => AppError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campusdb_core::{EntityId, FieldError};

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_core_errors_map_to_statuses() {
        let id = EntityId::generate();

        assert_eq!(
            status_of(CoreError::StudentNotFound(id).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(CoreError::CourseNotFound(id).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(
                CoreError::AlreadyEnrolled {
                    student: id,
                    course: id,
                }
                .into()
            ),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CoreError::Validation(vec![FieldError::new("email", "is required")]).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CoreError::Serialization("boom".to_string()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
