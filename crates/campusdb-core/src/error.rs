//! Core error types.

use serde::Serialize;
use thiserror::Error;

use crate::model::EntityId;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// API name of the offending field (camelCase).
    pub field: &'static str,
    /// Human-readable reason.
    pub reason: String,
}

impl FieldError {
    /// Create a new field error.
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Core service errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Storage layer error.
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// An id that is not 32 hex characters.
    #[error("invalid id: {0}")]
    InvalidId(String),

    /// Student record not found.
    #[error("student {0} not found")]
    StudentNotFound(EntityId),

    /// Course record not found.
    #[error("course {0} not found")]
    CourseNotFound(EntityId),

    /// The enrollment edge already exists.
    #[error("student {student} is already enrolled in course {course}")]
    AlreadyEnrolled {
        /// Student side of the edge.
        student: EntityId,
        /// Course side of the edge.
        course: EntityId,
    },

    /// One or more field rules were violated.
    #[error("validation failed: {}", join_fields(.0))]
    Validation(Vec<FieldError>),
}

/// Render field errors as a single line for Display.
fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{} {}", e.field, e.reason))
        .collect::<Vec<_>>()
        .join("; ")
}
