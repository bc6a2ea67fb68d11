//! JSON response types for the HTTP gateway.
//!
//! Request bodies deserialize straight into the core draft types
//! ([`campusdb_core::StudentDraft`], [`campusdb_core::CourseDraft`]).

use campusdb_core::{ReconcileReport, StudentView};
use serde::Serialize;

/// Plain `{message}` envelope.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable confirmation.
    pub message: String,
}

impl MessageResponse {
    /// Create a new message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Enrollment/unenrollment response: confirmation plus the refreshed view.
#[derive(Debug, Serialize)]
pub struct EnrollmentResponse {
    /// Human-readable confirmation.
    pub message: String,
    /// Student with courses expanded to full summaries.
    pub student: StudentView,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status.
    pub status: String,
    /// Gateway version.
    pub version: String,
    /// Stored student documents.
    pub students: usize,
    /// Stored course documents.
    pub courses: usize,
}

/// Reconcile response: confirmation plus the repair report.
#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
    /// Human-readable confirmation.
    pub message: String,
    /// What the pass changed.
    pub report: ReconcileReport,
}
