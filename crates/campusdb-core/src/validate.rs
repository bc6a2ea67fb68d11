//! Field validation for student and course writes.
//!
//! Every rule for a write is checked and every failure reported together,
//! rather than short-circuiting on the first broken field. Email addresses
//! are normalized (trimmed, lower-cased) before the pattern check, the
//! uniqueness check, and persistence.

use std::sync::LazyLock;

use chrono::{Datelike, Utc};
use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, FieldError};
use crate::model::{EntityId, Student};
use crate::store::{decode, Collection, EntityStore};

/// Earliest accepted enrollment year.
pub const MIN_ENROLLMENT_YEAR: i32 = 2011;

/// Minimum full-name length in characters.
pub const MIN_FULL_NAME_LEN: usize = 9;

/// Minimum course title length in characters.
pub const MIN_TITLE_LEN: usize = 5;

/// Minimum course description length in characters.
pub const MIN_DESCRIPTION_LEN: usize = 20;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("email pattern compiles")
});

/// Candidate fields for a student write.
///
/// Everything is optional so missing fields can all be reported at once;
/// patch requests reuse the same shape with absent fields meaning "keep".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDraft {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub field_of_study: Option<String>,
    pub year_of_enrollment: Option<i32>,
}

/// Candidate fields for a course write.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration: Option<f64>,
    pub instructor: Option<String>,
}

/// Normalized student fields that passed validation.
#[derive(Debug, Clone)]
pub struct StudentFields {
    pub full_name: String,
    pub email: String,
    pub field_of_study: String,
    pub year_of_enrollment: i32,
}

/// Course fields that passed validation.
#[derive(Debug, Clone)]
pub struct CourseFields {
    pub title: String,
    pub description: String,
    pub duration: f64,
    pub instructor: String,
}

/// Validates candidate fields against the entity rules.
///
/// Borrows the store because email uniqueness needs a read over the
/// existing student records.
pub struct Validator<'a> {
    store: &'a dyn EntityStore,
}

impl<'a> Validator<'a> {
    /// Create a new validator.
    pub fn new(store: &'a dyn EntityStore) -> Self {
        Self { store }
    }

    /// Validate a full set of student fields.
    ///
    /// `exclude` names the record being updated, so its own stored email
    /// does not count as a collision.
    pub fn validate_student(
        &self,
        draft: &StudentDraft,
        exclude: Option<&EntityId>,
    ) -> Result<StudentFields, Error> {
        let mut errors = Vec::new();

        let full_name = match &draft.full_name {
            Some(name) if name.chars().count() >= MIN_FULL_NAME_LEN => Some(name.clone()),
            Some(_) => {
                errors.push(FieldError::new(
                    "fullName",
                    format!("must be at least {} characters", MIN_FULL_NAME_LEN),
                ));
                None
            }
            None => {
                errors.push(FieldError::new("fullName", "is required"));
                None
            }
        };

        let email = match &draft.email {
            Some(raw) => {
                let normalized = raw.trim().to_lowercase();
                if !EMAIL_PATTERN.is_match(&normalized) {
                    errors.push(FieldError::new("email", "is not a valid address"));
                    None
                } else if self.email_taken(&normalized, exclude)? {
                    errors.push(FieldError::new("email", "is already registered"));
                    None
                } else {
                    Some(normalized)
                }
            }
            None => {
                errors.push(FieldError::new("email", "is required"));
                None
            }
        };

        let field_of_study = match &draft.field_of_study {
            Some(field) if !field.trim().is_empty() => Some(field.clone()),
            Some(_) => {
                errors.push(FieldError::new("fieldOfStudy", "must not be empty"));
                None
            }
            None => {
                errors.push(FieldError::new("fieldOfStudy", "is required"));
                None
            }
        };

        // The upper bound moves with the calendar, so recompute per call.
        let current_year = Utc::now().year();
        let year_of_enrollment = match draft.year_of_enrollment {
            Some(year) if year < MIN_ENROLLMENT_YEAR => {
                errors.push(FieldError::new(
                    "yearOfEnrollment",
                    format!("must be {} or later", MIN_ENROLLMENT_YEAR),
                ));
                None
            }
            Some(year) if year > current_year => {
                errors.push(FieldError::new("yearOfEnrollment", "cannot be in the future"));
                None
            }
            Some(year) => Some(year),
            None => {
                errors.push(FieldError::new("yearOfEnrollment", "is required"));
                None
            }
        };

        match (full_name, email, field_of_study, year_of_enrollment) {
            (Some(full_name), Some(email), Some(field_of_study), Some(year_of_enrollment))
                if errors.is_empty() =>
            {
                Ok(StudentFields {
                    full_name,
                    email,
                    field_of_study,
                    year_of_enrollment,
                })
            }
            _ => Err(Error::Validation(errors)),
        }
    }

    /// Validate a full set of course fields.
    pub fn validate_course(&self, draft: &CourseDraft) -> Result<CourseFields, Error> {
        let mut errors = Vec::new();

        let title = match &draft.title {
            Some(title) if title.chars().count() >= MIN_TITLE_LEN => Some(title.clone()),
            Some(_) => {
                errors.push(FieldError::new(
                    "title",
                    format!("must be at least {} characters", MIN_TITLE_LEN),
                ));
                None
            }
            None => {
                errors.push(FieldError::new("title", "is required"));
                None
            }
        };

        let description = match &draft.description {
            Some(desc) if desc.chars().count() >= MIN_DESCRIPTION_LEN => Some(desc.clone()),
            Some(_) => {
                errors.push(FieldError::new(
                    "description",
                    format!("must be at least {} characters", MIN_DESCRIPTION_LEN),
                ));
                None
            }
            None => {
                errors.push(FieldError::new("description", "is required"));
                None
            }
        };

        let duration = match draft.duration {
            Some(minutes) if minutes > 0.0 => Some(minutes),
            Some(_) => {
                errors.push(FieldError::new("duration", "must be greater than zero"));
                None
            }
            None => {
                errors.push(FieldError::new("duration", "is required"));
                None
            }
        };

        let instructor = match &draft.instructor {
            Some(name) if !name.trim().is_empty() => Some(name.clone()),
            Some(_) => {
                errors.push(FieldError::new("instructor", "must not be empty"));
                None
            }
            None => {
                errors.push(FieldError::new("instructor", "is required"));
                None
            }
        };

        match (title, description, duration, instructor) {
            (Some(title), Some(description), Some(duration), Some(instructor))
                if errors.is_empty() =>
            {
                Ok(CourseFields {
                    title,
                    description,
                    duration,
                    instructor,
                })
            }
            _ => Err(Error::Validation(errors)),
        }
    }

    /// Whether a normalized email already belongs to another student.
    fn email_taken(&self, email: &str, exclude: Option<&EntityId>) -> Result<bool, Error> {
        for (id, bytes) in self.store.scan(Collection::Students)? {
            if exclude == Some(&id) {
                continue;
            }
            let student: Student = decode(&bytes)?;
            if student.email == email {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
