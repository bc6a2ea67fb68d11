//! Entity model: students, courses, and the views served to clients.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// Opaque 16-byte entity identifier, rendered as 32 hex characters.
///
/// Store-assigned at creation and immutable afterwards.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId([u8; 16]);

impl EntityId {
    /// Generate a fresh id: nanosecond timestamp plus an atomic counter,
    /// with UUID version-4 bits set.
    pub fn generate() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        use std::time::{SystemTime, UNIX_EPOCH};

        // Counter keeps ids unique even with identical timestamps.
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;
        let counter = COUNTER.fetch_add(1, Ordering::SeqCst);

        let mut id = [0u8; 16];
        id[..8].copy_from_slice(&now.to_le_bytes());
        id[8..16].copy_from_slice(&counter.to_le_bytes());

        id[6] = (id[6] & 0x0f) | 0x40;
        id[8] = (id[8] & 0x3f) | 0x80;

        Self(id)
    }

    /// Raw id bytes (store key form).
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Build an id from raw store key bytes.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self)
    }
}

impl FromStr for EntityId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = hex::decode(s).map_err(|_| Error::InvalidId(s.to_string()))?;
        let bytes: [u8; 16] = decoded
            .try_into()
            .map_err(|_| Error::InvalidId(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A student record.
///
/// `courses` is the forward side of the enrollment relation; only the
/// enrollment manager may mutate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// Store-assigned id.
    pub id: EntityId,
    /// Full name, at least 9 characters.
    pub full_name: String,
    /// Normalized (trimmed, lower-cased) unique address.
    pub email: String,
    /// Field of study.
    pub field_of_study: String,
    /// Enrollment year, 2011 up to the current calendar year.
    pub year_of_enrollment: i32,
    /// Ids of courses the student is enrolled in.
    pub courses: BTreeSet<EntityId>,
    /// Set once at creation.
    pub created_at: DateTime<Utc>,
}

/// A course record.
///
/// `students` is the inverse side of the enrollment relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Store-assigned id.
    pub id: EntityId,
    /// Title, at least 5 characters.
    pub title: String,
    /// Description, at least 20 characters.
    pub description: String,
    /// Duration in minutes, strictly positive.
    pub duration: f64,
    /// Instructor name.
    pub instructor: String,
    /// Ids of students enrolled in the course.
    pub students: BTreeSet<EntityId>,
    /// Set once at creation.
    pub created_at: DateTime<Utc>,
}

/// Course fields surfaced when expanding a student's enrollment list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    pub duration: f64,
    /// Present only in detail views.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
}

impl CourseSummary {
    /// Summary used by list views: title, description, duration.
    pub fn brief(course: &Course) -> Self {
        Self {
            id: course.id,
            title: course.title.clone(),
            description: course.description.clone(),
            duration: course.duration,
            instructor: None,
        }
    }

    /// Summary used by detail views; also carries the instructor.
    pub fn detailed(course: &Course) -> Self {
        Self {
            instructor: Some(course.instructor.clone()),
            ..Self::brief(course)
        }
    }
}

/// Student fields surfaced when expanding a course's roster.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub id: EntityId,
    pub full_name: String,
    pub email: String,
    pub field_of_study: String,
    /// Present only in detail views.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_of_enrollment: Option<i32>,
}

impl StudentSummary {
    /// Summary used by list views: name, email, field of study.
    pub fn brief(student: &Student) -> Self {
        Self {
            id: student.id,
            full_name: student.full_name.clone(),
            email: student.email.clone(),
            field_of_study: student.field_of_study.clone(),
            year_of_enrollment: None,
        }
    }

    /// Summary used by detail views; also carries the enrollment year.
    pub fn detailed(student: &Student) -> Self {
        Self {
            year_of_enrollment: Some(student.year_of_enrollment),
            ..Self::brief(student)
        }
    }
}

/// A student with its enrollment list expanded to course summaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentView {
    pub id: EntityId,
    pub full_name: String,
    pub email: String,
    pub field_of_study: String,
    pub year_of_enrollment: i32,
    pub courses: Vec<CourseSummary>,
    pub created_at: DateTime<Utc>,
}

/// A course with its roster expanded to student summaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseView {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    pub duration: f64,
    pub instructor: String,
    pub students: Vec<StudentSummary>,
    pub created_at: DateTime<Utc>,
}
