//! campusdb core - entity store, validation, and enrollment integrity.
//!
//! This crate holds everything below the HTTP surface: the student/course
//! model, the entity store abstraction (sled-backed and ephemeral in-memory
//! implementations), field validation, and the enrollment manager that keeps
//! the bidirectional student/course relation symmetric.

pub mod enrollment;
pub mod error;
pub mod model;
pub mod registrar;
pub mod store;
pub mod validate;

pub use enrollment::{EnrollmentManager, ReconcileReport};
pub use error::{Error, FieldError};
pub use model::{
    Course, CourseSummary, CourseView, EntityId, Student, StudentSummary, StudentView,
};
pub use registrar::Registrar;
pub use store::{Collection, EntityStore, MemoryStore, SledStore};
pub use validate::{CourseDraft, CourseFields, StudentDraft, StudentFields, Validator};
