//! HTTP route handlers.

pub mod admin;
pub mod courses;
pub mod health;
pub mod students;

use campusdb_core::EntityId;

use crate::error::AppError;

/// Parse a path segment as an entity id; malformed ids are client errors.
pub(crate) fn parse_id(raw: &str) -> Result<EntityId, AppError> {
    raw.parse().map_err(AppError::from)
}
