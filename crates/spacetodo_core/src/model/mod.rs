//! Domain model for spaces, lists, tasks and todos.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own field-level validation shared by services and repositories.
//!
//! # Invariants
//! - Every record is identified by a stable, globally unique string id.
//! - A task belongs to exactly one space for its whole lifetime.

use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod space;
pub mod task;
pub mod todo;

pub type SpaceId = String;
pub type ListId = String;
pub type TaskId = String;
pub type TodoId = String;
/// Identity of a signed-in user. Issued and managed outside the core.
pub type UserId = String;

/// Generates a fresh record id.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required field is empty or whitespace-only.
    MissingField(&'static str),
    /// Space slug does not match the slug grammar.
    InvalidSlug(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "`{field}` must not be empty"),
            Self::InvalidSlug(slug) => write!(
                f,
                "invalid space slug `{slug}`; expected lowercase words joined by `-`"
            ),
        }
    }
}

impl Error for ValidationError {}

/// Returns the trimmed value, or `MissingField` when nothing is left.
pub fn require_text<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(trimmed)
}

/// Normalizes optional free text: trimmed, and blank collapses to `None`.
pub fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::{new_id, normalize_optional_text, require_text, ValidationError};

    #[test]
    fn require_text_trims_and_rejects_blank() {
        assert_eq!(require_text("title", "  Alpha ").unwrap(), "Alpha");
        assert_eq!(
            require_text("title", " \t\n").unwrap_err(),
            ValidationError::MissingField("title")
        );
    }

    #[test]
    fn blank_optional_text_collapses_to_none() {
        assert_eq!(normalize_optional_text(None), None);
        assert_eq!(normalize_optional_text(Some("   ")), None);
        assert_eq!(
            normalize_optional_text(Some(" desc ")).as_deref(),
            Some("desc")
        );
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(new_id(), new_id());
    }
}
