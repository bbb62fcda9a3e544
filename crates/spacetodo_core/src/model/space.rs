//! Space and list records.
//!
//! # Invariants
//! - `Space::slug` is unique and matches `^[a-z0-9]+(-[a-z0-9]+)*$`.
//! - A list never moves between spaces.

use crate::model::{ListId, SpaceId, UserId, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug regex"));

/// Tenant boundary grouping lists and tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    pub id: SpaceId,
    /// Human-readable unique key used in addresses.
    pub slug: String,
    pub name: String,
}

/// Named collection of todos inside one space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    pub id: ListId,
    pub space_id: SpaceId,
    pub owner_id: UserId,
    pub title: String,
    /// Private lists are visible to their owner only.
    pub private: bool,
    /// Epoch ms.
    pub updated_at: i64,
}

impl List {
    /// Returns whether `viewer` may see this list.
    pub fn is_visible_to(&self, viewer: &str) -> bool {
        !self.private || self.owner_id == viewer
    }
}

/// Input for list creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewList {
    pub space_id: SpaceId,
    pub owner_id: UserId,
    pub title: String,
    pub private: bool,
}

/// Validates a space slug against the slug grammar.
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if SLUG_RE.is_match(slug) {
        Ok(())
    } else {
        Err(ValidationError::InvalidSlug(slug.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_slug, List};

    #[test]
    fn slug_grammar() {
        assert!(validate_slug("home").is_ok());
        assert!(validate_slug("team-42-ops").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("Home").is_err());
        assert!(validate_slug("two--dashes").is_err());
        assert!(validate_slug("-leading").is_err());
        assert!(validate_slug("with space").is_err());
    }

    #[test]
    fn private_list_is_visible_to_owner_only() {
        let list = List {
            id: "list_1".to_string(),
            space_id: "space_1".to_string(),
            owner_id: "user_1".to_string(),
            title: "Groceries".to_string(),
            private: true,
            updated_at: 0,
        };
        assert!(list.is_visible_to("user_1"));
        assert!(!list.is_visible_to("user_2"));

        let shared = List {
            private: false,
            ..list
        };
        assert!(shared.is_visible_to("user_2"));
    }
}
