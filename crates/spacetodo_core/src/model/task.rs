//! Task record: a reusable title/description template scoped to one space.
//!
//! # Invariants
//! - `space_id` is fixed at creation; no API reassigns a task to another space.
//! - `(space_id, title)` identifies at most one task.

use crate::model::{SpaceId, TaskId, UserId};
use serde::{Deserialize, Serialize};

/// Persisted task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// Owning space. Immutable.
    pub space_id: SpaceId,
    pub title: String,
    pub description: Option<String>,
    /// Creator.
    pub owner_id: UserId,
}

impl Task {
    /// Returns whether this task may be linked from a todo in `space_id`.
    pub fn belongs_to(&self, space_id: &str) -> bool {
        self.space_id == space_id
    }
}

/// Input for the create-task gateway operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub space_id: SpaceId,
    pub owner_id: UserId,
    pub title: String,
    pub description: Option<String>,
}
