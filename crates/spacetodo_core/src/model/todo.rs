//! Todo record: one actionable item in a list, pointing at a task.

use crate::model::task::Task;
use crate::model::{ListId, TaskId, TodoId, UserId};
use serde::{Deserialize, Serialize};

/// Persisted todo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub list_id: ListId,
    pub owner_id: UserId,
    pub task_id: TaskId,
    /// Epoch ms of completion. `None` while open.
    pub completed_at: Option<i64>,
    /// Epoch ms.
    pub created_at: i64,
}

impl Todo {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// Input for the create-todo gateway operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub list_id: ListId,
    pub owner_id: UserId,
    /// Task to connect the new todo to.
    pub task_id: TaskId,
}

/// Todo joined with its task, as rendered in a list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoWithTask {
    #[serde(flatten)]
    pub todo: Todo,
    pub task: Task,
}
