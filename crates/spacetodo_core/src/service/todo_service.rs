//! Todo use-case service.
//!
//! # Responsibility
//! - Resolve (find or create) the task behind a new todo and attach the todo.
//! - Provide todo lifecycle operations: toggle, relink, delete, list.
//! - Provide task edit and suggestion search.
//!
//! # Invariants
//! - A todo only ever references a task of the space its list lives in.
//!   A list outside the requested space fails with `ListSpaceMismatch`
//!   before any task lookup; a resolved task outside it fails with
//!   `CrossSpaceViolation` before any todo write.
//! - An existing task is reused as stored; a caller-supplied description
//!   never overwrites it during creation.
//! - Validation runs before the first gateway call.

use crate::model::task::{NewTask, Task};
use crate::model::todo::{NewTodo, Todo, TodoWithTask};
use crate::model::{
    normalize_optional_text, require_text, ListId, SpaceId, TaskId, TodoId, UserId,
    ValidationError,
};
use crate::repo::todo_repo::{TaskSearchQuery, TodoGateway, TodoRepository};
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Service error for todo/task use-cases.
#[derive(Debug)]
pub enum TodoServiceError {
    /// Required input is missing or malformed.
    Invalid(ValidationError),
    /// Resolved task lives in a different space than the one requested.
    CrossSpaceViolation {
        task_id: TaskId,
        task_space_id: SpaceId,
        requested_space_id: SpaceId,
    },
    /// Target list lives in a different space than the one requested.
    ListSpaceMismatch {
        list_id: ListId,
        list_space_id: SpaceId,
        requested_space_id: SpaceId,
    },
    TodoNotFound(TodoId),
    TaskNotFound(TaskId),
    ListNotFound(ListId),
    /// Another task in the same space already uses this title.
    DuplicateTitle(String),
    /// Persistence-layer failure, passed through unchanged.
    Repo(RepoError),
}

impl Display for TodoServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "{err}"),
            Self::CrossSpaceViolation {
                task_id,
                task_space_id,
                requested_space_id,
            } => write!(
                f,
                "cross-space link rejected: task {task_id} belongs to space {task_space_id}, not {requested_space_id}"
            ),
            Self::ListSpaceMismatch {
                list_id,
                list_space_id,
                requested_space_id,
            } => write!(
                f,
                "cross-space link rejected: list {list_id} belongs to space {list_space_id}, not {requested_space_id}"
            ),
            Self::TodoNotFound(id) => write!(f, "todo not found: {id}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::ListNotFound(id) => write!(f, "list not found: {id}"),
            Self::DuplicateTitle(title) => {
                write!(f, "a task titled `{title}` already exists in this space")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TodoServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for TodoServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Invalid(value)
    }
}

impl From<RepoError> for TodoServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity: "todo", id } => Self::TodoNotFound(id),
            RepoError::NotFound { entity: "task", id } => Self::TaskNotFound(id),
            RepoError::Duplicate { entity: "task", key } => Self::DuplicateTitle(key),
            other => Self::Repo(other),
        }
    }
}

/// Request model for adding a todo to a list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateTodoRequest {
    pub list_id: ListId,
    pub owner_id: UserId,
    pub space_id: SpaceId,
    /// Task title; matched exactly within `space_id` after trimming.
    pub title: String,
    /// Used only when a new task has to be created.
    pub description: Option<String>,
}

/// Target task for relinking a todo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskSelection {
    /// An existing task picked from suggestions.
    Existing(TaskId),
    /// A typed title; found or created in the todo's space.
    Title(String),
}

/// Todo/task service facade over repository implementations.
pub struct TodoService<R: TodoGateway> {
    repo: R,
}

impl<R: TodoGateway> TodoService<R> {
    /// Creates a service using the provided gateway implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Adds a todo to a list, reusing or lazily creating its task.
    ///
    /// # Contract
    /// - One list-space lookup, one task lookup, at most one task creation
    ///   and exactly one todo creation on success.
    /// - Gateway errors are returned as `TodoServiceError::Repo` untouched.
    /// - A task created before a failing todo insert is kept.
    ///
    /// # Errors
    /// - `Invalid` when a required field is blank.
    /// - `ListNotFound` when `list_id` is unknown.
    /// - `ListSpaceMismatch` when the list is outside `space_id`.
    /// - `CrossSpaceViolation` when the resolved task is outside `space_id`.
    pub fn create_todo(&self, request: &CreateTodoRequest) -> Result<Todo, TodoServiceError> {
        let started_at = Instant::now();
        let list_id = require_text("list_id", &request.list_id)?;
        let owner_id = require_text("owner_id", &request.owner_id)?;
        let space_id = require_text("space_id", &request.space_id)?;
        let title = require_text("title", &request.title)?;
        self.ensure_list_in_space(list_id, space_id)?;

        let (task, reused) =
            self.resolve_task(space_id, owner_id, title, request.description.as_deref())?;
        ensure_same_space(&task, space_id)?;

        let todo = self
            .repo
            .create_todo(&NewTodo {
                list_id: list_id.to_string(),
                owner_id: owner_id.to_string(),
                task_id: task.id,
            })
            .map_err(TodoServiceError::Repo)?;

        info!(
            "event=todo_create module=service status=ok task_reused={} duration_ms={}",
            reused,
            started_at.elapsed().as_millis()
        );
        Ok(todo)
    }

    fn ensure_list_in_space(&self, list_id: &str, space_id: &str) -> Result<(), TodoServiceError> {
        let list_space_id = self
            .repo
            .list_space_id(list_id)
            .map_err(TodoServiceError::Repo)?
            .ok_or_else(|| TodoServiceError::ListNotFound(list_id.to_string()))?;
        if list_space_id == space_id {
            return Ok(());
        }
        warn!("event=todo_create module=service status=error error_code=list_cross_space");
        Err(TodoServiceError::ListSpaceMismatch {
            list_id: list_id.to_string(),
            list_space_id,
            requested_space_id: space_id.to_string(),
        })
    }

    /// Finds the task for `(space_id, title)` or creates it. Returns the task
    /// and whether it already existed.
    fn resolve_task(
        &self,
        space_id: &str,
        owner_id: &str,
        title: &str,
        description: Option<&str>,
    ) -> Result<(Task, bool), TodoServiceError> {
        if let Some(existing) = self
            .repo
            .find_first_task(space_id, title)
            .map_err(TodoServiceError::Repo)?
        {
            return Ok((existing, true));
        }

        let created = self
            .repo
            .create_task(&NewTask {
                space_id: space_id.to_string(),
                owner_id: owner_id.to_string(),
                title: title.to_string(),
                description: normalize_optional_text(description),
            })
            .map_err(TodoServiceError::Repo)?;
        Ok((created, false))
    }
}

impl<R: TodoRepository> TodoService<R> {
    /// Lists todos of one list with their tasks, newest first.
    pub fn list_todos(&self, list_id: &str) -> Result<Vec<TodoWithTask>, TodoServiceError> {
        let list_id = require_text("list_id", list_id)?;
        Ok(self.repo.list_todos(list_id)?)
    }

    /// Marks a todo complete or open again.
    ///
    /// A request matching the current state returns the todo without writing.
    pub fn set_completed(
        &self,
        todo_id: &str,
        completed: bool,
    ) -> Result<Todo, TodoServiceError> {
        let todo = self.load_todo(todo_id)?;
        if todo.is_completed() == completed {
            return Ok(todo);
        }
        Ok(self.repo.set_todo_completed(&todo.id, completed)?)
    }

    /// Relinks a todo to another task of the same space.
    ///
    /// `user_id` becomes the owner of a task created from `TaskSelection::Title`.
    pub fn change_task(
        &self,
        todo_id: &str,
        user_id: &str,
        selection: &TaskSelection,
    ) -> Result<Todo, TodoServiceError> {
        let todo = self.load_todo(todo_id)?;
        let space_id = self
            .repo
            .list_space_id(&todo.list_id)?
            .ok_or_else(|| TodoServiceError::ListNotFound(todo.list_id.clone()))?;

        let task = match selection {
            TaskSelection::Existing(task_id) => self
                .repo
                .get_task(task_id)?
                .ok_or_else(|| TodoServiceError::TaskNotFound(task_id.clone()))?,
            TaskSelection::Title(title) => {
                let user_id = require_text("user_id", user_id)?;
                let title = require_text("title", title)?;
                self.resolve_task(&space_id, user_id, title, None)?.0
            }
        };
        ensure_same_space(&task, &space_id)?;

        if task.id == todo.task_id {
            return Ok(todo);
        }
        let updated = self.repo.relink_todo(&todo.id, &task.id)?;
        info!("event=todo_relink module=service status=ok");
        Ok(updated)
    }

    /// Deletes one todo. Its task stays available for reuse.
    pub fn delete_todo(&self, todo_id: &str) -> Result<(), TodoServiceError> {
        let todo_id = require_text("todo_id", todo_id)?;
        self.repo.delete_todo(todo_id)?;
        info!("event=todo_delete module=service status=ok");
        Ok(())
    }

    /// Edits task title and description.
    ///
    /// A blank `title` keeps the stored title; a blank or absent
    /// `description` clears it.
    pub fn edit_task(
        &self,
        task_id: &str,
        title: &str,
        description: Option<&str>,
    ) -> Result<Task, TodoServiceError> {
        let current = self
            .repo
            .get_task(task_id)?
            .ok_or_else(|| TodoServiceError::TaskNotFound(task_id.to_string()))?;
        let title = match title.trim() {
            "" => current.title.as_str(),
            trimmed => trimmed,
        };
        let description = normalize_optional_text(description);
        Ok(self
            .repo
            .update_task(&current.id, title, description.as_deref())?)
    }

    /// Suggests tasks of one space whose title contains `text`.
    pub fn search_tasks(
        &self,
        space_id: &str,
        text: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Task>, TodoServiceError> {
        let space_id = require_text("space_id", space_id)?;
        Ok(self.repo.search_tasks(&TaskSearchQuery {
            space_id: space_id.to_string(),
            text: text.to_string(),
            limit,
        })?)
    }

    fn load_todo(&self, todo_id: &str) -> Result<Todo, TodoServiceError> {
        self.repo
            .get_todo(todo_id)?
            .ok_or_else(|| TodoServiceError::TodoNotFound(todo_id.to_string()))
    }
}

fn ensure_same_space(task: &Task, space_id: &str) -> Result<(), TodoServiceError> {
    if task.belongs_to(space_id) {
        return Ok(());
    }
    warn!("event=task_link module=service status=error error_code=cross_space");
    Err(TodoServiceError::CrossSpaceViolation {
        task_id: task.id.clone(),
        task_space_id: task.space_id.clone(),
        requested_space_id: space_id.to_string(),
    })
}
