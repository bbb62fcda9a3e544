//! Core domain logic for spacetodo.
//! This crate is the single source of truth for space/task/todo invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogConfig, LoggingError};
pub use model::space::{List, NewList, Space};
pub use model::task::{NewTask, Task};
pub use model::todo::{NewTodo, Todo, TodoWithTask};
pub use model::{ListId, SpaceId, TaskId, TodoId, UserId, ValidationError};
pub use repo::space_repo::{SpaceRepository, SqliteSpaceRepository};
pub use repo::todo_repo::{SqliteTodoRepository, TaskSearchQuery, TodoGateway, TodoRepository};
pub use repo::{RepoError, RepoResult};
pub use service::space_service::{SpaceCard, SpaceService, SpaceServiceError};
pub use service::todo_service::{
    CreateTodoRequest, TaskSelection, TodoService, TodoServiceError,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
