//! Task/todo persistence gateway contracts and SQLite implementation.
//!
//! # Responsibility
//! - Define the gateway the todo-creation flow depends on.
//! - Provide the wider todo lifecycle contract (toggle, relink, delete,
//!   task edit and suggestion search).
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `(space_id, title)` is unique in `tasks`; `create_task` returns the
//!   already stored row when a concurrent writer inserted it first.
//! - `tasks.space_id` is never updated.

use crate::db::{ensure_schema_ready, RequiredTable};
use crate::model::task::{NewTask, Task};
use crate::model::todo::{NewTodo, Todo, TodoWithTask};
use crate::model::{new_id, SpaceId};
use crate::repo::{is_unique_violation, RepoError, RepoResult};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    space_id,
    owner_id,
    title,
    description
FROM tasks";

const TODO_SELECT_SQL: &str = "SELECT
    id,
    list_id,
    owner_id,
    task_id,
    completed_at,
    created_at
FROM todos";

const SEARCH_DEFAULT_LIMIT: u32 = 8;
const SEARCH_LIMIT_MAX: u32 = 50;

const REQUIRED_TABLES: &[RequiredTable] = &[
    RequiredTable {
        name: "tasks",
        columns: &["id", "space_id", "owner_id", "title", "description"],
    },
    RequiredTable {
        name: "todos",
        columns: &[
            "id",
            "list_id",
            "owner_id",
            "task_id",
            "completed_at",
            "created_at",
        ],
    },
    RequiredTable {
        name: "lists",
        columns: &["id", "space_id"],
    },
];

/// Persistence gateway used by todo creation.
///
/// Matching semantics of `find_first_task` belong to the implementation; the
/// SQLite gateway matches `title` exactly and case-sensitively.
pub trait TodoGateway {
    /// Finds the first task in `space_id` whose title equals `title`.
    fn find_first_task(&self, space_id: &str, title: &str) -> RepoResult<Option<Task>>;
    /// Creates one task and returns it with its generated id.
    fn create_task(&self, task: &NewTask) -> RepoResult<Task>;
    /// Creates one todo connected to `todo.task_id`.
    fn create_todo(&self, todo: &NewTodo) -> RepoResult<Todo>;
    /// Resolves the space a list lives in.
    fn list_space_id(&self, list_id: &str) -> RepoResult<Option<SpaceId>>;
}

/// Query options for task suggestions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskSearchQuery {
    pub space_id: SpaceId,
    /// Case-insensitive substring of the title.
    pub text: String,
    /// Defaults to 8 and clamps to 50.
    pub limit: Option<u32>,
}

/// Full task/todo repository contract.
pub trait TodoRepository: TodoGateway {
    fn get_task(&self, task_id: &str) -> RepoResult<Option<Task>>;
    /// Replaces title and description. The owning space never changes.
    fn update_task(
        &self,
        task_id: &str,
        title: &str,
        description: Option<&str>,
    ) -> RepoResult<Task>;
    fn search_tasks(&self, query: &TaskSearchQuery) -> RepoResult<Vec<Task>>;
    fn get_todo(&self, todo_id: &str) -> RepoResult<Option<Todo>>;
    /// Lists todos of one list with their tasks, newest first.
    fn list_todos(&self, list_id: &str) -> RepoResult<Vec<TodoWithTask>>;
    /// Stamps or clears `completed_at`. Completing twice keeps the first stamp.
    fn set_todo_completed(&self, todo_id: &str, completed: bool) -> RepoResult<Todo>;
    /// Points a todo at another task.
    fn relink_todo(&self, todo_id: &str, task_id: &str) -> RepoResult<Todo>;
    fn delete_todo(&self, todo_id: &str) -> RepoResult<()>;
}

impl<T: TodoGateway + ?Sized> TodoGateway for &T {
    fn find_first_task(&self, space_id: &str, title: &str) -> RepoResult<Option<Task>> {
        (**self).find_first_task(space_id, title)
    }

    fn create_task(&self, task: &NewTask) -> RepoResult<Task> {
        (**self).create_task(task)
    }

    fn create_todo(&self, todo: &NewTodo) -> RepoResult<Todo> {
        (**self).create_todo(todo)
    }

    fn list_space_id(&self, list_id: &str) -> RepoResult<Option<SpaceId>> {
        (**self).list_space_id(list_id)
    }
}

/// SQLite-backed task/todo repository.
pub struct SqliteTodoRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTodoRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }

    fn load_required_task(&self, task_id: &str) -> RepoResult<Task> {
        self.get_task(task_id)?
            .ok_or_else(|| RepoError::not_found("task", task_id))
    }

    fn load_required_todo(&self, todo_id: &str) -> RepoResult<Todo> {
        self.get_todo(todo_id)?
            .ok_or_else(|| RepoError::not_found("todo", todo_id))
    }
}

impl TodoGateway for SqliteTodoRepository<'_> {
    fn find_first_task(&self, space_id: &str, title: &str) -> RepoResult<Option<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE space_id = ?1
               AND title = ?2
             ORDER BY created_at ASC, id ASC
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query(params![space_id, title])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn create_task(&self, task: &NewTask) -> RepoResult<Task> {
        let inserted = self.conn.execute(
            "INSERT INTO tasks (
                id,
                space_id,
                owner_id,
                title,
                description
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(space_id, title) DO NOTHING;",
            params![
                new_id(),
                task.space_id.as_str(),
                task.owner_id.as_str(),
                task.title.as_str(),
                task.description.as_deref(),
            ],
        )?;
        if inserted == 0 {
            debug!("event=task_create module=repo status=conflict_reused");
        }

        self.find_first_task(&task.space_id, &task.title)?
            .ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "task missing in read-back for space `{}`",
                    task.space_id
                ))
            })
    }

    fn create_todo(&self, todo: &NewTodo) -> RepoResult<Todo> {
        let id = new_id();
        self.conn.execute(
            "INSERT INTO todos (
                id,
                list_id,
                owner_id,
                task_id
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                id.as_str(),
                todo.list_id.as_str(),
                todo.owner_id.as_str(),
                todo.task_id.as_str(),
            ],
        )?;
        self.load_required_todo(&id)
    }

    fn list_space_id(&self, list_id: &str) -> RepoResult<Option<SpaceId>> {
        let space_id = self
            .conn
            .query_row(
                "SELECT space_id FROM lists WHERE id = ?1;",
                [list_id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(space_id)
    }
}

impl TodoRepository for SqliteTodoRepository<'_> {
    fn get_task(&self, task_id: &str) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([task_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn update_task(
        &self,
        task_id: &str,
        title: &str,
        description: Option<&str>,
    ) -> RepoResult<Task> {
        let changed = self
            .conn
            .execute(
                "UPDATE tasks
                 SET
                    title = ?2,
                    description = ?3,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1;",
                params![task_id, title, description],
            )
            .map_err(|err| {
                if is_unique_violation(&err) {
                    RepoError::Duplicate {
                        entity: "task",
                        key: title.to_string(),
                    }
                } else {
                    err.into()
                }
            })?;

        if changed == 0 {
            return Err(RepoError::not_found("task", task_id));
        }
        self.load_required_task(task_id)
    }

    fn search_tasks(&self, query: &TaskSearchQuery) -> RepoResult<Vec<Task>> {
        let needle = query.text.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE space_id = ?1
               AND instr(lower(title), ?2) > 0
             ORDER BY title ASC, id ASC
             LIMIT ?3;"
        ))?;
        let limit = i64::from(normalize_search_limit(query.limit));
        let mut rows = stmt.query(params![query.space_id.as_str(), needle, limit])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn get_todo(&self, todo_id: &str) -> RepoResult<Option<Todo>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TODO_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([todo_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_todo_row(row)?));
        }
        Ok(None)
    }

    fn list_todos(&self, list_id: &str) -> RepoResult<Vec<TodoWithTask>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                todos.id AS id,
                todos.list_id AS list_id,
                todos.owner_id AS owner_id,
                todos.task_id AS task_id,
                todos.completed_at AS completed_at,
                todos.created_at AS created_at,
                tasks.space_id AS task_space_id,
                tasks.owner_id AS task_owner_id,
                tasks.title AS task_title,
                tasks.description AS task_description
             FROM todos
             JOIN tasks ON tasks.id = todos.task_id
             WHERE todos.list_id = ?1
             ORDER BY todos.created_at DESC, todos.rowid DESC;",
        )?;
        let mut rows = stmt.query([list_id])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            let todo = parse_todo_row(row)?;
            let task = Task {
                id: todo.task_id.clone(),
                space_id: row.get("task_space_id")?,
                owner_id: row.get("task_owner_id")?,
                title: row.get("task_title")?,
                description: row.get("task_description")?,
            };
            items.push(TodoWithTask { todo, task });
        }
        Ok(items)
    }

    fn set_todo_completed(&self, todo_id: &str, completed: bool) -> RepoResult<Todo> {
        let changed = self.conn.execute(
            "UPDATE todos
             SET
                completed_at = CASE
                    WHEN ?2 = 1 THEN COALESCE(completed_at, strftime('%s', 'now') * 1000)
                    ELSE NULL
                END,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![todo_id, i64::from(completed)],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("todo", todo_id));
        }
        self.load_required_todo(todo_id)
    }

    fn relink_todo(&self, todo_id: &str, task_id: &str) -> RepoResult<Todo> {
        let changed = self.conn.execute(
            "UPDATE todos
             SET
                task_id = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![todo_id, task_id],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("todo", todo_id));
        }
        self.load_required_todo(todo_id)
    }

    fn delete_todo(&self, todo_id: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM todos WHERE id = ?1;", [todo_id])?;
        if changed == 0 {
            return Err(RepoError::not_found("todo", todo_id));
        }
        Ok(())
    }
}

/// Normalizes the suggestion limit: `None`/`0` -> 8, capped at 50.
pub fn normalize_search_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => SEARCH_DEFAULT_LIMIT,
        Some(value) if value > SEARCH_LIMIT_MAX => SEARCH_LIMIT_MAX,
        Some(value) => value,
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    Ok(Task {
        id: row.get("id")?,
        space_id: row.get("space_id")?,
        owner_id: row.get("owner_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
    })
}

fn parse_todo_row(row: &Row<'_>) -> RepoResult<Todo> {
    let todo = Todo {
        id: row.get("id")?,
        list_id: row.get("list_id")?,
        owner_id: row.get("owner_id")?,
        task_id: row.get("task_id")?,
        completed_at: row.get("completed_at")?,
        created_at: row.get("created_at")?,
    };
    if let Some(completed_at) = todo.completed_at {
        if completed_at < 0 {
            return Err(RepoError::InvalidData(format!(
                "invalid completed_at value `{completed_at}` in todos.completed_at"
            )));
        }
    }
    Ok(todo)
}
