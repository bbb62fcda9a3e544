//! Command-line front end for the spacetodo core.
//!
//! # Responsibility
//! - Map subcommands onto core services over one SQLite database.
//! - Print results as JSON so scripts can consume them.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use spacetodo_core::db::open_db;
use spacetodo_core::{
    default_log_level, init_logging, CreateTodoRequest, LogConfig, SpaceService,
    SqliteSpaceRepository, SqliteTodoRepository, TaskSelection, TodoService,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "spacetodo", version, about = "Collaborative to-do lists grouped in spaces")]
struct Cli {
    /// SQLite database file.
    #[arg(long, env = "SPACETODO_DB", default_value = "spacetodo.sqlite3", global = true)]
    db: PathBuf,

    /// trace|debug|info|warn|error. Defaults by build mode.
    #[arg(long, env = "SPACETODO_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, env = "SPACETODO_LOG_DIR", global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prints a health-check reply.
    Ping,
    /// Manage spaces.
    #[command(subcommand)]
    Space(SpaceCommand),
    /// Manage lists inside a space.
    #[command(subcommand)]
    List(ListCommand),
    /// Manage todos inside a list.
    #[command(subcommand)]
    Todo(TodoCommand),
    /// Search and edit tasks.
    #[command(subcommand)]
    Task(TaskCommand),
}

#[derive(Subcommand, Debug)]
enum SpaceCommand {
    Create {
        #[arg(long)]
        slug: String,
        #[arg(long)]
        name: String,
    },
    /// Lists all spaces with their list counts.
    List,
    Show {
        slug: String,
    },
}

#[derive(Subcommand, Debug)]
enum ListCommand {
    Create {
        /// Slug of the owning space.
        #[arg(long)]
        space: String,
        #[arg(long)]
        owner: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        private: bool,
    },
    /// Lists the lists of a space visible to `--viewer`.
    Show {
        #[arg(long)]
        space: String,
        #[arg(long)]
        viewer: String,
    },
}

#[derive(Subcommand, Debug)]
enum TodoCommand {
    Add {
        #[arg(long)]
        list: String,
        #[arg(long)]
        owner: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
    },
    List {
        #[arg(long)]
        list: String,
    },
    Complete {
        id: String,
    },
    Reopen {
        id: String,
    },
    /// Points a todo at another task of its space.
    ChangeTask(ChangeTaskArgs),
    Delete {
        id: String,
    },
}

#[derive(Args, Debug)]
struct ChangeTaskArgs {
    id: String,
    #[arg(long)]
    user: String,
    /// Existing task id.
    #[arg(long, conflicts_with = "title")]
    task: Option<String>,
    /// Title to find or create.
    #[arg(long)]
    title: Option<String>,
}

#[derive(Subcommand, Debug)]
enum TaskCommand {
    Search {
        /// Slug of the space to search in.
        #[arg(long)]
        space: String,
        query: String,
        #[arg(long)]
        limit: Option<u32>,
    },
    Edit {
        id: String,
        /// New title. Blank keeps the current one.
        #[arg(long, default_value = "")]
        title: String,
        /// New description. Omit to clear it.
        #[arg(long)]
        description: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        let config = LogConfig::new(level, log_dir)?;
        init_logging(&config)?;
    }

    if let Command::Ping = cli.command {
        println!("pong {}", spacetodo_core::core_version());
        return Ok(());
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    let spaces = SpaceService::new(SqliteSpaceRepository::try_new(&conn)?);
    let todos = TodoService::new(SqliteTodoRepository::try_new(&conn)?);

    match cli.command {
        Command::Ping => Ok(()),
        Command::Space(command) => run_space(&spaces, command),
        Command::List(command) => run_list(&spaces, command),
        Command::Todo(command) => run_todo(&spaces, &todos, command),
        Command::Task(command) => run_task(&spaces, &todos, command),
    }
}

type Spaces<'conn> = SpaceService<SqliteSpaceRepository<'conn>>;
type Todos<'conn> = TodoService<SqliteTodoRepository<'conn>>;

fn run_space(spaces: &Spaces<'_>, command: SpaceCommand) -> Result<()> {
    match command {
        SpaceCommand::Create { slug, name } => print_json(&spaces.create_space(&slug, &name)?),
        SpaceCommand::List => print_json(&spaces.list_space_cards()?),
        SpaceCommand::Show { slug } => {
            let space = spaces
                .get_space_by_slug(&slug)?
                .ok_or_else(|| anyhow!("space not found: {slug}"))?;
            print_json(&space)
        }
    }
}

fn run_list(spaces: &Spaces<'_>, command: ListCommand) -> Result<()> {
    match command {
        ListCommand::Create {
            space,
            owner,
            title,
            private,
        } => {
            let space = spaces
                .get_space_by_slug(&space)?
                .ok_or_else(|| anyhow!("space not found: {space}"))?;
            print_json(&spaces.create_list(&space.id, &owner, &title, private)?)
        }
        ListCommand::Show { space, viewer } => print_json(&spaces.list_lists(&space, &viewer)?),
    }
}

fn run_todo(spaces: &Spaces<'_>, todos: &Todos<'_>, command: TodoCommand) -> Result<()> {
    match command {
        TodoCommand::Add {
            list,
            owner,
            title,
            description,
        } => {
            let list = spaces
                .get_list(&list)?
                .ok_or_else(|| anyhow!("list not found: {list}"))?;
            let todo = todos.create_todo(&CreateTodoRequest {
                list_id: list.id,
                owner_id: owner,
                space_id: list.space_id,
                title,
                description,
            })?;
            print_json(&todo)
        }
        TodoCommand::List { list } => print_json(&todos.list_todos(&list)?),
        TodoCommand::Complete { id } => print_json(&todos.set_completed(&id, true)?),
        TodoCommand::Reopen { id } => print_json(&todos.set_completed(&id, false)?),
        TodoCommand::ChangeTask(args) => {
            let selection = match (args.task, args.title) {
                (Some(task_id), _) => TaskSelection::Existing(task_id),
                (None, Some(title)) => TaskSelection::Title(title),
                (None, None) => return Err(anyhow!("pass --task or --title")),
            };
            print_json(&todos.change_task(&args.id, &args.user, &selection)?)
        }
        TodoCommand::Delete { id } => {
            todos.delete_todo(&id)?;
            print_json(&Deleted { id })
        }
    }
}

fn run_task(spaces: &Spaces<'_>, todos: &Todos<'_>, command: TaskCommand) -> Result<()> {
    match command {
        TaskCommand::Search {
            space,
            query,
            limit,
        } => {
            let space = spaces
                .get_space_by_slug(&space)?
                .ok_or_else(|| anyhow!("space not found: {space}"))?;
            print_json(&todos.search_tasks(&space.id, &query, limit)?)
        }
        TaskCommand::Edit {
            id,
            title,
            description,
        } => print_json(&todos.edit_task(&id, &title, description.as_deref())?),
    }
}

#[derive(Serialize)]
struct Deleted {
    id: String,
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
