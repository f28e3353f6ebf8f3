//! Command execution for the CLI.
//!
//! This module handles running CLI commands and producing output.

use crate::activity_log;
use crate::cli::{CategoryCommand, Command, TaskCommand};
use crate::config::{self, TrackerConfig};
use crate::paths;
use crate::store::SqliteRowStore;
use crate::todo::{model, Category, NewTodo, Status, Todo, TodoRepository, TodoUpdate};
use serde::Serialize;
use serde_json::json;
use std::process::ExitCode;

/// Output from running the CLI, with separate stdout and stderr messages.
#[derive(Debug)]
pub struct CliOutput {
    /// Exit code for the process.
    pub exit_code: ExitCode,
    /// Messages to print to stdout.
    pub stdout: Vec<String>,
    /// Messages to print to stderr.
    pub stderr: Vec<String>,
}

/// Interactive bound on task text length.
const MAX_TASK_LENGTH: usize = 50;

/// Run a CLI command.
pub fn run(command: Command) -> CliOutput {
    match command {
        Command::Init => run_init(),
        Command::Task(cmd) => run_task_cmd(cmd),
        Command::Category(cmd) => run_category_cmd(cmd),
        Command::Stats => run_stats(),
        Command::Version => run_version(),
    }
}

// === Utility Commands ===

fn run_version() -> CliOutput {
    CliOutput {
        exit_code: ExitCode::SUCCESS,
        stdout: vec![],
        stderr: vec![format!("task-tracker v{}", crate::VERSION)],
    }
}

fn run_init() -> CliOutput {
    let Some(data_dir) = paths::data_dir() else {
        return error_output("Could not determine a data directory".to_string());
    };

    let config = match config::ensure_config_in(&data_dir) {
        Ok(config) => config,
        Err(e) => return error_output(format!("Error ensuring config: {e}")),
    };

    let database_path = config.resolve_database_path(&data_dir);
    let store = match SqliteRowStore::new(&database_path) {
        Ok(store) => store,
        Err(e) => return error_output(e.to_string()),
    };
    let repo = TodoRepository::new(store);

    match repo.seed_categories(&config.seed_categories) {
        Ok(added) => {
            let messages = vec![
                format!("Initialized data directory at {}", data_dir.display()),
                format!("  config: {}", TrackerConfig::config_path(&data_dir).display()),
                format!("  database: {}", database_path.display()),
                format!("  categories added: {added}"),
            ];
            CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![], stderr: messages }
        }
        Err(e) => error_output(e.to_string()),
    }
}

fn run_stats() -> CliOutput {
    let repo = match open_repository() {
        Ok(r) => r,
        Err(e) => return error_output(e),
    };

    match repo.statistics(model::today()) {
        Ok(stats) => json_output(&stats),
        Err(e) => error_output(e.to_string()),
    }
}

// === Task Commands ===

fn run_task_cmd(cmd: TaskCommand) -> CliOutput {
    let repo = match open_repository() {
        Ok(r) => r,
        Err(e) => return error_output(e),
    };

    match cmd {
        TaskCommand::Add { task, category, due } => {
            task_add(&repo, &task, &category, due.as_deref())
        }
        TaskCommand::List { status, overdue, render } => {
            task_list(&repo, status.as_deref(), overdue, render)
        }
        TaskCommand::Show { id, render } => task_show(&repo, id, render),
        TaskCommand::Update { id, task, category, due } => {
            task_update(&repo, id, task, category, due)
        }
        TaskCommand::Complete { id } => task_complete(&repo, id),
        TaskCommand::Delete { id } => task_delete(&repo, id),
        TaskCommand::Move { id, position } => task_move(&repo, id, position),
        TaskCommand::Repair => task_repair(&repo),
    }
}

fn task_add(
    repo: &TodoRepository<SqliteRowStore>,
    task: &str,
    category: &str,
    due: Option<&str>,
) -> CliOutput {
    if let Err(message) = check_task_length(task) {
        return error_output(message);
    }

    let new = match NewTodo::new(task, category, due) {
        Ok(new) => new,
        Err(e) => return error_output(e.to_string()),
    };

    match repo.insert(new) {
        Ok(todo) => {
            activity_log::log_operation(
                "insert",
                &json!({"task_id": todo.task_id, "task": todo.task}),
            );
            json_output(&TodoOutput::from_todo(&todo))
        }
        Err(e) => error_output(e.to_string()),
    }
}

fn task_list(
    repo: &TodoRepository<SqliteRowStore>,
    status: Option<&str>,
    overdue: bool,
    render: bool,
) -> CliOutput {
    let status = match status.map(Status::from_str).transpose() {
        Ok(s) => s,
        Err(e) => return error_output(e.to_string()),
    };

    let todos = match repo.list_all() {
        Ok(todos) => todos,
        Err(e) => return error_output(e.to_string()),
    };

    let today = model::today();
    let todos: Vec<Todo> = todos
        .into_iter()
        .filter(|todo| status.map_or(true, |s| todo.status() == s))
        .filter(|todo| !overdue || todo.is_overdue(today))
        .collect();

    if render {
        let lines: Vec<String> = todos.iter().map(ToString::to_string).collect();
        return CliOutput { exit_code: ExitCode::SUCCESS, stdout: lines, stderr: vec![] };
    }

    let outputs: Vec<TodoOutput> = todos.iter().map(TodoOutput::from_todo).collect();
    json_output(&outputs)
}

fn task_show(repo: &TodoRepository<SqliteRowStore>, id: i64, render: bool) -> CliOutput {
    match repo.find(id) {
        Ok(todo) => {
            if render {
                CliOutput {
                    exit_code: ExitCode::SUCCESS,
                    stdout: vec![todo.to_string()],
                    stderr: vec![],
                }
            } else {
                json_output(&TodoOutput::from_todo(&todo))
            }
        }
        Err(e) => error_output(e.to_string()),
    }
}

fn task_update(
    repo: &TodoRepository<SqliteRowStore>,
    id: i64,
    task: Option<String>,
    category: Option<String>,
    due: Option<String>,
) -> CliOutput {
    if let Some(task) = &task {
        if let Err(message) = check_task_length(task) {
            return error_output(message);
        }
    }

    let update = TodoUpdate { task, category, due_date: due };
    if update.is_empty() {
        return error_output("Nothing to update: provide --task, --category, or --due".to_string());
    }

    match repo.update(id, &update) {
        Ok(()) => {
            activity_log::log_operation("update", &json!({"task_id": id}));
            match repo.find(id) {
                Ok(todo) => json_output(&TodoOutput::from_todo(&todo)),
                Err(e) => error_output(e.to_string()),
            }
        }
        Err(e) => error_output(e.to_string()),
    }
}

fn task_complete(repo: &TodoRepository<SqliteRowStore>, id: i64) -> CliOutput {
    match repo.complete(id) {
        Ok(()) => {
            activity_log::log_operation("complete", &json!({"task_id": id}));
            match repo.find(id) {
                Ok(todo) => json_output(&TodoOutput::from_todo(&todo)),
                Err(e) => error_output(e.to_string()),
            }
        }
        Err(e) => error_output(e.to_string()),
    }
}

fn task_delete(repo: &TodoRepository<SqliteRowStore>, id: i64) -> CliOutput {
    match repo.delete(id) {
        Ok(()) => {
            activity_log::log_operation("delete", &json!({"task_id": id}));
            success_output(format!("Deleted todo {id}"))
        }
        Err(e) => error_output(e.to_string()),
    }
}

fn task_move(repo: &TodoRepository<SqliteRowStore>, id: i64, position: i64) -> CliOutput {
    match repo.reorder(id, position) {
        Ok(()) => {
            activity_log::log_operation(
                "reorder",
                &json!({"task_id": id, "new_position": position}),
            );
            success_output(format!("Moved todo {id} to position {position}"))
        }
        Err(e) => error_output(e.to_string()),
    }
}

fn task_repair(repo: &TodoRepository<SqliteRowStore>) -> CliOutput {
    match repo.repair_positions() {
        Ok(0) => success_output("Positions already dense; nothing to repair".to_string()),
        Ok(count) => {
            activity_log::log_operation("repair", &json!({"rewritten": count}));
            success_output(format!("Rewrote {count} position(s)"))
        }
        Err(e) => error_output(e.to_string()),
    }
}

fn check_task_length(task: &str) -> Result<(), String> {
    if task.trim().chars().count() > MAX_TASK_LENGTH {
        return Err(format!("task is longer than {MAX_TASK_LENGTH} characters"));
    }
    Ok(())
}

// === Category Commands ===

fn run_category_cmd(cmd: CategoryCommand) -> CliOutput {
    let repo = match open_repository() {
        Ok(r) => r,
        Err(e) => return error_output(e),
    };

    match cmd {
        CategoryCommand::List => category_list(&repo),
        CategoryCommand::Add { name } => category_add(&repo, &name),
    }
}

fn category_list(repo: &TodoRepository<SqliteRowStore>) -> CliOutput {
    match repo.categories() {
        Ok(categories) => {
            let outputs: Vec<CategoryOutput> =
                categories.iter().map(CategoryOutput::from).collect();
            json_output(&outputs)
        }
        Err(e) => error_output(e.to_string()),
    }
}

fn category_add(repo: &TodoRepository<SqliteRowStore>, name: &str) -> CliOutput {
    match repo.add_category(name) {
        Ok(category) => {
            activity_log::log_operation(
                "add_category",
                &json!({"category_name": category.category_name}),
            );
            json_output(&CategoryOutput::from(&category))
        }
        Err(e) => error_output(e.to_string()),
    }
}

// === Helper Functions ===

fn open_repository() -> Result<TodoRepository<SqliteRowStore>, String> {
    let data_dir =
        paths::data_dir().ok_or_else(|| "Could not determine a data directory".to_string())?;
    let config =
        TrackerConfig::load_from(&data_dir).map_err(|e| e.to_string())?.unwrap_or_default();
    let store =
        SqliteRowStore::new(config.resolve_database_path(&data_dir)).map_err(|e| e.to_string())?;
    Ok(TodoRepository::new(store))
}

fn json_output<T: Serialize>(value: &T) -> CliOutput {
    match serde_json::to_string_pretty(value) {
        Ok(json) => CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![json], stderr: vec![] },
        Err(e) => error_output(e.to_string()),
    }
}

fn success_output(message: String) -> CliOutput {
    CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![message], stderr: vec![] }
}

fn error_output(message: String) -> CliOutput {
    CliOutput { exit_code: ExitCode::from(1), stdout: vec![], stderr: vec![message] }
}

// === Output Types ===

/// Todo output for list and show operations.
#[derive(Debug, Serialize)]
struct TodoOutput {
    task_id: i64,
    task: String,
    category: String,
    status: String,
    date_added: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_completed: Option<String>,
    position: i64,
    overdue: bool,
}

impl TodoOutput {
    fn from_todo(todo: &Todo) -> Self {
        Self {
            task_id: todo.task_id,
            task: todo.task.clone(),
            category: todo.category.clone(),
            status: todo.status().as_str().to_string(),
            date_added: todo.date_added.clone(),
            due_date: todo.due_date.clone(),
            date_completed: todo.date_completed.clone(),
            position: todo.position,
            overdue: todo.is_overdue(model::today()),
        }
    }
}

/// Category output.
#[derive(Debug, Serialize)]
struct CategoryOutput {
    category_id: i64,
    category_name: String,
}

impl From<&Category> for CategoryOutput {
    fn from(category: &Category) -> Self {
        Self { category_id: category.category_id, category_name: category.category_name.clone() }
    }
}
