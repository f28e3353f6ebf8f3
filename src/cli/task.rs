//! Todo CLI subcommands.
//!
//! Provides commands for managing todos: add, list, show, update, complete,
//! delete, and reorder.

use clap::Subcommand;

/// Todo management commands.
///
/// Each todo has:
/// - Task text and a category
/// - An optional due date
/// - A completion timestamp once completed
/// - A 1-based position defining the list order
///
/// ## Quick Start
///
/// ```bash
/// # Add a todo
/// task-tracker task add "Fix login bug" --category Coding --due 2026-09-01
///
/// # See the list in order
/// task-tracker task list
///
/// # Mark it completed
/// task-tracker task complete 1
///
/// # Move it to the top of the list
/// task-tracker task move 1 1
/// ```
#[derive(Subcommand, Debug, Clone)]
pub enum TaskCommand {
    /// Add a new todo at the end of the list.
    ///
    /// The category must already exist; create it first with
    /// `category add` if needed.
    Add {
        /// Task description (at most 50 characters)
        task: String,

        /// Category name the todo belongs to
        #[arg(short, long)]
        category: String,

        /// Due date as YYYY-MM-DD
        #[arg(short, long)]
        due: Option<String>,
    },

    /// List todos in position order.
    List {
        /// Filter by status: open, completed
        #[arg(short, long)]
        status: Option<String>,

        /// Only show overdue todos
        #[arg(long)]
        overdue: bool,

        /// Print one-line summaries instead of JSON
        #[arg(long)]
        render: bool,
    },

    /// Show a single todo by id.
    Show {
        /// Todo id
        id: i64,

        /// Print a one-line summary instead of JSON
        #[arg(long)]
        render: bool,
    },

    /// Update a todo's fields.
    ///
    /// Only specified fields are updated; others remain unchanged. The id,
    /// creation date, and position cannot be changed this way.
    Update {
        /// Todo id
        id: i64,

        /// New task description (at most 50 characters)
        #[arg(short, long)]
        task: Option<String>,

        /// New category name
        #[arg(short, long)]
        category: Option<String>,

        /// New due date as YYYY-MM-DD
        #[arg(short, long)]
        due: Option<String>,
    },

    /// Mark a todo completed.
    ///
    /// Completing an already-completed todo refreshes its completion
    /// timestamp.
    Complete {
        /// Todo id
        id: i64,
    },

    /// Delete a todo and renumber the remaining ones.
    Delete {
        /// Todo id
        id: i64,
    },

    /// Move a todo to a new position in the list.
    ///
    /// Todos between the old and new position shift by one to keep the
    /// ordering dense.
    Move {
        /// Todo id
        id: i64,

        /// Target position, between 1 and the number of todos
        position: i64,
    },

    /// Rewrite positions into a dense sequence.
    ///
    /// Use this if an interrupted delete or move left a gap in the ordering.
    Repair,
}
