//! Hierarchical CLI for the task tracker.
//!
//! This module provides the command-line interface with two-level commands
//! for managing todos and categories.

mod category;
mod run;
mod task;


pub use category::CategoryCommand;
pub use run::{run, CliOutput};
pub use task::TaskCommand;

use clap::{Parser, Subcommand};

/// Personal task tracker CLI - todos with categories, due dates, and a
/// hand-kept ordering.
///
/// For detailed help on any command group, use:
///   task-tracker <command> --help
#[derive(Parser, Debug)]
#[command(name = "task-tracker")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize the data directory, config, and database.
    ///
    /// Creates the data directory and a default config if missing, opens
    /// the database, and seeds the configured starter categories. Safe to
    /// run repeatedly.
    Init,

    /// Todo management - add, list, update, complete, delete, and move todos.
    ///
    /// Todos keep a dense 1-based ordering: deleting one closes the gap and
    /// moving one shifts its neighbors.
    #[command(subcommand)]
    Task(TaskCommand),

    /// Category management - list and add the categories todos belong to.
    ///
    /// Every todo references a category by name; a todo cannot be added
    /// under a category that does not exist yet.
    #[command(subcommand)]
    Category(CategoryCommand),

    /// Show collection statistics.
    ///
    /// Counts total, open, completed, and overdue todos, plus a per-category
    /// breakdown.
    Stats,

    /// Show version information.
    Version,
}
