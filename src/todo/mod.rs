//! Todo tracking core.
//!
//! This module provides the heart of the tracker:
//! - Todo records with task text, category, optional due date, and completion
//!   state derived from the completion timestamp
//! - A repository implementing ordered listing, insert, update, complete,
//!   delete, and reorder over any [`crate::store::RowStore`]
//! - Category management with referential integrity checks
//! - Dense 1-based positions maintained across deletes and reorders
//!
//! # Example
//!
//! ```no_run
//! use task_tracker::store::SqliteRowStore;
//! use task_tracker::todo::{NewTodo, TodoRepository};
//!
//! let store = SqliteRowStore::new("/tmp/todos.sqlite3").unwrap();
//! let repo = TodoRepository::new(store);
//!
//! repo.add_category("Coding").unwrap();
//! let todo = repo
//!     .insert(NewTodo::new("Fix login bug", "Coding", Some("2026-09-01")).unwrap())
//!     .unwrap();
//!
//! // Mark it completed
//! repo.complete(todo.task_id).unwrap();
//! ```

pub mod model;
pub mod repo;

pub use model::{Category, NewTodo, Status, Todo};
pub use repo::{TodoRepository, TodoUpdate, TrackerStats};
