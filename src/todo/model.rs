//! Todo record model types.
//!
//! The model layer owns validation and normalization of a single record plus
//! its derived views (status, overdue, one-line rendering). It has no
//! dependency on storage; identifier and position assignment belong to the
//! repository.

use crate::error::{Error, Result};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Canonical due date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Canonical timestamp format for added/completed times. Fixed-width UTC, so
/// lexicographic order on these strings is chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Derived completion status of a todo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Not yet completed.
    Open,
    /// Completed (a completion timestamp exists).
    Completed,
}

impl Status {
    /// Parse a status from its name (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns a validation error for names other than `open` or `completed`.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "completed" => Ok(Self::Completed),
            _ => Err(Error::Validation(format!(
                "unknown status '{value}' (expected open or completed)"
            ))),
        }
    }

    /// Get the display name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single task entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Unique identifier, assigned by the repository at insert, never reused.
    pub task_id: i64,
    /// Task description text.
    pub task: String,
    /// Name of the category this todo belongs to.
    pub category: String,
    /// Creation timestamp (ISO-8601 UTC), immutable after insert.
    pub date_added: String,
    /// Optional due date (`YYYY-MM-DD`).
    pub due_date: Option<String>,
    /// Completion timestamp (ISO-8601 UTC); present exactly when completed.
    pub date_completed: Option<String>,
    /// 1-based display rank; live todos always occupy `1..=N` densely.
    pub position: i64,
}

impl Todo {
    /// Derived status: completed exactly when a completion timestamp exists.
    #[must_use]
    pub const fn status(&self) -> Status {
        if self.date_completed.is_some() {
            Status::Completed
        } else {
            Status::Open
        }
    }

    /// Whether this todo is past due as of `today`.
    ///
    /// Only an open todo with a parseable due date strictly before `today`
    /// counts as overdue.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        if self.date_completed.is_some() {
            return false;
        }
        self.due_date
            .as_deref()
            .and_then(|due| NaiveDate::parse_from_str(due, DATE_FORMAT).ok())
            .is_some_and(|due| due < today)
    }
}

impl std::fmt::Display for Todo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Task: {}, Category: {}, Status: {}", self.task, self.category, self.status())?;
        if let Some(due) = &self.due_date {
            write!(f, ", Due: {due}")?;
        }
        Ok(())
    }
}

/// A named grouping referenced by todos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier.
    pub category_id: i64,
    /// Unique name.
    pub category_name: String,
}

/// Validated input for inserting a new todo.
///
/// Construction normalizes the fields; the repository assigns `task_id` and
/// `position` and resolves the category name when the record is inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    /// Task description text, non-empty.
    pub task: String,
    /// Category name; must resolve to an existing category at insert time.
    pub category: String,
    /// Optional due date, normalized to `YYYY-MM-DD`.
    pub due_date: Option<String>,
    /// Creation timestamp; defaults to the current UTC time.
    pub date_added: String,
}

impl NewTodo {
    /// Validate and normalize caller input into an insertable record.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `task` or `category` is empty after
    /// trimming, or if `due_date` is not a calendar date.
    pub fn new(task: &str, category: &str, due_date: Option<&str>) -> Result<Self> {
        let task = required_text("task", task)?;
        let category = required_text("category", category)?;
        let due_date = due_date.map(normalize_due_date).transpose()?;
        Ok(Self { task, category, due_date, date_added: now_timestamp() })
    }
}

/// Trim a required text field, rejecting empty input.
pub(crate) fn required_text(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Parse a due date and re-render it in canonical `YYYY-MM-DD` form.
///
/// # Errors
///
/// Returns a validation error if the input is not a real calendar date.
pub fn normalize_due_date(input: &str) -> Result<String> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map(|date| date.format(DATE_FORMAT).to_string())
        .map_err(|_| {
            Error::Validation(format!("invalid due date '{trimmed}': expected YYYY-MM-DD"))
        })
}

/// The current UTC time as a canonical timestamp string.
#[must_use]
pub fn now_timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Today's date in UTC.
#[must_use]
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
