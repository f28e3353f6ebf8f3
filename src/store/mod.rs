//! Row-oriented storage abstraction.
//!
//! The repository in [`crate::todo`] talks to its backing store through the
//! [`RowStore`] trait: two named tables of flat rows, where a row maps column
//! names to scalar [`Value`]s. The store makes no ordering promises and keeps
//! no referential integrity; both are the repository's job. Row locations are
//! addressed through opaque [`RowLocator`] handles that are only valid until
//! the next mutation of their table, so callers re-find rows before every
//! mutation instead of caching locators.

pub mod sqlite;

pub use sqlite::SqliteRowStore;

use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Name of the table holding todo rows.
pub const TASKS_TABLE: &str = "tasks";

/// Name of the table holding category rows.
pub const CATEGORIES_TABLE: &str = "categories";

/// `tasks` column: unique integer identifier.
pub const COL_TASK_ID: &str = "task_id";
/// `tasks` column: task description text.
pub const COL_TASK: &str = "task";
/// `tasks` column: integer reference into `categories`.
pub const COL_CATEGORY_ID: &str = "category_id";
/// `tasks` column: creation timestamp, ISO-8601.
pub const COL_DATE_ADDED: &str = "date_added";
/// `tasks` column: optional due date, ISO-8601.
pub const COL_DUE_DATE: &str = "due_date";
/// `tasks` column: optional completion timestamp, ISO-8601.
pub const COL_DATE_COMPLETED: &str = "date_completed";
/// `tasks` column: 1-based display rank.
pub const COL_POSITION: &str = "position";
/// `categories` column: unique category name.
pub const COL_CATEGORY_NAME: &str = "category_name";

/// Columns of the `tasks` table, in schema order.
pub const TASK_COLUMNS: [&str; 7] = [
    COL_TASK_ID,
    COL_TASK,
    COL_CATEGORY_ID,
    COL_DATE_ADDED,
    COL_DUE_DATE,
    COL_DATE_COMPLETED,
    COL_POSITION,
];

/// Columns of the `categories` table, in schema order.
pub const CATEGORY_COLUMNS: [&str; 2] = [COL_CATEGORY_ID, COL_CATEGORY_NAME];

/// A scalar cell value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// An integer cell.
    Int(i64),
    /// A text cell.
    Text(String),
    /// An empty cell.
    Null,
}

impl Value {
    /// The integer content, if this is an integer cell.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// The text content, if this is a text cell.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this cell is empty.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Option<String>> for Value {
    fn from(opt: Option<String>) -> Self {
        opt.map_or(Self::Null, Self::Text)
    }
}

/// A single row: a mapping from column name to cell value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: BTreeMap<String, Value>,
}

impl Row {
    /// Create an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style cell assignment.
    #[must_use]
    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    /// Assign a cell.
    pub fn set(&mut self, column: &str, value: impl Into<Value>) {
        self.cells.insert(column.to_string(), value.into());
    }

    /// Get a cell value, if the column is present.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.get(column)
    }

    /// Read a required integer cell.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the column is absent or not an integer.
    pub fn int(&self, column: &str) -> Result<i64> {
        self.get(column)
            .and_then(Value::as_int)
            .ok_or_else(|| cell_error(column, "an integer"))
    }

    /// Read a required text cell.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the column is absent or not text.
    pub fn text(&self, column: &str) -> Result<&str> {
        self.get(column)
            .and_then(Value::as_text)
            .ok_or_else(|| cell_error(column, "text"))
    }

    /// Read an optional text cell; absent or null cells read as `None`.
    #[must_use]
    pub fn opt_text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(Value::as_text)
    }

    /// Iterate over `(column, value)` pairs in column-name order.
    pub fn cells(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn cell_error(column: &str, expected: &'static str) -> Error {
    Error::Storage(Box::new(CellTypeError { column: column.to_string(), expected }))
}

/// Error when a row cell is absent or holds the wrong type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellTypeError {
    /// The column that failed to decode.
    pub column: String,
    /// What the caller expected the cell to be.
    pub expected: &'static str,
}

impl std::fmt::Display for CellTypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "column '{}' is missing or not {}", self.column, self.expected)
    }
}

impl std::error::Error for CellTypeError {}

/// Error when a table name is not part of the store's schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTable(pub String);

impl std::fmt::Display for UnknownTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown table: {}", self.0)
    }
}

impl std::error::Error for UnknownTable {}

/// Error when a column name is not part of a table's schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownColumn {
    /// The table that was addressed.
    pub table: String,
    /// The column that does not exist in it.
    pub column: String,
}

impl std::fmt::Display for UnknownColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "table '{}' has no column '{}'", self.table, self.column)
    }
}

impl std::error::Error for UnknownColumn {}

/// Error when a locator no longer resolves to a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingRow {
    /// The table that was addressed.
    pub table: String,
    /// The stale locator.
    pub locator: RowLocator,
}

impl std::fmt::Display for MissingRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no row at locator {} in table '{}'", self.locator.raw(), self.table)
    }
}

impl std::error::Error for MissingRow {}

/// Opaque handle to a row's current location in the backing store.
///
/// A locator is invalidated by row insertion or deletion in its table; cell
/// updates leave rows where they are, so one batch may address several rows.
/// Callers re-find rows before each mutating operation rather than hold
/// locators across operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowLocator(i64);

impl RowLocator {
    /// Wrap a backend-assigned raw locator value.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// The backend-assigned raw locator value.
    #[must_use]
    pub const fn raw(self) -> i64 {
        self.0
    }
}

/// One cell assignment within a [`RowStore::batch_update`] call.
#[derive(Debug, Clone)]
pub struct CellUpdate {
    /// Locator of the row to touch.
    pub locator: RowLocator,
    /// Column to assign.
    pub column: String,
    /// New cell value.
    pub value: Value,
}

impl CellUpdate {
    /// Convenience constructor.
    #[must_use]
    pub fn new(locator: RowLocator, column: &str, value: impl Into<Value>) -> Self {
        Self { locator, column: column.to_string(), value: value.into() }
    }
}

/// Contract for a row-oriented backing store.
///
/// Implementations hold two tables, [`TASKS_TABLE`] and [`CATEGORIES_TABLE`].
/// Physical row order carries no meaning; the logical order of todos lives in
/// the `position` column and is maintained by the repository.
#[allow(clippy::missing_errors_doc)]
pub trait RowStore {
    /// Read every row of a table, in backend order.
    fn read_rows(&self, table: &str) -> Result<Vec<Row>>;

    /// Append one row to a table.
    fn append_row(&self, table: &str, row: &Row) -> Result<()>;

    /// Assign one cell of the row at `locator`.
    fn update_cell(&self, table: &str, locator: RowLocator, column: &str, value: Value)
        -> Result<()>;

    /// Apply several cell assignments, in order.
    ///
    /// The default implementation applies them one at a time; backends with a
    /// cheaper bulk path override this. A failure part-way through leaves the
    /// earlier assignments applied.
    fn batch_update(&self, table: &str, updates: &[CellUpdate]) -> Result<()> {
        for update in updates {
            self.update_cell(table, update.locator, &update.column, update.value.clone())?;
        }
        Ok(())
    }

    /// Delete the row at `locator`.
    fn delete_row(&self, table: &str, locator: RowLocator) -> Result<()>;

    /// Locate the first row whose `column` cell equals `value`.
    ///
    /// Returns `Ok(None)` when no row matches; the caller decides what absence
    /// means at its own level.
    fn find_row(&self, table: &str, column: &str, value: &Value) -> Result<Option<RowLocator>>;
}

impl<S: RowStore + ?Sized> RowStore for &S {
    fn read_rows(&self, table: &str) -> Result<Vec<Row>> {
        (**self).read_rows(table)
    }

    fn append_row(&self, table: &str, row: &Row) -> Result<()> {
        (**self).append_row(table, row)
    }

    fn update_cell(
        &self,
        table: &str,
        locator: RowLocator,
        column: &str,
        value: Value,
    ) -> Result<()> {
        (**self).update_cell(table, locator, column, value)
    }

    fn batch_update(&self, table: &str, updates: &[CellUpdate]) -> Result<()> {
        (**self).batch_update(table, updates)
    }

    fn delete_row(&self, table: &str, locator: RowLocator) -> Result<()> {
        (**self).delete_row(table, locator)
    }

    fn find_row(&self, table: &str, column: &str, value: &Value) -> Result<Option<RowLocator>> {
        (**self).find_row(table, column, value)
    }
}
