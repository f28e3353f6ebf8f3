//! Repository over a row store.
//!
//! [`TodoRepository`] owns the collection-level invariants the backing store
//! does not enforce: identifier assignment without reuse, dense 1-based
//! positions, and category referential integrity. The store is injected at
//! construction and treated as the source of truth; row locations are
//! re-resolved before every mutation instead of being cached, because the
//! backend may move rows between calls.

use std::cell::Cell;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::store::{
    CellUpdate, Row, RowLocator, RowStore, Value, CATEGORIES_TABLE, COL_CATEGORY_ID,
    COL_CATEGORY_NAME, COL_DATE_ADDED, COL_DATE_COMPLETED, COL_DUE_DATE, COL_POSITION, COL_TASK,
    COL_TASK_ID, TASKS_TABLE,
};
use crate::todo::model::{self, required_text, Category, NewTodo, Todo};

/// Partial update for [`TodoRepository::update`].
///
/// `None` fields are left unchanged. A field can only be replaced, never
/// cleared, through an update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoUpdate {
    /// Replacement task text.
    pub task: Option<String>,
    /// Replacement category name.
    pub category: Option<String>,
    /// Replacement due date.
    pub due_date: Option<String>,
}

impl TodoUpdate {
    /// Whether the update carries no fields at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.task.is_none() && self.category.is_none() && self.due_date.is_none()
    }
}

/// Collection-level counts derived from one read of the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrackerStats {
    /// Number of live todos.
    pub total: usize,
    /// Todos without a completion timestamp.
    pub open: usize,
    /// Todos with a completion timestamp.
    pub completed: usize,
    /// Open todos whose due date has passed.
    pub overdue: usize,
    /// Todo count per category name, including empty categories.
    pub by_category: BTreeMap<String, usize>,
}

/// Error when a stored todo references a category id with no category row.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DanglingCategoryId {
    task_id: i64,
    category_id: i64,
}

impl std::fmt::Display for DanglingCategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "todo {} references missing category id {}", self.task_id, self.category_id)
    }
}

impl std::error::Error for DanglingCategoryId {}

/// Repository owning the todo collection and its ordering and identity
/// invariants.
#[derive(Debug)]
pub struct TodoRepository<S: RowStore> {
    store: S,
    /// Highest identifier this handle has assigned or observed. Listing and
    /// row lookups fold the ids they see into this value, and insert never
    /// assigns at or below it, so an id this handle has seen deleted does
    /// not go back into circulation.
    id_floor: Cell<i64>,
}

impl<S: RowStore> TodoRepository<S> {
    /// Wrap a backing store.
    pub fn new(store: S) -> Self {
        Self { store, id_floor: Cell::new(0) }
    }

    /// List every live todo joined against its category, ordered by position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the store cannot be read or holds rows
    /// that do not decode into todos.
    pub fn list_all(&self) -> Result<Vec<Todo>> {
        let categories: BTreeMap<i64, String> = self
            .categories()?
            .into_iter()
            .map(|category| (category.category_id, category.category_name))
            .collect();

        let rows = self.store.read_rows(TASKS_TABLE)?;
        let mut todos = Vec::with_capacity(rows.len());
        for row in &rows {
            todos.push(todo_from_row(row, &categories)?);
        }
        if let Some(max_id) = todos.iter().map(|todo| todo.task_id).max() {
            self.observe_id(max_id);
        }
        // Physical row order carries no meaning; the position column does.
        todos.sort_by_key(|todo| (todo.position, todo.task_id));
        Ok(todos)
    }

    /// Look up a todo by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no live todo has that identifier.
    pub fn find(&self, task_id: i64) -> Result<Todo> {
        self.list_all()?
            .into_iter()
            .find(|todo| todo.task_id == task_id)
            .ok_or(Error::NotFound(task_id))
    }

    /// Insert a validated record, assigning its identifier and position.
    ///
    /// The new todo is appended at the end of the order. Identifiers and
    /// positions grow from the current maxima, so neither is taken from a
    /// deleted row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCategory`] if the category does not resolve;
    /// no row is appended in that case.
    pub fn insert(&self, new: NewTodo) -> Result<Todo> {
        let category = self.resolve_category(&new.category)?;
        let todos = self.list_all()?;

        let max_id = todos.iter().map(|todo| todo.task_id).max().unwrap_or(0);
        let task_id = max_id.max(self.id_floor.get()) + 1;
        self.observe_id(task_id);
        let position = todos.iter().map(|todo| todo.position).max().unwrap_or(0) + 1;

        let row = Row::new()
            .with(COL_TASK_ID, task_id)
            .with(COL_TASK, new.task.as_str())
            .with(COL_CATEGORY_ID, category.category_id)
            .with(COL_DATE_ADDED, new.date_added.as_str())
            .with(COL_DUE_DATE, new.due_date.clone())
            .with(COL_DATE_COMPLETED, None::<String>)
            .with(COL_POSITION, position);
        self.store.append_row(TASKS_TABLE, &row)?;

        Ok(Todo {
            task_id,
            task: new.task,
            category: category.category_name,
            date_added: new.date_added,
            due_date: new.due_date,
            date_completed: None,
            position,
        })
    }

    /// Apply a partial update to the todo with `task_id`.
    ///
    /// Identifier, creation date, completion state, and position are not
    /// updatable through this operation. All supplied fields are validated
    /// before any cell is written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the identifier does not resolve,
    /// [`Error::Validation`] for empty task text or a malformed due date, and
    /// [`Error::UnknownCategory`] if the category does not resolve.
    pub fn update(&self, task_id: i64, update: &TodoUpdate) -> Result<()> {
        let locator = self.locate(task_id)?;
        if update.is_empty() {
            return Ok(());
        }

        let mut cells = Vec::new();
        if let Some(task) = &update.task {
            let task = required_text("task", task)?;
            cells.push(CellUpdate::new(locator, COL_TASK, task));
        }
        if let Some(category) = &update.category {
            let name = required_text("category", category)?;
            let category = self.resolve_category(&name)?;
            cells.push(CellUpdate::new(locator, COL_CATEGORY_ID, category.category_id));
        }
        if let Some(due_date) = &update.due_date {
            let due_date = model::normalize_due_date(due_date)?;
            cells.push(CellUpdate::new(locator, COL_DUE_DATE, due_date));
        }
        self.store.batch_update(TASKS_TABLE, &cells)
    }

    /// Mark the todo with `task_id` completed as of now.
    ///
    /// Completing an already-completed todo overwrites its completion
    /// timestamp with the later one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the identifier does not resolve, and
    /// [`Error::Validation`] if the current time is before the todo's
    /// creation time.
    pub fn complete(&self, task_id: i64) -> Result<()> {
        let todo = self.find(task_id)?;
        let now = model::now_timestamp();
        // Canonical timestamps compare lexicographically.
        if now < todo.date_added {
            return Err(Error::Validation(format!(
                "completion time {now} precedes creation time {}",
                todo.date_added
            )));
        }
        let locator = self.locate(task_id)?;
        self.store.update_cell(TASKS_TABLE, locator, COL_DATE_COMPLETED, Value::Text(now))
    }

    /// Delete the todo with `task_id` and close the gap in positions.
    ///
    /// The deleted identifier is retired; later inserts through this handle
    /// never reassign it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the identifier does not resolve. If the
    /// store fails partway through renumbering, the error propagates and the
    /// position sequence may be left with a gap until [`Self::repair_positions`]
    /// or the next delete runs.
    pub fn delete(&self, task_id: i64) -> Result<()> {
        let locator = self.locate(task_id)?;
        self.store.delete_row(TASKS_TABLE, locator)?;
        self.renumber()?;
        Ok(())
    }

    /// Move the todo with `task_id` to `new_position`, shifting the todos
    /// between its old and new position by one.
    ///
    /// Moving a todo to its current position is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the identifier does not resolve, and
    /// [`Error::InvalidPosition`] if `new_position` is outside `1..=N`.
    pub fn reorder(&self, task_id: i64, new_position: i64) -> Result<()> {
        let todos = self.list_all()?;
        let moved =
            todos.iter().find(|todo| todo.task_id == task_id).ok_or(Error::NotFound(task_id))?;

        let count = i64::try_from(todos.len()).unwrap_or(i64::MAX);
        if new_position < 1 || new_position > count {
            return Err(Error::InvalidPosition { position: new_position, count });
        }
        let old_position = moved.position;
        if new_position == old_position {
            return Ok(());
        }

        let mut cells = Vec::new();
        for todo in &todos {
            if todo.task_id == task_id {
                continue;
            }
            let shifted = if new_position > old_position
                && todo.position > old_position
                && todo.position <= new_position
            {
                todo.position - 1
            } else if new_position < old_position
                && todo.position >= new_position
                && todo.position < old_position
            {
                todo.position + 1
            } else {
                continue;
            };
            let locator = self.locate(todo.task_id)?;
            cells.push(CellUpdate::new(locator, COL_POSITION, shifted));
        }
        // The moved row claims its target only after the shifts have vacated
        // it, so no two rows ever hold the same position mid-write.
        let locator = self.locate(task_id)?;
        cells.push(CellUpdate::new(locator, COL_POSITION, new_position));
        self.store.batch_update(TASKS_TABLE, &cells)
    }

    /// List every category, ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the store cannot be read.
    pub fn categories(&self) -> Result<Vec<Category>> {
        let rows = self.store.read_rows(CATEGORIES_TABLE)?;
        let mut categories = Vec::with_capacity(rows.len());
        for row in &rows {
            categories.push(Category {
                category_id: row.int(COL_CATEGORY_ID)?,
                category_name: row.text(COL_CATEGORY_NAME)?.to_string(),
            });
        }
        categories.sort_by_key(|category| category.category_id);
        Ok(categories)
    }

    /// Add a category, assigning the next identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the name is empty after trimming and
    /// [`Error::DuplicateCategory`] if the name already exists.
    pub fn add_category(&self, name: &str) -> Result<Category> {
        let name = required_text("category", name)?;
        let categories = self.categories()?;
        if categories.iter().any(|category| category.category_name == name) {
            return Err(Error::DuplicateCategory(name));
        }
        let category_id =
            categories.iter().map(|category| category.category_id).max().unwrap_or(0) + 1;

        let row =
            Row::new().with(COL_CATEGORY_ID, category_id).with(COL_CATEGORY_NAME, name.as_str());
        self.store.append_row(CATEGORIES_TABLE, &row)?;
        Ok(Category { category_id, category_name: name })
    }

    /// Add every category in `names` that does not already exist.
    ///
    /// Returns the number of categories actually added.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty name; existing names are
    /// skipped, not errors.
    pub fn seed_categories(&self, names: &[String]) -> Result<usize> {
        let mut added = 0;
        for name in names {
            match self.add_category(name) {
                Ok(_) => added += 1,
                Err(Error::DuplicateCategory(_)) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(added)
    }

    /// Compute collection-level counts as of `today`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the store cannot be read.
    pub fn statistics(&self, today: NaiveDate) -> Result<TrackerStats> {
        let mut by_category: BTreeMap<String, usize> =
            self.categories()?.into_iter().map(|category| (category.category_name, 0)).collect();

        let todos = self.list_all()?;
        let mut stats = TrackerStats { total: todos.len(), ..TrackerStats::default() };
        for todo in &todos {
            if todo.date_completed.is_some() {
                stats.completed += 1;
            } else {
                stats.open += 1;
            }
            if todo.is_overdue(today) {
                stats.overdue += 1;
            }
            *by_category.entry(todo.category.clone()).or_insert(0) += 1;
        }
        stats.by_category = by_category;
        Ok(stats)
    }

    /// Rewrite positions into a dense `1..=N` sequence, preserving the
    /// current order.
    ///
    /// Returns the number of rows whose position changed; `0` means the
    /// invariant already held. This is the reconciliation pass for a store
    /// left mid-renumber by an interrupted delete or reorder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the store cannot be read or written.
    pub fn repair_positions(&self) -> Result<usize> {
        self.renumber()
    }

    /// Re-resolve the row holding `task_id`.
    fn locate(&self, task_id: i64) -> Result<RowLocator> {
        let locator = self
            .store
            .find_row(TASKS_TABLE, COL_TASK_ID, &Value::Int(task_id))?
            .ok_or(Error::NotFound(task_id))?;
        self.observe_id(task_id);
        Ok(locator)
    }

    /// Raise the identifier floor to at least `task_id`. Callers feed in
    /// only ids they assigned or confirmed to exist.
    fn observe_id(&self, task_id: i64) {
        self.id_floor.set(self.id_floor.get().max(task_id));
    }

    /// Resolve a category by name.
    fn resolve_category(&self, name: &str) -> Result<Category> {
        self.categories()?
            .into_iter()
            .find(|category| category.category_name == name)
            .ok_or_else(|| Error::UnknownCategory(name.to_string()))
    }

    /// Reassign positions `1..=N` over a fresh read, ordered by current
    /// position. Returns how many rows were rewritten.
    fn renumber(&self) -> Result<usize> {
        let todos = self.list_all()?;
        let mut cells = Vec::new();
        let mut target = 0_i64;
        for todo in &todos {
            target += 1;
            if todo.position != target {
                let locator = self.locate(todo.task_id)?;
                cells.push(CellUpdate::new(locator, COL_POSITION, target));
            }
        }
        if cells.is_empty() {
            return Ok(0);
        }
        let count = cells.len();
        self.store.batch_update(TASKS_TABLE, &cells)?;
        Ok(count)
    }
}

/// Decode one stored row into a todo, joining the category by id.
fn todo_from_row(row: &Row, categories: &BTreeMap<i64, String>) -> Result<Todo> {
    let task_id = row.int(COL_TASK_ID)?;
    let category_id = row.int(COL_CATEGORY_ID)?;
    let category = categories
        .get(&category_id)
        .ok_or_else(|| Error::Storage(Box::new(DanglingCategoryId { task_id, category_id })))?
        .clone();

    Ok(Todo {
        task_id,
        task: row.text(COL_TASK)?.to_string(),
        category,
        date_added: row.text(COL_DATE_ADDED)?.to_string(),
        due_date: row.opt_text(COL_DUE_DATE).map(str::to_string),
        date_completed: row.opt_text(COL_DATE_COMPLETED).map(str::to_string),
        position: row.int(COL_POSITION)?,
    })
}
