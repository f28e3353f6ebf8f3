//! Testing utilities and mock implementations.
//!
//! These types are provided for use in tests. They may appear unused in
//! the library itself but are consumed by unit tests.

#![allow(dead_code)]

use crate::error::{Error, Result};
use crate::store::{MissingRow, Row, RowLocator, RowStore, Value};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// An in-memory row store for tests.
///
/// Tables are plain vectors behind `RefCell`; locators are serial numbers
/// that go stale when their row is deleted. The failure toggle makes every
/// operation return a storage error, for exercising error propagation.
/// Batch updates use the trait's default per-cell path, so this store has no
/// cross-row atomicity, matching the weakest backend the contract allows.
#[derive(Debug, Default)]
pub struct InMemoryRowStore {
    tables: RefCell<BTreeMap<String, Vec<(i64, Row)>>>,
    next_locator: Cell<i64>,
    fail: Cell<bool>,
}

impl InMemoryRowStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle simulated storage failure for all subsequent operations.
    pub fn set_fail(&self, fail: bool) {
        self.fail.set(fail);
    }

    /// Count rows currently held in a table.
    #[must_use]
    pub fn row_count(&self, table: &str) -> usize {
        self.tables.borrow().get(table).map_or(0, Vec::len)
    }

    fn check_fail(&self) -> Result<()> {
        if self.fail.get() {
            return Err(Error::Storage(Box::new(StoreDown)));
        }
        Ok(())
    }

    fn missing_row(table: &str, locator: RowLocator) -> Error {
        Error::Storage(Box::new(MissingRow { table: table.to_string(), locator }))
    }
}

/// Marker error produced by the failure toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreDown;

impl std::fmt::Display for StoreDown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "simulated storage outage")
    }
}

impl std::error::Error for StoreDown {}

impl RowStore for InMemoryRowStore {
    fn read_rows(&self, table: &str) -> Result<Vec<Row>> {
        self.check_fail()?;
        Ok(self
            .tables
            .borrow()
            .get(table)
            .map(|rows| rows.iter().map(|(_, row)| row.clone()).collect())
            .unwrap_or_default())
    }

    fn append_row(&self, table: &str, row: &Row) -> Result<()> {
        self.check_fail()?;
        let locator = self.next_locator.get() + 1;
        self.next_locator.set(locator);
        self.tables.borrow_mut().entry(table.to_string()).or_default().push((locator, row.clone()));
        Ok(())
    }

    fn update_cell(
        &self,
        table: &str,
        locator: RowLocator,
        column: &str,
        value: Value,
    ) -> Result<()> {
        self.check_fail()?;
        let mut tables = self.tables.borrow_mut();
        let row = tables
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|(id, _)| *id == locator.raw()))
            .ok_or_else(|| Self::missing_row(table, locator))?;
        row.1.set(column, value);
        Ok(())
    }

    fn delete_row(&self, table: &str, locator: RowLocator) -> Result<()> {
        self.check_fail()?;
        let mut tables = self.tables.borrow_mut();
        let rows = tables.get_mut(table).ok_or_else(|| Self::missing_row(table, locator))?;
        let index = rows
            .iter()
            .position(|(id, _)| *id == locator.raw())
            .ok_or_else(|| Self::missing_row(table, locator))?;
        rows.remove(index);
        Ok(())
    }

    fn find_row(&self, table: &str, column: &str, value: &Value) -> Result<Option<RowLocator>> {
        self.check_fail()?;
        Ok(self.tables.borrow().get(table).and_then(|rows| {
            rows.iter()
                .find(|(_, row)| row.get(column) == Some(value))
                .map(|(id, _)| RowLocator::new(*id))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CellUpdate, COL_TASK, COL_TASK_ID, TASKS_TABLE};

    fn sample_row(id: i64, task: &str) -> Row {
        Row::new().with(COL_TASK_ID, id).with(COL_TASK, task)
    }

    #[test]
    fn test_append_read_and_count() {
        let store = InMemoryRowStore::new();
        store.append_row(TASKS_TABLE, &sample_row(1, "a")).unwrap();
        store.append_row(TASKS_TABLE, &sample_row(2, "b")).unwrap();

        assert_eq!(store.row_count(TASKS_TABLE), 2);
        let rows = store.read_rows(TASKS_TABLE).unwrap();
        assert_eq!(rows[1].text(COL_TASK).unwrap(), "b");
    }

    #[test]
    fn test_read_missing_table_is_empty() {
        let store = InMemoryRowStore::new();
        assert!(store.read_rows("empty").unwrap().is_empty());
    }

    #[test]
    fn test_find_update_delete() {
        let store = InMemoryRowStore::new();
        store.append_row(TASKS_TABLE, &sample_row(1, "a")).unwrap();

        let locator = store.find_row(TASKS_TABLE, COL_TASK_ID, &Value::Int(1)).unwrap().unwrap();
        store.update_cell(TASKS_TABLE, locator, COL_TASK, Value::from("changed")).unwrap();
        assert_eq!(store.read_rows(TASKS_TABLE).unwrap()[0].text(COL_TASK).unwrap(), "changed");

        store.delete_row(TASKS_TABLE, locator).unwrap();
        assert_eq!(store.row_count(TASKS_TABLE), 0);
        assert!(store.find_row(TASKS_TABLE, COL_TASK_ID, &Value::Int(1)).unwrap().is_none());
    }

    #[test]
    fn test_stale_locator_errors() {
        let store = InMemoryRowStore::new();
        store.append_row(TASKS_TABLE, &sample_row(1, "a")).unwrap();
        let locator = store.find_row(TASKS_TABLE, COL_TASK_ID, &Value::Int(1)).unwrap().unwrap();
        store.delete_row(TASKS_TABLE, locator).unwrap();

        let err = store.update_cell(TASKS_TABLE, locator, COL_TASK, Value::Null).unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[test]
    fn test_locators_are_not_reused() {
        let store = InMemoryRowStore::new();
        store.append_row(TASKS_TABLE, &sample_row(1, "a")).unwrap();
        let first = store.find_row(TASKS_TABLE, COL_TASK_ID, &Value::Int(1)).unwrap().unwrap();
        store.delete_row(TASKS_TABLE, first).unwrap();

        store.append_row(TASKS_TABLE, &sample_row(2, "b")).unwrap();
        let second = store.find_row(TASKS_TABLE, COL_TASK_ID, &Value::Int(2)).unwrap().unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_failure_toggle() {
        let store = InMemoryRowStore::new();
        store.append_row(TASKS_TABLE, &sample_row(1, "a")).unwrap();

        store.set_fail(true);
        assert!(store.read_rows(TASKS_TABLE).is_err());
        assert!(store.append_row(TASKS_TABLE, &sample_row(2, "b")).is_err());
        assert!(store.find_row(TASKS_TABLE, COL_TASK_ID, &Value::Int(1)).is_err());

        store.set_fail(false);
        assert_eq!(store.row_count(TASKS_TABLE), 1);
        assert!(store.read_rows(TASKS_TABLE).is_ok());
    }

    #[test]
    fn test_default_batch_update_is_per_cell() {
        let store = InMemoryRowStore::new();
        store.append_row(TASKS_TABLE, &sample_row(1, "a")).unwrap();
        let good = store.find_row(TASKS_TABLE, COL_TASK_ID, &Value::Int(1)).unwrap().unwrap();
        let stale = RowLocator::new(good.raw() + 50);

        let err = store
            .batch_update(
                TASKS_TABLE,
                &[
                    CellUpdate::new(good, COL_TASK, "applied"),
                    CellUpdate::new(stale, COL_TASK, "never"),
                ],
            )
            .unwrap_err();
        assert!(matches!(err, Error::Storage(_)));

        // No transaction here: the first assignment stays applied
        let rows = store.read_rows(TASKS_TABLE).unwrap();
        assert_eq!(rows[0].text(COL_TASK).unwrap(), "applied");
    }
}
