//! `SQLite` implementation of the row store.

use crate::error::{Error, Result};
use crate::store::{
    CellUpdate, MissingRow, Row, RowLocator, RowStore, UnknownColumn, UnknownTable, Value,
    CATEGORIES_TABLE, CATEGORY_COLUMNS, TASKS_TABLE, TASK_COLUMNS,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

const NULL_VALUE: Value = Value::Null;

impl rusqlite::ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        match self {
            Self::Int(n) => n.to_sql(),
            Self::Text(s) => s.to_sql(),
            Self::Null => Ok(rusqlite::types::ToSqlOutput::Owned(rusqlite::types::Value::Null)),
        }
    }
}

/// `SQLite`-backed row store.
///
/// Holds only the database path; each operation opens a short-lived
/// connection. The schema is created on construction. Row locators are
/// `SQLite` rowids, which stay stable across mutations of other rows but are
/// still re-found per mutation as the trait requires.
#[derive(Debug, Clone)]
pub struct SqliteRowStore {
    db_path: PathBuf,
}

impl SqliteRowStore {
    /// Create a store at the given database path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let store = Self { db_path: db_path.as_ref().to_path_buf() };
        store.init_schema()?;
        Ok(store)
    }

    /// Create a store inside a data directory, using the standard filename.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn in_data_dir(data_dir: &Path) -> Result<Self> {
        Self::new(data_dir.join(crate::paths::DATABASE_FILENAME))
    }

    /// Get the database path.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Open a connection to the database.
    fn open(&self) -> Result<Connection> {
        if let Some(parent) = self.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&self.db_path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        Ok(conn)
    }

    /// Initialize the database schema.
    ///
    /// The UNIQUE constraints guard identifier columns against duplicates;
    /// referential integrity between the tables is the repository's job.
    fn init_schema(&self) -> Result<()> {
        let conn = self.open()?;
        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS tasks (
                task_id INTEGER NOT NULL UNIQUE,
                task TEXT NOT NULL,
                category_id INTEGER NOT NULL,
                date_added TEXT NOT NULL,
                due_date TEXT,
                date_completed TEXT,
                position INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS categories (
                category_id INTEGER NOT NULL UNIQUE,
                category_name TEXT NOT NULL UNIQUE
            );

            CREATE INDEX IF NOT EXISTS idx_tasks_position ON tasks(position);
            ",
        )?;
        Ok(())
    }

    fn table_columns(table: &str) -> Result<&'static [&'static str]> {
        match table {
            TASKS_TABLE => Ok(&TASK_COLUMNS),
            CATEGORIES_TABLE => Ok(&CATEGORY_COLUMNS),
            _ => Err(Error::Storage(Box::new(UnknownTable(table.to_string())))),
        }
    }

    /// Reject column names outside the table's schema before they reach SQL.
    fn check_column(table: &str, column: &str) -> Result<()> {
        if Self::table_columns(table)?.contains(&column) {
            Ok(())
        } else {
            Err(Error::Storage(Box::new(UnknownColumn {
                table: table.to_string(),
                column: column.to_string(),
            })))
        }
    }

    /// Decode one result row into a column/value map.
    fn parse_row(columns: &[&str], sql_row: &rusqlite::Row) -> rusqlite::Result<Row> {
        let mut row = Row::new();
        for (idx, column) in columns.iter().enumerate() {
            let value = match sql_row.get_ref(idx)? {
                rusqlite::types::ValueRef::Null => Value::Null,
                rusqlite::types::ValueRef::Integer(n) => Value::Int(n),
                rusqlite::types::ValueRef::Text(bytes) => {
                    Value::Text(String::from_utf8_lossy(bytes).into_owned())
                }
                other => {
                    return Err(rusqlite::Error::InvalidColumnType(
                        idx,
                        (*column).to_string(),
                        other.data_type(),
                    ))
                }
            };
            row.set(column, value);
        }
        Ok(row)
    }

    fn missing_row(table: &str, locator: RowLocator) -> Error {
        Error::Storage(Box::new(MissingRow { table: table.to_string(), locator }))
    }
}

impl RowStore for SqliteRowStore {
    fn read_rows(&self, table: &str) -> Result<Vec<Row>> {
        let columns = Self::table_columns(table)?;
        let conn = self.open()?;
        let sql = format!("SELECT {} FROM {table}", columns.join(", "));
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |sql_row| Self::parse_row(columns, sql_row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn append_row(&self, table: &str, row: &Row) -> Result<()> {
        let columns = Self::table_columns(table)?;
        let conn = self.open()?;

        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            columns.join(", "),
            placeholders.join(", ")
        );

        let params: Vec<&dyn rusqlite::ToSql> = columns
            .iter()
            .map(|column| row.get(column).unwrap_or(&NULL_VALUE) as &dyn rusqlite::ToSql)
            .collect();
        conn.execute(&sql, params.as_slice())?;
        Ok(())
    }

    fn update_cell(
        &self,
        table: &str,
        locator: RowLocator,
        column: &str,
        value: Value,
    ) -> Result<()> {
        Self::check_column(table, column)?;
        let conn = self.open()?;
        let sql = format!("UPDATE {table} SET {column} = ?1 WHERE rowid = ?2");
        let changed = conn.execute(&sql, params![value, locator.raw()])?;
        if changed == 0 {
            return Err(Self::missing_row(table, locator));
        }
        Ok(())
    }

    /// Apply the whole batch inside one transaction.
    fn batch_update(&self, table: &str, updates: &[CellUpdate]) -> Result<()> {
        if updates.is_empty() {
            return Ok(());
        }
        for update in updates {
            Self::check_column(table, &update.column)?;
        }

        let mut conn = self.open()?;
        let tx = conn.transaction()?;
        for update in updates {
            let sql = format!("UPDATE {table} SET {} = ?1 WHERE rowid = ?2", update.column);
            let changed = tx.execute(&sql, params![update.value, update.locator.raw()])?;
            if changed == 0 {
                return Err(Self::missing_row(table, update.locator));
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_row(&self, table: &str, locator: RowLocator) -> Result<()> {
        Self::table_columns(table)?;
        let conn = self.open()?;
        let sql = format!("DELETE FROM {table} WHERE rowid = ?1");
        let changed = conn.execute(&sql, params![locator.raw()])?;
        if changed == 0 {
            return Err(Self::missing_row(table, locator));
        }
        Ok(())
    }

    fn find_row(&self, table: &str, column: &str, value: &Value) -> Result<Option<RowLocator>> {
        Self::check_column(table, column)?;
        let conn = self.open()?;
        let sql = format!("SELECT rowid FROM {table} WHERE {column} = ?1 LIMIT 1");
        let rowid = conn
            .query_row(&sql, params![value], |sql_row| sql_row.get::<_, i64>(0))
            .optional()?;
        Ok(rowid.map(RowLocator::new))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{COL_CATEGORY_ID, COL_CATEGORY_NAME, COL_POSITION, COL_TASK, COL_TASK_ID};
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, SqliteRowStore) {
        let dir = TempDir::new().unwrap();
        let store = SqliteRowStore::new(dir.path().join("test.db")).unwrap();
        (dir, store)
    }

    fn task_row(id: i64, task: &str, position: i64) -> Row {
        Row::new()
            .with(COL_TASK_ID, id)
            .with(COL_TASK, task)
            .with(COL_CATEGORY_ID, 1)
            .with("date_added", "2026-01-02T03:04:05Z")
            .with(COL_POSITION, position)
    }

    #[test]
    fn test_append_and_read_rows() {
        let (_dir, store) = create_test_store();

        store.append_row(TASKS_TABLE, &task_row(1, "buy milk", 1)).unwrap();
        store.append_row(TASKS_TABLE, &task_row(2, "call bank", 2)).unwrap();

        let rows = store.read_rows(TASKS_TABLE).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].int(COL_TASK_ID).unwrap(), 1);
        assert_eq!(rows[0].text(COL_TASK).unwrap(), "buy milk");
        // Unset optional columns come back as empty cells
        assert_eq!(rows[0].opt_text("due_date"), None);
        assert_eq!(rows[0].opt_text("date_completed"), None);
    }

    #[test]
    fn test_read_rows_unknown_table() {
        let (_dir, store) = create_test_store();
        let err = store.read_rows("nonsense").unwrap_err();
        assert!(err.to_string().contains("unknown table"));
    }

    #[test]
    fn test_find_row_present_and_absent() {
        let (_dir, store) = create_test_store();
        store.append_row(TASKS_TABLE, &task_row(7, "water plants", 1)).unwrap();

        let found = store.find_row(TASKS_TABLE, COL_TASK_ID, &Value::Int(7)).unwrap();
        assert!(found.is_some());

        let missing = store.find_row(TASKS_TABLE, COL_TASK_ID, &Value::Int(99)).unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_find_row_rejects_unknown_column() {
        let (_dir, store) = create_test_store();
        let err = store.find_row(TASKS_TABLE, "no_such_column", &Value::Int(1)).unwrap_err();
        assert!(err.to_string().contains("no column"));
    }

    #[test]
    fn test_update_cell() {
        let (_dir, store) = create_test_store();
        store.append_row(TASKS_TABLE, &task_row(1, "old text", 1)).unwrap();

        let locator = store.find_row(TASKS_TABLE, COL_TASK_ID, &Value::Int(1)).unwrap().unwrap();
        store.update_cell(TASKS_TABLE, locator, COL_TASK, Value::from("new text")).unwrap();

        let rows = store.read_rows(TASKS_TABLE).unwrap();
        assert_eq!(rows[0].text(COL_TASK).unwrap(), "new text");
    }

    #[test]
    fn test_update_cell_stale_locator() {
        let (_dir, store) = create_test_store();
        store.append_row(TASKS_TABLE, &task_row(1, "doomed", 1)).unwrap();

        let locator = store.find_row(TASKS_TABLE, COL_TASK_ID, &Value::Int(1)).unwrap().unwrap();
        store.delete_row(TASKS_TABLE, locator).unwrap();

        let err = store.update_cell(TASKS_TABLE, locator, COL_TASK, Value::from("x")).unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[test]
    fn test_delete_row() {
        let (_dir, store) = create_test_store();
        store.append_row(TASKS_TABLE, &task_row(1, "a", 1)).unwrap();
        store.append_row(TASKS_TABLE, &task_row(2, "b", 2)).unwrap();

        let locator = store.find_row(TASKS_TABLE, COL_TASK_ID, &Value::Int(1)).unwrap().unwrap();
        store.delete_row(TASKS_TABLE, locator).unwrap();

        let rows = store.read_rows(TASKS_TABLE).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].int(COL_TASK_ID).unwrap(), 2);
    }

    #[test]
    fn test_batch_update_applies_all() {
        let (_dir, store) = create_test_store();
        store.append_row(TASKS_TABLE, &task_row(1, "a", 1)).unwrap();
        store.append_row(TASKS_TABLE, &task_row(2, "b", 2)).unwrap();

        let first = store.find_row(TASKS_TABLE, COL_TASK_ID, &Value::Int(1)).unwrap().unwrap();
        let second = store.find_row(TASKS_TABLE, COL_TASK_ID, &Value::Int(2)).unwrap().unwrap();

        store
            .batch_update(
                TASKS_TABLE,
                &[
                    CellUpdate::new(first, COL_POSITION, 2),
                    CellUpdate::new(second, COL_POSITION, 1),
                ],
            )
            .unwrap();

        let rows = store.read_rows(TASKS_TABLE).unwrap();
        assert_eq!(rows[0].int(COL_POSITION).unwrap(), 2);
        assert_eq!(rows[1].int(COL_POSITION).unwrap(), 1);
    }

    #[test]
    fn test_batch_update_rolls_back_on_stale_locator() {
        let (_dir, store) = create_test_store();
        store.append_row(TASKS_TABLE, &task_row(1, "a", 1)).unwrap();

        let good = store.find_row(TASKS_TABLE, COL_TASK_ID, &Value::Int(1)).unwrap().unwrap();
        let stale = RowLocator::new(good.raw() + 100);

        let err = store
            .batch_update(
                TASKS_TABLE,
                &[
                    CellUpdate::new(good, COL_POSITION, 42),
                    CellUpdate::new(stale, COL_POSITION, 43),
                ],
            )
            .unwrap_err();
        assert!(matches!(err, Error::Storage(_)));

        // The first assignment must not have stuck
        let rows = store.read_rows(TASKS_TABLE).unwrap();
        assert_eq!(rows[0].int(COL_POSITION).unwrap(), 1);
    }

    #[test]
    fn test_duplicate_task_id_rejected_by_schema() {
        let (_dir, store) = create_test_store();
        store.append_row(TASKS_TABLE, &task_row(1, "first", 1)).unwrap();
        let err = store.append_row(TASKS_TABLE, &task_row(1, "second", 2)).unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[test]
    fn test_categories_round_trip() {
        let (_dir, store) = create_test_store();
        let row = Row::new().with(COL_CATEGORY_ID, 1).with(COL_CATEGORY_NAME, "Errands");
        store.append_row(CATEGORIES_TABLE, &row).unwrap();

        let rows = store.read_rows(CATEGORIES_TABLE).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].int(COL_CATEGORY_ID).unwrap(), 1);
        assert_eq!(rows[0].text(COL_CATEGORY_NAME).unwrap(), "Errands");
    }

    #[test]
    fn test_reopen_persists() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("persist.db");

        {
            let store = SqliteRowStore::new(&db_path).unwrap();
            store.append_row(TASKS_TABLE, &task_row(5, "stays", 1)).unwrap();
        }

        let store = SqliteRowStore::new(&db_path).unwrap();
        let rows = store.read_rows(TASKS_TABLE).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text(COL_TASK).unwrap(), "stays");
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("deep").join("nested").join("todos.db");
        let store = SqliteRowStore::new(&nested).unwrap();
        store.append_row(TASKS_TABLE, &task_row(1, "x", 1)).unwrap();
        assert!(nested.exists());
    }
}
