//! Path utilities for determining data storage locations.
//!
//! The tracker keeps its database, config file, and activity log together in
//! `~/.task-tracker/`. The `TASK_TRACKER_HOME` environment variable overrides
//! the whole directory; tests use it to point at temporary locations.

use std::path::PathBuf;

/// The base directory name for tracker data.
const DATA_DIR_NAME: &str = ".task-tracker";

/// Environment variable that overrides the data directory.
pub const HOME_OVERRIDE_ENV: &str = "TASK_TRACKER_HOME";

/// The database filename.
pub const DATABASE_FILENAME: &str = "todos.sqlite3";

/// The config filename.
pub const CONFIG_FILENAME: &str = "config.yaml";

/// The activity log filename.
pub const ACTIVITY_LOG_FILENAME: &str = "activity.jsonl";

/// Get the base data directory for the tracker.
///
/// A non-empty `TASK_TRACKER_HOME` wins over the default `~/.task-tracker/`.
/// Returns `None` if neither the override nor a home directory is available.
#[must_use]
pub fn data_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(HOME_OVERRIDE_ENV) {
        if !dir.is_empty() {
            return Some(PathBuf::from(dir));
        }
    }
    dirs::home_dir().map(|home| home.join(DATA_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[serial_test::serial]
    fn test_data_dir_honors_override() {
        std::env::set_var(HOME_OVERRIDE_ENV, "/tmp/tracker-test-home");
        assert_eq!(data_dir(), Some(PathBuf::from("/tmp/tracker-test-home")));
        std::env::remove_var(HOME_OVERRIDE_ENV);
    }

    #[test]
    #[serial_test::serial]
    fn test_data_dir_ignores_empty_override() {
        std::env::set_var(HOME_OVERRIDE_ENV, "");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(data_dir(), Some(home.join(DATA_DIR_NAME)));
        }
        std::env::remove_var(HOME_OVERRIDE_ENV);
    }

    #[test]
    #[serial_test::serial]
    fn test_data_dir_defaults_to_home() {
        std::env::remove_var(HOME_OVERRIDE_ENV);
        if let Some(home) = dirs::home_dir() {
            assert_eq!(data_dir(), Some(home.join(".task-tracker")));
        }
    }
}
