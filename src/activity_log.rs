//! Activity logging.
//!
//! When `log_activity` is enabled in the config, every mutating operation is
//! appended as a JSONL line to `activity.jsonl` in the data directory. The
//! log is an audit trail for inspecting what changed and when.
//!
//! Errors are silently ignored; logging never breaks the operation that
//! triggered it.

use crate::config::TrackerConfig;
use crate::paths;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Log a mutating operation if activity logging is enabled.
///
/// Resolves the data directory and checks the config for the `log_activity`
/// flag. If enabled, appends a JSONL line containing the operation name, a
/// timestamp, and the caller-supplied detail value.
pub fn log_operation(operation: &str, detail: &serde_json::Value) {
    if let Some(data_dir) = paths::data_dir() {
        log_operation_in(operation, detail, &data_dir);
    }
}

/// Log an operation against a specific data directory (for testing).
pub fn log_operation_in(operation: &str, detail: &serde_json::Value, data_dir: &Path) {
    // Load config; if it fails, skip logging
    let Ok(Some(config)) = TrackerConfig::load_from(data_dir) else {
        return;
    };

    if !config.log_activity {
        return;
    }

    write_entry(operation, detail, data_dir);
}

/// Write the log entry to the activity log file.
fn write_entry(operation: &str, detail: &serde_json::Value, data_dir: &Path) {
    if std::fs::create_dir_all(data_dir).is_err() {
        return;
    }

    let log_path = data_dir.join(paths::ACTIVITY_LOG_FILENAME);

    let entry = serde_json::json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "operation": operation,
        "detail": detail,
    });

    let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&log_path) else {
        return;
    };

    // One entry per line
    let _ = writeln!(file, "{entry}");
}
