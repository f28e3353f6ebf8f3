//! Error types for `task_tracker`.

/// Errors that can occur while tracking tasks.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON parsing error occurred.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error occurred.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A required field was missing or malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// A category reference did not resolve to an existing category.
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    /// No live todo has the given identifier.
    #[error("no todo with id {0}")]
    NotFound(i64),

    /// A reorder target was outside the valid position range.
    #[error("invalid position {position}: must be between 1 and {count}")]
    InvalidPosition {
        /// The requested position.
        position: i64,
        /// The number of live todos.
        count: i64,
    },

    /// A category with the given name already exists.
    #[error("category already exists: {0}")]
    DuplicateCategory(String),

    /// The backing store failed or returned unusable data.
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(Box::new(err))
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
