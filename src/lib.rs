//! # `task_tracker`
//!
//! Core library for a personal task tracker: todos with categories, due
//! dates, and a hand-kept ordering, persisted through a pluggable row store.

pub mod activity_log;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod paths;
pub mod store;
pub mod testing;
pub mod todo;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }
}
