//! Category CLI subcommands.

use clap::Subcommand;

/// Category management commands.
///
/// Categories group todos and are referenced by name. Names are unique;
/// adding a duplicate fails.
#[derive(Subcommand, Debug, Clone)]
pub enum CategoryCommand {
    /// List categories in id order.
    List,

    /// Add a new category.
    Add {
        /// Category name; must be unique
        name: String,
    },
}
