//! CLI binary for the task tracker.
//!
//! This binary is a thin wrapper that parses arguments and delegates to the library.

use std::process::ExitCode;

use clap::Parser;
use task_tracker::cli::{self, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = cli::run(cli.command);

    for line in &output.stdout {
        println!("{line}");
    }
    for line in &output.stderr {
        eprintln!("{line}");
    }

    output.exit_code
}
