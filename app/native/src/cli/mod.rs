//! CLI module for the IVI shell.
//!
//! The shell itself runs inside a host compositor; the CLI works on the
//! configuration and can replay scripted sessions against a headless shell.

mod commands;
mod output;

use clap::Parser;
pub use commands::Cli;
pub use commands::replay::{ReplayReport, ReplayScript, ReplayStep, load_script, run_script};

use crate::error::IviShellError;

/// Runs the CLI.
///
/// Parses command-line arguments and executes the appropriate command.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn run() -> Result<(), IviShellError> {
    let cli = Cli::parse();
    cli.execute()
}
