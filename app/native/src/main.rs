#![allow(clippy::multiple_crate_versions)]

//! IVI shell command-line tool.
//!
//! Inspects and validates the shell configuration and replays scripted shell
//! sessions headlessly (e.g., `ivi-shell replay boot.jsonc`).

fn main() {
    if let Err(err) = ivi_shell_lib::cli::run() {
        eprintln!("ivi-shell: {err}");
        std::process::exit(1);
    }
}
