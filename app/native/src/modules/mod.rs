//! Feature modules of the IVI shell.
//!
//! - [`shell`] - Surface roles, output management, layout and policy

pub mod shell;
