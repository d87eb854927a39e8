//! IVI Shell - the shell layer of an in-vehicle infotainment compositor.
//!
//! Decides, for every application surface, which output it appears on, how
//! it is sized and positioned, which layer it occupies and when it becomes
//! visible. Roles come from a privileged shell client (background, panels),
//! from pre-registered application properties (popup, fullscreen, split,
//! remote) or default to desktop. A pluggable policy engine can veto any
//! transition and drive activation from system state changes.
//!
//! The shell is host-agnostic: it consumes surface, head and protocol
//! notifications and produces [`modules::shell::ShellEffect`]s for the host
//! compositor to apply.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod modules;
pub mod schema;
