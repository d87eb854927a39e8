//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins when set; otherwise the level is `info`, or `debug` for
//! this crate with `--verbose`. Logs go to stderr so CLI output stays clean.

use std::sync::Once;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

static INIT: Once = Once::new();

/// Default filter directives.
#[must_use]
pub const fn default_directives(verbose: bool) -> &'static str {
    if verbose { "info,ivi_shell_lib=debug,ivi_shell=debug" } else { "info" }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(verbose: bool) {
    INIT.call_once(|| {
        let directives = std::env::var("RUST_LOG")
            .unwrap_or_else(|_| default_directives(verbose).to_string());
        let env_filter = EnvFilter::builder().parse_lossy(directives);

        let installed = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init();
        if installed.is_err() {
            tracing::debug!("logging: subscriber already installed");
        }
    });
}
