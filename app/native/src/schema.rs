//! JSON Schema for the configuration file.

use schemars::schema_for;

use crate::config::ShellConfig;

/// Render the configuration schema as pretty-printed JSON.
#[must_use]
pub fn print_schema() -> String {
    let schema = schema_for!(ShellConfig);
    serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string())
}
