//! General configuration: the `core` and `shellClient` sections.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The `core` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CoreConfig {
    /// Map desktop surfaces as soon as they commit their first frame.
    pub activate_by_default: bool,

    /// Let the rba engine fall back to the generic unknown-app content.
    pub allow_unregistered_app: bool,
}

impl Default for CoreConfig {
    fn default() -> Self { Self { activate_by_default: true, allow_unregistered_app: false } }
}

/// The `shellClient` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ShellClientConfig {
    /// Command line of the shell client to launch with the compositor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}
