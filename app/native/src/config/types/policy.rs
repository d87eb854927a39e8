//! Policy configuration types.

use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default location of the arbitration model.
pub const DEFAULT_RBA_MODEL: &str = "/etc/rba/RBAModel.json";

/// Which hook set to install.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyEngineKind {
    /// Allow everything.
    #[default]
    AllowAll,
    /// Allow only listed apps and labelled clients.
    DenyAll,
    /// Ask the arbitration model.
    Rba,
}

/// Security labels allowed to bind each interface (deny-all engine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct BindLabels {
    pub shell: Vec<String>,
    pub desktop: Vec<String>,
}

impl Default for BindLabels {
    fn default() -> Self {
        Self {
            shell: vec!["User::App::homescreen".to_string()],
            desktop: vec!["User::App::launcher".to_string()],
        }
    }
}

/// An extra state or event name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyConfig {
    pub value: u32,
    pub name: String,
}

/// A rule registered at startup, once its output exists.
///
/// States and events are referenced by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuleConfig {
    pub app_id: String,
    pub state: String,
    pub event: String,
    #[serde(default)]
    pub timeout_ms: u32,
    pub output: String,
}

/// The `policy` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct PolicyConfig {
    pub engine: PolicyEngineKind,

    /// App-ids the deny-all engine permits. Empty means the built-in list.
    pub permitted_apps: Vec<String>,

    pub bind_labels: BindLabels,

    /// Arbitration model for the rba engine.
    pub rba_model: PathBuf,

    pub states: Vec<VocabularyConfig>,
    pub events: Vec<VocabularyConfig>,
    pub rules: Vec<RuleConfig>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            engine: PolicyEngineKind::default(),
            permitted_apps: Vec::new(),
            bind_labels: BindLabels::default(),
            rba_model: PathBuf::from(DEFAULT_RBA_MODEL),
            states: Vec::new(),
            events: Vec::new(),
            rules: Vec::new(),
        }
    }
}
