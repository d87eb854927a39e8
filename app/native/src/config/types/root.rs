//! Root configuration type and loading.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

use std::fs;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::general::{CoreConfig, ShellClientConfig};
use super::outputs::{OutputConfig, resolve_output_config};
use super::policy::PolicyConfig;
use crate::modules::shell::policy::Vocabulary;

/// Name of the configuration directory.
const APP_DIR: &str = "ivi-shell";

/// Configuration file names to search for (in priority order).
const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ShellConfig {
    /// Layout behaviour.
    pub core: CoreConfig,

    /// Hook set, vocabulary and preloaded rules.
    pub policy: PolicyConfig,

    /// Per-output sections.
    pub outputs: Vec<OutputConfig>,

    /// Shell client launched alongside the compositor.
    pub shell_client: ShellClientConfig,
}

impl ShellConfig {
    /// Check references the loader cannot: `sameAs` chains, and the state
    /// and event names used by rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for output in &self.outputs {
            resolve_output_config(&self.outputs, &output.name)?;
        }

        let mut vocabulary = Vocabulary::default();
        for entry in &self.policy.states {
            vocabulary.add_state(entry.value, &entry.name);
        }
        for entry in &self.policy.events {
            vocabulary.add_event(entry.value, &entry.name);
        }

        for rule in &self.policy.rules {
            let checked = vocabulary
                .state_by_name(&rule.state)
                .and_then(|_| vocabulary.event_by_name(&rule.event));
            if let Err(err) = checked {
                return Err(ConfigError::Invalid(format!("rule for '{}': {err}", rule.app_id)));
            }
        }
        Ok(())
    }
}

/// Errors that can occur when loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    #[error("No configuration file found. Expected at ~/.config/ivi-shell/config.jsonc")]
    NotFound,

    /// The configuration file exists but could not be read.
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// The configuration file contains invalid JSON.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] serde_json::Error),

    /// The configuration parsed but is inconsistent.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Returns the possible configuration file paths in priority order.
///
/// 1. `$XDG_CONFIG_HOME/ivi-shell/` if the variable is set
/// 2. `~/.config/ivi-shell/`
/// 3. the platform configuration directory
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut dirs_to_search = Vec::new();

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        dirs_to_search.push(PathBuf::from(xdg_config).join(APP_DIR));
    }
    if let Some(home) = dirs::home_dir() {
        dirs_to_search.push(home.join(".config").join(APP_DIR));
    }
    if let Some(config_dir) = dirs::config_dir() {
        dirs_to_search.push(config_dir.join(APP_DIR));
    }

    let mut paths = Vec::new();
    for dir in dirs_to_search {
        for filename in CONFIG_FILE_NAMES {
            let path = dir.join(filename);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }
    paths
}

/// Loads the configuration from the first available config file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists, or any
/// error from [`load_config_from_path`].
pub fn load_config() -> Result<(ShellConfig, PathBuf), ConfigError> {
    for path in config_paths() {
        if path.exists() {
            return load_config_from_path(&path);
        }
    }

    Err(ConfigError::NotFound)
}

/// Loads the configuration from a specific file.
///
/// # Errors
///
/// Returns `ConfigError::IoError` if the file could not be read and
/// `ConfigError::ParseError` if it is not valid JSONC.
pub fn load_config_from_path(path: &Path) -> Result<(ShellConfig, PathBuf), ConfigError> {
    let file = fs::File::open(path)?;
    let reader = json_comments::StripComments::new(file);
    let config: ShellConfig = serde_json::from_reader(reader)?;
    Ok((config, path.to_path_buf()))
}
