//! Output configuration types.
//!
//! One section per output, looked up by the name of the head the host
//! reports. A section can clone another output with `sameAs`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::root::ConfigError;
use crate::modules::shell::state::OutputKind;

/// Longest `sameAs` chain followed before giving up.
pub const MAX_SAME_AS_DEPTH: usize = 8;

/// Output rotation and reflection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Transform {
    #[default]
    Normal,
    #[serde(rename = "90")]
    Rotate90,
    #[serde(rename = "180")]
    Rotate180,
    #[serde(rename = "270")]
    Rotate270,
    Flipped,
    #[serde(rename = "flipped-90")]
    Flipped90,
    #[serde(rename = "flipped-180")]
    Flipped180,
    #[serde(rename = "flipped-270")]
    Flipped270,
}

impl Transform {
    /// Parse a transform name, `None` if unknown.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "normal" => Self::Normal,
            "90" => Self::Rotate90,
            "180" => Self::Rotate180,
            "270" => Self::Rotate270,
            "flipped" => Self::Flipped,
            "flipped-90" => Self::Flipped90,
            "flipped-180" => Self::Flipped180,
            "flipped-270" => Self::Flipped270,
            _ => return None,
        })
    }
}

/// Configuration of one output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct OutputConfig {
    /// Name of the output (and of the head that drives it).
    pub name: String,

    /// Display mode. `off` keeps the head disabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    /// Integer output scale.
    pub scale: i32,

    /// One of `normal`, `90`, `180`, `270`, `flipped`, `flipped-90`,
    /// `flipped-180`, `flipped-270`.
    pub transform: String,

    /// Clone the named output instead of creating a new one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub same_as: Option<String>,

    /// Application pinned to this output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,

    /// `local`, `remote` or `remote-with-transmitter`.
    pub kind: OutputKind,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            mode: None,
            scale: 1,
            transform: String::new(),
            same_as: None,
            app_id: None,
            kind: OutputKind::Local,
        }
    }
}

impl OutputConfig {
    /// A section with only the name set.
    #[must_use]
    pub fn named(name: &str) -> Self { Self { name: name.to_string(), ..Self::default() } }

    /// Whether the head should stay disabled.
    #[must_use]
    pub fn is_off(&self) -> bool { self.mode.as_deref() == Some("off") }

    /// The parsed transform. Unknown values fall back to normal.
    #[must_use]
    pub fn transform(&self) -> Transform {
        if self.transform.is_empty() {
            return Transform::Normal;
        }
        Transform::parse(&self.transform).unwrap_or_else(|| {
            tracing::warn!(
                output = %self.name,
                transform = %self.transform,
                "config: invalid transform, using normal"
            );
            Transform::Normal
        })
    }
}

/// Find the section controlling the head called `name`, following `sameAs`.
///
/// Returns `Ok(None)` when no section names the head.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] for a dangling `sameAs` reference or a
/// chain longer than [`MAX_SAME_AS_DEPTH`].
pub fn resolve_output_config<'a>(
    configs: &'a [OutputConfig],
    name: &str,
) -> Result<Option<&'a OutputConfig>, ConfigError> {
    let Some(mut section) = configs.iter().find(|c| c.name == name) else {
        return Ok(None);
    };

    let mut depth = 0;
    while let Some(target) = section.same_as.as_deref() {
        depth += 1;
        if depth > MAX_SAME_AS_DEPTH {
            return Err(ConfigError::Invalid(format!(
                "sameAs chain starting at '{name}' is too deep"
            )));
        }
        section = configs.iter().find(|c| c.name == target).ok_or_else(|| {
            ConfigError::Invalid(format!("'{}' references unknown output '{target}'", section.name))
        })?;
    }

    Ok(Some(section))
}
