//! Rule-based arbitration hooks.
//!
//! Surface activation is delegated to an [`Arbitrator`], which decides per
//! content id (`<app_id>/NORMAL`). The arbitration model is loaded lazily the
//! first time a client binds a shell interface; if it cannot be loaded the
//! bind is refused.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::error::PolicyError;
use super::hooks::{ClientInfo, PolicyHooks, PolicyRule, RuleAction};
use crate::modules::shell::state::{ShellInterface, Surface};

/// Content id consulted for applications missing from the model.
pub const UNKNOWN_CONTENT: &str = "unknown_app/NORMAL";

/// Outcome of one arbitration request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArbitrationStatus {
    Success,
    UnknownContentState,
    Failed,
    CancelError,
}

/// Decides whether a content may be shown.
pub trait Arbitrator: Send {
    fn execute(&self, content: &str) -> ArbitrationStatus;
}

/// On-disk arbitration model.
#[derive(Debug, Default, Deserialize)]
struct ArbitrationModel {
    #[serde(default)]
    contents: HashMap<String, ArbitrationStatus>,
}

/// Arbitrator backed by a JSON model mapping content ids to results.
///
/// ```json
/// { "contents": { "navigation/NORMAL": "success", "unknown_app/NORMAL": "success" } }
/// ```
#[derive(Debug, Default)]
pub struct JsonModelArbitrator {
    contents: HashMap<String, ArbitrationStatus>,
}

impl JsonModelArbitrator {
    /// Load a model from disk.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::ModelUnavailable`] if the file is missing or is
    /// not a valid model.
    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PolicyError::ModelUnavailable(format!("{}: {e}", path.display())))?;
        Self::from_json(&content)
    }

    /// Parse a model from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::ModelUnavailable`] if the JSON is not a model.
    pub fn from_json(json: &str) -> Result<Self, PolicyError> {
        let model: ArbitrationModel = serde_json::from_str(json)
            .map_err(|e| PolicyError::ModelUnavailable(e.to_string()))?;
        Ok(Self { contents: model.contents })
    }
}

impl Arbitrator for JsonModelArbitrator {
    fn execute(&self, content: &str) -> ArbitrationStatus {
        self.contents.get(content).copied().unwrap_or(ArbitrationStatus::UnknownContentState)
    }
}

/// Hooks delegating activation to an arbitrator.
pub struct Rba {
    model_path: PathBuf,
    allow_unregistered_app: bool,
    arbitrator: Option<Box<dyn Arbitrator>>,
}

impl std::fmt::Debug for Rba {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rba")
            .field("model_path", &self.model_path)
            .field("allow_unregistered_app", &self.allow_unregistered_app)
            .field("loaded", &self.arbitrator.is_some())
            .finish()
    }
}

impl Rba {
    /// Hooks that load the JSON model at `model_path` on first bind.
    #[must_use]
    pub fn new(model_path: impl Into<PathBuf>, allow_unregistered_app: bool) -> Self {
        Self {
            model_path: model_path.into(),
            allow_unregistered_app,
            arbitrator: None,
        }
    }

    /// Hooks using an already constructed arbitrator.
    #[must_use]
    pub fn with_arbitrator(arbitrator: Box<dyn Arbitrator>, allow_unregistered_app: bool) -> Self {
        Self {
            model_path: PathBuf::new(),
            allow_unregistered_app,
            arbitrator: Some(arbitrator),
        }
    }

    /// Load the model unless it is already loaded.
    fn ensure_loaded(&mut self) -> Result<(), PolicyError> {
        if self.arbitrator.is_some() {
            tracing::debug!("policy: arbitration model already loaded");
            return Ok(());
        }
        let arbitrator = JsonModelArbitrator::load(&self.model_path)?;
        tracing::info!(path = %self.model_path.display(), "policy: arbitration model loaded");
        self.arbitrator = Some(Box::new(arbitrator));
        Ok(())
    }

    /// Arbitrate an app-id.
    fn arbitrate(&self, app_id: &str) -> bool {
        let Some(arbitrator) = self.arbitrator.as_deref() else {
            tracing::warn!(app_id, "policy: no arbitration model loaded, refusing activation");
            return false;
        };

        let mut status = arbitrator.execute(&format!("{app_id}/NORMAL"));
        if status == ArbitrationStatus::UnknownContentState {
            tracing::error!(app_id, "policy: unknown arbitration content");
            if !self.allow_unregistered_app {
                return false;
            }
            tracing::warn!(
                app_id,
                "policy: allowing unregistered application, \
                 disable allowUnregisteredApp for release builds"
            );
            status = arbitrator.execute(UNKNOWN_CONTENT);
        }

        match status {
            ArbitrationStatus::Failed | ArbitrationStatus::CancelError => {
                tracing::error!(app_id, ?status, "policy: arbitration refused");
                false
            }
            ArbitrationStatus::Success | ArbitrationStatus::UnknownContentState => true,
        }
    }
}

impl PolicyHooks for Rba {
    fn name(&self) -> &'static str { "rba" }

    fn surface_activate(&self, surface: &Surface) -> bool {
        let Some(app_id) = surface.app_id() else {
            tracing::warn!(
                surface = %surface.id,
                "policy: surface without app-id, activation refused"
            );
            return false;
        };
        self.arbitrate(app_id)
    }

    fn shell_bind_interface(&mut self, _client: &ClientInfo, _interface: ShellInterface) -> bool {
        match self.ensure_loaded() {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(error = %err, "policy: cannot initialise arbitration");
                false
            }
        }
    }

    fn rule_try_event(&self, _rule: &PolicyRule) -> Option<RuleAction> { None }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::modules::shell::policy::hooks::RuleId;
    use crate::modules::shell::state::{ClientId, OutputId, SurfaceId};

    const MODEL: &str = r#"{
        "contents": {
            "navigation/NORMAL": "success",
            "media/NORMAL": "failed",
            "radio/NORMAL": "cancel_error",
            "unknown_app/NORMAL": "success"
        }
    }"#;

    fn rba(allow_unregistered: bool) -> Rba {
        let arbitrator = JsonModelArbitrator::from_json(MODEL).unwrap();
        Rba::with_arbitrator(Box::new(arbitrator), allow_unregistered)
    }

    fn surface(app_id: Option<&str>) -> Surface {
        Surface::new(SurfaceId(1), ClientId(1), app_id.map(ToString::to_string))
    }

    mod arbitration_tests {
        use super::*;

        #[test]
        fn test_known_content_success() {
            assert!(rba(false).surface_activate(&surface(Some("navigation"))));
        }

        #[test]
        fn test_failed_and_cancel_refuse() {
            let hooks = rba(true);
            assert!(!hooks.surface_activate(&surface(Some("media"))));
            assert!(!hooks.surface_activate(&surface(Some("radio"))));
        }

        #[test]
        fn test_unknown_app_refused_by_default() {
            assert!(!rba(false).surface_activate(&surface(Some("browser"))));
        }

        #[test]
        fn test_unknown_app_falls_back_when_allowed() {
            assert!(rba(true).surface_activate(&surface(Some("browser"))));
        }

        #[test]
        fn test_surface_without_app_id_refused() {
            assert!(!rba(true).surface_activate(&surface(None)));
        }

        #[test]
        fn test_no_rule_actions() {
            let rule = PolicyRule {
                id: RuleId::new(),
                app_id: "navigation".into(),
                state: 1,
                event: 0,
                timeout_ms: 0,
                output: OutputId(1),
            };
            assert_eq!(rba(false).rule_try_event(&rule), None);
        }
    }

    mod model_tests {
        use super::*;

        #[test]
        fn test_bind_fails_without_model() {
            let mut hooks = Rba::new("/nonexistent/rba/RBAModel.json", false);
            let client = ClientInfo::new(ClientId(1));
            assert!(!hooks.shell_bind_interface(&client, ShellInterface::Shell));
            assert!(!hooks.surface_activate(&surface(Some("navigation"))));
        }

        #[test]
        fn test_bind_loads_model_lazily() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            file.write_all(MODEL.as_bytes()).unwrap();

            let mut hooks = Rba::new(file.path(), false);
            assert!(!hooks.surface_activate(&surface(Some("navigation"))));

            let client = ClientInfo::new(ClientId(1));
            assert!(hooks.shell_bind_interface(&client, ShellInterface::Shell));
            assert!(hooks.surface_activate(&surface(Some("navigation"))));
            assert!(hooks.shell_bind_interface(&client, ShellInterface::Desktop));
        }

        #[test]
        fn test_invalid_model_rejected() {
            let err = JsonModelArbitrator::from_json("{ not json").unwrap_err();
            assert!(matches!(err, PolicyError::ModelUnavailable(_)));
        }
    }
}
