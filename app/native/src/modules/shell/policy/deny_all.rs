//! Restrictive hook set.
//!
//! Surfaces are only allowed for a fixed list of permitted app-ids, and a
//! client may only bind a shell interface when its security label is listed
//! for that interface. A client without a label is always refused.

use super::hooks::{ClientInfo, PolicyHooks};
use crate::config::BindLabels;
use crate::modules::shell::state::{ShellInterface, Surface};

/// App-ids permitted when the configuration does not name any.
pub const DEFAULT_PERMITTED_APPS: &[&str] =
    &["homescreen", "alexa-viewer", "launcher", "hvac", "navigation", "mediaplayer"];

/// Deny-by-default hooks.
#[derive(Debug, Clone)]
pub struct DenyAll {
    permitted_apps: Vec<String>,
    bind_labels: BindLabels,
}

impl DenyAll {
    /// Create the hook set. An empty `permitted_apps` falls back to
    /// [`DEFAULT_PERMITTED_APPS`].
    #[must_use]
    pub fn new(permitted_apps: &[String], bind_labels: BindLabels) -> Self {
        let permitted_apps = if permitted_apps.is_empty() {
            DEFAULT_PERMITTED_APPS.iter().map(ToString::to_string).collect()
        } else {
            permitted_apps.to_vec()
        };
        Self { permitted_apps, bind_labels }
    }

    fn permitted(&self, surface: &Surface) -> bool {
        surface.app_id().is_some_and(|app_id| self.permitted_apps.iter().any(|p| p == app_id))
    }
}

impl Default for DenyAll {
    fn default() -> Self { Self::new(&[], BindLabels::default()) }
}

impl PolicyHooks for DenyAll {
    fn name(&self) -> &'static str { "deny-all" }

    fn surface_create(&self, surface: &Surface) -> bool { self.permitted(surface) }

    fn surface_committed(&self, surface: &Surface) -> bool { self.permitted(surface) }

    fn surface_activate(&self, surface: &Surface) -> bool { self.permitted(surface) }

    fn surface_deactivate(&self, surface: &Surface) -> bool { self.permitted(surface) }

    fn surface_activate_by_default(&self, surface: &Surface) -> bool { self.permitted(surface) }

    fn surface_advertise_state_change(&self, surface: &Surface) -> bool {
        self.permitted(surface)
    }

    fn shell_bind_interface(&mut self, client: &ClientInfo, interface: ShellInterface) -> bool {
        let Some(label) = client.label.as_deref() else {
            return false;
        };

        let allowed = match interface {
            ShellInterface::Shell => &self.bind_labels.shell,
            ShellInterface::Desktop => &self.bind_labels.desktop,
        };

        let ok = allowed.iter().any(|l| l == label);
        if ok {
            tracing::info!(
                client = %client.id,
                pid = ?client.pid,
                label,
                interface = interface.name(),
                "policy: client allowed to bind"
            );
        }
        ok
    }
}
