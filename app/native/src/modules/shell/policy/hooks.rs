//! The synchronous hook set and the rule types shared with the rule engine.

use serde::Serialize;
use uuid::Uuid;

use crate::modules::shell::state::{ClientId, OutputId, ShellInterface, Surface};

/// Event value for "show the application".
pub const EVENT_SHOW: u32 = 0;

/// Event value for "hide the application".
pub const EVENT_HIDE: u32 = 1;

/// Unique identifier of a registered rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct RuleId(pub Uuid);

impl RuleId {
    /// Generate a new time-ordered rule ID.
    #[must_use]
    pub fn new() -> Self { Self(Uuid::now_v7()) }
}

impl Default for RuleId {
    fn default() -> Self { Self::new() }
}

/// A registered rule: when the engine enters `state`, raise `event` for
/// `app_id` on `output`, after `timeout_ms` milliseconds (0 = immediately).
///
/// Deferred timers carry a clone of the rule, so a firing uses exactly the
/// values captured when it was armed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PolicyRule {
    pub id: RuleId,
    pub app_id: String,
    pub state: u32,
    pub event: u32,
    pub timeout_ms: u32,
    pub output: OutputId,
}

/// The layout operation a fired rule resolves to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RuleAction {
    Activate { output: OutputId, app_id: String },
    Deactivate { app_id: String },
}

/// Identity of a client asking to bind one of the shell interfaces.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ClientInfo {
    pub id: ClientId,
    pub pid: Option<u32>,
    /// Security label of the client socket, if the host provides one.
    pub label: Option<String>,
}

impl ClientInfo {
    /// A client without credentials.
    #[must_use]
    pub const fn new(id: ClientId) -> Self { Self { id, pid: None, label: None } }

    /// Attach a security label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Show and hide resolve to activate and deactivate; other events do nothing.
#[must_use]
pub fn default_try_event(rule: &PolicyRule) -> Option<RuleAction> {
    match rule.event {
        EVENT_SHOW => Some(RuleAction::Activate {
            output: rule.output,
            app_id: rule.app_id.clone(),
        }),
        EVENT_HIDE => Some(RuleAction::Deactivate { app_id: rule.app_id.clone() }),
        _ => None,
    }
}

/// Predicates consulted before every role transition.
///
/// Every method has a permissive default, so a hook set only overrides what
/// it cares about and keeps working when new hooks are added. Returning
/// `false` silently vetoes the operation.
pub trait PolicyHooks: Send {
    /// Short engine name for logs.
    fn name(&self) -> &'static str;

    fn surface_create(&self, _surface: &Surface) -> bool { true }

    /// Called on every client commit; must stay cheap.
    fn surface_committed(&self, _surface: &Surface) -> bool { true }

    fn surface_activate(&self, _surface: &Surface) -> bool { true }

    fn surface_deactivate(&self, _surface: &Surface) -> bool { true }

    fn surface_activate_by_default(&self, _surface: &Surface) -> bool { true }

    fn surface_advertise_state_change(&self, _surface: &Surface) -> bool { true }

    /// A `false` return is reported to the client as "not authorized".
    fn shell_bind_interface(&mut self, _client: &ClientInfo, _interface: ShellInterface) -> bool {
        true
    }

    /// Consulted before a rule is registered.
    fn rule_allow_to_add(&self) -> bool { true }

    /// Map a fired rule to a layout action.
    fn rule_try_event(&self, rule: &PolicyRule) -> Option<RuleAction> { default_try_event(rule) }
}
