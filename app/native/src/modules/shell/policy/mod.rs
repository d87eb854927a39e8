//! Policy engine.
//!
//! Two independent gates sit in front of the layout state machine:
//!
//! - a synchronous [`PolicyHooks`] set consulted before every surface
//!   transition (a `false` return is a silent veto), and
//! - an asynchronous [`RuleEngine`] that maps state transitions to
//!   activate/deactivate actions, optionally deferred through a
//!   [`TimerScheduler`].
//!
//! One `PolicyEngine` exists per shell instance; it is built from the
//! `policy` configuration section and handed to the shell on construction.

mod allow_all;
mod deny_all;
mod error;
mod hooks;
mod rba;
mod rules;
mod timer;

pub use allow_all::AllowAll;
pub use deny_all::{DEFAULT_PERMITTED_APPS, DenyAll};
pub use error::PolicyError;
pub use hooks::{
    ClientInfo, EVENT_HIDE, EVENT_SHOW, PolicyHooks, PolicyRule, RuleAction, RuleId,
    default_try_event,
};
pub use rba::{ArbitrationStatus, Arbitrator, JsonModelArbitrator, Rba, UNKNOWN_CONTENT};
pub use rules::{
    RuleEngine, STATE_INVALID, STATE_REVERSE, STATE_START, STATE_STOP, Vocabulary,
    VocabularyEntry,
};
pub use timer::{ManualTimers, TimerScheduler, TokioTimers};

use crate::config::{CoreConfig, PolicyConfig, PolicyEngineKind};
use crate::modules::shell::state::OutputId;

/// Hook set, rule engine and timer source of one shell.
pub struct PolicyEngine {
    hooks: Box<dyn PolicyHooks>,
    rules: RuleEngine,
    timers: Box<dyn TimerScheduler>,
}

impl std::fmt::Debug for PolicyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyEngine")
            .field("hooks", &self.hooks.name())
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

impl PolicyEngine {
    /// Create an engine from explicit parts.
    #[must_use]
    pub fn new(hooks: Box<dyn PolicyHooks>, timers: Box<dyn TimerScheduler>) -> Self {
        tracing::info!(engine = hooks.name(), "policy: installing policy engine");
        Self { hooks, rules: RuleEngine::new(), timers }
    }

    /// Create an engine from the `policy` and `core` configuration sections.
    ///
    /// Extra states and events are registered; rules are not, since they
    /// reference outputs (see `Shell::preload_rules`).
    #[must_use]
    pub fn from_config(
        policy: &PolicyConfig,
        core: &CoreConfig,
        timers: Box<dyn TimerScheduler>,
    ) -> Self {
        let hooks: Box<dyn PolicyHooks> = match policy.engine {
            PolicyEngineKind::AllowAll => Box::new(AllowAll),
            PolicyEngineKind::DenyAll => {
                Box::new(DenyAll::new(&policy.permitted_apps, policy.bind_labels.clone()))
            }
            PolicyEngineKind::Rba => {
                Box::new(Rba::new(&policy.rba_model, core.allow_unregistered_app))
            }
        };

        let mut engine = Self::new(hooks, timers);
        for entry in &policy.states {
            engine.rules.vocabulary_mut().add_state(entry.value, &entry.name);
        }
        for entry in &policy.events {
            engine.rules.vocabulary_mut().add_event(entry.value, &entry.name);
        }
        engine
    }

    /// The installed hook set.
    #[must_use]
    pub fn hooks(&self) -> &dyn PolicyHooks { self.hooks.as_ref() }

    /// The installed hook set, mutably (for bind checks).
    pub fn hooks_mut(&mut self) -> &mut dyn PolicyHooks { self.hooks.as_mut() }

    #[must_use]
    pub const fn rules(&self) -> &RuleEngine { &self.rules }

    /// Register a named state.
    pub fn add_state(&mut self, value: u32, name: &str) {
        self.rules.vocabulary_mut().add_state(value, name);
    }

    /// Register a named event.
    pub fn add_event(&mut self, value: u32, name: &str) {
        self.rules.vocabulary_mut().add_event(value, name);
    }

    /// Register a rule; see [`RuleEngine::add`].
    ///
    /// # Errors
    ///
    /// Propagates the rule engine's validation failures.
    pub fn add_rule(
        &mut self,
        app_id: &str,
        state: u32,
        event: u32,
        timeout_ms: u32,
        output: Result<OutputId, String>,
    ) -> Result<RuleId, PolicyError> {
        let allowed = self.hooks.rule_allow_to_add();
        self.rules.add(allowed, app_id, state, event, timeout_ms, output)
    }

    /// Start a state change, arming deferred rules. Returns the actions of
    /// the rules that fire immediately.
    ///
    /// # Errors
    ///
    /// See [`RuleEngine::begin_state_change`].
    pub fn begin_state_change(&mut self, state: u32) -> Result<Vec<RuleAction>, PolicyError> {
        let fired = self.rules.begin_state_change(state, self.timers.as_ref())?;
        Ok(fired.iter().filter_map(|rule| self.hooks.rule_try_event(rule)).collect())
    }

    /// Finish the current state change.
    pub const fn end_state_change(&mut self) { self.rules.end_state_change(); }

    /// Resolve a fired timer snapshot to its action.
    #[must_use]
    pub fn timer_action(&self, rule: &PolicyRule) -> Option<RuleAction> {
        self.hooks.rule_try_event(rule)
    }
}
