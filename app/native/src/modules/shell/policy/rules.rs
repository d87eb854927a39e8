//! State/event rule engine.
//!
//! Rules are evaluated on state *edges*: `state_change` to the current state is
//! rejected. On a genuine transition every rule registered for the new state
//! fires, in registration order, either immediately (timeout 0) or through a
//! one-shot timer.
//!
//! A state change is split in two halves so the owner can run the immediate
//! actions while the in-progress guard is still set:
//!
//! ```text
//! begin_state_change(s) ──► immediate rules ──► owner applies actions ──► end_state_change()
//!        │
//!        └──► deferred rules armed on the TimerScheduler
//! ```

use serde::Serialize;

use super::error::PolicyError;
use super::hooks::{EVENT_HIDE, EVENT_SHOW, PolicyRule, RuleId};
use super::timer::TimerScheduler;
use crate::modules::shell::state::OutputId;

/// Default state: nothing has happened yet.
pub const STATE_INVALID: u32 = 0;
pub const STATE_START: u32 = 1;
pub const STATE_STOP: u32 = 2;
pub const STATE_REVERSE: u32 = 3;

/// A registered state or event name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VocabularyEntry {
    pub value: u32,
    pub name: String,
}

/// Registered state and event names.
#[derive(Clone, Debug, Serialize)]
pub struct Vocabulary {
    states: Vec<VocabularyEntry>,
    events: Vec<VocabularyEntry>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        let entry = |value, name: &str| VocabularyEntry { value, name: name.to_string() };
        Self {
            states: vec![
                entry(STATE_INVALID, "invalid"),
                entry(STATE_START, "start"),
                entry(STATE_STOP, "stop"),
                entry(STATE_REVERSE, "reverse"),
            ],
            events: vec![entry(EVENT_SHOW, "show"), entry(EVENT_HIDE, "hide")],
        }
    }
}

impl Vocabulary {
    pub fn add_state(&mut self, value: u32, name: &str) {
        self.states.push(VocabularyEntry { value, name: name.to_string() });
    }

    pub fn add_event(&mut self, value: u32, name: &str) {
        self.events.push(VocabularyEntry { value, name: name.to_string() });
    }

    #[must_use]
    pub fn state_known(&self, value: u32) -> bool { self.states.iter().any(|s| s.value == value) }

    #[must_use]
    pub fn event_known(&self, value: u32) -> bool { self.events.iter().any(|e| e.value == value) }

    /// Look up a state value by name. Later registrations shadow earlier ones.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::UnknownName`] if no state carries `name`.
    pub fn state_by_name(&self, name: &str) -> Result<u32, PolicyError> {
        Self::lookup(&self.states, "state", name)
    }

    /// Look up an event value by name.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::UnknownName`] if no event carries `name`.
    pub fn event_by_name(&self, name: &str) -> Result<u32, PolicyError> {
        Self::lookup(&self.events, "event", name)
    }

    /// Name of a state value, if registered.
    #[must_use]
    pub fn state_name(&self, value: u32) -> Option<&str> {
        self.states.iter().rev().find(|s| s.value == value).map(|s| s.name.as_str())
    }

    /// Name of an event value, if registered.
    #[must_use]
    pub fn event_name(&self, value: u32) -> Option<&str> {
        self.events.iter().rev().find(|e| e.value == value).map(|e| e.name.as_str())
    }

    fn lookup(
        entries: &[VocabularyEntry],
        kind: &'static str,
        name: &str,
    ) -> Result<u32, PolicyError> {
        entries
            .iter()
            .rev()
            .find(|e| e.name == name)
            .map(|e| e.value)
            .ok_or_else(|| PolicyError::UnknownName { kind, name: name.to_string() })
    }
}

/// The rule list and the state machine driving it.
#[derive(Debug, Default)]
pub struct RuleEngine {
    rules: Vec<PolicyRule>,
    vocabulary: Vocabulary,
    current_state: u32,
    previous_state: u32,
    in_progress: bool,
}

impl RuleEngine {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub const fn current_state(&self) -> u32 { self.current_state }

    #[must_use]
    pub const fn previous_state(&self) -> u32 { self.previous_state }

    #[must_use]
    pub const fn in_progress(&self) -> bool { self.in_progress }

    #[must_use]
    pub const fn vocabulary(&self) -> &Vocabulary { &self.vocabulary }

    pub const fn vocabulary_mut(&mut self) -> &mut Vocabulary { &mut self.vocabulary }

    /// Registered rules in registration order.
    #[must_use]
    pub fn rules(&self) -> &[PolicyRule] { &self.rules }

    /// Register a rule. `allowed` is the verdict of the hook set and `output`
    /// the resolved target output (`Err` carries the unresolved name).
    ///
    /// # Errors
    ///
    /// Checked in order: [`PolicyError::StateChangeInProgress`],
    /// [`PolicyError::NotAllowed`], [`PolicyError::UnknownState`],
    /// [`PolicyError::UnknownEvent`], [`PolicyError::UnknownOutput`].
    pub fn add(
        &mut self,
        allowed: bool,
        app_id: &str,
        state: u32,
        event: u32,
        timeout_ms: u32,
        output: Result<OutputId, String>,
    ) -> Result<RuleId, PolicyError> {
        if self.in_progress {
            return Err(PolicyError::StateChangeInProgress);
        }
        if !allowed {
            return Err(PolicyError::NotAllowed);
        }
        if !self.vocabulary.state_known(state) {
            return Err(PolicyError::UnknownState(state));
        }
        if !self.vocabulary.event_known(event) {
            return Err(PolicyError::UnknownEvent(event));
        }
        let output = output.map_err(PolicyError::UnknownOutput)?;

        let rule = PolicyRule {
            id: RuleId::new(),
            app_id: app_id.to_string(),
            state,
            event,
            timeout_ms,
            output,
        };
        let id = rule.id;
        tracing::debug!(
            app_id,
            state,
            event,
            timeout_ms,
            output = %output,
            "policy: rule added"
        );
        self.rules.push(rule);
        Ok(id)
    }

    /// Switch to `state` and collect the rules that fire immediately. Rules
    /// with a timeout are armed on `timers` with a snapshot of themselves.
    ///
    /// The in-progress guard stays set until [`Self::end_state_change`].
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::SameState`] if `state` is already current and
    /// [`PolicyError::UnknownState`] if it was never registered.
    pub fn begin_state_change(
        &mut self,
        state: u32,
        timers: &dyn TimerScheduler,
    ) -> Result<Vec<PolicyRule>, PolicyError> {
        if self.current_state == state {
            return Err(PolicyError::SameState(state));
        }
        if !self.vocabulary.state_known(state) {
            return Err(PolicyError::UnknownState(state));
        }

        tracing::debug!(from = self.current_state, to = state, "policy: state change");
        self.current_state = state;
        self.in_progress = true;

        // Oldest rule first. Rules for the same app-id and state rely on this:
        // the last one registered wins.
        let mut immediate = Vec::new();
        for rule in self.rules.iter().filter(|r| r.state == state) {
            if rule.timeout_ms > 0 {
                tracing::debug!(
                    app_id = %rule.app_id,
                    timeout_ms = rule.timeout_ms,
                    "policy: arming rule timer"
                );
                timers.arm(rule.clone());
            } else {
                immediate.push(rule.clone());
            }
        }
        Ok(immediate)
    }

    /// Finish a state change started with [`Self::begin_state_change`].
    pub const fn end_state_change(&mut self) {
        self.previous_state = self.current_state;
        self.in_progress = false;
    }
}
