//! The shell state owner.
//!
//! [`Shell`] ties the surface registry, output manager, pending queues,
//! policy engine and layer stack together. It is driven one request at a
//! time (see the actor module) and never blocks: every outbound operation is
//! queued as a [`ShellEffect`] and drained by the caller.
//!
//! The layout engine and the protocol bridge are further `impl Shell`
//! blocks living in `layout/` and `bridge.rs`.

use serde::Serialize;

use super::effects::{ShellEffect, ShellEvent};
use super::error::{ShellError, ShellResult};
use super::outputs::{HeadBackend, HeadStatus, HeadsChanged, OutputManager};
use super::pending::{PendingEntry, PendingQueues, PendingRole};
use super::policy::{PolicyEngine, PolicyRule, RuleAction, RuleId};
use super::state::{
    AppState, ClientId, HeadId, LayerStack, Output, OutputId, Rect, RoleKind, Surface,
    SurfaceId, SurfaceRegistry, ViewId,
};
use crate::config::{OutputConfig, RuleConfig, ShellConfig};

/// Serializable view of the whole shell, used by the CLI and by queries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellSnapshot {
    pub ready: bool,
    pub init_failed: bool,
    pub outputs: Vec<Output>,
    pub surfaces: Vec<Surface>,
    pub pending: Vec<PendingEntry>,
    pub current_state: u32,
    pub rules: Vec<PolicyRule>,
}

/// Shell layer state.
#[allow(clippy::struct_excessive_bools)]
pub struct Shell {
    pub(crate) surfaces: SurfaceRegistry,
    pub(crate) outputs: OutputManager,
    pub(crate) pending: PendingQueues,
    pub(crate) policy: PolicyEngine,
    pub(crate) layers: LayerStack,

    backend: Box<dyn HeadBackend>,
    effects: Vec<ShellEffect>,

    /// Client bound to the shell interface.
    pub(crate) shell_client: Option<ClientId>,
    /// Set once the shell client called `ready`.
    pub(crate) ready: bool,
    /// Clients bound to the desktop interface, in bind order.
    pub(crate) desktop_clients: Vec<ClientId>,
    init_failed: bool,

    pub(crate) activate_by_default: bool,
    output_configs: Vec<OutputConfig>,
    /// Configured rules whose output has not appeared yet.
    rule_configs: Vec<RuleConfig>,
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("surfaces", &self.surfaces.len())
            .field("outputs", &self.outputs.len())
            .field("pending", &self.pending.len())
            .field("policy", &self.policy)
            .field("ready", &self.ready)
            .field("init_failed", &self.init_failed)
            .finish_non_exhaustive()
    }
}

impl Shell {
    /// Create a shell with no outputs and no clients.
    #[must_use]
    pub fn new(config: &ShellConfig, policy: PolicyEngine, backend: Box<dyn HeadBackend>) -> Self {
        Self {
            surfaces: SurfaceRegistry::new(),
            outputs: OutputManager::new(),
            pending: PendingQueues::new(),
            policy,
            layers: LayerStack::new(),
            backend,
            effects: Vec::new(),
            shell_client: None,
            ready: false,
            desktop_clients: Vec::new(),
            init_failed: false,
            activate_by_default: config.core.activate_by_default,
            output_configs: config.outputs.clone(),
            rule_configs: config.policy.rules.clone(),
        }
    }

    // ========================================================================
    // Effects
    // ========================================================================

    pub(crate) fn emit(&mut self, effect: ShellEffect) { self.effects.push(effect); }

    /// Take every effect queued since the last call.
    pub fn take_effects(&mut self) -> Vec<ShellEffect> { std::mem::take(&mut self.effects) }

    /// Post protocol errors to the offending client and pass the result on.
    pub(crate) fn reported<T>(&mut self, result: ShellResult<T>) -> ShellResult<T> {
        if let Err(ShellError::Protocol { client: Some(client), code, message }) = &result {
            tracing::warn!(
                client = %client,
                code = ?code,
                message = %message,
                "shell: protocol error"
            );
            self.emit(ShellEffect::ProtocolError {
                client: *client,
                code: *code,
                message: message.clone(),
            });
        }
        result
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn surface(&self, id: SurfaceId) -> Option<&Surface> { self.surfaces.get(id) }

    #[must_use]
    pub fn output(&self, id: OutputId) -> Option<&Output> { self.outputs.get(id) }

    pub(crate) fn require_surface(&self, id: SurfaceId) -> ShellResult<&Surface> {
        self.surfaces.get(id).ok_or(ShellError::SurfaceNotFound(id))
    }

    pub(crate) fn require_output(&self, id: OutputId) -> ShellResult<&Output> {
        self.outputs.require(id)
    }

    #[must_use]
    pub const fn surfaces(&self) -> &SurfaceRegistry { &self.surfaces }

    #[must_use]
    pub const fn outputs(&self) -> &OutputManager { &self.outputs }

    #[must_use]
    pub const fn layers(&self) -> &LayerStack { &self.layers }

    #[must_use]
    pub const fn pending_queues(&self) -> &PendingQueues { &self.pending }

    #[must_use]
    pub const fn policy(&self) -> &PolicyEngine { &self.policy }

    #[must_use]
    pub const fn is_ready(&self) -> bool { self.ready }

    /// Whether an output failed to come up.
    #[must_use]
    pub const fn init_failed(&self) -> bool { self.init_failed }

    #[must_use]
    pub fn snapshot(&self) -> ShellSnapshot {
        ShellSnapshot {
            ready: self.ready,
            init_failed: self.init_failed,
            outputs: self.outputs.iter().cloned().collect(),
            surfaces: self.surfaces.all().into_iter().cloned().collect(),
            pending: self.pending.iter().cloned().collect(),
            current_state: self.policy.rules().current_state(),
            rules: self.policy.rules().rules().to_vec(),
        }
    }

    // ========================================================================
    // Surface lifecycle
    // ========================================================================

    /// A desktop client created a toplevel surface.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::SurfaceRefused`] if the policy vetoes creation;
    /// the surface is discarded.
    pub fn surface_added(
        &mut self,
        client: ClientId,
        app_id: Option<String>,
    ) -> ShellResult<SurfaceId> {
        let id = self.surfaces.register(client, app_id.clone());
        let allowed = self.surfaces.get(id).is_some_and(|s| self.policy.hooks().surface_create(s));
        if !allowed {
            self.surfaces.unregister(id);
            tracing::info!(
                client = %client,
                app_id = app_id.as_deref().unwrap_or("<none>"),
                "shell: surface creation refused by policy"
            );
            return Err(ShellError::SurfaceRefused(id));
        }

        if let Some(app_id) = app_id.as_deref() {
            self.queue_remote_if_pinned(app_id);
        }

        if self.ready {
            let matched = app_id.as_deref().is_some_and(|a| self.pending.matches(a));
            let area =
                self.outputs.default_output().and_then(|o| self.outputs.get(o)).map(|o| o.area);
            if let Some(area) = area.filter(|_| !matched) {
                tracing::debug!(
                    surface = %id,
                    width = area.width,
                    height = area.height,
                    "shell: setting initial surface size"
                );
                self.configure_maximized(id, area.width, area.height);
            }
        }

        self.surfaces.push_pending(id);
        tracing::info!(
            surface = %id,
            app_id = app_id.as_deref().unwrap_or("<none>"),
            "shell: added surface to pending list"
        );
        Ok(id)
    }

    /// Record an app-id set after creation.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::SurfaceNotFound`] for unknown surfaces.
    pub fn surface_set_app_id(&mut self, id: SurfaceId, app_id: &str) -> ShellResult<()> {
        let surface = self.surfaces.get_mut(id).ok_or(ShellError::SurfaceNotFound(id))?;
        surface.app_id = Some(app_id.to_string());
        let unresolved = !surface.checked_pending;
        if unresolved {
            self.queue_remote_if_pinned(app_id);
        }
        Ok(())
    }

    fn queue_remote_if_pinned(&mut self, app_id: &str) {
        if let Some(output) = self.outputs.find_with_app_id(app_id) {
            if !self.pending.matches(app_id) {
                self.pending.set_pending(output, app_id, PendingRole::Remote, &self.surfaces);
            }
        }
    }

    /// The client committed new desktop state.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if the surface needs default activation and
    /// no output can host it.
    pub fn surface_committed(
        &mut self,
        id: SurfaceId,
        geometry: Rect,
        maximized: bool,
    ) -> ShellResult<()> {
        let result = self.commit(id, geometry, maximized);
        self.reported(result)
    }

    fn commit(&mut self, id: SurfaceId, geometry: Rect, maximized: bool) -> ShellResult<()> {
        let surface = self.surfaces.get_mut(id).ok_or(ShellError::SurfaceNotFound(id))?;
        surface.geometry = geometry;
        surface.maximized = maximized;

        let surface = self.require_surface(id)?;
        if !self.policy.hooks().surface_committed(surface) {
            return Ok(());
        }

        let mut resolved = false;
        if self.ready && !surface.checked_pending {
            tracing::debug!(
                surface = %id,
                app_id = surface.app_id().unwrap_or("<none>"),
                "shell: checking pending surface"
            );
            if let Some(surface) = self.surfaces.get_mut(id) {
                surface.checked_pending = true;
            }
            self.resolve_pending_surface(id)?;
            resolved = true;
        }

        self.advertise_application(id);
        self.schedule_repaint(None);

        if resolved {
            return Ok(());
        }
        self.role_committed(id)
    }

    /// The client destroyed a surface.
    pub fn surface_removed(&mut self, id: SurfaceId) {
        let Some(surface) = self.surfaces.get(id) else {
            return;
        };
        let kind = surface.kind();
        let app_id = surface.app_id.clone();
        let output = surface.output();
        let unresolved = !surface.checked_pending;

        if unresolved {
            if let Some(app_id) = app_id.as_deref() {
                if self.pending.resolve(app_id).is_some() {
                    tracing::debug!(app_id, "shell: released pending entry of removed surface");
                }
            }
        }

        if let Some(output) = output {
            self.release_output(id, kind, output);
        }

        self.view_unmap(id);
        let mut relayout = Vec::new();
        for out in self.outputs.iter_mut() {
            if out.forget_surface(id).is_some() {
                relayout.push(out.id);
            }
        }
        if self.ready {
            for output in relayout {
                self.layout_panels(output);
                self.schedule_repaint(Some(output));
            }
        }

        tracing::info!(
            surface = %id,
            app_id = app_id.as_deref().unwrap_or("<none>"),
            role = kind.name(),
            "shell: removed surface"
        );
        if let (Some(app_id), Some(_)) = (app_id.as_deref(), output) {
            self.advertise_app_state(app_id, None, AppState::Destroyed);
        }

        self.surfaces.unregister(id);
        self.emit(ShellEffect::DestroyView { view: ViewId::Surface(id) });
        self.schedule_repaint(output);
    }

    /// Undo what a surface did to its output: split area, active slot and
    /// the remote placeholder.
    fn release_output(&mut self, id: SurfaceId, kind: RoleKind, output: OutputId) {
        let Some(out) = self.outputs.get(output) else {
            return;
        };
        let remote_output = out.kind.is_remote();
        let has_background = out.background.is_some();

        if kind.is_split() {
            let saved = out.area_saved;
            let active = out.active.filter(|a| *a != id);
            if let Some(active) = active {
                self.desktop_resize(active, output, saved);
            }
            if let Some(out) = self.outputs.get_mut(output) {
                out.area = saved;
            }
        }

        let was_active = self.outputs.get(output).is_some_and(|o| o.active == Some(id));
        if was_active {
            self.view_unmap(id);
            let mut previous = None;
            if let Some(out) = self.outputs.get_mut(output) {
                out.active = None;
                previous = out.previous_active.take().filter(|p| *p != id);
            }

            // An exiting desktop app hands the output back like a deactivation.
            let handover = matches!(kind, RoleKind::Desktop | RoleKind::Remote);
            let previous = previous.filter(|p| handover && self.surfaces.is_listed(*p));
            if let Some(previous) = previous {
                tracing::debug!(
                    surface = %id,
                    previous = %previous,
                    "shell: active surface exited, restoring previous"
                );
                self.activate_by_surf(output, previous);
            }
        }

        let last_remote = self.surfaces.count_listed(RoleKind::Remote) == 1
            || self.surfaces.count_listed(RoleKind::Desktop) == 1;
        if last_remote && remote_output && !has_background {
            self.placeholder_insert(output);
        }
    }

    // ========================================================================
    // Outputs
    // ========================================================================

    /// React to a heads-changed notification.
    pub fn heads_changed(&mut self, heads: &[HeadStatus]) -> HeadsChanged {
        let report = self.outputs.heads_changed(self.backend.as_mut(), heads, &self.output_configs);

        for (output, _) in &report.enabled {
            self.placeholder_insert(*output);
            if self.ready {
                self.layout_init(*output);
            }
        }
        for output in &report.disabled {
            self.placeholder_remove(*output);
        }
        if !report.failed.is_empty() {
            self.init_failed = true;
        }
        if !report.enabled.is_empty() {
            self.preload_rules();
        }
        report
    }

    /// The host destroyed a head.
    pub fn head_destroyed(&mut self, head: HeadId) -> Option<OutputId> {
        let output = self.outputs.head_destroyed(self.backend.as_mut(), head)?;
        self.placeholder_remove(output);
        Some(output)
    }

    /// The head backend, for inspection.
    #[must_use]
    pub fn backend(&self) -> &dyn HeadBackend { self.backend.as_ref() }

    // ========================================================================
    // Policy
    // ========================================================================

    /// Register a rule targeting the output named `output`.
    ///
    /// # Errors
    ///
    /// Propagates the rule engine's validation failures.
    pub fn policy_add(
        &mut self,
        app_id: &str,
        state: u32,
        event: u32,
        timeout_ms: u32,
        output: &str,
    ) -> ShellResult<RuleId> {
        let target = self.outputs.by_name(output).map(|o| o.id).ok_or_else(|| output.to_string());
        Ok(self.policy.add_rule(app_id, state, event, timeout_ms, target)?)
    }

    /// Switch the policy state and run the rules that fire immediately.
    ///
    /// Returns the number of actions applied.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::SameState`](super::policy::PolicyError::SameState)
    /// or [`PolicyError::UnknownState`](super::policy::PolicyError::UnknownState).
    pub fn state_change(&mut self, state: u32) -> ShellResult<usize> {
        let actions = self.policy.begin_state_change(state)?;
        let count = actions.len();
        for action in actions {
            self.apply_rule_action(action);
        }
        self.policy.end_state_change();
        Ok(count)
    }

    /// Run the action of a rule whose timer expired.
    pub fn policy_timer_fired(&mut self, rule: &PolicyRule) {
        tracing::debug!(app_id = %rule.app_id, output = %rule.output, "policy: timer fired");
        if let Some(action) = self.policy.timer_action(rule) {
            self.apply_rule_action(action);
        }
    }

    fn apply_rule_action(&mut self, action: RuleAction) {
        match action {
            RuleAction::Activate { output, app_id } => {
                if self.outputs.get(output).is_none() {
                    tracing::warn!(output = %output, app_id, "policy: rule output is gone");
                    return;
                }
                self.activate(output, &app_id);
            }
            RuleAction::Deactivate { app_id } => self.deactivate(&app_id),
        }
    }

    /// Register the configured rules whose output exists. Returns how many
    /// were added; rules naming an unknown output stay queued.
    pub fn preload_rules(&mut self) -> usize {
        let configs = std::mem::take(&mut self.rule_configs);
        let mut added = 0;

        for config in configs {
            if self.outputs.by_name(&config.output).is_none() {
                self.rule_configs.push(config);
                continue;
            }

            let vocabulary = self.policy.rules().vocabulary();
            let ids = vocabulary
                .state_by_name(&config.state)
                .and_then(|s| vocabulary.event_by_name(&config.event).map(|e| (s, e)));
            let result = ids.map_err(ShellError::from).and_then(|(state, event)| {
                self.policy_add(&config.app_id, state, event, config.timeout_ms, &config.output)
            });

            match result {
                Ok(_) => added += 1,
                Err(err) => {
                    tracing::warn!(
                        app_id = %config.app_id,
                        error = %err,
                        "policy: dropping configured rule"
                    );
                }
            }
        }

        if added > 0 {
            tracing::info!(rules = added, "policy: preloaded rules from configuration");
        }
        added
    }

    // ========================================================================
    // Broadcasts
    // ========================================================================

    /// Send `state_app` to every desktop client.
    ///
    /// Nothing is sent if no listed surface carries `app_id` or the policy
    /// vetoes the broadcast.
    pub fn advertise_app_state(&mut self, app_id: &str, data: Option<&str>, state: AppState) {
        let found = self.surfaces.find_by_app_id(app_id);
        let Some(surface) = found.and_then(|id| self.surfaces.get(id)) else {
            return;
        };
        if !self.policy.hooks().surface_advertise_state_change(surface) {
            return;
        }

        let role = surface.kind();
        tracing::debug!(app_id, state = state.as_str(), role = role.name(), "shell: state_app");
        for client in self.desktop_clients.clone() {
            self.emit(ShellEffect::SendEvent {
                client,
                event: ShellEvent::StateApp {
                    app_id: app_id.to_string(),
                    data: data.map(ToString::to_string),
                    state,
                    role,
                },
            });
        }
    }
}
