//! Shell actor module.
//!
//! The shell actor owns the [`Shell`] and processes messages sequentially,
//! so the single-threaded model of the shell holds even when requests come
//! from several tasks. After every message the queued effects are handed to
//! the [`EffectExecutor`] in order.
//!
//! # Panic Recovery
//!
//! If a message handler panics, the panic is caught and logged and the
//! actor keeps processing subsequent messages. Effects queued before the
//! panic are still flushed.

mod handle;
mod messages;

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

pub use handle::{ActorError, ShellActorHandle};
pub use messages::{QueryResult, Responder, ShellMessage, ShellQuery};
use tokio::sync::mpsc;

use super::effects::EffectExecutor;
use super::error::ShellResult;
use super::outputs::HeadBackend;
use super::policy::{PolicyEngine, TokioTimers};
use super::shell::Shell;
use crate::config::ShellConfig;

/// Channel buffer size for the shell actor.
const CHANNEL_BUFFER_SIZE: usize = 256;

/// The actor that owns the shell.
pub struct ShellActor {
    shell: Shell,
    executor: Box<dyn EffectExecutor>,
    receiver: mpsc::Receiver<ShellMessage>,
}

impl ShellActor {
    /// Build a shell from configuration and spawn its actor.
    ///
    /// Deferred policy rules post back into the actor's own channel. Must be
    /// called from within a tokio runtime.
    #[must_use]
    pub fn spawn(
        config: &ShellConfig,
        backend: Box<dyn HeadBackend>,
        executor: Box<dyn EffectExecutor>,
    ) -> ShellActorHandle {
        Self::spawn_with(
            |sender| {
                let timers = Box::new(TokioTimers::new(sender));
                let policy = PolicyEngine::from_config(&config.policy, &config.core, timers);
                Shell::new(config, policy, backend)
            },
            executor,
        )
    }

    /// Spawn an actor around a shell built by `build`.
    ///
    /// `build` receives the actor's sender so the shell can wire timers to it.
    pub fn spawn_with<F>(build: F, executor: Box<dyn EffectExecutor>) -> ShellActorHandle
    where F: FnOnce(&mpsc::Sender<ShellMessage>) -> Shell {
        tracing::debug!("shell: spawning shell actor");
        let (sender, receiver) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let actor = Self { shell: build(&sender), executor, receiver };
        tokio::spawn(async move {
            actor.run().await;
        });

        ShellActorHandle::new(sender)
    }

    /// Run the actor's message loop.
    async fn run(mut self) {
        tracing::trace!("shell: actor message loop starting");

        while let Some(msg) = self.receiver.recv().await {
            if matches!(msg, ShellMessage::Shutdown) {
                tracing::debug!("shell: actor received shutdown message");
                return;
            }

            let request = msg.name();
            let handled = catch_unwind(AssertUnwindSafe(|| self.handle_message(msg)));
            if let Err(payload) = handled {
                self.report_panic(request, payload.as_ref());
            }

            self.flush_effects();
        }

        tracing::debug!("shell: actor channel closed, exiting");
    }

    /// Log a request that panicked half way, with enough shell state to
    /// spot the layout it left behind.
    fn report_panic(&self, request: &'static str, payload: &(dyn Any + Send)) {
        let reason = payload
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
            .unwrap_or("non-string panic payload");
        let active: Vec<String> = self
            .shell
            .outputs()
            .iter()
            .map(|o| format!("{}={:?}", o.name, o.active))
            .collect();

        tracing::error!(
            request,
            reason,
            ready = self.shell.is_ready(),
            surfaces = self.shell.surfaces().len(),
            active = ?active,
            "shell: request panicked, continuing with partially applied layout"
        );
    }

    fn flush_effects(&mut self) {
        let effects = self.shell.take_effects();
        if effects.is_empty() {
            return;
        }
        let count = self.executor.execute_batch(effects);
        tracing::trace!(count, "shell: effects flushed");
    }

    /// Handle a single message.
    #[allow(clippy::too_many_lines)]
    fn handle_message(&mut self, msg: ShellMessage) {
        match msg {
            // Output events
            ShellMessage::HeadsChanged { heads } => {
                let report = self.shell.heads_changed(&heads);
                if !report.failed.is_empty() {
                    tracing::warn!(failed = ?report.failed, "shell: outputs failed to enable");
                }
            }
            ShellMessage::HeadDestroyed { head } => {
                self.shell.head_destroyed(head);
            }

            // Surface events
            ShellMessage::SurfaceAdded { client, app_id, respond_to } => {
                let result = self.shell.surface_added(client, app_id);
                respond("SurfaceAdded", respond_to, result);
            }
            ShellMessage::SurfaceAppIdSet { surface, app_id } => {
                log_failure("SurfaceAppIdSet", self.shell.surface_set_app_id(surface, &app_id));
            }
            ShellMessage::SurfaceCommitted { surface, geometry, maximized } => {
                let result = self.shell.surface_committed(surface, geometry, maximized);
                log_failure("SurfaceCommitted", result);
            }
            ShellMessage::SurfaceRemoved { surface } => self.shell.surface_removed(surface),

            // Shell protocol
            ShellMessage::BindShell { client, respond_to } => {
                let result = self.shell.bind_shell(&client);
                respond("BindShell", respond_to, result);
            }
            ShellMessage::UnbindShell => self.shell.unbind_shell(),
            ShellMessage::BindDesktop { client, respond_to } => {
                let result = self.shell.bind_desktop(&client);
                respond("BindDesktop", respond_to, result);
            }
            ShellMessage::UnbindDesktop { client } => self.shell.unbind_desktop(client),
            ShellMessage::Ready => log_failure("Ready", self.shell.ready()),
            ShellMessage::SetBackground { surface, output } => {
                log_failure("SetBackground", self.shell.set_background(surface, output));
            }
            ShellMessage::SetPanel { surface, output, edge } => {
                log_failure("SetPanel", self.shell.set_panel(surface, output, edge));
            }
            ShellMessage::ActivateApp { app_id, output } => {
                log_failure("ActivateApp", self.shell.activate_app(&app_id, output));
            }

            // Desktop protocol
            ShellMessage::DesktopActivateApp { app_id, data, output } => {
                let result = self.shell.desktop_activate_app(&app_id, data.as_deref(), output);
                log_failure("DesktopActivateApp", result);
            }
            ShellMessage::DeactivateApp { app_id } => self.shell.deactivate_app(&app_id),
            ShellMessage::SetAppProperty { app_id, role, x, y, bounding_box, output } => {
                let result =
                    self.shell.set_app_property(&app_id, role, x, y, bounding_box, output);
                log_failure("SetAppProperty", result);
            }

            // Policy
            ShellMessage::PolicyAdd {
                app_id,
                state,
                event,
                timeout_ms,
                output,
                respond_to,
            } => {
                let result = self.shell.policy_add(&app_id, state, event, timeout_ms, &output);
                respond("PolicyAdd", respond_to, result);
            }
            ShellMessage::StateChange { state, respond_to } => {
                let result = self.shell.state_change(state);
                respond("StateChange", respond_to, result);
            }
            ShellMessage::PolicyTimerFired(rule) => self.shell.policy_timer_fired(&rule),

            // Queries
            ShellMessage::Query { query, respond_to } => {
                let result = self.execute_query(query);
                if respond_to.send(result).is_err() {
                    tracing::warn!("shell: failed to send query response (channel closed)");
                }
            }

            ShellMessage::Shutdown => {}
        }
    }

    fn execute_query(&self, query: ShellQuery) -> QueryResult {
        match query {
            ShellQuery::Snapshot => QueryResult::Snapshot(Box::new(self.shell.snapshot())),
            ShellQuery::Surface { id } => {
                QueryResult::Surface(self.shell.surface(id).cloned().map(Box::new))
            }
            ShellQuery::Output { id } => {
                QueryResult::Output(self.shell.output(id).cloned().map(Box::new))
            }
            ShellQuery::OutputByName { name } => {
                QueryResult::Output(self.shell.outputs().by_name(&name).cloned().map(Box::new))
            }
            ShellQuery::FindApp { app_id } => {
                QueryResult::SurfaceId(self.shell.surfaces().find_by_app_id(&app_id))
            }
            ShellQuery::Pending => {
                QueryResult::Pending(self.shell.pending_queues().iter().cloned().collect())
            }
            ShellQuery::Ready => QueryResult::Ready(self.shell.is_ready()),
        }
    }
}

/// Deliver a result to the requester, or log it if nobody is waiting.
fn respond<T>(name: &str, respond_to: Responder<T>, result: ShellResult<T>) {
    match respond_to {
        Some(tx) => {
            if tx.send(result).is_err() {
                tracing::debug!(message = name, "shell: requester dropped before reply");
            }
        }
        None => log_failure(name, result),
    }
}

fn log_failure<T>(name: &str, result: ShellResult<T>) {
    if let Err(err) = result {
        tracing::warn!(message = name, error = %err, "shell: request failed");
    }
}
