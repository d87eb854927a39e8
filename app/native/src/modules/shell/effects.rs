//! Effect types and execution.
//!
//! The shell core never calls the host compositor directly. Every outbound
//! operation is recorded as a [`ShellEffect`] while a request is processed;
//! the owner drains them with `Shell::take_effects` and hands them to an
//! [`EffectExecutor`].
//!
//! ```text
//! ┌───────────────────────┐   Vec<ShellEffect>   ┌────────────────────────┐
//! │ Shell (layout/policy) │ ───────────────────► │ EffectExecutor         │
//! └───────────────────────┘                      │  - view capability     │
//!                                                │  - client configure    │
//!                                                │  - protocol events     │
//!                                                └────────────────────────┘
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use super::error::ProtocolErrorCode;
use super::state::{AppState, ClientId, Layer, OutputId, RoleKind, SurfaceId, ViewId};

// ============================================================================
// Effect Types
// ============================================================================

/// Events sent to desktop clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ShellEvent {
    /// First sight of an application id.
    AdvertiseApplication { app_id: String },

    /// An application changed state.
    StateApp {
        app_id: String,
        data: Option<String>,
        state: AppState,
        role: RoleKind,
    },

    /// Sent to the shell client once the shell is bound.
    Bound,
}

/// Operations the host compositor must perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum ShellEffect {
    /// Ask the client to enter or leave the maximized state.
    SetMaximized { surface: SurfaceId, maximized: bool },

    /// Ask the client to resize. A zero dimension leaves it to the client.
    SetSize { surface: SurfaceId, width: i32, height: i32 },

    /// Ask the client to enter or leave the fullscreen state.
    SetFullscreen { surface: SurfaceId, fullscreen: bool },

    /// Assign a view to an output.
    SetViewOutput { view: ViewId, output: OutputId },

    /// Move a view to a global position.
    SetViewPosition { view: ViewId, x: i32, y: i32 },

    /// Clip a view to a rectangle relative to the view.
    SetViewMask { view: ViewId, x: i32, y: i32, width: i32, height: i32 },

    /// Mark a view mapped or unmapped.
    MapView { view: ViewId, mapped: bool },

    /// Put a view on top of a layer.
    InsertIntoLayer { layer: Layer, view: ViewId },

    /// Unlink a view from its layer.
    RemoveFromLayer { view: ViewId },

    /// The view's surface is gone.
    DestroyView { view: ViewId },

    /// Schedule a repaint of one output, or of all outputs.
    ScheduleRepaint { output: Option<OutputId> },

    /// Stream a surface to a remote output's transmitter.
    ForwardToRemote { surface: SurfaceId, output: OutputId },

    /// Deliver a protocol event to a client.
    SendEvent { client: ClientId, event: ShellEvent },

    /// Post a terminal protocol error to a client.
    ProtocolError { client: ClientId, code: ProtocolErrorCode, message: String },
}

impl ShellEffect {
    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SetMaximized { .. } => "set_maximized",
            Self::SetSize { .. } => "set_size",
            Self::SetFullscreen { .. } => "set_fullscreen",
            Self::SetViewOutput { .. } => "set_view_output",
            Self::SetViewPosition { .. } => "set_view_position",
            Self::SetViewMask { .. } => "set_view_mask",
            Self::MapView { .. } => "map_view",
            Self::InsertIntoLayer { .. } => "insert_into_layer",
            Self::RemoveFromLayer { .. } => "remove_from_layer",
            Self::DestroyView { .. } => "destroy_view",
            Self::ScheduleRepaint { .. } => "schedule_repaint",
            Self::ForwardToRemote { .. } => "forward_to_remote",
            Self::SendEvent { .. } => "send_event",
            Self::ProtocolError { .. } => "protocol_error",
        }
    }
}

// ============================================================================
// Effect Executor
// ============================================================================

/// Applies effects to a host compositor.
pub trait EffectExecutor: Send {
    /// Apply a single effect.
    fn execute(&mut self, effect: ShellEffect);

    /// Apply a batch in order. Returns the number of effects applied.
    fn execute_batch(&mut self, effects: Vec<ShellEffect>) -> usize {
        let count = effects.len();
        for effect in effects {
            self.execute(effect);
        }
        count
    }
}

/// Headless executor that records every effect.
///
/// Cloning shares the underlying log, so a test can keep a clone while the
/// actor owns another.
#[derive(Debug, Default, Clone)]
pub struct RecordingExecutor {
    log: Arc<Mutex<Vec<ShellEffect>>>,
}

impl RecordingExecutor {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Copy of everything recorded so far.
    #[must_use]
    pub fn effects(&self) -> Vec<ShellEffect> { self.log.lock().clone() }

    /// Take everything recorded so far.
    pub fn drain(&self) -> Vec<ShellEffect> { std::mem::take(&mut *self.log.lock()) }

    /// Events delivered to clients, in order.
    #[must_use]
    pub fn events(&self) -> Vec<(ClientId, ShellEvent)> {
        self.log
            .lock()
            .iter()
            .filter_map(|effect| match effect {
                ShellEffect::SendEvent { client, event } => Some((*client, event.clone())),
                _ => None,
            })
            .collect()
    }
}

impl EffectExecutor for RecordingExecutor {
    fn execute(&mut self, effect: ShellEffect) {
        tracing::trace!(effect = effect.name(), "shell: effect");
        self.log.lock().push(effect);
    }
}
