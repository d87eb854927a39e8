//! Message types for the shell actor.
//!
//! - `ShellMessage` - requests and notifications sent to the actor
//! - `ShellQuery` - read-only requests (with response channel)
//! - `QueryResult` - responses from queries

use tokio::sync::oneshot;

use crate::modules::shell::error::ShellResult;
use crate::modules::shell::outputs::HeadStatus;
use crate::modules::shell::pending::PendingEntry;
use crate::modules::shell::policy::{ClientInfo, PolicyRule, RuleId};
use crate::modules::shell::shell::ShellSnapshot;
use crate::modules::shell::state::{ClientId, HeadId, Output, OutputId, Rect, Surface, SurfaceId};

/// Reply channel for requests whose outcome the caller needs.
pub type Responder<T> = Option<oneshot::Sender<ShellResult<T>>>;

// ============================================================================
// Shell Messages
// ============================================================================

/// Messages sent to the shell actor.
#[derive(Debug)]
pub enum ShellMessage {
    // ════════════════════════════════════════════════════════════════════════
    // Output Events (from the host backend)
    // ════════════════════════════════════════════════════════════════════════
    /// Heads were connected, disconnected or changed.
    HeadsChanged { heads: Vec<HeadStatus> },

    /// A head was destroyed by the host.
    HeadDestroyed { head: HeadId },

    // ════════════════════════════════════════════════════════════════════════
    // Surface Events (desktop protocol)
    // ════════════════════════════════════════════════════════════════════════
    /// New toplevel surface.
    SurfaceAdded {
        client: ClientId,
        app_id: Option<String>,
        respond_to: Responder<SurfaceId>,
    },

    /// App-id set after creation.
    SurfaceAppIdSet { surface: SurfaceId, app_id: String },

    /// Client committed new state.
    SurfaceCommitted {
        surface: SurfaceId,
        geometry: Rect,
        maximized: bool,
    },

    /// Surface destroyed.
    SurfaceRemoved { surface: SurfaceId },

    // ════════════════════════════════════════════════════════════════════════
    // Shell Protocol
    // ════════════════════════════════════════════════════════════════════════
    BindShell { client: ClientInfo, respond_to: Responder<()> },
    UnbindShell,
    BindDesktop { client: ClientInfo, respond_to: Responder<()> },
    UnbindDesktop { client: ClientId },
    Ready,
    SetBackground { surface: SurfaceId, output: OutputId },
    SetPanel { surface: SurfaceId, output: OutputId, edge: u32 },
    ActivateApp { app_id: String, output: OutputId },

    // ════════════════════════════════════════════════════════════════════════
    // Desktop Protocol
    // ════════════════════════════════════════════════════════════════════════
    DesktopActivateApp {
        app_id: String,
        data: Option<String>,
        output: OutputId,
    },
    DeactivateApp { app_id: String },
    SetAppProperty {
        app_id: String,
        role: u32,
        x: i32,
        y: i32,
        bounding_box: Rect,
        output: OutputId,
    },

    // ════════════════════════════════════════════════════════════════════════
    // Policy
    // ════════════════════════════════════════════════════════════════════════
    /// Register a rule targeting the output named `output`.
    PolicyAdd {
        app_id: String,
        state: u32,
        event: u32,
        timeout_ms: u32,
        output: String,
        respond_to: Responder<RuleId>,
    },

    /// Switch the policy state.
    StateChange { state: u32, respond_to: Responder<usize> },

    /// A deferred rule's timer expired.
    PolicyTimerFired(PolicyRule),

    // ════════════════════════════════════════════════════════════════════════
    // Queries (with response channel)
    // ════════════════════════════════════════════════════════════════════════
    Query {
        query: ShellQuery,
        respond_to: oneshot::Sender<QueryResult>,
    },

    /// Shutdown the actor gracefully.
    Shutdown,
}

impl ShellMessage {
    /// Returns a human-readable name for this message type.
    ///
    /// Used for logging, especially in panic recovery.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::HeadsChanged { .. } => "HeadsChanged",
            Self::HeadDestroyed { .. } => "HeadDestroyed",

            Self::SurfaceAdded { .. } => "SurfaceAdded",
            Self::SurfaceAppIdSet { .. } => "SurfaceAppIdSet",
            Self::SurfaceCommitted { .. } => "SurfaceCommitted",
            Self::SurfaceRemoved { .. } => "SurfaceRemoved",

            Self::BindShell { .. } => "BindShell",
            Self::UnbindShell => "UnbindShell",
            Self::BindDesktop { .. } => "BindDesktop",
            Self::UnbindDesktop { .. } => "UnbindDesktop",
            Self::Ready => "Ready",
            Self::SetBackground { .. } => "SetBackground",
            Self::SetPanel { .. } => "SetPanel",
            Self::ActivateApp { .. } => "ActivateApp",

            Self::DesktopActivateApp { .. } => "DesktopActivateApp",
            Self::DeactivateApp { .. } => "DeactivateApp",
            Self::SetAppProperty { .. } => "SetAppProperty",

            Self::PolicyAdd { .. } => "PolicyAdd",
            Self::StateChange { .. } => "StateChange",
            Self::PolicyTimerFired(_) => "PolicyTimerFired",

            Self::Query { .. } => "Query",
            Self::Shutdown => "Shutdown",
        }
    }
}

// ============================================================================
// Queries
// ============================================================================

/// Queries that can be executed against the shell.
#[derive(Debug, Clone)]
pub enum ShellQuery {
    Snapshot,
    Surface { id: SurfaceId },
    Output { id: OutputId },
    OutputByName { name: String },
    FindApp { app_id: String },
    Pending,
    Ready,
}

/// Results from queries.
#[derive(Debug, Clone)]
pub enum QueryResult {
    Snapshot(Box<ShellSnapshot>),
    Surface(Option<Box<Surface>>),
    Output(Option<Box<Output>>),
    SurfaceId(Option<SurfaceId>),
    Pending(Vec<PendingEntry>),
    Ready(bool),
}

impl QueryResult {
    /// Try to get the snapshot from the result.
    #[must_use]
    pub fn into_snapshot(self) -> Option<ShellSnapshot> {
        match self {
            Self::Snapshot(snapshot) => Some(*snapshot),
            _ => None,
        }
    }

    /// Try to get a surface from the result.
    #[must_use]
    pub fn into_surface(self) -> Option<Surface> {
        match self {
            Self::Surface(surface) => surface.map(|s| *s),
            _ => None,
        }
    }

    /// Try to get an output from the result.
    #[must_use]
    pub fn into_output(self) -> Option<Output> {
        match self {
            Self::Output(output) => output.map(|o| *o),
            _ => None,
        }
    }

    /// Try to get a surface ID from the result.
    #[must_use]
    pub fn into_surface_id(self) -> Option<SurfaceId> {
        match self {
            Self::SurfaceId(id) => id,
            _ => None,
        }
    }

    /// Try to get the ready flag from the result.
    #[must_use]
    pub fn into_ready(self) -> Option<bool> {
        match self {
            Self::Ready(ready) => Some(ready),
            _ => None,
        }
    }
}
