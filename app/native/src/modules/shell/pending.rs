//! Pending-role queues.
//!
//! A desktop client may ask for a role (popup, split, fullscreen, remote)
//! before the application surface exists. The request is parked here, keyed by
//! app-id, and consumed by the first matching surface when it resolves its
//! role.
//!
//! Resolution order is fixed: popup, split, fullscreen, remote. A surface
//! matching none of the queues becomes a plain desktop surface. Within a queue
//! the most recent request wins.

use serde::Serialize;

use super::state::{AppRole, OutputId, Rect, SplitOrientation, SurfaceRegistry, SurfaceRole};

/// Role parameters recorded with a pending request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendingRole {
    Popup { x: i32, y: i32, bounding_box: Rect },
    Split { orientation: SplitOrientation },
    Fullscreen,
    Remote,
}

impl PendingRole {
    /// Build the pending parameters for a desktop `set_app_property` request.
    #[must_use]
    pub const fn from_app_role(role: AppRole, x: i32, y: i32, bounding_box: Rect) -> Self {
        match role {
            AppRole::Popup => Self::Popup { x, y, bounding_box },
            AppRole::Fullscreen => Self::Fullscreen,
            AppRole::SplitVertical => Self::Split { orientation: SplitOrientation::Vertical },
            AppRole::SplitHorizontal => Self::Split { orientation: SplitOrientation::Horizontal },
            AppRole::Remote => Self::Remote,
        }
    }

    /// Terminal surface role for this request on `output`.
    #[must_use]
    pub const fn into_role(self, output: OutputId) -> SurfaceRole {
        match self {
            Self::Popup { x, y, bounding_box } => SurfaceRole::Popup { output, x, y, bounding_box },
            Self::Split { orientation } => SurfaceRole::split(output, orientation),
            Self::Fullscreen => SurfaceRole::Fullscreen { output },
            Self::Remote => SurfaceRole::Remote { output },
        }
    }

    const fn queue(self) -> usize {
        match self {
            Self::Popup { .. } => 0,
            Self::Split { .. } => 1,
            Self::Fullscreen => 2,
            Self::Remote => 3,
        }
    }
}

/// A parked role request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PendingEntry {
    pub app_id: String,
    pub output: OutputId,
    pub role: PendingRole,
}

/// The four queues, in resolution priority order.
#[derive(Debug, Default)]
pub struct PendingQueues {
    queues: [Vec<PendingEntry>; 4],
}

impl PendingQueues {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Park a role request for `app_id`.
    ///
    /// Only one split surface may exist at a time: a split request is dropped
    /// if any live surface already holds a split role. Returns whether the
    /// request was queued.
    pub fn set_pending(
        &mut self,
        output: OutputId,
        app_id: &str,
        role: PendingRole,
        surfaces: &SurfaceRegistry,
    ) -> bool {
        if matches!(role, PendingRole::Split { .. }) && surfaces.has_split() {
            tracing::debug!(app_id, "shell: split already present, dropping split request");
            return false;
        }

        self.queues[role.queue()].push(PendingEntry {
            app_id: app_id.to_string(),
            output,
            role,
        });
        true
    }

    /// Remove and return the highest-priority request for `app_id`.
    pub fn resolve(&mut self, app_id: &str) -> Option<PendingEntry> {
        self.queues.iter_mut().find_map(|queue| {
            let pos = queue.iter().rposition(|e| e.app_id == app_id)?;
            Some(queue.remove(pos))
        })
    }

    /// Whether any queue holds a request for `app_id`.
    #[must_use]
    pub fn matches(&self, app_id: &str) -> bool {
        self.queues.iter().flatten().any(|e| e.app_id == app_id)
    }

    /// Drop every request for `app_id`. Returns how many were removed.
    pub fn discard(&mut self, app_id: &str) -> usize {
        let before = self.len();
        for queue in &mut self.queues {
            queue.retain(|e| e.app_id != app_id);
        }
        before - self.len()
    }

    /// Drop every request targeting an output.
    pub fn discard_output(&mut self, output: OutputId) {
        for queue in &mut self.queues {
            queue.retain(|e| e.output != output);
        }
    }

    /// All parked requests in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &PendingEntry> { self.queues.iter().flatten() }

    /// Total number of parked requests.
    #[must_use]
    pub fn len(&self) -> usize { self.queues.iter().map(Vec::len).sum() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.queues.iter().all(Vec::is_empty) }
}
