//! Surface roles.
//!
//! A role is the fixed behavioral category of a surface. Every surface starts
//! as [`SurfaceRole::None`] and is given its terminal role exactly once.

use serde::Serialize;

use super::types::{OutputId, PanelEdge, Rect, SplitOrientation};

/// Role of a surface together with its role-specific payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum SurfaceRole {
    /// Not yet resolved.
    #[default]
    None,

    /// Regular application surface, maximized into the usable area.
    Desktop {
        /// Output the surface is being activated on.
        pending_output: Option<OutputId>,
        /// Output the surface was last activated on.
        last_output: Option<OutputId>,
    },

    /// Full-output wallpaper drawn under everything else.
    Background { output: OutputId },

    /// Bar anchored to one output edge, shrinking the usable area.
    Panel { output: OutputId, edge: PanelEdge },

    /// Dialog positioned relative to the output origin.
    Popup {
        output: OutputId,
        x: i32,
        y: i32,
        /// Clip box; ignored unless both dimensions are positive.
        bounding_box: Rect,
    },

    /// Covers the whole output, painting over panels.
    Fullscreen { output: OutputId },

    /// Top half of the usable area.
    SplitHorizontal { output: OutputId },

    /// Right half of the usable area.
    SplitVertical { output: OutputId },

    /// Desktop surface pinned to a (possibly streamed) output.
    Remote { output: OutputId },
}

/// Payload-free discriminant of [`SurfaceRole`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    None,
    Desktop,
    Background,
    Panel,
    Popup,
    Fullscreen,
    SplitHorizontal,
    SplitVertical,
    Remote,
}

impl RoleKind {
    /// Upper-case role name used in logs and tables.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Desktop => "DESKTOP",
            Self::Background => "BACKGROUND",
            Self::Panel => "PANEL",
            Self::Popup => "POPUP",
            Self::Fullscreen => "FULLSCREEN",
            Self::SplitHorizontal => "SPLIT_H",
            Self::SplitVertical => "SPLIT_V",
            Self::Remote => "REMOTE",
        }
    }

    /// Whether this is one of the two split roles.
    #[must_use]
    pub const fn is_split(self) -> bool {
        matches!(self, Self::SplitHorizontal | Self::SplitVertical)
    }
}

impl SurfaceRole {
    /// A fresh desktop role with no outputs yet.
    #[must_use]
    pub const fn desktop() -> Self { Self::Desktop { pending_output: None, last_output: None } }

    /// A split role for the given orientation.
    #[must_use]
    pub const fn split(output: OutputId, orientation: SplitOrientation) -> Self {
        match orientation {
            SplitOrientation::Vertical => Self::SplitVertical { output },
            SplitOrientation::Horizontal => Self::SplitHorizontal { output },
        }
    }

    /// Returns the payload-free kind of this role.
    #[must_use]
    pub const fn kind(&self) -> RoleKind {
        match self {
            Self::None => RoleKind::None,
            Self::Desktop { .. } => RoleKind::Desktop,
            Self::Background { .. } => RoleKind::Background,
            Self::Panel { .. } => RoleKind::Panel,
            Self::Popup { .. } => RoleKind::Popup,
            Self::Fullscreen { .. } => RoleKind::Fullscreen,
            Self::SplitHorizontal { .. } => RoleKind::SplitHorizontal,
            Self::SplitVertical { .. } => RoleKind::SplitVertical,
            Self::Remote { .. } => RoleKind::Remote,
        }
    }

    /// Upper-case role name.
    #[must_use]
    pub const fn name(&self) -> &'static str { self.kind().name() }

    /// Whether the role is still unresolved.
    #[must_use]
    pub const fn is_none(&self) -> bool { matches!(self, Self::None) }

    /// Output the role is bound to.
    ///
    /// Desktop surfaces report their pending output if an activation is in
    /// flight, otherwise the output they were last activated on.
    #[must_use]
    pub const fn output(&self) -> Option<OutputId> {
        match *self {
            Self::None => None,
            Self::Desktop { pending_output, last_output } => match pending_output {
                Some(output) => Some(output),
                None => last_output,
            },
            Self::Background { output }
            | Self::Panel { output, .. }
            | Self::Popup { output, .. }
            | Self::Fullscreen { output }
            | Self::SplitHorizontal { output }
            | Self::SplitVertical { output }
            | Self::Remote { output } => Some(output),
        }
    }
}
