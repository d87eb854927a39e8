//! Surface state.

use serde::Serialize;

use super::role::{RoleKind, SurfaceRole};
use super::types::{ClientId, Layer, OutputId, Point, Rect, SurfaceId};
use crate::modules::shell::error::{ShellError, ShellResult};

/// The on-screen instance of a surface's content.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ViewState {
    /// Output the view is assigned to.
    pub output: Option<OutputId>,
    /// Global position of the view.
    pub position: Point,
    /// Whether the view is mapped.
    pub mapped: bool,
    /// Layer currently holding the view, mirrored from the layer stack.
    pub layer: Option<Layer>,
    /// Clip mask relative to the view.
    pub mask: Option<Rect>,
}

/// A client surface tracked by the shell.
#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Debug, Serialize)]
pub struct Surface {
    /// Registry-assigned ID.
    pub id: SurfaceId,

    /// Client owning the surface.
    pub client: ClientId,

    /// Application ID; may arrive after creation.
    pub app_id: Option<String>,

    /// Geometry last committed by the client.
    pub geometry: Rect,

    /// Whether the client last committed a maximized state.
    pub maximized: bool,

    /// View state.
    pub view: ViewState,

    /// Role; only ever assigned once through [`Surface::set_role`].
    role: SurfaceRole,

    /// First automatic activation already happened.
    pub activated_by_default: bool,

    /// App-id has been advertised to desktop clients.
    pub advertised_on_launch: bool,

    /// Pending-queue resolution was attempted.
    pub checked_pending: bool,
}

impl Surface {
    /// Create a surface with no role.
    #[must_use]
    pub fn new(id: SurfaceId, client: ClientId, app_id: Option<String>) -> Self {
        Self {
            id,
            client,
            app_id,
            geometry: Rect::zero(),
            maximized: false,
            view: ViewState::default(),
            role: SurfaceRole::None,
            activated_by_default: false,
            advertised_on_launch: false,
            checked_pending: false,
        }
    }

    /// Current role.
    #[must_use]
    pub const fn role(&self) -> &SurfaceRole { &self.role }

    /// Current role kind.
    #[must_use]
    pub const fn kind(&self) -> RoleKind { self.role.kind() }

    /// Upper-case role name.
    #[must_use]
    pub const fn role_name(&self) -> &'static str { self.role.name() }

    /// App-id as a string slice, if known.
    #[must_use]
    pub fn app_id(&self) -> Option<&str> { self.app_id.as_deref() }

    /// Whether the surface carries the given app-id.
    #[must_use]
    pub fn has_app_id(&self, app_id: &str) -> bool { self.app_id() == Some(app_id) }

    /// Assign the terminal role.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::RoleAlreadyAssigned`] if the surface already has a
    /// role. The existing role is left untouched.
    pub fn set_role(&mut self, role: SurfaceRole) -> ShellResult<()> {
        if !self.role.is_none() {
            return Err(ShellError::RoleAlreadyAssigned {
                surface: self.id,
                current: self.role.name(),
                requested: role.name(),
            });
        }
        self.role = role;
        Ok(())
    }

    /// Output the surface's role is bound to.
    #[must_use]
    pub const fn output(&self) -> Option<OutputId> { self.role.output() }

    /// Record an activation target on a desktop surface.
    pub fn set_pending_output(&mut self, output: OutputId) {
        if let SurfaceRole::Desktop { pending_output, .. } = &mut self.role {
            *pending_output = Some(output);
        }
    }

    /// Promote the pending output to the last output on a desktop surface.
    pub fn promote_pending_output(&mut self) {
        if let SurfaceRole::Desktop { pending_output, last_output } = &mut self.role {
            if pending_output.is_some() {
                *last_output = *pending_output;
            }
            *pending_output = None;
        }
    }

    /// Pending output of a desktop surface.
    #[must_use]
    pub const fn pending_output(&self) -> Option<OutputId> {
        match self.role {
            SurfaceRole::Desktop { pending_output, .. } => pending_output,
            _ => None,
        }
    }

    /// Whether the client geometry is maximized to exactly `area`.
    #[must_use]
    pub const fn fills(&self, area: &Rect) -> bool {
        self.maximized && self.geometry.same_size(area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::shell::state::types::PanelEdge;

    fn make_surface() -> Surface { Surface::new(SurfaceId(1), ClientId(1), Some("nav".into())) }

    #[test]
    fn test_new_surface_has_no_role() {
        let surface = make_surface();
        assert!(surface.role().is_none());
        assert!(!surface.checked_pending);
        assert!(!surface.view.mapped);
    }

    #[test]
    fn test_set_role_once() {
        let mut surface = make_surface();
        assert!(surface.set_role(SurfaceRole::desktop()).is_ok());
        assert_eq!(surface.kind(), RoleKind::Desktop);
    }

    #[test]
    fn test_set_role_twice_fails_and_keeps_first() {
        let mut surface = make_surface();
        surface.set_role(SurfaceRole::Background { output: OutputId(1) }).unwrap();

        let err = surface
            .set_role(SurfaceRole::Panel { output: OutputId(1), edge: PanelEdge::Top })
            .unwrap_err();
        assert!(matches!(err, ShellError::RoleAlreadyAssigned { .. }));
        assert_eq!(surface.kind(), RoleKind::Background);
    }

    #[test]
    fn test_pending_output_promotion() {
        let mut surface = make_surface();
        surface.set_role(SurfaceRole::desktop()).unwrap();
        surface.set_pending_output(OutputId(4));
        assert_eq!(surface.pending_output(), Some(OutputId(4)));

        surface.promote_pending_output();
        assert_eq!(surface.pending_output(), None);
        assert_eq!(surface.output(), Some(OutputId(4)));
    }

    #[test]
    fn test_pending_output_ignored_for_other_roles() {
        let mut surface = make_surface();
        surface.set_role(SurfaceRole::Fullscreen { output: OutputId(1) }).unwrap();
        surface.set_pending_output(OutputId(9));
        assert_eq!(surface.output(), Some(OutputId(1)));
    }

    #[test]
    fn test_fills_requires_maximized() {
        let mut surface = make_surface();
        surface.geometry = Rect::sized(1920, 1032);
        let area = Rect::new(0, 48, 1920, 1032);
        assert!(!surface.fills(&area));
        surface.maximized = true;
        assert!(surface.fills(&area));
    }
}
