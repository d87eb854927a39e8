//! Shell and desktop protocol requests.
//!
//! Each request maps onto a layout or pending-queue entry point. Protocol
//! violations are returned as [`ShellError::Protocol`] and also queued as a
//! [`ShellEffect::ProtocolError`] for the offending client.

use super::Shell;
use super::effects::{ShellEffect, ShellEvent};
use super::error::{ShellError, ShellResult};
use super::pending::PendingRole;
use super::policy::ClientInfo;
use super::state::{
    AppRole, AppState, ClientId, OutputId, PanelEdge, Rect, RoleKind, ShellInterface, SurfaceId,
    SurfaceRole,
};

const ROLE_TAKEN: &str = "surface already has another ivi role";

impl Shell {
    // ========================================================================
    // Binding
    // ========================================================================

    /// A client binds the shell interface.
    ///
    /// # Errors
    ///
    /// - [`ShellError::NotAuthorized`] if the policy refuses the client.
    /// - [`ShellError::AlreadyBound`] if another client holds the interface.
    pub fn bind_shell(&mut self, client: &ClientInfo) -> ShellResult<()> {
        let interface = ShellInterface::Shell;
        if !self.policy.hooks_mut().shell_bind_interface(client, interface) {
            tracing::warn!(client = %client.id, "shell: client not authorized to use ivi_shell");
            return Err(ShellError::NotAuthorized { interface: interface.name() });
        }
        if self.shell_client.is_some() {
            return Err(ShellError::AlreadyBound);
        }

        self.shell_client = Some(client.id);
        self.emit(ShellEffect::SendEvent { client: client.id, event: ShellEvent::Bound });
        tracing::info!(client = %client.id, "shell: shell client bound");
        Ok(())
    }

    /// The shell client went away.
    ///
    /// Every output loses its active surface and gets its placeholder back;
    /// the surface lists are emptied so a new shell client starts over.
    pub fn unbind_shell(&mut self) {
        for output in self.outputs.ids() {
            let active = self.outputs.get_mut(output).and_then(|o| o.active.take());
            if let Some(active) = active {
                self.view_unmap(active);
            }
            self.placeholder_insert(output);
        }

        self.surfaces.unlink_all();
        self.ready = false;
        if let Some(client) = self.shell_client.take() {
            tracing::info!(client = %client, "shell: shell client unbound");
        }
    }

    /// A client binds the desktop interface. Every listed surface with an
    /// app-id is advertised to it.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::NotAuthorized`] if the policy refuses the client.
    pub fn bind_desktop(&mut self, client: &ClientInfo) -> ShellResult<()> {
        let interface = ShellInterface::Desktop;
        if !self.policy.hooks_mut().shell_bind_interface(client, interface) {
            tracing::warn!(
                client = %client.id,
                "shell: client not authorized to use ivi_shell_desktop"
            );
            return Err(ShellError::NotAuthorized { interface: interface.name() });
        }
        if !self.desktop_clients.contains(&client.id) {
            self.desktop_clients.push(client.id);
        }

        let app_ids: Vec<String> = self
            .surfaces
            .listed()
            .iter()
            .filter_map(|id| self.surfaces.get(*id))
            .filter_map(|s| s.app_id.clone())
            .collect();
        for app_id in app_ids {
            self.emit(ShellEffect::SendEvent {
                client: client.id,
                event: ShellEvent::AdvertiseApplication { app_id },
            });
        }
        tracing::info!(client = %client.id, "shell: desktop client bound");
        Ok(())
    }

    pub fn unbind_desktop(&mut self, client: ClientId) {
        self.desktop_clients.retain(|c| *c != client);
    }

    // ========================================================================
    // Shell Interface
    // ========================================================================

    /// The shell client finished setting up backgrounds and panels.
    ///
    /// Idempotent. Lays out every output and resolves every parked surface.
    ///
    /// # Errors
    ///
    /// Returns the first protocol error raised while resolving parked
    /// surfaces; the remaining surfaces are still resolved.
    pub fn ready(&mut self) -> ShellResult<()> {
        if self.ready {
            return Ok(());
        }
        self.ready = true;
        tracing::info!("shell: shell client ready");

        for output in self.outputs.ids() {
            if self.outputs.get(output).is_some_and(|o| o.background.is_some()) {
                self.placeholder_remove(output);
            }
            self.layout_init(output);
        }

        let mut first_error = None;
        for id in self.surfaces.take_pending() {
            let Some(surface) = self.surfaces.get_mut(id) else {
                continue;
            };
            surface.checked_pending = true;

            let result = self.resolve_pending_surface(id);
            if let Err(err) = self.reported(result) {
                tracing::error!(surface = %id, error = %err, "shell: failed to resolve surface");
                first_error.get_or_insert(err);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Make a surface the background of an output.
    ///
    /// # Errors
    ///
    /// Protocol errors for surfaces that already have a role and outputs
    /// that already have a background.
    pub fn set_background(&mut self, surface: SurfaceId, output: OutputId) -> ShellResult<()> {
        let result = self.try_set_background(surface, output);
        self.reported(result)
    }

    fn try_set_background(&mut self, id: SurfaceId, output: OutputId) -> ShellResult<()> {
        let client = self.shell_client;
        let Some(surface) = self.surfaces.get(id) else {
            return Err(ShellError::invalid_argument(client, "surface must be a desktop surface"));
        };
        if !surface.role().is_none() {
            return Err(ShellError::invalid_argument(client, ROLE_TAKEN));
        }
        let out = self.require_output(output)?;
        if out.background.is_some() {
            return Err(ShellError::background_exists(client, "output already has background"));
        }
        let geometry = out.geometry;

        self.assign_shell_role(id, SurfaceRole::Background { output })?;
        if let Some(out) = self.outputs.get_mut(output) {
            out.background = Some(id);
        }
        self.configure_maximized(id, geometry.width, geometry.height);
        tracing::info!(surface = %id, output = %output, "shell: background set");
        Ok(())
    }

    /// Make a surface a panel on one edge of an output.
    ///
    /// # Errors
    ///
    /// Protocol errors for surfaces that already have a role, invalid edges
    /// and occupied edges.
    pub fn set_panel(
        &mut self,
        surface: SurfaceId,
        output: OutputId,
        edge: u32,
    ) -> ShellResult<()> {
        let result = self.try_set_panel(surface, output, edge);
        self.reported(result)
    }

    fn try_set_panel(&mut self, id: SurfaceId, output: OutputId, edge: u32) -> ShellResult<()> {
        let client = self.shell_client;
        let Some(surface) = self.surfaces.get(id) else {
            return Err(ShellError::invalid_argument(client, "surface must be a desktop surface"));
        };
        if !surface.role().is_none() {
            return Err(ShellError::invalid_argument(client, ROLE_TAKEN));
        }
        let edge = PanelEdge::try_from(edge)
            .map_err(|_| ShellError::invalid_argument(client, "invalid edge for panel"))?;
        let out = self.require_output(output)?;
        if out.panel(edge).is_some() {
            return Err(ShellError::background_exists(
                client,
                "output already has panel on this edge",
            ));
        }
        let geometry = out.geometry;

        self.assign_shell_role(id, SurfaceRole::Panel { output, edge })?;
        if let Some(out) = self.outputs.get_mut(output) {
            out.set_panel(edge, Some(id));
        }

        let (width, height) = if edge.is_horizontal() {
            (geometry.width, 0)
        } else {
            (0, geometry.height)
        };
        self.emit(ShellEffect::SetSize { surface: id, width, height });
        tracing::info!(surface = %id, output = %output, edge = edge.as_str(), "shell: panel set");
        Ok(())
    }

    /// Give a surface a shell-assigned role and take it off every list.
    fn assign_shell_role(&mut self, id: SurfaceId, role: SurfaceRole) -> ShellResult<()> {
        let surface = self.surfaces.get_mut(id).ok_or(ShellError::SurfaceNotFound(id))?;
        surface.set_role(role)?;
        surface.checked_pending = true;
        self.surfaces.unlink(id);
        Ok(())
    }

    /// Show an application on an output.
    ///
    /// Unknown app-ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::OutputNotFound`] for unknown outputs.
    pub fn activate_app(&mut self, app_id: &str, output: OutputId) -> ShellResult<()> {
        self.require_output(output)?;
        self.activate(output, app_id);
        Ok(())
    }

    // ========================================================================
    // Desktop Interface
    // ========================================================================

    /// Desktop variant of [`Self::activate_app`] that also broadcasts
    /// `state_app(activated)`.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::OutputNotFound`] for unknown outputs.
    pub fn desktop_activate_app(
        &mut self,
        app_id: &str,
        data: Option<&str>,
        output: OutputId,
    ) -> ShellResult<()> {
        self.activate_app(app_id, output)?;
        self.advertise_app_state(app_id, data, AppState::Activated);
        Ok(())
    }

    /// Hide an application and broadcast `state_app(deactivated)`.
    pub fn deactivate_app(&mut self, app_id: &str) {
        self.deactivate(app_id);
        self.advertise_app_state(app_id, None, AppState::Deactivated);
    }

    /// Park a role request for an application that has not mapped yet.
    ///
    /// Returns whether the request was queued. Unknown roles are ignored, as
    /// are split requests while a split surface exists.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::OutputNotFound`] for unknown outputs.
    pub fn set_app_property(
        &mut self,
        app_id: &str,
        role: u32,
        x: i32,
        y: i32,
        bounding_box: Rect,
        output: OutputId,
    ) -> ShellResult<bool> {
        self.require_output(output)?;
        let Ok(role) = AppRole::try_from(role) else {
            tracing::debug!(app_id, role, "shell: ignoring unknown app role");
            return Ok(false);
        };

        let pending = PendingRole::from_app_role(role, x, y, bounding_box);
        let queued = self.pending.set_pending(output, app_id, pending, &self.surfaces);
        if queued {
            tracing::debug!(app_id, role = ?role, output = %output, "shell: role request queued");
        }
        Ok(queued)
    }

    /// Role of the most recent listed surface carrying `app_id`.
    #[must_use]
    pub fn app_role(&self, app_id: &str) -> Option<RoleKind> {
        self.surfaces.find_by_app_id(app_id).and_then(|id| self.surfaces.get(id)).map(|s| s.kind())
    }
}
