//! Role resolution for surfaces parked on the pending list.

use crate::modules::shell::Shell;
use crate::modules::shell::effects::{ShellEffect, ShellEvent};
use crate::modules::shell::error::ShellResult;
use crate::modules::shell::state::{OutputKind, RoleKind, SurfaceId, SurfaceRole};

impl Shell {
    /// Give a role-less surface its terminal role and run the commit path
    /// of that role.
    ///
    /// The pending queues are tried in priority order; a surface with no
    /// matching request becomes a plain desktop surface.
    ///
    /// # Errors
    ///
    /// Propagates role assignment and commit failures.
    pub(crate) fn resolve_pending_surface(&mut self, id: SurfaceId) -> ShellResult<()> {
        let app_id = self.require_surface(id)?.app_id.clone();
        let entry = app_id.as_deref().and_then(|a| self.pending.resolve(a));
        let role = entry.map_or_else(SurfaceRole::desktop, |e| e.role.into_role(e.output));
        let kind = role.kind();

        self.surfaces
            .get_mut(id)
            .map_or(Ok(()), |surface| surface.set_role(role.clone()))?;
        self.surfaces.link(id);
        tracing::debug!(
            surface = %id,
            app_id = app_id.as_deref().unwrap_or("<none>"),
            role = kind.name(),
            "layout: role resolved"
        );

        if let SurfaceRole::Remote { output } = role {
            self.placeholder_remove(output);
            let transmits = self
                .outputs
                .get(output)
                .is_some_and(|o| o.kind == OutputKind::RemoteWithTransmitter);
            if transmits {
                self.emit(ShellEffect::ForwardToRemote { surface: id, output });
            }
        } else {
            self.advertise_application(id);
        }

        match kind {
            RoleKind::Desktop | RoleKind::Remote => self.desktop_committed(id),
            _ => self.role_committed(id),
        }
    }

    /// Tell every desktop client about a surface's app-id, once.
    pub(crate) fn advertise_application(&mut self, id: SurfaceId) {
        let Some(surface) = self.surfaces.get(id) else {
            return;
        };
        if surface.advertised_on_launch || self.desktop_clients.is_empty() {
            return;
        }
        let Some(app_id) = surface.app_id.clone() else {
            tracing::debug!(surface = %id, "shell: no app-id yet, unable to advertise");
            return;
        };

        for client in self.desktop_clients.clone() {
            self.emit(ShellEffect::SendEvent {
                client,
                event: ShellEvent::AdvertiseApplication { app_id: app_id.clone() },
            });
        }
        if let Some(surface) = self.surfaces.get_mut(id) {
            surface.advertised_on_launch = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::modules::shell::state::{AppRole, ClientId, Layer, Rect, RoleKind, ViewId};
    use crate::modules::shell::testing::{commit, ready_shell};

    #[test]
    fn test_popup_wins_over_split() {
        let (mut shell, output) = ready_shell();
        let split = AppRole::SplitVertical as u32;
        shell.set_app_property("dlg", split, 0, 0, Rect::zero(), output).unwrap();
        shell.set_app_property("dlg", AppRole::Popup as u32, 10, 20, Rect::zero(), output).unwrap();

        let id = shell.surface_added(ClientId(3), Some("dlg".into())).unwrap();
        commit(&mut shell, id, Rect::sized(400, 300), false);

        let surface = shell.surface(id).unwrap();
        assert_eq!(surface.kind(), RoleKind::Popup);
        assert_eq!(surface.view.position.x, 10);
        assert_eq!(shell.layers().layer_of(ViewId::Surface(id)), Some(Layer::Popup));
        assert_eq!(shell.pending_queues().len(), 1);
    }

    #[test]
    fn test_resolution_happens_once() {
        let (mut shell, output) = ready_shell();
        let id = shell.surface_added(ClientId(3), Some("nav".into())).unwrap();
        commit(&mut shell, id, Rect::sized(1920, 1080), true);
        assert_eq!(shell.surface(id).unwrap().kind(), RoleKind::Desktop);

        shell.set_app_property("nav", AppRole::Popup as u32, 0, 0, Rect::zero(), output).unwrap();
        commit(&mut shell, id, Rect::sized(1920, 1080), true);
        assert_eq!(shell.surface(id).unwrap().kind(), RoleKind::Desktop);
    }

    #[test]
    fn test_no_app_id_falls_back_to_desktop() {
        let (mut shell, _) = ready_shell();
        let id = shell.surface_added(ClientId(3), None).unwrap();
        commit(&mut shell, id, Rect::sized(1920, 1080), true);
        assert_eq!(shell.surface(id).unwrap().kind(), RoleKind::Desktop);
        assert!(shell.surfaces().is_listed(id));
    }
}
