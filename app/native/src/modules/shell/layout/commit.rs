//! Per-role commit handling.
//!
//! A commit is the client telling us its buffer and desktop state changed.
//! Desktop and remote surfaces go through default activation until they
//! report the maximized size we asked for; popup, split and fullscreen
//! surfaces are placed once, on their first commit after role assignment.

use crate::modules::shell::Shell;
use crate::modules::shell::effects::ShellEffect;
use crate::modules::shell::error::{ShellError, ShellResult};
use crate::modules::shell::state::{AppState, Layer, OutputId, RoleKind, SurfaceId, SurfaceRole};

impl Shell {
    /// Dispatch a commit to the handler of the surface's role.
    pub(crate) fn role_committed(&mut self, id: SurfaceId) -> ShellResult<()> {
        let kind = self.require_surface(id)?.kind();
        match kind {
            RoleKind::Desktop | RoleKind::Remote => self.desktop_committed(id),
            RoleKind::Popup => {
                self.popup_committed(id);
                Ok(())
            }
            RoleKind::Fullscreen => {
                self.fullscreen_committed(id);
                Ok(())
            }
            RoleKind::SplitHorizontal | RoleKind::SplitVertical => {
                self.split_committed(id);
                Ok(())
            }
            RoleKind::None | RoleKind::Background | RoleKind::Panel => Ok(()),
        }
    }

    /// Commit of a desktop or remote surface.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if a desktop surface needs default
    /// activation and no output can host it.
    pub(crate) fn desktop_committed(&mut self, id: SurfaceId) -> ShellResult<()> {
        let surface = self.require_surface(id)?;
        let kind = surface.kind();
        let app_id = surface.app_id.clone();
        let target = match kind {
            RoleKind::Desktop => surface.pending_output(),
            RoleKind::Remote => surface.output(),
            _ => return Ok(()),
        };

        if kind == RoleKind::Desktop && target.is_none() {
            if !self.policy.hooks().surface_activate_by_default(surface)
                || surface.activated_by_default
            {
                return Ok(());
            }

            let pinned = app_id.as_deref().and_then(|a| self.outputs.find_with_app_id(a));
            if let Some(pinned) = pinned {
                self.placeholder_remove(pinned);
            }
            let Some(output) = pinned.or_else(|| self.outputs.find_bg_output()) else {
                return Err(ShellError::no_output_for_activation(self.shell_client));
            };

            if !self.activate_by_default {
                tracing::info!(
                    app_id = app_id.as_deref().unwrap_or_default(),
                    "layout: refusing to activate surface by default"
                );
                return Ok(());
            }

            tracing::info!(
                app_id = app_id.as_deref().unwrap_or("<none>"),
                output = %output,
                "layout: activating by default"
            );
            match app_id.as_deref() {
                Some(app_id) => self.activate(output, app_id),
                None => self.activate_by_surf(output, id),
            }
            if let Some(surface) = self.surfaces.get_mut(id) {
                surface.activated_by_default = true;
            }
            return Ok(());
        }

        if kind == RoleKind::Remote {
            let Some(output) = target else {
                return Ok(());
            };
            if !self.policy.hooks().surface_activate_by_default(surface) {
                return Ok(());
            }
            let active_here = self.outputs.get(output).is_some_and(|o| o.active == Some(id));
            if surface.activated_by_default && active_here {
                return Ok(());
            }

            if let Some(app_id) = app_id {
                tracing::info!(
                    app_id = %app_id,
                    output = %output,
                    "layout: activating remote surface"
                );
                self.activate(output, &app_id);
                if let Some(surface) = self.surfaces.get_mut(id) {
                    surface.activated_by_default = true;
                }
            }
            return Ok(());
        }

        let Some(output) = target else {
            return Ok(());
        };
        let area = self.require_output(output)?.area;
        if self.require_surface(id)?.fills(&area) {
            self.activate_complete(output, id);
        }
        Ok(())
    }

    /// Whether a popup, split or fullscreen surface may be placed.
    fn placement_allowed(&self, id: SurfaceId) -> bool {
        let Some(surface) = self.surfaces.get(id) else {
            return false;
        };
        if !self.policy.hooks().surface_activate_by_default(surface)
            && !surface.activated_by_default
        {
            return false;
        }
        !surface.view.mapped
    }

    pub(crate) fn fullscreen_committed(&mut self, id: SurfaceId) {
        if !self.placement_allowed(id) {
            return;
        }
        let Some(output) = self.surfaces.get(id).and_then(|s| s.output()) else {
            return;
        };
        let Some(geometry) = self.outputs.get(output).map(|o| o.geometry) else {
            return;
        };

        self.emit(ShellEffect::SetFullscreen { surface: id, fullscreen: true });
        self.emit(ShellEffect::SetSize {
            surface: id,
            width: geometry.width,
            height: geometry.height,
        });
        self.view_set_output(id, output);
        self.view_set_position(id, geometry.x, geometry.y);
        self.view_map(id, Layer::Fullscreen);

        self.placed(id, output);
    }

    pub(crate) fn split_committed(&mut self, id: SurfaceId) {
        if !self.placement_allowed(id) {
            return;
        }
        let Some(role) = self.surfaces.get(id).map(|s| s.role().clone()) else {
            return;
        };
        let (output, vertical) = match role {
            SurfaceRole::SplitVertical { output } => (output, true),
            SurfaceRole::SplitHorizontal { output } => (output, false),
            _ => return,
        };
        let Some(out) = self.outputs.get_mut(output) else {
            return;
        };

        out.area_saved = out.area;
        let geometry = out.geometry;
        let ((x, y), (width, height)) = if vertical {
            let width = out.area.width / 2;
            out.area.width -= width;
            let x = geometry.x + geometry.width - width;
            ((x, geometry.y + out.area.y), (width, out.area.height))
        } else {
            let height = out.area.height / 2;
            let top = out.area.y;
            out.area.y += height;
            out.area.height -= height;
            ((geometry.x + out.area.x, geometry.y + top), (out.area.width, height))
        };
        let remaining = out.area;
        let active = out.active;

        self.emit(ShellEffect::SetSize { surface: id, width, height });
        if let Some(active) = active {
            self.desktop_resize(active, output, remaining);
        }

        self.view_set_output(id, output);
        self.view_set_position(id, x, y);
        self.view_map(id, Layer::Normal);

        self.placed(id, output);
    }

    pub(crate) fn popup_committed(&mut self, id: SurfaceId) {
        if !self.placement_allowed(id) {
            return;
        }
        let Some(SurfaceRole::Popup { output, x, y, bounding_box }) =
            self.surfaces.get(id).map(|s| s.role().clone())
        else {
            return;
        };
        let Some(geometry) = self.outputs.get(output).map(|o| o.geometry) else {
            return;
        };

        self.view_set_output(id, output);
        self.view_set_position(id, geometry.x + x, geometry.y + y);
        if bounding_box.is_valid() {
            self.view_set_mask(id, bounding_box);
        }
        self.view_map(id, Layer::Popup);

        self.placed(id, output);
    }

    /// Common tail of popup, split and fullscreen placement.
    fn placed(&mut self, id: SurfaceId, output: OutputId) {
        let Some(surface) = self.surfaces.get(id) else {
            return;
        };
        let app_id = surface.app_id.clone();
        tracing::info!(
            app_id = app_id.as_deref().unwrap_or("<none>"),
            role = surface.role_name(),
            output = %output,
            "layout: activation completed"
        );
        self.schedule_repaint(Some(output));
        if let Some(app_id) = app_id {
            self.advertise_app_state(&app_id, None, AppState::Activated);
        }
    }
}
