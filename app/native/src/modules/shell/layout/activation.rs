//! Activation and deactivation.
//!
//! Activating a desktop surface is a two-step handshake: the client is asked
//! to maximize to the usable area, and only once it commits that exact size
//! does [`Shell::activate_complete`] swap it in for the current active
//! surface. Surfaces already at the right size skip the first step.

use crate::modules::shell::Shell;
use crate::modules::shell::effects::ShellEffect;
use crate::modules::shell::state::{Layer, OutputId, Rect, RoleKind, SurfaceId};

impl Shell {
    /// Activate the most recent surface carrying `app_id` on `output`.
    pub(crate) fn activate(&mut self, output: OutputId, app_id: &str) {
        let Some(id) = self.surfaces.find_by_app_id(app_id) else {
            tracing::debug!(app_id, "layout: no surface to activate");
            return;
        };
        self.activate_by_surf(output, id);
    }

    /// Activate a specific surface on `output`.
    pub(crate) fn activate_by_surf(&mut self, output: OutputId, id: SurfaceId) {
        let Some(surface) = self.surfaces.get(id) else {
            return;
        };
        if !self.policy.hooks().surface_activate(surface) {
            tracing::debug!(surface = %id, "layout: activation vetoed by policy");
            return;
        }

        let kind = surface.kind();
        let app_id = surface.app_id.clone();
        tracing::debug!(
            app_id = app_id.as_deref().unwrap_or("<none>"),
            role = kind.name(),
            output = %output,
            "layout: activating"
        );

        if kind == RoleKind::Popup {
            self.popup_re_add(id);
            return;
        }

        let Some(out) = self.outputs.get(output) else {
            tracing::warn!(output = %output, "layout: activation on unknown output");
            return;
        };
        if out.active == Some(id) {
            return;
        }
        if kind.is_split() || kind == RoleKind::Fullscreen {
            let listed = self.surfaces.is_listed(id);
            if let Some(surface) = self.surfaces.get_mut(id) {
                surface.activated_by_default = true;
            }
            if listed {
                return;
            }
        }
        if kind == RoleKind::Remote {
            let pinned = app_id.as_deref().and_then(|a| self.outputs.find_with_app_id(a));
            let active_on_pinned = pinned
                .and_then(|o| self.outputs.get(o))
                .is_some_and(|o| o.active == Some(id));
            if active_on_pinned {
                return;
            }
        }

        let Some(area) = self.outputs.get(output).map(|o| o.area) else {
            return;
        };
        let Some(surface) = self.surfaces.get_mut(id) else {
            return;
        };
        if kind == RoleKind::Desktop {
            surface.set_pending_output(output);
        }
        if surface.fills(&area) {
            self.activate_complete(output, id);
            return;
        }

        self.configure_maximized(id, area.width, area.height);
        tracing::debug!(
            app_id = app_id.as_deref().unwrap_or("<none>"),
            width = area.width,
            height = area.height,
            "layout: requested maximized size"
        );

        // Hidden-layer mapping lets the client receive frame events and act
        // on the configure.
        if !self.view_is_mapped(id) {
            self.view_set_output(id, output);
            self.view_map(id, Layer::Hidden);
        }
    }

    /// Swap `id` in as the active surface of `output`.
    pub(crate) fn activate_complete(&mut self, output: OutputId, id: SurfaceId) {
        let Some(out) = self.outputs.get(output) else {
            return;
        };
        let position = out.global_area();
        let previous = out.active;

        self.view_set_output(id, output);
        self.view_set_position(id, position.x, position.y);

        if let Some(previous) = previous.filter(|p| *p != id) {
            self.view_unmap(previous);
        }
        if let Some(out) = self.outputs.get_mut(output) {
            if previous != Some(id) {
                out.previous_active = previous;
            }
            out.active = Some(id);
        }

        self.view_map(id, Layer::Normal);
        self.schedule_repaint(Some(output));

        let Some(surface) = self.surfaces.get_mut(id) else {
            return;
        };
        if surface.kind() == RoleKind::Desktop {
            surface.promote_pending_output();
        }
        tracing::info!(
            app_id = surface.app_id().unwrap_or("<none>"),
            role = surface.role_name(),
            output = %output,
            "layout: activation completed"
        );
    }

    /// Show a popup again without recreating it.
    pub(crate) fn popup_re_add(&mut self, id: SurfaceId) {
        if self.view_is_mapped(id) {
            self.view_unmap(id);
        }
        if let Some(surface) = self.surfaces.get_mut(id) {
            surface.activated_by_default = true;
        }
        self.popup_committed(id);
    }

    /// Resize a surface to `area` (output-relative) and move it there.
    pub(crate) fn desktop_resize(&mut self, id: SurfaceId, output: OutputId, area: Rect) {
        let Some(geometry) = self.outputs.get(output).map(|o| o.geometry) else {
            return;
        };
        self.emit(ShellEffect::SetSize { surface: id, width: area.width, height: area.height });
        self.view_set_position(id, geometry.x + area.x, geometry.y + area.y);
    }

    /// Hide the most recent surface carrying `app_id`.
    ///
    /// A desktop surface hands the output back to the previously active
    /// surface, or to the background if there is none. A popup is unmapped.
    pub(crate) fn deactivate(&mut self, app_id: &str) {
        let Some(id) = self.surfaces.find_by_app_id(app_id) else {
            return;
        };
        let Some(surface) = self.surfaces.get(id) else {
            return;
        };
        if !self.policy.hooks().surface_deactivate(surface) {
            tracing::debug!(app_id, "layout: deactivation vetoed by policy");
            return;
        }

        let kind = surface.kind();
        let output = surface.output();
        tracing::info!(app_id, role = kind.name(), "layout: deactivating");

        match kind {
            RoleKind::Desktop => {
                let Some(output) = output else {
                    tracing::warn!(app_id, "layout: desktop surface has no output");
                    return;
                };
                let Some(out) = self.outputs.get(output) else {
                    return;
                };

                if let Some(previous) = out.previous_active {
                    let previous_app = self.surfaces.get(previous).and_then(|s| s.app_id.clone());
                    match previous_app {
                        Some(previous_app) => self.activate(output, &previous_app),
                        None => self.activate_by_surf(output, previous),
                    }
                } else if let Some(active) = out.active {
                    self.view_unmap(active);
                    if let Some(out) = self.outputs.get_mut(output) {
                        out.active = None;
                    }
                    self.schedule_repaint(Some(output));
                }
            }
            RoleKind::Popup => {
                self.view_unmap(id);
                self.schedule_repaint(output);
            }
            _ => {}
        }
    }
}
