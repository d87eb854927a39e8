//! View and placeholder primitives.
//!
//! Every helper here updates the shell's mirror of the view state (surface
//! view fields, layer stack, placeholder flags) and records the matching
//! [`ShellEffect`]s for the host.

use crate::modules::shell::Shell;
use crate::modules::shell::effects::ShellEffect;
use crate::modules::shell::state::{Layer, OutputId, Rect, SurfaceId, ViewId};

impl Shell {
    /// Assign a surface's view to an output.
    pub(crate) fn view_set_output(&mut self, id: SurfaceId, output: OutputId) {
        if let Some(surface) = self.surfaces.get_mut(id) {
            surface.view.output = Some(output);
        }
        self.emit(ShellEffect::SetViewOutput { view: ViewId::Surface(id), output });
    }

    /// Move a surface's view to a global position.
    pub(crate) fn view_set_position(&mut self, id: SurfaceId, x: i32, y: i32) {
        if let Some(surface) = self.surfaces.get_mut(id) {
            surface.view.position.x = x;
            surface.view.position.y = y;
        }
        self.emit(ShellEffect::SetViewPosition { view: ViewId::Surface(id), x, y });
    }

    /// Clip a surface's view.
    pub(crate) fn view_set_mask(&mut self, id: SurfaceId, mask: Rect) {
        if let Some(surface) = self.surfaces.get_mut(id) {
            surface.view.mask = Some(mask);
        }
        self.emit(ShellEffect::SetViewMask {
            view: ViewId::Surface(id),
            x: mask.x,
            y: mask.y,
            width: mask.width,
            height: mask.height,
        });
    }

    /// Mark a surface's view mapped and put it on top of `layer`.
    pub(crate) fn view_map(&mut self, id: SurfaceId, layer: Layer) {
        let view = ViewId::Surface(id);
        if self.layers.layer_of(view).is_some() {
            self.emit(ShellEffect::RemoveFromLayer { view });
        }
        self.layers.insert(layer, view);

        if let Some(surface) = self.surfaces.get_mut(id) {
            surface.view.mapped = true;
            surface.view.layer = Some(layer);
        }
        self.emit(ShellEffect::MapView { view, mapped: true });
        self.emit(ShellEffect::InsertIntoLayer { layer, view });
    }

    /// Unlink a surface's view from its layer and mark it unmapped.
    pub(crate) fn view_unmap(&mut self, id: SurfaceId) {
        let view = ViewId::Surface(id);
        if self.layers.remove(view).is_some() {
            self.emit(ShellEffect::RemoveFromLayer { view });
        }

        let was_mapped = self.surfaces.get_mut(id).is_some_and(|surface| {
            let was_mapped = surface.view.mapped;
            surface.view.mapped = false;
            surface.view.layer = None;
            was_mapped
        });
        if was_mapped {
            self.emit(ShellEffect::MapView { view, mapped: false });
        }
    }

    /// Whether a surface's view is mapped.
    #[must_use]
    pub(crate) fn view_is_mapped(&self, id: SurfaceId) -> bool {
        self.surfaces.get(id).is_some_and(|s| s.view.mapped)
    }

    /// Ask the client to maximize to the given size.
    pub(crate) fn configure_maximized(&mut self, id: SurfaceId, width: i32, height: i32) {
        self.emit(ShellEffect::SetMaximized { surface: id, maximized: true });
        self.emit(ShellEffect::SetSize { surface: id, width, height });
    }

    /// Request a repaint of one output, or of everything.
    pub(crate) fn schedule_repaint(&mut self, output: Option<OutputId>) {
        self.emit(ShellEffect::ScheduleRepaint { output });
    }

    // ========================================================================
    // Placeholder
    // ========================================================================

    /// Show the black placeholder of an output.
    pub(crate) fn placeholder_insert(&mut self, output: OutputId) {
        let Some(out) = self.outputs.get_mut(output) else {
            return;
        };
        if out.placeholder_mapped {
            return;
        }
        out.placeholder_mapped = true;
        let geometry = out.geometry;

        let view = ViewId::Placeholder(output);
        self.layers.insert(Layer::Fullscreen, view);
        self.emit(ShellEffect::SetViewPosition { view, x: geometry.x, y: geometry.y });
        self.emit(ShellEffect::MapView { view, mapped: true });
        self.emit(ShellEffect::InsertIntoLayer { layer: Layer::Fullscreen, view });
        tracing::trace!(output = %output, "layout: placeholder inserted");
    }

    /// Hide the black placeholder of an output.
    pub(crate) fn placeholder_remove(&mut self, output: OutputId) {
        let Some(out) = self.outputs.get_mut(output) else {
            return;
        };
        if !out.placeholder_mapped {
            return;
        }
        out.placeholder_mapped = false;

        let view = ViewId::Placeholder(output);
        self.layers.remove(view);
        self.emit(ShellEffect::MapView { view, mapped: false });
        self.emit(ShellEffect::RemoveFromLayer { view });
        tracing::trace!(output = %output, "layout: placeholder removed");
    }
}
