//! Static layout: background and panels.
//!
//! Runs once per output when the shell client signals ready, and again
//! whenever a panel disappears. Panels are accounted in a fixed edge order
//! (top, bottom, left, right) so the usable area is deterministic.

use crate::modules::shell::Shell;
use crate::modules::shell::state::{Layer, OutputId, PanelEdge};

impl Shell {
    /// Map the background, reset the usable area and lay out every panel.
    pub(crate) fn layout_init(&mut self, output: OutputId) {
        self.background_init(output);
        self.layout_panels(output);
        self.schedule_repaint(Some(output));

        if let Some(out) = self.outputs.get(output) {
            tracing::info!(output = %out.name, area = %out.area, "layout: usable area");
        }
    }

    /// Reset the usable area and carve every panel out of it.
    pub(crate) fn layout_panels(&mut self, output: OutputId) {
        if let Some(out) = self.outputs.get_mut(output) {
            out.reset_area();
        }
        for edge in PanelEdge::ALL {
            self.panel_init(output, edge);
        }
    }

    fn background_init(&mut self, output: OutputId) {
        let Some(out) = self.outputs.get(output) else {
            return;
        };
        let Some(background) = out.background else {
            tracing::warn!(output = %out.name, "layout: output does not have a background");
            return;
        };
        let geometry = out.geometry;

        self.view_set_output(background, output);
        self.view_set_position(background, geometry.x, geometry.y);
        self.view_map(background, Layer::Background);
        tracing::debug!(
            output = %output,
            surface = %background,
            x = geometry.x,
            y = geometry.y,
            "layout: background positioned"
        );
    }

    fn panel_init(&mut self, output: OutputId, edge: PanelEdge) {
        let Some(panel) = self.outputs.get(output).and_then(|o| o.panel(edge)) else {
            return;
        };
        let Some(geometry) = self.surfaces.get(panel).map(|s| s.geometry) else {
            return;
        };
        let Some(out) = self.outputs.get_mut(output) else {
            return;
        };

        let (x, y) = out.carve_panel(edge, geometry);
        self.view_set_output(panel, output);
        self.view_set_position(panel, x, y);
        self.view_map(panel, Layer::Panel);
        tracing::debug!(
            output = %output,
            edge = edge.as_str(),
            x,
            y,
            "layout: panel positioned"
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::modules::shell::state::{ClientId, Layer, PanelEdge, Rect, ViewId};
    use crate::modules::shell::testing::{bound_shell, commit, single_output};

    #[test]
    fn test_top_panel_then_background() {
        let mut shell = bound_shell();
        let output = single_output(&mut shell, 1920, 1080);

        let panel = shell.surface_added(ClientId(1), Some("panel".into())).unwrap();
        commit(&mut shell, panel, Rect::sized(1920, 48), false);
        shell.set_panel(panel, output, PanelEdge::Top as u32).unwrap();

        let bg = shell.surface_added(ClientId(1), Some("bg".into())).unwrap();
        commit(&mut shell, bg, Rect::sized(1920, 1080), true);
        shell.set_background(bg, output).unwrap();

        shell.ready().unwrap();

        let out = shell.output(output).unwrap();
        assert_eq!(out.area, Rect::new(0, 48, 1920, 1032));
        assert!(!out.placeholder_mapped);
        assert_eq!(shell.layers().layer_of(ViewId::Surface(bg)), Some(Layer::Background));
        assert_eq!(shell.layers().layer_of(ViewId::Surface(panel)), Some(Layer::Panel));
    }

    #[test]
    fn test_all_edges_accounted() {
        let mut shell = bound_shell();
        let output = single_output(&mut shell, 1920, 1080);

        let sizes = [
            (PanelEdge::Top, Rect::sized(1920, 40)),
            (PanelEdge::Bottom, Rect::sized(1920, 60)),
            (PanelEdge::Left, Rect::sized(100, 980)),
            (PanelEdge::Right, Rect::sized(120, 980)),
        ];
        for (edge, geometry) in sizes {
            let id = shell.surface_added(ClientId(1), None).unwrap();
            commit(&mut shell, id, geometry, false);
            shell.set_panel(id, output, edge as u32).unwrap();
        }
        shell.ready().unwrap();

        let out = shell.output(output).unwrap();
        assert_eq!(out.area, Rect::new(100, 40, 1700, 980));
        assert!(out.geometry.contains(&out.area));
    }

    #[test]
    fn test_no_background_keeps_placeholder() {
        let mut shell = bound_shell();
        let output = single_output(&mut shell, 800, 480);
        shell.ready().unwrap();

        let out = shell.output(output).unwrap();
        assert!(out.placeholder_mapped);
        assert_eq!(out.area, Rect::sized(800, 480));
    }
}
