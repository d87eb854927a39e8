//! Output state and usable-area arithmetic.

use serde::Serialize;
use smallvec::SmallVec;

use super::types::{HeadId, OutputId, OutputKind, PanelEdge, Rect, SurfaceId};
use crate::config::{OutputConfig, Transform};

/// Maximum number of heads queued for a single output.
pub const MAX_HEADS: usize = 8;

/// Head list sized for the per-output maximum.
pub type HeadList = SmallVec<[HeadId; MAX_HEADS]>;

/// A logical rendering target.
#[derive(Clone, Debug, Serialize)]
pub struct Output {
    /// Manager-assigned ID.
    pub id: OutputId,

    /// Output name (connector or configured name).
    pub name: String,

    /// Output kind.
    pub kind: OutputKind,

    /// Pixel geometry in global coordinates.
    pub geometry: Rect,

    /// Usable area relative to the output origin.
    pub area: Rect,

    /// Area before the current split surface took its half.
    pub area_saved: Rect,

    /// Whether the host has enabled this output.
    pub enabled: bool,

    /// Output scale.
    pub scale: i32,

    /// Output transform.
    pub transform: Transform,

    /// App-id whose surfaces are pinned to this output.
    pub app_id: Option<String>,

    /// Panels, indexed by [`PanelEdge::index`].
    pub panels: [Option<SurfaceId>; 4],

    /// Background surface.
    pub background: Option<SurfaceId>,

    /// Surface currently shown in the usable area.
    pub active: Option<SurfaceId>,

    /// Surface shown before `active`.
    pub previous_active: Option<SurfaceId>,

    /// Whether the black placeholder is currently mapped.
    pub placeholder_mapped: bool,

    /// Heads attached to the enabled output.
    pub heads: HeadList,

    /// Heads queued for attachment; after processing, only failures remain.
    pub pending_heads: HeadList,

    /// Configuration section controlling this output.
    #[serde(skip)]
    pub config: Option<OutputConfig>,
}

impl Output {
    /// Create a disabled output.
    #[must_use]
    pub fn new(id: OutputId, name: impl Into<String>, config: Option<OutputConfig>) -> Self {
        let (kind, scale, transform, app_id) = config.as_ref().map_or(
            (OutputKind::Local, 1, Transform::Normal, None),
            |c| (c.kind, c.scale, c.transform(), c.app_id.clone()),
        );

        Self {
            id,
            name: name.into(),
            kind,
            geometry: Rect::zero(),
            area: Rect::zero(),
            area_saved: Rect::zero(),
            enabled: false,
            scale,
            transform,
            app_id,
            panels: [None; 4],
            background: None,
            active: None,
            previous_active: None,
            placeholder_mapped: false,
            heads: HeadList::new(),
            pending_heads: HeadList::new(),
            config,
        }
    }

    /// Panel on the given edge.
    #[must_use]
    pub const fn panel(&self, edge: PanelEdge) -> Option<SurfaceId> { self.panels[edge.index()] }

    /// Set or clear the panel on an edge.
    pub const fn set_panel(&mut self, edge: PanelEdge, surface: Option<SurfaceId>) {
        self.panels[edge.index()] = surface;
    }

    /// Edge a panel surface sits on.
    #[must_use]
    pub fn edge_of(&self, surface: SurfaceId) -> Option<PanelEdge> {
        PanelEdge::ALL.into_iter().find(|edge| self.panel(*edge) == Some(surface))
    }

    /// Usable area translated to global coordinates.
    #[must_use]
    pub const fn global_area(&self) -> Rect { self.area.offset(self.geometry.x, self.geometry.y) }

    /// Reset the usable area to the whole output.
    pub const fn reset_area(&mut self) {
        self.area = Rect::sized(self.geometry.width, self.geometry.height);
    }

    /// Subtract a panel of the given natural size from the usable area and
    /// return the global position the panel must be placed at.
    ///
    /// `panel` is the client geometry; its `x`/`y` are the offset of the
    /// visible content within the buffer.
    pub const fn carve_panel(&mut self, edge: PanelEdge, panel: Rect) -> (i32, i32) {
        let mut x = self.geometry.x;
        let mut y = self.geometry.y;

        match edge {
            PanelEdge::Top => {
                self.area.y += panel.height;
                self.area.height -= panel.height;
            }
            PanelEdge::Bottom => {
                y += self.geometry.height - panel.height;
                self.area.height -= panel.height;
            }
            PanelEdge::Left => {
                self.area.x += panel.width;
                self.area.width -= panel.width;
            }
            PanelEdge::Right => {
                x += self.geometry.width - panel.width;
                self.area.width -= panel.width;
            }
        }

        (x - panel.x, y - panel.y)
    }

    /// Whether any surface still references the output as active.
    #[must_use]
    pub const fn has_active(&self) -> bool { self.active.is_some() }

    /// Forget every reference to a surface.
    ///
    /// Returns the panel edge the surface occupied, if any.
    pub fn forget_surface(&mut self, surface: SurfaceId) -> Option<PanelEdge> {
        if self.active == Some(surface) {
            self.active = None;
        }
        if self.previous_active == Some(surface) {
            self.previous_active = None;
        }
        if self.background == Some(surface) {
            self.background = None;
        }
        let edge = self.edge_of(surface);
        if let Some(edge) = edge {
            self.set_panel(edge, None);
        }
        edge
    }
}
