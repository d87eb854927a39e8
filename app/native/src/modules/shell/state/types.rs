//! Core state types for the shell layer.
//!
//! These types form a relational structure:
//! - `Output` represents a logical rendering target (ID assigned on creation)
//! - `Surface` represents a client surface (ID assigned on creation)
//! - `ViewId` names anything that can sit in the layer stack
//!
//! Relations are always by ID, never by ownership:
//! - `Output.active` → `Surface.id`
//! - `SurfaceRole::*.output` → `Output.id`

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================================
// Identifiers
// ============================================================================

/// Identifier of a surface known to the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(pub u32);

/// Identifier of an output owned by the output manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutputId(pub u32);

/// Identifier of a display head reported by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HeadId(pub u32);

/// Identifier of a connected protocol client.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ClientId(pub u32);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "surface#{}", self.0) }
}

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "output#{}", self.0) }
}

impl fmt::Display for HeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "head#{}", self.0) }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "client#{}", self.0) }
}

// ============================================================================
// Geometry Types
// ============================================================================

/// A rectangle with position and size, in output pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Create a zero-sized rectangle at origin.
    #[must_use]
    pub const fn zero() -> Self { Self::new(0, 0, 0, 0) }

    /// Create a rectangle at origin with the given size.
    #[must_use]
    pub const fn sized(width: i32, height: i32) -> Self { Self::new(0, 0, width, height) }

    /// Check if this rectangle has positive dimensions.
    #[must_use]
    pub const fn is_valid(&self) -> bool { self.width > 0 && self.height > 0 }

    /// Width and height as a tuple.
    #[must_use]
    pub const fn size(&self) -> (i32, i32) { (self.width, self.height) }

    /// Check if both rectangles have the same width and height.
    #[must_use]
    pub const fn same_size(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Check if `other` lies entirely within this rectangle.
    #[must_use]
    pub const fn contains(&self, other: &Self) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.x + other.width <= self.x + self.width
            && other.y + other.height <= self.y + self.height
    }

    /// Translate this rectangle by an offset.
    #[must_use]
    pub const fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{},{}", self.width, self.height, self.x, self.y)
    }
}

/// A position in global compositor coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self { Self { x, y } }
}

// ============================================================================
// Protocol Enumerations
// ============================================================================

/// Output edge a panel is anchored to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelEdge {
    Top = 0,
    Bottom = 1,
    Left = 2,
    Right = 3,
}

impl PanelEdge {
    /// All edges in the order panels are laid out.
    pub const ALL: [Self; 4] = [Self::Top, Self::Bottom, Self::Left, Self::Right];

    /// Index into per-edge arrays.
    #[must_use]
    pub const fn index(self) -> usize { self as usize }

    /// Returns the edge name as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Whether the panel spans the output width.
    #[must_use]
    pub const fn is_horizontal(self) -> bool { matches!(self, Self::Top | Self::Bottom) }
}

impl TryFrom<u32> for PanelEdge {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Top),
            1 => Ok(Self::Bottom),
            2 => Ok(Self::Left),
            3 => Ok(Self::Right),
            other => Err(other),
        }
    }
}

/// Axis along which a split surface halves the usable area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitOrientation {
    /// Side by side; the split surface takes the right half.
    Vertical,
    /// Stacked; the split surface takes the top half.
    Horizontal,
}

/// Role requested through `set_app_property`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppRole {
    Popup = 0,
    Fullscreen = 1,
    SplitVertical = 2,
    SplitHorizontal = 3,
    Remote = 4,
}

impl TryFrom<u32> for AppRole {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Popup),
            1 => Ok(Self::Fullscreen),
            2 => Ok(Self::SplitVertical),
            3 => Ok(Self::SplitHorizontal),
            4 => Ok(Self::Remote),
            other => Err(other),
        }
    }
}

/// Application state broadcast to desktop clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppState {
    Started = 0,
    Terminated = 1,
    Activated = 2,
    Deactivated = 3,
    Destroyed = 4,
}

impl AppState {
    /// Returns the state name as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Terminated => "terminated",
            Self::Activated => "activated",
            Self::Deactivated => "deactivated",
            Self::Destroyed => "destroyed",
        }
    }
}

/// Which of the two shell globals a client binds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShellInterface {
    /// The privileged shell interface (background, panels, ready).
    Shell,
    /// The desktop interface (app properties, state broadcasts).
    Desktop,
}

impl ShellInterface {
    /// Protocol name of the interface.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Shell => "ivi_shell",
            Self::Desktop => "ivi_shell_desktop",
        }
    }
}

/// Kind of output, deciding how remote surfaces are handled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum OutputKind {
    #[default]
    Local,
    Remote,
    RemoteWithTransmitter,
}

impl OutputKind {
    /// Whether surfaces on this output are streamed elsewhere.
    #[must_use]
    pub const fn is_remote(self) -> bool { !matches!(self, Self::Local) }
}

// ============================================================================
// Layers
// ============================================================================

/// Painter's-algorithm layers, lowest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Hidden,
    Background,
    Normal,
    Panel,
    Popup,
    Fullscreen,
}

impl Layer {
    /// All layers from bottom to top.
    pub const ALL: [Self; 6] = [
        Self::Hidden,
        Self::Background,
        Self::Normal,
        Self::Panel,
        Self::Popup,
        Self::Fullscreen,
    ];

    /// Returns the layer name as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Background => "background",
            Self::Normal => "normal",
            Self::Panel => "panel",
            Self::Popup => "popup",
            Self::Fullscreen => "fullscreen",
        }
    }

    const fn index(self) -> usize { self as usize }
}

/// Anything that can be placed in the layer stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewId {
    /// The view of a client surface.
    Surface(SurfaceId),
    /// The black placeholder masking an empty output.
    Placeholder(OutputId),
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Surface(id) => write!(f, "view({id})"),
            Self::Placeholder(id) => write!(f, "placeholder({id})"),
        }
    }
}

/// Ordered view lists, one per layer. The first entry of a layer is on top.
#[derive(Clone, Debug, Default)]
pub struct LayerStack {
    layers: [Vec<ViewId>; 6],
}

impl LayerStack {
    /// Create an empty stack.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Put a view on top of a layer, unlinking it from wherever it was.
    pub fn insert(&mut self, layer: Layer, view: ViewId) {
        self.remove(view);
        self.layers[layer.index()].insert(0, view);
    }

    /// Unlink a view. Returns the layer it was in.
    pub fn remove(&mut self, view: ViewId) -> Option<Layer> {
        for layer in Layer::ALL {
            let list = &mut self.layers[layer.index()];
            if let Some(pos) = list.iter().position(|v| *v == view) {
                list.remove(pos);
                return Some(layer);
            }
        }
        None
    }

    /// Layer currently holding a view.
    #[must_use]
    pub fn layer_of(&self, view: ViewId) -> Option<Layer> {
        Layer::ALL.into_iter().find(|layer| self.layers[layer.index()].contains(&view))
    }

    /// Views of a single layer, top first.
    #[must_use]
    pub fn views(&self, layer: Layer) -> &[ViewId] { &self.layers[layer.index()] }

    /// Number of times a view is linked across all layers.
    #[must_use]
    pub fn link_count(&self, view: ViewId) -> usize {
        self.layers.iter().flatten().filter(|v| **v == view).count()
    }

    /// Views from the topmost layer down, in paint-reverse order.
    pub fn iter_top_down(&self) -> impl Iterator<Item = (Layer, ViewId)> + '_ {
        Layer::ALL
            .into_iter()
            .rev()
            .flat_map(move |layer| self.layers[layer.index()].iter().map(move |v| (layer, *v)))
    }
}

// ============================================================================
// Tests
// ============================================================================
