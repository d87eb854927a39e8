//! Shell state: identifiers, geometry, surfaces, outputs and the registry.

pub mod output;
pub mod registry;
pub mod role;
pub mod surface;
pub mod types;

pub use output::{HeadList, MAX_HEADS, Output};
pub use registry::SurfaceRegistry;
pub use role::{RoleKind, SurfaceRole};
pub use surface::{Surface, ViewState};
pub use types::{
    AppRole, AppState, ClientId, HeadId, Layer, LayerStack, OutputId, OutputKind, PanelEdge,
    Point, Rect, ShellInterface, SplitOrientation, SurfaceId, ViewId,
};
