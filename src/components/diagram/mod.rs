//! Interactive force-directed diagrams rendered on an HTML canvas.
//!
//! A [`DiagramDescriptor`] names a container element and describes the
//! nodes and links to draw in it. [`mount`] turns it into a live diagram:
//! - Layered or free force-directed layout that settles and stops
//! - Node dragging with pinning and reheat
//! - Hover highlighting with a shared tooltip
//! - Particles flowing along links in staggered cycles
//!
//! # Example
//!
//! ```ignore
//! use diagram_engine::components::diagram::{DiagramDescriptor, Theme, mount};
//!
//! let descriptor: DiagramDescriptor = serde_json::from_str(json)?;
//! let handle = mount(&descriptor, &EngineConfig::default(), &Rc::new(Theme::default()))?;
//! ```

pub mod drag;
pub mod flow;
pub mod geometry;
mod render;
pub mod simulation;
mod state;
mod surface;
pub mod theme;
mod tooltip;
mod types;
mod view_state;

pub use state::{DiagramState, LinkInfo, NodeInfo, PointerTarget};
pub use surface::{AnimationTask, DiagramHandle, MountError, mount};
pub use theme::Theme;
pub use tooltip::TooltipContent;
pub use view_state::ViewState;
pub use types::{DiagramDescriptor, LayoutParams, LinkSpec, NodeSpec, RenderHints, SurfaceHeight};
