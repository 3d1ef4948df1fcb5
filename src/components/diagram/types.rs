//! Diagram descriptors: the declarative input for every interactive diagram.
//!
//! A descriptor carries everything the engine needs to build one diagram
//! instance. Per-diagram code only constructs descriptors; layout, drag,
//! particles and rendering are shared.

use serde::Deserialize;

/// A node in a diagram.
#[derive(Clone, Debug, Deserialize)]
pub struct NodeSpec {
	/// Identifier, unique within its diagram. Links refer to nodes by this id.
	pub id: String,
	/// Display label drawn inside the node.
	pub label: String,
	/// Optional second line drawn under the label.
	#[serde(default)]
	pub sublabel: Option<String>,
	/// Category name. Drives color and tooltip grouping.
	#[serde(default)]
	pub category: String,
	/// Index into [`DiagramDescriptor::layers`]. Layered nodes are attracted
	/// toward their layer's row and seeded there.
	#[serde(default)]
	pub layer: Option<usize>,
	/// Horizontal placement hint in `0.0..=1.0` of the surface width.
	#[serde(default)]
	pub column: Option<f64>,
	/// Radius override in pixels.
	#[serde(default)]
	pub radius: Option<f64>,
}

/// A directed edge between two nodes of the same diagram.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LinkSpec {
	pub source: String,
	pub target: String,
	#[serde(default)]
	pub label: Option<String>,
	/// Ordering hint rendered as a step badge ("step 3").
	#[serde(default)]
	pub sequence: Option<u32>,
	/// Feedback or asynchronous edge.
	#[serde(default)]
	pub dashed: bool,
	/// Long-range or self-referential edge drawn as a curve.
	#[serde(default)]
	pub curved: bool,
}

/// Per-diagram overrides of the global simulation constants.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
	pub link_distance: Option<f64>,
	pub link_strength: Option<f64>,
	pub repulsion: Option<f64>,
	pub collision_padding: Option<f64>,
}

/// Height of the render surface.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceHeight {
	/// Fixed height in pixels.
	Fixed(f64),
	/// Fraction of the window's inner height.
	Viewport(f64),
}

impl Default for SurfaceHeight {
	fn default() -> Self {
		SurfaceHeight::Fixed(420.0)
	}
}

/// Smallest surface height ever produced.
pub const MIN_SURFACE_HEIGHT: f64 = 240.0;

impl SurfaceHeight {
	/// Resolve to pixels for the given window height.
	pub fn resolve(self, viewport_height: f64) -> f64 {
		let h = match self {
			SurfaceHeight::Fixed(px) => px,
			SurfaceHeight::Viewport(frac) => viewport_height * frac,
		};
		h.max(MIN_SURFACE_HEIGHT)
	}
}

/// Rendering options that do not affect layout.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RenderHints {
	pub height: SurfaceHeight,
	/// Run the particle animation on this diagram.
	pub particles: bool,
	/// Also send particles along dashed (feedback) links.
	pub animate_dashed: bool,
	/// Draw link labels next to the link midpoint.
	pub link_labels: bool,
}

impl Default for RenderHints {
	fn default() -> Self {
		Self {
			height: SurfaceHeight::default(),
			particles: true,
			animate_dashed: false,
			link_labels: true,
		}
	}
}

/// Complete description of one diagram, bound to a container element id.
#[derive(Clone, Debug, Deserialize)]
pub struct DiagramDescriptor {
	/// Id of the container element the diagram renders into.
	pub id: String,
	#[serde(default)]
	pub title: Option<String>,
	pub nodes: Vec<NodeSpec>,
	#[serde(default)]
	pub links: Vec<LinkSpec>,
	/// Ordered layer names, top to bottom.
	#[serde(default)]
	pub layers: Vec<String>,
	#[serde(default)]
	pub layout: LayoutParams,
	#[serde(default)]
	pub hints: RenderHints,
}

impl DiagramDescriptor {
	pub fn is_layered(&self) -> bool {
		!self.layers.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn viewport_height_is_clamped_to_minimum() {
		assert_eq!(SurfaceHeight::Viewport(0.1).resolve(800.0), MIN_SURFACE_HEIGHT);
		assert_eq!(SurfaceHeight::Viewport(0.5).resolve(1000.0), 500.0);
		assert_eq!(SurfaceHeight::Fixed(380.0).resolve(10.0), 380.0);
	}

	#[test]
	fn descriptor_parses_with_defaults() {
		let json = r#"{
			"id": "pipeline",
			"nodes": [
				{ "id": "a", "label": "Ingest", "layer": 0 },
				{ "id": "b", "label": "Store", "sublabel": "append-only", "category": "storage" }
			],
			"links": [{ "source": "a", "target": "b", "sequence": 1 }],
			"layers": ["edge"],
			"hints": { "height": { "viewport": 0.6 }, "animate_dashed": true }
		}"#;
		let d: DiagramDescriptor = serde_json::from_str(json).unwrap();
		assert_eq!(d.nodes.len(), 2);
		assert_eq!(d.nodes[1].sublabel.as_deref(), Some("append-only"));
		assert_eq!(d.links[0].sequence, Some(1));
		assert!(!d.links[0].dashed);
		assert!(d.is_layered());
		assert_eq!(d.hints.height, SurfaceHeight::Viewport(0.6));
		assert!(d.hints.particles);
		assert!(d.hints.animate_dashed);
	}
}
