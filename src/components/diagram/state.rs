//! Diagram instance state.
//!
//! Combines the layout simulation with per-node display metadata, the drag
//! controller, hover view state and the particle animator. Built once from a
//! [`DiagramDescriptor`] and then mutated by pointer input and the frame loop.

use std::collections::HashMap;
use std::f64::consts::PI;

use log::warn;

use crate::config::EngineConfig;

use super::drag::DragController;
use super::flow::FlowAnimator;
use super::geometry::{Endpoint, LinkPath};
use super::simulation::Simulation;
use super::theme::{Color, Theme};
use super::tooltip::TooltipContent;
use super::types::DiagramDescriptor;
use super::view_state::ViewState;

/// Display metadata for one node.
#[derive(Clone, Debug)]
pub struct NodeInfo {
	pub id: String,
	pub label: String,
	pub sublabel: Option<String>,
	pub category: String,
	pub color: Color,
}

/// Display metadata for one link.
#[derive(Clone, Debug)]
pub struct LinkInfo {
	pub label: Option<String>,
	pub sequence: Option<u32>,
	pub dashed: bool,
	pub curved: bool,
}

/// Whatever the pointer is over.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerTarget {
	Node(usize),
	Background,
}

pub struct DiagramState {
	pub id: String,
	pub sim: Simulation,
	pub nodes: Vec<NodeInfo>,
	pub links: Vec<LinkInfo>,
	pub drag: DragController,
	pub view: ViewState,
	pub flow: Option<FlowAnimator>,
	pub width: f64,
	pub height: f64,
	pub show_link_labels: bool,
	pub particle_radius: f64,
	/// Resolved `(source, target)` pairs, for neighbour lookups.
	edges: Vec<(usize, usize)>,
	dangling: usize,
}

impl DiagramState {
	pub fn new(
		descriptor: &DiagramDescriptor,
		config: &EngineConfig,
		theme: &Theme,
		width: f64,
		height: f64,
	) -> Self {
		let mut sim = Simulation::new(&config.simulation, &descriptor.layout, width, height);
		let mut nodes = Vec::with_capacity(descriptor.nodes.len());
		let mut id_to_idx = HashMap::new();
		let mut seen_categories = Vec::new();
		let layer_count = descriptor.layers.len();
		let count = descriptor.nodes.len().max(1) as f64;
		let ring = width.min(height) * 0.3;

		for (i, node) in descriptor.nodes.iter().enumerate() {
			let target_y = node
				.layer
				.filter(|&l| l < layer_count)
				.map(|l| (l as f64 + 0.5) * height / layer_count as f64);
			let target_x = node.column.map(|c| c.clamp(0.0, 1.0) * width);

			// Layered nodes start on their row so the layout converges near the
			// intended arrangement; the rest start on a circle.
			let angle = i as f64 * 2.0 * PI / count;
			let (x, y) = match (target_x, target_y) {
				(Some(x), Some(y)) => (x, y),
				(None, Some(y)) => (width * (i as f64 + 0.5) / count, y),
				(Some(x), None) => (x, height / 2.0 + ring * angle.sin()),
				(None, None) => (width / 2.0 + ring * angle.cos(), height / 2.0 + ring * angle.sin()),
			};

			let idx = sim.add_node(x, y, node.radius.unwrap_or(theme.node.radius));
			if target_x.is_some() || target_y.is_some() {
				sim.set_target(idx, target_x, target_y);
			}
			if id_to_idx.insert(node.id.clone(), idx).is_some() {
				warn!("diagram-engine: duplicate node id {:?} in {}", node.id, descriptor.id);
			}
			nodes.push(NodeInfo {
				id: node.id.clone(),
				label: node.label.clone(),
				sublabel: node.sublabel.clone(),
				category: node.category.clone(),
				color: theme.category_color(&node.category, &mut seen_categories),
			});
		}

		let mut links = Vec::with_capacity(descriptor.links.len());
		let mut edges = Vec::new();
		let mut dangling = 0;
		let mut eligible = Vec::new();
		for (i, link) in descriptor.links.iter().enumerate() {
			let source = id_to_idx.get(&link.source).copied();
			let target = id_to_idx.get(&link.target).copied();
			match (source, target) {
				(Some(s), Some(t)) => edges.push((s, t)),
				_ => {
					dangling += 1;
					warn!(
						"diagram-engine: link {} -> {} in {} references an unknown node",
						link.source, link.target, descriptor.id
					);
				}
			}
			sim.add_link(source, target);
			if !link.dashed || descriptor.hints.animate_dashed {
				eligible.push(i);
			}
			links.push(LinkInfo {
				label: link.label.clone(),
				sequence: link.sequence,
				dashed: link.dashed,
				curved: link.curved,
			});
		}

		let flow = descriptor
			.hints
			.particles
			.then(|| FlowAnimator::new(&config.particles, eligible));

		Self {
			id: descriptor.id.clone(),
			sim,
			nodes,
			links,
			drag: DragController::default(),
			view: ViewState::default(),
			flow,
			width,
			height,
			show_link_labels: descriptor.hints.link_labels,
			particle_radius: config.particles.radius,
			edges,
			dangling,
		}
	}

	/// Number of links with at least one unresolved endpoint.
	pub fn dangling_links(&self) -> usize {
		self.dangling
	}

	pub fn degree(&self, idx: usize) -> usize {
		self.edges
			.iter()
			.filter(|&&(s, t)| s == idx || t == idx)
			.count()
	}

	/// Topmost node under `(x, y)`.
	pub fn node_at(&self, x: f64, y: f64) -> Option<usize> {
		self.sim
			.nodes()
			.iter()
			.enumerate()
			.rev()
			.find(|(_, n)| (n.x - x).powi(2) + (n.y - y).powi(2) <= n.radius.powi(2))
			.map(|(i, _)| i)
	}

	pub fn hit_test(&self, x: f64, y: f64) -> PointerTarget {
		self.node_at(x, y)
			.map_or(PointerTarget::Background, PointerTarget::Node)
	}

	/// Current path of link `idx`, or `None` if it cannot be drawn.
	pub fn link_path(&self, idx: usize) -> Option<LinkPath> {
		let (s, t) = self.sim.links().get(idx)?.endpoints()?;
		let nodes = self.sim.nodes();
		let ep = |i: usize| Endpoint {
			x: nodes[i].x,
			y: nodes[i].y,
			radius: nodes[i].radius,
		};
		let curved = self.links.get(idx).is_some_and(|l| l.curved);
		LinkPath::between(ep(s), ep(t), curved, s == t)
	}

	/// Positions of particles currently travelling, with their link index.
	pub fn particle_positions(&self, now_ms: f64) -> Vec<(usize, f64, f64)> {
		let Some(flow) = &self.flow else {
			return Vec::new();
		};
		flow.in_flight(now_ms)
			.filter_map(|(link, t)| {
				let (x, y) = self.link_path(link)?.point_at(t);
				Some((link, x, y))
			})
			.collect()
	}

	pub fn pointer_down(&mut self, x: f64, y: f64) -> PointerTarget {
		let target = self.hit_test(x, y);
		if let PointerTarget::Node(idx) = target {
			self.view.set_hover(None, &self.edges);
			self.drag.pointer_down(&mut self.sim, idx, x, y);
		}
		target
	}

	/// Pointer movement. While dragging the pinned node follows; otherwise
	/// hover is updated. Returns whether anything visible changed.
	pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
		if self.drag.pointer_move(&mut self.sim, x, y) {
			return true;
		}
		let hovered = self.node_at(x, y);
		self.view.set_hover(hovered, &self.edges)
	}

	pub fn pointer_up(&mut self) -> Option<usize> {
		self.drag.pointer_up(&mut self.sim)
	}

	/// Pointer left the surface: end any drag and clear hover.
	pub fn pointer_leave(&mut self) {
		self.drag.pointer_up(&mut self.sim);
		self.view.set_hover(None, &self.edges);
	}

	pub fn tooltip(&self) -> Option<TooltipContent> {
		let idx = self.view.hovered()?;
		let node = self.nodes.get(idx)?;
		Some(TooltipContent::for_node(
			&node.label,
			node.sublabel.as_deref(),
			&node.category,
			self.degree(idx),
		))
	}

	/// One frame: advance layout, hover easing and particles.
	/// Returns whether another frame is needed.
	pub fn tick(&mut self, dt: f64, now_ms: f64) -> bool {
		let simulating = self.sim.tick();
		self.view.tick(dt);
		let flowing = match &mut self.flow {
			Some(flow) => {
				flow.advance(now_ms);
				!flow.is_idle()
			}
			None => false,
		};
		simulating || flowing || self.view.is_animating() || self.drag.is_dragging()
	}

	/// Start a particle cycle. Returns how many particles were launched.
	pub fn start_flow_cycle(&mut self, now_ms: f64) -> usize {
		self.flow.as_mut().map_or(0, |f| f.start_cycle(now_ms))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::diagram::types::{LinkSpec, NodeSpec, RenderHints};

	fn node(id: &str, layer: Option<usize>, column: Option<f64>) -> NodeSpec {
		NodeSpec {
			id: id.into(),
			label: id.to_uppercase(),
			sublabel: None,
			category: "service".into(),
			layer,
			column,
			radius: None,
		}
	}

	fn link(source: &str, target: &str, dashed: bool) -> LinkSpec {
		LinkSpec {
			source: source.into(),
			target: target.into(),
			dashed,
			..Default::default()
		}
	}

	fn descriptor(nodes: Vec<NodeSpec>, links: Vec<LinkSpec>, layers: &[&str]) -> DiagramDescriptor {
		DiagramDescriptor {
			id: "test".into(),
			title: None,
			nodes,
			links,
			layers: layers.iter().map(|s| s.to_string()).collect(),
			layout: Default::default(),
			hints: RenderHints::default(),
		}
	}

	fn build(d: &DiagramDescriptor) -> DiagramState {
		DiagramState::new(d, &EngineConfig::default(), &Theme::default(), 800.0, 400.0)
	}

	#[test]
	fn layered_nodes_seed_at_layer_coordinates() {
		let d = descriptor(
			vec![node("a", Some(0), Some(0.25)), node("b", Some(1), Some(0.75))],
			vec![link("a", "b", false)],
			&["top", "bottom"],
		);
		let state = build(&d);
		assert_eq!(state.sim.position(0), Some((200.0, 100.0)));
		assert_eq!(state.sim.position(1), Some((600.0, 300.0)));
	}

	#[test]
	fn dangling_link_only_loses_its_own_geometry() {
		let d = descriptor(
			vec![node("a", None, None), node("b", None, None)],
			vec![link("a", "ghost", false), link("a", "b", false)],
			&[],
		);
		let mut state = build(&d);
		assert_eq!(state.dangling_links(), 1);
		assert!(state.link_path(0).is_none());
		while state.sim.tick() {}
		assert!(state.link_path(1).is_some());

		// Both links still get a particle; the dangling one is just not drawn.
		assert_eq!(state.start_flow_cycle(0.0), 2);
		let drawn = state.particle_positions(200.0);
		assert_eq!(drawn.len(), 1);
		assert_eq!(drawn[0].0, 1);
	}

	#[test]
	fn dashed_links_skip_particles_unless_enabled() {
		let nodes = vec![node("a", None, None), node("b", None, None), node("c", None, None)];
		let links = vec![link("a", "b", false), link("b", "c", false), link("c", "a", true)];
		let mut d = descriptor(nodes, links, &[]);
		let mut state = build(&d);
		assert_eq!(state.start_flow_cycle(0.0), 2);

		d.hints.animate_dashed = true;
		let mut state = build(&d);
		assert_eq!(state.start_flow_cycle(0.0), 3);

		d.hints.particles = false;
		let mut state = build(&d);
		assert!(state.flow.is_none());
		assert_eq!(state.start_flow_cycle(0.0), 0);
	}

	#[test]
	fn drag_scenario_releases_node_to_forces() {
		let d = descriptor(
			vec![node("x", None, None), node("y", None, None), node("z", None, None)],
			vec![link("x", "y", false), link("y", "z", false)],
			&[],
		);
		let mut state = build(&d);
		while state.sim.tick() {}

		// Put X at (10, 10) and grab it there.
		state.sim.pin(0, 10.0, 10.0);
		state.sim.unpin(0);
		assert_eq!(state.pointer_down(10.0, 10.0), PointerTarget::Node(0));
		for step in 1..=4 {
			let p = 10.0 + step as f64 * 10.0;
			assert!(state.pointer_move(p, p));
			state.tick(0.016, 0.0);
			assert_eq!(state.sim.pinned_count(), 1);
		}
		assert_eq!(state.sim.position(0), Some((50.0, 50.0)));

		assert_eq!(state.pointer_up(), Some(0));
		assert_eq!(state.sim.pinned_count(), 0);
		assert!(state.tick(0.016, 0.0));
		assert!(state.tick(0.016, 0.0));
		assert_ne!(state.sim.position(0), Some((50.0, 50.0)));
	}

	#[test]
	fn hover_drives_tooltip() {
		let d = descriptor(
			vec![node("a", None, None), node("b", None, None)],
			vec![link("a", "b", false)],
			&[],
		);
		let mut state = build(&d);
		let (x, y) = state.sim.position(1).unwrap();
		assert!(state.pointer_move(x, y));
		let tip = state.tooltip().unwrap();
		assert_eq!(tip.title, "B");
		assert_eq!(tip.lines.last().map(String::as_str), Some("1 connection"));

		state.pointer_leave();
		assert!(state.tooltip().is_none());
	}

	#[test]
	fn background_press_does_not_pin() {
		let d = descriptor(vec![node("a", None, None)], vec![], &[]);
		let mut state = build(&d);
		assert_eq!(state.pointer_down(1.0, 1.0), PointerTarget::Background);
		assert_eq!(state.sim.pinned_count(), 0);
	}
}
