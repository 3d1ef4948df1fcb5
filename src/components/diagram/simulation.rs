//! Force-directed layout with decaying energy.
//!
//! Forces follow the usual d3 model and compose additively on node
//! velocities every tick:
//! - link: spring toward a target separation, split by endpoint degree
//! - many-body: pairwise repulsion with a distance cut-off
//! - layer: soft pull toward a node's row/column target, if it has one
//! - center: weak pull of unlayered nodes toward the surface center
//! - collide: minimum-distance constraint from node radii
//!
//! All displacement except collision is scaled by `alpha`, which is
//! multiplied by a fixed decay factor per tick. Once it drops below
//! `alpha_min` ticks become no-ops until something reheats the simulation.

use crate::config::SimulationConfig;

use super::types::LayoutParams;

/// Physics state of one node.
#[derive(Clone, Debug, Default)]
pub struct SimNode {
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	/// Pinned position. A pinned node ignores forces entirely.
	pub fx: Option<f64>,
	pub fy: Option<f64>,
	pub radius: f64,
	pub target_x: Option<f64>,
	pub target_y: Option<f64>,
}

impl SimNode {
	pub fn is_pinned(&self) -> bool {
		self.fx.is_some() || self.fy.is_some()
	}

	fn has_target(&self) -> bool {
		self.target_x.is_some() || self.target_y.is_some()
	}
}

/// A resolved link. Endpoints that failed to resolve are `None` and the
/// link is ignored by every force.
#[derive(Clone, Copy, Debug)]
pub struct SimLink {
	pub source: Option<usize>,
	pub target: Option<usize>,
}

impl SimLink {
	pub fn endpoints(&self) -> Option<(usize, usize)> {
		Some((self.source?, self.target?))
	}
}

/// Effective force coefficients after per-diagram overrides.
#[derive(Clone, Debug)]
pub struct ForceParams {
	pub link_distance: f64,
	pub link_strength: f64,
	pub repulsion: f64,
	pub repulsion_max_distance: f64,
	pub collision_padding: f64,
	pub collision_strength: f64,
	pub layer_strength: f64,
	pub center_strength: f64,
	pub velocity_decay: f64,
}

impl ForceParams {
	pub fn new(config: &SimulationConfig, layout: &LayoutParams) -> Self {
		Self {
			link_distance: layout.link_distance.unwrap_or(config.link_distance),
			link_strength: layout.link_strength.unwrap_or(config.link_strength),
			repulsion: layout.repulsion.unwrap_or(config.repulsion),
			repulsion_max_distance: config.repulsion_max_distance,
			collision_padding: layout.collision_padding.unwrap_or(config.collision_padding),
			collision_strength: config.collision_strength,
			layer_strength: config.layer_strength,
			center_strength: config.center_strength,
			velocity_decay: config.velocity_decay,
		}
	}
}

/// The layout engine for a single diagram.
pub struct Simulation {
	nodes: Vec<SimNode>,
	links: Vec<SimLink>,
	degree: Vec<usize>,
	params: ForceParams,
	alpha: f64,
	alpha_min: f64,
	alpha_decay: f64,
	alpha_target: f64,
	reheat: f64,
	width: f64,
	height: f64,
	rng: u32,
}

/// Lowest stop threshold accepted from config. Alpha never reaches zero by
/// repeated multiplication, so a zero threshold would never stop ticking.
const MIN_ALPHA: f64 = 1e-6;

impl Simulation {
	pub fn new(config: &SimulationConfig, layout: &LayoutParams, width: f64, height: f64) -> Self {
		let alpha_min = config.alpha_min.max(MIN_ALPHA);
		Self {
			nodes: Vec::new(),
			links: Vec::new(),
			degree: Vec::new(),
			params: ForceParams::new(config, layout),
			alpha: config.alpha_start,
			alpha_min,
			alpha_decay: config.alpha_decay.clamp(0.0, 0.9999),
			alpha_target: 0.0,
			// Strictly above the stop threshold, so a pin always keeps ticking.
			reheat: config.reheat.max(alpha_min * 2.0),
			width,
			height,
			rng: 12345,
		}
	}

	pub fn add_node(&mut self, x: f64, y: f64, radius: f64) -> usize {
		self.nodes.push(SimNode {
			x,
			y,
			radius,
			..Default::default()
		});
		self.degree.push(0);
		self.nodes.len() - 1
	}

	/// Attach a soft positional target (layer row and/or column).
	pub fn set_target(&mut self, idx: usize, x: Option<f64>, y: Option<f64>) {
		if let Some(node) = self.nodes.get_mut(idx) {
			node.target_x = x;
			node.target_y = y;
		}
	}

	/// Add a link. Out-of-range endpoints are treated as unresolved.
	pub fn add_link(&mut self, source: Option<usize>, target: Option<usize>) -> usize {
		let n = self.nodes.len();
		let link = SimLink {
			source: source.filter(|&s| s < n),
			target: target.filter(|&t| t < n),
		};
		if let Some((s, t)) = link.endpoints() {
			self.degree[s] += 1;
			self.degree[t] += 1;
		}
		self.links.push(link);
		self.links.len() - 1
	}

	pub fn nodes(&self) -> &[SimNode] {
		&self.nodes
	}

	pub fn links(&self) -> &[SimLink] {
		&self.links
	}

	pub fn position(&self, idx: usize) -> Option<(f64, f64)> {
		self.nodes.get(idx).map(|n| (n.x, n.y))
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	/// Whether a call to [`tick`](Self::tick) would do any work.
	pub fn is_active(&self) -> bool {
		self.alpha >= self.alpha_min
	}

	pub fn pinned_count(&self) -> usize {
		self.nodes.iter().filter(|n| n.is_pinned()).count()
	}

	/// Raise alpha to at least the reheat value. Positions are kept.
	pub fn reheat(&mut self) {
		self.alpha = self.alpha.max(self.reheat);
	}

	/// Pin a node at `(x, y)` and keep the simulation warm while pinned.
	pub fn pin(&mut self, idx: usize, x: f64, y: f64) {
		let Some(node) = self.nodes.get_mut(idx) else {
			return;
		};
		node.fx = Some(x);
		node.fy = Some(y);
		node.x = x;
		node.y = y;
		node.vx = 0.0;
		node.vy = 0.0;
		self.alpha_target = self.reheat;
		self.reheat();
	}

	/// Move an already pinned node.
	pub fn move_pin(&mut self, idx: usize, x: f64, y: f64) {
		let Some(node) = self.nodes.get_mut(idx) else {
			return;
		};
		if node.is_pinned() {
			node.fx = Some(x);
			node.fy = Some(y);
			node.x = x;
			node.y = y;
		}
	}

	/// Release a pin. Alpha then decays normally from wherever it is.
	pub fn unpin(&mut self, idx: usize) {
		if let Some(node) = self.nodes.get_mut(idx) {
			node.fx = None;
			node.fy = None;
		}
		if self.pinned_count() == 0 {
			self.alpha_target = 0.0;
		}
	}

	/// Advance one tick. Returns `false` without touching any node once
	/// the simulation has cooled below `alpha_min`.
	pub fn tick(&mut self) -> bool {
		if !self.is_active() {
			return false;
		}
		self.alpha = (self.alpha * self.alpha_decay).max(self.alpha_target);
		let alpha = self.alpha;

		self.apply_links(alpha);
		self.apply_many_body(alpha);
		self.apply_targets(alpha);
		self.apply_collisions();
		self.integrate();
		true
	}

	fn jiggle(&mut self) -> f64 {
		self.rng = self.rng.wrapping_mul(1103515245).wrapping_add(12345);
		((self.rng & 0xFFFF) as f64 / 65536.0 - 0.5) * 1e-6
	}

	fn apply_links(&mut self, alpha: f64) {
		let (distance, strength) = (self.params.link_distance, self.params.link_strength);
		for i in 0..self.links.len() {
			let Some((s, t)) = self.links[i].endpoints() else {
				continue;
			};
			if s == t {
				continue;
			}
			let mut dx = (self.nodes[t].x + self.nodes[t].vx) - (self.nodes[s].x + self.nodes[s].vx);
			let mut dy = (self.nodes[t].y + self.nodes[t].vy) - (self.nodes[s].y + self.nodes[s].vy);
			if dx == 0.0 && dy == 0.0 {
				dx = self.jiggle();
				dy = self.jiggle();
			}
			let dist = (dx * dx + dy * dy).sqrt();
			let f = (dist - distance) / dist * alpha * strength;
			let (fx, fy) = (dx * f, dy * f);

			// Lower-degree endpoints move more.
			let bias = self.degree[s] as f64 / (self.degree[s] + self.degree[t]) as f64;
			self.nodes[t].vx -= fx * bias;
			self.nodes[t].vy -= fy * bias;
			self.nodes[s].vx += fx * (1.0 - bias);
			self.nodes[s].vy += fy * (1.0 - bias);
		}
	}

	fn apply_many_body(&mut self, alpha: f64) {
		let strength = self.params.repulsion * alpha;
		if strength == 0.0 {
			return;
		}
		let max_sq = self.params.repulsion_max_distance.powi(2);
		let n = self.nodes.len();
		for i in 0..n {
			for j in (i + 1)..n {
				let mut dx = self.nodes[j].x - self.nodes[i].x;
				let mut dy = self.nodes[j].y - self.nodes[i].y;
				if dx == 0.0 && dy == 0.0 {
					dx = self.jiggle();
					dy = self.jiggle();
				}
				let dist_sq = dx * dx + dy * dy;
				if dist_sq > max_sq {
					continue;
				}
				let w = strength / dist_sq.max(1.0);
				self.nodes[i].vx += dx * w;
				self.nodes[i].vy += dy * w;
				self.nodes[j].vx -= dx * w;
				self.nodes[j].vy -= dy * w;
			}
		}
	}

	fn apply_targets(&mut self, alpha: f64) {
		let layer = self.params.layer_strength * alpha;
		let center = self.params.center_strength * alpha;
		let (cx, cy) = (self.width / 2.0, self.height / 2.0);
		for node in &mut self.nodes {
			if node.has_target() {
				if let Some(tx) = node.target_x {
					node.vx += (tx - node.x) * layer;
				}
				if let Some(ty) = node.target_y {
					node.vy += (ty - node.y) * layer;
				}
			} else {
				node.vx += (cx - node.x) * center;
				node.vy += (cy - node.y) * center;
			}
		}
	}

	fn apply_collisions(&mut self) {
		let (padding, strength) = (self.params.collision_padding, self.params.collision_strength);
		let n = self.nodes.len();
		for i in 0..n {
			for j in (i + 1)..n {
				let min_dist = self.nodes[i].radius + self.nodes[j].radius + 2.0 * padding;
				let mut dx = (self.nodes[j].x + self.nodes[j].vx) - (self.nodes[i].x + self.nodes[i].vx);
				let mut dy = (self.nodes[j].y + self.nodes[j].vy) - (self.nodes[i].y + self.nodes[i].vy);
				if dx == 0.0 && dy == 0.0 {
					dx = self.jiggle();
					dy = self.jiggle();
				}
				let dist_sq = dx * dx + dy * dy;
				if dist_sq >= min_dist * min_dist {
					continue;
				}
				let dist = dist_sq.sqrt();
				let push = (min_dist - dist) / dist * strength * 0.5;
				self.nodes[i].vx -= dx * push;
				self.nodes[i].vy -= dy * push;
				self.nodes[j].vx += dx * push;
				self.nodes[j].vy += dy * push;
			}
		}
	}

	fn integrate(&mut self) {
		let keep = 1.0 - self.params.velocity_decay;
		let (w, h) = (self.width, self.height);
		for node in &mut self.nodes {
			match (node.fx, node.fy) {
				(Some(fx), Some(fy)) => {
					node.x = fx;
					node.y = fy;
					node.vx = 0.0;
					node.vy = 0.0;
				}
				_ => {
					node.vx *= keep;
					node.vy *= keep;
					node.x += node.vx;
					node.y += node.vy;
					if w > 2.0 * node.radius {
						node.x = node.x.clamp(node.radius, w - node.radius);
					}
					if h > 2.0 * node.radius {
						node.y = node.y.clamp(node.radius, h - node.radius);
					}
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sim(width: f64, height: f64) -> Simulation {
		Simulation::new(&SimulationConfig::default(), &LayoutParams::default(), width, height)
	}

	fn distance(s: &Simulation, a: usize, b: usize) -> f64 {
		let (ax, ay) = s.position(a).unwrap();
		let (bx, by) = s.position(b).unwrap();
		((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
	}

	#[test]
	fn stops_after_bounded_number_of_ticks() {
		let config = SimulationConfig::default();
		let mut s = sim(600.0, 400.0);
		s.add_node(100.0, 100.0, 10.0);
		s.add_node(200.0, 120.0, 10.0);
		s.add_link(Some(0), Some(1));

		let mut ticks = 0usize;
		while s.tick() {
			ticks += 1;
			assert!(ticks < 10_000, "simulation never cooled");
		}
		// Tick k runs while alpha_start * decay^(k-1) >= alpha_min.
		let expected = ((config.alpha_min / config.alpha_start).ln() / config.alpha_decay.ln())
			.floor() as usize
			+ 1;
		assert_eq!(ticks, expected);
		assert!(s.alpha() < config.alpha_min);

		let frozen = s.position(0);
		assert!(!s.tick());
		assert_eq!(s.position(0), frozen);
	}

	#[test]
	fn reheat_restarts_ticks_without_moving_nodes() {
		let mut s = sim(600.0, 400.0);
		s.add_node(100.0, 100.0, 10.0);
		s.add_node(300.0, 100.0, 10.0);
		while s.tick() {}
		let before = (s.position(0), s.position(1));

		s.reheat();
		assert_eq!((s.position(0), s.position(1)), before);
		assert!(s.is_active());
		assert_eq!(s.alpha(), SimulationConfig::default().reheat);
		assert!(s.tick());
	}

	#[test]
	fn linked_nodes_settle_near_link_distance() {
		let mut s = sim(800.0, 600.0);
		s.add_node(380.0, 300.0, 12.0);
		s.add_node(420.0, 300.0, 12.0);
		s.add_link(Some(0), Some(1));
		while s.tick() {}
		let d = distance(&s, 0, 1);
		assert!(d > 70.0 && d < 220.0, "distance {d}");
	}

	#[test]
	fn collision_separates_coincident_nodes() {
		let layout = LayoutParams {
			repulsion: Some(0.0),
			..Default::default()
		};
		let config = SimulationConfig::default();
		let mut s = Simulation::new(&config, &layout, 800.0, 600.0);
		s.add_node(400.0, 300.0, 20.0);
		s.add_node(400.0, 300.0, 20.0);
		while s.tick() {}
		let min = 40.0 + 2.0 * config.collision_padding;
		assert!(distance(&s, 0, 1) > min * 0.9);
	}

	#[test]
	fn pinned_node_ignores_forces() {
		let mut s = sim(600.0, 400.0);
		s.add_node(100.0, 100.0, 10.0);
		s.add_node(110.0, 100.0, 10.0);
		s.add_link(Some(0), Some(1));
		s.pin(0, 50.0, 50.0);
		for _ in 0..50 {
			s.tick();
		}
		assert_eq!(s.position(0), Some((50.0, 50.0)));
		assert_eq!(s.pinned_count(), 1);
	}

	#[test]
	fn pin_keeps_energy_above_reheat() {
		let mut s = sim(600.0, 400.0);
		s.add_node(100.0, 100.0, 10.0);
		while s.tick() {}
		s.pin(0, 20.0, 20.0);
		for _ in 0..2_000 {
			assert!(s.tick());
		}
		assert_eq!(s.alpha(), SimulationConfig::default().reheat);

		s.unpin(0);
		assert_eq!(s.alpha_target(), 0.0);
		let mut ticks = 0;
		while s.tick() {
			ticks += 1;
		}
		assert!(ticks > 0 && ticks < 1_000);
	}

	#[test]
	fn zero_stop_threshold_still_cools() {
		let config = SimulationConfig {
			alpha_min: 0.0,
			..Default::default()
		};
		let mut s = Simulation::new(&config, &LayoutParams::default(), 600.0, 400.0);
		s.add_node(100.0, 100.0, 10.0);
		let mut ticks = 0usize;
		while s.tick() {
			ticks += 1;
			assert!(ticks < 10_000, "simulation never cooled");
		}
		assert!(!s.is_active());
	}

	#[test]
	fn low_reheat_still_wakes_pinned_simulation() {
		let config = SimulationConfig {
			reheat: 0.0005,
			..Default::default()
		};
		let mut s = Simulation::new(&config, &LayoutParams::default(), 600.0, 400.0);
		s.add_node(100.0, 100.0, 10.0);
		s.add_node(200.0, 100.0, 10.0);
		while s.tick() {}

		s.pin(0, 20.0, 20.0);
		assert_eq!(s.pinned_count(), 1);
		assert!(s.is_active());
		for _ in 0..500 {
			assert!(s.tick());
		}
	}

	#[test]
	fn layer_target_attracts_node() {
		let mut s = sim(800.0, 600.0);
		let n = s.add_node(100.0, 100.0, 10.0);
		s.set_target(n, Some(400.0), Some(450.0));
		while s.tick() {}
		let (x, y) = s.position(n).unwrap();
		assert!((x - 400.0).abs() < 40.0, "x {x}");
		assert!((y - 450.0).abs() < 40.0, "y {y}");
	}

	#[test]
	fn unresolved_link_is_ignored() {
		let mut s = sim(600.0, 400.0);
		s.add_node(100.0, 100.0, 10.0);
		s.add_node(200.0, 100.0, 10.0);
		let bad = s.add_link(Some(0), None);
		let out_of_range = s.add_link(Some(7), Some(1));
		s.add_link(Some(0), Some(1));
		assert!(s.links()[bad].endpoints().is_none());
		assert!(s.links()[out_of_range].endpoints().is_none());
		while s.tick() {}
		for node in s.nodes() {
			assert!(node.x.is_finite() && node.y.is_finite());
		}
	}

	#[test]
	fn nodes_stay_inside_surface() {
		let mut s = sim(200.0, 150.0);
		for i in 0..12 {
			s.add_node(100.0 + i as f64, 75.0, 10.0);
		}
		while s.tick() {}
		for node in s.nodes() {
			assert!(node.x >= 10.0 && node.x <= 190.0);
			assert!(node.y >= 10.0 && node.y <= 140.0);
		}
	}
}
