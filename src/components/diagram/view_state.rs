//! Hover state and the visual attributes derived from it.
//!
//! Pointer handlers only call [`ViewState::set_hover`]; the renderer only
//! reads [`ViewState::node_visual`] and [`ViewState::link_visual`]. Each node
//! carries a highlight intensity in `0.0..=1.0` that eases toward its target,
//! with a short hold before fading out so skimming past a node does not flash.

use std::collections::{HashMap, HashSet};

/// Minimum time (seconds) a highlight is held before it may fade out.
const MIN_HOLD_TIME: f64 = 0.12;
const FADE_IN_SPEED: f64 = 6.0;
const FADE_OUT_SPEED: f64 = 4.0;
/// Intensities below this are dropped.
const VISIBLE: f64 = 0.005;

/// Drawing attributes for one node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeVisual {
	pub alpha: f64,
	pub radius_scale: f64,
	/// Hover ring opacity, zero when no ring is drawn.
	pub ring: f64,
}

/// Drawing attributes for one link.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkVisual {
	pub alpha: f64,
	pub width_scale: f64,
}

/// Easing state of a node that is, or recently was, highlighted.
#[derive(Clone, Copy, Debug, Default)]
struct Glow {
	/// Highlight level in `0.0..=1.0`.
	level: f64,
	/// Hover ring level in `0.0..=1.0`.
	ring: f64,
	/// Seconds left before a released glow starts to fade.
	hold: f64,
}

impl Glow {
	/// Ease toward lit/ringed over `dt`. Returns whether the glow is still
	/// visible or wanted.
	fn step(&mut self, lit: bool, ringed: bool, dt: f64) -> bool {
		let rise = 1.0 - (-FADE_IN_SPEED * dt).exp();
		let decay = (-FADE_OUT_SPEED * dt).exp();

		if lit {
			self.hold = MIN_HOLD_TIME;
			self.level += (1.0 - self.level) * rise;
		} else {
			self.hold -= dt;
		}
		let released = self.hold <= 0.0;
		if !lit && released {
			self.level *= decay;
		}
		if ringed {
			self.ring += (1.0 - self.ring) * rise;
		} else if released || lit {
			self.ring *= decay;
		}
		lit || self.level > VISIBLE || self.ring > VISIBLE
	}

	fn settled(&self, lit: bool, ringed: bool) -> bool {
		let level_done = if lit { self.level >= 1.0 - VISIBLE } else { self.level <= VISIBLE };
		let ring_done = if ringed { self.ring >= 1.0 - VISIBLE } else { self.ring <= VISIBLE };
		level_done && ring_done
	}
}

#[derive(Clone, Debug, Default)]
pub struct ViewState {
	hovered: Option<usize>,
	/// Hovered node plus its neighbours.
	lit: HashSet<usize>,
	glows: HashMap<usize, Glow>,
	/// Highest glow level after the last tick; drives dimming of the rest.
	peak: f64,
}

fn smooth_step(t: f64) -> f64 {
	t * t * (3.0 - 2.0 * t)
}

impl ViewState {
	pub fn hovered(&self) -> Option<usize> {
		self.hovered
	}

	/// Transition to hovering `node` (or nothing). Returns whether it changed.
	pub fn set_hover(&mut self, node: Option<usize>, edges: &[(usize, usize)]) -> bool {
		if self.hovered == node {
			return false;
		}
		self.hovered = node;
		self.lit.clear();

		if let Some(idx) = node {
			self.lit.insert(idx);
			self.lit.extend(edges.iter().filter_map(|&(s, t)| match (s == idx, t == idx) {
				(true, _) => Some(t),
				(_, true) => Some(s),
				_ => None,
			}));
			for &idx in &self.lit {
				self.glows.entry(idx).or_default();
			}
		}
		true
	}

	/// Whether `idx` is the hovered node or one of its neighbours.
	pub fn is_highlighted(&self, idx: usize) -> bool {
		self.lit.contains(&idx)
	}

	/// Ease every glow toward its target over `dt` seconds.
	pub fn tick(&mut self, dt: f64) {
		let (lit, hovered) = (&self.lit, self.hovered);
		self.glows
			.retain(|idx, glow| glow.step(lit.contains(idx), hovered == Some(*idx), dt));
		self.peak = self.glows.values().map(|g| g.level).fold(0.0, f64::max);
	}

	/// Some glow is still moving toward its target.
	pub fn is_animating(&self) -> bool {
		self.glows
			.iter()
			.any(|(idx, g)| !g.settled(self.lit.contains(idx), self.hovered == Some(*idx)))
	}

	fn level(&self, idx: usize) -> f64 {
		self.glows.get(&idx).map_or(0.0, |g| g.level)
	}

	fn ring(&self, idx: usize) -> f64 {
		self.glows.get(&idx).map_or(0.0, |g| g.ring)
	}

	pub fn node_visual(&self, idx: usize) -> NodeVisual {
		let dim = smooth_step(self.peak);
		let lit = smooth_step(self.level(idx));
		let ring = smooth_step(self.ring(idx));

		let (dim_alpha, dim_radius) = if dim > 0.01 {
			(1.0 - 0.7 * dim, 1.0 - 0.15 * dim)
		} else {
			(1.0, 1.0)
		};
		if lit <= 0.001 {
			return NodeVisual {
				alpha: dim_alpha,
				radius_scale: dim_radius,
				ring: 0.0,
			};
		}

		// Neighbours grow by 15%, the hovered node by up to 25%.
		let grown = 1.0 + (0.15 + 0.1 * ring) * lit;
		NodeVisual {
			alpha: dim_alpha + (1.0 - dim_alpha) * lit,
			radius_scale: dim_radius + (grown - dim_radius) * lit,
			ring: if ring > 0.01 { 0.8 * ring } else { 0.0 },
		}
	}

	pub fn link_visual(&self, source: usize, target: usize) -> LinkVisual {
		// Geometric mean: a link lights up only when both ends do.
		let edge = smooth_step((self.level(source) * self.level(target)).sqrt());
		let dim = smooth_step(self.peak);
		if edge > 0.01 {
			LinkVisual {
				alpha: 0.7 + 0.3 * edge,
				width_scale: 1.0 + 0.6 * edge,
			}
		} else {
			LinkVisual {
				alpha: 0.7 - 0.5 * dim,
				width_scale: 1.0 - 0.3 * dim,
			}
		}
	}
}
