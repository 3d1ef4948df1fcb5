//! Engine-wide tuning constants.
//!
//! Every value has a default; a page may override any subset through an
//! inline JSON script element (see [`EngineConfig::from_json`]).

use serde::Deserialize;

/// Viewport activation settings.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ActivationConfig {
	/// Distance below the viewport at which containers start activating (px).
	pub lookahead_margin: f64,
	/// Fraction of the container that must be visible to trigger.
	pub threshold: f64,
	/// Upper bound on how long an idle-deferred initializer may wait (ms).
	pub idle_timeout_ms: u32,
}

impl Default for ActivationConfig {
	fn default() -> Self {
		Self {
			lookahead_margin: 200.0,
			threshold: 0.01,
			idle_timeout_ms: 500,
		}
	}
}

impl ActivationConfig {
	/// CSS `rootMargin` extending the viewport downward only.
	pub fn root_margin(&self) -> String {
		format!("0px 0px {}px 0px", self.lookahead_margin)
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ResizeConfig {
	/// Quiet period after the last resize event before rebuilding (ms).
	pub debounce_ms: u32,
}

impl Default for ResizeConfig {
	fn default() -> Self {
		Self { debounce_ms: 250 }
	}
}

/// Force simulation constants.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
	pub alpha_start: f64,
	/// Multiplier applied to alpha on every tick. Must be below 1.
	pub alpha_decay: f64,
	/// Alpha below which the simulation stops ticking.
	pub alpha_min: f64,
	/// Alpha restored on drag start.
	pub reheat: f64,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: f64,
	pub link_distance: f64,
	pub link_strength: f64,
	/// Many-body strength; negative repels.
	pub repulsion: f64,
	/// Pairs farther apart than this ignore each other.
	pub repulsion_max_distance: f64,
	/// Added to each node radius for the collision constraint.
	pub collision_padding: f64,
	pub collision_strength: f64,
	/// Pull toward layer rows and columns.
	pub layer_strength: f64,
	/// Pull of unlayered nodes toward the surface center.
	pub center_strength: f64,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			alpha_start: 1.0,
			alpha_decay: 0.9772,
			alpha_min: 0.001,
			reheat: 0.3,
			velocity_decay: 0.4,
			link_distance: 110.0,
			link_strength: 0.4,
			repulsion: -320.0,
			repulsion_max_distance: 600.0,
			collision_padding: 6.0,
			collision_strength: 0.8,
			layer_strength: 0.12,
			center_strength: 0.03,
		}
	}
}

/// Flow particle timing.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
	/// Time for one particle to cross its link (ms).
	pub duration_ms: f64,
	/// Time between cycle starts (ms). Stretched if a pass would not fit.
	pub cycle_interval_ms: f64,
	/// Departure delay added per link index (ms).
	pub stagger_ms: f64,
	/// Particle radius (px).
	pub radius: f64,
}

impl Default for ParticleConfig {
	fn default() -> Self {
		Self {
			duration_ms: 1500.0,
			cycle_interval_ms: 4000.0,
			stagger_ms: 120.0,
			radius: 3.0,
		}
	}
}

/// All engine constants.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
	pub activation: ActivationConfig,
	pub resize: ResizeConfig,
	pub simulation: SimulationConfig,
	pub particles: ParticleConfig,
}

impl EngineConfig {
	/// Parse a (possibly partial) JSON override.
	pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(text)
	}
}
