//! Debounced rebuild of activated diagrams on window resize.
//!
//! Every resize event bumps a generation and the host schedules a check
//! after the quiet period. Only the check carrying the latest generation
//! rebuilds; earlier ones find themselves superseded and do nothing.

use super::registry::ActivationRegistry;

#[derive(Clone, Debug, Default)]
pub struct ResizeCoordinator {
	generation: u64,
}

impl ResizeCoordinator {
	/// Record a resize event. Returns the generation to hand back to
	/// [`settle`](Self::settle) once the debounce delay has elapsed.
	pub fn signal(&mut self) -> u64 {
		self.generation += 1;
		self.generation
	}

	/// Whether a check for `generation` is the latest one.
	pub fn is_current(&self, generation: u64) -> bool {
		generation == self.generation
	}

	/// Rebuild every activated diagram if no resize event arrived since
	/// `generation` was issued. Returns the number of initializers re-run, or
	/// `None` when superseded.
	pub fn settle<H>(&mut self, generation: u64, registry: &mut ActivationRegistry<H>) -> Option<usize> {
		if !self.is_current(generation) {
			return None;
		}
		Some(registry.reinitialize_activated())
	}
}
