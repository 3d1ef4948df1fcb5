//! Registration, activation and resize, independent of the host.
//!
//! [`DiagramLifecycle`] owns the registry, the viewport tracker and the
//! resize coordinator. The host feeds it visibility batches and resize
//! events and executes the work it hands back (deferred activations,
//! debounced settles).

use super::registry::{Activation, ActivationRegistry};
use super::resize::ResizeCoordinator;
use super::viewport::{ViewportTracker, VisibilityEntry};

pub struct DiagramLifecycle<H> {
	registry: ActivationRegistry<H>,
	tracker: ViewportTracker,
	resize: ResizeCoordinator,
}

impl<H> DiagramLifecycle<H> {
	pub fn new(threshold: f64) -> Self {
		Self {
			registry: ActivationRegistry::new(),
			tracker: ViewportTracker::new(threshold),
			resize: ResizeCoordinator::default(),
		}
	}

	/// Register an initializer and start observing its container.
	pub fn register(&mut self, id: &str, init: impl FnMut() -> Option<H> + 'static) -> bool {
		if !self.registry.register(id, init) {
			return false;
		}
		self.tracker.observe(id);
		true
	}

	/// Stop observing a container without activating it, e.g. because its
	/// element does not exist.
	pub fn skip(&mut self, id: &str) {
		self.tracker.unobserve(id);
	}

	/// Feed an intersection batch. Returns the ids to activate; the host may
	/// defer each to an idle moment before calling [`activate`](Self::activate).
	pub fn on_visibility(&mut self, entries: &[VisibilityEntry]) -> Vec<String> {
		self.tracker
			.take_entering(entries)
			.into_iter()
			.filter(|id| !self.registry.is_activated(id))
			.collect()
	}

	pub fn activate(&mut self, id: &str) -> Activation {
		self.registry.activate(id)
	}

	/// Record a resize event; returns the generation to settle later.
	pub fn on_resize(&mut self) -> u64 {
		self.resize.signal()
	}

	pub fn settle_resize(&mut self, generation: u64) -> Option<usize> {
		self.resize.settle(generation, &mut self.registry)
	}

	pub fn registry(&self) -> &ActivationRegistry<H> {
		&self.registry
	}

	pub fn is_observed(&self, id: &str) -> bool {
		self.tracker.is_observed(id)
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;
	use std::rc::Rc;

	use super::*;

	fn counted(lc: &mut DiagramLifecycle<()>, id: &str) -> Rc<Cell<usize>> {
		let calls = Rc::new(Cell::new(0));
		let c = calls.clone();
		lc.register(id, move || {
			c.set(c.get() + 1);
			Some(())
		});
		calls
	}

	/// Deliver a batch and run every returned activation immediately.
	fn scroll(lc: &mut DiagramLifecycle<()>, entries: &[VisibilityEntry]) {
		for id in lc.on_visibility(entries) {
			lc.activate(&id);
		}
	}

	fn resize(lc: &mut DiagramLifecycle<()>) -> Option<usize> {
		let g = lc.on_resize();
		lc.settle_resize(g)
	}

	#[test]
	fn never_visible_container_is_not_built_on_resize() {
		let mut lc = DiagramLifecycle::new(0.01);
		let alpha = counted(&mut lc, "alpha");
		assert_eq!(resize(&mut lc), Some(0));
		assert_eq!(alpha.get(), 0);
	}

	#[test]
	fn reentering_viewport_does_not_reinitialize() {
		let mut lc = DiagramLifecycle::new(0.01);
		let beta = counted(&mut lc, "beta");

		scroll(&mut lc, &[VisibilityEntry::visible("beta", 0.3)]);
		assert_eq!(beta.get(), 1);

		scroll(&mut lc, &[VisibilityEntry::hidden("beta")]);
		scroll(&mut lc, &[VisibilityEntry::visible("beta", 0.9)]);
		assert_eq!(beta.get(), 1);

		assert_eq!(resize(&mut lc), Some(1));
		assert_eq!(beta.get(), 2);
	}

	#[test]
	fn resize_rebuilds_each_activated_diagram_exactly_once() {
		let mut lc = DiagramLifecycle::new(0.01);
		let ids = ["one", "two", "three", "four"];
		let counters: Vec<_> = ids.iter().map(|id| counted(&mut lc, id)).collect();
		scroll(
			&mut lc,
			&[VisibilityEntry::visible("one", 0.5), VisibilityEntry::visible("three", 0.5)],
		);

		let g1 = lc.on_resize();
		let g2 = lc.on_resize();
		assert_eq!(lc.settle_resize(g1), None);
		assert_eq!(lc.settle_resize(g2), Some(2));

		let counts: Vec<usize> = counters.iter().map(|c| c.get()).collect();
		assert_eq!(counts, vec![2, 0, 2, 0]);
	}

	#[test]
	fn duplicate_deferred_activation_runs_once() {
		let mut lc = DiagramLifecycle::new(0.0);
		let gamma = counted(&mut lc, "gamma");
		let ids = lc.on_visibility(&[VisibilityEntry::visible("gamma", 1.0)]);
		assert_eq!(ids, vec!["gamma".to_string()]);
		// Two deferred callbacks racing for the same container.
		assert_eq!(lc.activate("gamma"), Activation::Initialized);
		assert_eq!(lc.activate("gamma"), Activation::AlreadyActive);
		assert_eq!(gamma.get(), 1);
	}

	#[test]
	fn skipped_container_never_activates() {
		let mut lc = DiagramLifecycle::new(0.0);
		let delta = counted(&mut lc, "delta");
		lc.skip("delta");
		assert!(!lc.is_observed("delta"));
		scroll(&mut lc, &[VisibilityEntry::visible("delta", 1.0)]);
		assert_eq!(delta.get(), 0);
	}
}
