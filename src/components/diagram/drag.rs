//! Node dragging.
//!
//! `Idle -> Dragging -> Idle`. The pin and the simulation reheat are always
//! applied through [`Simulation::pin`]/[`Simulation::unpin`], which update
//! the node and the energy together.

use super::simulation::Simulation;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DragPhase {
	#[default]
	Idle,
	Dragging {
		node: usize,
	},
}

/// Pointer-driven pin state machine. At most one node is pinned at a time.
#[derive(Clone, Debug, Default)]
pub struct DragController {
	phase: DragPhase,
}

impl DragController {
	pub fn phase(&self) -> DragPhase {
		self.phase
	}

	/// The node currently held, if any.
	pub fn pinned(&self) -> Option<usize> {
		match self.phase {
			DragPhase::Idle => None,
			DragPhase::Dragging { node } => Some(node),
		}
	}

	pub fn is_dragging(&self) -> bool {
		self.pinned().is_some()
	}

	/// Pointer-down over `node`. A drag already in progress is released first.
	pub fn pointer_down(&mut self, sim: &mut Simulation, node: usize, x: f64, y: f64) {
		if let Some(previous) = self.pinned() {
			sim.unpin(previous);
		}
		sim.pin(node, x, y);
		self.phase = DragPhase::Dragging { node };
	}

	/// Pointer-move. Returns `true` if a pinned node was moved.
	pub fn pointer_move(&mut self, sim: &mut Simulation, x: f64, y: f64) -> bool {
		match self.phase {
			DragPhase::Idle => false,
			DragPhase::Dragging { node } => {
				sim.move_pin(node, x, y);
				true
			}
		}
	}

	/// Pointer-up (or pointer leaving the surface). Returns the released node.
	pub fn pointer_up(&mut self, sim: &mut Simulation) -> Option<usize> {
		let released = self.pinned();
		if let Some(node) = released {
			sim.unpin(node);
		}
		self.phase = DragPhase::Idle;
		released
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::diagram::types::LayoutParams;
	use crate::config::SimulationConfig;

	fn two_node_sim() -> Simulation {
		let mut s = Simulation::new(
			&SimulationConfig::default(),
			&LayoutParams::default(),
			600.0,
			400.0,
		);
		s.add_node(10.0, 10.0, 8.0);
		s.add_node(300.0, 200.0, 8.0);
		s.add_link(Some(0), Some(1));
		while s.tick() {}
		s
	}

	#[test]
	fn exactly_one_node_pinned_during_drag() {
		let mut s = two_node_sim();
		let mut drag = DragController::default();

		drag.pointer_down(&mut s, 0, 10.0, 10.0);
		assert_eq!(s.pinned_count(), 1);
		for step in 1..=20 {
			let p = 10.0 + step as f64 * 2.0;
			assert!(drag.pointer_move(&mut s, p, p));
			s.tick();
			assert_eq!(s.pinned_count(), 1);
			assert_eq!(drag.pinned(), Some(0));
		}
		assert_eq!(drag.pointer_up(&mut s), Some(0));
		assert_eq!(s.pinned_count(), 0);
		assert_eq!(drag.phase(), DragPhase::Idle);
	}

	#[test]
	fn second_pointer_down_moves_the_pin() {
		let mut s = two_node_sim();
		let mut drag = DragController::default();
		drag.pointer_down(&mut s, 0, 10.0, 10.0);
		drag.pointer_down(&mut s, 1, 100.0, 100.0);
		assert_eq!(s.pinned_count(), 1);
		assert!(s.nodes()[1].is_pinned());
		assert!(!s.nodes()[0].is_pinned());
	}

	#[test]
	fn drag_start_reheats_cold_simulation() {
		let mut s = two_node_sim();
		assert!(!s.is_active());
		let mut drag = DragController::default();
		drag.pointer_down(&mut s, 1, 300.0, 200.0);
		assert!(s.is_active());
	}

	#[test]
	fn released_node_moves_under_forces() {
		let mut s = two_node_sim();
		let mut drag = DragController::default();

		drag.pointer_down(&mut s, 0, 10.0, 10.0);
		for step in 1..=8 {
			let p = 10.0 + step as f64 * 5.0;
			drag.pointer_move(&mut s, p, p);
			s.tick();
		}
		assert_eq!(s.position(0), Some((50.0, 50.0)));
		drag.pointer_up(&mut s);
		assert!(!s.nodes()[0].is_pinned());

		for _ in 0..10 {
			s.tick();
		}
		assert_ne!(s.position(0), Some((50.0, 50.0)));
	}

	#[test]
	fn move_and_up_while_idle_are_noops() {
		let mut s = two_node_sim();
		let mut drag = DragController::default();
		let before = s.position(0);
		assert!(!drag.pointer_move(&mut s, 99.0, 99.0));
		assert_eq!(drag.pointer_up(&mut s), None);
		assert_eq!(s.position(0), before);
	}
}
