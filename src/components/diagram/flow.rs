//! Flow particles: short-lived markers that travel along links.
//!
//! Each cycle gives every eligible link one particle. Departures are
//! staggered by link order and every particle is dropped once its
//! traversal time has elapsed. Times are host milliseconds.

use crate::config::ParticleConfig;

/// Smallest departure gap, so particles of one cycle never leave together.
const MIN_STAGGER_MS: f64 = 1.0;

/// One particle bound to one link.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
	pub id: u64,
	pub link: usize,
	pub start_ms: f64,
}

/// Particle scheduler for a single diagram.
#[derive(Clone, Debug)]
pub struct FlowAnimator {
	eligible: Vec<usize>,
	particles: Vec<Particle>,
	duration_ms: f64,
	stagger_ms: f64,
	interval_ms: f64,
	next_id: u64,
}

impl FlowAnimator {
	pub fn new(config: &ParticleConfig, eligible: Vec<usize>) -> Self {
		let duration_ms = config.duration_ms.max(1.0);
		let stagger_ms = config.stagger_ms.max(MIN_STAGGER_MS);
		let pass = pass_length(eligible.len(), duration_ms, stagger_ms);
		Self {
			eligible,
			particles: Vec::new(),
			duration_ms,
			stagger_ms,
			// Never start a cycle before the previous pass has landed.
			interval_ms: config.cycle_interval_ms.max(pass + stagger_ms),
			next_id: 0,
		}
	}

	/// Time between cycle starts.
	pub fn cycle_interval_ms(&self) -> f64 {
		self.interval_ms
	}

	/// Time from the first departure to the last arrival within one cycle.
	#[cfg(test)]
	fn pass_duration_ms(&self) -> f64 {
		pass_length(self.eligible.len(), self.duration_ms, self.stagger_ms)
	}

	/// Launch one particle per eligible link. Returns how many were created.
	pub fn start_cycle(&mut self, now_ms: f64) -> usize {
		for (order, &link) in self.eligible.iter().enumerate() {
			self.particles.push(Particle {
				id: self.next_id,
				link,
				start_ms: now_ms + order as f64 * self.stagger_ms,
			});
			self.next_id += 1;
		}
		self.eligible.len()
	}

	/// Drop every particle whose traversal has finished. Returns the count.
	pub fn advance(&mut self, now_ms: f64) -> usize {
		let before = self.particles.len();
		let duration = self.duration_ms;
		self.particles.retain(|p| now_ms < p.start_ms + duration);
		before - self.particles.len()
	}

	/// Particles that have departed, with their progress in `0.0..1.0`.
	pub fn in_flight(&self, now_ms: f64) -> impl Iterator<Item = (usize, f64)> + '_ {
		self.particles.iter().filter_map(move |p| {
			let t = (now_ms - p.start_ms) / self.duration_ms;
			(0.0..1.0).contains(&t).then_some((p.link, t))
		})
	}

	pub fn particles(&self) -> &[Particle] {
		&self.particles
	}

	/// No particle is pending or travelling.
	pub fn is_idle(&self) -> bool {
		self.particles.is_empty()
	}
}

fn pass_length(links: usize, duration: f64, stagger: f64) -> f64 {
	links.saturating_sub(1) as f64 * stagger + duration
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use pretty_assertions::assert_eq;

	use super::*;

	fn config() -> ParticleConfig {
		ParticleConfig {
			duration_ms: 1000.0,
			cycle_interval_ms: 3000.0,
			stagger_ms: 100.0,
			radius: 3.0,
		}
	}

	#[test]
	fn cycle_creates_one_particle_per_link_with_distinct_offsets() {
		let mut flow = FlowAnimator::new(&config(), vec![0, 2, 3, 5]);
		assert_eq!(flow.start_cycle(10_000.0), 4);

		let starts: Vec<f64> = flow.particles().iter().map(|p| p.start_ms).collect();
		assert_eq!(starts, vec![10_000.0, 10_100.0, 10_200.0, 10_300.0]);
		let links: Vec<usize> = flow.particles().iter().map(|p| p.link).collect();
		assert_eq!(links, vec![0, 2, 3, 5]);
		let distinct: HashSet<u64> = flow.particles().iter().map(|p| p.start_ms as u64).collect();
		assert_eq!(distinct.len(), 4);
	}

	#[test]
	fn zero_stagger_still_departs_in_sequence() {
		let cfg = ParticleConfig {
			stagger_ms: 0.0,
			..config()
		};
		let mut flow = FlowAnimator::new(&cfg, vec![0, 1, 2]);
		assert_eq!(flow.start_cycle(0.0), 3);
		let starts: Vec<f64> = flow.particles().iter().map(|p| p.start_ms).collect();
		assert!(starts.windows(2).all(|w| w[0] < w[1]), "starts {starts:?}");
		assert!(flow.cycle_interval_ms() > flow.pass_duration_ms());
	}

	#[test]
	fn particles_removed_after_traversal() {
		let mut flow = FlowAnimator::new(&config(), vec![0, 1, 2]);
		flow.start_cycle(0.0);

		assert_eq!(flow.advance(999.0), 0);
		assert_eq!(flow.advance(1000.0), 1);
		assert_eq!(flow.advance(1150.0), 1);
		assert_eq!(flow.particles().len(), 1);
		assert_eq!(flow.advance(1200.0), 1);
		assert!(flow.is_idle());
	}

	#[test]
	fn in_flight_reports_progress_only_after_departure() {
		let mut flow = FlowAnimator::new(&config(), vec![7, 8]);
		flow.start_cycle(0.0);
		let now: Vec<(usize, f64)> = flow.in_flight(50.0).collect();
		assert_eq!(now, vec![(7, 0.05)]);
		let later: Vec<(usize, f64)> = flow.in_flight(600.0).collect();
		assert_eq!(later, vec![(7, 0.6), (8, 0.5)]);
	}

	#[test]
	fn interval_is_longer_than_a_full_pass() {
		let flow = FlowAnimator::new(&config(), vec![0, 1, 2]);
		assert_eq!(flow.pass_duration_ms(), 1200.0);
		assert_eq!(flow.cycle_interval_ms(), 3000.0);

		let crowded = FlowAnimator::new(&config(), (0..40).collect());
		assert!(crowded.cycle_interval_ms() > crowded.pass_duration_ms());
	}

	#[test]
	fn cycles_do_not_overlap_on_a_link() {
		let mut flow = FlowAnimator::new(&config(), (0..30).collect());
		let interval = flow.cycle_interval_ms();
		flow.start_cycle(0.0);
		flow.advance(interval);
		assert!(flow.is_idle());
		flow.start_cycle(interval);
		assert_eq!(flow.particles().len(), 30);
		assert_eq!(flow.particles().last().map(|p| p.id), Some(59));
	}

	#[test]
	fn particle_ids_are_never_reused() {
		let mut flow = FlowAnimator::new(&config(), vec![0, 1]);
		flow.start_cycle(0.0);
		let first: Vec<u64> = flow.particles().iter().map(|p| p.id).collect();
		flow.advance(10_000.0);
		flow.start_cycle(10_000.0);
		let second: Vec<u64> = flow.particles().iter().map(|p| p.id).collect();
		assert!(first.iter().all(|id| !second.contains(id)));
	}
}
