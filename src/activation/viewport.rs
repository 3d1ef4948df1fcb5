//! Viewport visibility tracking.
//!
//! Host intersection callbacks are reduced to [`VisibilityEntry`] values and
//! fed through [`ViewportTracker::take_entering`], which reports each
//! container the first time it becomes visible and stops observing it.

use std::collections::HashSet;

/// Tolerance for intersection ratios reported right at the threshold.
const RATIO_EPSILON: f64 = 1e-3;

/// One intersection report for one container.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibilityEntry {
	pub id: String,
	pub is_intersecting: bool,
	/// Visible fraction of the container in `0.0..=1.0`.
	pub ratio: f64,
}

impl VisibilityEntry {
	pub fn visible(id: &str, ratio: f64) -> Self {
		Self {
			id: id.to_string(),
			is_intersecting: true,
			ratio,
		}
	}

	pub fn hidden(id: &str) -> Self {
		Self {
			id: id.to_string(),
			is_intersecting: false,
			ratio: 0.0,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct ViewportTracker {
	observed: HashSet<String>,
	threshold: f64,
}

impl ViewportTracker {
	pub fn new(threshold: f64) -> Self {
		Self {
			observed: HashSet::new(),
			threshold: threshold.clamp(0.0, 1.0),
		}
	}

	/// Start observing `id`. Returns `false` if it already was.
	pub fn observe(&mut self, id: &str) -> bool {
		self.observed.insert(id.to_string())
	}

	pub fn unobserve(&mut self, id: &str) -> bool {
		self.observed.remove(id)
	}

	pub fn is_observed(&self, id: &str) -> bool {
		self.observed.contains(id)
	}

	#[cfg(test)]
	fn observed_count(&self) -> usize {
		self.observed.len()
	}

	/// Ids that just entered the viewport. Each is unobserved before being
	/// returned, so a container is reported at most once.
	pub fn take_entering(&mut self, entries: &[VisibilityEntry]) -> Vec<String> {
		let mut entering = Vec::new();
		for entry in entries {
			if !entry.is_intersecting || entry.ratio + RATIO_EPSILON < self.threshold {
				continue;
			}
			if self.observed.remove(&entry.id) {
				entering.push(entry.id.clone());
			}
		}
		entering
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn reports_first_entry_only() {
		let mut t = ViewportTracker::new(0.01);
		t.observe("a");
		t.observe("b");

		assert_eq!(t.take_entering(&[VisibilityEntry::visible("a", 0.2)]), vec!["a"]);
		assert!(!t.is_observed("a"));
		assert_eq!(t.take_entering(&[VisibilityEntry::hidden("a")]), Vec::<String>::new());
		assert_eq!(t.take_entering(&[VisibilityEntry::visible("a", 1.0)]), Vec::<String>::new());
		assert_eq!(t.observed_count(), 1);
	}

	#[test]
	fn hidden_and_below_threshold_entries_are_ignored() {
		let mut t = ViewportTracker::new(0.5);
		t.observe("a");
		let entries = [VisibilityEntry::hidden("a"), VisibilityEntry::visible("a", 0.2)];
		assert!(t.take_entering(&entries).is_empty());
		assert!(t.is_observed("a"));
		assert_eq!(t.take_entering(&[VisibilityEntry::visible("a", 0.5)]), vec!["a"]);
	}

	#[test]
	fn unobserved_ids_are_never_reported() {
		let mut t = ViewportTracker::new(0.0);
		assert!(t.take_entering(&[VisibilityEntry::visible("stranger", 1.0)]).is_empty());
	}

	#[test]
	fn batch_with_repeats_reports_each_once() {
		let mut t = ViewportTracker::new(0.0);
		t.observe("a");
		t.observe("b");
		let entries = [
			VisibilityEntry::visible("a", 0.1),
			VisibilityEntry::visible("b", 0.1),
			VisibilityEntry::visible("a", 0.3),
		];
		assert_eq!(t.take_entering(&entries), vec!["a", "b"]);
	}
}
