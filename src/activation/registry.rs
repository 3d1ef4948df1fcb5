//! Container id -> initializer registry with at-most-once activation.

use std::collections::{HashMap, HashSet};

/// Zero-argument setup routine. Returns a handle to the built diagram, or
/// `None` when there was nothing to build (e.g. the container is missing).
pub type Initializer<H> = Box<dyn FnMut() -> Option<H>>;

struct Entry<H> {
	init: Initializer<H>,
	handle: Option<H>,
	invocations: usize,
}

/// Outcome of [`ActivationRegistry::activate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activation {
	/// The initializer ran for the first time.
	Initialized,
	/// The id was already in the activation record; nothing ran.
	AlreadyActive,
	/// No initializer is registered under this id.
	Unknown,
}

/// Maps container ids to initializers and records which have run.
///
/// The activation record only grows. An id is checked and inserted in the
/// same call that runs its initializer, so re-entering the viewport can
/// never initialize twice.
pub struct ActivationRegistry<H> {
	entries: HashMap<String, Entry<H>>,
	/// Registration order.
	order: Vec<String>,
	/// Activation order.
	activated: Vec<String>,
	activated_set: HashSet<String>,
}

impl<H> Default for ActivationRegistry<H> {
	fn default() -> Self {
		Self {
			entries: HashMap::new(),
			order: Vec::new(),
			activated: Vec::new(),
			activated_set: HashSet::new(),
		}
	}
}

impl<H> ActivationRegistry<H> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register `init` under `id`. The first registration for an id wins;
	/// later ones are ignored and return `false`.
	pub fn register(&mut self, id: impl Into<String>, init: impl FnMut() -> Option<H> + 'static) -> bool {
		let id = id.into();
		if self.entries.contains_key(&id) {
			log::warn!("diagram-engine: {id} registered twice, keeping the first");
			return false;
		}
		self.entries.insert(
			id.clone(),
			Entry {
				init: Box::new(init),
				handle: None,
				invocations: 0,
			},
		);
		self.order.push(id);
		true
	}

	pub fn ids(&self) -> impl Iterator<Item = &str> {
		self.order.iter().map(String::as_str)
	}

	pub fn is_registered(&self, id: &str) -> bool {
		self.entries.contains_key(id)
	}

	pub fn is_activated(&self, id: &str) -> bool {
		self.activated_set.contains(id)
	}

	/// Ids in the activation record, in activation order.
	pub fn activated(&self) -> impl Iterator<Item = &str> {
		self.activated.iter().map(String::as_str)
	}

	/// Run `id`'s initializer unless it already ran.
	pub fn activate(&mut self, id: &str) -> Activation {
		let Some(entry) = self.entries.get_mut(id) else {
			return Activation::Unknown;
		};
		if !self.activated_set.insert(id.to_string()) {
			return Activation::AlreadyActive;
		}
		self.activated.push(id.to_string());
		entry.invocations += 1;
		entry.handle = (entry.init)();
		Activation::Initialized
	}

	/// Re-run the initializer of every activated id, replacing its handle.
	/// The old handle is dropped only after the new one exists. Returns how
	/// many initializers ran.
	pub fn reinitialize_activated(&mut self) -> usize {
		let mut count = 0;
		for id in &self.activated {
			if let Some(entry) = self.entries.get_mut(id) {
				entry.invocations += 1;
				let fresh = (entry.init)();
				entry.handle = fresh;
				count += 1;
			}
		}
		count
	}

	/// How many times `id`'s initializer has run.
	pub fn invocations(&self, id: &str) -> usize {
		self.entries.get(id).map_or(0, |e| e.invocations)
	}

	pub fn handle(&self, id: &str) -> Option<&H> {
		self.entries.get(id)?.handle.as_ref()
	}
}
