//! Browser wiring for lazy diagram activation.
//!
//! [`DiagramEngine`] registers one initializer per descriptor, observes each
//! container with an `IntersectionObserver`, activates diagrams in idle time
//! once they scroll near the viewport and rebuilds activated diagrams after
//! the window stops resizing.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use js_sys::Array;
use log::{debug, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{Element, Event, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use crate::components::diagram::{DiagramDescriptor, DiagramHandle, Theme, mount};
use crate::config::EngineConfig;

use super::lifecycle::DiagramLifecycle;
use super::registry::Activation;
use super::scheduler::{clear_timeout, defer_idle, set_timeout};
use super::viewport::VisibilityEntry;

struct EngineInner {
	config: EngineConfig,
	theme: Rc<Theme>,
	lifecycle: RefCell<DiagramLifecycle<DiagramHandle>>,
	elements: RefCell<HashMap<String, Element>>,
	// Held for the page lifetime; never read back.
	_observer: RefCell<Option<IntersectionObserver>>,
	_observer_cb: RefCell<Option<Closure<dyn FnMut(Array, IntersectionObserver)>>>,
	_resize_cb: RefCell<Option<Closure<dyn FnMut(Event)>>>,
	resize_timer: Cell<Option<i32>>,
}

/// Page-wide diagram engine.
///
/// Once [`start`](Self::start)ed, host callbacks keep the engine alive for
/// the lifetime of the page.
#[derive(Clone)]
pub struct DiagramEngine {
	inner: Rc<EngineInner>,
}

impl DiagramEngine {
	pub fn new(config: EngineConfig, theme: Theme) -> Self {
		let threshold = config.activation.threshold;
		Self {
			inner: Rc::new(EngineInner {
				config,
				theme: Rc::new(theme),
				lifecycle: RefCell::new(DiagramLifecycle::new(threshold)),
				elements: RefCell::new(HashMap::new()),
				_observer: RefCell::new(None),
				_observer_cb: RefCell::new(None),
				_resize_cb: RefCell::new(None),
				resize_timer: Cell::new(None),
			}),
		}
	}

	/// Register a diagram. The first descriptor for an id wins.
	pub fn register(&self, descriptor: DiagramDescriptor) -> bool {
		let id = descriptor.id.clone();
		let config = self.inner.config.clone();
		let theme = self.inner.theme.clone();
		self.inner.lifecycle.borrow_mut().register(&id, move || {
			match mount(&descriptor, &config, &theme) {
				Ok(handle) => Some(handle),
				Err(e) => {
					debug!("diagram-engine: skipping {}: {}", descriptor.id, e);
					None
				}
			}
		})
	}

	/// Start observing every registered container and listening for resize.
	pub fn start(&self) {
		let Some(window) = web_sys::window() else {
			return;
		};
		let Some(document) = window.document() else {
			return;
		};

		let inner = self.inner.clone();
		let observer_cb = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
			move |entries: Array, observer: IntersectionObserver| {
				on_intersections(&inner, &entries, &observer);
			},
		);
		let options = IntersectionObserverInit::new();
		options.set_root_margin(&self.inner.config.activation.root_margin());
		options.set_threshold(&JsValue::from_f64(self.inner.config.activation.threshold));
		let observer = match IntersectionObserver::new_with_options(observer_cb.as_ref().unchecked_ref(), &options) {
			Ok(o) => o,
			Err(e) => {
				warn!("diagram-engine: IntersectionObserver unavailable: {:?}", e);
				return;
			}
		};

		let ids: Vec<String> = {
			let lifecycle = self.inner.lifecycle.borrow();
			lifecycle.registry().ids().map(str::to_string).collect()
		};
		let mut observed = 0;
		for id in ids {
			match document.get_element_by_id(&id) {
				Some(el) => {
					observer.observe(&el);
					self.inner.elements.borrow_mut().insert(id, el);
					observed += 1;
				}
				None => {
					debug!("diagram-engine: no container for {id}");
					self.inner.lifecycle.borrow_mut().skip(&id);
				}
			}
		}
		*self.inner._observer.borrow_mut() = Some(observer);
		*self.inner._observer_cb.borrow_mut() = Some(observer_cb);

		let inner = self.inner.clone();
		let resize_cb = Closure::<dyn FnMut(Event)>::new(move |_: Event| on_resize(&inner));
		if window
			.add_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref())
			.is_ok()
		{
			*self.inner._resize_cb.borrow_mut() = Some(resize_cb);
		}

		info!("diagram-engine: observing {observed} diagram containers");
	}
}

fn on_intersections(inner: &Rc<EngineInner>, entries: &Array, observer: &IntersectionObserver) {
	let batch: Vec<VisibilityEntry> = entries
		.iter()
		.filter_map(|e| e.dyn_into::<IntersectionObserverEntry>().ok())
		.map(|e| VisibilityEntry {
			id: e.target().id(),
			is_intersecting: e.is_intersecting(),
			ratio: e.intersection_ratio(),
		})
		.collect();

	let entering = inner.lifecycle.borrow_mut().on_visibility(&batch);
	for id in entering {
		if let Some(el) = inner.elements.borrow().get(&id) {
			observer.unobserve(el);
		}
		let inner = inner.clone();
		defer_idle(inner.config.activation.idle_timeout_ms, move || {
			let mut lifecycle = inner.lifecycle.borrow_mut();
			match lifecycle.activate(&id) {
				Activation::Initialized => match lifecycle.registry().handle(&id) {
					Some(handle) => info!("diagram-engine: activated {}", handle.id()),
					None => debug!("diagram-engine: {id} activated with nothing to draw"),
				},
				Activation::AlreadyActive => {}
				Activation::Unknown => warn!("diagram-engine: no initializer for {id}"),
			}
		});
	}
}

fn on_resize(inner: &Rc<EngineInner>) {
	let generation = inner.lifecycle.borrow_mut().on_resize();
	if let Some(id) = inner.resize_timer.take() {
		clear_timeout(id);
	}
	let settle = inner.clone();
	let timer = set_timeout(inner.config.resize.debounce_ms, move || {
		settle.resize_timer.set(None);
		let rebuilt = settle.lifecycle.borrow_mut().settle_resize(generation);
		if let Some(n) = rebuilt {
			debug!("diagram-engine: rebuilt {n} diagrams after resize");
		}
	});
	inner.resize_timer.set(timer);
}
