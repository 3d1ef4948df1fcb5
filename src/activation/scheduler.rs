//! Host scheduling primitives.
//!
//! Thin wrappers over the browser's timer, idle and animation-frame queues.
//! Repeating work is represented by owned handles that cancel on drop, so
//! whoever owns the handle owns the lifetime of the callback.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{IdleRequestOptions, Window};

fn window() -> Option<Window> {
	web_sys::window()
}

/// Monotonic milliseconds.
pub fn now_ms() -> f64 {
	window()
		.and_then(|w| w.performance())
		.map(|p| p.now())
		.unwrap_or_else(js_sys::Date::now)
}

/// Run `f` once when the event loop is idle, or after `timeout_ms` at the
/// latest. Hosts without `requestIdleCallback` get a zero-delay timeout.
pub fn defer_idle(timeout_ms: u32, f: impl FnOnce() + 'static) {
	let Some(win) = window() else {
		return;
	};
	let callback = Closure::once_into_js(f);
	let options = IdleRequestOptions::new();
	options.set_timeout(timeout_ms);
	if win
		.request_idle_callback_with_options(callback.unchecked_ref(), &options)
		.is_err()
	{
		log::debug!("diagram-engine: requestIdleCallback unavailable, using setTimeout");
		let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), 0);
	}
}

/// Run `f` once after `delay_ms`. Returns the host timer id.
pub fn set_timeout(delay_ms: u32, f: impl FnOnce() + 'static) -> Option<i32> {
	let win = window()?;
	let callback = Closure::once_into_js(f);
	win.set_timeout_with_callback_and_timeout_and_arguments_0(
		callback.unchecked_ref(),
		delay_ms.min(i32::MAX as u32) as i32,
	)
	.ok()
}

pub fn clear_timeout(id: i32) {
	if let Some(win) = window() {
		win.clear_timeout_with_handle(id);
	}
}

/// A repeating timer. Cleared when dropped.
pub struct Interval {
	id: i32,
	_callback: Closure<dyn FnMut()>,
}

impl Interval {
	pub fn new(period_ms: f64, f: impl FnMut() + 'static) -> Option<Self> {
		let win = window()?;
		let callback = Closure::<dyn FnMut()>::new(f);
		let id = win
			.set_interval_with_callback_and_timeout_and_arguments_0(
				callback.as_ref().unchecked_ref(),
				period_ms.round().clamp(1.0, i32::MAX as f64) as i32,
			)
			.ok()?;
		Some(Self {
			id,
			_callback: callback,
		})
	}
}

impl Drop for Interval {
	fn drop(&mut self) {
		if let Some(win) = window() {
			win.clear_interval_with_handle(self.id);
		}
	}
}

struct FrameInner {
	callback: Option<Closure<dyn FnMut()>>,
	pending: Option<i32>,
}

/// A self-rescheduling `requestAnimationFrame` loop.
///
/// Each frame calls the step function; the loop keeps going while it returns
/// `true` and goes dormant otherwise. [`FrameLoop::wake`] restarts a dormant
/// loop. Dropping the loop cancels any pending frame and releases the step.
pub struct FrameLoop {
	inner: Rc<RefCell<FrameInner>>,
}

impl FrameLoop {
	pub fn new(mut step: impl FnMut() -> bool + 'static) -> Self {
		let inner = Rc::new(RefCell::new(FrameInner {
			callback: None,
			pending: None,
		}));
		let weak = Rc::downgrade(&inner);
		let callback = Closure::<dyn FnMut()>::new(move || {
			let Some(inner) = weak.upgrade() else {
				return;
			};
			inner.borrow_mut().pending = None;
			if step() {
				request(&inner);
			}
		});
		inner.borrow_mut().callback = Some(callback);
		Self { inner }
	}

	/// Schedule a frame unless one is already pending.
	pub fn wake(&self) {
		if self.inner.borrow().pending.is_none() {
			request(&self.inner);
		}
	}
}

fn request(inner: &Rc<RefCell<FrameInner>>) {
	let Some(win) = window() else {
		return;
	};
	let id = {
		let guard = inner.borrow();
		let Some(cb) = guard.callback.as_ref() else {
			return;
		};
		win.request_animation_frame(cb.as_ref().unchecked_ref()).ok()
	};
	inner.borrow_mut().pending = id;
}

impl Drop for FrameLoop {
	fn drop(&mut self) {
		let mut inner = self.inner.borrow_mut();
		if let (Some(id), Some(win)) = (inner.pending.take(), window()) {
			let _ = win.cancel_animation_frame(id);
		}
		inner.callback = None;
	}
}
