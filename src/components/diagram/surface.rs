//! Mounting a diagram into its container.
//!
//! [`mount`] is the body of every diagram initializer: it replaces the
//! container's placeholder with a canvas, builds the [`DiagramState`], wires
//! pointer input and starts the frame loop and particle cycle. Everything
//! that keeps running afterwards is owned by the returned [`DiagramHandle`].

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, info};
use thiserror::Error;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent};

use crate::activation::scheduler::{FrameLoop, Interval, now_ms};
use crate::config::EngineConfig;

use super::render;
use super::state::{DiagramState, PointerTarget};
use super::theme::Theme;
use super::tooltip;
use super::types::DiagramDescriptor;

/// Width used when the container reports none (e.g. not laid out yet).
const FALLBACK_WIDTH: f64 = 640.0;
/// Longest frame step fed to hover easing, in seconds.
const MAX_FRAME_DT: f64 = 0.1;

#[derive(Debug, Error)]
pub enum MountError {
	#[error("container #{0} not found")]
	MissingContainer(String),
	#[error("no 2d rendering context for #{0}")]
	NoRenderingContext(String),
	#[error("host error: {0}")]
	Host(String),
}

fn host_err(e: JsValue) -> MountError {
	MountError::Host(format!("{e:?}"))
}

type PointerListener = Closure<dyn FnMut(MouseEvent)>;

/// Everything that runs on behalf of one mounted diagram. Dropping it is the
/// single cancellation point: pending frame, particle interval and pointer
/// listeners all go away together.
pub struct AnimationTask {
	canvas: HtmlCanvasElement,
	_frames: Rc<FrameLoop>,
	_cycle: Option<Interval>,
	listeners: Vec<(&'static str, PointerListener)>,
}

impl Drop for AnimationTask {
	fn drop(&mut self) {
		for (event, listener) in &self.listeners {
			let _ = self
				.canvas
				.remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref());
		}
	}
}

/// A mounted diagram. Dropping it stops all of its animation.
pub struct DiagramHandle {
	id: String,
	_task: AnimationTask,
}

impl DiagramHandle {
	pub fn id(&self) -> &str {
		&self.id
	}
}

/// Build the diagram described by `descriptor` inside its container.
///
/// A missing container or canvas support leaves the page untouched.
pub fn mount(
	descriptor: &DiagramDescriptor,
	config: &EngineConfig,
	theme: &Rc<Theme>,
) -> Result<DiagramHandle, MountError> {
	let window = web_sys::window().ok_or_else(|| MountError::Host("no window".into()))?;
	let document = window
		.document()
		.ok_or_else(|| MountError::Host("no document".into()))?;
	let container = document
		.get_element_by_id(&descriptor.id)
		.ok_or_else(|| MountError::MissingContainer(descriptor.id.clone()))?;

	let width = match container.client_width() {
		w if w > 0 => w as f64,
		_ => FALLBACK_WIDTH,
	};
	let viewport_height = window
		.inner_height()
		.ok()
		.and_then(|h| h.as_f64())
		.unwrap_or(800.0);
	let height = descriptor.hints.height.resolve(viewport_height);

	let canvas: HtmlCanvasElement = document
		.create_element("canvas")
		.map_err(host_err)?
		.dyn_into()
		.map_err(|_| MountError::Host("canvas element has wrong type".into()))?;
	canvas.set_width(width as u32);
	canvas.set_height(height as u32);
	canvas.set_class_name("diagram-canvas");
	let _ = canvas.set_attribute("style", "display: block; width: 100%; cursor: grab;");

	let ctx: CanvasRenderingContext2d = canvas
		.get_context("2d")
		.ok()
		.flatten()
		.and_then(|c| c.dyn_into().ok())
		.ok_or_else(|| MountError::NoRenderingContext(descriptor.id.clone()))?;

	// Only now replace the placeholder.
	container.set_inner_html("");
	container.append_child(&canvas).map_err(host_err)?;

	let state = Rc::new(RefCell::new(DiagramState::new(
		descriptor, config, theme, width, height,
	)));

	let frames = Rc::new(frame_loop(state.clone(), ctx, theme.clone()));

	let cycle = {
		let mut s = state.borrow_mut();
		match s.flow.as_ref().map(|f| f.cycle_interval_ms()) {
			Some(interval) => {
				s.start_flow_cycle(now_ms());
				let (state, frames) = (state.clone(), frames.clone());
				Interval::new(interval, move || {
					state.borrow_mut().start_flow_cycle(now_ms());
					frames.wake();
				})
			}
			None => None,
		}
	};

	let listeners = pointer_listeners(&canvas, &state, &frames)?;
	frames.wake();

	{
		let s = state.borrow();
		info!(
			"diagram-engine: mounted #{} ({} nodes, {} links) at {}x{}",
			s.id,
			s.nodes.len(),
			s.links.len(),
			width,
			height
		);
		if s.dangling_links() > 0 {
			debug!("diagram-engine: #{} has {} links that will not be drawn", s.id, s.dangling_links());
		}
	}

	Ok(DiagramHandle {
		id: descriptor.id.clone(),
		_task: AnimationTask {
			canvas,
			_frames: frames,
			_cycle: cycle,
			listeners,
		},
	})
}

fn frame_loop(state: Rc<RefCell<DiagramState>>, ctx: CanvasRenderingContext2d, theme: Rc<Theme>) -> FrameLoop {
	let last = Cell::new(None::<f64>);
	FrameLoop::new(move || {
		let now = now_ms();
		let dt = last
			.replace(Some(now))
			.map_or(0.016, |prev| ((now - prev) / 1000.0).clamp(0.0, MAX_FRAME_DT));
		let mut s = state.borrow_mut();
		let keep_going = s.tick(dt, now);
		render::render(&s, &ctx, &theme, now);
		if !keep_going {
			last.set(None);
		}
		keep_going
	})
}

/// Canvas-space pointer position, corrected for CSS scaling of the canvas.
fn pointer_position(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	let sx = if rect.width() > 0.0 {
		canvas.width() as f64 / rect.width()
	} else {
		1.0
	};
	let sy = if rect.height() > 0.0 {
		canvas.height() as f64 / rect.height()
	} else {
		1.0
	};
	(
		(ev.client_x() as f64 - rect.left()) * sx,
		(ev.client_y() as f64 - rect.top()) * sy,
	)
}

fn pointer_listeners(
	canvas: &HtmlCanvasElement,
	state: &Rc<RefCell<DiagramState>>,
	frames: &Rc<FrameLoop>,
) -> Result<Vec<(&'static str, PointerListener)>, MountError> {
	let mut listeners: Vec<(&'static str, PointerListener)> = Vec::new();

	let (s, f, c) = (state.clone(), frames.clone(), canvas.clone());
	listeners.push((
		"mousedown",
		Closure::new(move |ev: MouseEvent| {
			let (x, y) = pointer_position(&c, &ev);
			if let PointerTarget::Node(_) = s.borrow_mut().pointer_down(x, y) {
				ev.prevent_default();
				tooltip::hide();
				let _ = c.style().set_property("cursor", "grabbing");
				f.wake();
			}
		}),
	));

	let (s, f, c) = (state.clone(), frames.clone(), canvas.clone());
	listeners.push((
		"mousemove",
		Closure::new(move |ev: MouseEvent| {
			let (x, y) = pointer_position(&c, &ev);
			let mut st = s.borrow_mut();
			let changed = st.pointer_move(x, y);
			if st.drag.is_dragging() {
				tooltip::hide();
			} else {
				match st.tooltip() {
					Some(content) => tooltip::show(&content, ev.page_x() as f64, ev.page_y() as f64),
					None => tooltip::hide(),
				}
			}
			if changed {
				f.wake();
			}
		}),
	));

	let (s, f, c) = (state.clone(), frames.clone(), canvas.clone());
	listeners.push((
		"mouseup",
		Closure::new(move |_: MouseEvent| {
			if s.borrow_mut().pointer_up().is_some() {
				let _ = c.style().set_property("cursor", "grab");
				f.wake();
			}
		}),
	));

	let (s, f, c) = (state.clone(), frames.clone(), canvas.clone());
	listeners.push((
		"mouseleave",
		Closure::new(move |_: MouseEvent| {
			s.borrow_mut().pointer_leave();
			tooltip::hide();
			let _ = c.style().set_property("cursor", "grab");
			f.wake();
		}),
	));

	for (event, listener) in &listeners {
		canvas
			.add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())
			.map_err(host_err)?;
	}
	Ok(listeners)
}
