//! The shared tooltip.
//!
//! One `div.diagram-tooltip` serves every diagram on the page. It is created
//! on first use; whichever diagram writes to it last wins.

use std::cell::RefCell;

use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

const TOOLTIP_CLASS: &str = "diagram-tooltip";
const TOOLTIP_STYLE: &str = "position: absolute; display: none; pointer-events: none; \
	white-space: pre-line; z-index: 1000; padding: 6px 10px; border-radius: 4px; \
	font: 12px sans-serif; color: #e6edf3; background: rgba(22, 27, 34, 0.95); \
	border: 1px solid rgba(140, 160, 180, 0.4); max-width: 280px;";
/// Offset from the pointer so the tooltip never sits under it.
const POINTER_OFFSET: f64 = 14.0;

/// What a tooltip says about a node.
#[derive(Clone, Debug, PartialEq)]
pub struct TooltipContent {
	pub title: String,
	pub lines: Vec<String>,
}

impl TooltipContent {
	pub fn for_node(label: &str, sublabel: Option<&str>, category: &str, connections: usize) -> Self {
		let mut lines = Vec::new();
		if let Some(sub) = sublabel {
			lines.push(sub.to_string());
		}
		if !category.is_empty() {
			lines.push(format!("category: {category}"));
		}
		lines.push(match connections {
			1 => "1 connection".to_string(),
			n => format!("{n} connections"),
		});
		Self {
			title: label.to_string(),
			lines,
		}
	}

	/// Plain text rendering, one entry per line.
	pub fn to_text(&self) -> String {
		std::iter::once(self.title.as_str())
			.chain(self.lines.iter().map(String::as_str))
			.collect::<Vec<_>>()
			.join("\n")
	}
}

thread_local! {
	static TOOLTIP: RefCell<Option<HtmlElement>> = const { RefCell::new(None) };
}

/// Value in `slot`, creating it with `init` if absent. A failed `init` is
/// not remembered, so the next call tries again.
fn get_or_try_init<T: Clone>(slot: &RefCell<Option<T>>, init: impl FnOnce() -> Option<T>) -> Option<T> {
	if let Some(value) = slot.borrow().as_ref() {
		return Some(value.clone());
	}
	let value = init()?;
	*slot.borrow_mut() = Some(value.clone());
	Some(value)
}

fn create_tooltip() -> Option<HtmlElement> {
	let document = web_sys::window()?.document()?;
	let body = document.body()?;
	let el: HtmlElement = document.create_element("div").ok()?.dyn_into().ok()?;
	el.set_class_name(TOOLTIP_CLASS);
	el.set_attribute("style", TOOLTIP_STYLE).ok()?;
	body.append_child(&el).ok()?;
	log::debug!("diagram-engine: tooltip created");
	Some(el)
}

fn with_tooltip(f: impl FnOnce(&HtmlElement)) {
	if let Some(el) = TOOLTIP.with(|slot| get_or_try_init(slot, create_tooltip)) {
		f(&el);
	}
}

/// Show `content` next to the pointer at page coordinates `(x, y)`.
pub fn show(content: &TooltipContent, x: f64, y: f64) {
	with_tooltip(|el| {
		el.set_text_content(Some(&content.to_text()));
		let style = el.style();
		let _ = style.set_property("left", &format!("{}px", x + POINTER_OFFSET));
		let _ = style.set_property("top", &format!("{}px", y + POINTER_OFFSET));
		let _ = style.set_property("display", "block");
	});
}

pub fn hide() {
	TOOLTIP.with(|slot| {
		if let Some(el) = slot.borrow().as_ref() {
			let _ = el.style().set_property("display", "none");
		}
	});
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn node_content_lists_details() {
		let c = TooltipContent::for_node("API Gateway", Some("rate limited"), "gateway", 3);
		assert_eq!(c.title, "API Gateway");
		assert_eq!(
			c.lines,
			vec!["rate limited", "category: gateway", "3 connections"]
		);
		assert_eq!(
			c.to_text(),
			"API Gateway\nrate limited\ncategory: gateway\n3 connections"
		);
	}

	#[test]
	fn failed_creation_is_retried() {
		let slot = RefCell::new(None);
		assert_eq!(get_or_try_init(&slot, || None::<u32>), None);
		assert_eq!(get_or_try_init(&slot, || Some(7)), Some(7));
		// Created once, never replaced.
		assert_eq!(get_or_try_init(&slot, || Some(8)), Some(7));
	}

	#[test]
	fn sparse_node_content() {
		let c = TooltipContent::for_node("Cache", None, "", 1);
		assert_eq!(c.to_text(), "Cache\n1 connection");
	}
}
