//! diagram-engine: lazily activated, interactive force-directed diagrams.
//!
//! A long page hosts many diagram containers. Each diagram is built only when
//! its container approaches the viewport, animates while its layout settles
//! and then stops. Nodes can be dragged and hovered and particles flow along
//! links in periodic cycles.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod activation;
pub mod catalog;
pub mod components;
pub mod config;

pub use activation::DiagramEngine;
pub use components::diagram::{DiagramDescriptor, DiagramHandle, MountError, Theme, mount};
pub use config::EngineConfig;

/// Id of the optional script element holding engine config overrides.
pub const CONFIG_SCRIPT_ID: &str = "diagram-engine-config";
/// Id of the optional script element holding extra descriptors.
pub const DESCRIPTORS_SCRIPT_ID: &str = "diagram-descriptors";

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("diagram-engine: logging initialized");
}

fn script_text(id: &str) -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

fn load_json<T: DeserializeOwned>(id: &str) -> Option<T> {
	let json_text = script_text(id)?;
	match serde_json::from_str::<T>(&json_text) {
		Ok(value) => Some(value),
		Err(e) => {
			warn!("diagram-engine: failed to parse #{}: {}", id, e);
			None
		}
	}
}

/// Engine config from `#diagram-engine-config`, or the defaults.
pub fn load_engine_config() -> EngineConfig {
	load_json::<EngineConfig>(CONFIG_SCRIPT_ID).unwrap_or_default()
}

/// Descriptors from `#diagram-descriptors`, a JSON array.
pub fn load_extra_descriptors() -> Vec<DiagramDescriptor> {
	let extra = load_json::<Vec<DiagramDescriptor>>(DESCRIPTORS_SCRIPT_ID).unwrap_or_default();
	if !extra.is_empty() {
		info!("diagram-engine: loaded {} page descriptors", extra.len());
	}
	extra
}

fn element_exists(id: &str) -> bool {
	web_sys::window()
		.and_then(|w| w.document())
		.and_then(|d| d.get_element_by_id(id))
		.is_some()
}

/// One diagram container with its placeholder.
#[component]
fn DiagramSection(container_id: String, #[prop(optional_no_strip)] title: Option<String>) -> impl IntoView {
	view! {
		<section class="diagram-section">
			{title.map(|t| view! { <h2>{t}</h2> })}
			<div id=container_id class="diagram-container">
				<p class="diagram-placeholder">"Loading diagram…"</p>
			</div>
		</section>
	}
}

/// Main application component.
/// Lays out a section per diagram and hands every container to the engine.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let mut descriptors = catalog::builtin();
	descriptors.extend(load_extra_descriptors());

	// Containers the page already provides keep their own markup.
	let sections: Vec<(String, Option<String>)> = descriptors
		.iter()
		.filter(|d| !element_exists(&d.id))
		.map(|d| (d.id.clone(), d.title.clone()))
		.collect();

	// No reactive dependencies, so this runs once after the sections mount.
	Effect::new(move |_| {
		let engine = DiagramEngine::new(load_engine_config(), Theme::default());
		for descriptor in descriptors.clone() {
			engine.register(descriptor);
		}
		engine.start();
	});

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Architecture Diagrams" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<main class="diagram-page">
			<header>
				<h1>"Architecture"</h1>
				<p class="subtitle">"Drag nodes to reposition. Hover to trace connections."</p>
			</header>
			{sections
				.into_iter()
				.map(|(id, title)| view! { <DiagramSection container_id=id title=title /> })
				.collect_view()}
		</main>
	}
}
