//! location-graph: force-directed visualization of nested inventory storage locations.
//!
//! The page embeds a JSON tree of locations (shelves, bins, drawers, each
//! optionally holding a component and a quantity). This crate turns that tree
//! into a deduplicated, weighted graph and draws it with a physics-based
//! layout, either on a canvas or through vis-network.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;
pub mod config;
pub mod error;

pub use components::location_graph::{
	GraphEdge, GraphNode, LocationGraph, LocationGraphView, RawLocation, build_graph,
};
pub use config::{EngineKind, GraphConfig};
pub use error::GraphError;

/// Element holding the location payload.
const DATA_ELEMENT_ID: &str = "location-data";
/// Element holding the optional view configuration.
const CONFIG_ELEMENT_ID: &str = "location-graph-config";

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("location-graph: logging initialized");
}

/// Text content of the `<script>` element with the given id.
fn script_text(id: &str) -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Load the location tree from `<script id="location-data">`.
fn load_location_payload() -> Option<RawLocation> {
	let json_text = script_text(DATA_ELEMENT_ID)?;

	match RawLocation::from_json_str(&json_text) {
		Ok(root) => {
			info!(
				"location-graph: loaded {} root locations",
				root.locations().count()
			);
			Some(root)
		}
		Err(e) => {
			warn!("location-graph: {}", e);
			None
		}
	}
}

/// Load the view configuration, falling back to defaults.
fn load_config() -> GraphConfig {
	let Some(json_text) = script_text(CONFIG_ELEMENT_ID) else {
		return GraphConfig::default();
	};
	GraphConfig::from_json_str(&json_text).unwrap_or_else(|e| {
		warn!("location-graph: {}, using defaults", e);
		GraphConfig::default()
	})
}

/// Main application component.
/// Loads the locations and config from the DOM and renders the graph.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let root = load_location_payload().unwrap_or_default();
	let location_signal = Signal::derive(move || root.clone());
	let config = load_config();

	view! {
		<Html attr:lang="en" attr:dir="ltr" />
		<Title text="Inventory Locations" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<LocationGraphView data=location_signal config=config />
			<div class="graph-overlay">
				<h1>"Inventory Locations"</h1>
				<p class="subtitle">
					"Hover a location to see its contents. Drag to rearrange, scroll to zoom."
				</p>
			</div>
		</div>
	}
}
