//! Layout engine backed by an externally loaded vis-network script.
//!
//! The `vis` global must be present before `draw` runs; the component waits
//! on the [`LibraryLoader`](super::loader::LibraryLoader) for that.

use log::warn;
use serde_json::{Value, json};
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use super::layout::{LayoutConfig, LayoutEngine};
use super::types::LocationGraph;
use crate::error::{GraphError, Result};

#[wasm_bindgen]
extern "C" {
	#[wasm_bindgen(js_namespace = vis)]
	type Network;

	#[wasm_bindgen(constructor, js_namespace = vis, catch)]
	fn new(
		container: &HtmlElement,
		data: &JsValue,
		options: &JsValue,
	) -> std::result::Result<Network, JsValue>;

	#[wasm_bindgen(method)]
	fn fit(this: &Network, options: &JsValue);

	#[wasm_bindgen(method)]
	fn destroy(this: &Network);
}

/// Draws location graphs with `vis.Network`.
#[derive(Default)]
pub struct VisNetworkEngine {
	network: Option<Network>,
}

impl VisNetworkEngine {
	pub fn new() -> Self {
		Self::default()
	}

	fn detach(&mut self) {
		if let Some(network) = self.network.take() {
			network.destroy();
		}
	}
}

impl Drop for VisNetworkEngine {
	fn drop(&mut self) {
		self.detach();
	}
}

impl LayoutEngine for VisNetworkEngine {
	type Container = HtmlElement;

	fn draw(
		&mut self,
		container: &HtmlElement,
		graph: &LocationGraph,
		config: &LayoutConfig,
	) -> Result<()> {
		self.detach();
		let data = to_js(&network_data(graph))?;
		let options = to_js(&network_options(config))?;
		let network =
			Network::new(container, &data, &options).map_err(|e| GraphError::dom("vis.Network", e))?;
		self.network = Some(network);
		Ok(())
	}

	fn fit(&mut self) {
		let Some(network) = &self.network else {
			return;
		};
		match to_js(&json!({ "animation": true })) {
			Ok(options) => network.fit(&options),
			Err(err) => warn!("location-graph: fit skipped: {err}"),
		}
	}
}

fn to_js(value: &Value) -> Result<JsValue> {
	js_sys::JSON::parse(&value.to_string()).map_err(|e| GraphError::dom("JSON.parse", e))
}

/// `{ nodes, edges }` in the shape `vis.DataSet` accepts.
fn network_data(graph: &LocationGraph) -> Value {
	let nodes: Vec<Value> = graph
		.nodes
		.iter()
		.map(|node| {
			json!({
				"id": node.id,
				"label": node.label,
				"title": node.title,
				"value": node.value,
				"color": node.color,
				"font": { "size": node.font_size },
				"level": node.depth,
			})
		})
		.collect();
	let edges: Vec<Value> = graph
		.edges
		.iter()
		.map(|edge| json!({ "from": edge.from, "to": edge.to, "value": edge.weight }))
		.collect();
	json!({ "nodes": nodes, "edges": edges })
}

fn network_options(config: &LayoutConfig) -> Value {
	let mut edges = json!({
		"width": config.edge_width,
		"scaling": { "min": config.edge_scaling.min, "max": config.edge_scaling.max },
	});
	if let Some(color) = config.edge_color {
		edges["color"] = json!({ "color": color.to_css() });
	}
	json!({
		"nodes": { "shape": config.node_shape },
		"edges": edges,
		"physics": {
			"solver": config.solver,
			"stabilization": { "iterations": config.stabilization_iterations },
		},
		"interaction": {
			"dragNodes": config.interaction.drag_nodes,
			"zoomView": config.interaction.zoom,
			"dragView": config.interaction.pan,
		},
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::location_graph::builder::build_graph;
	use crate::components::location_graph::encoding::VisualEncoder;
	use crate::components::location_graph::theme::Color;
	use crate::components::location_graph::types::RawLocation;

	fn sample_graph() -> LocationGraph {
		let root = RawLocation::from_value(&json!({
			"Shelf A": { "Bin 1": { "component": "R1", "quantity": 5 } }
		}));
		build_graph(&root, &VisualEncoder::default())
	}

	#[test]
	fn nodes_carry_font_size_and_level() {
		let data = network_data(&sample_graph());
		let bin = &data["nodes"][1];
		assert_eq!(bin["id"], "Shelf A/Bin 1");
		assert_eq!(bin["label"], "Bin 1");
		assert_eq!(bin["title"], "R1: 5");
		assert_eq!(bin["level"], 1);
		assert!(bin["font"]["size"].is_i64());
		assert!(bin.get("fontSize").is_none());
	}

	#[test]
	fn edge_value_is_weight() {
		let data = network_data(&sample_graph());
		assert_eq!(
			data["edges"],
			json!([{ "from": "Shelf A", "to": "Shelf A/Bin 1", "value": 1 }])
		);
	}

	#[test]
	fn options_follow_layout_config() {
		let mut config = LayoutConfig::default();
		config.interaction.zoom = false;
		let options = network_options(&config);
		assert_eq!(options["nodes"]["shape"], "dot");
		assert_eq!(options["physics"]["solver"], "forceAtlas2Based");
		assert_eq!(options["physics"]["stabilization"]["iterations"], 150);
		assert_eq!(options["interaction"]["zoomView"], false);
		assert_eq!(options["interaction"]["dragNodes"], true);
		assert_eq!(options["edges"]["scaling"]["max"], 8.0);
		assert!(options["edges"].get("color").is_none());
	}

	#[test]
	fn edge_color_is_emitted_when_set() {
		let config = LayoutConfig {
			edge_color: Some(Color::rgb(0x90, 0xa4, 0xae)),
			..LayoutConfig::default()
		};
		assert_eq!(network_options(&config)["edges"]["color"]["color"], "#90a4ae");
	}
}
