//! Hand-off from a built [`LocationGraph`] to a force-directed layout engine.
//!
//! The adapter owns nothing but the engine and its static [`LayoutConfig`].
//! It passes the graph through untouched, then asks the engine to frame the
//! result. Engines decide how much of the config they understand; options an
//! engine takes as JSON get the config verbatim.

use log::info;
use serde::{Deserialize, Serialize};

use super::theme::Color;
use super::types::LocationGraph;
use crate::error::Result;

/// Edge-weight to line-width scaling bounds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidthScaling {
	pub min: f64,
	pub max: f64,
}

impl Default for WidthScaling {
	fn default() -> Self {
		Self { min: 1.0, max: 8.0 }
	}
}

impl WidthScaling {
	/// Linear map of `weight` in `[1, max_weight]` onto `[min, max]`.
	pub fn width_for(&self, weight: u32, max_weight: u32) -> f64 {
		let (lo, hi) = (self.min.min(self.max), self.min.max(self.max));
		if max_weight <= 1 {
			return lo;
		}
		let t = (weight.saturating_sub(1)) as f64 / (max_weight - 1) as f64;
		lo + (hi - lo) * t.clamp(0.0, 1.0)
	}
}

/// Which user interactions the engine should allow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Interaction {
	pub drag_nodes: bool,
	pub zoom: bool,
	pub pan: bool,
}

impl Default for Interaction {
	fn default() -> Self {
		Self {
			drag_nodes: true,
			zoom: true,
			pan: true,
		}
	}
}

/// Static engine configuration, passed through without interpretation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
	/// Node shape name, e.g. `"dot"` or `"box"`.
	pub node_shape: String,
	/// Edge color; engines fall back to their theme when unset.
	pub edge_color: Option<Color>,
	/// Base edge width.
	pub edge_width: f64,
	/// Bounds for mapping edge weight onto width.
	pub edge_scaling: WidthScaling,
	/// Physics solver identifier, e.g. `"forceAtlas2Based"`.
	pub solver: String,
	/// Simulation steps to run before the first frame.
	pub stabilization_iterations: u32,
	pub interaction: Interaction,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			node_shape: "dot".to_string(),
			edge_color: None,
			edge_width: 1.5,
			edge_scaling: WidthScaling::default(),
			solver: "forceAtlas2Based".to_string(),
			stabilization_iterations: 150,
			interaction: Interaction::default(),
		}
	}
}

/// A force-directed rendering engine.
pub trait LayoutEngine {
	/// Where the engine draws, e.g. an HTML element.
	type Container: ?Sized;

	/// Replaces whatever the engine shows with `graph`.
	fn draw(
		&mut self,
		container: &Self::Container,
		graph: &LocationGraph,
		config: &LayoutConfig,
	) -> Result<()>;

	/// Frames the viewport around the drawn graph.
	fn fit(&mut self);
}

/// Forwards built graphs to a [`LayoutEngine`].
pub struct GraphLayoutAdapter<E> {
	engine: E,
	config: LayoutConfig,
}

impl<E: LayoutEngine> GraphLayoutAdapter<E> {
	pub fn new(engine: E, config: LayoutConfig) -> Self {
		Self { engine, config }
	}

	/// Draws `graph` into `container` and fits the view to it.
	pub fn render(&mut self, container: &E::Container, graph: &LocationGraph) -> Result<()> {
		self.engine.draw(container, graph, &self.config)?;
		self.engine.fit();
		info!(
			"location-graph: rendered {} nodes, {} edges",
			graph.nodes.len(),
			graph.edges.len()
		);
		Ok(())
	}

	/// Re-frames the viewport without redrawing.
	pub fn fit(&mut self) {
		self.engine.fit();
	}

	pub fn config(&self) -> &LayoutConfig {
		&self.config
	}

	pub fn engine(&self) -> &E {
		&self.engine
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::components::location_graph::builder::build_graph;
	use crate::components::location_graph::encoding::VisualEncoder;
	use crate::components::location_graph::types::RawLocation;
	use crate::error::GraphError;

	#[derive(Default)]
	struct RecordingEngine {
		calls: Vec<&'static str>,
		drawn: Option<LocationGraph>,
		config: Option<LayoutConfig>,
		fail: bool,
	}

	impl LayoutEngine for RecordingEngine {
		type Container = str;

		fn draw(
			&mut self,
			container: &str,
			graph: &LocationGraph,
			config: &LayoutConfig,
		) -> Result<()> {
			assert_eq!(container, "graph-root");
			self.calls.push("draw");
			if self.fail {
				return Err(GraphError::Dom("no canvas".into()));
			}
			self.drawn = Some(graph.clone());
			self.config = Some(config.clone());
			Ok(())
		}

		fn fit(&mut self) {
			self.calls.push("fit");
		}
	}

	fn sample_graph() -> LocationGraph {
		let raw = RawLocation::from_value(&json!({
			"Shelf A": {"Bin 1": {"component": "R1", "quantity": 5}, "Bin 2": {}},
			"Shelf A/": {"Bin 1": {}},
		}));
		build_graph(&raw, &VisualEncoder::default())
	}

	#[test]
	fn forwards_graph_unchanged_then_fits() {
		let graph = sample_graph();
		let config = LayoutConfig {
			solver: "repulsion".into(),
			..LayoutConfig::default()
		};
		let mut adapter = GraphLayoutAdapter::new(RecordingEngine::default(), config.clone());

		adapter.render("graph-root", &graph).unwrap();

		let engine = adapter.engine();
		assert_eq!(engine.calls, ["draw", "fit"]);
		assert_eq!(engine.drawn.as_ref(), Some(&graph));
		assert_eq!(engine.config.as_ref(), Some(&config));
	}

	#[test]
	fn draw_failure_skips_fit() {
		let engine = RecordingEngine {
			fail: true,
			..RecordingEngine::default()
		};
		let mut adapter = GraphLayoutAdapter::new(engine, LayoutConfig::default());

		let err = adapter.render("graph-root", &sample_graph()).unwrap_err();
		assert!(matches!(err, GraphError::Dom(_)));
		assert_eq!(adapter.engine().calls, ["draw"]);
	}

	#[test]
	fn refit_does_not_redraw() {
		let mut adapter = GraphLayoutAdapter::new(RecordingEngine::default(), LayoutConfig::default());
		adapter.render("graph-root", &sample_graph()).unwrap();
		adapter.fit();
		assert_eq!(adapter.engine().calls, ["draw", "fit", "fit"]);
	}

	#[test]
	fn width_scaling_spans_bounds() {
		let scaling = WidthScaling { min: 1.0, max: 5.0 };
		assert_eq!(scaling.width_for(1, 1), 1.0);
		assert_eq!(scaling.width_for(1, 3), 1.0);
		assert_eq!(scaling.width_for(2, 3), 3.0);
		assert_eq!(scaling.width_for(3, 3), 5.0);
		assert_eq!(scaling.width_for(9, 3), 5.0);
	}

	#[test]
	fn width_scaling_tolerates_swapped_bounds() {
		let scaling = WidthScaling { min: 6.0, max: 2.0 };
		assert_eq!(scaling.width_for(1, 4), 2.0);
		assert_eq!(scaling.width_for(4, 4), 6.0);
	}

	#[test]
	fn layout_config_round_trips_camel_case() {
		let config: LayoutConfig = serde_json::from_value(json!({
			"nodeShape": "box",
			"edgeColor": "#888888",
			"stabilizationIterations": 40,
			"interaction": {"zoom": false},
		}))
		.unwrap();
		assert_eq!(config.node_shape, "box");
		assert_eq!(config.edge_color, Some(Color::rgb(0x88, 0x88, 0x88)));
		assert_eq!(config.stabilization_iterations, 40);
		assert!(!config.interaction.zoom);
		assert!(config.interaction.pan);
		assert_eq!(config.solver, "forceAtlas2Based");

		let value = serde_json::to_value(&config).unwrap();
		assert_eq!(value["edgeScaling"]["max"], 8.0);
	}
}
