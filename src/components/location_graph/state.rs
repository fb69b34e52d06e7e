//! Canvas engine simulation state and interaction tracking.
//!
//! Wraps the `force_graph` physics simulation with per-node display data
//! taken from the built graph, a pan/zoom transform, and hover highlight
//! state with smooth intensity transitions.

use std::collections::{HashMap, HashSet};

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::layout::{Interaction, LayoutConfig};
use super::theme::Color;
use super::types::LocationGraph;

/// Fixed simulation step used for stabilization and animation.
pub const FRAME_DT: f32 = 0.016;

/// World-space radius per unit of node `value`.
const RADIUS_PER_VALUE: f64 = 0.5;

/// Zoom bounds for wheel zoom and fitting.
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

/// How nodes are outlined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NodeShape {
	#[default]
	Dot,
	Square,
}

impl NodeShape {
	/// Unknown shape names draw as dots.
	pub fn from_name(name: &str) -> Self {
		match name {
			"box" | "square" => NodeShape::Square,
			_ => NodeShape::Dot,
		}
	}
}

/// Per-node display data attached to each simulated node.
#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub id: String,
	pub label: String,
	pub title: String,
	pub color: Color,
	/// World-space radius.
	pub radius: f64,
	/// World-space label size.
	pub font_size: f64,
}

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor (1.0 = 100%, clamped to `MIN_ZOOM..MAX_ZOOM`).
	pub k: f64,
}

/// Tracks an in-progress node drag operation.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Hovered node plus its neighbors, each with an intensity in `[0, 1]` that
/// eases towards 1 while highlighted and decays back to 0 afterwards.
#[derive(Clone, Debug, Default)]
pub struct HighlightState {
	pub hovered_node: Option<DefaultNodeIdx>,
	target_set: HashSet<DefaultNodeIdx>,
	node_intensity: HashMap<DefaultNodeIdx, f64>,
	cached_max: f64,
}

impl HighlightState {
	pub fn set_hover(
		&mut self,
		node: Option<DefaultNodeIdx>,
		edges: &[(DefaultNodeIdx, DefaultNodeIdx)],
	) {
		if self.hovered_node == node {
			return;
		}
		self.hovered_node = node;
		self.target_set.clear();

		if let Some(idx) = node {
			self.target_set.insert(idx);
			for &(src, tgt) in edges {
				if src == idx {
					self.target_set.insert(tgt);
				} else if tgt == idx {
					self.target_set.insert(src);
				}
			}
		}
	}

	/// Exponential smoothing: value += (target - value) * (1 - e^(-speed * dt)).
	pub fn tick(&mut self, dt: f64) {
		const FADE_IN_SPEED: f64 = 6.0;
		const FADE_OUT_SPEED: f64 = 4.0;

		let fade_in = 1.0 - (-FADE_IN_SPEED * dt).exp();
		let fade_out = (-FADE_OUT_SPEED * dt).exp();

		for &idx in &self.target_set {
			let intensity = self.node_intensity.entry(idx).or_insert(0.0);
			*intensity += (1.0 - *intensity) * fade_in;
		}

		let mut new_max: f64 = 0.0;
		let targets = &self.target_set;
		self.node_intensity.retain(|idx, intensity| {
			if !targets.contains(idx) {
				*intensity *= fade_out;
			}
			new_max = new_max.max(*intensity);
			*intensity > 0.005
		});
		self.cached_max = new_max;
	}

	pub fn node_intensity(&self, idx: DefaultNodeIdx) -> f64 {
		self.node_intensity.get(&idx).copied().unwrap_or(0.0)
	}

	/// Geometric mean of the endpoint intensities.
	pub fn edge_intensity(&self, idx1: DefaultNodeIdx, idx2: DefaultNodeIdx) -> f64 {
		(self.node_intensity(idx1) * self.node_intensity(idx2)).sqrt()
	}

	pub fn max_intensity(&self) -> f64 {
		self.cached_max
	}
}

/// Physics presets keyed by solver name.
pub fn simulation_parameters(solver: &str) -> SimulationParameters {
	match solver {
		"repulsion" => SimulationParameters {
			force_charge: 250.0,
			force_spring: 0.03,
			force_max: 140.0,
			node_speed: 3000.0,
			damping_factor: 0.85,
		},
		"hierarchicalRepulsion" => SimulationParameters {
			force_charge: 200.0,
			force_spring: 0.08,
			force_max: 120.0,
			node_speed: 2500.0,
			damping_factor: 0.8,
		},
		// forceAtlas2Based, barnesHut and anything unrecognized.
		_ => SimulationParameters {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		},
	}
}

/// Simulation plus view state for one drawn graph.
pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub highlight: HighlightState,
	pub interaction: Interaction,
	pub node_shape: NodeShape,
	pub width: f64,
	pub height: f64,
	edges: Vec<(DefaultNodeIdx, DefaultNodeIdx)>,
	edge_widths: HashMap<(DefaultNodeIdx, DefaultNodeIdx), f64>,
}

impl ForceGraphState {
	pub fn new(data: &LocationGraph, config: &LayoutConfig, width: f64, height: f64) -> Self {
		let mut graph = ForceGraph::new(simulation_parameters(&config.solver));
		let mut id_to_idx = HashMap::new();

		for (i, node) in data.nodes.iter().enumerate() {
			// Seed rings by depth so the simulation starts close to a tree layout.
			let angle = (i as f64) * 2.399_963;
			let ring = 60.0 * (node.depth as f64 + 1.0);
			let (x, y) = (
				(width / 2.0 + ring * angle.cos()) as f32,
				(height / 2.0 + ring * angle.sin()) as f32,
			);
			let radius = node.value * RADIUS_PER_VALUE;

			let idx = graph.add_node(NodeData {
				x,
				y,
				mass: 10.0 + radius as f32,
				is_anchor: false,
				user_data: NodeInfo {
					id: node.id.clone(),
					label: node.label.clone(),
					title: node.title.clone(),
					color: Color::from_hex(&node.color).unwrap_or(Color::rgb(128, 128, 128)),
					radius,
					font_size: node.font_size as f64,
				},
			});
			id_to_idx.insert(node.id.clone(), idx);
		}

		let max_weight = data.max_weight();
		let mut edges = Vec::with_capacity(data.edges.len());
		let mut edge_widths = HashMap::with_capacity(data.edges.len());
		for edge in &data.edges {
			if let (Some(&src), Some(&tgt)) = (id_to_idx.get(&edge.from), id_to_idx.get(&edge.to)) {
				graph.add_edge(src, tgt, EdgeData::default());
				edges.push((src, tgt));
				edge_widths.insert(
					(src, tgt),
					config.edge_scaling.width_for(edge.weight, max_weight),
				);
			}
		}

		Self {
			graph,
			transform: ViewTransform {
				x: 0.0,
				y: 0.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			highlight: HighlightState::default(),
			interaction: config.interaction,
			node_shape: NodeShape::from_name(&config.node_shape),
			width,
			height,
			edges,
			edge_widths,
		}
	}

	/// Runs `iterations` physics steps without drawing.
	pub fn stabilize(&mut self, iterations: u32) {
		for _ in 0..iterations {
			self.graph.update(FRAME_DT);
		}
	}

	/// Sets the transform so every node fits inside the viewport with `padding`
	/// screen pixels to spare.
	pub fn fit(&mut self, padding: f64) {
		let mut bounds: Option<(f64, f64, f64, f64)> = None;
		self.graph.visit_nodes(|node| {
			let (x, y, r) = (node.x() as f64, node.y() as f64, node.data.user_data.radius);
			bounds = Some(match bounds {
				None => (x - r, y - r, x + r, y + r),
				Some((x0, y0, x1, y1)) => {
					(x0.min(x - r), y0.min(y - r), x1.max(x + r), y1.max(y + r))
				}
			});
		});

		let Some((x0, y0, x1, y1)) = bounds else {
			self.transform = ViewTransform {
				x: 0.0,
				y: 0.0,
				k: 1.0,
			};
			return;
		};

		let (bw, bh) = ((x1 - x0).max(1.0), (y1 - y0).max(1.0));
		let avail_w = (self.width - 2.0 * padding).max(1.0);
		let avail_h = (self.height - 2.0 * padding).max(1.0);
		let k = (avail_w / bw).min(avail_h / bh).clamp(MIN_ZOOM, MAX_ZOOM);
		let (cx, cy) = ((x0 + x1) / 2.0, (y0 + y1) / 2.0);

		self.transform = ViewTransform {
			x: self.width / 2.0 - cx * k,
			y: self.height / 2.0 - cy * k,
			k,
		};
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node under the screen point, if any.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		// Keep small nodes clickable when zoomed out.
		let min_hit = 5.0 / self.transform.k;
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			let hit_radius = node.data.user_data.radius.max(min_hit);
			if (dx * dx + dy * dy).sqrt() < hit_radius {
				found = Some(node.index());
			}
		});
		found
	}

	/// Hover text: the full path, plus the stored contents when there are any.
	pub fn node_tooltip(&self, idx: DefaultNodeIdx) -> Option<String> {
		let mut tooltip = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				let info = &node.data.user_data;
				tooltip = Some(if info.title == info.label {
					info.id.clone()
				} else {
					format!("{}\n{}", info.id, info.title)
				});
			}
		});
		tooltip
	}

	/// Width for the edge between `src` and `tgt`, in screen pixels.
	pub fn edge_width(&self, src: DefaultNodeIdx, tgt: DefaultNodeIdx) -> Option<f64> {
		self.edge_widths.get(&(src, tgt)).copied()
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		self.highlight.set_hover(node, &self.edges);
	}

	pub fn tick(&mut self, dt: f32) {
		self.graph.update(dt);
		self.highlight.tick(dt as f64);
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::components::location_graph::builder::build_graph;
	use crate::components::location_graph::encoding::VisualEncoder;
	use crate::components::location_graph::layout::WidthScaling;
	use crate::components::location_graph::types::RawLocation;

	impl ForceGraphState {
		fn node_index(&self, id: &str) -> Option<DefaultNodeIdx> {
			let mut found = None;
			self.graph.visit_nodes(|node| {
				if node.data.user_data.id == id {
					found = Some(node.index());
				}
			});
			found
		}

		fn edge_count(&self) -> usize {
			self.edges.len()
		}
	}

	fn sample() -> LocationGraph {
		let raw = RawLocation::from_value(&json!({
			"Shelf A": {"Bin 1": {"component": "R1", "quantity": 5}, "Bin 2": {}},
			"Shelf A/": {"Bin 1": {}},
		}));
		build_graph(&raw, &VisualEncoder::default())
	}

	fn position(state: &ForceGraphState, idx: DefaultNodeIdx) -> (f64, f64) {
		let mut pos = (0.0, 0.0);
		state.graph.visit_nodes(|node| {
			if node.index() == idx {
				pos = (node.x() as f64, node.y() as f64);
			}
		});
		pos
	}

	#[test]
	fn maps_every_node_and_edge() {
		let graph = sample();
		let state = ForceGraphState::new(&graph, &LayoutConfig::default(), 800.0, 600.0);

		for node in &graph.nodes {
			assert!(state.node_index(&node.id).is_some(), "missing {}", node.id);
		}
		assert_eq!(state.edge_count(), graph.edges.len());

		let bin = state.node_index("Shelf A/Bin 1").unwrap();
		assert_eq!(state.node_tooltip(bin).as_deref(), Some("Shelf A/Bin 1\nR1: 5"));
		let shelf = state.node_index("Shelf A").unwrap();
		assert_eq!(state.node_tooltip(shelf).as_deref(), Some("Shelf A"));
	}

	#[test]
	fn edge_width_follows_weight() {
		let graph = sample();
		let config = LayoutConfig {
			edge_scaling: WidthScaling { min: 1.0, max: 4.0 },
			..LayoutConfig::default()
		};
		let state = ForceGraphState::new(&graph, &config, 800.0, 600.0);

		let shelf = state.node_index("Shelf A").unwrap();
		let heavy = state.node_index("Shelf A/Bin 1").unwrap();
		let light = state.node_index("Shelf A/Bin 2").unwrap();
		assert_eq!(state.edge_width(shelf, heavy), Some(4.0));
		assert_eq!(state.edge_width(shelf, light), Some(1.0));
		assert_eq!(state.edge_width(heavy, shelf), None);
	}

	#[test]
	fn fit_centers_nodes_in_viewport() {
		let graph = sample();
		let mut state = ForceGraphState::new(&graph, &LayoutConfig::default(), 800.0, 600.0);
		state.stabilize(20);
		state.fit(40.0);

		assert!((MIN_ZOOM..=MAX_ZOOM).contains(&state.transform.k));
		for node in &graph.nodes {
			let idx = state.node_index(&node.id).unwrap();
			let (gx, gy) = position(&state, idx);
			let sx = gx * state.transform.k + state.transform.x;
			let sy = gy * state.transform.k + state.transform.y;
			assert!((0.0..=800.0).contains(&sx), "{} at x={sx}", node.id);
			assert!((0.0..=600.0).contains(&sy), "{} at y={sy}", node.id);
		}
	}

	#[test]
	fn fit_on_empty_graph_resets_transform() {
		let mut state =
			ForceGraphState::new(&LocationGraph::default(), &LayoutConfig::default(), 800.0, 600.0);
		state.fit(40.0);
		assert_eq!(state.transform.k, 1.0);
	}

	#[test]
	fn hit_test_finds_node_under_cursor() {
		let graph = sample();
		let mut state = ForceGraphState::new(&graph, &LayoutConfig::default(), 800.0, 600.0);
		state.fit(40.0);

		let idx = state.node_index("Shelf A/Bin 2").unwrap();
		let (gx, gy) = position(&state, idx);
		let (sx, sy) = (
			gx * state.transform.k + state.transform.x,
			gy * state.transform.k + state.transform.y,
		);
		assert_eq!(state.node_at_position(sx, sy), Some(idx));
	}

	#[test]
	fn hover_highlights_neighbors_and_fades() {
		let graph = sample();
		let mut state = ForceGraphState::new(&graph, &LayoutConfig::default(), 800.0, 600.0);
		let shelf = state.node_index("Shelf A").unwrap();
		let bin = state.node_index("Shelf A/Bin 1").unwrap();

		state.set_hover(Some(bin));
		for _ in 0..30 {
			state.highlight.tick(0.016);
		}
		assert!(state.highlight.node_intensity(bin) > 0.9);
		assert!(state.highlight.node_intensity(shelf) > 0.9);

		state.set_hover(None);
		for _ in 0..200 {
			state.highlight.tick(0.016);
		}
		assert_eq!(state.highlight.node_intensity(bin), 0.0);
		assert_eq!(state.highlight.max_intensity(), 0.0);
	}

	#[test]
	fn solver_and_shape_names() {
		assert_eq!(simulation_parameters("repulsion").force_charge, 250.0);
		assert_eq!(simulation_parameters("unknown").damping_factor, 0.9);
		assert_eq!(NodeShape::from_name("box"), NodeShape::Square);
		assert_eq!(NodeShape::from_name("star"), NodeShape::Dot);
	}
}
