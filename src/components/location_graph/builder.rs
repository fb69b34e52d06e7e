//! Builds the deduplicated location graph from a nested payload.
//!
//! The walk is depth-first, pre-order. Node identity is the normalized full
//! path, so the same location reached along two routes (for instance keys
//! that differ only by trailing separators or whitespace) collapses into one
//! node whose `link_count` records every arrival, and a repeated parent/child
//! pair bumps the edge weight instead of adding a second edge.
//!
//! Nodes and edges live in plain vectors and are only ever addressed through
//! the id → index maps, so the returned graph holds no references back into
//! the builder.

use std::collections::HashMap;

use log::{debug, trace};

use super::encoding::VisualEncoder;
use super::path;
use super::types::{GraphEdge, GraphNode, LocationEntry, LocationGraph, RawLocation};

/// Single-use graph builder. Lookup state lives only as long as one build.
pub struct GraphBuilder<'a> {
	encoder: &'a VisualEncoder,
	nodes: Vec<GraphNode>,
	edges: Vec<GraphEdge>,
	node_index: HashMap<String, usize>,
	edge_index: HashMap<(String, String), usize>,
}

impl<'a> GraphBuilder<'a> {
	pub fn new(encoder: &'a VisualEncoder) -> Self {
		Self {
			encoder,
			nodes: Vec::new(),
			edges: Vec::new(),
			node_index: HashMap::new(),
			edge_index: HashMap::new(),
		}
	}

	/// Walks `root` and returns the finished graph. Never fails: entries that
	/// are not locations are skipped.
	pub fn build(mut self, root: &RawLocation) -> LocationGraph {
		self.walk(root, None, 0);
		debug!(
			"location-graph: built {} nodes, {} edges",
			self.nodes.len(),
			self.edges.len()
		);
		LocationGraph {
			nodes: self.nodes,
			edges: self.edges,
		}
	}

	fn walk(&mut self, location: &RawLocation, parent: Option<&str>, depth: usize) {
		for (key, entry) in &location.children {
			let child = match entry {
				LocationEntry::Location(child) => child,
				LocationEntry::Unknown => {
					trace!("location-graph: skipping non-location entry {key:?} at depth {depth}");
					continue;
				}
			};

			let id = path::join(parent.unwrap_or(""), key);
			self.visit_node(&id, key, child, depth);

			if let Some(parent) = parent.filter(|p| *p != id) {
				self.visit_edge(parent, &id);
			}

			self.walk(child, Some(id.as_str()), depth + 1);
		}
	}

	/// Records one arrival at `id`, creating the node on first sight.
	fn visit_node(&mut self, id: &str, key: &str, location: &RawLocation, depth: usize) {
		if let Some(&idx) = self.node_index.get(id) {
			let node = &mut self.nodes[idx];
			node.link_count += 1;
			node.value = self.encoder.size_for_link_count(node.link_count.into());
			return;
		}

		let label = path::normalize(key);
		let title = location.leaf.summary().unwrap_or_else(|| label.clone());
		self.node_index.insert(id.to_string(), self.nodes.len());
		self.nodes.push(GraphNode {
			id: id.to_string(),
			label,
			title,
			depth,
			color: self.encoder.color_css(depth),
			font_size: self.encoder.font_size(depth),
			value: self.encoder.size_for_link_count(1),
			link_count: 1,
		});
	}

	fn visit_edge(&mut self, from: &str, to: &str) {
		let pair = (from.to_string(), to.to_string());
		if let Some(&idx) = self.edge_index.get(&pair) {
			self.edges[idx].weight += 1;
			return;
		}

		self.edge_index.insert(pair, self.edges.len());
		self.edges.push(GraphEdge {
			from: from.to_string(),
			to: to.to_string(),
			weight: 1,
		});
	}
}

/// Builds a graph from `root` with a fresh [`GraphBuilder`].
pub fn build_graph(root: &RawLocation, encoder: &VisualEncoder) -> LocationGraph {
	GraphBuilder::new(encoder).build(root)
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use serde_json::{Value, json};

	use super::*;
	use crate::components::location_graph::encoding::EncodingConfig;

	fn build(value: Value) -> LocationGraph {
		build_graph(&RawLocation::from_value(&value), &VisualEncoder::default())
	}

	fn assert_well_formed(graph: &LocationGraph) {
		let mut ids = HashSet::new();
		for node in &graph.nodes {
			assert!(ids.insert(node.id.as_str()), "duplicate node {}", node.id);
		}
		for edge in &graph.edges {
			assert_ne!(edge.from, edge.to, "self edge on {}", edge.from);
			assert!(ids.contains(edge.from.as_str()));
			assert!(ids.contains(edge.to.as_str()));
		}
	}

	#[test]
	fn single_bin_under_shelf() {
		let graph = build(json!({"Shelf A": {"Bin 1": {"component": "R1", "quantity": 5}}}));

		assert_eq!(graph.nodes.len(), 2);
		let shelf = &graph.nodes[0];
		assert_eq!((shelf.id.as_str(), shelf.depth), ("Shelf A", 0));
		assert_eq!(shelf.title, "Shelf A");

		let bin = &graph.nodes[1];
		assert_eq!((bin.id.as_str(), bin.label.as_str(), bin.depth), ("Shelf A/Bin 1", "Bin 1", 1));
		assert!(bin.title.contains("R1"));
		assert!(bin.title.contains('5'));

		assert_eq!(
			graph.edges,
			vec![GraphEdge {
				from: "Shelf A".into(),
				to: "Shelf A/Bin 1".into(),
				weight: 1,
			}]
		);
	}

	#[test]
	fn revisited_path_merges_node_and_edge() {
		let graph = build(json!({
			"Shelf A": {"Bin 1": {"component": "R1"}},
			"Shelf A/": {"Bin 1": {"component": "R2"}},
		}));
		assert_well_formed(&graph);

		let ids: Vec<_> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, ["Shelf A", "Shelf A/Bin 1"]);

		let bin = graph.node("Shelf A/Bin 1").unwrap();
		assert_eq!(bin.link_count, 2);
		assert_eq!(bin.value, VisualEncoder::default().size_for_link_count(2));
		// First discovery wins for everything except the size.
		assert_eq!(bin.title, "R1");

		assert_eq!(graph.edges.len(), 1);
		assert_eq!(graph.edge("Shelf A", "Shelf A/Bin 1").unwrap().weight, 2);
	}

	#[test]
	fn weight_counts_every_route_to_a_pair() {
		let graph = build(json!({
			"Rack": {"Tray": {}},
			" Rack": {"Tray ": {}},
			"Rack//": {"Tray": {}},
		}));
		assert_well_formed(&graph);
		assert_eq!(graph.edge("Rack", "Rack/Tray").unwrap().weight, 3);
		assert_eq!(graph.node("Rack").unwrap().link_count, 3);
	}

	#[test]
	fn same_id_reached_from_different_parents() {
		let graph = build(json!({
			"Shelf A": {"Bin 1": {}},
			"Shelf A/Bin 1": {},
		}));
		assert_well_formed(&graph);

		let bin = graph.node("Shelf A/Bin 1").unwrap();
		assert_eq!(bin.depth, 1);
		assert_eq!(bin.link_count, 2);
		assert_eq!(graph.edges.len(), 1);
	}

	#[test]
	fn non_location_values_are_skipped() {
		let graph = build(json!({"Shelf A": {"note": "not a location", "count": 3, "tags": []}}));
		assert_eq!(graph.nodes.len(), 1);
		assert!(graph.edges.is_empty());
	}

	#[test]
	fn empty_payload_builds_empty_graph() {
		let graph = build(json!({}));
		assert!(graph.nodes.is_empty());
		assert!(graph.edges.is_empty());
	}

	#[test]
	fn deep_chain_clamps_encoding_only() {
		let encoder = VisualEncoder::new(EncodingConfig {
			max_depth: 2,
			..EncodingConfig::default()
		});
		let raw = RawLocation::from_value(&json!({"a": {"b": {"c": {"d": {"e": {}}}}}}));
		let graph = build_graph(&raw, &encoder);

		let depths: Vec<_> = graph.nodes.iter().map(|n| n.depth).collect();
		assert_eq!(depths, [0, 1, 2, 3, 4]);

		let at_max = &graph.nodes[2];
		for node in &graph.nodes[3..] {
			assert_eq!(node.color, at_max.color);
			assert_eq!(node.font_size, at_max.font_size);
		}
		assert_ne!(graph.nodes[0].color, at_max.color);
		assert!(graph.nodes[0].font_size > graph.nodes[1].font_size);
	}

	#[test]
	fn empty_child_key_resolves_to_parent_without_self_edge() {
		let graph = build(json!({"Shelf A": {"": {"Bin 1": {}}}}));
		assert_well_formed(&graph);

		let shelf = graph.node("Shelf A").unwrap();
		assert_eq!(shelf.link_count, 2);
		assert_eq!(graph.edge("Shelf A", "Shelf A/Bin 1").unwrap().weight, 1);
		// Depth follows the traversal, not the segment count of the id.
		assert_eq!(graph.node("Shelf A/Bin 1").unwrap().depth, 2);
	}

	#[test]
	fn nodes_keep_first_discovery_order() {
		let graph = build(json!({
			"B": {"x": {}},
			"A": {"y": {}},
			"B/": {"z": {}},
		}));
		let ids: Vec<_> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, ["B", "B/x", "A", "A/y", "B/z"]);

		let edges: Vec<_> = graph.edges.iter().map(|e| e.to.as_str()).collect();
		assert_eq!(edges, ["B/x", "A/y", "B/z"]);
	}

	#[test]
	fn every_node_is_encoded_from_its_depth() {
		let encoder = VisualEncoder::default();
		let graph = build(json!({"Room": {"Shelf": {"Bin": {"component": "C3"}}}}));
		for node in &graph.nodes {
			assert_eq!(node.color, encoder.color_css(node.depth));
			assert_eq!(node.font_size, encoder.font_size(node.depth));
		}
	}
}
