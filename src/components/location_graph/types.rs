//! Input and output data structures for the location graph.
//!
//! Input is the nested location payload, decoded from JSON into a typed tree.
//! Output is the flat node/edge graph handed to a layout engine.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{GraphError, Result};

/// Reserved key holding the component stored at a location.
pub const COMPONENT_KEY: &str = "component";
/// Reserved key holding the stored quantity at a location.
pub const QUANTITY_KEY: &str = "quantity";

/// Display values stored directly at a location.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Leaf {
	pub component: Option<String>,
	pub quantity: Option<String>,
}

impl Leaf {
	pub fn is_empty(&self) -> bool {
		self.component.is_none() && self.quantity.is_none()
	}

	/// Human-readable summary, e.g. `"R1: 5"`. `None` when nothing is stored.
	pub fn summary(&self) -> Option<String> {
		match (&self.component, &self.quantity) {
			(Some(component), Some(quantity)) => Some(format!("{component}: {quantity}")),
			(Some(only), None) | (None, Some(only)) => Some(only.clone()),
			(None, None) => None,
		}
	}
}

/// A child value under a non-reserved key.
#[derive(Clone, Debug, PartialEq)]
pub enum LocationEntry {
	/// A nested location.
	Location(RawLocation),
	/// Anything that is not an object. Skipped when building the graph.
	Unknown,
}

/// One location of the nested payload: its own leaf values plus its
/// sub-locations in document order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawLocation {
	pub leaf: Leaf,
	pub children: Vec<(String, LocationEntry)>,
}

impl RawLocation {
	/// Decodes a payload string. A non-object top-level value decodes to an
	/// empty location.
	pub fn from_json_str(json: &str) -> Result<Self> {
		let value: Value =
			serde_json::from_str(json).map_err(|e| GraphError::Payload(e.to_string()))?;
		Ok(Self::from_value(&value))
	}

	/// Converts an arbitrary JSON value. Only objects carry locations.
	pub fn from_value(value: &Value) -> Self {
		match value {
			Value::Object(map) => Self::from_map(map),
			_ => Self::default(),
		}
	}

	fn from_map(map: &Map<String, Value>) -> Self {
		let mut leaf = Leaf::default();
		let mut children = Vec::with_capacity(map.len());

		for (key, value) in map {
			match key.as_str() {
				COMPONENT_KEY => leaf.component = scalar_display(value),
				QUANTITY_KEY => leaf.quantity = scalar_display(value),
				_ => {
					let entry = match value {
						Value::Object(inner) => LocationEntry::Location(Self::from_map(inner)),
						_ => LocationEntry::Unknown,
					};
					children.push((key.clone(), entry));
				}
			}
		}

		Self { leaf, children }
	}

	/// Iterates sub-locations, skipping [`LocationEntry::Unknown`] entries.
	pub fn locations(&self) -> impl Iterator<Item = (&str, &RawLocation)> {
		self.children.iter().filter_map(|(key, entry)| match entry {
			LocationEntry::Location(location) => Some((key.as_str(), location)),
			LocationEntry::Unknown => None,
		})
	}
}

impl<'de> Deserialize<'de> for RawLocation {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		let value = Value::deserialize(deserializer)?;
		Ok(Self::from_value(&value))
	}
}

/// Renders a scalar for display; strings lose their quotes.
fn scalar_display(value: &Value) -> Option<String> {
	match value {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(b.to_string()),
		Value::Null | Value::Array(_) | Value::Object(_) => None,
	}
}

/// A location in the built graph.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
	/// Normalized full path from the root. Unique within one graph.
	pub id: String,
	/// The location's own name.
	pub label: String,
	/// Leaf summary, or the label when nothing is stored here.
	pub title: String,
	/// Distance from the root; root-level locations are depth 0.
	pub depth: usize,
	/// CSS hex color derived from depth.
	pub color: String,
	/// Label font size derived from depth.
	pub font_size: i32,
	/// Visual magnitude derived from `link_count`.
	pub value: f64,
	/// Number of times this location was reached as a child.
	pub link_count: u32,
}

/// A parent/child connection in the built graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
	pub from: String,
	pub to: String,
	/// Number of times this pair was produced during traversal.
	pub weight: u32,
}

/// Complete graph: nodes and edges in first-discovery order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LocationGraph {
	pub nodes: Vec<GraphNode>,
	pub edges: Vec<GraphEdge>,
}

impl LocationGraph {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub fn edge(&self, from: &str, to: &str) -> Option<&GraphEdge> {
		self.edges.iter().find(|e| e.from == from && e.to == to)
	}

	/// Largest edge weight, at least 1.
	pub fn max_weight(&self) -> u32 {
		self.edges.iter().map(|e| e.weight).max().unwrap_or(1).max(1)
	}

	pub fn to_json(&self) -> Result<String> {
		serde_json::to_string(self).map_err(|e| GraphError::Payload(e.to_string()))
	}
}
