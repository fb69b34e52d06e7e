//! Page-level configuration for the location graph.
//!
//! Read from an optional JSON block on the page; every field has a default,
//! so an absent or partial block still yields a usable config.

use serde::{Deserialize, Serialize};

use crate::components::location_graph::{EncodingConfig, LayoutConfig, LibrarySources};
use crate::error::{GraphError, Result};

/// Which engine draws the graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
	/// Built-in canvas renderer; needs no external library.
	#[default]
	Canvas,
	/// vis-network, loaded from an external script.
	Vis,
}

/// Everything the view needs besides the payload.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphConfig {
	pub encoding: EncodingConfig,
	pub layout: LayoutConfig,
	pub engine: EngineKind,
	/// Overrides the engine's default library sources.
	pub library: Option<LibrarySources>,
	/// Canvas theme name.
	pub theme: Option<String>,
}

impl GraphConfig {
	pub fn from_json_str(json: &str) -> Result<Self> {
		serde_json::from_str(json).map_err(|e| GraphError::Config(e.to_string()))
	}

	/// Sources the configured engine must load before drawing.
	pub fn library_sources(&self) -> LibrarySources {
		self.library.clone().unwrap_or_else(|| match self.engine {
			EngineKind::Canvas => LibrarySources::default(),
			EngineKind::Vis => LibrarySources::vis_network(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_object_is_default() {
		assert_eq!(GraphConfig::from_json_str("{}").unwrap(), GraphConfig::default());
	}

	#[test]
	fn partial_sections_keep_other_defaults() {
		let config = GraphConfig::from_json_str(
			r#"{"engine": "vis", "encoding": {"maxDepth": 8}, "layout": {"solver": "barnesHut"}}"#,
		)
		.unwrap();
		assert_eq!(config.engine, EngineKind::Vis);
		assert_eq!(config.encoding.max_depth, 8);
		assert_eq!(config.encoding.font_step, EncodingConfig::default().font_step);
		assert_eq!(config.layout.solver, "barnesHut");
		assert_eq!(config.layout.stabilization_iterations, 150);
	}

	#[test]
	fn library_sources_follow_engine_unless_overridden() {
		let canvas = GraphConfig::default();
		assert!(canvas.library_sources().is_empty());

		let vis = GraphConfig {
			engine: EngineKind::Vis,
			..GraphConfig::default()
		};
		assert_eq!(vis.library_sources(), LibrarySources::vis_network());

		let pinned = GraphConfig {
			engine: EngineKind::Vis,
			library: Some(LibrarySources {
				script: Some("/vendor/vis-network.min.js".into()),
				stylesheet: Some("/vendor/vis-network.min.css".into()),
			}),
			..GraphConfig::default()
		};
		assert_eq!(
			pinned.library_sources().script.as_deref(),
			Some("/vendor/vis-network.min.js")
		);
	}

	#[test]
	fn malformed_config_is_config_error() {
		let err = GraphConfig::from_json_str(r#"{"engine": "svg"}"#).unwrap_err();
		assert!(matches!(err, GraphError::Config(_)));
	}
}
