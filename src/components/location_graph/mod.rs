//! Storage-location graph: from nested location JSON to a force-directed view.
//!
//! The pipeline is split so every step before drawing is plain data:
//! - [`types`] decodes the nested payload into [`RawLocation`] trees
//! - [`builder`] walks the tree into a [`LocationGraph`], using [`path`] for
//!   ids and [`encoding`] for depth-based color, font size and node size
//! - [`layout`] hands the finished graph to a [`LayoutEngine`]
//! - [`loader`] fetches the script an external engine needs, once per page
//!
//! Two engines are provided: [`CanvasEngine`] draws with the `force_graph`
//! simulation on a canvas, [`VisNetworkEngine`] drives vis-network.
//!
//! # Example
//!
//! ```ignore
//! use location_graph::{GraphConfig, LocationGraphView, RawLocation};
//!
//! let data = RawLocation::from_json_str(r#"{"Shelf A": {"Bin 1": {"component": "R1"}}}"#)?;
//! let data = Signal::derive(move || data.clone());
//! view! { <LocationGraphView data=data config=GraphConfig::default() /> }
//! ```

pub mod builder;
mod canvas;
mod component;
pub mod encoding;
pub mod layout;
pub mod loader;
pub mod path;
mod render;
mod state;
pub mod theme;
pub mod types;
mod vis;

pub use builder::{GraphBuilder, build_graph};
pub use canvas::CanvasEngine;
pub use component::LocationGraphView;
pub use encoding::{EncodingConfig, VisualEncoder};
pub use layout::{GraphLayoutAdapter, LayoutConfig, LayoutEngine};
pub use loader::{LibraryLoader, LibrarySources};
pub use path::normalize;
pub use theme::{Color, Theme};
pub use types::{GraphEdge, GraphNode, LocationGraph, RawLocation};
pub use vis::VisNetworkEngine;
