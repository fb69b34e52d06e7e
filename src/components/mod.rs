//! UI components.

pub mod location_graph;
