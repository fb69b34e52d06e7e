//! Error types surfaced by the location graph crate.
//!
//! Graph building itself never fails; these cover the page boundary
//! (payload and config decoding, DOM access, external script loading).

use thiserror::Error;

/// Errors surfaced to the component layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GraphError {
	/// The location payload was not valid JSON.
	#[error("invalid location payload: {0}")]
	Payload(String),
	/// The graph configuration block was not valid JSON for [`GraphConfig`](crate::GraphConfig).
	#[error("invalid graph config: {0}")]
	Config(String),
	/// An external script or stylesheet failed to load.
	#[error("failed to load library resource {url}")]
	LibraryLoad { url: String },
	/// A browser API call failed or an expected element was missing.
	#[error("dom: {0}")]
	Dom(String),
}

impl GraphError {
	/// Builds a [`GraphError::Dom`] from a `JsValue` error, keeping its debug text.
	pub fn dom(context: &str, err: wasm_bindgen::JsValue) -> Self {
		GraphError::Dom(format!("{context}: {err:?}"))
	}
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, GraphError>;
