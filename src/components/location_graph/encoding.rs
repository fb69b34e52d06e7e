//! Depth and reference-count visual encodings.
//!
//! Every node gets its color and label size from how deep it sits in the
//! location tree, and its size from how many times it was reached as a child.
//! Depth is clamped to [`EncodingConfig::max_depth`] here and nowhere else;
//! traversal depth itself is unbounded.

use serde::{Deserialize, Serialize};

use super::theme::Color;

/// Tunable parameters for [`VisualEncoder`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EncodingConfig {
	/// Depth at which the gradient reaches `end_color` and font size bottoms out.
	pub max_depth: i32,
	/// Color of root-level locations.
	pub start_color: Color,
	/// Color of locations at `max_depth` and below.
	pub end_color: Color,
	/// Font size at `max_depth`.
	pub base_font_size: i32,
	/// Font size added per level above `max_depth`.
	pub font_step: i32,
	/// Node size before any links are counted.
	pub base_size: f64,
	/// Node size added per link.
	pub size_scale: f64,
}

impl Default for EncodingConfig {
	fn default() -> Self {
		Self {
			max_depth: 5,
			start_color: Color::rgb(25, 118, 210),
			end_color: Color::rgb(178, 223, 219),
			base_font_size: 12,
			font_step: 2,
			base_size: 10.0,
			size_scale: 5.0,
		}
	}
}

/// Pure mapping from depth and link count to presentation attributes.
#[derive(Clone, Debug, Default)]
pub struct VisualEncoder {
	config: EncodingConfig,
}

impl VisualEncoder {
	pub fn new(config: EncodingConfig) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &EncodingConfig {
		&self.config
	}

	/// Interpolates between the gradient endpoints at `clamp(depth) / max_depth`.
	pub fn color_for_depth(&self, depth: i32, max_depth: i32) -> Color {
		let ratio = if max_depth <= 0 {
			0.0
		} else {
			clamp_depth(depth, max_depth) as f64 / max_depth as f64
		};
		self.config.start_color.lerp(self.config.end_color, ratio)
	}

	/// `base_font_size + (max_depth - clamp(depth)) * font_step`, saturating
	/// at `i32::MAX`.
	pub fn font_size_for_depth(&self, depth: i32, max_depth: i32) -> i32 {
		let max_depth = max_depth.max(0);
		let levels_above = max_depth - clamp_depth(depth, max_depth);
		self.config
			.base_font_size
			.saturating_add(levels_above.saturating_mul(self.config.font_step.max(0)))
	}

	/// `base_size + count * size_scale`; negative counts count as zero.
	pub fn size_for_link_count(&self, count: i64) -> f64 {
		self.config.base_size + count.max(0) as f64 * self.config.size_scale.max(0.0)
	}

	/// [`Self::color_for_depth`] with the configured `max_depth`, as a CSS hex string.
	pub fn color_css(&self, depth: usize) -> String {
		self.color_for_depth(saturating_depth(depth), self.config.max_depth).to_css_rgb()
	}

	/// [`Self::font_size_for_depth`] with the configured `max_depth`.
	pub fn font_size(&self, depth: usize) -> i32 {
		self.font_size_for_depth(saturating_depth(depth), self.config.max_depth)
	}
}

fn clamp_depth(depth: i32, max_depth: i32) -> i32 {
	depth.clamp(0, max_depth.max(0))
}

fn saturating_depth(depth: usize) -> i32 {
	i32::try_from(depth).unwrap_or(i32::MAX)
}
