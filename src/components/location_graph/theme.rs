//! Visual theming for the location graph.
//!
//! Provides the color type shared by the depth encoding and the canvas
//! engine, plus the canvas engine's background, edge and node styles.

use serde::{Deserialize, Serialize};

/// An sRGB color with straight alpha. The default is transparent black.
///
/// Serialized as a `#rrggbb` string; alpha is not part of the wire form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	/// Opacity in `[0, 1]`.
	pub a: f64,
}

const WHITE: Color = Color::rgb(255, 255, 255);

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self::rgba(r, g, b, 1.0)
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Color { r, g, b, a }
	}

	pub fn with_alpha(mut self, a: f64) -> Self {
		self.a = a;
		self
	}

	/// Parses `#RRGGBB` or `#RGB`.
	pub fn from_hex(hex: &str) -> Option<Self> {
		let digits = hex.trim().strip_prefix('#')?;
		if !digits.is_ascii() {
			return None;
		}
		let channel = |s: &str| u8::from_str_radix(s, 16).ok();
		match digits.len() {
			6 => Some(Self::rgb(
				channel(&digits[0..2])?,
				channel(&digits[2..4])?,
				channel(&digits[4..6])?,
			)),
			3 => {
				let short = |i: usize| channel(&digits[i..i + 1]).map(|v| v * 17);
				Some(Self::rgb(short(0)?, short(1)?, short(2)?))
			}
			_ => None,
		}
	}

	/// Moves towards white; `amount` 0 keeps the color, 1 gives white.
	/// Alpha is kept.
	pub fn lighten(self, amount: f64) -> Self {
		self.lerp(WHITE.with_alpha(self.a), amount)
	}

	/// Channel-wise blend towards `other`, `t` clamped to `[0, 1]`.
	/// Channels truncate towards zero.
	pub fn lerp(self, other: Color, t: f64) -> Self {
		let t = t.clamp(0.0, 1.0);
		let mix = |from: u8, to: u8| (f64::from(from) + (f64::from(to) - f64::from(from)) * t) as u8;
		Color {
			r: mix(self.r, other.r),
			g: mix(self.g, other.g),
			b: mix(self.b, other.b),
			a: self.a + (other.a - self.a) * t,
		}
	}

	/// `#rrggbb` when opaque, `rgba(...)` otherwise.
	pub fn to_css(self) -> String {
		match self.a {
			a if (a - 1.0).abs() < 0.001 => self.to_css_rgb(),
			a => format!("rgba({}, {}, {}, {a})", self.r, self.g, self.b),
		}
	}

	/// `#rrggbb`, ignoring alpha.
	pub fn to_css_rgb(self) -> String {
		let Color { r, g, b, .. } = self;
		format!("#{r:02x}{g:02x}{b:02x}")
	}
}

impl TryFrom<String> for Color {
	type Error = String;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Color::from_hex(&value).ok_or_else(|| format!("expected #RRGGBB color, got {value:?}"))
	}
}

impl From<Color> for String {
	fn from(color: Color) -> Self {
		color.to_css_rgb()
	}
}

/// Canvas fill behind the graph.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	pub color: Color,
	/// Center stop when `use_gradient` is set.
	pub color_secondary: Color,
	pub use_gradient: bool,
}

#[derive(Clone, Debug)]
pub struct EdgeStyle {
	/// Used unless the layout config sets an edge color.
	pub color: Color,
	/// Edges touching the hovered location blend towards this.
	pub highlight_color: Color,
}

/// Node fill comes from the depth encoding; this covers everything around it.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	/// Radial highlight inside each node.
	pub use_gradient: bool,
	/// Outline width in screen pixels; 0 disables the outline.
	pub border_width: f64,
	pub border_color: Color,
	pub label_color: Color,
}

/// Named set of canvas styles.
#[derive(Clone, Debug)]
pub struct Theme {
	pub name: &'static str,
	pub background: BackgroundStyle,
	pub edge: EdgeStyle,
	pub node: NodeStyle,
}

impl Theme {
	/// Light theme, used unless the config names another.
	pub fn default_theme() -> Self {
		Self {
			name: "default",
			background: BackgroundStyle {
				color: Color::rgb(245, 247, 250),
				color_secondary: Color::rgb(255, 255, 255),
				use_gradient: true,
			},
			edge: EdgeStyle {
				color: Color::rgba(120, 144, 156, 0.6),
				highlight_color: Color::rgba(25, 118, 210, 0.9),
			},
			node: NodeStyle {
				use_gradient: true,
				border_width: 1.0,
				border_color: Color::rgba(38, 50, 56, 0.35),
				label_color: Color::rgb(38, 50, 56),
			},
		}
	}

	/// Dark theme for wall-mounted displays.
	pub fn midnight() -> Self {
		Self {
			name: "midnight",
			background: BackgroundStyle {
				color: Color::rgb(18, 20, 28),
				color_secondary: Color::rgb(25, 28, 38),
				use_gradient: true,
			},
			edge: EdgeStyle {
				color: Color::rgba(100, 120, 150, 0.45),
				highlight_color: Color::rgba(178, 223, 219, 0.9),
			},
			node: NodeStyle {
				use_gradient: true,
				border_width: 0.0,
				border_color: Color::rgba(255, 255, 255, 0.0),
				label_color: Color::rgba(255, 255, 255, 0.85),
			},
		}
	}

	/// Looks up a theme by name, falling back to the default.
	pub fn by_name(name: &str) -> Self {
		match name {
			"midnight" => Self::midnight(),
			_ => Self::default_theme(),
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::default_theme()
	}
}
