//! Frame drawing for [`CanvasEngine`](super::CanvasEngine).
//!
//! Order matters: background in screen space, then edges, then nodes in world
//! space. Nodes go in two passes so hovered locations and their neighbors sit
//! above the dimmed rest of the graph.

use std::f64::consts::TAU;

use web_sys::{CanvasGradient, CanvasRenderingContext2d};

use super::state::{ForceGraphState, NodeInfo, NodeShape};
use super::theme::{Color, Theme};

/// Labels smaller than this on screen are skipped.
const MIN_LABEL_SCREEN_PX: f64 = 6.0;
/// How far non-highlighted nodes fade while something is hovered.
const NODE_DIM: f64 = 0.7;
const EDGE_DIM: f64 = 0.6;

/// Hermite ease for highlight transitions.
fn ease(t: f64) -> f64 {
	t * t * (3.0 - 2.0 * t)
}

/// Draws one frame.
pub fn render(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	theme: &Theme,
	edge_color: Color,
) {
	fill_background(state, ctx, theme);

	let k = state.transform.k;
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(k, k);
	stroke_edges(state, ctx, theme, edge_color);
	fill_nodes(state, ctx, theme);
	ctx.restore();
}

#[allow(deprecated)]
fn set_gradient_fill(ctx: &CanvasRenderingContext2d, gradient: &CanvasGradient) {
	ctx.set_fill_style(gradient);
}

fn fill_background(state: &ForceGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let style = &theme.background;
	let (cx, cy) = (state.width / 2.0, state.height / 2.0);
	let gradient = if style.use_gradient {
		ctx.create_radial_gradient(cx, cy, 0.0, cx, cy, state.width.max(state.height) * 0.8)
			.ok()
	} else {
		None
	};

	if let Some(gradient) = gradient {
		let _ = gradient.add_color_stop(0.0, &style.color_secondary.to_css());
		let _ = gradient.add_color_stop(1.0, &style.color.to_css());
		set_gradient_fill(ctx, &gradient);
	} else {
		ctx.set_fill_style_str(&style.color.to_css());
	}
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
}

fn stroke_edges(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	theme: &Theme,
	edge_color: Color,
) {
	let dim = ease(state.highlight.max_intensity());

	state.graph.visit_edges(|from, to, _| {
		let (x1, y1) = (f64::from(from.x()), f64::from(from.y()));
		let (x2, y2) = (f64::from(to.x()), f64::from(to.y()));
		let length = (x2 - x1).hypot(y2 - y1);
		if length < 0.001 {
			return;
		}

		let lit = ease(state.highlight.edge_intensity(from.index(), to.index()));
		let color = if lit > 0.01 {
			edge_color.lerp(theme.edge.highlight_color, lit)
		} else {
			edge_color.with_alpha(edge_color.a * (1.0 - EDGE_DIM * dim))
		};
		let width = state.edge_width(from.index(), to.index()).unwrap_or(1.0);

		ctx.set_stroke_style_str(&color.to_css());
		ctx.set_line_width(width / state.transform.k);

		// Stop at the node rims so widths stay readable on small nodes.
		let (ux, uy) = ((x2 - x1) / length, (y2 - y1) / length);
		let (r1, r2) = (from.data.user_data.radius, to.data.user_data.radius);
		ctx.begin_path();
		ctx.move_to(x1 + ux * r1, y1 + uy * r1);
		ctx.line_to(x2 - ux * r2, y2 - uy * r2);
		ctx.stroke();
	});
}

/// One node's placement for a single frame.
struct NodeDraw<'a> {
	info: &'a NodeInfo,
	x: f64,
	y: f64,
	alpha: f64,
	scale: f64,
}

fn fill_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let dim = ease(state.highlight.max_intensity());
	let dimmed_alpha = 1.0 - NODE_DIM * dim;

	for highlighted_pass in [false, true] {
		state.graph.visit_nodes(|node| {
			let intensity = state.highlight.node_intensity(node.index());
			if (intensity > 0.001) != highlighted_pass {
				return;
			}

			let (alpha, scale) = if highlighted_pass {
				let t = ease(intensity);
				let grow = if state.highlight.hovered_node == Some(node.index()) {
					0.3
				} else {
					0.15
				};
				(dimmed_alpha + (1.0 - dimmed_alpha) * t, 1.0 + grow * t)
			} else if dim > 0.01 {
				(dimmed_alpha, 1.0)
			} else {
				(1.0, 1.0)
			};

			let draw = NodeDraw {
				info: &node.data.user_data,
				x: f64::from(node.x()),
				y: f64::from(node.y()),
				alpha,
				scale,
			};
			fill_node(ctx, state, theme, &draw);
		});
	}
}

fn fill_node(
	ctx: &CanvasRenderingContext2d,
	state: &ForceGraphState,
	theme: &Theme,
	draw: &NodeDraw,
) {
	let NodeDraw { info, x, y, alpha, scale } = *draw;
	let radius = info.radius * scale;
	ctx.set_global_alpha(alpha);

	let (hx, hy) = (x - radius * 0.3, y - radius * 0.3);
	let gradient = theme
		.node
		.use_gradient
		.then(|| ctx.create_radial_gradient(hx, hy, 0.0, x, y, radius))
		.and_then(|g| g.ok());
	if let Some(gradient) = gradient {
		let _ = gradient.add_color_stop(0.0, &info.color.lighten(0.4).to_css());
		let _ = gradient.add_color_stop(1.0, &info.color.to_css());
		set_gradient_fill(ctx, &gradient);
	} else {
		ctx.set_fill_style_str(&info.color.to_css());
	}
	trace_shape(ctx, state.node_shape, x, y, radius);
	ctx.fill();

	if theme.node.border_width > 0.0 {
		ctx.set_stroke_style_str(&theme.node.border_color.to_css());
		ctx.set_line_width(theme.node.border_width / state.transform.k);
		ctx.stroke();
	}

	if alpha > 0.5 && info.font_size * state.transform.k >= MIN_LABEL_SCREEN_PX {
		ctx.set_fill_style_str(&theme.node.label_color.to_css());
		ctx.set_font(&format!("{}px sans-serif", info.font_size));
		let _ = ctx.fill_text(&info.label, x + radius + 4.0, y + info.font_size * 0.35);
	}

	ctx.set_global_alpha(1.0);
}

fn trace_shape(ctx: &CanvasRenderingContext2d, shape: NodeShape, x: f64, y: f64, radius: f64) {
	ctx.begin_path();
	match shape {
		NodeShape::Dot => {
			let _ = ctx.arc(x, y, radius, 0.0, TAU);
		}
		NodeShape::Square => ctx.rect(x - radius, y - radius, 2.0 * radius, 2.0 * radius),
	}
}
