//! Built-in layout engine: `force_graph` physics drawn on an HTML canvas.
//!
//! `draw` creates a canvas inside the container, settles the simulation for
//! the configured number of iterations, then starts a `requestAnimationFrame`
//! loop and wires mouse handlers for hover, node dragging, panning and
//! zooming. Each draw gets its own shared context; detaching empties it,
//! which stops the previous loop on its next frame.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, MouseEvent, WheelEvent};

use super::layout::{LayoutConfig, LayoutEngine};
use super::render;
use super::state::{FRAME_DT, ForceGraphState, MAX_ZOOM, MIN_ZOOM};
use super::theme::{Color, Theme};
use super::types::LocationGraph;
use crate::error::{GraphError, Result};

/// Screen pixels kept free around the graph by `fit`.
const FIT_PADDING: f64 = 40.0;

/// Bundles simulation state with the visual configuration it is drawn with.
struct CanvasContext {
	state: ForceGraphState,
	theme: Theme,
	edge_color: Color,
}

type SharedContext = Rc<RefCell<Option<CanvasContext>>>;

/// Draws location graphs on a canvas with a force-directed simulation.
pub struct CanvasEngine {
	theme: Theme,
	context: SharedContext,
	canvas: Option<HtmlCanvasElement>,
	mouse_listeners: Vec<(&'static str, Closure<dyn FnMut(MouseEvent)>)>,
	wheel_listener: Option<Closure<dyn FnMut(WheelEvent)>>,
}

impl CanvasEngine {
	pub fn new(theme: Theme) -> Self {
		Self {
			theme,
			context: Rc::new(RefCell::new(None)),
			canvas: None,
			mouse_listeners: Vec::new(),
			wheel_listener: None,
		}
	}

	fn detach(&mut self) {
		self.context.borrow_mut().take();
		if let Some(canvas) = self.canvas.take() {
			for (event, listener) in &self.mouse_listeners {
				let _ = canvas
					.remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref());
			}
			if let Some(listener) = &self.wheel_listener {
				let _ = canvas
					.remove_event_listener_with_callback("wheel", listener.as_ref().unchecked_ref());
			}
			canvas.remove();
		}
		self.mouse_listeners.clear();
		self.wheel_listener = None;
	}

	fn start_animation(&self, ctx: CanvasRenderingContext2d) -> Result<()> {
		let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
		let (context, animate_inner) = (self.context.clone(), animate.clone());

		*animate.borrow_mut() = Some(Closure::new(move || {
			{
				let mut guard = context.borrow_mut();
				let Some(c) = guard.as_mut() else {
					// Detached: stop rescheduling.
					return;
				};
				c.state.tick(FRAME_DT);
				render::render(&c.state, &ctx, &c.theme, c.edge_color);
			}
			if let (Some(window), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));

		let window = web_sys::window().ok_or_else(|| GraphError::Dom("no window".into()))?;
		if let Some(cb) = animate.borrow().as_ref() {
			window
				.request_animation_frame(cb.as_ref().unchecked_ref())
				.map_err(|e| GraphError::dom("requestAnimationFrame", e))?;
		}
		Ok(())
	}

	fn attach_listeners(&mut self, canvas: &HtmlCanvasElement) -> Result<()> {
		let context_md = (self.context.clone(), canvas.clone());
		let on_mousedown = Closure::<dyn FnMut(MouseEvent)>::new(move |ev: MouseEvent| {
			let (context, canvas) = &context_md;
			let (x, y) = local_position(canvas, ev.client_x(), ev.client_y());
			let mut guard = context.borrow_mut();
			let Some(c) = guard.as_mut() else {
				return;
			};

			let hit = c.state.node_at_position(x, y);
			if let (true, Some(idx)) = (c.state.interaction.drag_nodes, hit) {
				c.state.drag.active = true;
				c.state.drag.node_idx = Some(idx);
				c.state.drag.start_x = x;
				c.state.drag.start_y = y;
				let mut start = (0.0, 0.0);
				c.state.graph.visit_nodes(|node| {
					if node.index() == idx {
						start = (node.x(), node.y());
					}
				});
				(c.state.drag.node_start_x, c.state.drag.node_start_y) = start;
			} else if c.state.interaction.pan {
				c.state.pan.active = true;
				c.state.pan.start_x = x;
				c.state.pan.start_y = y;
				c.state.pan.transform_start_x = c.state.transform.x;
				c.state.pan.transform_start_y = c.state.transform.y;
			}
		});

		let context_mm = (self.context.clone(), canvas.clone());
		let on_mousemove = Closure::<dyn FnMut(MouseEvent)>::new(move |ev: MouseEvent| {
			let (context, canvas) = &context_mm;
			let (x, y) = local_position(canvas, ev.client_x(), ev.client_y());
			let mut guard = context.borrow_mut();
			let Some(c) = guard.as_mut() else {
				return;
			};

			if !c.state.drag.active {
				let hovered = c.state.node_at_position(x, y);
				if hovered != c.state.highlight.hovered_node {
					let title = hovered.and_then(|idx| c.state.node_tooltip(idx)).unwrap_or_default();
					canvas.set_title(&title);
				}
				c.state.set_hover(hovered);
			}

			if c.state.drag.active {
				if let Some(idx) = c.state.drag.node_idx {
					let k = c.state.transform.k;
					let (nx, ny) = (
						c.state.drag.node_start_x + ((x - c.state.drag.start_x) / k) as f32,
						c.state.drag.node_start_y + ((y - c.state.drag.start_y) / k) as f32,
					);
					c.state.graph.visit_nodes_mut(|node| {
						if node.index() == idx {
							node.data.x = nx;
							node.data.y = ny;
							node.data.is_anchor = true;
						}
					});
				}
			} else if c.state.pan.active {
				c.state.transform.x = c.state.pan.transform_start_x + (x - c.state.pan.start_x);
				c.state.transform.y = c.state.pan.transform_start_y + (y - c.state.pan.start_y);
			}
		});

		let context_mu = self.context.clone();
		let on_mouseup = Closure::<dyn FnMut(MouseEvent)>::new(move |_: MouseEvent| {
			if let Some(c) = context_mu.borrow_mut().as_mut() {
				c.state.drag.active = false;
				c.state.drag.node_idx = None;
				c.state.pan.active = false;
			}
		});

		let context_ml = (self.context.clone(), canvas.clone());
		let on_mouseleave = Closure::<dyn FnMut(MouseEvent)>::new(move |_: MouseEvent| {
			let (context, canvas) = &context_ml;
			if let Some(c) = context.borrow_mut().as_mut() {
				c.state.drag.active = false;
				c.state.drag.node_idx = None;
				c.state.pan.active = false;
				c.state.set_hover(None);
			}
			canvas.set_title("");
		});

		for (event, listener) in [
			("mousedown", on_mousedown),
			("mousemove", on_mousemove),
			("mouseup", on_mouseup),
			("mouseleave", on_mouseleave),
		] {
			canvas
				.add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())
				.map_err(|e| GraphError::dom(event, e))?;
			self.mouse_listeners.push((event, listener));
		}

		if self.context.borrow().as_ref().is_some_and(|c| c.state.interaction.zoom) {
			let context_wh = (self.context.clone(), canvas.clone());
			let on_wheel = Closure::<dyn FnMut(WheelEvent)>::new(move |ev: WheelEvent| {
				ev.prevent_default();
				let (context, canvas) = &context_wh;
				let (x, y) = local_position(canvas, ev.client_x(), ev.client_y());
				if let Some(c) = context.borrow_mut().as_mut() {
					let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
					let new_k = (c.state.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
					let ratio = new_k / c.state.transform.k;
					c.state.transform.x = x - (x - c.state.transform.x) * ratio;
					c.state.transform.y = y - (y - c.state.transform.y) * ratio;
					c.state.transform.k = new_k;
				}
			});
			canvas
				.add_event_listener_with_callback("wheel", on_wheel.as_ref().unchecked_ref())
				.map_err(|e| GraphError::dom("wheel", e))?;
			self.wheel_listener = Some(on_wheel);
		}
		Ok(())
	}
}

impl Default for CanvasEngine {
	fn default() -> Self {
		Self::new(Theme::default())
	}
}

impl Drop for CanvasEngine {
	fn drop(&mut self) {
		self.detach();
	}
}

impl LayoutEngine for CanvasEngine {
	type Container = HtmlElement;

	fn draw(
		&mut self,
		container: &HtmlElement,
		graph: &LocationGraph,
		config: &LayoutConfig,
	) -> Result<()> {
		self.detach();
		// Fresh context per draw so a stale animation loop cannot pick it up.
		self.context = Rc::new(RefCell::new(None));

		let document = web_sys::window()
			.and_then(|w| w.document())
			.ok_or_else(|| GraphError::Dom("no document".into()))?;
		let canvas: HtmlCanvasElement = document
			.create_element("canvas")
			.map_err(|e| GraphError::dom("create <canvas>", e))?
			.dyn_into()
			.map_err(|e| GraphError::dom("cast <canvas>", e.into()))?;

		let (w, h) = (container.client_width(), container.client_height());
		let (w, h) = (
			if w > 0 { w as f64 } else { 800.0 },
			if h > 0 { h as f64 } else { 600.0 },
		);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		canvas.set_class_name("location-graph-canvas");
		let _ = canvas.set_attribute("style", "display: block; cursor: grab;");
		container
			.append_child(&canvas)
			.map_err(|e| GraphError::dom("append <canvas>", e))?;
		// Owned from here on, so detach removes it if a later step fails.
		self.canvas = Some(canvas.clone());

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.map_err(|e| GraphError::dom("getContext", e))?
			.ok_or_else(|| GraphError::Dom("2d context unavailable".into()))?
			.dyn_into()
			.map_err(|e| GraphError::dom("cast 2d context", e.into()))?;

		let mut state = ForceGraphState::new(graph, config, w, h);
		state.stabilize(config.stabilization_iterations);

		*self.context.borrow_mut() = Some(CanvasContext {
			state,
			theme: self.theme.clone(),
			edge_color: config.edge_color.unwrap_or(self.theme.edge.color),
		});

		self.attach_listeners(&canvas)?;
		self.start_animation(ctx)
	}

	fn fit(&mut self) {
		if let Some(c) = self.context.borrow_mut().as_mut() {
			c.state.fit(FIT_PADDING);
		}
	}
}

fn local_position(canvas: &HtmlCanvasElement, client_x: i32, client_y: i32) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(client_x as f64 - rect.left(), client_y as f64 - rect.top())
}
