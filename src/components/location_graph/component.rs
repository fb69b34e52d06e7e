//! Leptos component that builds the location graph and hands it to an engine.
//!
//! Every change of the payload signal rebuilds the graph and waits on the
//! library loader before drawing. A generation counter makes sure only the
//! most recent build gets mounted when loads settle out of order.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, warn};
use web_sys::{HtmlElement, MouseEvent};

use super::builder::build_graph;
use super::canvas::CanvasEngine;
use super::encoding::VisualEncoder;
use super::layout::GraphLayoutAdapter;
use super::loader::LibraryLoader;
use super::theme::Theme;
use super::types::{LocationGraph, RawLocation};
use super::vis::VisNetworkEngine;
use crate::config::{EngineKind, GraphConfig};
use crate::error::Result;

/// The engine currently drawing into the container. Dropping it detaches.
enum MountedEngine {
	Canvas(GraphLayoutAdapter<CanvasEngine>),
	Vis(GraphLayoutAdapter<VisNetworkEngine>),
}

impl MountedEngine {
	fn mount(config: &GraphConfig, container: &HtmlElement, graph: &LocationGraph) -> Result<Self> {
		match config.engine {
			EngineKind::Canvas => {
				let theme = config.theme.as_deref().map(Theme::by_name).unwrap_or_default();
				let mut adapter =
					GraphLayoutAdapter::new(CanvasEngine::new(theme), config.layout.clone());
				adapter.render(container, graph)?;
				Ok(Self::Canvas(adapter))
			}
			EngineKind::Vis => {
				let mut adapter =
					GraphLayoutAdapter::new(VisNetworkEngine::new(), config.layout.clone());
				adapter.render(container, graph)?;
				Ok(Self::Vis(adapter))
			}
		}
	}

	fn fit(&mut self) {
		match self {
			Self::Canvas(adapter) => adapter.fit(),
			Self::Vis(adapter) => adapter.fit(),
		}
	}
}

/// Renders nested storage locations as a force-directed graph.
///
/// The view fills its parent. If the engine's library cannot be loaded or the
/// engine fails to draw, a notice replaces the graph and the page keeps
/// working.
#[component]
pub fn LocationGraphView(
	#[prop(into)] data: Signal<RawLocation>,
	#[prop(optional)] config: GraphConfig,
) -> impl IntoView {
	let container_ref = NodeRef::<leptos::html::Div>::new();
	let unavailable = RwSignal::new(false);
	let mounted: Rc<RefCell<Option<MountedEngine>>> = Rc::new(RefCell::new(None));
	let generation = Rc::new(Cell::new(0u64));
	let encoder = VisualEncoder::new(config.encoding.clone());
	let loader = LibraryLoader::new(config.library_sources());
	let mounted_fit = mounted.clone();

	// Unmounting detaches the library elements so a remount loads afresh.
	let loader_cleanup = loader.clone();
	on_cleanup(move || loader_cleanup.teardown());

	Effect::new(move |_| {
		let root = data.get();
		let Some(container) = container_ref.get() else {
			return;
		};
		let container: HtmlElement = container.into();
		let graph = build_graph(&root, &encoder);

		let current = generation.get() + 1;
		generation.set(current);
		// Drop the previous engine before the new one draws into the same container.
		mounted.borrow_mut().take();
		unavailable.set(false);

		let (mounted, generation, config) = (mounted.clone(), generation.clone(), config.clone());
		loader.load(move |result| {
			if generation.get() != current {
				debug!("location-graph: discarding stale build {current}");
				return;
			}
			match result.and_then(|()| MountedEngine::mount(&config, &container, &graph)) {
				Ok(engine) => *mounted.borrow_mut() = Some(engine),
				Err(err) => {
					warn!("location-graph: visualization unavailable: {err}");
					unavailable.set(true);
				}
			}
		});
	});

	let on_fit = move |_: MouseEvent| {
		if let Some(engine) = mounted_fit.borrow_mut().as_mut() {
			engine.fit();
		}
	};

	view! {
		<div class="location-graph" style="position: relative; width: 100%; height: 100%;">
			<div
				node_ref=container_ref
				class="location-graph-container"
				style="width: 100%; height: 100%;"
			/>
			{move || {
				unavailable
					.get()
					.then(|| {
						view! {
							<p class="location-graph-unavailable">"Visualization unavailable"</p>
						}
					})
			}}
			<button class="location-graph-fit" on:click=on_fit>
				"Fit"
			</button>
		</div>
	}
}
