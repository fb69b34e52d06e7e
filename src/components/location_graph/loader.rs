//! One-shot loader for an external engine's script and stylesheet.
//!
//! Loading is gated per set of sources: the first caller attaches the
//! elements to `document.head`, callers arriving while the load is in flight
//! are queued on the same gate, and callers arriving after it settled get the
//! cached outcome straight away. There is no retry; [`LibraryLoader::teardown`]
//! detaches the elements and resets the gate so the next call loads afresh.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlLinkElement, HtmlScriptElement};

use crate::error::{GraphError, Result};

/// Callback invoked once the gate settles.
pub type Waiter = Box<dyn FnOnce(Result<()>)>;

/// Where a gate is in its single load.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LoadState {
	#[default]
	Idle,
	Loading,
	Ready,
	Failed(GraphError),
}

/// Outcome of [`LoadGate::subscribe`]. The caller acts on it after releasing
/// any borrow of the gate, since waiters may re-enter the loader.
pub enum Subscription {
	/// First subscriber: start loading, then settle with this epoch.
	Start(u64),
	/// A load is in flight; the waiter was queued.
	Queued,
	/// Already settled; call the waiter with the cached outcome.
	Settled(Waiter, Result<()>),
}

/// Pure one-shot state machine with waiter coalescing.
#[derive(Default)]
pub struct LoadGate {
	state: LoadState,
	waiters: Vec<Waiter>,
	epoch: u64,
}

impl LoadGate {
	pub fn state(&self) -> &LoadState {
		&self.state
	}

	pub fn subscribe(&mut self, waiter: Waiter) -> Subscription {
		match &self.state {
			LoadState::Idle => {
				self.state = LoadState::Loading;
				self.waiters.push(waiter);
				Subscription::Start(self.epoch)
			}
			LoadState::Loading => {
				self.waiters.push(waiter);
				Subscription::Queued
			}
			LoadState::Ready => Subscription::Settled(waiter, Ok(())),
			LoadState::Failed(err) => Subscription::Settled(waiter, Err(err.clone())),
		}
	}

	/// Settles the load started in `epoch` and hands back the queued waiters.
	/// Stale epochs and repeated settlements are ignored.
	pub fn settle(&mut self, epoch: u64, result: &Result<()>) -> Vec<Waiter> {
		if epoch != self.epoch || self.state != LoadState::Loading {
			return Vec::new();
		}
		self.state = match result {
			Ok(()) => LoadState::Ready,
			Err(err) => LoadState::Failed(err.clone()),
		};
		std::mem::take(&mut self.waiters)
	}

	/// Back to [`LoadState::Idle`]. Queued waiters are dropped unanswered and
	/// any in-flight settlement becomes stale.
	pub fn reset(&mut self) {
		self.state = LoadState::Idle;
		self.waiters.clear();
		self.epoch += 1;
	}
}

/// Script and stylesheet URLs an engine needs before it can draw.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct LibrarySources {
	pub script: Option<String>,
	pub stylesheet: Option<String>,
}

impl LibrarySources {
	/// The standalone vis-network bundle, which injects its own styles.
	pub fn vis_network() -> Self {
		Self {
			script: Some(
				"https://unpkg.com/vis-network@9.1.9/standalone/umd/vis-network.min.js".to_string(),
			),
			stylesheet: None,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.script.is_none() && self.stylesheet.is_none()
	}
}

#[derive(Default)]
struct Slot {
	gate: LoadGate,
	elements: Vec<Element>,
}

thread_local! {
	static SLOTS: RefCell<HashMap<LibrarySources, Slot>> = RefCell::new(HashMap::new());
}

/// Browser-side driver for a [`LoadGate`] shared by every loader with the
/// same sources.
#[derive(Clone, Debug)]
pub struct LibraryLoader {
	sources: LibrarySources,
}

impl LibraryLoader {
	pub fn new(sources: LibrarySources) -> Self {
		Self { sources }
	}

	/// Calls `on_settled` once the sources are attached and loaded, or with
	/// [`GraphError::LibraryLoad`] if any of them fails. With no sources the
	/// callback runs immediately.
	pub fn load(&self, on_settled: impl FnOnce(Result<()>) + 'static) {
		if self.sources.is_empty() {
			on_settled(Ok(()));
			return;
		}

		match subscribe(&self.sources, Box::new(on_settled)) {
			Subscription::Start(epoch) => {
				if let Err(err) = self.attach(epoch) {
					warn!("location-graph: could not attach library: {err}");
					settle(&self.sources, epoch, Err(err));
				}
			}
			Subscription::Queued => {}
			Subscription::Settled(waiter, result) => waiter(result),
		}
	}

	/// Current state of the shared gate for these sources.
	pub fn state(&self) -> LoadState {
		SLOTS.with(|slots| {
			slots
				.borrow()
				.get(&self.sources)
				.map(|slot| slot.gate.state().clone())
				.unwrap_or_default()
		})
	}

	/// Detaches the attached elements and resets the gate.
	pub fn teardown(&self) {
		let elements = SLOTS.with(|slots| {
			slots
				.borrow_mut()
				.get_mut(&self.sources)
				.map(|slot| {
					slot.gate.reset();
					std::mem::take(&mut slot.elements)
				})
				.unwrap_or_default()
		});
		for element in elements {
			element.remove();
		}
	}

	fn attach(&self, epoch: u64) -> Result<()> {
		let document = web_sys::window()
			.and_then(|w| w.document())
			.ok_or_else(|| GraphError::Dom("no document".into()))?;
		let head = document
			.head()
			.ok_or_else(|| GraphError::Dom("document has no <head>".into()))?;

		let pending = Rc::new(Cell::new(0usize));
		let mut elements: Vec<(Element, String)> = Vec::new();

		if let Some(url) = &self.sources.stylesheet {
			let link: HtmlLinkElement = document
				.create_element("link")
				.map_err(|e| GraphError::dom("create <link>", e))?
				.dyn_into()
				.map_err(|e| GraphError::dom("cast <link>", e.into()))?;
			link.set_rel("stylesheet");
			link.set_href(url);
			elements.push((link.into(), url.clone()));
		}
		if let Some(url) = &self.sources.script {
			let script: HtmlScriptElement = document
				.create_element("script")
				.map_err(|e| GraphError::dom("create <script>", e))?
				.dyn_into()
				.map_err(|e| GraphError::dom("cast <script>", e.into()))?;
			script.set_src(url);
			script.set_async(true);
			elements.push((script.into(), url.clone()));
		}

		pending.set(elements.len());
		for (element, url) in elements {
			let html: &web_sys::HtmlElement = element.unchecked_ref();

			let (sources, pending) = (self.sources.clone(), pending.clone());
			let loaded_url = url.clone();
			let on_load = Closure::once_into_js(move || {
				info!("location-graph: loaded {loaded_url}");
				pending.set(pending.get().saturating_sub(1));
				if pending.get() == 0 {
					settle(&sources, epoch, Ok(()));
				}
			});
			html.set_onload(Some(on_load.unchecked_ref()));

			let (sources, failed_url) = (self.sources.clone(), url.clone());
			let on_error = Closure::once_into_js(move || {
				warn!("location-graph: failed to load {failed_url}");
				settle(&sources, epoch, Err(GraphError::LibraryLoad { url: failed_url }));
			});
			html.set_onerror(Some(on_error.unchecked_ref()));

			head.append_child(&element)
				.map_err(|e| GraphError::dom("append to <head>", e))?;
			// Tracked right away so teardown finds it even if a later append fails.
			track(&self.sources, element);
		}
		Ok(())
	}
}

fn subscribe(sources: &LibrarySources, waiter: Waiter) -> Subscription {
	SLOTS.with(|slots| {
		slots
			.borrow_mut()
			.entry(sources.clone())
			.or_default()
			.gate
			.subscribe(waiter)
	})
}

fn track(sources: &LibrarySources, element: Element) {
	SLOTS.with(|slots| {
		if let Some(slot) = slots.borrow_mut().get_mut(sources) {
			slot.elements.push(element);
		}
	});
}

fn settle(sources: &LibrarySources, epoch: u64, result: Result<()>) {
	let waiters = SLOTS.with(|slots| {
		slots
			.borrow_mut()
			.get_mut(sources)
			.map(|slot| slot.gate.settle(epoch, &result))
			.unwrap_or_default()
	});
	for waiter in waiters {
		waiter(result.clone());
	}
}
