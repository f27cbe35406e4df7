//! netgraph: interactive force-directed networks of nodes and directed links.
//!
//! Nodes live in an identity-keyed store and are changed through
//! [`NodeHandle`]s; every change is mirrored into a canvas scene and a physics
//! simulation. The crate ships a WASM client that loads bootstrap data from
//! the page and renders it with pan/zoom, node dragging and hover focus.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, HtmlScriptElement, Window};

pub mod components;

pub use components::network::{
	GraphData, GraphError, GraphLink, GraphNode, LinkSpec, Network, NetworkCanvas, NodeHandle,
	NodeSpec,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("netgraph: logging initialized");
}

/// Load graph data from a script element with id="graph-data".
/// Expected format: JSON with { nodes: [...], links: [...] }
pub fn load_graph_data() -> Option<GraphData> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("graph-data")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match serde_json::from_str::<GraphData>(&json_text) {
		Ok(data) => {
			info!(
				"netgraph: read {} nodes, {} links",
				data.nodes.len(),
				data.links.len()
			);
			Some(data)
		}
		Err(e) => {
			warn!("netgraph: failed to parse graph data: {}", e);
			None
		}
	}
}

/// Mounts a canvas showing `network` into the first element matching
/// `selector`.
pub fn mount_network(selector: &str, network: Network) -> Result<(), GraphError> {
	let invalid = || GraphError::InvalidSelection {
		selector: selector.to_string(),
	};
	if selector.trim().is_empty() {
		return Err(invalid());
	}
	let parent: HtmlElement = web_sys::window()
		.and_then(|window| window.document())
		.and_then(|document| document.query_selector(selector).ok().flatten())
		.and_then(|element| element.dyn_into().ok())
		.ok_or_else(invalid)?;

	leptos::mount::mount_to(parent, move || view! { <NetworkCanvas network=network /> }).forget();
	info!("netgraph: mounted network into {selector}");
	Ok(())
}

/// Main application component: a fullscreen canvas for `network`.
#[component]
pub fn App(network: Network) -> impl IntoView {
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Network" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph" id="main-network">
			<NetworkCanvas network=network fullscreen=true />
			<div class="graph-overlay">
				<h1>"Network"</h1>
				<p class="subtitle">"Drag nodes to reposition. Double-click a node to grow it. Scroll to zoom."</p>
			</div>
		</div>
	}
}
