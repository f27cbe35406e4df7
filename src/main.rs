//! Client entrypoint for the CSR build.
//!
//! Loads the page's bootstrap graph (or seeds a small demo graph) where a
//! click logs the node and a double click grows a new node out of it.

// Bin target reuses lib deps, silence noisy lint.
#![allow(unused_crate_dependencies)]

use std::rc::Rc;

use leptos::prelude::*;
use log::{info, warn};
use netgraph::components::network::{InitHook, NodeClick, NodeSelection};
use netgraph::{
	App, GraphError, LinkSpec, Network, NodeHandle, NodeSpec, init_logging, load_graph_data,
};
use wasm_bindgen::prelude::*;

/// Delay before a double click grows a node, so the second click's own
/// handlers finish first.
const GROW_DELAY_MS: i32 = 200;

const GROWN_COLOR: &str = "#1a8436";

fn grow_later(node: NodeHandle) {
	let Some(window) = web_sys::window() else {
		return;
	};
	let grow = Closure::once_into_js(move || {
		let spec = NodeSpec::new().with_radius(10.0).with_color(GROWN_COLOR);
		if let Err(e) = node.add_linked(spec, LinkSpec::new().with_label("Attached to")) {
			warn!("netgraph: could not grow {}: {e}", node.id());
		}
	});
	if window
		.set_timeout_with_callback_and_timeout_and_arguments_0(grow.unchecked_ref(), GROW_DELAY_MS)
		.is_err()
	{
		warn!("netgraph: could not schedule node growth");
	}
}

fn demo_hook() -> InitHook {
	Rc::new(|selection: &NodeSelection, _node: &NodeHandle| {
		selection.on_click(|click: &NodeClick, node: &NodeHandle| {
			info!("clicked {}", node.id());
			if click.detail == 2 {
				grow_later(node.clone());
			}
		});
	})
}

fn seed(network: &Network) -> Result<(), GraphError> {
	let n1 = network.add_node(NodeSpec {
		init: Some(demo_hook()),
		..NodeSpec::new()
	})?;
	let n3 = n1.add(NodeSpec::new())?.add(NodeSpec::new())?;
	n3.link(&n1)?;
	n1.link(&n3)?;
	n1.link(&n3)?;
	Ok(())
}

fn main() {
	init_logging();

	let network = Network::new();
	match load_graph_data() {
		Some(data) => network.load_with(&data, Some(demo_hook())),
		None => {
			if let Err(e) = seed(&network) {
				warn!("netgraph: could not seed demo graph: {e}");
			}
		}
	}

	mount_to_body(move || {
		view! { <App network=network /> }
	})
}
