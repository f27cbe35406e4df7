//! Force-directed network of nodes and directed links.
//!
//! A [`Network`] keeps an identity-keyed graph store, mirrors it into a
//! visual [`Scene`] after every mutation and drives a physics
//! [`Integrator`]. Nodes are manipulated through [`NodeHandle`]s:
//!
//! ```ignore
//! use netgraph::{Network, NodeSpec};
//!
//! let network = Network::new();
//! let hub = network.add_node(NodeSpec::new().with_id("hub"))?;
//! let leaf = hub.add(NodeSpec::new())?; // inherits position, radius, color
//! leaf.link(&hub)?;
//! assert!(network.has_link("hub", &leaf.id()));
//! ```
//!
//! [`NetworkCanvas`] paints a network and wires up dragging, clicks, pan and
//! zoom.

mod component;
pub mod config;
pub mod drag;
mod error;
pub mod geometry;
mod handle;
pub mod highlight;
pub mod integrator;
#[allow(clippy::module_inception)]
mod network;
pub mod reconcile;
pub mod render;
pub mod store;
pub mod theme;
mod types;

pub use component::NetworkCanvas;
pub use config::{ForceConfig, NetworkConfig};
pub use drag::{MOUSE_POINTER, PointerId};
pub use error::GraphError;
pub use geometry::{EdgePath, Endpoint, Point, link_path};
pub use handle::{LinkSpec, LinkTarget, NodeHandle, NodeSpec};
pub use integrator::{ForceIntegrator, Integrator, SimLink, SimNode};
pub use network::Network;
pub use reconcile::{InitHook, NodeClick, NodeSelection, Scene};
pub use store::{GraphStore, NodeKey};
pub use theme::{Color, Paint, Theme};
pub use types::{GraphData, GraphLink, GraphNode};
