//! Node handles: the mutation-facing side of the network.
//!
//! A [`NodeHandle`] is bound to one node for its whole lifetime (renames
//! included). Getters read the current value; setters write it and re-render
//! the network before returning.

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use log::debug;

use super::error::GraphError;
use super::network::Network;
use super::reconcile::{InitHook, NodeSelection};
use super::store::{Node, NodeKey};

/// Description of a node to add. Unset fields take defaults, or are
/// inherited from the parent when added through [`NodeHandle::add`].
#[derive(Clone, Default)]
pub struct NodeSpec {
	pub id: Option<String>,
	pub x: Option<f64>,
	pub y: Option<f64>,
	pub r: Option<f64>,
	pub color: Option<String>,
	pub init: Option<InitHook>,
}

impl NodeSpec {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_id(mut self, id: impl Into<String>) -> Self {
		self.id = Some(id.into());
		self
	}

	pub fn with_position(mut self, x: f64, y: f64) -> Self {
		self.x = Some(x);
		self.y = Some(y);
		self
	}

	pub fn with_radius(mut self, r: f64) -> Self {
		self.r = Some(r);
		self
	}

	pub fn with_color(mut self, color: impl Into<String>) -> Self {
		self.color = Some(color.into());
		self
	}

	pub fn with_init(mut self, init: impl Fn(&NodeSelection, &NodeHandle) + 'static) -> Self {
		self.init = Some(Rc::new(init));
		self
	}

	/// Fills every unset attribute except the id from `parent`.
	pub(crate) fn inherit_from(self, parent: &Node) -> Self {
		Self {
			id: self.id,
			x: self.x.or(Some(parent.x())),
			y: self.y.or(Some(parent.y())),
			r: self.r.or(parent.r()),
			color: self.color.or_else(|| parent.color().map(str::to_string)),
			init: self.init.or_else(|| parent.init.clone()),
		}
	}
}

impl fmt::Debug for NodeSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("NodeSpec")
			.field("id", &self.id)
			.field("x", &self.x)
			.field("y", &self.y)
			.field("r", &self.r)
			.field("color", &self.color)
			.field("init", &self.init.is_some())
			.finish()
	}
}

/// Attributes of a link to create.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinkSpec {
	pub color: Option<String>,
	pub distance: Option<f64>,
	pub label: Option<String>,
}

impl LinkSpec {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_color(mut self, color: impl Into<String>) -> Self {
		self.color = Some(color.into());
		self
	}

	pub fn with_distance(mut self, distance: f64) -> Self {
		self.distance = Some(distance);
		self
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}
}

/// Target of [`NodeHandle::link`]: another handle or a raw node id.
#[derive(Clone, Copy)]
pub enum LinkTarget<'a> {
	Handle(&'a NodeHandle),
	Id(&'a str),
}

impl<'a> From<&'a NodeHandle> for LinkTarget<'a> {
	fn from(handle: &'a NodeHandle) -> Self {
		LinkTarget::Handle(handle)
	}
}

impl<'a> From<&'a str> for LinkTarget<'a> {
	fn from(id: &'a str) -> Self {
		LinkTarget::Id(id)
	}
}

impl<'a> From<&'a String> for LinkTarget<'a> {
	fn from(id: &'a String) -> Self {
		LinkTarget::Id(id)
	}
}

/// Proxy for one node of a [`Network`].
#[derive(Clone)]
pub struct NodeHandle {
	network: Network,
	node: NodeKey,
}

impl NodeHandle {
	pub(crate) fn new(network: Network, node: NodeKey) -> Self {
		Self { network, node }
	}

	pub fn key(&self) -> NodeKey {
		self.node
	}

	pub fn network(&self) -> &Network {
		&self.network
	}

	fn read<R>(&self, f: impl FnOnce(&Node) -> R) -> R {
		self.network.with_store(|store| f(store.node(self.node)))
	}

	fn write(&self, f: impl FnOnce(&mut Node)) -> &Self {
		self.network.with_store_mut(|store| f(store.node_mut(self.node)));
		self.network.update();
		self
	}

	pub fn id(&self) -> String {
		self.read(|node| node.id().to_string())
	}

	/// Renames the node, rewriting every incident link. Fails without any
	/// change when the id is taken.
	pub fn set_id(&self, id: impl Into<String>) -> Result<&Self, GraphError> {
		let id = id.into();
		let old = self.id();
		self.network
			.with_store_mut(|store| store.rename(self.node, id.clone()))?;
		debug!("renamed node {old} to {id}");
		self.network.update();
		Ok(self)
	}

	pub fn x(&self) -> f64 {
		self.read(Node::x)
	}

	pub fn set_x(&self, x: f64) -> &Self {
		self.write(|node| node.x = x)
	}

	pub fn y(&self) -> f64 {
		self.read(Node::y)
	}

	pub fn set_y(&self, y: f64) -> &Self {
		self.write(|node| node.y = y)
	}

	/// Assigned radius; `None` means the default radius is drawn.
	pub fn r(&self) -> Option<f64> {
		self.read(Node::r)
	}

	pub fn set_r(&self, r: f64) -> &Self {
		self.write(|node| node.r = Some(r))
	}

	/// Radius used for drawing and edge trimming.
	pub fn radius(&self) -> f64 {
		self.read(Node::radius)
	}

	pub fn color(&self) -> Option<String> {
		self.read(|node| node.color().map(str::to_string))
	}

	pub fn set_color(&self, color: impl Into<String>) -> &Self {
		let color = color.into();
		self.write(|node| node.color = Some(color))
	}

	pub fn init(&self) -> Option<InitHook> {
		self.read(|node| node.init.clone())
	}

	/// Replaces the init hook. Only nodes whose visual is created later
	/// (including children added from this node) run it.
	pub fn set_init(&self, init: impl Fn(&NodeSelection, &NodeHandle) + 'static) -> &Self {
		let init: InitHook = Rc::new(init);
		self.write(|node| node.init = Some(init))
	}

	/// Position pinned by an active drag.
	pub fn fixed(&self) -> Option<(f64, f64)> {
		self.read(Node::fixed)
	}

	pub fn outgoing(&self) -> HashSet<String> {
		self.read(|node| node.outgoing().clone())
	}

	pub fn incoming(&self) -> HashSet<String> {
		self.read(|node| node.incoming().clone())
	}

	/// Adds a node that inherits this node's unset attributes and links this
	/// node to it.
	pub fn add(&self, spec: NodeSpec) -> Result<NodeHandle, GraphError> {
		self.add_linked(spec, LinkSpec::default())
	}

	/// Like [`NodeHandle::add`], with attributes for the new link.
	pub fn add_linked(&self, spec: NodeSpec, link: LinkSpec) -> Result<NodeHandle, GraphError> {
		let child = self.network.with_store_mut(|store| {
			let spec = spec.inherit_from(store.node(self.node));
			let child = store.add_node(spec)?;
			store.connect_keys(self.node, child, link);
			debug!(
				"grew node {} from {}",
				store.node(child).id(),
				store.node(self.node).id()
			);
			Ok::<_, GraphError>(child)
		})?;
		self.network.update();
		Ok(NodeHandle::new(self.network.clone(), child))
	}

	/// Links this node to `target`.
	pub fn link<'a>(&self, target: impl Into<LinkTarget<'a>>) -> Result<&Self, GraphError> {
		self.link_with(target, LinkSpec::default())
	}

	pub fn link_with<'a>(
		&self,
		target: impl Into<LinkTarget<'a>>,
		spec: LinkSpec,
	) -> Result<&Self, GraphError> {
		let target = self.network.resolve(target.into())?;
		self.network.connect_keys(self.node, target, spec);
		Ok(self)
	}
}

impl PartialEq for NodeHandle {
	fn eq(&self, other: &Self) -> bool {
		self.node == other.node && self.network.ptr_eq(&other.network)
	}
}

impl fmt::Debug for NodeHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("NodeHandle").field(&self.id()).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn inherit_only_fills_unset_fields() {
		let network = Network::new();
		let parent = network
			.add_node(
				NodeSpec::new()
					.with_id("p")
					.with_position(5.0, 6.0)
					.with_radius(7.0)
					.with_color("#123456"),
			)
			.unwrap();

		let spec = network.with_store(|store| {
			NodeSpec::new()
				.with_color("#abcdef")
				.inherit_from(store.node(parent.key()))
		});
		assert_eq!(spec.id, None);
		assert_eq!((spec.x, spec.y), (Some(5.0), Some(6.0)));
		assert_eq!(spec.r, Some(7.0));
		assert_eq!(spec.color.as_deref(), Some("#abcdef"));
	}

	#[test]
	fn link_target_conversions() {
		let network = Network::new();
		let a = network.add_node(NodeSpec::new()).unwrap();
		let id = String::from("n1");
		assert!(matches!(LinkTarget::from(&a), LinkTarget::Handle(_)));
		assert!(matches!(LinkTarget::from("n1"), LinkTarget::Id("n1")));
		assert!(matches!(LinkTarget::from(&id), LinkTarget::Id("n1")));
	}

	#[test]
	fn debug_shows_the_current_id() {
		let network = Network::new();
		let a = network.add_node(NodeSpec::new().with_id("a")).unwrap();
		assert_eq!(format!("{a:?}"), "NodeHandle(\"a\")");
		a.set_id("b").unwrap();
		assert_eq!(format!("{a:?}"), "NodeHandle(\"b\")");
	}

	#[test]
	fn add_linked_labels_the_new_link() {
		let network = Network::new();
		let parent = network.add_node(NodeSpec::new().with_id("p")).unwrap();
		let child = parent
			.add_linked(NodeSpec::new().with_id("c"), LinkSpec::new().with_label("Attached to"))
			.unwrap();

		let label = network.with_store(|store| {
			store
				.find_link("p", &child.id())
				.and_then(|link| link.label().map(str::to_string))
		});
		assert_eq!(label.as_deref(), Some("Attached to"));
	}
}
