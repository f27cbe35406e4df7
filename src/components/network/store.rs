//! Identity-keyed storage for nodes and directed links.
//!
//! Nodes live in an append-only arena addressed by [`NodeKey`] and are indexed
//! by their string id. Links are indexed by the ordered pair of their endpoint
//! ids ([`LinkKey`]); a reversed pair is a distinct link. Every node keeps the
//! ids of its outgoing and incoming neighbors, and each mutation updates all
//! affected adjacency sets before returning.

use std::collections::{HashMap, HashSet};
use std::fmt;

use super::error::GraphError;
use super::handle::{LinkSpec, NodeSpec};
use super::reconcile::InitHook;

/// Radius used for nodes that never had one assigned.
pub const DEFAULT_RADIUS: f64 = 10.0;

/// Stable address of a node inside its store. Survives renames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(usize);

impl NodeKey {
	/// Arena slot, also the node's creation order.
	pub(crate) fn index(self) -> usize {
		self.0
	}
}

/// Stable address of a link inside its store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkIdx(usize);

/// Ordered `(source id, target id)` pair identifying a link.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LinkKey {
	pub source: String,
	pub target: String,
}

impl LinkKey {
	pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
		}
	}

	/// The key of the link running the other way.
	pub fn reversed(&self) -> Self {
		Self::new(self.target.clone(), self.source.clone())
	}
}

impl fmt::Display for LinkKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} -> {}", self.source, self.target)
	}
}

/// A vertex of the network.
pub struct Node {
	key: NodeKey,
	id: String,
	pub(crate) x: f64,
	pub(crate) y: f64,
	pub(crate) r: Option<f64>,
	pub(crate) color: Option<String>,
	/// Pinned position, set only while the node is being dragged.
	pub(crate) fixed: Option<(f64, f64)>,
	pub(crate) init: Option<InitHook>,
	outgoing: HashSet<String>,
	incoming: HashSet<String>,
}

impl Node {
	pub fn key(&self) -> NodeKey {
		self.key
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn x(&self) -> f64 {
		self.x
	}

	pub fn y(&self) -> f64 {
		self.y
	}

	/// Assigned radius, if any.
	pub fn r(&self) -> Option<f64> {
		self.r
	}

	/// Radius used for drawing and edge trimming.
	pub fn radius(&self) -> f64 {
		self.r.unwrap_or(DEFAULT_RADIUS)
	}

	pub fn color(&self) -> Option<&str> {
		self.color.as_deref()
	}

	pub fn fixed(&self) -> Option<(f64, f64)> {
		self.fixed
	}

	/// Ids of nodes this node links to.
	pub fn outgoing(&self) -> &HashSet<String> {
		&self.outgoing
	}

	/// Ids of nodes linking to this node.
	pub fn incoming(&self) -> &HashSet<String> {
		&self.incoming
	}
}

impl fmt::Debug for Node {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Node")
			.field("id", &self.id)
			.field("x", &self.x)
			.field("y", &self.y)
			.field("r", &self.r)
			.field("color", &self.color)
			.field("fixed", &self.fixed)
			.field("outgoing", &self.outgoing)
			.field("incoming", &self.incoming)
			.finish_non_exhaustive()
	}
}

/// A directed edge. Endpoints are references into the node arena.
#[derive(Clone, Debug)]
pub struct Link {
	key: LinkKey,
	source: NodeKey,
	target: NodeKey,
	pub(crate) color: Option<String>,
	pub(crate) distance: Option<f64>,
	pub(crate) label: Option<String>,
}

impl Link {
	pub fn key(&self) -> &LinkKey {
		&self.key
	}

	pub fn source(&self) -> NodeKey {
		self.source
	}

	pub fn target(&self) -> NodeKey {
		self.target
	}

	pub fn color(&self) -> Option<&str> {
		self.color.as_deref()
	}

	/// Preferred rest length handed to the physics integrator.
	pub fn distance(&self) -> Option<f64> {
		self.distance
	}

	/// Text drawn halfway along the link.
	pub fn label(&self) -> Option<&str> {
		self.label.as_deref()
	}
}

/// Whether [`GraphStore::connect`] created a link or replaced an existing one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Connected {
	Created(LinkIdx),
	Replaced(LinkIdx),
}

impl Connected {
	pub fn index(self) -> LinkIdx {
		match self {
			Connected::Created(idx) | Connected::Replaced(idx) => idx,
		}
	}
}

/// Nodes keyed by id and links keyed by ordered id pair.
#[derive(Default)]
pub struct GraphStore {
	/// Last auto-generated id suffix.
	counter: u64,
	nodes: Vec<Node>,
	ids: HashMap<String, NodeKey>,
	links: Vec<Link>,
	link_index: HashMap<LinkKey, LinkIdx>,
}

impl GraphStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	pub fn link_count(&self) -> usize {
		self.links.len()
	}

	/// Inserts a node built from `spec`, filling unset fields with defaults.
	///
	/// Nothing is inserted when the id is already taken.
	pub fn add_node(&mut self, spec: NodeSpec) -> Result<NodeKey, GraphError> {
		let id = match spec.id {
			Some(id) if self.ids.contains_key(&id) => return Err(GraphError::duplicate(id)),
			Some(id) => id,
			None => self.generate_id(),
		};

		let key = NodeKey(self.nodes.len());
		self.nodes.push(Node {
			key,
			id: id.clone(),
			x: spec.x.unwrap_or(0.0),
			y: spec.y.unwrap_or(0.0),
			r: spec.r,
			color: spec.color,
			fixed: None,
			init: spec.init,
			outgoing: HashSet::new(),
			incoming: HashSet::new(),
		});
		self.ids.insert(id, key);
		Ok(key)
	}

	fn generate_id(&mut self) -> String {
		loop {
			self.counter += 1;
			let id = format!("n{}", self.counter);
			if !self.ids.contains_key(&id) {
				return id;
			}
		}
	}

	pub fn key_of(&self, id: &str) -> Option<NodeKey> {
		self.ids.get(id).copied()
	}

	pub fn contains(&self, id: &str) -> bool {
		self.ids.contains_key(id)
	}

	/// Node behind `key`. Keys are only minted by this store and nodes are
	/// never removed, so every key it handed out stays valid.
	pub fn node(&self, key: NodeKey) -> &Node {
		&self.nodes[key.0]
	}

	pub(crate) fn node_mut(&mut self, key: NodeKey) -> &mut Node {
		&mut self.nodes[key.0]
	}

	pub fn get(&self, id: &str) -> Option<&Node> {
		self.key_of(id).map(|key| self.node(key))
	}

	/// Nodes in insertion order.
	pub fn nodes(&self) -> impl Iterator<Item = &Node> {
		self.nodes.iter()
	}

	pub fn link(&self, idx: LinkIdx) -> &Link {
		&self.links[idx.0]
	}

	/// Links in creation order, with their indices.
	pub fn links(&self) -> impl Iterator<Item = (LinkIdx, &Link)> {
		self.links.iter().enumerate().map(|(i, link)| (LinkIdx(i), link))
	}

	pub fn link_idx(&self, source: &str, target: &str) -> Option<LinkIdx> {
		self.link_index.get(&LinkKey::new(source, target)).copied()
	}

	pub fn find_link(&self, source: &str, target: &str) -> Option<&Link> {
		self.link_idx(source, target).map(|idx| self.link(idx))
	}

	/// Whether a link `source -> target` exists. Allocation free: answered
	/// through the source's outgoing set, which mirrors the link keys.
	pub fn has_link(&self, source: &str, target: &str) -> bool {
		self.get(source)
			.is_some_and(|node| node.outgoing.contains(target))
	}

	/// A link is bidirectional when the reversed pair is also stored.
	pub fn is_bidirectional(&self, idx: LinkIdx) -> bool {
		let key = &self.link(idx).key;
		self.has_link(&key.target, &key.source)
	}

	/// Connects two nodes by id.
	pub fn connect(
		&mut self,
		source: &str,
		target: &str,
		spec: LinkSpec,
	) -> Result<Connected, GraphError> {
		let source = self.key_of(source).ok_or_else(|| GraphError::unknown(source))?;
		let target = self.key_of(target).ok_or_else(|| GraphError::unknown(target))?;
		Ok(self.connect_keys(source, target, spec))
	}

	/// Connects two nodes. Repeating an existing ordered pair keeps the link
	/// and replaces its attributes (last write wins).
	pub fn connect_keys(&mut self, source: NodeKey, target: NodeKey, spec: LinkSpec) -> Connected {
		let key = LinkKey::new(self.node(source).id.clone(), self.node(target).id.clone());

		if let Some(&idx) = self.link_index.get(&key) {
			let link = &mut self.links[idx.0];
			link.color = spec.color;
			link.distance = spec.distance;
			link.label = spec.label;
			return Connected::Replaced(idx);
		}

		let idx = LinkIdx(self.links.len());
		self.nodes[source.0].outgoing.insert(key.target.clone());
		self.nodes[target.0].incoming.insert(key.source.clone());
		self.link_index.insert(key.clone(), idx);
		self.links.push(Link {
			key,
			source,
			target,
			color: spec.color,
			distance: spec.distance,
			label: spec.label,
		});
		Connected::Created(idx)
	}

	/// Gives a node a new id, rewriting every incident link key and every
	/// neighbor's adjacency set. Either everything changes or nothing does.
	pub fn rename(&mut self, key: NodeKey, new_id: impl Into<String>) -> Result<(), GraphError> {
		let new_id = new_id.into();
		let old_id = self.node(key).id.clone();
		if new_id == old_id {
			return Ok(());
		}
		if self.ids.contains_key(&new_id) {
			return Err(GraphError::duplicate(new_id));
		}

		let node = self.node(key);
		let mut incident: Vec<LinkIdx> = node
			.outgoing
			.iter()
			.map(|target| LinkKey::new(old_id.as_str(), target.as_str()))
			.chain(
				node.incoming
					.iter()
					.map(|source| LinkKey::new(source.as_str(), old_id.as_str())),
			)
			.filter_map(|k| self.link_index.get(&k).copied())
			.collect();
		// A self-loop is reached through both sets.
		incident.sort_unstable();
		incident.dedup();

		let mut touched: HashSet<NodeKey> = HashSet::from([key]);
		for &idx in &incident {
			let link = &self.links[idx.0];
			touched.insert(link.source);
			touched.insert(link.target);
			self.link_index.remove(&link.key);
		}

		self.ids.remove(&old_id);
		self.ids.insert(new_id.clone(), key);
		self.nodes[key.0].id = new_id.clone();

		for &idx in &incident {
			let link = &mut self.links[idx.0];
			link.key = LinkKey::new(
				self.nodes[link.source.0].id.clone(),
				self.nodes[link.target.0].id.clone(),
			);
			self.link_index.insert(link.key.clone(), idx);
		}

		for touched_key in touched {
			let node = &mut self.nodes[touched_key.0];
			if node.outgoing.remove(&old_id) {
				node.outgoing.insert(new_id.clone());
			}
			if node.incoming.remove(&old_id) {
				node.incoming.insert(new_id.clone());
			}
		}

		Ok(())
	}

	/// Writes a position computed by the physics integrator. Pinned nodes
	/// stay on their pinned position.
	pub(crate) fn apply_simulated(&mut self, id: &str, x: f64, y: f64) {
		let Some(key) = self.key_of(id) else {
			return;
		};
		let node = &mut self.nodes[key.0];
		let (x, y) = node.fixed.unwrap_or((x, y));
		if x.is_finite() && y.is_finite() {
			node.x = x;
			node.y = y;
		}
	}
}
