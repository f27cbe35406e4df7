//! Visual scene kept in step with the graph store.
//!
//! Reconciliation is enter-only: entities that appear in the store get a
//! visual bound from their current state, existing visuals are left alone,
//! and nothing is ever removed. Node and link arenas only grow, so the
//! entities needing a visual are exactly those past the scene's current
//! length and the work is proportional to what was added. Positions, radii,
//! colors and paths are re-read from the store on every tick by
//! [`Scene::refresh`].

use std::cell::RefCell;
use std::rc::Rc;

use super::geometry::EdgePath;
use super::handle::NodeHandle;
use super::store::{GraphStore, LinkIdx, Node, NodeKey};
use super::theme::{Paint, Theme};

/// Called once when a node's visual is created.
pub type InitHook = Rc<dyn Fn(&NodeSelection, &NodeHandle)>;

/// Called when a node's visual is clicked.
pub type ClickHandler = Rc<dyn Fn(&NodeClick, &NodeHandle)>;

/// A click on a node visual.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeClick {
	/// Pointer position in graph space.
	pub x: f64,
	pub y: f64,
	/// Click count within the platform's double-click interval.
	pub detail: i32,
}

#[derive(Default)]
struct NodeListeners {
	click: RefCell<Vec<ClickHandler>>,
}

/// The visual side of one node, handed to init hooks so they can attach
/// event handlers.
#[derive(Clone)]
pub struct NodeSelection {
	id: String,
	listeners: Rc<NodeListeners>,
}

impl NodeSelection {
	/// Element id of the visual, the node's id at creation time.
	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn on_click(&self, handler: impl Fn(&NodeClick, &NodeHandle) + 'static) -> &Self {
		self.listeners.click.borrow_mut().push(Rc::new(handler));
		self
	}

	/// Snapshot of the registered click handlers, safe to call while
	/// handlers register more.
	pub(crate) fn click_handlers(&self) -> Vec<ClickHandler> {
		self.listeners.click.borrow().clone()
	}
}

/// Circle drawn for a node.
pub struct NodeVisual {
	node: NodeKey,
	/// Mirrors the node id, so repeated binding finds the same element.
	pub id: String,
	pub cx: f64,
	pub cy: f64,
	pub r: f64,
	pub fill: Paint,
	/// Tooltip text.
	pub title: String,
	selection: NodeSelection,
}

impl NodeVisual {
	fn bind(node: &Node, theme: &Theme) -> Self {
		let selection = NodeSelection {
			id: node.id().to_string(),
			listeners: Rc::default(),
		};
		let mut visual = Self {
			node: node.key(),
			id: String::new(),
			cx: 0.0,
			cy: 0.0,
			r: 0.0,
			fill: theme.node_fill.into(),
			title: String::new(),
			selection,
		};
		visual.update(node, theme);
		visual
	}

	fn update(&mut self, node: &Node, theme: &Theme) {
		if self.id != node.id() {
			self.id = node.id().to_string();
			self.title = self.id.clone();
		}
		self.cx = node.x();
		self.cy = node.y();
		self.r = node.radius();
		self.fill = Paint::resolve(node.color(), theme.node_fill);
	}

	pub fn node(&self) -> NodeKey {
		self.node
	}

	pub fn selection(&self) -> &NodeSelection {
		&self.selection
	}

	pub fn contains(&self, x: f64, y: f64) -> bool {
		(x - self.cx).hypot(y - self.cy) <= self.r
	}
}

/// Path drawn for a link.
pub struct LinkVisual {
	link: LinkIdx,
	pub source: NodeKey,
	pub target: NodeKey,
	pub stroke: Paint,
	pub path: EdgePath,
	/// Text drawn halfway along the path.
	pub label: Option<String>,
}

impl LinkVisual {
	pub fn link(&self) -> LinkIdx {
		self.link
	}

	fn update(&mut self, store: &GraphStore, theme: &Theme) {
		let link = store.link(self.link);
		self.stroke = Paint::resolve(link.color(), theme.link_stroke);
		if self.label.as_deref() != link.label() {
			self.label = link.label().map(str::to_string);
		}
		self.path = store.link_geometry(self.link);
	}
}

/// A node whose visual was just created and whose init hook is due.
pub struct Entered {
	pub node: NodeKey,
	pub hook: InitHook,
	pub selection: NodeSelection,
}

/// Every visual created so far, in creation (and drawing) order.
pub struct Scene {
	theme: Theme,
	nodes: Vec<NodeVisual>,
	links: Vec<LinkVisual>,
}

impl Scene {
	pub fn new(theme: Theme) -> Self {
		Self {
			theme,
			nodes: Vec::new(),
			links: Vec::new(),
		}
	}

	pub fn theme(&self) -> &Theme {
		&self.theme
	}

	pub fn nodes(&self) -> &[NodeVisual] {
		&self.nodes
	}

	pub fn links(&self) -> &[LinkVisual] {
		&self.links
	}

	/// Visuals are created in arena order, so a node's slot is its index.
	pub fn node_visual(&self, key: NodeKey) -> Option<&NodeVisual> {
		self.nodes.get(key.index()).filter(|visual| visual.node == key)
	}

	/// Creates visuals for entities without one and returns the init hooks
	/// to run. Hooks are returned rather than called so the caller can run
	/// them without holding any borrow of the network.
	pub fn reconcile(&mut self, store: &GraphStore) -> Vec<Entered> {
		let mut entered = Vec::new();

		for node in store.nodes().skip(self.nodes.len()) {
			let visual = NodeVisual::bind(node, &self.theme);
			if let Some(hook) = &node.init {
				entered.push(Entered {
					node: node.key(),
					hook: hook.clone(),
					selection: visual.selection.clone(),
				});
			}
			self.nodes.push(visual);
		}

		for (idx, link) in store.links().skip(self.links.len()) {
			let mut visual = LinkVisual {
				link: idx,
				source: link.source(),
				target: link.target(),
				stroke: self.theme.link_stroke.into(),
				path: EdgePath::Empty,
				label: None,
			};
			visual.update(store, &self.theme);
			self.links.push(visual);
		}

		entered
	}

	/// Re-reads every visual's attributes from the store.
	pub fn refresh(&mut self, store: &GraphStore) {
		for visual in &mut self.nodes {
			visual.update(store.node(visual.node), &self.theme);
		}
		for visual in &mut self.links {
			visual.update(store, &self.theme);
		}
	}

	/// Topmost node visual under a graph-space point.
	pub fn node_at(&self, x: f64, y: f64) -> Option<NodeKey> {
		self.nodes
			.iter()
			.rev()
			.find(|visual| visual.contains(x, y))
			.map(|visual| visual.node)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::network::handle::{LinkSpec, NodeSpec};
	use crate::components::network::theme::Color;

	fn store_with(ids: &[&str]) -> GraphStore {
		let mut store = GraphStore::new();
		for (i, id) in ids.iter().enumerate() {
			store
				.add_node(NodeSpec::new().with_id(*id).with_position(i as f64 * 100.0, 0.0))
				.unwrap();
		}
		store
	}

	#[test]
	fn creates_visuals_only_for_new_entities() {
		let mut store = store_with(&["a", "b"]);
		store.connect("a", "b", LinkSpec::default()).unwrap();
		let mut scene = Scene::new(Theme::default());

		scene.reconcile(&store);
		assert_eq!(scene.nodes().len(), 2);
		assert_eq!(scene.links().len(), 1);

		scene.reconcile(&store);
		assert_eq!(scene.nodes().len(), 2);
		assert_eq!(scene.links().len(), 1);

		store.add_node(NodeSpec::new().with_id("c")).unwrap();
		store.connect("b", "c", LinkSpec::default()).unwrap();
		// Upsert keeps the existing link, so no new visual for it.
		store.connect("a", "b", LinkSpec::default()).unwrap();
		scene.reconcile(&store);
		assert_eq!(scene.nodes().len(), 3);
		assert_eq!(scene.links().len(), 2);
		assert_eq!(scene.nodes()[2].id, "c");
	}

	#[test]
	fn binds_current_attributes_with_defaults() {
		let mut store = GraphStore::new();
		store
			.add_node(NodeSpec::new().with_id("a").with_position(3.0, 4.0))
			.unwrap();
		store
			.add_node(NodeSpec::new().with_id("b").with_radius(4.0).with_color("#1a8436"))
			.unwrap();
		store
			.connect("a", "b", LinkSpec::new().with_color("#ff0000"))
			.unwrap();
		let theme = Theme::default();
		let mut scene = Scene::new(theme.clone());
		scene.reconcile(&store);

		let a = &scene.nodes()[0];
		assert_eq!((a.cx, a.cy, a.r), (3.0, 4.0, 10.0));
		assert_eq!(a.fill, Paint::Rgba(theme.node_fill));
		assert_eq!(a.title, "a");
		let b = &scene.nodes()[1];
		assert_eq!(b.r, 4.0);
		assert_eq!(b.fill, Paint::Rgba(Color::rgb(0x1a, 0x84, 0x36)));
		assert_eq!(scene.links()[0].stroke, Paint::Rgba(Color::rgb(255, 0, 0)));
	}

	#[test]
	fn refresh_follows_moved_nodes() {
		let mut store = store_with(&["a", "b"]);
		store.connect("a", "b", LinkSpec::default()).unwrap();
		let mut scene = Scene::new(Theme::default());
		scene.reconcile(&store);
		assert_eq!(scene.links()[0].path.to_string(), "M 10,0 L 85,0 M 90,0");

		store.apply_simulated("b", 20.0, 0.0);
		scene.refresh(&store);
		assert_eq!(scene.nodes()[1].cx, 20.0);
		assert!(scene.links()[0].path.is_empty());
	}

	#[test]
	fn init_hooks_are_reported_once() {
		let mut store = GraphStore::new();
		store
			.add_node(NodeSpec::new().with_id("a").with_init(|_, _| {}))
			.unwrap();
		store.add_node(NodeSpec::new().with_id("b")).unwrap();
		let mut scene = Scene::new(Theme::default());

		let entered = scene.reconcile(&store);
		assert_eq!(entered.len(), 1);
		assert_eq!(entered[0].selection.id(), "a");
		assert!(scene.reconcile(&store).is_empty());
	}

	#[test]
	fn hit_testing_prefers_topmost_visual() {
		let mut store = GraphStore::new();
		store.add_node(NodeSpec::new().with_id("under")).unwrap();
		store
			.add_node(NodeSpec::new().with_id("over").with_position(5.0, 0.0))
			.unwrap();
		let mut scene = Scene::new(Theme::default());
		scene.reconcile(&store);

		assert_eq!(scene.node_at(4.0, 0.0), store.key_of("over"));
		assert_eq!(scene.node_at(-8.0, 0.0), store.key_of("under"));
		assert_eq!(scene.node_at(100.0, 100.0), None);
	}

	#[test]
	fn named_colors_and_labels_reach_the_visuals() {
		let mut store = store_with(&["a", "b"]);
		let a = store.key_of("a").unwrap();
		store.node_mut(a).color = Some("steelblue".into());
		store
			.connect(
				"a",
				"b",
				LinkSpec::new().with_color("rebeccapurple").with_label("uses"),
			)
			.unwrap();
		let mut scene = Scene::new(Theme::default());
		scene.reconcile(&store);

		assert_eq!(scene.nodes()[0].fill.to_css(), "steelblue");
		assert_eq!(scene.links()[0].stroke.to_css(), "rebeccapurple");
		assert_eq!(scene.links()[0].label.as_deref(), Some("uses"));

		store.connect("a", "b", LinkSpec::new().with_label("needs")).unwrap();
		scene.refresh(&store);
		assert_eq!(scene.links()[0].label.as_deref(), Some("needs"));
		assert_eq!(scene.links()[0].stroke, Paint::Rgba(Theme::default().link_stroke));
	}

	#[test]
	fn node_visual_is_found_by_key() {
		let store = store_with(&["a", "b", "c"]);
		let mut scene = Scene::new(Theme::default());
		scene.reconcile(&store);

		for id in ["a", "b", "c"] {
			let key = store.key_of(id).unwrap();
			assert_eq!(scene.node_visual(key).map(|visual| visual.id.as_str()), Some(id));
		}

		let bigger = store_with(&["a", "b", "c", "d"]);
		let late = bigger.key_of("d").unwrap();
		assert!(scene.node_visual(late).is_none());
	}
}
