//! The network: graph store, visual scene, physics integrator and drag state
//! behind one shared, single-threaded owner.
//!
//! Every mutation follows the same contract: change the store, then
//! reconcile the scene and hand the integrator a fresh snapshot before
//! returning. Init hooks of newly created visuals run after all borrows are
//! released, so they are free to mutate the network themselves.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info, warn};

use super::config::NetworkConfig;
use super::drag::{DragTransition, DragTracker, PointerId};
use super::error::GraphError;
use super::geometry::EdgePath;
use super::handle::{LinkSpec, LinkTarget, NodeHandle, NodeSpec};
use super::integrator::{ForceIntegrator, Integrator, SimLink, SimNode};
use super::reconcile::{Entered, InitHook, NodeClick, Scene};
use super::store::{Connected, GraphStore, NodeKey};
use super::theme::Theme;
use super::types::GraphData;

struct NetworkState {
	store: GraphStore,
	scene: Scene,
	integrator: Box<dyn Integrator>,
	drag: DragTracker,
	config: NetworkConfig,
}

impl NetworkState {
	fn snapshot(&self) -> (Vec<SimNode>, Vec<SimLink>) {
		let nodes = self
			.store
			.nodes()
			.map(|node| SimNode {
				id: node.id().to_string(),
				x: node.x(),
				y: node.y(),
				fx: node.fixed().map(|(x, _)| x),
				fy: node.fixed().map(|(_, y)| y),
			})
			.collect();
		let links = self
			.store
			.links()
			.map(|(_, link)| SimLink {
				source: link.key().source.clone(),
				target: link.key().target.clone(),
				distance: link.distance().unwrap_or(self.config.link_distance),
			})
			.collect();
		(nodes, links)
	}

	fn pin(&mut self, node: NodeKey, fixed: Option<(f64, f64)>) {
		let entry = self.store.node_mut(node);
		entry.fixed = fixed;
		if let Some((x, y)) = fixed {
			entry.x = x;
			entry.y = y;
		}
		self.integrator.pin(entry.id(), fixed);
	}

	fn apply_drag(&mut self, transition: DragTransition, position: (f64, f64)) {
		match transition {
			DragTransition::Started { node, reheat } => {
				if reheat {
					self.integrator.set_alpha_target(self.config.drag_alpha_target);
					self.integrator.restart();
				}
				self.pin(node, Some(position));
			}
			DragTransition::Moved { node } => self.pin(node, Some(position)),
			DragTransition::Ended {
				node,
				release,
				settle,
			} => {
				if settle {
					self.integrator.set_alpha_target(0.0);
				}
				if release {
					self.pin(node, None);
				}
			}
		}
	}
}

/// A force-directed network of nodes and directed links.
///
/// Cloning is cheap and yields another owner of the same network.
#[derive(Clone)]
pub struct Network {
	inner: Rc<RefCell<NetworkState>>,
}

impl Default for Network {
	fn default() -> Self {
		Self::new()
	}
}

impl Network {
	pub fn new() -> Self {
		Self::with_config(NetworkConfig::default(), Theme::default())
	}

	pub fn with_config(config: NetworkConfig, theme: Theme) -> Self {
		let integrator = ForceIntegrator::new(config.force);
		Self::with_integrator(integrator, config, theme)
	}

	/// Builds a network driven by a custom physics integrator.
	pub fn with_integrator(
		integrator: impl Integrator + 'static,
		config: NetworkConfig,
		theme: Theme,
	) -> Self {
		let network = Self {
			inner: Rc::new(RefCell::new(NetworkState {
				store: GraphStore::new(),
				scene: Scene::new(theme),
				integrator: Box::new(integrator),
				drag: DragTracker::new(),
				config,
			})),
		};
		network.update();
		network
	}

	/// Builds a network from bootstrap data. Records that cannot be added
	/// are skipped with a warning.
	pub fn from_data(data: &GraphData) -> Self {
		let network = Self::new();
		network.load(data);
		network
	}

	pub(crate) fn ptr_eq(&self, other: &Network) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}

	pub(crate) fn with_store<R>(&self, f: impl FnOnce(&GraphStore) -> R) -> R {
		f(&self.inner.borrow().store)
	}

	pub(crate) fn with_store_mut<R>(&self, f: impl FnOnce(&mut GraphStore) -> R) -> R {
		f(&mut self.inner.borrow_mut().store)
	}

	/// Read access to the visual scene, for painting.
	pub fn with_scene<R>(&self, f: impl FnOnce(&Scene) -> R) -> R {
		f(&self.inner.borrow().scene)
	}

	pub fn config(&self) -> NetworkConfig {
		self.inner.borrow().config.clone()
	}

	pub fn node_count(&self) -> usize {
		self.with_store(GraphStore::node_count)
	}

	pub fn link_count(&self) -> usize {
		self.with_store(GraphStore::link_count)
	}

	/// Adds a node and re-renders. Fails when the id is already taken.
	pub fn add_node(&self, spec: NodeSpec) -> Result<NodeHandle, GraphError> {
		let key = self.with_store_mut(|store| store.add_node(spec))?;
		debug!("added node {}", self.with_store(|store| store.node(key).id().to_string()));
		self.update();
		Ok(self.handle(key))
	}

	pub fn get_node(&self, id: &str) -> Option<NodeHandle> {
		self.with_store(|store| store.key_of(id))
			.map(|key| self.handle(key))
	}

	/// Handles for every node, in insertion order.
	pub fn nodes(&self) -> Vec<NodeHandle> {
		let keys: Vec<NodeKey> = self.with_store(|store| store.nodes().map(|n| n.key()).collect());
		keys.into_iter().map(|key| self.handle(key)).collect()
	}

	pub(crate) fn handle(&self, key: NodeKey) -> NodeHandle {
		NodeHandle::new(self.clone(), key)
	}

	/// Links `source` to `target`. Repeating a pair replaces the link's
	/// attributes.
	pub fn connect(&self, source: &str, target: &str) -> Result<(), GraphError> {
		self.connect_with(source, target, LinkSpec::default())
	}

	pub fn connect_with(&self, source: &str, target: &str, spec: LinkSpec) -> Result<(), GraphError> {
		let connected = self.with_store_mut(|store| store.connect(source, target, spec))?;
		log_connected(connected, source, target);
		self.update();
		Ok(())
	}

	pub(crate) fn connect_keys(&self, source: NodeKey, target: NodeKey, spec: LinkSpec) {
		let (connected, source_id, target_id) = self.with_store_mut(|store| {
			let connected = store.connect_keys(source, target, spec);
			let key = store.link(connected.index()).key();
			(connected, key.source.clone(), key.target.clone())
		});
		log_connected(connected, &source_id, &target_id);
		self.update();
	}

	pub(crate) fn resolve(&self, target: LinkTarget<'_>) -> Result<NodeKey, GraphError> {
		match target {
			LinkTarget::Handle(handle) if handle.network().ptr_eq(self) => Ok(handle.key()),
			LinkTarget::Handle(handle) => Err(GraphError::unknown(handle.id())),
			LinkTarget::Id(id) => self
				.with_store(|store| store.key_of(id))
				.ok_or_else(|| GraphError::unknown(id)),
		}
	}

	pub fn has_link(&self, source: &str, target: &str) -> bool {
		self.with_store(|store| store.has_link(source, target))
	}

	/// Current path of the link `source -> target`, if it exists.
	pub fn link_path(&self, source: &str, target: &str) -> Option<EdgePath> {
		self.with_store(|store| {
			store
				.link_idx(source, target)
				.map(|idx| store.link_geometry(idx))
		})
	}

	/// Adds every node, then every link of `data`, re-rendering once.
	pub fn load(&self, data: &GraphData) {
		self.load_with(data, None);
	}

	/// Like [`load`](Self::load), giving every loaded node the init hook
	/// `init`.
	pub fn load_with(&self, data: &GraphData, init: Option<InitHook>) {
		let (mut nodes, mut links) = (0, 0);
		self.with_store_mut(|store| {
			for node in &data.nodes {
				let spec = NodeSpec {
					init: init.clone(),
					..node.spec()
				};
				match store.add_node(spec) {
					Ok(_) => nodes += 1,
					Err(e) => warn!("netgraph: skipping node: {e}"),
				}
			}
			for link in &data.links {
				match store.connect(&link.source, &link.target, link.spec()) {
					Ok(_) => links += 1,
					Err(e) => warn!("netgraph: skipping link {} -> {}: {e}", link.source, link.target),
				}
			}
		});
		info!("netgraph: loaded {nodes} nodes, {links} links");
		self.update();
	}

	/// Reconciles the scene with the store and reloads the integrator.
	pub fn update(&self) {
		let entered: Vec<Entered> = {
			let mut guard = self.inner.borrow_mut();
			let state = &mut *guard;
			let entered = state.scene.reconcile(&state.store);
			let (nodes, links) = state.snapshot();
			state.integrator.load(&nodes, &links);
			entered
		};

		for Entered {
			node,
			hook,
			selection,
		} in entered
		{
			hook(&selection, &self.handle(node));
		}
	}

	/// Advances the simulation and refreshes every visual from the new
	/// positions.
	pub fn tick(&self, dt: f32) {
		let mut guard = self.inner.borrow_mut();
		let state = &mut *guard;
		state.integrator.tick(dt);
		let store = &mut state.store;
		state
			.integrator
			.visit_positions(&mut |id, x, y| store.apply_simulated(id, x, y));
		state.scene.refresh(&state.store);
	}

	/// Current settling energy of the integrator.
	pub fn alpha(&self) -> f64 {
		self.inner.borrow().integrator.alpha()
	}

	/// Number of drags in progress.
	pub fn active_drags(&self) -> usize {
		self.inner.borrow().drag.active()
	}

	/// Starts dragging `node` with `pointer`, pinning it at `(x, y)`.
	pub fn drag_start(&self, pointer: PointerId, node: &NodeHandle, x: f64, y: f64) {
		if !node.network().ptr_eq(self) {
			return;
		}
		let mut guard = self.inner.borrow_mut();
		let state = &mut *guard;
		for transition in state.drag.start(pointer, node.key()) {
			state.apply_drag(transition, (x, y));
		}
		state.scene.refresh(&state.store);
	}

	pub fn drag_move(&self, pointer: PointerId, x: f64, y: f64) {
		let mut guard = self.inner.borrow_mut();
		let state = &mut *guard;
		if let Some(transition) = state.drag.drag(pointer) {
			state.apply_drag(transition, (x, y));
			state.scene.refresh(&state.store);
		}
	}

	/// Ends the drag of `pointer`. Returns whether a drag was active.
	pub fn drag_end(&self, pointer: PointerId) -> bool {
		let mut guard = self.inner.borrow_mut();
		let state = &mut *guard;
		match state.drag.end(pointer) {
			Some(transition) => {
				state.apply_drag(transition, (0.0, 0.0));
				true
			}
			None => false,
		}
	}

	/// Node whose visual is topmost under a graph-space point.
	pub fn node_at(&self, x: f64, y: f64) -> Option<NodeHandle> {
		self.with_scene(|scene| scene.node_at(x, y))
			.map(|key| self.handle(key))
	}

	/// Runs the click handlers registered on `node`'s visual.
	pub fn click(&self, node: &NodeHandle, click: NodeClick) {
		if !node.network().ptr_eq(self) {
			return;
		}
		let handlers = self.with_scene(|scene| {
			scene
				.node_visual(node.key())
				.map(|visual| visual.selection().click_handlers())
				.unwrap_or_default()
		});
		for handler in handlers {
			handler(&click, node);
		}
	}
}

fn log_connected(connected: Connected, source: &str, target: &str) {
	match connected {
		Connected::Created(_) => debug!("linked {source} -> {target}"),
		Connected::Replaced(_) => debug!("replaced link {source} -> {target}"),
	}
}
