//! Physics integration seam.
//!
//! The network hands the integrator full array snapshots of its nodes and
//! links after every mutation and reads positions back after every tick.
//! [`ForceIntegrator`] drives the `force_graph` simulation and adds the
//! settling-energy (alpha) model that dragging relies on.

use std::collections::{HashMap, HashSet};

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData};

use super::config::ForceConfig;

/// A node as seen by the physics integrator.
#[derive(Clone, Debug, PartialEq)]
pub struct SimNode {
	pub id: String,
	pub x: f64,
	pub y: f64,
	pub fx: Option<f64>,
	pub fy: Option<f64>,
}

/// A link as seen by the physics integrator.
#[derive(Clone, Debug, PartialEq)]
pub struct SimLink {
	pub source: String,
	pub target: String,
	/// Rest length of the link.
	pub distance: f64,
}

/// Advances node positions. Called only from the UI thread.
pub trait Integrator {
	/// Replaces the simulated nodes and links with a fresh snapshot.
	fn load(&mut self, nodes: &[SimNode], links: &[SimLink]);

	/// Pins a node to a fixed position, or releases it with `None`.
	fn pin(&mut self, id: &str, fixed: Option<(f64, f64)>);

	/// Target settling energy that alpha decays towards.
	fn set_alpha_target(&mut self, target: f64);

	/// Resumes ticking after the simulation came to rest.
	fn restart(&mut self);

	/// Current settling energy.
	fn alpha(&self) -> f64;

	/// Advances the simulation by `dt` seconds.
	fn tick(&mut self, dt: f32);

	/// Reports the current position of every simulated node.
	fn visit_positions(&self, visit: &mut dyn FnMut(&str, f64, f64));
}

/// Settling-energy schedule, following the classic force-layout model:
/// every tick alpha moves a fixed fraction towards its target, and the
/// simulation stops once alpha falls under `alpha_min`.
#[derive(Clone, Debug)]
pub struct AlphaSchedule {
	pub alpha: f64,
	pub alpha_min: f64,
	pub alpha_decay: f64,
	pub alpha_target: f64,
	pub running: bool,
}

impl Default for AlphaSchedule {
	fn default() -> Self {
		let alpha_min = 0.001_f64;
		Self {
			alpha: 1.0,
			alpha_min,
			// Reach alpha_min from 1.0 in about 300 ticks.
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			alpha_target: 0.0,
			running: true,
		}
	}
}

impl AlphaSchedule {
	/// Advances alpha by one tick. Returns the energy to simulate with, or
	/// `None` when the simulation is at rest.
	pub fn step(&mut self) -> Option<f64> {
		if !self.running {
			return None;
		}
		self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
		if self.alpha < self.alpha_min {
			self.running = false;
			return None;
		}
		Some(self.alpha)
	}

	pub fn restart(&mut self) {
		self.running = true;
	}
}

/// [`Integrator`] backed by `force_graph`.
///
/// `force_graph` springs have no per-edge rest length, so
/// [`SimLink::distance`] is carried but not applied.
pub struct ForceIntegrator {
	config: ForceConfig,
	graph: ForceGraph<String, ()>,
	indices: HashMap<String, DefaultNodeIdx>,
	edges: HashSet<(String, String)>,
	schedule: AlphaSchedule,
}

impl ForceIntegrator {
	pub fn new(config: ForceConfig) -> Self {
		Self {
			graph: ForceGraph::new(config.parameters()),
			config,
			indices: HashMap::new(),
			edges: HashSet::new(),
			schedule: AlphaSchedule::default(),
		}
	}

	/// Whether the snapshot still holds every node and edge already
	/// simulated. Only renames break this, since nothing is ever removed.
	fn extended_by(&self, nodes: &[SimNode], links: &[SimLink]) -> bool {
		let known_nodes = nodes
			.iter()
			.filter(|node| self.indices.contains_key(&node.id))
			.count();
		let known_edges = links
			.iter()
			.filter(|link| self.edges.contains(&(link.source.clone(), link.target.clone())))
			.count();
		known_nodes == self.indices.len() && known_edges == self.edges.len()
	}

	/// Writes positions and pins onto the simulated nodes, leaving their
	/// velocities alone, then adds whatever is new.
	fn extend(&mut self, nodes: &[SimNode], links: &[SimLink]) {
		let snapshot: HashMap<&str, &SimNode> =
			nodes.iter().map(|node| (node.id.as_str(), node)).collect();
		self.graph.visit_nodes_mut(|node| {
			let Some(sim) = snapshot.get(node.data.user_data.as_str()) else {
				return;
			};
			let pinned = sim.fx.zip(sim.fy);
			let (x, y) = pinned.unwrap_or((sim.x, sim.y));
			node.data.x = x as f32;
			node.data.y = y as f32;
			node.data.is_anchor = pinned.is_some();
		});

		for node in nodes {
			if !self.indices.contains_key(&node.id) {
				let idx = self.graph.add_node(node_data(node));
				self.indices.insert(node.id.clone(), idx);
			}
		}
		self.add_edges(links);
	}

	fn rebuild(&mut self, nodes: &[SimNode], links: &[SimLink]) {
		self.graph = ForceGraph::new(self.config.parameters());
		self.indices = HashMap::with_capacity(nodes.len());
		self.edges.clear();
		for node in nodes {
			let idx = self.graph.add_node(node_data(node));
			self.indices.insert(node.id.clone(), idx);
		}
		self.add_edges(links);
	}

	fn add_edges(&mut self, links: &[SimLink]) {
		for link in links {
			let src = self.indices.get(&link.source).copied();
			let tgt = self.indices.get(&link.target).copied();
			let (Some(src), Some(tgt)) = (src, tgt) else {
				continue;
			};
			if self.edges.insert((link.source.clone(), link.target.clone())) {
				self.graph.add_edge(src, tgt, EdgeData::default());
			}
		}
	}
}

fn node_data(node: &SimNode) -> NodeData<String> {
	let pinned = node.fx.zip(node.fy);
	let (x, y) = pinned.unwrap_or((node.x, node.y));
	NodeData {
		x: x as f32,
		y: y as f32,
		mass: 10.0,
		is_anchor: pinned.is_some(),
		user_data: node.id.clone(),
	}
}

impl Default for ForceIntegrator {
	fn default() -> Self {
		Self::new(ForceConfig::default())
	}
}

impl Integrator for ForceIntegrator {
	/// Extends the running simulation when the snapshot only adds to it, so
	/// settled nodes keep their momentum. Anything else starts over.
	fn load(&mut self, nodes: &[SimNode], links: &[SimLink]) {
		if self.extended_by(nodes, links) {
			self.extend(nodes, links);
		} else {
			self.rebuild(nodes, links);
		}
	}

	fn pin(&mut self, id: &str, fixed: Option<(f64, f64)>) {
		let Some(&idx) = self.indices.get(id) else {
			return;
		};
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				if let Some((x, y)) = fixed {
					node.data.x = x as f32;
					node.data.y = y as f32;
				}
				node.data.is_anchor = fixed.is_some();
			}
		});
	}

	fn set_alpha_target(&mut self, target: f64) {
		self.schedule.alpha_target = target;
	}

	fn restart(&mut self) {
		self.schedule.restart();
	}

	fn alpha(&self) -> f64 {
		self.schedule.alpha
	}

	fn tick(&mut self, dt: f32) {
		if let Some(alpha) = self.schedule.step() {
			self.graph.update(dt * alpha as f32);
		}
	}

	fn visit_positions(&self, visit: &mut dyn FnMut(&str, f64, f64)) {
		self.graph.visit_nodes(|node| {
			visit(&node.data.user_data, node.x() as f64, node.y() as f64);
		});
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sim_node(id: &str, x: f64, y: f64) -> SimNode {
		SimNode {
			id: id.into(),
			x,
			y,
			fx: None,
			fy: None,
		}
	}

	fn positions(integrator: &ForceIntegrator) -> HashMap<String, (f64, f64)> {
		let mut out = HashMap::new();
		integrator.visit_positions(&mut |id, x, y| {
			out.insert(id.to_string(), (x, y));
		});
		out
	}

	#[test]
	fn alpha_decays_to_rest() {
		let mut schedule = AlphaSchedule::default();
		let mut ticks = 0;
		while schedule.step().is_some() {
			ticks += 1;
			assert!(ticks < 1000, "simulation never settled");
		}
		assert!((250..=350).contains(&ticks), "settled after {ticks} ticks");
		assert!(!schedule.running);
		assert_eq!(schedule.step(), None);
	}

	#[test]
	fn raised_target_keeps_the_simulation_warm() {
		let mut schedule = AlphaSchedule {
			running: false,
			alpha: 0.0005,
			..AlphaSchedule::default()
		};
		schedule.alpha_target = 0.3;
		schedule.restart();
		for _ in 0..1000 {
			assert!(schedule.step().is_some());
		}
		assert!((schedule.alpha - 0.3).abs() < 1e-3);
	}

	#[test]
	fn load_reports_every_node() {
		let mut integrator = ForceIntegrator::default();
		integrator.load(
			&[sim_node("a", 0.0, 0.0), sim_node("b", 50.0, 0.0)],
			&[SimLink {
				source: "a".into(),
				target: "b".into(),
				distance: 100.0,
			}],
		);
		let seen = positions(&integrator);
		assert_eq!(seen.len(), 2);
		assert_eq!(seen["b"], (50.0, 0.0));
	}

	#[test]
	fn pinned_nodes_hold_still() {
		let mut integrator = ForceIntegrator::default();
		integrator.load(&[sim_node("a", 0.0, 0.0), sim_node("b", 1.0, 0.0)], &[]);
		integrator.pin("a", Some((30.0, 40.0)));

		for _ in 0..10 {
			integrator.tick(0.016);
		}
		assert_eq!(positions(&integrator)["a"], (30.0, 40.0));
	}

	fn snapshot(integrator: &ForceIntegrator) -> Vec<SimNode> {
		let mut nodes: Vec<SimNode> = positions(integrator)
			.into_iter()
			.map(|(id, (x, y))| sim_node(&id, x, y))
			.collect();
		nodes.sort_by(|a, b| a.id.cmp(&b.id));
		nodes
	}

	fn link(source: &str, target: &str) -> SimLink {
		SimLink {
			source: source.into(),
			target: target.into(),
			distance: 100.0,
		}
	}

	#[test]
	fn growing_the_graph_keeps_momentum() {
		let mut running = ForceIntegrator::default();
		running.load(&[sim_node("a", 0.0, 0.0), sim_node("b", 50.0, 0.0)], &[link("a", "b")]);
		for _ in 0..5 {
			running.tick(0.016);
		}

		let mut nodes = snapshot(&running);
		nodes.push(sim_node("c", 400.0, 400.0));
		let links = [link("a", "b"), link("b", "c")];

		let mut fresh = ForceIntegrator::default();
		fresh.load(&nodes, &links);
		fresh.schedule = running.schedule.clone();
		running.load(&nodes, &links);
		assert_eq!(running.indices.len(), 3);
		assert_eq!(running.edges.len(), 2);
		assert_eq!(positions(&running), positions(&fresh));

		running.tick(0.016);
		fresh.tick(0.016);
		assert_ne!(positions(&running)["a"], positions(&fresh)["a"]);
	}

	#[test]
	fn renamed_nodes_rebuild_the_simulation() {
		let mut integrator = ForceIntegrator::default();
		integrator.load(&[sim_node("a", 0.0, 0.0), sim_node("b", 50.0, 0.0)], &[link("a", "b")]);
		integrator.load(&[sim_node("z", 0.0, 0.0), sim_node("b", 50.0, 0.0)], &[link("z", "b")]);

		let seen = positions(&integrator);
		assert_eq!(seen.len(), 2);
		assert!(seen.contains_key("z"));
		assert!(!seen.contains_key("a"));
		assert_eq!(integrator.edges.len(), 1);
	}
}
