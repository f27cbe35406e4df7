//! Tunables for the simulation and the canvas interaction.

use force_graph::SimulationParameters;

/// Force simulation strengths handed to `force_graph`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForceConfig {
	pub force_charge: f32,
	pub force_spring: f32,
	pub force_max: f32,
	pub node_speed: f32,
	pub damping_factor: f32,
}

impl ForceConfig {
	pub fn parameters(&self) -> SimulationParameters {
		SimulationParameters {
			force_charge: self.force_charge,
			force_spring: self.force_spring,
			force_max: self.force_max,
			node_speed: self.node_speed,
			damping_factor: self.damping_factor,
		}
	}
}

impl Default for ForceConfig {
	fn default() -> Self {
		Self {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		}
	}
}

/// Network-wide settings.
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkConfig {
	pub force: ForceConfig,
	/// Settling energy kept up while at least one node is dragged.
	pub drag_alpha_target: f64,
	/// Rest length of links without a distance of their own.
	pub link_distance: f64,
	/// Smallest and largest zoom factor.
	pub zoom_extent: (f64, f64),
}

impl Default for NetworkConfig {
	fn default() -> Self {
		Self {
			force: ForceConfig::default(),
			drag_alpha_target: 0.3,
			link_distance: 100.0,
			zoom_extent: (0.125, 16.0),
		}
	}
}
