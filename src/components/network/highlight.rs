//! Hover focus with smooth transitions.
//!
//! The hovered node and its outgoing links are painted in the theme's focus
//! color. Each node carries an intensity in `0.0..=1.0` that eases towards 1
//! while hovered and back towards 0 afterwards, using exponential smoothing:
//! `value += (target - value) * (1 - e^(-speed * dt))`.

use std::collections::HashMap;

use super::store::NodeKey;

/// Time (seconds) a focus is held before it may fade out, so skimming past a
/// node does not flash.
const MIN_HOLD_TIME: f64 = 0.12;
const FADE_IN_SPEED: f64 = 6.0;
const FADE_OUT_SPEED: f64 = 4.0;
/// Intensities below this are dropped.
const VISIBLE: f64 = 0.005;

#[derive(Clone, Debug, Default)]
pub struct HighlightState {
	hovered: Option<NodeKey>,
	intensity: HashMap<NodeKey, f64>,
	hold_timer: HashMap<NodeKey, f64>,
}

impl HighlightState {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn hovered(&self) -> Option<NodeKey> {
		self.hovered
	}

	pub fn set_hover(&mut self, node: Option<NodeKey>) {
		if self.hovered == node {
			return;
		}
		self.hovered = node;
		if let Some(key) = node {
			self.hold_timer.insert(key, MIN_HOLD_TIME);
		}
	}

	/// Advances every intensity by `dt` seconds.
	pub fn tick(&mut self, dt: f64) {
		let fade_in = 1.0 - (-FADE_IN_SPEED * dt).exp();
		let fade_out = (-FADE_OUT_SPEED * dt).exp();

		if let Some(key) = self.hovered {
			let intensity = self.intensity.entry(key).or_insert(0.0);
			*intensity += (1.0 - *intensity) * fade_in;
		}

		let hovered = self.hovered;
		self.hold_timer.retain(|key, timer| {
			if hovered == Some(*key) {
				return true;
			}
			*timer -= dt;
			*timer > 0.0
		});

		let hold_timer = &self.hold_timer;
		self.intensity.retain(|key, intensity| {
			if hovered == Some(*key) {
				return true;
			}
			if !hold_timer.contains_key(key) {
				*intensity *= fade_out;
			}
			*intensity > VISIBLE
		});
	}

	pub fn node_intensity(&self, key: NodeKey) -> f64 {
		self.intensity.get(&key).copied().unwrap_or(0.0)
	}

	/// Focus of a link follows its source node: only outgoing links light up.
	pub fn link_intensity(&self, source: NodeKey) -> f64 {
		self.node_intensity(source)
	}
}

/// Eases a linear intensity for display.
pub fn smooth_step(t: f64) -> f64 {
	t * t * (3.0 - 2.0 * t)
}
