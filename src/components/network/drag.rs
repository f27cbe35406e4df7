//! Drag interaction bookkeeping.
//!
//! Each pointer (mouse or touch) drags at most one node. The tracker counts
//! active drags across the whole network so settling energy is raised by the
//! first drag and only allowed to decay after the last one ends.

use std::collections::HashMap;

use super::store::NodeKey;

/// Identifies the pointer driving a drag: the mouse, or a touch identifier.
pub type PointerId = i32;

/// Pointer id used for mouse drags.
pub const MOUSE_POINTER: PointerId = -1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragPhase {
	Idle,
	Dragging,
}

/// What a drag transition requires from the rest of the network.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragTransition {
	/// Pin `node` to the pointer. `reheat` is set for the first active drag.
	Started { node: NodeKey, reheat: bool },
	/// Move the pin of `node`.
	Moved { node: NodeKey },
	/// The drag on `node` ended. `release` is set when no other pointer still
	/// holds the node, `settle` when no drag is active anywhere.
	Ended {
		node: NodeKey,
		release: bool,
		settle: bool,
	},
}

#[derive(Clone, Debug, Default)]
pub struct DragTracker {
	active: HashMap<PointerId, NodeKey>,
}

impl DragTracker {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of drags in progress.
	pub fn active(&self) -> usize {
		self.active.len()
	}

	pub fn phase(&self, node: NodeKey) -> DragPhase {
		if self.active.values().any(|&dragged| dragged == node) {
			DragPhase::Dragging
		} else {
			DragPhase::Idle
		}
	}

	pub fn dragged_by(&self, pointer: PointerId) -> Option<NodeKey> {
		self.active.get(&pointer).copied()
	}

	/// Starts dragging `node` with `pointer`. A pointer that was already
	/// dragging something ends that drag first.
	pub fn start(&mut self, pointer: PointerId, node: NodeKey) -> Vec<DragTransition> {
		let mut transitions = Vec::new();
		if self.active.contains_key(&pointer) {
			transitions.extend(self.end_inner(pointer, false));
		}
		let reheat = self.active.is_empty();
		self.active.insert(pointer, node);
		transitions.push(DragTransition::Started { node, reheat });
		transitions
	}

	pub fn drag(&self, pointer: PointerId) -> Option<DragTransition> {
		self.dragged_by(pointer)
			.map(|node| DragTransition::Moved { node })
	}

	pub fn end(&mut self, pointer: PointerId) -> Option<DragTransition> {
		self.end_inner(pointer, true)
	}

	fn end_inner(&mut self, pointer: PointerId, may_settle: bool) -> Option<DragTransition> {
		let node = self.active.remove(&pointer)?;
		Some(DragTransition::Ended {
			node,
			release: self.phase(node) == DragPhase::Idle,
			settle: may_settle && self.active.is_empty(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::network::handle::NodeSpec;
	use crate::components::network::store::GraphStore;

	fn keys(n: usize) -> Vec<NodeKey> {
		let mut store = GraphStore::new();
		(0..n)
			.map(|_| store.add_node(NodeSpec::new()).unwrap())
			.collect()
	}

	#[test]
	fn single_drag_reheats_and_settles() {
		let [a] = keys(1)[..] else { unreachable!() };
		let mut tracker = DragTracker::new();

		assert_eq!(
			tracker.start(MOUSE_POINTER, a),
			vec![DragTransition::Started { node: a, reheat: true }]
		);
		assert_eq!(tracker.phase(a), DragPhase::Dragging);
		assert_eq!(
			tracker.drag(MOUSE_POINTER),
			Some(DragTransition::Moved { node: a })
		);
		assert_eq!(
			tracker.end(MOUSE_POINTER),
			Some(DragTransition::Ended {
				node: a,
				release: true,
				settle: true
			})
		);
		assert_eq!(tracker.phase(a), DragPhase::Idle);
		assert_eq!(tracker.active(), 0);
	}

	#[test]
	fn overlapping_drags_settle_only_after_the_last() {
		let [a, b] = keys(2)[..] else { unreachable!() };
		let mut tracker = DragTracker::new();

		tracker.start(1, a);
		let second = tracker.start(2, b);
		assert_eq!(second, vec![DragTransition::Started { node: b, reheat: false }]);
		assert_eq!(tracker.active(), 2);

		assert_eq!(
			tracker.end(1),
			Some(DragTransition::Ended {
				node: a,
				release: true,
				settle: false
			})
		);
		assert_eq!(
			tracker.end(2),
			Some(DragTransition::Ended {
				node: b,
				release: true,
				settle: true
			})
		);
	}

	#[test]
	fn node_held_by_two_pointers_stays_pinned() {
		let [a] = keys(1)[..] else { unreachable!() };
		let mut tracker = DragTracker::new();
		tracker.start(1, a);
		tracker.start(2, a);

		assert_eq!(
			tracker.end(1),
			Some(DragTransition::Ended {
				node: a,
				release: false,
				settle: false
			})
		);
		assert_eq!(tracker.phase(a), DragPhase::Dragging);
	}

	#[test]
	fn unknown_pointers_are_ignored() {
		let mut tracker = DragTracker::new();
		assert_eq!(tracker.drag(7), None);
		assert_eq!(tracker.end(7), None);
	}

	#[test]
	fn restarting_a_pointer_hands_over_the_drag() {
		let [a, b] = keys(2)[..] else { unreachable!() };
		let mut tracker = DragTracker::new();
		tracker.start(MOUSE_POINTER, a);

		let transitions = tracker.start(MOUSE_POINTER, b);
		assert_eq!(
			transitions,
			vec![
				DragTransition::Ended {
					node: a,
					release: true,
					settle: false
				},
				DragTransition::Started { node: b, reheat: true },
			]
		);
		assert_eq!(tracker.active(), 1);
	}
}
