//! Errors raised synchronously by the network mutation API.

/// Failure of a graph mutation or of mounting the network into the page.
///
/// Geometry degeneracies are never reported here; they render as an empty
/// path instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
	/// A node with this id is already part of the network.
	#[error("node with id {id} is already in this network")]
	DuplicateId {
		/// The rejected id.
		id: String,
	},

	/// A link or lookup referenced an id that is not part of the network.
	#[error("node with id {id} is not in this network")]
	UnknownNode {
		/// The unresolved id.
		id: String,
	},

	/// The mount target was empty or did not match any element.
	#[error("selection {selector:?} is empty")]
	InvalidSelection {
		/// The selector that failed to resolve.
		selector: String,
	},
}

impl GraphError {
	pub(crate) fn duplicate(id: impl Into<String>) -> Self {
		Self::DuplicateId { id: id.into() }
	}

	pub(crate) fn unknown(id: impl Into<String>) -> Self {
		Self::UnknownNode { id: id.into() }
	}
}
