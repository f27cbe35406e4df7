//! Bootstrap data accepted by [`Network::load`](super::Network::load).

use serde::Deserialize;

use super::handle::{LinkSpec, NodeSpec};

/// A node record. Every field is optional; a missing id is generated.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct GraphNode {
	#[serde(default)]
	pub id: Option<String>,
	#[serde(default)]
	pub x: Option<f64>,
	#[serde(default)]
	pub y: Option<f64>,
	/// Radius; nodes without one are drawn with the default radius.
	#[serde(default)]
	pub r: Option<f64>,
	/// CSS color, e.g. `"#ff0000"` or `"rgb(255, 0, 0)"`.
	#[serde(default)]
	pub color: Option<String>,
}

impl GraphNode {
	pub fn spec(&self) -> NodeSpec {
		NodeSpec {
			id: self.id.clone(),
			x: self.x,
			y: self.y,
			r: self.r,
			color: self.color.clone(),
			init: None,
		}
	}
}

/// A directed link record between two node ids.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct GraphLink {
	pub source: String,
	pub target: String,
	#[serde(default)]
	pub color: Option<String>,
	/// Preferred rest length of the link.
	#[serde(default, alias = "linkDistance")]
	pub distance: Option<f64>,
	#[serde(default)]
	pub label: Option<String>,
}

impl GraphLink {
	pub fn spec(&self) -> LinkSpec {
		LinkSpec {
			color: self.color.clone(),
			distance: self.distance,
			label: self.label.clone(),
		}
	}
}

/// Complete graph data: nodes and links.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct GraphData {
	#[serde(default)]
	pub nodes: Vec<GraphNode>,
	#[serde(default)]
	pub links: Vec<GraphLink>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_sparse_records() {
		let data: GraphData = serde_json::from_str(
			r##"{
				"nodes": [{ "id": "a", "x": 1.5, "color": "#ff0000" }, {}],
				"links": [{ "source": "a", "target": "n1", "linkDistance": 40, "label": "Attached to" }]
			}"##,
		)
		.unwrap();

		assert_eq!(data.nodes.len(), 2);
		assert_eq!(data.nodes[0].id.as_deref(), Some("a"));
		assert_eq!(data.nodes[0].x, Some(1.5));
		assert_eq!(data.nodes[0].y, None);
		assert_eq!(data.nodes[1], GraphNode::default());
		assert_eq!(data.links[0].distance, Some(40.0));
		assert_eq!(data.links[0].label.as_deref(), Some("Attached to"));
	}

	#[test]
	fn missing_sections_default_to_empty() {
		let data: GraphData = serde_json::from_str("{}").unwrap();
		assert_eq!(data, GraphData::default());
	}

	#[test]
	fn specs_carry_every_attribute() {
		let node = GraphNode {
			id: Some("a".into()),
			x: Some(1.0),
			y: Some(2.0),
			r: Some(3.0),
			color: Some("#fff".into()),
		};
		let spec = node.spec();
		assert_eq!(spec.id.as_deref(), Some("a"));
		assert_eq!((spec.x, spec.y, spec.r), (Some(1.0), Some(2.0), Some(3.0)));
		assert_eq!(spec.color.as_deref(), Some("#fff"));
		assert!(spec.init.is_none());

		let link = GraphLink {
			source: "a".into(),
			target: "b".into(),
			color: Some("#000".into()),
			distance: Some(30.0),
			label: Some("uses".into()),
		};
		assert_eq!(
			link.spec(),
			LinkSpec::new()
				.with_color("#000")
				.with_distance(30.0)
				.with_label("uses")
		);
	}
}
