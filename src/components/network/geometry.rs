//! Edge geometry: turns a link between two circular node bodies into a
//! trimmed straight or curved path plus an arrowhead anchor.
//!
//! Recomputed for every visible link on every physics tick, so everything
//! here is a pure O(1) function of the endpoint state.

use std::fmt;

use super::store::{GraphStore, LinkIdx};

/// Length reserved for an arrowhead glyph at a link end.
pub const ARROW_HEAD_LENGTH: f64 = 5.0;

/// How far a bidirectional link's curve is bowed off the straight line.
pub const CURVE_OFFSET: f64 = 10.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	fn offset(self, (ux, uy): (f64, f64), distance: f64) -> Self {
		Self::new(self.x + ux * distance, self.y + uy * distance)
	}
}

/// Center and radius of a node body at one end of a link.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Endpoint {
	pub x: f64,
	pub y: f64,
	pub r: f64,
}

/// Renderable description of a link for the current tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum EdgePath {
	/// Nothing to draw: the endpoints coincide or the bodies overlap.
	#[default]
	Empty,
	Line {
		start: Point,
		end: Point,
		/// Where the arrowhead tip goes, one arrow length past `end`.
		arrow: Point,
	},
	Curve {
		start: Point,
		control: Point,
		end: Point,
		arrow: Point,
	},
}

impl EdgePath {
	pub fn is_empty(&self) -> bool {
		matches!(self, EdgePath::Empty)
	}

	pub fn arrow(&self) -> Option<Point> {
		match *self {
			EdgePath::Empty => None,
			EdgePath::Line { arrow, .. } | EdgePath::Curve { arrow, .. } => Some(arrow),
		}
	}

	pub fn end(&self) -> Option<Point> {
		match *self {
			EdgePath::Empty => None,
			EdgePath::Line { end, .. } | EdgePath::Curve { end, .. } => Some(end),
		}
	}

	/// Point halfway along the path.
	pub fn midpoint(&self) -> Option<Point> {
		match *self {
			EdgePath::Empty => None,
			EdgePath::Line { start, end, .. } => Some(Point::new(
				(start.x + end.x) / 2.0,
				(start.y + end.y) / 2.0,
			)),
			// Quadratic Bézier at t = 0.5.
			EdgePath::Curve {
				start, control, end, ..
			} => Some(Point::new(
				0.25 * start.x + 0.5 * control.x + 0.25 * end.x,
				0.25 * start.y + 0.5 * control.y + 0.25 * end.y,
			)),
		}
	}

	/// Where a link label sits: the midpoint, and the direction of travel
	/// there in radians. A quadratic's tangent at t = 0.5 is parallel to its
	/// chord, so both shapes use `end - start`.
	pub fn label_anchor(&self) -> Option<(Point, f64)> {
		let (start, end) = match *self {
			EdgePath::Empty => return None,
			EdgePath::Line { start, end, .. } | EdgePath::Curve { start, end, .. } => (start, end),
		};
		let angle = (end.y - start.y).atan2(end.x - start.x);
		self.midpoint().map(|mid| (mid, angle))
	}
}

/// SVG path data, e.g. `M 10,0 L 85,0 M 90,0`. Empty paths render as "".
impl fmt::Display for EdgePath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			EdgePath::Empty => Ok(()),
			EdgePath::Line { start, end, arrow } => write!(
				f,
				"M {},{} L {},{} M {},{}",
				start.x, start.y, end.x, end.y, arrow.x, arrow.y
			),
			EdgePath::Curve {
				start,
				control,
				end,
				arrow,
			} => write!(
				f,
				"M {},{} Q {},{} {},{} M {},{}",
				start.x, start.y, control.x, control.y, end.x, end.y, arrow.x, arrow.y
			),
		}
	}
}

/// Computes the path for a link from `source` to `target`.
///
/// The start is pushed out of the source body and the end pulled back out of
/// the target body plus one arrow length. Bidirectional links also reserve an
/// arrow length at the start (for the opposite link's arrowhead) and bow to
/// the right of their direction so the pair never overlaps.
pub fn link_path(source: Endpoint, target: Endpoint, bidirectional: bool) -> EdgePath {
	let (dx, dy) = (target.x - source.x, target.y - source.y);
	let distance = dx.hypot(dy);
	if !distance.is_finite() || distance == 0.0 {
		return EdgePath::Empty;
	}

	let start_trim = source.r + if bidirectional { ARROW_HEAD_LENGTH } else { 0.0 };
	let end_trim = target.r + ARROW_HEAD_LENGTH;
	if distance <= start_trim + end_trim {
		return EdgePath::Empty;
	}

	let direction = (dx / distance, dy / distance);
	let start = Point::new(source.x, source.y).offset(direction, start_trim);
	let end = Point::new(target.x, target.y).offset(direction, -end_trim);

	if !bidirectional {
		return EdgePath::Line {
			start,
			end,
			arrow: end.offset(direction, ARROW_HEAD_LENGTH),
		};
	}

	let middle = Point::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0);
	let normal = (direction.1, -direction.0);
	let control = middle.offset(normal, CURVE_OFFSET);

	// Continue along the curve's tangent at its end.
	let (tx, ty) = (end.x - control.x, end.y - control.y);
	let tangent_length = tx.hypot(ty);
	let tangent = if tangent_length > 0.0 {
		(tx / tangent_length, ty / tangent_length)
	} else {
		direction
	};

	EdgePath::Curve {
		start,
		control,
		end,
		arrow: end.offset(tangent, ARROW_HEAD_LENGTH),
	}
}

impl GraphStore {
	/// Path for a stored link from its endpoints' live state. The
	/// bidirectionality test is a single reverse-key lookup.
	pub fn link_geometry(&self, idx: LinkIdx) -> EdgePath {
		let link = self.link(idx);
		let (source, target) = (self.node(link.source()), self.node(link.target()));
		link_path(
			Endpoint {
				x: source.x(),
				y: source.y(),
				r: source.radius(),
			},
			Endpoint {
				x: target.x(),
				y: target.y(),
				r: target.radius(),
			},
			self.is_bidirectional(idx),
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn at(x: f64, y: f64) -> Endpoint {
		Endpoint { x, y, r: 10.0 }
	}

	fn assert_close(actual: Point, x: f64, y: f64) {
		assert!(
			(actual.x - x).abs() < 1e-9 && (actual.y - y).abs() < 1e-9,
			"expected ({x}, {y}), got ({}, {})",
			actual.x,
			actual.y
		);
	}

	#[test]
	fn straight_link_is_trimmed_at_both_ends() {
		let path = link_path(at(0.0, 0.0), at(100.0, 0.0), false);
		let EdgePath::Line { start, end, arrow } = path else {
			panic!("expected a line, got {path:?}");
		};
		assert_close(start, 10.0, 0.0);
		assert_close(end, 85.0, 0.0);
		assert_close(arrow, 90.0, 0.0);
		assert_eq!(path.to_string(), "M 10,0 L 85,0 M 90,0");
	}

	#[test]
	fn bidirectional_link_curves_and_trims_start() {
		let path = link_path(at(0.0, 0.0), at(100.0, 0.0), true);
		let EdgePath::Curve {
			start,
			control,
			end,
			arrow,
		} = path
		else {
			panic!("expected a curve, got {path:?}");
		};
		assert_close(start, 15.0, 0.0);
		assert_close(end, 85.0, 0.0);
		assert_close(control, 50.0, -10.0);
		assert!(((arrow.x - end.x).hypot(arrow.y - end.y) - ARROW_HEAD_LENGTH).abs() < 1e-9);
		assert!(arrow.x > end.x && arrow.y > 0.0);
		assert!(path.to_string().starts_with("M 15,0 Q 50,-10 85,0 M "));
	}

	#[test]
	fn opposite_links_bow_to_opposite_sides() {
		let forward = link_path(at(0.0, 0.0), at(100.0, 0.0), true);
		let backward = link_path(at(100.0, 0.0), at(0.0, 0.0), true);
		let (EdgePath::Curve { control: c1, .. }, EdgePath::Curve { control: c2, .. }) =
			(forward, backward)
		else {
			panic!("expected two curves");
		};
		assert_close(c1, 50.0, -10.0);
		assert_close(c2, 50.0, 10.0);
	}

	#[test]
	fn coincident_endpoints_render_nothing() {
		assert_eq!(link_path(at(5.0, 5.0), at(5.0, 5.0), false), EdgePath::Empty);
		assert_eq!(link_path(at(5.0, 5.0), at(5.0, 5.0), true), EdgePath::Empty);
		assert_eq!(EdgePath::Empty.to_string(), "");
	}

	#[test]
	fn overlapping_bodies_render_nothing() {
		// 25 = 10 + 10 + 5, exactly used up by the trims.
		assert!(link_path(at(0.0, 0.0), at(25.0, 0.0), false).is_empty());
		assert!(!link_path(at(0.0, 0.0), at(25.5, 0.0), false).is_empty());
		assert!(link_path(at(0.0, 0.0), at(30.0, 0.0), true).is_empty());
	}

	#[test]
	fn non_finite_positions_render_nothing() {
		assert!(link_path(at(f64::NAN, 0.0), at(100.0, 0.0), false).is_empty());
		assert!(link_path(at(0.0, 0.0), at(f64::INFINITY, 0.0), false).is_empty());
	}

	#[test]
	fn midpoint_of_curve_lies_between_chord_and_control() {
		let path = link_path(at(0.0, 0.0), at(100.0, 0.0), true);
		let mid = path.midpoint().unwrap();
		assert_close(mid, 50.0, -5.0);
	}

	#[test]
	fn label_anchor_follows_the_link_direction() {
		assert_eq!(EdgePath::Empty.label_anchor(), None);

		let (mid, angle) = link_path(at(0.0, 100.0), at(0.0, 0.0), false)
			.label_anchor()
			.unwrap();
		assert_close(mid, 0.0, 52.5);
		assert!((angle + std::f64::consts::FRAC_PI_2).abs() < 1e-9);

		let (mid, angle) = link_path(at(0.0, 0.0), at(100.0, 0.0), true)
			.label_anchor()
			.unwrap();
		assert_close(mid, 50.0, -5.0);
		assert!(angle.abs() < 1e-9);
	}
}
