//! Canvas painting of a [`Scene`].
//!
//! Drawing order follows the scene: links and their labels first, then nodes
//! in creation order, so later nodes sit on top. Focused elements fade
//! towards the theme's focus color, and the hovered node's title is drawn
//! last.

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::geometry::{ARROW_HEAD_LENGTH, EdgePath, Point};
use super::highlight::{HighlightState, smooth_step};
use super::reconcile::{LinkVisual, NodeVisual, Scene};
use super::theme::Theme;

/// Pan and zoom applied to the whole graph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor, 1.0 = 100%.
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

impl ViewTransform {
	/// Centers the graph origin in a viewport of the given size.
	pub fn centered(width: f64, height: f64) -> Self {
		Self {
			x: width / 2.0,
			y: height / 2.0,
			k: 1.0,
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// Scales by `factor` around the screen point `(sx, sy)`, keeping the zoom
	/// inside `extent`.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64, (min, max): (f64, f64)) {
		let k = (self.k * factor).clamp(min, max);
		let ratio = k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = k;
	}
}

/// Tip and the two base corners of the arrowhead ending at `tip`, pointing
/// away from `base`.
pub fn arrowhead(base: Point, tip: Point) -> [Point; 3] {
	let (dx, dy) = (tip.x - base.x, tip.y - base.y);
	let len = dx.hypot(dy);
	let (ux, uy) = if len > f64::EPSILON {
		(dx / len, dy / len)
	} else {
		(0.0, 0.0)
	};
	let half = ARROW_HEAD_LENGTH / 2.0;
	let (px, py) = (-uy * half, ux * half);
	[
		tip,
		Point::new(base.x + px, base.y + py),
		Point::new(base.x - px, base.y - py),
	]
}

/// Paints the complete scene.
pub fn render(
	scene: &Scene,
	highlight: &HighlightState,
	transform: &ViewTransform,
	ctx: &CanvasRenderingContext2d,
	width: f64,
	height: f64,
) {
	let theme = scene.theme();

	ctx.set_fill_style_str(&theme.background.to_css());
	ctx.fill_rect(0.0, 0.0, width, height);

	ctx.save();
	let _ = ctx.translate(transform.x, transform.y);
	let _ = ctx.scale(transform.k, transform.k);

	for link in scene.links() {
		let t = smooth_step(highlight.link_intensity(link.source));
		draw_link(ctx, theme, link, t, transform.k);
	}
	for node in scene.nodes() {
		let t = smooth_step(highlight.node_intensity(node.node()));
		draw_node(ctx, theme, node, t);
	}
	if let Some(node) = highlight.hovered().and_then(|key| scene.node_visual(key)) {
		draw_title(ctx, theme, node, transform.k);
	}

	ctx.restore();
}

fn draw_link(ctx: &CanvasRenderingContext2d, theme: &Theme, link: &LinkVisual, t: f64, k: f64) {
	let (Some(end), Some(tip)) = (link.path.end(), link.path.arrow()) else {
		return;
	};
	let color = link.stroke.towards(theme.focus, t);

	ctx.set_stroke_style_str(&color);
	ctx.set_line_width(theme.link_width * (1.0 + t) / k.max(1.0));
	ctx.begin_path();
	let base = match link.path {
		EdgePath::Line { start, .. } => {
			ctx.move_to(start.x, start.y);
			ctx.line_to(end.x, end.y);
			end
		}
		EdgePath::Curve { start, control, .. } => {
			ctx.move_to(start.x, start.y);
			let _ = ctx.quadratic_curve_to(control.x, control.y, end.x, end.y);
			end
		}
		EdgePath::Empty => return,
	};
	ctx.stroke();

	let [a, b, c] = arrowhead(base, tip);
	ctx.set_fill_style_str(&theme.arrow_fill.lerp(theme.focus, t).to_css());
	ctx.begin_path();
	ctx.move_to(a.x, a.y);
	ctx.line_to(b.x, b.y);
	ctx.line_to(c.x, c.y);
	ctx.close_path();
	ctx.fill();

	if let Some(label) = &link.label {
		draw_link_label(ctx, theme, &link.path, label, t);
	}
}

/// Centered on the path's midpoint and rotated along it, sitting just above
/// the stroke.
fn draw_link_label(
	ctx: &CanvasRenderingContext2d,
	theme: &Theme,
	path: &EdgePath,
	label: &str,
	t: f64,
) {
	let Some((mid, angle)) = path.label_anchor() else {
		return;
	};
	ctx.save();
	let _ = ctx.translate(mid.x, mid.y);
	let _ = ctx.rotate(angle);
	ctx.set_fill_style_str(&theme.link_label.lerp(theme.focus, t).to_css());
	ctx.set_font(theme.link_label_font);
	ctx.set_text_align("center");
	let _ = ctx.fill_text(label, 0.0, -2.0);
	ctx.restore();
}

fn draw_node(ctx: &CanvasRenderingContext2d, theme: &Theme, node: &NodeVisual, t: f64) {
	ctx.begin_path();
	let _ = ctx.arc(node.cx, node.cy, node.r.max(0.0), 0.0, 2.0 * PI);
	ctx.set_fill_style_str(&node.fill.towards(theme.focus, t));
	ctx.fill();
}

fn draw_title(ctx: &CanvasRenderingContext2d, theme: &Theme, node: &NodeVisual, k: f64) {
	ctx.save();
	let _ = ctx.translate(node.cx, node.cy);
	let _ = ctx.scale(1.0 / k, 1.0 / k);
	ctx.set_fill_style_str(&theme.label.to_css());
	ctx.set_font(theme.label_font);
	let _ = ctx.fill_text(&node.title, node.r * k + 4.0, 3.0);
	ctx.restore();
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn screen_to_graph_inverts_the_transform() {
		let transform = ViewTransform { x: 100.0, y: 50.0, k: 2.0 };
		assert_eq!(transform.screen_to_graph(100.0, 50.0), (0.0, 0.0));
		assert_eq!(transform.screen_to_graph(120.0, 40.0), (10.0, -5.0));
	}

	#[test]
	fn zoom_keeps_the_cursor_fixed() {
		let mut transform = ViewTransform::centered(800.0, 600.0);
		let before = transform.screen_to_graph(500.0, 200.0);
		transform.zoom_at(500.0, 200.0, 2.0, (0.125, 16.0));
		let after = transform.screen_to_graph(500.0, 200.0);
		assert_eq!(transform.k, 2.0);
		assert!((before.0 - after.0).abs() < 1e-9);
		assert!((before.1 - after.1).abs() < 1e-9);
	}

	#[test]
	fn zoom_is_clamped_to_the_extent() {
		let mut transform = ViewTransform::default();
		for _ in 0..100 {
			transform.zoom_at(0.0, 0.0, 1.1, (0.125, 16.0));
		}
		assert_eq!(transform.k, 16.0);
		for _ in 0..200 {
			transform.zoom_at(0.0, 0.0, 0.9, (0.125, 16.0));
		}
		assert_eq!(transform.k, 0.125);
	}

	#[test]
	fn arrowhead_spans_the_reserved_length() {
		let [tip, left, right] = arrowhead(Point::new(85.0, 0.0), Point::new(90.0, 0.0));
		assert_eq!(tip, Point::new(90.0, 0.0));
		assert_eq!(left, Point::new(85.0, 2.5));
		assert_eq!(right, Point::new(85.0, -2.5));
	}
}
