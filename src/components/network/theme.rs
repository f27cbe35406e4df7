//! Colors and visual defaults for the network canvas.

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Linear interpolation between two colors
	pub fn lerp(self, other: Color, t: f64) -> Self {
		let t = t.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * (1.0 - t) + other.r as f64 * t).round() as u8,
			g: (self.g as f64 * (1.0 - t) + other.g as f64 * t).round() as u8,
			b: (self.b as f64 * (1.0 - t) + other.b as f64 * t).round() as u8,
			a: self.a * (1.0 - t) + other.a * t,
		}
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}

	/// Parses a CSS color string.
	/// Supports hex (`#RGB`, `#RRGGBB`) and `rgb()`/`rgba()` functional notation.
	pub fn parse(color_str: &str) -> Option<Color> {
		let color_str = color_str.trim();
		if let Some(hex) = color_str.strip_prefix('#') {
			if !hex.is_ascii() {
				return None;
			}
			let channel = |s: &str| u8::from_str_radix(s, 16).ok();
			return match hex.len() {
				6 => Some(Color::rgb(
					channel(&hex[0..2])?,
					channel(&hex[2..4])?,
					channel(&hex[4..6])?,
				)),
				3 => {
					let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
					Some(Color::rgb(short(0)?, short(1)?, short(2)?))
				}
				_ => None,
			};
		}

		if color_str.starts_with("rgb") {
			let nums: Vec<&str> = color_str
				.trim_start_matches("rgba(")
				.trim_start_matches("rgb(")
				.trim_end_matches(')')
				.split(',')
				.map(str::trim)
				.collect();
			let r = nums.first()?.parse().ok()?;
			let g = nums.get(1)?.parse().ok()?;
			let b = nums.get(2)?.parse().ok()?;
			let a = nums.get(3).and_then(|s| s.parse().ok()).unwrap_or(1.0);
			return Some(Color::rgba(r, g, b, a));
		}

		None
	}
}

/// Fill or stroke of a visual.
///
/// Colors the canvas can blend are kept parsed so focus can fade them. Any
/// other CSS color (`"steelblue"`, `"hsl(...)"`) is handed to the canvas
/// unchanged.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
	Rgba(Color),
	Css(String),
}

impl Paint {
	/// Paint for an optional user color, `fallback` when unset or blank.
	pub fn resolve(css: Option<&str>, fallback: Color) -> Self {
		match css.map(str::trim) {
			None | Some("") => Paint::Rgba(fallback),
			Some(css) => Color::parse(css)
				.map(Paint::Rgba)
				.unwrap_or_else(|| Paint::Css(css.to_string())),
		}
	}

	pub fn to_css(&self) -> String {
		match self {
			Paint::Rgba(color) => color.to_css(),
			Paint::Css(css) => css.clone(),
		}
	}

	/// CSS for this paint faded `t` of the way towards `focus`. Unparsed
	/// colors do not blend and stay as they are.
	pub fn towards(&self, focus: Color, t: f64) -> String {
		match self {
			Paint::Rgba(color) => color.lerp(focus, t).to_css(),
			Paint::Css(css) => css.clone(),
		}
	}
}

impl From<Color> for Paint {
	fn from(color: Color) -> Self {
		Paint::Rgba(color)
	}
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	pub background: Color,
	/// Fill for nodes without a color of their own.
	pub node_fill: Color,
	/// Stroke for links without a color of their own.
	pub link_stroke: Color,
	pub link_width: f64,
	pub arrow_fill: Color,
	/// Hovered node and its outgoing links fade towards this color.
	pub focus: Color,
	pub label: Color,
	pub label_font: &'static str,
	/// Link label text.
	pub link_label: Color,
	pub link_label_font: &'static str,
}

impl Default for Theme {
	fn default() -> Self {
		Self {
			background: Color::rgb(22, 27, 34),
			node_fill: Color::rgb(255, 255, 255),
			link_stroke: Color::rgb(255, 255, 255),
			link_width: 1.0,
			arrow_fill: Color::rgb(255, 255, 255),
			focus: Color::rgb(255, 255, 133),
			label: Color::rgba(255, 255, 255, 0.85),
			label_font: "10px sans-serif",
			link_label: Color::rgb(255, 255, 255),
			link_label_font: "7px sans-serif",
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_hex_and_functional_notation() {
		assert_eq!(Color::parse("#1a8436"), Some(Color::rgb(0x1a, 0x84, 0x36)));
		assert_eq!(Color::parse("#fff"), Some(Color::rgb(255, 255, 255)));
		assert_eq!(Color::parse("rgb(1, 2, 3)"), Some(Color::rgb(1, 2, 3)));
		assert_eq!(
			Color::parse("rgba(1,2,3,0.5)"),
			Some(Color::rgba(1, 2, 3, 0.5))
		);
		assert_eq!(Color::parse("#12345"), None);
		assert_eq!(Color::parse("steelblue"), None);
	}

	#[test]
	fn css_output_drops_opaque_alpha() {
		assert_eq!(Color::rgb(255, 255, 133).to_css(), "#ffff85");
		assert_eq!(
			Color::rgba(0, 0, 0, 0.25).to_css(),
			"rgba(0, 0, 0, 0.25)"
		);
	}

	#[test]
	fn lerp_reaches_both_ends() {
		let white = Color::rgb(255, 255, 255);
		let focus = Theme::default().focus;
		assert_eq!(white.lerp(focus, 0.0), white);
		assert_eq!(white.lerp(focus, 1.0), focus);
		assert_eq!(white.lerp(focus, 2.0), focus);
	}

	#[test]
	fn named_colors_pass_through_unblended() {
		let focus = Theme::default().focus;
		let fallback = Color::rgb(1, 2, 3);

		let named = Paint::resolve(Some("steelblue"), fallback);
		assert_eq!(named, Paint::Css("steelblue".into()));
		assert_eq!(named.to_css(), "steelblue");
		assert_eq!(named.towards(focus, 1.0), "steelblue");

		let hex = Paint::resolve(Some(" #ff0000 "), fallback);
		assert_eq!(hex, Paint::Rgba(Color::rgb(255, 0, 0)));
		assert_eq!(hex.towards(focus, 1.0), focus.to_css());

		assert_eq!(Paint::resolve(None, fallback), Paint::Rgba(fallback));
		assert_eq!(Paint::resolve(Some("  "), fallback), Paint::Rgba(fallback));
	}
}
