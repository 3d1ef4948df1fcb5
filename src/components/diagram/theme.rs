//! Visual theming for diagrams: colors, category palette and stroke styles.

use std::collections::HashMap;

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

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	/// Darken the color by a factor (0.0 = unchanged, 1.0 = black)
	pub fn darken(self, factor: f64) -> Self {
		let f = 1.0 - factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * f) as u8,
			g: (self.g as f64 * f) as u8,
			b: (self.b as f64 * f) as u8,
			a: self.a,
		}
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}

	/// Parse `#rrggbb`. Anything else yields `None`.
	pub fn from_hex(hex: &str) -> Option<Self> {
		let digits = hex.strip_prefix('#')?;
		if digits.len() != 6 {
			return None;
		}
		let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
		Some(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
	}
}

/// Fallback colors for categories without a fixed assignment.
#[derive(Clone, Debug)]
pub struct NodePalette {
	pub colors: Vec<Color>,
}

impl NodePalette {
	/// Muted slate blues and teals.
	pub fn slate() -> Self {
		Self {
			colors: vec![
				Color::rgb(94, 129, 172),  // Steel blue
				Color::rgb(100, 148, 160), // Teal gray
				Color::rgb(130, 120, 150), // Wisteria
				Color::rgb(180, 136, 100), // Tan
				Color::rgb(119, 158, 165), // Desaturated cyan
				Color::rgb(165, 115, 90),  // Rust
				Color::rgb(125, 145, 140), // Sage
				Color::rgb(143, 163, 180), // Cool gray
			],
		}
	}

	pub fn get(&self, index: usize) -> Color {
		self.colors[index % self.colors.len()]
	}
}

/// Fixed colors for the categories the built-in diagrams use.
pub fn default_category_colors() -> HashMap<String, Color> {
	[
		("client", "#1976d2"),
		("gateway", "#7b1fa2"),
		("service", "#2e7d32"),
		("storage", "#e65100"),
		("queue", "#00838f"),
		("worker", "#c62828"),
		("external", "#757575"),
	]
	.into_iter()
	.filter_map(|(k, v)| Some((k.to_string(), Color::from_hex(v)?)))
	.collect()
}

#[derive(Clone, Debug)]
pub struct EdgeStyle {
	pub color: Color,
	pub width: f64,
	/// Dash pattern (dash, gap) for dashed links.
	pub dash: (f64, f64),
	pub arrow_size: f64,
	pub label_font: &'static str,
	pub label_color: Color,
	pub step_fill: Color,
}

#[derive(Clone, Debug)]
pub struct NodeStyle {
	pub radius: f64,
	pub use_gradient: bool,
	pub border_width: f64,
	pub border_color: Color,
	pub label_font: &'static str,
	pub sublabel_font: &'static str,
	pub label_color: Color,
}

#[derive(Clone, Debug)]
pub struct ParticleStyle {
	pub color: Color,
	pub glow: Color,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	pub background: Color,
	pub edge: EdgeStyle,
	pub node: NodeStyle,
	pub particles: ParticleStyle,
	pub palette: NodePalette,
	pub categories: HashMap<String, Color>,
}

impl Theme {
	/// Color for a category. Unknown categories take palette colors in order
	/// of first appearance, tracked in `seen`.
	pub fn category_color(&self, category: &str, seen: &mut Vec<String>) -> Color {
		if let Some(c) = self.categories.get(category) {
			return *c;
		}
		let index = match seen.iter().position(|c| c == category) {
			Some(i) => i,
			None => {
				seen.push(category.to_string());
				seen.len() - 1
			}
		};
		self.palette.get(index)
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self {
			background: Color::rgb(22, 27, 34),
			edge: EdgeStyle {
				color: Color::rgba(140, 160, 180, 0.8),
				width: 1.5,
				dash: (6.0, 4.0),
				arrow_size: 7.0,
				label_font: "11px sans-serif",
				label_color: Color::rgba(200, 210, 220, 0.85),
				step_fill: Color::rgb(48, 56, 66),
			},
			node: NodeStyle {
				radius: 22.0,
				use_gradient: true,
				border_width: 1.5,
				border_color: Color::rgba(255, 255, 255, 0.35),
				label_font: "600 12px sans-serif",
				sublabel_font: "10px sans-serif",
				label_color: Color::rgba(255, 255, 255, 0.95),
			},
			particles: ParticleStyle {
				color: Color::rgb(255, 214, 102),
				glow: Color::rgba(255, 214, 102, 0.25),
			},
			palette: NodePalette::slate(),
			categories: default_category_colors(),
		}
	}
}
