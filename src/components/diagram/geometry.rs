//! Link paths from node boundary to node boundary.
//!
//! The renderer and the particle animator both read link geometry from here,
//! so edges and the particles riding them always agree.

/// Curvature of curved links as a fraction of their length.
const CURVE_BEND: f64 = 0.25;
/// Size of self-loops relative to the node radius.
const LOOP_SCALE: f64 = 2.6;

/// A straight segment or a quadratic Bézier between two node boundaries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LinkPath {
	Straight {
		from: (f64, f64),
		to: (f64, f64),
	},
	Curved {
		from: (f64, f64),
		control: (f64, f64),
		to: (f64, f64),
	},
}

/// One endpoint: center and radius.
#[derive(Clone, Copy, Debug)]
pub struct Endpoint {
	pub x: f64,
	pub y: f64,
	pub radius: f64,
}

impl LinkPath {
	/// Path from `source`'s boundary to `target`'s boundary.
	///
	/// Returns `None` when the nodes overlap so much that no visible segment
	/// remains. A link from a node to itself is always drawn as a loop.
	pub fn between(source: Endpoint, target: Endpoint, curved: bool, self_loop: bool) -> Option<Self> {
		if self_loop {
			return Some(Self::self_loop(source));
		}
		let (dx, dy) = (target.x - source.x, target.y - source.y);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist <= source.radius + target.radius + 0.5 {
			return None;
		}
		let (ux, uy) = (dx / dist, dy / dist);

		if !curved {
			return Some(LinkPath::Straight {
				from: (source.x + ux * source.radius, source.y + uy * source.radius),
				to: (target.x - ux * target.radius, target.y - uy * target.radius),
			});
		}

		// Bend to the left of the direction of travel, then leave each node
		// along the direction toward the control point.
		let bend = dist * CURVE_BEND;
		let control = (
			(source.x + target.x) / 2.0 - uy * bend,
			(source.y + target.y) / 2.0 + ux * bend,
		);
		Some(LinkPath::Curved {
			from: toward(source, control),
			control,
			to: toward(target, control),
		})
	}

	fn self_loop(node: Endpoint) -> Self {
		let r = node.radius;
		let lift = r * LOOP_SCALE;
		let angle = std::f64::consts::FRAC_PI_4;
		LinkPath::Curved {
			from: (node.x + r * angle.sin(), node.y - r * angle.cos()),
			control: (node.x, node.y - r - lift * 1.5),
			to: (node.x - r * angle.sin(), node.y - r * angle.cos()),
		}
	}

	pub fn start(&self) -> (f64, f64) {
		match *self {
			LinkPath::Straight { from, .. } | LinkPath::Curved { from, .. } => from,
		}
	}

	pub fn end(&self) -> (f64, f64) {
		match *self {
			LinkPath::Straight { to, .. } | LinkPath::Curved { to, .. } => to,
		}
	}

	/// Point at parameter `t` in `0.0..=1.0`.
	pub fn point_at(&self, t: f64) -> (f64, f64) {
		let t = t.clamp(0.0, 1.0);
		match *self {
			LinkPath::Straight { from, to } => lerp(from, to, t),
			LinkPath::Curved { from, control, to } => {
				let u = 1.0 - t;
				(
					u * u * from.0 + 2.0 * u * t * control.0 + t * t * to.0,
					u * u * from.1 + 2.0 * u * t * control.1 + t * t * to.1,
				)
			}
		}
	}

	/// Unit direction of travel at the end of the path (for arrowheads).
	pub fn end_direction(&self) -> (f64, f64) {
		let (a, b) = match *self {
			LinkPath::Straight { from, to } => (from, to),
			LinkPath::Curved { control, to, .. } => (control, to),
		};
		let (dx, dy) = (b.0 - a.0, b.1 - a.1);
		let len = (dx * dx + dy * dy).sqrt();
		if len < 1e-9 { (1.0, 0.0) } else { (dx / len, dy / len) }
	}

	pub fn midpoint(&self) -> (f64, f64) {
		self.point_at(0.5)
	}
}

fn lerp(a: (f64, f64), b: (f64, f64), t: f64) -> (f64, f64) {
	(a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t)
}

/// Point on `node`'s boundary facing `p`.
fn toward(node: Endpoint, p: (f64, f64)) -> (f64, f64) {
	let (dx, dy) = (p.0 - node.x, p.1 - node.y);
	let len = (dx * dx + dy * dy).sqrt();
	if len < 1e-9 {
		return (node.x, node.y);
	}
	(node.x + dx / len * node.radius, node.y + dy / len * node.radius)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ep(x: f64, y: f64, radius: f64) -> Endpoint {
		Endpoint { x, y, radius }
	}

	fn close(a: (f64, f64), b: (f64, f64)) -> bool {
		(a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
	}

	#[test]
	fn straight_path_runs_boundary_to_boundary() {
		let path = LinkPath::between(ep(0.0, 0.0, 10.0), ep(100.0, 0.0, 20.0), false, false).unwrap();
		assert!(close(path.start(), (10.0, 0.0)));
		assert!(close(path.end(), (80.0, 0.0)));
		assert!(close(path.point_at(0.5), (45.0, 0.0)));
		assert!(close(path.end_direction(), (1.0, 0.0)));
	}

	#[test]
	fn curved_path_endpoints_lie_on_boundaries() {
		let (a, b) = (ep(0.0, 0.0, 10.0), ep(200.0, 0.0, 10.0));
		let path = LinkPath::between(a, b, true, false).unwrap();
		for (p, n) in [(path.start(), a), (path.end(), b)] {
			let d = ((p.0 - n.x).powi(2) + (p.1 - n.y).powi(2)).sqrt();
			assert!((d - 10.0).abs() < 1e-9);
		}
		// Bends away from the straight line.
		assert!(path.midpoint().1.abs() > 1.0);
	}

	#[test]
	fn overlapping_nodes_have_no_path() {
		assert!(LinkPath::between(ep(0.0, 0.0, 10.0), ep(12.0, 0.0, 10.0), false, false).is_none());
	}

	#[test]
	fn self_loop_leaves_and_returns_to_same_node() {
		let n = ep(50.0, 50.0, 10.0);
		let path = LinkPath::between(n, n, false, true).unwrap();
		assert!(matches!(path, LinkPath::Curved { .. }));
		assert!(path.midpoint().1 < 50.0 - 10.0);
	}
}
