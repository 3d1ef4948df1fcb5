//! Canvas rendering for a diagram.
//!
//! Passes, back to front:
//! 1. Background
//! 2. Links (solid or dashed, straight or curved) with arrowheads
//! 3. Link labels and step badges
//! 4. Flow particles
//! 5. Nodes, dimmed ones first, highlighted ones on top, then labels
//!
//! Every visual attribute comes from [`DiagramState`] and its view state;
//! nothing here mutates state.

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::geometry::LinkPath;
use super::state::DiagramState;
use super::theme::{Color, Theme};

/// Renders the complete diagram to the canvas.
pub fn render(state: &DiagramState, ctx: &CanvasRenderingContext2d, theme: &Theme, now_ms: f64) {
	ctx.set_fill_style_str(&theme.background.to_css());
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	draw_links(state, ctx, theme);
	draw_link_annotations(state, ctx, theme);
	draw_particles(state, ctx, theme, now_ms);
	draw_nodes(state, ctx, theme);
}

fn rgba(color: Color, alpha: f64) -> String {
	color.with_alpha(color.a * alpha).to_css()
}

fn trace(ctx: &CanvasRenderingContext2d, path: &LinkPath) {
	let (sx, sy) = path.start();
	ctx.begin_path();
	ctx.move_to(sx, sy);
	match *path {
		LinkPath::Straight { to, .. } => ctx.line_to(to.0, to.1),
		LinkPath::Curved { control, to, .. } => ctx.quadratic_curve_to(control.0, control.1, to.0, to.1),
	}
}

fn draw_links(state: &DiagramState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let style = &theme.edge;
	let dash = js_sys::Array::of2(&JsValue::from_f64(style.dash.0), &JsValue::from_f64(style.dash.1));
	let solid = js_sys::Array::new();

	for (idx, info) in state.links.iter().enumerate() {
		let Some(path) = state.link_path(idx) else {
			continue;
		};
		let Some((s, t)) = state.sim.links()[idx].endpoints() else {
			continue;
		};
		let visual = state.view.link_visual(s, t);

		ctx.set_stroke_style_str(&rgba(style.color, visual.alpha));
		ctx.set_line_width(style.width * visual.width_scale);
		let _ = ctx.set_line_dash(if info.dashed { &dash } else { &solid });
		trace(ctx, &path);
		ctx.stroke();

		let _ = ctx.set_line_dash(&solid);
		draw_arrow(ctx, &path, style.arrow_size, &rgba(style.color, visual.alpha));
	}
}

fn draw_arrow(ctx: &CanvasRenderingContext2d, path: &LinkPath, size: f64, fill: &str) {
	let (tip_x, tip_y) = path.end();
	let (ux, uy) = path.end_direction();
	let (back_x, back_y) = (tip_x - ux * size, tip_y - uy * size);
	let (px, py) = (-uy * size * 0.5, ux * size * 0.5);

	ctx.set_fill_style_str(fill);
	ctx.begin_path();
	ctx.move_to(tip_x, tip_y);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();
}

fn draw_link_annotations(state: &DiagramState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let style = &theme.edge;
	ctx.set_font(style.label_font);
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");

	for (idx, info) in state.links.iter().enumerate() {
		if info.sequence.is_none() && (info.label.is_none() || !state.show_link_labels) {
			continue;
		}
		let Some(path) = state.link_path(idx) else {
			continue;
		};
		let (mx, my) = path.midpoint();

		if let Some(step) = info.sequence {
			ctx.set_fill_style_str(&style.step_fill.to_css());
			ctx.begin_path();
			let _ = ctx.arc(mx, my, 9.0, 0.0, 2.0 * PI);
			ctx.fill();
			ctx.set_fill_style_str(&style.label_color.to_css());
			let _ = ctx.fill_text(&step.to_string(), mx, my);
		}
		if let (Some(label), true) = (&info.label, state.show_link_labels) {
			let offset = if info.sequence.is_some() { 16.0 } else { 0.0 };
			ctx.set_fill_style_str(&style.label_color.to_css());
			let _ = ctx.fill_text(label, mx, my - 8.0 - offset);
		}
	}
}

fn draw_particles(state: &DiagramState, ctx: &CanvasRenderingContext2d, theme: &Theme, now_ms: f64) {
	let r = state.particle_radius;
	for (_, x, y) in state.particle_positions(now_ms) {
		ctx.set_fill_style_str(&theme.particles.glow.to_css());
		ctx.begin_path();
		let _ = ctx.arc(x, y, r * 2.5, 0.0, 2.0 * PI);
		ctx.fill();

		ctx.set_fill_style_str(&theme.particles.color.to_css());
		ctx.begin_path();
		let _ = ctx.arc(x, y, r, 0.0, 2.0 * PI);
		ctx.fill();
	}
}

fn draw_nodes(state: &DiagramState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let count = state.nodes.len();
	// Highlighted nodes are drawn last so they sit on top.
	let order = (0..count)
		.filter(|&i| !state.view.is_highlighted(i))
		.chain((0..count).filter(|&i| state.view.is_highlighted(i)));

	for idx in order {
		draw_node(state, ctx, theme, idx);
	}
}

fn draw_node(state: &DiagramState, ctx: &CanvasRenderingContext2d, theme: &Theme, idx: usize) {
	let style = &theme.node;
	let info = &state.nodes[idx];
	let sim_node = &state.sim.nodes()[idx];
	let visual = state.view.node_visual(idx);
	let (x, y) = (sim_node.x, sim_node.y);
	let radius = sim_node.radius * visual.radius_scale;

	ctx.set_global_alpha(visual.alpha);

	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	match ctx.create_radial_gradient(x - radius * 0.3, y - radius * 0.3, 0.0, x, y, radius) {
		Ok(gradient) if style.use_gradient => {
			let _ = gradient.add_color_stop(0.0, &info.color.lighten(0.35).to_css());
			let _ = gradient.add_color_stop(0.7, &info.color.to_css());
			let _ = gradient.add_color_stop(1.0, &info.color.darken(0.2).to_css());
			ctx.set_fill_style_canvas_gradient(&gradient);
		}
		_ => ctx.set_fill_style_str(&info.color.to_css()),
	}
	ctx.fill();

	if style.border_width > 0.0 {
		ctx.set_stroke_style_str(&style.border_color.to_css());
		ctx.set_line_width(style.border_width);
		ctx.stroke();
	}

	if visual.ring > 0.0 {
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius + 4.0, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {})", visual.ring));
		ctx.set_line_width(1.5);
		ctx.stroke();
	}

	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	ctx.set_fill_style_str(&style.label_color.to_css());
	ctx.set_font(style.label_font);
	let label_y = if info.sublabel.is_some() { y - 6.0 } else { y };
	let _ = ctx.fill_text(&info.label, x, label_y);
	if let Some(sub) = &info.sublabel {
		ctx.set_font(style.sublabel_font);
		let _ = ctx.fill_text(sub, x, y + 8.0);
	}

	ctx.set_global_alpha(1.0);
}
