use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::camera::Frame;
use super::interaction::Emphasis;
use super::state::{ForceGraphState, edge_width};
use crate::config::theme;
use crate::store::Selection;

/// Nodes at least this large on screen always show their label.
const LABEL_SIZE_THRESHOLD: f64 = 12.0;
const LABEL_FONT: &str = "12px sans-serif";
const LABEL_FONT_HIGHLIGHTED: &str = "bold 13px sans-serif";

pub fn render(state: &ForceGraphState, selection: &Selection, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(theme::BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	let frame = state.frame();
	let emphasis = state.emphasis(selection);
	draw_edges(state, &frame, &emphasis, ctx);
	draw_nodes(state, &frame, &emphasis, ctx);
}

fn draw_edges(state: &ForceGraphState, frame: &Frame, emphasis: &Emphasis<'_>, ctx: &CanvasRenderingContext2d) {
	// Highlighted edges are drawn last so they sit on top.
	let mut deferred = Vec::new();
	for (key, edge) in state.graph.edges() {
		let (Some(a), Some(b)) = (state.graph.node(&edge.source), state.graph.node(&edge.target)) else {
			continue;
		};
		let style = emphasis.edge_style(key, edge);
		let from = frame.graph_to_viewport(a.x, a.y);
		let to = frame.graph_to_viewport(b.x, b.y);
		if style.color == theme::EDGE {
			stroke_edge(ctx, from, to, style.color, edge_width(style.size));
		} else {
			deferred.push((from, to, style, edge));
		}
	}
	for (from, to, style, edge) in deferred {
		stroke_edge(ctx, from, to, style.color, edge_width(style.size) + 1.0);
		let text = match &edge.attrs.label {
			Some(label) if edge.attrs.original_weight > 1 => format!("{label} ({})", edge.attrs.original_weight),
			Some(label) => label.clone(),
			None if edge.attrs.original_weight > 1 => format!("x{}", edge.attrs.original_weight),
			None => continue,
		};
		ctx.set_fill_style_str(style.color);
		ctx.set_font(LABEL_FONT);
		let _ = ctx.fill_text(&text, (from.0 + to.0) / 2.0 + 4.0, (from.1 + to.1) / 2.0 - 4.0);
	}
}

fn stroke_edge(ctx: &CanvasRenderingContext2d, from: (f64, f64), to: (f64, f64), color: &str, width: f64) {
	ctx.set_stroke_style_str(color);
	ctx.set_line_width(width);
	ctx.begin_path();
	ctx.move_to(from.0, from.1);
	ctx.line_to(to.0, to.1);
	ctx.stroke();
}

fn draw_nodes(state: &ForceGraphState, frame: &Frame, emphasis: &Emphasis<'_>, ctx: &CanvasRenderingContext2d) {
	let mut highlighted = Vec::new();
	for (id, node) in state.graph.nodes() {
		let style = emphasis.node_style(id, node);
		if style.highlighted {
			highlighted.push((node, style));
			continue;
		}
		let (x, y) = frame.graph_to_viewport(node.x, node.y);
		let radius = frame.node_radius(style.size);
		ctx.set_global_alpha(if emphasis.is_active() { 0.5 } else { 1.0 });
		draw_disc(ctx, x, y, radius, style.color, style.border_color, node.attrs.border_size);
		ctx.set_global_alpha(1.0);
		if radius >= LABEL_SIZE_THRESHOLD && !emphasis.is_active() {
			ctx.set_fill_style_str(style.label_color);
			ctx.set_font(LABEL_FONT);
			let _ = ctx.fill_text(&node.attrs.label, x + radius + 3.0, y + 4.0);
		}
	}

	for (node, style) in highlighted {
		let (x, y) = frame.graph_to_viewport(node.x, node.y);
		let radius = frame.node_radius(style.size);
		draw_disc(ctx, x, y, radius, style.color, style.border_color, node.attrs.border_size.max(0.35));

		// Label on a light plate.
		ctx.set_font(LABEL_FONT_HIGHLIGHTED);
		let text_width = ctx
			.measure_text(&node.attrs.label)
			.map(|m| m.width())
			.unwrap_or(node.attrs.label.chars().count() as f64 * 7.0);
		let (lx, ly) = (x + radius + 4.0, y - 9.0);
		ctx.set_fill_style_str(theme::LABEL);
		ctx.fill_rect(lx - 3.0, ly, text_width + 6.0, 18.0);
		ctx.set_fill_style_str(style.label_color);
		let _ = ctx.fill_text(&node.attrs.label, lx, ly + 13.0);
	}
}

fn draw_disc(
	ctx: &CanvasRenderingContext2d,
	x: f64,
	y: f64,
	radius: f64,
	fill: &str,
	border: &str,
	border_size: f64,
) {
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(fill);
	ctx.fill();
	ctx.set_stroke_style_str(border);
	ctx.set_line_width((radius * border_size).max(1.0));
	ctx.stroke();
}
