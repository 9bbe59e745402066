use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::store::Snapshot;
use super::types::{Edge, Marker, Node};
use super::view::{
	CanvasView, HANDLE_RADIUS, LOOP_RADIUS, NODE_HEIGHT, NODE_WIDTH, loop_center, source_anchor,
	target_anchor,
};

const ARROW_SIZE: f64 = 10.0;
const SELECTED_STROKE: &str = "#ff9500";

pub fn render(snapshot: &Snapshot, view: &CanvasView, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str("#ffffff");
	ctx.fill_rect(0.0, 0.0, view.width, view.height);
	ctx.save();
	let _ = ctx.translate(view.transform.x, view.transform.y);
	let _ = ctx.scale(view.transform.k, view.transform.k);
	draw_background(view, ctx);
	draw_edges(snapshot, view, ctx);
	draw_pending_connection(snapshot, view, ctx);
	draw_nodes(snapshot, view, ctx);
	ctx.restore();
}

fn draw_background(view: &CanvasView, ctx: &CanvasRenderingContext2d) {
	const GAP: f64 = 16.0;
	let (x0, y0) = view.screen_to_graph(0.0, 0.0);
	let (x1, y1) = view.screen_to_graph(view.width, view.height);
	let dot = 1.0 / view.transform.k;
	ctx.set_fill_style_str("#aaaaaa");
	let mut x = (x0 / GAP).floor() * GAP;
	while x <= x1 {
		let mut y = (y0 / GAP).floor() * GAP;
		while y <= y1 {
			ctx.fill_rect(x - dot / 2.0, y - dot / 2.0, dot, dot);
			y += GAP;
		}
		x += GAP;
	}
}

fn draw_edges(snapshot: &Snapshot, view: &CanvasView, ctx: &CanvasRenderingContext2d) {
	let selected = snapshot.selected_edge();
	for edge in snapshot.edges() {
		let (Some(source), Some(target)) = (snapshot.node(edge.source), snapshot.node(edge.target))
		else {
			continue;
		};
		let is_selected = selected == Some(&edge.id);
		let stroke = if is_selected {
			SELECTED_STROKE
		} else {
			edge.style.stroke
		};
		let width = if is_selected {
			edge.style.stroke_width + 1.0
		} else {
			edge.style.stroke_width
		};

		ctx.set_stroke_style_str(stroke);
		ctx.set_fill_style_str(stroke);
		ctx.set_line_width(width);
		if edge.style.animated {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(5.0),
				&JsValue::from_f64(5.0),
			));
			ctx.set_line_dash_offset(-(view.flow_time * 20.0) % 10.0);
		}

		if edge.source == edge.target {
			draw_loop(source, edge, ctx);
		} else {
			draw_line(source_anchor(source), target_anchor(target), edge, ctx);
		}
		let _ = ctx.set_line_dash(&js_sys::Array::new());
	}
}

fn draw_line(from: (f64, f64), to: (f64, f64), edge: &Edge, ctx: &CanvasRenderingContext2d) {
	let (dx, dy) = (to.0 - from.0, to.1 - from.1);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist < 0.001 {
		return;
	}
	let (ux, uy) = (dx / dist, dy / dist);
	let inset = if edge.style.marker == Marker::ArrowClosed {
		ARROW_SIZE
	} else {
		0.0
	};

	ctx.begin_path();
	ctx.move_to(from.0, from.1);
	ctx.line_to(to.0 - ux * inset, to.1 - uy * inset);
	ctx.stroke();

	if edge.style.marker == Marker::ArrowClosed {
		draw_arrow(to, (ux, uy), ctx);
	}
}

fn draw_loop(node: &Node, edge: &Edge, ctx: &CanvasRenderingContext2d) {
	let (cx, cy) = loop_center(node);
	ctx.begin_path();
	let _ = ctx.arc(cx, cy, LOOP_RADIUS, -PI / 2.0, PI / 2.0);
	ctx.stroke();
	if edge.style.marker == Marker::ArrowClosed {
		draw_arrow((cx, cy + LOOP_RADIUS), (-1.0, 0.0), ctx);
	}
}

fn draw_arrow(tip: (f64, f64), dir: (f64, f64), ctx: &CanvasRenderingContext2d) {
	let _ = ctx.set_line_dash(&js_sys::Array::new());
	let (ux, uy) = dir;
	let (back_x, back_y) = (tip.0 - ux * ARROW_SIZE, tip.1 - uy * ARROW_SIZE);
	let (px, py) = (-uy * ARROW_SIZE * 0.5, ux * ARROW_SIZE * 0.5);
	ctx.begin_path();
	ctx.move_to(tip.0, tip.1);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();
}

fn draw_pending_connection(snapshot: &Snapshot, view: &CanvasView, ctx: &CanvasRenderingContext2d) {
	let Some(source) = view.connect.source.and_then(|id| snapshot.node(id)) else {
		return;
	};
	let (x0, y0) = source_anchor(source);
	let (x1, y1) = view.screen_to_graph(view.connect.pointer.0, view.connect.pointer.1);
	ctx.set_stroke_style_str("#6366f1");
	ctx.set_line_width(1.5);
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(4.0),
		&JsValue::from_f64(4.0),
	));
	ctx.begin_path();
	ctx.move_to(x0, y0);
	ctx.line_to(x1, y1);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_nodes(snapshot: &Snapshot, view: &CanvasView, ctx: &CanvasRenderingContext2d) {
	let selected = snapshot.selected_node();
	let highlighted = view
		.hover
		.map(|id| snapshot.neighbors(id))
		.unwrap_or_default();

	for node in snapshot.nodes() {
		let (x, y) = (node.position.x, node.position.y);
		let is_selected = selected == Some(node.id);
		let is_hovered = view.hover == Some(node.id);

		ctx.set_shadow_color("rgba(0, 0, 0, 0.12)");
		ctx.set_shadow_blur(if is_hovered { 12.0 } else { 6.0 });
		ctx.set_fill_style_str(if is_selected { "#e0e7ff" } else { "#f9fafb" });
		rounded_rect(ctx, x, y, NODE_WIDTH, NODE_HEIGHT, 8.0);
		ctx.fill();
		ctx.set_shadow_blur(0.0);

		let border = if is_selected || is_hovered {
			"#6366f1"
		} else if highlighted.contains(&node.id) {
			"#a5b4fc"
		} else {
			"#555555"
		};
		ctx.set_stroke_style_str(border);
		ctx.set_line_width(2.0);
		ctx.stroke();

		ctx.set_fill_style_str("#111827");
		ctx.set_font("500 14px sans-serif");
		ctx.set_text_align("center");
		ctx.set_text_baseline("middle");
		let label = fit_label(ctx, &node.label, NODE_WIDTH - 24.0);
		let _ = ctx.fill_text(&label, x + NODE_WIDTH / 2.0, y + NODE_HEIGHT / 2.0);

		for (hx, hy) in [source_anchor(node), target_anchor(node)] {
			ctx.begin_path();
			let _ = ctx.arc(hx, hy, HANDLE_RADIUS, 0.0, 2.0 * PI);
			ctx.set_fill_style_str("#6366f1");
			ctx.fill();
			ctx.set_stroke_style_str("#ffffff");
			ctx.set_line_width(2.0);
			ctx.stroke();
		}
	}
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
	ctx.begin_path();
	ctx.move_to(x + r, y);
	let _ = ctx.arc_to(x + w, y, x + w, y + h, r);
	let _ = ctx.arc_to(x + w, y + h, x, y + h, r);
	let _ = ctx.arc_to(x, y + h, x, y, r);
	let _ = ctx.arc_to(x, y, x + w, y, r);
	ctx.close_path();
}

/// Truncate with an ellipsis so the label fits inside the card.
fn fit_label(ctx: &CanvasRenderingContext2d, label: &str, max_width: f64) -> String {
	let width = |s: &str| ctx.measure_text(s).map(|m| m.width()).unwrap_or(0.0);
	if width(label) <= max_width {
		return label.to_owned();
	}
	let mut chars: Vec<char> = label.chars().collect();
	while !chars.is_empty() {
		chars.pop();
		let candidate: String = chars.iter().chain(['…'].iter()).collect();
		if width(&candidate) <= max_width {
			return candidate;
		}
	}
	String::new()
}
