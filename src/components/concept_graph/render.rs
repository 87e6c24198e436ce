use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{ConceptGraphState, NODE_RADIUS};
use crate::layout::NodeId;

const STRUCTURAL_RGB: &str = "100, 180, 255";
const MAPPING_RGB: &str = "255, 170, 80";

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(state: &ConceptGraphState, ctx: &CanvasRenderingContext2d, now: f64) {
	let positions = state.displayed_positions(now);
	ctx.set_fill_style_str("#1a1a2e");
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx, &positions);
	draw_nodes(state, ctx, &positions);
	ctx.restore();
}

fn draw_edges(state: &ConceptGraphState, ctx: &CanvasRenderingContext2d, positions: &[(f64, f64)]) {
	let k = state.transform.k;
	let (line_width, dash, gap, arrow_size) = (1.5 / k, 8.0 / k, 4.0 / k, 8.0 / k);
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);
	let t = ease_out_cubic(state.hover.highlight_t);

	for (source, target, link) in state.graph.resolved_links() {
		let (Some(&(x1, y1)), Some(&(x2, y2))) =
			(positions.get(source.index()), positions.get(target.index()))
		else {
			continue;
		};
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}

		let is_highlighted = state.is_highlighted(source) && state.is_highlighted(target);

		// t=0: all edges at base (0.6), t=1: highlighted at 0.9, others at 0.15
		let (edge_alpha, arrow_alpha, width) = if is_highlighted {
			(0.6 + 0.3 * t, 0.8 + 0.1 * t, line_width * (1.0 + 0.3 * t))
		} else {
			(0.6 - 0.45 * t, 0.8 - 0.45 * t, line_width * (1.0 - 0.3 * t))
		};
		let rgb = if link.is_structural() {
			STRUCTURAL_RGB
		} else {
			MAPPING_RGB
		};

		ctx.set_stroke_style_str(&format!("rgba({}, {})", rgb, edge_alpha));
		ctx.set_line_width(width);
		if link.is_structural() {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(dash),
				&JsValue::from_f64(gap),
			));
			ctx.set_line_dash_offset(dash_offset);
		} else {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(gap / 2.0),
				&JsValue::from_f64(gap),
			));
			ctx.set_line_dash_offset(0.0);
		}

		let (ux, uy) = (dx / dist, dy / dist);
		ctx.begin_path();
		ctx.move_to(x1 + ux * NODE_RADIUS, y1 + uy * NODE_RADIUS);
		ctx.line_to(
			x2 - ux * (NODE_RADIUS + arrow_size),
			y2 - uy * (NODE_RADIUS + arrow_size),
		);
		ctx.stroke();

		let _ = ctx.set_line_dash(&js_sys::Array::new());
		ctx.set_fill_style_str(&format!("rgba({}, {})", rgb, arrow_alpha));
		let (tip_x, tip_y) = (x2 - ux * NODE_RADIUS, y2 - uy * NODE_RADIUS);
		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_label(
	state: &ConceptGraphState,
	ctx: &CanvasRenderingContext2d,
	id: NodeId,
	(x, y): (f64, f64),
	radius: f64,
) {
	let Some(node) = state.graph.node(id) else {
		return;
	};
	ctx.set_font(&format!("{}px sans-serif", 10.0 / state.transform.k.max(0.5)));
	let _ = ctx.fill_text(&node.name, x + radius + 3.0, y + 3.0);
}

fn draw_nodes(state: &ConceptGraphState, ctx: &CanvasRenderingContext2d, positions: &[(f64, f64)]) {
	let (has_highlight, t, k) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
		state.transform.k,
	);

	for (idx, &(x, y)) in positions.iter().enumerate() {
		let id = NodeId(idx);
		if has_highlight && state.is_highlighted(id) {
			continue;
		}
		let (alpha, radius) = (1.0 - 0.7 * t, NODE_RADIUS * (1.0 - 0.15 * t));

		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(state.color_of(id));
		ctx.fill();
		ctx.set_global_alpha(1.0);

		ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", alpha * 0.8));
		draw_label(state, ctx, id, (x, y), radius);
	}

	if !has_highlight {
		return;
	}

	for (idx, &(x, y)) in positions.iter().enumerate() {
		let id = NodeId(idx);
		if !state.is_highlighted(id) {
			continue;
		}
		let is_hovered = state.is_hovered(id);
		let is_neighbor =
			state.hover.neighbors.contains(&id) || state.hover.prev_neighbors.contains(&id);

		let (radius, glow_radius) = if is_hovered {
			(
				NODE_RADIUS * (1.0 + 0.35 * t),
				NODE_RADIUS * (1.8 + 1.2 * t),
			)
		} else if is_neighbor {
			(NODE_RADIUS * (1.0 + 0.2 * t), NODE_RADIUS * (1.4 + 0.6 * t))
		} else {
			(NODE_RADIUS, 0.0)
		};

		if glow_radius > 0.0 && t > 0.01 {
			if let Ok(gradient) = ctx.create_radial_gradient(x, y, radius * 0.3, x, y, glow_radius)
			{
				let alpha = if is_hovered { 0.35 * t } else { 0.2 * t };
				let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 255, 255, {})", alpha));
				let _ = gradient
					.add_color_stop(0.6, &format!("rgba(200, 220, 255, {})", alpha * 0.3));
				let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
				ctx.begin_path();
				let _ = ctx.arc(x, y, glow_radius, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}

		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(state.color_of(id));
		ctx.fill();

		if is_hovered && t > 0.01 {
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + 2.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {})", 0.7 * t));
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}

		ctx.set_fill_style_str("white");
		draw_label(state, ctx, id, (x, y), radius);
	}
}
