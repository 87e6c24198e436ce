use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use log::info;

use super::loader::GraphLoader;
use super::types::ConceptGraphData;
use crate::layout::{ConceptGraph, ConceptLayouts, LayoutConfig, LayoutKind, NodeId, Viewport};

const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

pub const NODE_RADIUS: f64 = 5.0;
pub const HIT_RADIUS: f64 = 12.0;

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node: Option<NodeId>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f64,
	pub node_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<NodeId>,
	pub neighbors: HashSet<NodeId>,
	pub highlight_t: f64,
	pub prev_node: Option<NodeId>,
	pub prev_neighbors: HashSet<NodeId>,
	delay_t: f64,
}

/// How the canvas reveals the concept graph.
#[derive(Clone, Debug)]
pub struct LoadOptions {
	/// Concepts present before the first frame.
	pub initial_concepts: usize,
	/// Delay between two further concepts.
	pub interval_ms: f64,
}

impl Default for LoadOptions {
	fn default() -> Self {
		Self {
			initial_concepts: 1,
			interval_ms: 250.0,
		}
	}
}

/// Everything the canvas needs between frames: the graph, the layouts
/// running on it, and pointer interaction.
pub struct ConceptGraphState {
	pub graph: ConceptGraph,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub flow_time: f64,
	layouts: ConceptLayouts,
	current_layout: LayoutKind,
	link_max_desired_length: f64,
	loader: GraphLoader,
	colors: HashMap<String, &'static str>,
}

impl ConceptGraphState {
	pub fn new(
		data: &ConceptGraphData,
		width: f64,
		height: f64,
		config: LayoutConfig,
		load: LoadOptions,
	) -> Self {
		let mut graph = ConceptGraph::new();
		let mut loader = GraphLoader::new(data.clone(), load.interval_ms);
		let initial = load.initial_concepts.max(1);
		loader.load_batch(&mut graph, initial, |i| {
			let angle = (i as f64) * 2.0 * PI / initial as f64;
			(width / 2.0 + 100.0 * angle.cos(), height / 2.0 + 100.0 * angle.sin())
		});
		info!(
			"concept graph ready with {} of {} concepts",
			graph.len(),
			data.concepts.len()
		);

		let mut state = Self {
			graph,
			transform: ViewTransform {
				x: 0.0,
				y: 0.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			flow_time: 0.0,
			layouts: ConceptLayouts::new(&config, data.central_concept.clone()),
			current_layout: LayoutKind::default(),
			link_max_desired_length: config.link_max_desired_length,
			loader,
			colors: HashMap::new(),
		};
		state.assign_colors();
		state
	}

	pub fn vis_width(&self) -> f64 {
		self.width
	}

	pub fn vis_height(&self) -> f64 {
		self.height
	}

	pub fn link_max_desired_length(&self) -> f64 {
		self.link_max_desired_length
	}

	pub fn viewport(&self) -> Viewport {
		Viewport {
			width: self.vis_width(),
			height: self.vis_height(),
			link_max_desired_length: self.link_max_desired_length(),
		}
	}

	pub fn set_current_layout(&mut self, kind: LayoutKind) {
		info!("switching to {}", kind.label());
		self.current_layout = kind;
	}

	pub fn run_current_layout(&mut self, refresh: bool, now: f64) {
		let view = self.viewport();
		self.layouts
			.apply(self.current_layout, refresh, &mut self.graph, &view, now);
	}

	/// Reveals the next concept when one is due and re-lays the graph
	/// incrementally. Returns whether the graph grew.
	pub fn load_more(&mut self, now: f64) -> bool {
		let seed = (self.width / 2.0, self.height / 2.0);
		if !self.loader.poll(&mut self.graph, now, seed) {
			return false;
		}
		self.assign_colors();
		self.run_current_layout(true, now);
		true
	}

	/// Advances the force layout and the hover animation by `dt` seconds.
	pub fn on_layout_tick(&mut self, dt: f32) -> bool {
		let view = self.viewport();
		let moved = self.layouts.tick(&mut self.graph, &view, dt);
		self.flow_time += dt as f64;
		self.tick_hover(dt as f64);
		moved
	}

	fn tick_hover(&mut self, dt: f64) {
		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	/// Resizes the drawing area and re-lays the graph to fit.
	pub fn resize(&mut self, width: f64, height: f64, now: f64) {
		self.width = width;
		self.height = height;
		self.run_current_layout(true, now);
	}

	/// Where each node is drawn at `now`, indexed by [`NodeId`].
	pub fn displayed_positions(&self, now: f64) -> Vec<(f64, f64)> {
		self.layouts.displayed_positions(&self.graph, now)
	}

	pub fn displayed_position(&self, id: NodeId, now: f64) -> Option<(f64, f64)> {
		self.displayed_positions(now).get(id.index()).copied()
	}

	pub fn color_of(&self, id: NodeId) -> &'static str {
		self.graph
			.node(id)
			.and_then(|n| self.colors.get(&n.ontology_acronym).copied())
			.unwrap_or(COLORS[0])
	}

	fn assign_colors(&mut self) {
		for acronym in self.graph.ontology_acronyms() {
			let next = COLORS[self.colors.len() % COLORS.len()];
			self.colors.entry(acronym).or_insert(next);
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64, now: f64) -> Option<NodeId> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		// HIT_RADIUS is in world-space, scales with zoom like nodes
		self.displayed_positions(now)
			.iter()
			.enumerate()
			.filter(|(_, (x, y))| ((x - gx).powi(2) + (y - gy).powi(2)).sqrt() < HIT_RADIUS)
			.map(|(i, _)| NodeId(i))
			.last()
	}

	/// Moves a node to graph coordinates `(x, y)` and keeps it there.
	pub fn move_node(&mut self, id: NodeId, x: f64, y: f64) {
		self.layouts.move_node(&mut self.graph, id, x, y);
	}

	pub fn set_hover(&mut self, node: Option<NodeId>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Save previous state for fade-out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(id) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			self.hover.neighbors = self.graph.neighbors(id);
		}
	}

	pub fn is_highlighted(&self, id: NodeId) -> bool {
		self.hover.node == Some(id)
			|| self.hover.neighbors.contains(&id)
			|| self.hover.prev_node == Some(id)
			|| self.hover.prev_neighbors.contains(&id)
	}

	pub fn is_hovered(&self, id: NodeId) -> bool {
		self.hover.node == Some(id) || self.hover.prev_node == Some(id)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}
}
