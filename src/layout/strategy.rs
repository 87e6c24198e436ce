use std::f64::consts::PI;

use log::{debug, warn};

use super::LayoutConfig;
use super::force::ForceLayout;
use super::graph::{ConceptGraph, NodeId};
use super::transition::TransitionDriver;
use super::tree::build_tree;

/// Space left above (or beside) a tree for the menu and labels.
const TREE_OFFSET: f64 = 150.0;
/// Angular extent shared by all ontologies in the radial layout, in degrees.
const RADIAL_DEGREES: f64 = 360.0;
/// Extra radius per additional ontology in the radial layout.
const RADIAL_RING_STEP: f64 = 20.0;

/// The available layout strategies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LayoutKind {
	#[default]
	Force,
	Circle,
	Center,
	HorizontalTree,
	VerticalTree,
	Radial,
}

impl LayoutKind {
	/// Menu order.
	pub const ALL: [LayoutKind; 6] = [
		LayoutKind::Force,
		LayoutKind::Circle,
		LayoutKind::Center,
		LayoutKind::HorizontalTree,
		LayoutKind::VerticalTree,
		LayoutKind::Radial,
	];

	pub fn label(self) -> &'static str {
		match self {
			LayoutKind::Force => "Force-Directed Layout",
			LayoutKind::Circle => "Circle Layout",
			LayoutKind::Center => "Center Layout",
			LayoutKind::HorizontalTree => "Horizontal Tree Layout",
			LayoutKind::VerticalTree => "Vertical Tree Layout",
			LayoutKind::Radial => "Radial Layout",
		}
	}

	pub fn button_id(self) -> &'static str {
		match self {
			LayoutKind::Force => "forceLayoutButton",
			LayoutKind::Circle => "circleLayoutButton",
			LayoutKind::Center => "centerLayoutButton",
			LayoutKind::HorizontalTree => "horizontalTreeLayoutButton",
			LayoutKind::VerticalTree => "verticalTreeLayoutButton",
			LayoutKind::Radial => "radialLayoutButton",
		}
	}
}

/// Size of the drawing area the layouts fill.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub width: f64,
	pub height: f64,
	/// Radius used by the circle and center layouts.
	pub link_max_desired_length: f64,
}

impl Viewport {
	pub fn center(&self) -> (f64, f64) {
		(self.width / 2.0, self.height / 2.0)
	}
}

fn on_circle(view: &Viewport, angle: f64) -> (f64, f64) {
	let (cx, cy) = view.center();
	let r = view.link_max_desired_length;
	(cx + r * angle.cos(), cy + r * angle.sin())
}

/// Spaces every node evenly around the viewport centre, in graph order.
pub fn circle_layout(graph: &mut ConceptGraph, view: &Viewport) {
	if graph.is_empty() {
		return;
	}
	let n = graph.len();
	let step = 2.0 * PI / n as f64;
	for (i, (_, node)) in graph.nodes_mut().enumerate() {
		(node.x, node.y) = on_circle(view, i as f64 * step);
	}
}

/// Puts `central` in the middle and the remaining nodes on a circle around it.
pub fn center_layout(graph: &mut ConceptGraph, view: &Viewport, central: Option<&str>) {
	if graph.is_empty() {
		return;
	}
	let n = graph.len();
	let central = central.and_then(|uri| graph.get(uri));
	if central.is_none() {
		warn!("center layout without a central concept in the graph");
	}
	let step = 2.0 * PI / (n - 1).max(1) as f64;
	let mut i = 0;
	for (id, node) in graph.nodes_mut() {
		if Some(id) == central {
			(node.x, node.y) = view.center();
		} else {
			(node.x, node.y) = on_circle(view, i as f64 * step);
			i += 1;
		}
	}
}

/// Runs the tree builder and hands each node, with its ontology's column
/// offset, to `place`.
fn tiled_tree(
	graph: &mut ConceptGraph,
	tree_width: f64,
	tree_height: f64,
	mut place: impl FnMut(f64, f64, f64) -> (f64, f64),
) {
	let ontologies = graph.ontology_acronyms();
	let count = ontologies.len();
	build_tree(graph, tree_width, tree_height, &ontologies);
	for (j, acronym) in ontologies.iter().enumerate() {
		let increment = tree_width / count as f64 * j as f64;
		let ids: Vec<NodeId> = graph.ids_in_ontology(acronym).collect();
		for id in ids {
			if let Some(node) = graph.node_mut(id) {
				(node.x, node.y) = place(node.x, node.y, increment);
			}
		}
	}
}

/// Trees grow downwards; ontologies sit side by side.
pub fn vertical_tree_layout(graph: &mut ConceptGraph, view: &Viewport) {
	let tree_width = view.width.max(0.0);
	let tree_height = (view.height - 300.0).max(0.0);
	tiled_tree(graph, tree_width, tree_height, |x, y, inc| {
		(x + inc, y + TREE_OFFSET)
	});
}

/// Trees grow to the right; ontologies are stacked top to bottom.
pub fn horizontal_tree_layout(graph: &mut ConceptGraph, view: &Viewport) {
	let tree_width = (view.height - 100.0).max(0.0);
	let tree_height = (view.width - 300.0).max(0.0);
	tiled_tree(graph, tree_width, tree_height, |x, y, inc| {
		(y + TREE_OFFSET, x + inc)
	});
}

/// Reads tree breadth as an angle in degrees and depth as a radius around the
/// viewport centre. Each ontology gets its own sector.
pub fn radial_layout(graph: &mut ConceptGraph, view: &Viewport) {
	let (cx, cy) = view.center();
	let tree_height = (view.height / 2.0 - 100.0).max(0.0);
	let ring_offset = RADIAL_RING_STEP * graph.ontology_acronyms().len().saturating_sub(1) as f64;
	tiled_tree(graph, RADIAL_DEGREES, tree_height, |x, y, inc| {
		let radius = y + ring_offset;
		let angle = (x + inc).to_radians();
		(cx + radius * angle.cos(), cy + radius * angle.sin())
	});
}

/// Runs layout strategies against the graph and animates the result. Exactly
/// one strategy owns the positions at a time: every strategy except the
/// force layout stops the simulation first.
pub struct ConceptLayouts {
	force: ForceLayout,
	transition: TransitionDriver,
	central_concept: Option<String>,
}

impl ConceptLayouts {
	pub fn new(config: &LayoutConfig, central_concept: Option<String>) -> Self {
		Self {
			force: ForceLayout::new(config.force.clone()),
			transition: TransitionDriver::new(config.transition.clone()),
			central_concept,
		}
	}

	#[cfg(test)]
	fn force(&self) -> &ForceLayout {
		&self.force
	}

	#[cfg(test)]
	fn transition(&self) -> &TransitionDriver {
		&self.transition
	}

	/// Where every node is drawn at `now`. Once the transition is over the
	/// graph's own positions are what is shown.
	pub fn displayed_positions(&self, graph: &ConceptGraph, now: f64) -> Vec<(f64, f64)> {
		let positions = graph.positions();
		if !self.transition.is_animating(now) {
			return positions;
		}
		self.transition.sample(now, &positions)
	}

	/// Runs `kind`. With `refresh`, the call comes from graph growth rather
	/// than from the user picking a layout.
	pub fn apply(
		&mut self,
		kind: LayoutKind,
		refresh: bool,
		graph: &mut ConceptGraph,
		view: &Viewport,
		now: f64,
	) {
		let from = self.displayed_positions(graph, now);
		if kind != LayoutKind::Force {
			self.force.stop();
		}
		match kind {
			LayoutKind::Force => return self.run_force(refresh, graph, from),
			LayoutKind::Circle => circle_layout(graph, view),
			LayoutKind::Center => center_layout(graph, view, self.central_concept.as_deref()),
			LayoutKind::HorizontalTree => horizontal_tree_layout(graph, view),
			LayoutKind::VerticalTree => vertical_tree_layout(graph, view),
			LayoutKind::Radial => radial_layout(graph, view),
		}
		let duration = self.transition.start(now, refresh, from, graph.positions());
		debug!(
			"{:?} layout over {} nodes, transition {}ms (refresh: {})",
			kind,
			graph.len(),
			duration,
			refresh
		);
	}

	fn run_force(&mut self, refresh: bool, graph: &mut ConceptGraph, from: Vec<(f64, f64)>) {
		if refresh {
			self.force.resume(graph);
			return;
		}
		for (idx, &(x, y)) in from.iter().enumerate() {
			graph.set_position(NodeId(idx), x, y);
		}
		self.transition.settle(from);
		self.force.start(graph);
		debug!("force layout over {} nodes", graph.len());
	}

	/// Advances a running force layout. Returns whether positions changed.
	pub fn tick(&mut self, graph: &mut ConceptGraph, view: &Viewport, dt: f32) -> bool {
		if !self.force.tick(graph, view.center(), dt) {
			return false;
		}
		self.transition.settle(graph.positions());
		true
	}

	/// Drops a node at `(x, y)` immediately, pinning it in the simulation.
	pub fn move_node(&mut self, graph: &mut ConceptGraph, id: NodeId, x: f64, y: f64) {
		graph.set_position(id, x, y);
		self.transition.place(id.index(), (x, y));
		self.force.pin(id, x, y);
	}
}
