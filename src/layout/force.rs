use std::collections::HashMap;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;

use super::graph::{ConceptGraph, NodeId};

/// Tunables for the force-directed layout.
#[derive(Clone, Debug)]
pub struct ForceConfig {
	pub force_charge: f32,
	pub force_spring: f32,
	pub force_max: f32,
	pub node_speed: f32,
	pub damping_factor: f32,
	pub mass: f32,
	/// Pull toward the viewport centre, scaled by the current alpha.
	pub gravity: f64,
	pub alpha_start: f64,
	pub alpha_decay: f64,
	pub alpha_min: f64,
}

impl Default for ForceConfig {
	fn default() -> Self {
		Self {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
			mass: 10.0,
			gravity: 0.05,
			alpha_start: 0.1,
			alpha_decay: 0.99,
			alpha_min: 0.005,
		}
	}
}

impl ForceConfig {
	fn parameters(&self) -> SimulationParameters {
		SimulationParameters {
			force_charge: self.force_charge,
			force_spring: self.force_spring,
			force_max: self.force_max,
			node_speed: self.node_speed,
			damping_factor: self.damping_factor,
		}
	}
}

struct Simulation {
	graph: ForceGraph<NodeId, ()>,
	indices: HashMap<NodeId, DefaultNodeIdx>,
	synced_links: usize,
}

impl Simulation {
	fn new(params: SimulationParameters) -> Self {
		Self {
			graph: ForceGraph::new(params),
			indices: HashMap::new(),
			synced_links: 0,
		}
	}

	/// Adds nodes and links the simulation has not seen yet. Both only ever
	/// grow, so the links past `synced_links` are the new ones.
	fn sync(&mut self, graph: &ConceptGraph, mass: f32) {
		for (id, node) in graph.nodes() {
			if self.indices.contains_key(&id) {
				continue;
			}
			let idx = self.graph.add_node(NodeData {
				x: node.x as f32,
				y: node.y as f32,
				mass,
				is_anchor: false,
				user_data: id,
			});
			self.indices.insert(id, idx);
		}

		for (source, target, _) in graph.resolved_links().skip(self.synced_links) {
			if source == target {
				continue;
			}
			if let (Some(&src), Some(&tgt)) = (self.indices.get(&source), self.indices.get(&target))
			{
				self.graph.add_edge(src, tgt, EdgeData::default());
			}
		}
		self.synced_links = graph.links().len();
	}
}

/// Force-directed layout on top of [`ForceGraph`], with a cooling alpha so a
/// run settles and can be reheated.
pub struct ForceLayout {
	config: ForceConfig,
	sim: Option<Simulation>,
	alpha: f64,
}

impl ForceLayout {
	pub fn new(config: ForceConfig) -> Self {
		Self {
			config,
			sim: None,
			alpha: 0.0,
		}
	}

	/// Rebuilds the simulation from the current node positions and heats it.
	pub fn start(&mut self, graph: &ConceptGraph) {
		let mut sim = Simulation::new(self.config.parameters());
		sim.sync(graph, self.config.mass);
		debug!("force layout started with {} nodes", sim.indices.len());
		self.sim = Some(sim);
		self.alpha = self.config.alpha_start;
	}

	/// Reheats the running simulation, picking up nodes and links added since
	/// the last start.
	pub fn resume(&mut self, graph: &ConceptGraph) {
		match self.sim.as_mut() {
			Some(sim) => {
				sim.sync(graph, self.config.mass);
				self.alpha = self.alpha.max(self.config.alpha_start);
			}
			None => self.start(graph),
		}
	}

	pub fn stop(&mut self) {
		self.alpha = 0.0;
	}

	pub fn is_running(&self) -> bool {
		self.sim.is_some() && self.alpha >= self.config.alpha_min
	}

	#[cfg(test)]
	fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Advances the simulation one step and copies the positions into
	/// `graph`. Returns false when there was nothing to do.
	pub fn tick(&mut self, graph: &mut ConceptGraph, center: (f64, f64), dt: f32) -> bool {
		if !self.is_running() {
			return false;
		}
		let Some(sim) = self.sim.as_mut() else {
			return false;
		};

		sim.graph.update(dt);
		let k = (self.alpha * self.config.gravity) as f32;
		let (cx, cy) = (center.0 as f32, center.1 as f32);
		sim.graph.visit_nodes_mut(|node| {
			if !node.data.is_anchor {
				node.data.x += (cx - node.data.x) * k;
				node.data.y += (cy - node.data.y) * k;
			}
		});
		sim.graph.visit_nodes(|node| {
			graph.set_position(node.data.user_data, node.x() as f64, node.y() as f64);
		});

		self.alpha *= self.config.alpha_decay;
		if self.alpha < self.config.alpha_min {
			self.alpha = 0.0;
			debug!("force layout settled");
		}
		true
	}

	/// Moves a node and anchors it so the simulation leaves it in place.
	pub fn pin(&mut self, id: NodeId, x: f64, y: f64) {
		let Some(sim) = self.sim.as_mut() else {
			return;
		};
		let Some(&idx) = sim.indices.get(&id) else {
			return;
		};
		sim.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.x = x as f32;
				node.data.y = y as f32;
				node.data.is_anchor = true;
			}
		});
	}

	#[cfg(test)]
	fn sim_position(&self, id: NodeId) -> Option<(f32, f32)> {
		let sim = self.sim.as_ref()?;
		let idx = *sim.indices.get(&id)?;
		let mut found = None;
		sim.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some((node.x(), node.y()));
			}
		});
		found
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::layout::graph::{ConceptLink, ConceptNode};

	fn chain(n: usize) -> ConceptGraph {
		let mut graph = ConceptGraph::new();
		for i in 0..n {
			let node = ConceptNode::new(format!("c{i}"), format!("C{i}"), "ABC")
				.at(100.0 + 20.0 * i as f64, 100.0 + 10.0 * i as f64);
			graph.add_node(node).unwrap();
		}
		for i in 1..n {
			graph
				.add_link(ConceptLink::new(format!("c{}", i - 1), format!("c{i}"), "is_a"))
				.unwrap();
		}
		graph
	}

	#[test]
	fn stopped_layout_does_not_move_nodes() {
		let mut graph = chain(3);
		let before = graph.positions();
		let mut force = ForceLayout::new(ForceConfig::default());
		force.start(&graph);
		force.stop();
		assert!(!force.is_running());
		assert!(!force.tick(&mut graph, (200.0, 200.0), 0.016));
		assert_eq!(graph.positions(), before);
	}

	#[test]
	fn tick_cools_and_writes_back() {
		let mut graph = chain(3);
		let mut force = ForceLayout::new(ForceConfig::default());
		force.start(&graph);
		assert!(force.tick(&mut graph, (200.0, 200.0), 0.016));
		assert!(force.alpha() < 0.1);
		for (id, node) in graph.nodes() {
			let (x, y) = force.sim_position(id).unwrap();
			assert_eq!((node.x, node.y), (x as f64, y as f64));
		}
	}

	#[test]
	fn alpha_runs_out() {
		let mut graph = chain(2);
		let mut force = ForceLayout::new(ForceConfig::default());
		force.start(&graph);
		let mut ticks = 0;
		while force.tick(&mut graph, (0.0, 0.0), 0.016) {
			ticks += 1;
			assert!(ticks < 1000);
		}
		// 0.1 * 0.99^n < 0.005 first holds at n = 299.
		assert_eq!(ticks, 299);
	}

	#[test]
	fn resume_keeps_simulated_positions_and_adds_new_nodes() {
		let mut graph = chain(2);
		let mut force = ForceLayout::new(ForceConfig::default());
		force.start(&graph);
		let first = graph.get("c0").unwrap();
		let simulated = force.sim_position(first).unwrap();

		graph.set_position(first, 999.0, 999.0);
		graph
			.add_node(ConceptNode::new("c2", "C2", "ABC").at(5.0, 6.0))
			.unwrap();
		graph.add_link(ConceptLink::new("c1", "c2", "is_a")).unwrap();
		force.stop();
		force.resume(&graph);

		assert!(force.is_running());
		assert_eq!(force.sim_position(first), Some(simulated));
		assert_eq!(force.sim_position(graph.get("c2").unwrap()), Some((5.0, 6.0)));

		force.start(&graph);
		assert_eq!(force.sim_position(first), Some((999.0, 999.0)));
	}

	#[test]
	fn pinned_node_stays_put() {
		let mut graph = chain(3);
		let mut force = ForceLayout::new(ForceConfig::default());
		force.start(&graph);
		let pinned = graph.get("c1").unwrap();
		force.pin(pinned, 42.0, 24.0);
		force.tick(&mut graph, (200.0, 200.0), 0.016);
		assert_eq!(graph.node(pinned).unwrap().position(), (42.0, 24.0));
	}
}
