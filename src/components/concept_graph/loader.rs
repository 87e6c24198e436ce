use log::{debug, warn};

use super::types::ConceptGraphData;
use crate::layout::{ConceptGraph, ConceptLink, ConceptNode, GraphError};

/// Feeds a [`ConceptGraphData`] into a [`ConceptGraph`] a few concepts at a
/// time, the way concepts trickle in from a remote service.
pub struct GraphLoader {
	data: ConceptGraphData,
	next_concept: usize,
	pending_relations: Vec<usize>,
	interval_ms: f64,
	last_load: Option<f64>,
}

impl GraphLoader {
	pub fn new(data: ConceptGraphData, interval_ms: f64) -> Self {
		let pending_relations = (0..data.relations.len()).collect();
		Self {
			data,
			next_concept: 0,
			pending_relations,
			interval_ms,
			last_load: None,
		}
	}

	pub fn is_done(&self) -> bool {
		self.next_concept >= self.data.concepts.len()
	}

	/// Adds up to `count` concepts plus every relation whose endpoints are
	/// now both present. A concept starts where its first loaded neighbour
	/// is, or at `seed` when it has none. Returns how many concepts were added.
	pub fn load_batch(
		&mut self,
		graph: &mut ConceptGraph,
		count: usize,
		seed: impl Fn(usize) -> (f64, f64),
	) -> usize {
		let mut added = 0;
		while added < count && !self.is_done() {
			let Some(concept) = self.data.concepts.get(self.next_concept) else {
				break;
			};
			self.next_concept += 1;

			let (x, y) = self.neighbour_position(graph, &concept.uri).unwrap_or_else(|| seed(added));
			let node =
				ConceptNode::new(&concept.uri, &concept.name, &concept.ontology).at(x, y);
			match graph.add_node(node) {
				Ok(_) => added += 1,
				Err(err) => warn!("skipping concept: {}", err),
			}
		}
		self.load_relations(graph);
		if added > 0 {
			debug!("loaded {} concepts, graph has {}", added, graph.len());
		}
		added
	}

	/// Loads one more concept once `interval_ms` has passed since the last
	/// load. Returns whether the graph grew.
	pub fn poll(&mut self, graph: &mut ConceptGraph, now: f64, seed: (f64, f64)) -> bool {
		if self.is_done() {
			return false;
		}
		if let Some(last) = self.last_load {
			if now - last < self.interval_ms {
				return false;
			}
		}
		self.last_load = Some(now);
		self.load_batch(graph, 1, |_| seed) > 0
	}

	fn neighbour_position(&self, graph: &ConceptGraph, uri: &str) -> Option<(f64, f64)> {
		self.data
			.relations
			.iter()
			.filter_map(|r| {
				if r.source == uri {
					graph.get(&r.target)
				} else if r.target == uri {
					graph.get(&r.source)
				} else {
					None
				}
			})
			.find_map(|id| graph.node(id).map(ConceptNode::position))
	}

	fn load_relations(&mut self, graph: &mut ConceptGraph) {
		let done = self.is_done();
		let relations = &self.data.relations;
		self.pending_relations.retain(|&idx| {
			let Some(r) = relations.get(idx) else {
				return false;
			};
			match graph.add_link(ConceptLink::new(&r.source, &r.target, &r.relation)) {
				Ok(()) => false,
				Err(GraphError::DanglingLink { .. }) if !done => true,
				Err(err) => {
					warn!("skipping relation: {}", err);
					false
				}
			}
		});
	}
}
