//! Concept graph arena shared by the layouts and the renderer.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

/// Relation tag for cross-ontology equivalences.
pub const MAPS_TO: &str = "maps to";

/// Stable handle of a node inside a [`ConceptGraph`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
	/// Position of the node in insertion order.
	pub fn index(self) -> usize {
		self.0
	}
}

/// A concept and its current layout position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConceptNode {
	pub raw_concept_uri: String,
	pub name: String,
	pub ontology_acronym: String,
	pub x: f64,
	pub y: f64,
	/// Scratch depth written by the tree builder.
	pub temp_depth: u32,
}

impl ConceptNode {
	/// Creates a node at the origin.
	pub fn new(
		raw_concept_uri: impl Into<String>,
		name: impl Into<String>,
		ontology_acronym: impl Into<String>,
	) -> Self {
		Self {
			raw_concept_uri: raw_concept_uri.into(),
			name: name.into(),
			ontology_acronym: ontology_acronym.into(),
			..Default::default()
		}
	}

	/// Same node, placed at `(x, y)`.
	pub fn at(mut self, x: f64, y: f64) -> Self {
		self.x = x;
		self.y = y;
		self
	}

	pub fn position(&self) -> (f64, f64) {
		(self.x, self.y)
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConceptLink {
	pub source_id: String,
	pub target_id: String,
	pub relation_type: String,
}

impl ConceptLink {
	pub fn new(
		source_id: impl Into<String>,
		target_id: impl Into<String>,
		relation_type: impl Into<String>,
	) -> Self {
		Self {
			source_id: source_id.into(),
			target_id: target_id.into(),
			relation_type: relation_type.into(),
		}
	}

	/// Whether the link takes part in parent/child computations.
	pub fn is_structural(&self) -> bool {
		self.relation_type != MAPS_TO
	}
}

/// Rejected graph mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
	#[error("concept has an empty uri")]
	EmptyUri,
	#[error("duplicate concept: {0}")]
	DuplicateNode(String),
	#[error("link {source_id} -> {target_id} references an unknown concept: {missing}")]
	DanglingLink {
		source_id: String,
		target_id: String,
		missing: String,
	},
	#[error("duplicate link {source_id} -[{relation_type}]-> {target_id}")]
	DuplicateLink {
		source_id: String,
		target_id: String,
		relation_type: String,
	},
}

/// Nodes in insertion order plus the links between them.
///
/// Layouts never add or remove nodes; they only write `x`, `y` and
/// `temp_depth`. Every order-dependent rule iterates in insertion order.
#[derive(Clone, Debug, Default)]
pub struct ConceptGraph {
	nodes: Vec<ConceptNode>,
	links: Vec<ConceptLink>,
	by_uri: HashMap<String, NodeId>,
	link_keys: HashSet<(NodeId, NodeId, String)>,
}

impl ConceptGraph {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_node(&mut self, node: ConceptNode) -> Result<NodeId, GraphError> {
		if node.raw_concept_uri.is_empty() {
			return Err(GraphError::EmptyUri);
		}
		if self.by_uri.contains_key(&node.raw_concept_uri) {
			return Err(GraphError::DuplicateNode(node.raw_concept_uri));
		}
		let id = NodeId(self.nodes.len());
		self.by_uri.insert(node.raw_concept_uri.clone(), id);
		self.nodes.push(node);
		Ok(id)
	}

	pub fn add_link(&mut self, link: ConceptLink) -> Result<(), GraphError> {
		let (source, target) = match (self.get(&link.source_id), self.get(&link.target_id)) {
			(Some(s), Some(t)) => (s, t),
			(None, _) => {
				return Err(GraphError::DanglingLink {
					missing: link.source_id.clone(),
					source_id: link.source_id,
					target_id: link.target_id,
				});
			}
			(_, None) => {
				return Err(GraphError::DanglingLink {
					missing: link.target_id.clone(),
					source_id: link.source_id,
					target_id: link.target_id,
				});
			}
		};
		if !self
			.link_keys
			.insert((source, target, link.relation_type.clone()))
		{
			return Err(GraphError::DuplicateLink {
				source_id: link.source_id,
				target_id: link.target_id,
				relation_type: link.relation_type,
			});
		}
		self.links.push(link);
		Ok(())
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Looks up a node handle by its concept uri.
	pub fn get(&self, uri: &str) -> Option<NodeId> {
		self.by_uri.get(uri).copied()
	}

	pub fn node(&self, id: NodeId) -> Option<&ConceptNode> {
		self.nodes.get(id.0)
	}

	pub fn node_mut(&mut self, id: NodeId) -> Option<&mut ConceptNode> {
		self.nodes.get_mut(id.0)
	}

	pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &ConceptNode)> {
		self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
	}

	pub fn nodes_mut(&mut self) -> impl Iterator<Item = (NodeId, &mut ConceptNode)> {
		self.nodes.iter_mut().enumerate().map(|(i, n)| (NodeId(i), n))
	}

	pub fn links(&self) -> &[ConceptLink] {
		&self.links
	}

	/// Links resolved to node handles, in insertion order.
	pub fn resolved_links(&self) -> impl Iterator<Item = (NodeId, NodeId, &ConceptLink)> {
		self.links.iter().filter_map(|link| {
			match (self.get(&link.source_id), self.get(&link.target_id)) {
				(Some(s), Some(t)) => Some((s, t, link)),
				_ => None,
			}
		})
	}

	/// Distinct ontology acronyms in first-seen order.
	pub fn ontology_acronyms(&self) -> Vec<String> {
		let mut seen = HashSet::new();
		self.nodes
			.iter()
			.filter(|n| seen.insert(n.ontology_acronym.as_str()))
			.map(|n| n.ontology_acronym.clone())
			.collect()
	}

	pub fn ids_in_ontology<'a>(&'a self, acronym: &'a str) -> impl Iterator<Item = NodeId> + 'a {
		self.nodes()
			.filter(move |(_, n)| n.ontology_acronym == acronym)
			.map(|(id, _)| id)
	}

	pub fn set_position(&mut self, id: NodeId, x: f64, y: f64) {
		if let Some(node) = self.nodes.get_mut(id.0) {
			node.x = x;
			node.y = y;
		}
	}

	pub fn positions(&self) -> Vec<(f64, f64)> {
		self.nodes.iter().map(ConceptNode::position).collect()
	}

	/// Nodes connected to `id` by any link, either direction.
	pub fn neighbors(&self, id: NodeId) -> HashSet<NodeId> {
		self.resolved_links()
			.filter_map(|(s, t, _)| {
				if s == id {
					Some(t)
				} else if t == id {
					Some(s)
				} else {
					None
				}
			})
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample() -> ConceptGraph {
		let mut graph = ConceptGraph::new();
		for (uri, acr) in [("a", "ABC"), ("b", "ABC"), ("x", "XYZ"), ("c", "ABC")] {
			graph.add_node(ConceptNode::new(uri, uri, acr)).unwrap();
		}
		graph.add_link(ConceptLink::new("a", "b", "is_a")).unwrap();
		graph.add_link(ConceptLink::new("b", "x", MAPS_TO)).unwrap();
		graph
	}

	#[test]
	fn rejects_duplicate_and_empty_nodes() {
		let mut graph = sample();
		assert_eq!(
			graph.add_node(ConceptNode::new("a", "again", "ABC")),
			Err(GraphError::DuplicateNode("a".into()))
		);
		assert_eq!(
			graph.add_node(ConceptNode::new("", "blank", "ABC")),
			Err(GraphError::EmptyUri)
		);
		assert_eq!(graph.len(), 4);
	}

	#[test]
	fn rejects_dangling_and_duplicate_links() {
		let mut graph = sample();
		let err = graph
			.add_link(ConceptLink::new("a", "missing", "is_a"))
			.unwrap_err();
		assert!(matches!(err, GraphError::DanglingLink { ref missing, .. } if missing == "missing"));
		assert!(matches!(
			graph.add_link(ConceptLink::new("a", "b", "is_a")),
			Err(GraphError::DuplicateLink { .. })
		));
		// Same endpoints, different relation.
		graph.add_link(ConceptLink::new("a", "b", MAPS_TO)).unwrap();
		assert_eq!(graph.links().len(), 3);
	}

	#[test]
	fn acronyms_keep_first_seen_order() {
		let graph = sample();
		assert_eq!(graph.ontology_acronyms(), vec!["ABC", "XYZ"]);
		let abc: Vec<_> = graph.ids_in_ontology("ABC").collect();
		assert_eq!(abc, vec![NodeId(0), NodeId(1), NodeId(3)]);
	}

	#[test]
	fn neighbors_follow_links_both_ways() {
		let graph = sample();
		let b = graph.get("b").unwrap();
		let expected: HashSet<_> = [graph.get("a").unwrap(), graph.get("x").unwrap()].into();
		assert_eq!(graph.neighbors(b), expected);
		assert!(!ConceptLink::new("b", "x", MAPS_TO).is_structural());
	}
}
