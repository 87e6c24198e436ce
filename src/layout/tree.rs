//! Per-ontology hierarchy trees for the tree and radial layouts.

use std::collections::HashSet;

use log::debug;

use super::graph::{ConceptGraph, NodeId};
use super::tidy::{OrderedTree, tidy_layout};

/// Nodes of `acronym` that no structural link inside the same ontology
/// points at, in graph order.
pub fn roots(graph: &ConceptGraph, acronym: &str) -> Vec<NodeId> {
	let members: HashSet<NodeId> = graph.ids_in_ontology(acronym).collect();
	let targeted: HashSet<NodeId> = graph
		.resolved_links()
		.filter(|(s, t, link)| link.is_structural() && members.contains(s) && members.contains(t))
		.map(|(_, t, _)| t)
		.collect();
	graph
		.ids_in_ontology(acronym)
		.filter(|id| !targeted.contains(id))
		.collect()
}

/// Targets of the structural links leaving `parent`, in link order.
pub fn children(graph: &ConceptGraph, parent: NodeId) -> Vec<NodeId> {
	let mut out = Vec::new();
	for (s, t, link) in graph.resolved_links() {
		if s == parent && link.is_structural() && !out.contains(&t) {
			out.push(t);
		}
	}
	out
}

fn children_within(graph: &ConceptGraph, parent: NodeId, acronym: &str) -> Vec<NodeId> {
	children(graph, parent)
		.into_iter()
		.filter(|&c| graph.node(c).is_some_and(|n| n.ontology_acronym == acronym))
		.collect()
}

fn depth_of(graph: &ConceptGraph, id: NodeId) -> u32 {
	graph.node(id).map(|n| n.temp_depth).unwrap_or(0)
}

/// Pushes `temp_depth` down from `root` through its ontology. A child's depth
/// is only ever raised to its parent's depth + 1, so the result depends on
/// traversal order rather than being a shortest path. Nodes already on the
/// current path are not re-entered.
pub fn calculate_depth(graph: &mut ConceptGraph, root: NodeId) {
	let Some(acronym) = graph.node(root).map(|n| n.ontology_acronym.clone()) else {
		return;
	};
	let mut path = HashSet::new();
	descend(graph, root, &acronym, &mut path);
}

fn descend(graph: &mut ConceptGraph, parent: NodeId, acronym: &str, path: &mut HashSet<NodeId>) {
	path.insert(parent);
	let depth = depth_of(graph, parent);
	for child in children_within(graph, parent, acronym) {
		if path.contains(&child) {
			debug!("cycle through {:?} in {}, not descending", child, acronym);
			continue;
		}
		let raised = match graph.node_mut(child) {
			Some(node) if node.temp_depth <= depth => {
				node.temp_depth = depth + 1;
				true
			}
			_ => false,
		};
		if raised {
			descend(graph, child, acronym, path);
		}
	}
	path.remove(&parent);
}

/// Tree under construction for one ontology. Slot 0 is the phantom root that
/// sits above the real roots.
struct Forest {
	tree: OrderedTree,
	slots: Vec<Option<NodeId>>,
	claimed: HashSet<NodeId>,
}

impl Forest {
	fn new() -> Self {
		Self {
			tree: OrderedTree::new(),
			slots: vec![None],
			claimed: HashSet::new(),
		}
	}

	fn attach(&mut self, parent: usize, id: NodeId) -> usize {
		let idx = self.tree.add_child(parent);
		self.slots.push(Some(id));
		idx
	}

	/// Grows the given top-level nodes in pre-order. A child is claimed by the
	/// first parent visited whose depth is exactly one less than its own.
	fn grow(&mut self, graph: &ConceptGraph, acronym: &str, tops: &[NodeId]) {
		let mut stack: Vec<(usize, NodeId)> = Vec::new();
		for &top in tops.iter() {
			self.claimed.insert(top);
		}
		let attached: Vec<_> = tops.iter().map(|&top| (self.attach(0, top), top)).collect();
		stack.extend(attached.into_iter().rev());

		while let Some((idx, parent)) = stack.pop() {
			let depth = depth_of(graph, parent);
			let mut claimed_now = Vec::new();
			for child in children_within(graph, parent, acronym) {
				if depth_of(graph, child) == depth + 1 && self.claimed.insert(child) {
					claimed_now.push((self.attach(idx, child), child));
				}
			}
			stack.extend(claimed_now.into_iter().rev());
		}
	}
}

/// Lays out one tree per ontology inside `width / ontologies.len()` by
/// `height` and writes the positions into the nodes. Every node's
/// `temp_depth` is reset first. Callers tile the ontologies afterwards.
///
/// Nodes no root reaches (pure cycles) are hung under the phantom root in
/// graph order so they still get a position.
pub fn build_tree(graph: &mut ConceptGraph, width: f64, height: f64, ontologies: &[String]) {
	if ontologies.is_empty() {
		return;
	}
	let width = width / ontologies.len() as f64;
	for (_, node) in graph.nodes_mut() {
		node.temp_depth = 0;
	}

	for acronym in ontologies {
		let roots = roots(graph, acronym);
		for &root in &roots {
			calculate_depth(graph, root);
		}

		let mut forest = Forest::new();
		forest.grow(graph, acronym, &roots);

		loop {
			let orphan = graph
				.ids_in_ontology(acronym)
				.find(|id| !forest.claimed.contains(id));
			let Some(orphan) = orphan else {
				break;
			};
			debug!("{:?} unreachable from the roots of {}", orphan, acronym);
			calculate_depth(graph, orphan);
			forest.grow(graph, acronym, &[orphan]);
		}

		let positions = tidy_layout(&forest.tree, width, height);
		for (slot, (x, y)) in forest.slots.iter().zip(positions) {
			if let Some(id) = slot {
				graph.set_position(*id, x, y);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::layout::graph::{ConceptLink, ConceptNode, MAPS_TO};

	fn graph(nodes: &[(&str, &str)], links: &[(&str, &str, &str)]) -> ConceptGraph {
		let mut graph = ConceptGraph::new();
		for &(uri, acr) in nodes {
			graph.add_node(ConceptNode::new(uri, uri, acr)).unwrap();
		}
		for &(s, t, rel) in links {
			graph.add_link(ConceptLink::new(s, t, rel)).unwrap();
		}
		graph
	}

	fn id(graph: &ConceptGraph, uri: &str) -> NodeId {
		graph.get(uri).unwrap()
	}

	fn depth(graph: &ConceptGraph, uri: &str) -> u32 {
		graph.node(id(graph, uri)).unwrap().temp_depth
	}

	fn abc() -> Vec<String> {
		vec!["ABC".to_string()]
	}

	#[test]
	fn small_tree_depths_and_children() {
		let mut g = graph(
			&[("root", "ABC"), ("a", "ABC"), ("b", "ABC")],
			&[("root", "a", "is_a"), ("root", "b", "is_a")],
		);
		build_tree(&mut g, 300.0, 200.0, &abc());
		assert_eq!(depth(&g, "root"), 0);
		assert_eq!(depth(&g, "a"), 1);
		assert_eq!(depth(&g, "b"), 1);
		assert_eq!(children(&g, id(&g, "root")), vec![id(&g, "a"), id(&g, "b")]);
	}

	#[test]
	fn maps_to_edges_do_not_affect_roots() {
		let g = graph(
			&[("root", "ABC"), ("a", "ABC"), ("b", "ABC"), ("x", "XYZ"), ("y", "XYZ")],
			&[("root", "a", "is_a"), ("a", "b", "is_a"), ("x", "y", MAPS_TO)],
		);
		assert_eq!(roots(&g, "ABC"), vec![id(&g, "root")]);
		assert_eq!(roots(&g, "XYZ"), vec![id(&g, "x"), id(&g, "y")]);
	}

	#[test]
	fn links_from_other_ontologies_keep_root_status() {
		let g = graph(
			&[("r", "ABC"), ("a", "ABC"), ("q", "XYZ")],
			&[("r", "a", "is_a"), ("q", "r", "is_a")],
		);
		assert_eq!(roots(&g, "ABC"), vec![id(&g, "r")]);
		assert!(!roots(&g, "ABC").contains(&id(&g, "a")));
	}

	#[test]
	fn depth_grows_along_every_structural_edge() {
		let mut g = graph(
			&[("r", "ABC"), ("a", "ABC"), ("b", "ABC"), ("c", "ABC"), ("d", "ABC")],
			&[
				("r", "a", "is_a"),
				("r", "c", "is_a"),
				("a", "b", "is_a"),
				("b", "c", "is_a"),
				("c", "d", "is_a"),
				("d", "a", MAPS_TO),
			],
		);
		build_tree(&mut g, 100.0, 100.0, &abc());
		for (s, t, link) in g.resolved_links() {
			if link.is_structural() {
				let (ps, pt) = (g.node(s).unwrap(), g.node(t).unwrap());
				assert!(pt.temp_depth >= ps.temp_depth + 1, "{} -> {}", ps.name, pt.name);
			}
		}
		assert_eq!(depth(&g, "c"), 3);
		assert_eq!(depth(&g, "d"), 4);
	}

	#[test]
	fn stale_depths_are_reset_before_each_build() {
		let mut g = graph(&[("r", "ABC"), ("a", "ABC")], &[("r", "a", "is_a")]);
		let a = id(&g, "a");
		g.node_mut(a).unwrap().temp_depth = 9;
		build_tree(&mut g, 100.0, 100.0, &abc());
		assert_eq!(depth(&g, "a"), 1);
	}

	#[test]
	fn first_parent_in_preorder_claims_shared_child() {
		// c is reachable from both a and b at the same depth.
		let mut g = graph(
			&[("r", "ABC"), ("a", "ABC"), ("b", "ABC"), ("c", "ABC")],
			&[("r", "a", "is_a"), ("r", "b", "is_a"), ("a", "c", "is_a"), ("b", "c", "is_a")],
		);
		build_tree(&mut g, 400.0, 300.0, &abc());
		let (a, b, c) = (
			g.node(id(&g, "a")).unwrap(),
			g.node(id(&g, "b")).unwrap(),
			g.node(id(&g, "c")).unwrap(),
		);
		assert!((c.x - a.x).abs() < 1e-9);
		assert!((c.x - b.x).abs() > 1.0);
		assert!(c.y > a.y);
	}

	#[test]
	fn cycles_terminate() {
		let mut g = graph(
			&[("r", "ABC"), ("a", "ABC"), ("b", "ABC")],
			&[("r", "a", "is_a"), ("a", "b", "is_a"), ("b", "a", "is_a")],
		);
		build_tree(&mut g, 100.0, 100.0, &abc());
		assert_eq!(depth(&g, "r"), 0);
		assert_eq!(depth(&g, "a"), 1);
		assert_eq!(depth(&g, "b"), 2);
	}

	#[test]
	fn rootless_cycle_still_gets_placed() {
		let mut g = graph(
			&[("a", "ABC"), ("b", "ABC")],
			&[("a", "b", "is_a"), ("b", "a", "is_a")],
		);
		for (_, node) in g.nodes_mut() {
			node.x = -1.0;
			node.y = -1.0;
		}
		assert!(roots(&g, "ABC").is_empty());
		build_tree(&mut g, 100.0, 100.0, &abc());
		let (a, b) = (g.node(id(&g, "a")).unwrap(), g.node(id(&g, "b")).unwrap());
		assert!(a.x >= 0.0 && b.x >= 0.0);
		assert!(b.y > a.y);
	}

	#[test]
	fn ontologies_share_the_width() {
		let mut g = graph(&[("r", "ABC"), ("q", "XYZ")], &[]);
		build_tree(&mut g, 400.0, 100.0, &["ABC".to_string(), "XYZ".to_string()]);
		// Each ontology gets a 200 wide band; a lone root sits in its middle.
		assert!((g.node(id(&g, "r")).unwrap().x - 100.0).abs() < 1e-9);
		assert!((g.node(id(&g, "q")).unwrap().x - 100.0).abs() < 1e-9);
	}
}
