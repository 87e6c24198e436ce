use leptos::prelude::*;

use crate::components::concept_graph::{
	ConceptData, ConceptGraphCanvas, ConceptGraphData, LoadOptions, RelationData,
};

const ONTOLOGIES: &[&str] = &["SNOMEDCT", "NCIT", "MESH"];

fn uri(ontology: &str, i: usize) -> String {
	format!("http://purl.example.org/{}/{}", ontology.to_lowercase(), i)
}

/// Sample concept hierarchies: one random tree per ontology, revealed round
/// robin, plus "maps to" links between equally numbered concepts.
fn generate_sample_data(per_ontology: usize) -> ConceptGraphData {
	let mut concepts = Vec::new();
	let mut relations = Vec::new();

	for i in 0..per_ontology {
		for (o, ontology) in ONTOLOGIES.iter().enumerate() {
			concepts.push(ConceptData {
				uri: uri(ontology, i),
				name: format!("{} {}", ontology, i),
				ontology: ontology.to_string(),
			});
			if i > 0 {
				let parent = (rand_simple(i + o * per_ontology) * (i as f64)) as usize;
				relations.push(RelationData {
					source: uri(ontology, parent),
					target: uri(ontology, i),
					relation: "is_a".into(),
				});
			}
		}
		if i % 4 == 0 {
			for pair in ONTOLOGIES.windows(2) {
				relations.push(RelationData {
					source: uri(pair[0], i),
					target: uri(pair[1], i),
					relation: "maps to".into(),
				});
			}
		}
	}

	ConceptGraphData {
		central_concept: concepts.first().map(|c| c.uri.clone()),
		concepts,
		relations,
	}
}

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let graph_data = Signal::derive(move || generate_sample_data(15));
	let load = LoadOptions {
		initial_concepts: ONTOLOGIES.len(),
		interval_ms: 300.0,
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<ConceptGraphCanvas
					data=graph_data
					fullscreen=true
					load=load
				/>
				<div class="graph-overlay">
					<h1>"Concept Layouts"</h1>
					<p class="subtitle">
						"Pick a layout from the menu. Drag nodes to pin them. Scroll to zoom. Drag background to pan."
					</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::layout::{ConceptGraph, ConceptLink, ConceptNode, tree};

	#[test]
	fn sample_data_is_one_tree_per_ontology() {
		let data = generate_sample_data(12);
		let mut graph = ConceptGraph::new();
		for c in &data.concepts {
			graph
				.add_node(ConceptNode::new(&c.uri, &c.name, &c.ontology))
				.unwrap();
		}
		for r in &data.relations {
			graph
				.add_link(ConceptLink::new(&r.source, &r.target, &r.relation))
				.unwrap();
		}
		assert_eq!(graph.ontology_acronyms().len(), ONTOLOGIES.len());
		for ontology in ONTOLOGIES {
			assert_eq!(tree::roots(&graph, ontology), vec![graph.get(&uri(ontology, 0)).unwrap()]);
		}
		assert_eq!(data.central_concept, Some(uri("SNOMEDCT", 0)));
	}
}
