#[derive(Clone, Debug, PartialEq)]
pub struct ConceptData {
	pub uri: String,
	pub name: String,
	pub ontology: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RelationData {
	pub source: String,
	pub target: String,
	pub relation: String,
}

/// A concept graph as delivered by the data source. Concepts are revealed in
/// order, so the central concept should come first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConceptGraphData {
	pub concepts: Vec<ConceptData>,
	pub relations: Vec<RelationData>,
	pub central_concept: Option<String>,
}
