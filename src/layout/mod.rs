//! Layout computation for the concept graph: the graph arena, the tree
//! builder, the six strategies and the transition that animates between them.

pub mod force;
pub mod graph;
pub mod strategy;
pub mod tidy;
pub mod transition;
pub mod tree;

pub use force::ForceConfig;
pub use graph::{ConceptGraph, ConceptLink, ConceptNode, GraphError, NodeId};
pub use strategy::{ConceptLayouts, LayoutKind, Viewport};
pub use transition::TransitionConfig;

/// Radius of the circle and center layouts, in pixels.
pub const LINK_MAX_DESIRED_LENGTH: f64 = 200.0;

/// Tunables shared by every layout.
#[derive(Clone, Debug)]
pub struct LayoutConfig {
	pub link_max_desired_length: f64,
	pub transition: TransitionConfig,
	pub force: ForceConfig,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			link_max_desired_length: LINK_MAX_DESIRED_LENGTH,
			transition: TransitionConfig::default(),
			force: ForceConfig::default(),
		}
	}
}
