mod component;
mod loader;
mod menu;
mod render;
mod state;
mod types;

pub use component::ConceptGraphCanvas;
pub use state::LoadOptions;
pub use types::{ConceptData, ConceptGraphData, RelationData};
