//! Scene that grown branches are instantiated into

pub mod flatten;
pub mod graph;
pub mod growth_scene;
pub mod node;

pub use flatten::FlatBranchEntry;
pub use graph::SceneGraph;
pub use growth_scene::GrowthScene;
pub use node::{LocalTransform, NodeContent, SceneNode, SceneNodeId};
