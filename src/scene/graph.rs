//! Scene graph: CPU-side hierarchy of nodes.
//!
//! Branches hang under their parent branch, so removing a branch removes
//! everything grown from it. `flatten()` propagates transforms and lists
//! every branch with its world pose.

use std::collections::HashMap;

use glam::Mat4;

use crate::math::Pose;
use crate::world::LayerId;

use super::flatten::FlatBranchEntry;
use super::node::{LocalTransform, NodeContent, SceneNode, SceneNodeId};

/// CPU-side scene graph of obstacles and grown branches.
pub struct SceneGraph {
    nodes: HashMap<SceneNodeId, SceneNode>,
    root: SceneNodeId,
    next_id: u64,
    dirty: bool,
}

impl SceneGraph {
    /// Create a new scene graph with a root Group node.
    pub fn new() -> Self {
        let root_id = SceneNodeId(0);
        let root_node = SceneNode::new(root_id, "root", LayerId::DEFAULT, NodeContent::Group);

        let mut nodes = HashMap::new();
        nodes.insert(root_id, root_node);

        Self {
            nodes,
            root: root_id,
            next_id: 1,
            dirty: true,
        }
    }

    /// Get the root node ID.
    pub fn root(&self) -> SceneNodeId {
        self.root
    }

    /// Allocate a fresh node ID.
    fn alloc_id(&mut self) -> SceneNodeId {
        let id = SceneNodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a child node under `parent`. Returns the new node's ID.
    pub fn add_child(
        &mut self,
        parent: SceneNodeId,
        name: impl Into<String>,
        layer: LayerId,
        content: NodeContent,
    ) -> SceneNodeId {
        let id = self.alloc_id();
        let mut node = SceneNode::new(id, name, layer, content);
        node.parent = Some(parent);

        self.nodes.insert(id, node);

        // Register as child of parent
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.push(id);
        }

        self.dirty = true;
        id
    }

    /// Remove a node and its entire subtree. Cannot remove the root.
    ///
    /// Returns the removed IDs, the node itself first.
    pub fn remove(&mut self, id: SceneNodeId) -> Vec<SceneNodeId> {
        if id == self.root || !self.nodes.contains_key(&id) {
            return Vec::new();
        }

        // Collect subtree IDs (BFS)
        let mut to_remove = vec![id];
        let mut i = 0;
        while i < to_remove.len() {
            let current = to_remove[i];
            if let Some(node) = self.nodes.get(&current) {
                to_remove.extend_from_slice(&node.children);
            }
            i += 1;
        }

        // Detach from parent
        if let Some(parent_id) = self.nodes.get(&id).and_then(|n| n.parent) {
            if let Some(parent) = self.nodes.get_mut(&parent_id) {
                parent.children.retain(|c| *c != id);
            }
        }

        // Remove all nodes in subtree
        for nid in &to_remove {
            self.nodes.remove(nid);
        }

        self.dirty = true;
        to_remove
    }

    /// Set the local transform of a node.
    pub fn set_transform(&mut self, id: SceneNodeId, transform: LocalTransform) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.local_transform = transform;
            self.dirty = true;
        }
    }

    /// Get an immutable reference to a node.
    pub fn get(&self, id: SceneNodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: SceneNodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Iterate over the children of a node.
    pub fn children(&self, id: SceneNodeId) -> impl Iterator<Item = SceneNodeId> + '_ {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .copied()
    }

    /// Every node, in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = &SceneNode> + '_ {
        self.nodes.values()
    }

    /// Total number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Walk the tree, propagate transforms, and collect every branch.
    pub fn flatten(&mut self) -> Vec<FlatBranchEntry> {
        self.propagate();

        let mut out = Vec::new();
        self.collect_branches(self.root, &mut out);
        out
    }

    /// Recompute cached world transforms if anything changed.
    fn propagate(&mut self) {
        if self.dirty {
            self.propagate_transforms(self.root, Mat4::IDENTITY);
            self.dirty = false;
        }
    }

    /// Recursively propagate world transforms.
    fn propagate_transforms(&mut self, node_id: SceneNodeId, parent_world: Mat4) {
        // Compute this node's world transform
        let (local_mat, children) = {
            let node = match self.nodes.get(&node_id) {
                Some(n) => n,
                None => return,
            };
            (node.local_transform.to_mat4(), node.children.clone())
        };

        let world = parent_world * local_mat;

        if let Some(node) = self.nodes.get_mut(&node_id) {
            node.world_transform = world;
        }

        for child_id in children {
            self.propagate_transforms(child_id, world);
        }
    }

    /// Recursively collect branch entries.
    fn collect_branches(&self, node_id: SceneNodeId, out: &mut Vec<FlatBranchEntry>) {
        let node = match self.nodes.get(&node_id) {
            Some(n) => n,
            None => return,
        };

        if let NodeContent::Branch {
            plant,
            template,
            depth,
            mesh_variant,
        } = &node.content
        {
            let (_, rotation, position) = node.world_transform.to_scale_rotation_translation();
            out.push(FlatBranchEntry {
                node: node_id,
                plant: *plant,
                template: *template,
                depth: *depth,
                world: Pose::new(position, rotation),
                mesh_variant: mesh_variant.clone(),
                layer_id: node.layer,
            });
        }

        // Recurse into children
        for &child_id in &node.children {
            self.collect_branches(child_id, out);
        }
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TemplateId;
    use crate::world::PlantId;
    use glam::{Quat, Vec3};

    fn branch(depth: u32) -> NodeContent {
        NodeContent::Branch {
            plant: PlantId(1),
            template: TemplateId(0),
            depth,
            mesh_variant: None,
        }
    }

    #[test]
    fn test_new_scene_graph() {
        let graph = SceneGraph::new();
        assert_eq!(graph.node_count(), 1); // root only
        assert!(graph.get(graph.root()).is_some());
        assert_eq!(graph.get(graph.root()).unwrap().name, "root");
    }

    #[test]
    fn test_add_multiple_children() {
        let mut graph = SceneGraph::new();
        let root = graph.root();

        let a = graph.add_child(root, "a", LayerId::DEFAULT, NodeContent::Group);
        let b = graph.add_child(root, "b", LayerId::VEGETATION, NodeContent::Group);
        let c = graph.add_child(a, "c", LayerId::DEFAULT, NodeContent::Group);

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.get(c).unwrap().parent, Some(a));
        assert_eq!(graph.children(root).count(), 2);
        assert!(graph.children(a).any(|x| x == c));
        assert_eq!(graph.children(b).count(), 0);
    }

    #[test]
    fn test_remove_subtree() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let parent = graph.add_child(root, "parent", LayerId::DEFAULT, NodeContent::Group);
        let child1 = graph.add_child(parent, "c1", LayerId::DEFAULT, NodeContent::Group);
        let child2 = graph.add_child(parent, "c2", LayerId::DEFAULT, NodeContent::Group);
        let grandchild = graph.add_child(child1, "gc", LayerId::DEFAULT, NodeContent::Group);

        assert_eq!(graph.node_count(), 5);

        let removed = graph.remove(parent);

        assert_eq!(removed, vec![parent, child1, child2, grandchild]);
        assert_eq!(graph.node_count(), 1); // only root
        assert!(graph.get(child2).is_none());
        assert_eq!(graph.children(root).count(), 0);
        assert!(graph.remove(parent).is_empty());
    }

    #[test]
    fn test_cannot_remove_root() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        assert!(graph.remove(root).is_empty());
        assert_eq!(graph.node_count(), 1); // root survives
    }

    #[test]
    fn test_flatten_empty_graph() {
        let mut graph = SceneGraph::new();
        graph.add_child(graph.root(), "group", LayerId::DEFAULT, NodeContent::Group);
        assert!(graph.flatten().is_empty());
    }

    #[test]
    fn test_flatten_transform_propagation() {
        let mut graph = SceneGraph::new();
        let root = graph.root();

        // Parent at (10, 0, 0), turned so its +Z faces world +X
        let parent = graph.add_child(root, "trunk", LayerId::VEGETATION, branch(0));
        graph.set_transform(
            parent,
            LocalTransform {
                position: Vec3::new(10.0, 0.0, 0.0),
                rotation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            },
        );

        // Child one unit along the parent's +Z ends up at world (11, 0, 0)
        let child = graph.add_child(parent, "twig", LayerId::VEGETATION, branch(1));
        graph.set_transform(child, LocalTransform::from_position(Vec3::new(0.0, 0.0, 1.0)));

        let entries = graph.flatten();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].node, child);
        assert_eq!(entries[1].depth, 1);
        assert!((entries[1].world.position - Vec3::new(11.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_flatten_skips_non_branches() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let group = graph.add_child(root, "bed", LayerId::DEFAULT, NodeContent::Group);
        graph.add_child(group, "trunk", LayerId::VEGETATION, branch(0));
        graph.add_child(root, "reed", LayerId::WATER, branch(0));

        let mut layers: Vec<_> = graph.flatten().iter().map(|e| e.layer_id).collect();
        layers.sort();
        assert_eq!(layers, vec![LayerId::VEGETATION, LayerId::WATER]);
    }
}
