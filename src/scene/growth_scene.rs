//! Scene that plants grow into
//!
//! Pairs a [`SceneGraph`] with a [`CollisionWorld`]. Branches become nodes
//! under their parent branch and carry a capsule collider on their
//! template's layer, owned by the branch entity and its plant.

use std::collections::HashMap;

use glam::Vec3;

use crate::growth::{BranchInstantiator, SpawnRequest};
use crate::math::{Aabb, Capsule};
use crate::world::{
    Collider, ColliderHandle, ColliderHit, ColliderOwner, ColliderShape, CollisionWorld, EntityId,
    LayerId, LayerMask, PlantId, SweepHit, WorldQuery,
};

use super::flatten::FlatBranchEntry;
use super::graph::SceneGraph;
use super::node::{LocalTransform, NodeContent, SceneNodeId};

#[derive(Default)]
pub struct GrowthScene {
    graph: SceneGraph,
    collision: CollisionWorld,
    /// Branch colliders by node, for stripping and despawning
    branch_colliders: HashMap<SceneNodeId, ColliderHandle>,
}

impl GrowthScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flat ground slab with its top face at `height`.
    pub fn with_ground(mut self, half_extent: f32, height: f32) -> Self {
        self.add_obstacle(
            "ground",
            ColliderShape::Box(Aabb::new(
                Vec3::new(-half_extent, height - 1.0, -half_extent),
                Vec3::new(half_extent, height, half_extent),
            )),
            LayerId::DEFAULT,
        );
        self
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn collision(&self) -> &CollisionWorld {
        &self.collision
    }

    /// Add static geometry as a node with a collider.
    pub fn add_obstacle(
        &mut self,
        name: impl Into<String>,
        shape: ColliderShape,
        layer: LayerId,
    ) -> SceneNodeId {
        let center = shape.bounds().center();
        let collider = self.collision.insert(Collider::new(shape, layer));
        let root = self.graph.root();
        let node = self
            .graph
            .add_child(root, name, layer, NodeContent::Obstacle { collider });
        self.graph
            .set_transform(node, LocalTransform::from_position(center));
        node
    }

    pub fn add_box(&mut self, name: impl Into<String>, aabb: Aabb, layer: LayerId) -> SceneNodeId {
        self.add_obstacle(name, ColliderShape::Box(aabb), layer)
    }

    pub fn add_sphere(
        &mut self,
        name: impl Into<String>,
        center: Vec3,
        radius: f32,
        layer: LayerId,
    ) -> SceneNodeId {
        self.add_obstacle(name, ColliderShape::Sphere { center, radius }, layer)
    }

    /// Remove an obstacle or branch subtree with all its colliders.
    pub fn remove(&mut self, node: SceneNodeId) {
        if let Some(NodeContent::Obstacle { collider }) = self.graph.get(node).map(|n| &n.content) {
            self.collision.remove(*collider);
        }
        let removed = self.graph.remove(node);
        let mut entities = Vec::with_capacity(removed.len());
        for id in removed {
            self.branch_colliders.remove(&id);
            entities.push(id.entity());
        }
        self.collision.remove_owned_by_entities(&entities);
    }

    /// Branch nodes of `plant`.
    pub fn branch_count(&self, plant: PlantId) -> usize {
        self.graph
            .nodes()
            .filter(|n| matches!(n.content, NodeContent::Branch { plant: p, .. } if p == plant))
            .count()
    }

    /// Propagate transforms and list every branch.
    pub fn flatten(&mut self) -> Vec<FlatBranchEntry> {
        self.graph.flatten()
    }

    /// Collider of a branch entity, if it still has one.
    pub fn branch_collider(&self, entity: EntityId) -> Option<&Collider> {
        self.branch_colliders
            .get(&SceneNodeId::from_entity(entity))
            .and_then(|h| self.collision.get(*h))
    }
}

impl BranchInstantiator for GrowthScene {
    fn instantiate(&mut self, request: &SpawnRequest<'_>) -> EntityId {
        // Non-root branches hang under their parent with a parent-relative
        // transform. The root sits under the scene root at its world pose.
        let parent = request
            .parent
            .map(SceneNodeId::from_entity)
            .filter(|p| self.graph.contains(*p));
        let (parent_node, transform) = match parent {
            Some(p) => (p, LocalTransform::from_pose(&request.local)),
            None => (self.graph.root(), LocalTransform::from_pose(&request.world)),
        };

        let node = self.graph.add_child(
            parent_node,
            request.template_name,
            request.layer,
            NodeContent::Branch {
                plant: request.plant,
                template: request.template,
                depth: request.depth,
                mesh_variant: request.mesh_variant.map(str::to_owned),
            },
        );
        self.graph.set_transform(node, transform);

        let entity = node.entity();
        let collider = self.collision.insert(
            Collider::new(ColliderShape::Capsule(request.collider), request.layer).owned_by(
                ColliderOwner {
                    plant: request.plant,
                    entity,
                },
            ),
        );
        self.branch_colliders.insert(node, collider);
        entity
    }

    fn despawn(&mut self, entity: EntityId) {
        let node = SceneNodeId::from_entity(entity);
        if self.graph.get(node).is_some_and(|n| n.is_branch()) {
            self.remove(node);
        }
    }

    fn strip_colliders(&mut self, plant: PlantId) {
        let removed = self.collision.remove_owned_by_plant(plant);
        self.branch_colliders
            .retain(|_, handle| self.collision.get(*handle).is_some());
        log::debug!("Stripped {} colliders of plant {}", removed, plant.0);
    }
}

impl WorldQuery for GrowthScene {
    fn overlap_capsule(&self, capsule: &Capsule, mask: LayerMask, hits: &mut Vec<ColliderHit>) {
        self.collision.overlap_capsule(capsule, mask, hits);
    }

    fn sweep_capsule(
        &self,
        capsule: &Capsule,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<SweepHit> {
        self.collision
            .sweep_capsule(capsule, direction, max_distance, mask)
    }
}
