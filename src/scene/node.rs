//! Scene graph node types
//!
//! Core types for the CPU-side scene graph: node IDs, transforms, content variants, and nodes.

use glam::{Mat4, Quat, Vec3};

use crate::catalog::TemplateId;
use crate::math::Pose;
use crate::world::{ColliderHandle, EntityId, LayerId, PlantId};

/// Unique identifier for a scene graph node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneNodeId(pub u64);

impl SceneNodeId {
    /// Entity id handed to the growth scheduler for this node.
    pub fn entity(self) -> EntityId {
        EntityId(self.0)
    }

    pub fn from_entity(entity: EntityId) -> Self {
        Self(entity.0)
    }
}

/// Local transform relative to the parent node.
#[derive(Clone, Debug)]
pub struct LocalTransform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl LocalTransform {
    /// Identity transform (no translation or rotation).
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a translation-only transform.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn from_pose(pose: &Pose) -> Self {
        Self {
            position: pose.position,
            rotation: pose.rotation,
        }
    }

    /// Convert to a 4x4 matrix.
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }
}

/// What a scene node contains.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeContent {
    /// A grouping node with no geometry of its own.
    Group,

    /// A grown branch segment.
    Branch {
        plant: PlantId,
        template: TemplateId,
        depth: u32,
        mesh_variant: Option<String>,
    },

    /// Static geometry plants grow around or on.
    Obstacle { collider: ColliderHandle },
}

/// A single node in the scene graph.
#[derive(Clone, Debug)]
pub struct SceneNode {
    pub id: SceneNodeId,
    pub name: String,
    pub parent: Option<SceneNodeId>,
    pub children: Vec<SceneNodeId>,
    pub local_transform: LocalTransform,
    /// Cached world transform (recomputed during propagation).
    pub world_transform: Mat4,
    pub layer: LayerId,
    pub content: NodeContent,
}

impl SceneNode {
    /// Create a new scene node.
    pub fn new(
        id: SceneNodeId,
        name: impl Into<String>,
        layer: LayerId,
        content: NodeContent,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            parent: None,
            children: Vec::new(),
            local_transform: LocalTransform::identity(),
            world_transform: Mat4::IDENTITY,
            layer,
            content,
        }
    }

    pub fn is_branch(&self) -> bool {
        matches!(self.content, NodeContent::Branch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_node_id_equality() {
        let a = SceneNodeId(1);
        let b = SceneNodeId(1);
        let c = SceneNodeId(2);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(SceneNodeId::from_entity(a.entity()), a);
    }

    #[test]
    fn test_local_transform_identity() {
        let t = LocalTransform::identity();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.to_mat4(), Mat4::IDENTITY);
    }

    #[test]
    fn test_local_transform_from_pose() {
        let pose = Pose::new(Vec3::new(10.0, 5.0, -3.0), Quat::from_rotation_y(0.5));
        let m = LocalTransform::from_pose(&pose).to_mat4();
        let (scale, rotation, translation) = m.to_scale_rotation_translation();
        assert!((scale - Vec3::ONE).length() < 1e-5);
        assert!(rotation.angle_between(pose.rotation) < 1e-4);
        assert!((translation - pose.position).length() < 1e-5);
    }

    #[test]
    fn test_scene_node_new() {
        let node = SceneNode::new(
            SceneNodeId(0),
            "root",
            LayerId::DEFAULT,
            NodeContent::Group,
        );
        assert_eq!(node.id, SceneNodeId(0));
        assert_eq!(node.name, "root");
        assert!(node.parent.is_none());
        assert!(node.children.is_empty());
        assert!(!node.is_branch());
        assert_eq!(node.layer, LayerId::DEFAULT);
    }

    #[test]
    fn test_node_content_branch() {
        let content = NodeContent::Branch {
            plant: PlantId(3),
            template: TemplateId(1),
            depth: 2,
            mesh_variant: Some("leaf_b".into()),
        };
        assert!(matches!(content, NodeContent::Branch { depth: 2, .. }));
    }
}
