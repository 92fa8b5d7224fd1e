//! Flattened branch list for hosts that draw or export grown plants.
//!
//! `FlatBranchEntry` is the result of walking the scene graph: one entry per
//! branch node with its propagated world pose.

use crate::catalog::TemplateId;
use crate::math::Pose;
use crate::world::{LayerId, PlantId};

use super::node::SceneNodeId;

/// One branch after transform propagation.
#[derive(Clone, Debug, PartialEq)]
pub struct FlatBranchEntry {
    pub node: SceneNodeId,
    pub plant: PlantId,
    pub template: TemplateId,
    pub depth: u32,
    /// World pose after propagating every parent transform.
    pub world: Pose,
    pub mesh_variant: Option<String>,
    /// Which layer this entry belongs to.
    pub layer_id: LayerId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_branch_entry_clone() {
        let entry = FlatBranchEntry {
            node: SceneNodeId(4),
            plant: PlantId(1),
            template: TemplateId(0),
            depth: 1,
            world: Pose::IDENTITY,
            mesh_variant: None,
            layer_id: LayerId::VEGETATION,
        };
        let cloned = entry.clone();
        assert_eq!(cloned, entry);
        assert_eq!(cloned.layer_id, LayerId::VEGETATION);
    }
}
