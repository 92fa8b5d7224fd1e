//! Branch instantiation contract
//!
//! The scheduler decides where branches go. Turning a decision into a
//! scene entity with a collider is up to the host.

use crate::catalog::TemplateId;
use crate::math::{Capsule, Pose};
use crate::world::{EntityId, LayerId, PlantId, WorldQuery};

/// Everything the host needs to create one branch.
#[derive(Clone, Debug)]
pub struct SpawnRequest<'a> {
    pub plant: PlantId,
    pub template: TemplateId,
    pub template_name: &'a str,
    pub depth: u32,
    /// Entity of the parent branch, `None` for the root
    pub parent: Option<EntityId>,
    /// Pose relative to the parent branch (the plant for the root)
    pub local: Pose,
    pub world: Pose,
    /// Collider the branch should carry, in world space
    pub collider: Capsule,
    pub layer: LayerId,
    pub mesh_variant: Option<&'a str>,
}

pub trait BranchInstantiator {
    /// Create the entity for a placed branch, including its collider.
    fn instantiate(&mut self, request: &SpawnRequest<'_>) -> EntityId;

    /// Remove a branch entity. Unknown entities are ignored.
    fn despawn(&mut self, entity: EntityId);

    /// Drop every collider owned by `plant`, keeping the entities.
    fn strip_colliders(&mut self, plant: PlantId);
}

/// A world a plant can grow in: queried for placements and populated with
/// the branches that pass.
pub trait GrowthEnvironment: WorldQuery + BranchInstantiator {}

impl<T: WorldQuery + BranchInstantiator> GrowthEnvironment for T {}
