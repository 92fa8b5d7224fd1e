//! World queries consumed by the growth scheduler
//!
//! The scheduler never owns collision geometry. It asks a [`WorldQuery`]
//! whether a capsule overlaps anything on a set of layers, and uses the owner
//! identity on each hit to exempt the parent branch and to reject surfaces
//! that belong to the plant itself.

pub mod collision;
pub mod layer;

pub use collision::{Collider, ColliderShape, CollisionWorld};
pub use layer::{LayerId, LayerMask};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::math::Capsule;

/// Identifier of a scene entity (e.g. a placed branch).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Identifier of a plant instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlantId(pub u64);

/// Handle of a collider inside a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderHandle(pub u64);

/// Who a collider belongs to, if it belongs to a grown branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColliderOwner {
    pub plant: PlantId,
    pub entity: EntityId,
}

/// One collider found by an overlap query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColliderHit {
    pub collider: ColliderHandle,
    pub owner: Option<ColliderOwner>,
}

impl ColliderHit {
    pub fn entity(&self) -> Option<EntityId> {
        self.owner.map(|o| o.entity)
    }

    pub fn plant(&self) -> Option<PlantId> {
        self.owner.map(|o| o.plant)
    }
}

/// First collider hit by a swept capsule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepHit {
    pub collider: ColliderHandle,
    pub owner: Option<ColliderOwner>,
    /// Distance travelled along the sweep direction
    pub distance: f32,
    /// Approximate contact point on the collider
    pub point: Vec3,
    /// Surface normal at the contact point
    pub normal: Vec3,
}

/// Collision queries against the environment a plant grows in.
pub trait WorldQuery {
    /// Append every collider on `mask` that overlaps `capsule` to `hits`.
    fn overlap_capsule(&self, capsule: &Capsule, mask: LayerMask, hits: &mut Vec<ColliderHit>);

    /// Move `capsule` along `direction` (normalized) up to `max_distance` and
    /// report the first collider on `mask` it touches.
    fn sweep_capsule(
        &self,
        capsule: &Capsule,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<SweepHit>;

    /// Whether anything on `mask` overlaps `capsule`.
    fn check_capsule(&self, capsule: &Capsule, mask: LayerMask) -> bool {
        let mut hits = Vec::new();
        self.overlap_capsule(capsule, mask, &mut hits);
        !hits.is_empty()
    }
}
