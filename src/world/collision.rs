//! Brute-force collision world
//!
//! Reference [`WorldQuery`] implementation used by the scene, the binaries
//! and the tests. Colliders are kept in a `BTreeMap` so query results come
//! back in insertion order and growth stays reproducible.

use std::collections::BTreeMap;

use glam::Vec3;

use crate::math::capsule::segment_distance_squared;
use crate::math::{Aabb, Capsule};

use super::{
    ColliderHandle, ColliderHit, ColliderOwner, EntityId, LayerId, LayerMask, PlantId, SweepHit,
    WorldQuery,
};

/// Geometry of a collider.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColliderShape {
    Sphere { center: Vec3, radius: f32 },
    Capsule(Capsule),
    Box(Aabb),
}

impl ColliderShape {
    /// Signed gap between this shape and `capsule` (negative when overlapping).
    pub fn gap_to_capsule(&self, capsule: &Capsule) -> f32 {
        match self {
            ColliderShape::Sphere { center, radius } => {
                capsule.closest_point(*center).distance(*center) - radius - capsule.radius
            }
            ColliderShape::Capsule(other) => {
                segment_distance_squared(capsule.start, capsule.end, other.start, other.end).sqrt()
                    - other.radius
                    - capsule.radius
            }
            ColliderShape::Box(aabb) => capsule.distance_squared_to_aabb(aabb).sqrt() - capsule.radius,
        }
    }

    pub fn overlaps_capsule(&self, capsule: &Capsule) -> bool {
        match self {
            ColliderShape::Sphere { center, radius } => capsule.overlaps_sphere(*center, *radius),
            ColliderShape::Capsule(other) => capsule.overlaps_capsule(other),
            ColliderShape::Box(aabb) => capsule.overlaps_aabb(aabb),
        }
    }

    /// Closest point on the shape surface to `p`, and the outward normal there.
    pub fn surface_toward(&self, p: Vec3) -> (Vec3, Vec3) {
        match self {
            ColliderShape::Sphere { center, radius } => {
                let n = (p - *center).normalize_or(Vec3::Y);
                (*center + n * *radius, n)
            }
            ColliderShape::Capsule(c) => {
                let axis_point = c.closest_point(p);
                let n = (p - axis_point).normalize_or(Vec3::Y);
                (axis_point + n * c.radius, n)
            }
            ColliderShape::Box(aabb) => (aabb.closest_point(p), aabb.surface_normal(p)),
        }
    }

    pub fn bounds(&self) -> Aabb {
        match self {
            ColliderShape::Sphere { center, radius } => {
                Aabb::from_center_half_extent(*center, Vec3::splat(*radius))
            }
            ColliderShape::Capsule(c) => c.bounds(),
            ColliderShape::Box(aabb) => *aabb,
        }
    }
}

/// A collider placed in the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collider {
    pub shape: ColliderShape,
    pub layer: LayerId,
    pub owner: Option<ColliderOwner>,
}

impl Collider {
    pub fn new(shape: ColliderShape, layer: LayerId) -> Self {
        Self {
            shape,
            layer,
            owner: None,
        }
    }

    pub fn owned_by(mut self, owner: ColliderOwner) -> Self {
        self.owner = Some(owner);
        self
    }
}

/// Flat list of colliders answering overlap and sweep queries by brute force.
#[derive(Clone, Debug, Default)]
pub struct CollisionWorld {
    colliders: BTreeMap<ColliderHandle, Collider>,
    next_handle: u64,
}

impl CollisionWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collider and return its handle.
    pub fn insert(&mut self, collider: Collider) -> ColliderHandle {
        let handle = ColliderHandle(self.next_handle);
        self.next_handle += 1;
        self.colliders.insert(handle, collider);
        handle
    }

    pub fn add_box(&mut self, aabb: Aabb, layer: LayerId) -> ColliderHandle {
        self.insert(Collider::new(ColliderShape::Box(aabb), layer))
    }

    pub fn add_sphere(&mut self, center: Vec3, radius: f32, layer: LayerId) -> ColliderHandle {
        self.insert(Collider::new(ColliderShape::Sphere { center, radius }, layer))
    }

    pub fn add_capsule(&mut self, capsule: Capsule, layer: LayerId) -> ColliderHandle {
        self.insert(Collider::new(ColliderShape::Capsule(capsule), layer))
    }

    pub fn remove(&mut self, handle: ColliderHandle) -> Option<Collider> {
        self.colliders.remove(&handle)
    }

    pub fn get(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.colliders.get(&handle)
    }

    /// Remove every collider owned by one of `entities`. Returns how many went.
    pub fn remove_owned_by_entities(&mut self, entities: &[EntityId]) -> usize {
        let before = self.colliders.len();
        self.colliders.retain(|_, c| match c.owner {
            Some(owner) => !entities.contains(&owner.entity),
            None => true,
        });
        before - self.colliders.len()
    }

    /// Remove every collider owned by `plant`. Returns how many went.
    pub fn remove_owned_by_plant(&mut self, plant: PlantId) -> usize {
        let before = self.colliders.len();
        self.colliders
            .retain(|_, c| c.owner.map(|o| o.plant) != Some(plant));
        before - self.colliders.len()
    }

    /// Number of colliders owned by `plant`.
    pub fn count_owned_by_plant(&self, plant: PlantId) -> usize {
        self.colliders
            .values()
            .filter(|c| c.owner.map(|o| o.plant) == Some(plant))
            .count()
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColliderHandle, &Collider)> + '_ {
        self.colliders.iter().map(|(h, c)| (*h, c))
    }
}

impl WorldQuery for CollisionWorld {
    fn overlap_capsule(&self, capsule: &Capsule, mask: LayerMask, hits: &mut Vec<ColliderHit>) {
        let bounds = capsule.bounds();
        for (handle, collider) in &self.colliders {
            if !mask.contains(collider.layer) {
                continue;
            }
            if !collider.shape.bounds().intersects(&bounds) {
                continue;
            }
            if collider.shape.overlaps_capsule(capsule) {
                hits.push(ColliderHit {
                    collider: *handle,
                    owner: collider.owner,
                });
            }
        }
    }

    fn sweep_capsule(
        &self,
        capsule: &Capsule,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<SweepHit> {
        const MAX_STEPS: usize = 64;
        const CONTACT_EPSILON: f32 = 1e-3;

        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO || max_distance <= 0.0 {
            return None;
        }

        let swept_bounds = capsule
            .bounds()
            .merged(&capsule.translated(direction * max_distance).bounds());

        let mut best: Option<SweepHit> = None;
        for (handle, collider) in &self.colliders {
            if !mask.contains(collider.layer) {
                continue;
            }
            if !collider.shape.bounds().intersects(&swept_bounds) {
                continue;
            }

            // Conservative advancement: the gap can shrink by at most the
            // distance travelled, so stepping by the gap never tunnels.
            let limit = best.map_or(max_distance, |b| b.distance);
            let mut t = 0.0f32;
            let mut hit_at = None;
            for _ in 0..MAX_STEPS {
                let moved = capsule.translated(direction * t);
                let gap = collider.shape.gap_to_capsule(&moved);
                if gap <= CONTACT_EPSILON {
                    hit_at = Some(t);
                    break;
                }
                t += gap;
                if t > limit {
                    break;
                }
            }

            if let Some(t) = hit_at {
                let moved = capsule.translated(direction * t);
                let probe = moved.start.lerp(moved.end, 0.5);
                let (point, normal) = collider.shape.surface_toward(probe);
                best = Some(SweepHit {
                    collider: *handle,
                    owner: collider.owner,
                    distance: t,
                    point,
                    normal,
                });
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ground() -> Aabb {
        Aabb::new(Vec3::new(-10.0, -1.0, -10.0), Vec3::new(10.0, 0.0, 10.0))
    }

    #[test]
    fn test_overlap_respects_mask() {
        let mut world = CollisionWorld::new();
        world.add_box(ground(), LayerId::DEFAULT);

        let probe = Capsule::sphere(Vec3::new(0.0, 0.1, 0.0), 0.2);
        assert!(world.check_capsule(&probe, LayerMask::DEFAULT));
        assert!(!world.check_capsule(&probe, LayerId::VEGETATION.mask()));
    }

    #[test]
    fn test_overlap_reports_owner() {
        let mut world = CollisionWorld::new();
        let owner = ColliderOwner {
            plant: PlantId(7),
            entity: EntityId(3),
        };
        world.insert(
            Collider::new(ColliderShape::Sphere { center: Vec3::ZERO, radius: 1.0 }, LayerId::DEFAULT)
                .owned_by(owner),
        );

        let mut hits = Vec::new();
        world.overlap_capsule(&Capsule::sphere(Vec3::new(0.5, 0.0, 0.0), 0.1), LayerMask::ALL, &mut hits);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entity(), Some(EntityId(3)));
        assert_eq!(hits[0].plant(), Some(PlantId(7)));
    }

    #[test]
    fn test_remove_owned() {
        let mut world = CollisionWorld::new();
        world.add_box(ground(), LayerId::DEFAULT);
        for i in 0..3 {
            let owner = ColliderOwner {
                plant: PlantId(1),
                entity: EntityId(i),
            };
            world.insert(
                Collider::new(ColliderShape::Sphere { center: Vec3::ZERO, radius: 1.0 }, LayerId::DEFAULT)
                    .owned_by(owner),
            );
        }
        assert_eq!(world.count_owned_by_plant(PlantId(1)), 3);
        assert_eq!(world.remove_owned_by_entities(&[EntityId(0)]), 1);
        assert_eq!(world.remove_owned_by_plant(PlantId(1)), 2);
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_sweep_hits_ground() {
        let mut world = CollisionWorld::new();
        world.add_box(ground(), LayerId::DEFAULT);

        let probe = Capsule::sphere(Vec3::new(0.0, 3.0, 0.0), 0.5);
        let hit = world
            .sweep_capsule(&probe, Vec3::NEG_Y, 10.0, LayerMask::DEFAULT)
            .expect("should hit the ground");
        assert!((hit.distance - 2.5).abs() < 0.01, "distance {}", hit.distance);
        assert!((hit.normal - Vec3::Y).length() < 1e-3);
        assert!(hit.point.y.abs() < 1e-3);
    }

    #[test]
    fn test_sweep_misses_when_out_of_range() {
        let mut world = CollisionWorld::new();
        world.add_box(ground(), LayerId::DEFAULT);

        let probe = Capsule::sphere(Vec3::new(0.0, 10.0, 0.0), 0.5);
        assert!(world.sweep_capsule(&probe, Vec3::NEG_Y, 5.0, LayerMask::DEFAULT).is_none());
        assert!(world.sweep_capsule(&probe, Vec3::Y, 50.0, LayerMask::DEFAULT).is_none());
    }

    #[test]
    fn test_sweep_picks_nearest() {
        let mut world = CollisionWorld::new();
        world.add_box(ground(), LayerId::DEFAULT);
        let near = world.add_sphere(Vec3::new(0.0, 2.0, 0.0), 0.5, LayerId::DEFAULT);

        let probe = Capsule::sphere(Vec3::new(0.0, 5.0, 0.0), 0.25);
        let hit = world
            .sweep_capsule(&probe, Vec3::NEG_Y, 10.0, LayerMask::DEFAULT)
            .unwrap();
        assert_eq!(hit.collider, near);
        assert!((hit.distance - 2.25).abs() < 0.01);
    }
}
