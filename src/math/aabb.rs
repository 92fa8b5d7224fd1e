//! Axis-aligned bounding box

use crate::core::types::Vec3;

/// Axis-aligned bounding box defined by min and max corners
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create AABB from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create AABB from center and half-extents
    pub fn from_center_half_extent(center: Vec3, half_extent: Vec3) -> Self {
        Self {
            min: center - half_extent,
            max: center + half_extent,
        }
    }

    /// Get center point
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get size (max - min)
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Check if point is inside AABB
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.x >= self.min.x && p.x <= self.max.x &&
        p.y >= self.min.y && p.y <= self.max.y &&
        p.z >= self.min.z && p.z <= self.max.z
    }

    /// Check if two AABBs intersect
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Grow the box by `amount` on every side
    pub fn inflated(&self, amount: f32) -> Aabb {
        Aabb {
            min: self.min - Vec3::splat(amount),
            max: self.max + Vec3::splat(amount),
        }
    }

    /// Point on or inside the box closest to `p`
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        p.clamp(self.min, self.max)
    }

    /// Squared distance from `p` to the box (0 inside)
    pub fn distance_squared_to_point(&self, p: Vec3) -> f32 {
        (self.closest_point(p) - p).length_squared()
    }

    /// Outward normal of the face nearest to `p`.
    ///
    /// For points outside the box this is the direction from the closest
    /// surface point; inside it picks the nearest face.
    pub fn surface_normal(&self, p: Vec3) -> Vec3 {
        let closest = self.closest_point(p);
        let delta = p - closest;
        if delta.length_squared() > 1e-12 {
            return delta.normalize();
        }

        let to_min = p - self.min;
        let to_max = self.max - p;
        let candidates = [
            (to_min.x, Vec3::NEG_X),
            (to_max.x, Vec3::X),
            (to_min.y, Vec3::NEG_Y),
            (to_max.y, Vec3::Y),
            (to_min.z, Vec3::NEG_Z),
            (to_max.z, Vec3::Z),
        ];
        candidates
            .iter()
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, n)| *n)
            .unwrap_or(Vec3::Y)
    }

    /// Return merged AABB containing both
    pub fn merged(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_accessors() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert_eq!(aabb.center(), Vec3::splat(0.5));
        assert_eq!(aabb.size(), Vec3::ONE);
    }

    #[test]
    fn test_contains_point() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert!(aabb.contains_point(Vec3::splat(0.5)));
        assert!(!aabb.contains_point(Vec3::splat(2.0)));
    }

    #[test]
    fn test_intersects() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::new(Vec3::splat(0.5), Vec3::splat(1.5));
        let c = Aabb::new(Vec3::splat(2.0), Vec3::splat(3.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_distance_to_point() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert_eq!(aabb.distance_squared_to_point(Vec3::splat(0.5)), 0.0);
        assert!((aabb.distance_squared_to_point(Vec3::new(3.0, 0.5, 0.5)) - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_surface_normal() {
        let aabb = Aabb::new(Vec3::new(-5.0, -1.0, -5.0), Vec3::new(5.0, 0.0, 5.0));
        assert_eq!(aabb.surface_normal(Vec3::new(0.0, 2.0, 0.0)), Vec3::Y);
        // Just inside the top face
        assert_eq!(aabb.surface_normal(Vec3::new(0.0, -0.01, 0.0)), Vec3::Y);
    }
}
