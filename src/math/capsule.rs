//! Capsule primitive and overlap tests
//!
//! A capsule is the set of points within `radius` of the segment
//! `start..end`. A capsule with `start == end` is a sphere.

use glam::Vec3;

use super::aabb::Aabb;

/// Segment-swept sphere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Capsule {
    pub start: Vec3,
    pub end: Vec3,
    pub radius: f32,
}

/// Closest point to `p` on the segment `a..b`.
pub fn closest_point_on_segment(p: Vec3, a: Vec3, b: Vec3) -> Vec3 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Squared distance between segments `p1..q1` and `p2..q2`.
///
/// Follows the clamped closest-points construction from Ericson,
/// "Real-Time Collision Detection", 5.1.9.
pub fn segment_distance_squared(p1: Vec3, q1: Vec3, p2: Vec3, q2: Vec3) -> f32 {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.length_squared();
    let e = d2.length_squared();
    let f = d2.dot(r);

    let (s, t) = if a <= f32::EPSILON && e <= f32::EPSILON {
        (0.0, 0.0)
    } else if a <= f32::EPSILON {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(r);
        if e <= f32::EPSILON {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(d2);
            let denom = a * e - b * b;
            let mut s = if denom > f32::EPSILON {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let mut t = (b * s + f) / e;
            if t < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            }
            (s, t)
        }
    };

    let c1 = p1 + d1 * s;
    let c2 = p2 + d2 * t;
    (c1 - c2).length_squared()
}

impl Capsule {
    pub fn new(start: Vec3, end: Vec3, radius: f32) -> Self {
        Self { start, end, radius }
    }

    /// Degenerate capsule (sphere) at `center`.
    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Self {
            start: center,
            end: center,
            radius,
        }
    }

    /// Point on the inner segment closest to `p`.
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        closest_point_on_segment(p, self.start, self.end)
    }

    /// Same capsule moved by `offset`.
    pub fn translated(&self, offset: Vec3) -> Capsule {
        Capsule {
            start: self.start + offset,
            end: self.end + offset,
            radius: self.radius,
        }
    }

    /// Bounding box of the capsule
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.start.min(self.end), self.start.max(self.end)).inflated(self.radius)
    }

    pub fn overlaps_sphere(&self, center: Vec3, radius: f32) -> bool {
        let reach = self.radius + radius;
        self.closest_point(center).distance_squared(center) <= reach * reach
    }

    pub fn overlaps_capsule(&self, other: &Capsule) -> bool {
        let reach = self.radius + other.radius;
        segment_distance_squared(self.start, self.end, other.start, other.end) <= reach * reach
    }

    /// Capsule vs. box, by minimizing the (convex) segment-to-box distance.
    pub fn overlaps_aabb(&self, aabb: &Aabb) -> bool {
        if !self.bounds().intersects(aabb) {
            return false;
        }
        self.distance_squared_to_aabb(aabb) <= self.radius * self.radius
    }

    /// Squared distance between the inner segment and the box.
    pub fn distance_squared_to_aabb(&self, aabb: &Aabb) -> f32 {
        const ITERATIONS: usize = 40;
        const INV_PHI: f32 = 0.618_034;

        let at = |t: f32| aabb.distance_squared_to_point(self.start.lerp(self.end, t));

        // Golden-section search on [0, 1]
        let mut lo = 0.0f32;
        let mut hi = 1.0f32;
        let mut x1 = hi - INV_PHI * (hi - lo);
        let mut x2 = lo + INV_PHI * (hi - lo);
        let mut f1 = at(x1);
        let mut f2 = at(x2);
        for _ in 0..ITERATIONS {
            if f1 <= f2 {
                hi = x2;
                x2 = x1;
                f2 = f1;
                x1 = hi - INV_PHI * (hi - lo);
                f1 = at(x1);
            } else {
                lo = x1;
                x1 = x2;
                f1 = f2;
                x2 = lo + INV_PHI * (hi - lo);
                f2 = at(x2);
            }
        }

        f1.min(f2).min(at(0.0)).min(at(1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closest_point_on_segment() {
        let a = Vec3::ZERO;
        let b = Vec3::new(0.0, 0.0, 2.0);
        assert_eq!(closest_point_on_segment(Vec3::new(1.0, 0.0, 1.0), a, b), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(closest_point_on_segment(Vec3::new(0.0, 0.0, -5.0), a, b), a);
        assert_eq!(closest_point_on_segment(Vec3::new(0.0, 0.0, 5.0), a, b), b);
    }

    #[test]
    fn test_segment_distance_parallel() {
        let d = segment_distance_squared(
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 1.0),
        );
        assert!((d - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_segment_distance_crossing() {
        let d = segment_distance_squared(
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.5, -1.0),
            Vec3::new(0.0, 0.5, 1.0),
        );
        assert!((d - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_capsule_overlaps() {
        let c = Capsule::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 2.0), 0.25);
        assert!(c.overlaps_sphere(Vec3::new(0.4, 0.0, 1.0), 0.2));
        assert!(!c.overlaps_sphere(Vec3::new(1.0, 0.0, 1.0), 0.2));

        let other = Capsule::new(Vec3::new(0.4, 0.0, 0.0), Vec3::new(0.4, 0.0, 2.0), 0.2);
        assert!(c.overlaps_capsule(&other));
        assert!(!c.overlaps_capsule(&other.translated(Vec3::new(1.0, 0.0, 0.0))));
    }

    #[test]
    fn test_capsule_overlaps_aabb() {
        let ground = Aabb::new(Vec3::new(-10.0, -1.0, -10.0), Vec3::new(10.0, 0.0, 10.0));
        let above = Capsule::new(Vec3::new(0.0, 0.5, 0.0), Vec3::new(0.0, 2.0, 0.0), 0.25);
        let touching = Capsule::new(Vec3::new(-1.0, 0.2, 0.0), Vec3::new(1.0, 0.2, 0.0), 0.25);
        let diagonal = Capsule::new(Vec3::new(-3.0, 3.0, 0.0), Vec3::new(3.0, -3.0, 0.0), 0.1);
        assert!(!above.overlaps_aabb(&ground));
        assert!(touching.overlaps_aabb(&ground));
        assert!(diagonal.overlaps_aabb(&ground));
    }
}
