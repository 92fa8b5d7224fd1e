//! Rigid poses (position + rotation, no scale)

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Local forward axis of a branch. Branches grow along this axis.
pub const FORWARD: Vec3 = Vec3::Z;
/// Local up axis of a branch.
pub const UP: Vec3 = Vec3::Y;
/// World up direction.
pub const WORLD_UP: Vec3 = Vec3::Y;

/// A position and orientation in 3D space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Translation-only pose.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Transform a point from this pose's local space into the parent space.
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// Compose: `self` is the parent, `local` is expressed relative to it.
    pub fn mul_pose(&self, local: &Pose) -> Pose {
        Pose {
            position: self.transform_point(local.position),
            rotation: (self.rotation * local.rotation).normalize(),
        }
    }

    /// Inverse pose, so that `p.inverse().mul_pose(&p)` is the identity.
    pub fn inverse(&self) -> Pose {
        let inv_rot = self.rotation.inverse();
        Pose {
            position: inv_rot * -self.position,
            rotation: inv_rot,
        }
    }

    /// Express a world pose relative to this pose.
    pub fn relative(&self, world: &Pose) -> Pose {
        self.inverse().mul_pose(world)
    }

    /// World direction of the local forward axis.
    pub fn forward(&self) -> Vec3 {
        self.rotation * FORWARD
    }

    /// World direction of the local up axis.
    pub fn up(&self) -> Vec3 {
        self.rotation * UP
    }

    /// Whether `other` is further away than the given distance or angle.
    pub fn moved_beyond(&self, other: &Pose, max_distance: f32, max_angle_degrees: f32) -> bool {
        self.position.distance(other.position) > max_distance
            || self.rotation.angle_between(other.rotation).to_degrees() > max_angle_degrees
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_identity_transform() {
        let p = Pose::IDENTITY;
        assert_eq!(p.transform_point(Vec3::new(1.0, 2.0, 3.0)), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(p.forward(), FORWARD);
    }

    #[test]
    fn test_compose_and_inverse() {
        let parent = Pose::new(Vec3::new(1.0, 0.0, 0.0), Quat::from_rotation_y(FRAC_PI_2));
        let local = Pose::new(Vec3::new(0.0, 0.0, 2.0), Quat::from_rotation_x(0.3));
        let world = parent.mul_pose(&local);

        // Local +Z rotated 90 deg about Y points along +X
        assert!((world.position - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-5);

        let back = parent.relative(&world);
        assert!((back.position - local.position).length() < 1e-5);
        assert!(back.rotation.angle_between(local.rotation) < 1e-3);
    }

    #[test]
    fn test_moved_beyond() {
        let a = Pose::IDENTITY;
        let b = Pose::from_position(Vec3::new(0.005, 0.0, 0.0));
        let c = Pose::from_position(Vec3::new(0.5, 0.0, 0.0));
        let d = Pose::new(Vec3::ZERO, Quat::from_rotation_y(5f32.to_radians()));
        assert!(!a.moved_beyond(&b, 0.01, 1.0));
        assert!(a.moved_beyond(&c, 0.01, 1.0));
        assert!(a.moved_beyond(&d, 0.01, 1.0));
    }
}
