//! Placement math for branch growth
//!
//! Pure functions used by the growth scheduler: capsule extents for the
//! clearance and surface probes, orientation blending (pivot, vertical bias,
//! face-upward, roll) and socket-to-world composition.

use std::f32::consts::FRAC_PI_2;

use glam::{EulerRot, Mat3, Quat, Vec3};

use super::capsule::Capsule;
use super::pose::{Pose, FORWARD, WORLD_UP};

/// Rotation of the root branch relative to the plant, pointing its forward
/// axis along the plant's up axis.
pub fn root_rotation() -> Quat {
    Quat::from_rotation_x(-FRAC_PI_2)
}

/// Distances along the branch axis of the clearance capsule's segment ends.
///
/// The first `min(h - r, 3r)` of the branch is skipped so a branch may
/// overlap its own socket anchor.
pub fn clearance_extents(radius: f32, height: f32) -> (f32, f32) {
    let start = (height - radius).min(3.0 * radius);
    let end = start.max(height - radius);
    (start, end)
}

/// Capsule that must be free of obstacles for a branch placed at `pose`.
pub fn clearance_capsule(pose: &Pose, radius: f32, height: f32) -> Capsule {
    let (start, end) = clearance_extents(radius, height);
    let dir = pose.forward();
    Capsule::new(
        pose.position + dir * start,
        pose.position + dir * end,
        radius,
    )
}

/// Capsule probing for a supporting surface below the outer half of a
/// branch placed at `pose`. The radius is scaled by `surface_distance`.
pub fn surface_capsule(pose: &Pose, radius: f32, height: f32, surface_distance: f32) -> Capsule {
    let dir = pose.forward();
    let offset = -pose.up() * radius;
    Capsule::new(
        pose.position + offset + dir * (0.5 * height),
        pose.position + offset + dir * (height - radius),
        radius * surface_distance,
    )
}

/// Collider capsule of a placed branch: a capsule of total length `height`
/// starting at the branch origin and running along its forward axis.
pub fn branch_collider(pose: &Pose, radius: f32, height: f32) -> Capsule {
    let dir = pose.forward();
    let center = pose.position + dir * (0.5 * height);
    let half_segment = (0.5 * height - radius).max(0.0);
    Capsule::new(center - dir * half_segment, center + dir * half_segment, radius)
}

/// Rotation whose local forward (+Z) points along `forward` and whose local
/// up (+Y) is as close to `up` as possible.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let f = forward.normalize_or_zero();
    if f == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    let mut right = up.cross(f);
    if right.length_squared() < 1e-10 {
        // up is parallel to forward, pick any perpendicular up
        right = f.any_orthonormal_vector().cross(f);
    }
    let right = right.normalize();
    let true_up = f.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, true_up, f)).normalize()
}

/// Random pivot rotation: `x` degrees around local X, then `y` around local Y.
pub fn pivot_rotation(x_degrees: f32, y_degrees: f32) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        y_degrees.to_radians(),
        x_degrees.to_radians(),
        0.0,
    )
}

/// Roll around the local forward axis.
pub fn roll_rotation(degrees: f32) -> Quat {
    Quat::from_rotation_z(degrees.to_radians())
}

/// Blend `rotation` toward pointing straight down (negative bias) or
/// straight up (positive bias) by `|bias|`.
pub fn apply_vertical_bias(rotation: Quat, bias: f32) -> Quat {
    if bias < 0.0 {
        let down = look_rotation(-WORLD_UP, rotation * FORWARD);
        rotation.slerp(down, -bias).normalize()
    } else if bias > 0.0 {
        let up = look_rotation(WORLD_UP, rotation * -FORWARD);
        rotation.slerp(up, bias).normalize()
    } else {
        rotation
    }
}

/// Keep the forward direction but roll so local up faces world up.
pub fn face_upwards(rotation: Quat) -> Quat {
    look_rotation(rotation * FORWARD, WORLD_UP)
}

/// World pose of a socket given the parent's world pose.
pub fn socket_world_pose(parent_world: &Pose, socket_local: &Pose) -> Pose {
    parent_world.mul_pose(socket_local)
}

/// Random angles drawn for one placement attempt, in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OrientationJitter {
    pub pivot_x: f32,
    pub pivot_y: f32,
    pub roll: f32,
}

/// Orientation parameters of a template that shape a branch's final rotation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OrientationRules {
    pub vertical_bias: f32,
    pub face_upwards: bool,
}

/// Final world rotation of a branch grown from a socket with world
/// rotation `socket_rotation`.
///
/// Order: pivot, vertical bias (world space), face-upward, then roll.
pub fn oriented_rotation(socket_rotation: Quat, jitter: OrientationJitter, rules: OrientationRules) -> Quat {
    let mut rotation = socket_rotation * pivot_rotation(jitter.pivot_x, jitter.pivot_y);
    rotation = apply_vertical_bias(rotation, rules.vertical_bias);
    if rules.face_upwards {
        rotation = face_upwards(rotation);
    }
    (rotation * roll_rotation(jitter.roll)).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_root_rotation_points_up() {
        assert!(approx(root_rotation() * FORWARD, Vec3::Y));
    }

    #[test]
    fn test_clearance_extents() {
        // Long branch: skip 3r, end at h - r
        let (s, e) = clearance_extents(0.1, 2.0);
        assert!((s - 0.3).abs() < 1e-6);
        assert!((e - 1.9).abs() < 1e-6);
        // Short branch: start and end collapse to h - r
        let (s, e) = clearance_extents(0.5, 1.0);
        assert_eq!(s, 0.5);
        assert_eq!(e, 0.5);
    }

    #[test]
    fn test_clearance_capsule_along_forward() {
        let pose = Pose::new(Vec3::new(1.0, 0.0, 0.0), Quat::IDENTITY);
        let c = clearance_capsule(&pose, 0.1, 2.0);
        assert!(approx(c.start, Vec3::new(1.0, 0.0, 0.3)));
        assert!(approx(c.end, Vec3::new(1.0, 0.0, 1.9)));
        assert_eq!(c.radius, 0.1);
    }

    #[test]
    fn test_surface_capsule_offset_down() {
        let pose = Pose::IDENTITY;
        let c = surface_capsule(&pose, 0.2, 2.0, 1.5);
        assert!(approx(c.start, Vec3::new(0.0, -0.2, 1.0)));
        assert!(approx(c.end, Vec3::new(0.0, -0.2, 1.8)));
        assert!((c.radius - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_branch_collider_spans_height() {
        let c = branch_collider(&Pose::IDENTITY, 0.1, 1.0);
        assert!(approx(c.start, Vec3::new(0.0, 0.0, 0.1)));
        assert!(approx(c.end, Vec3::new(0.0, 0.0, 0.9)));
    }

    #[test]
    fn test_look_rotation_axes() {
        let q = look_rotation(Vec3::X, Vec3::Y);
        assert!(approx(q * FORWARD, Vec3::X));
        assert!(approx(q * Vec3::Y, Vec3::Y));

        // Degenerate up still yields a valid rotation with the right forward
        let q = look_rotation(Vec3::Y, Vec3::Y);
        assert!(approx(q * FORWARD, Vec3::Y));
    }

    #[test]
    fn test_full_vertical_bias() {
        let sideways = look_rotation(Vec3::X, Vec3::Y);
        let down = apply_vertical_bias(sideways, -1.0);
        assert!(approx(down * FORWARD, Vec3::NEG_Y));
        let up = apply_vertical_bias(sideways, 1.0);
        assert!(approx(up * FORWARD, Vec3::Y));
        assert_eq!(apply_vertical_bias(sideways, 0.0), sideways);
    }

    #[test]
    fn test_partial_vertical_bias_tilts_halfway() {
        let sideways = look_rotation(Vec3::X, Vec3::Y);
        let tilted = apply_vertical_bias(sideways, 0.5) * FORWARD;
        let angle = tilted.angle_between(Vec3::Y).to_degrees();
        assert!((angle - 45.0).abs() < 0.5, "angle was {angle}");
    }

    #[test]
    fn test_face_upwards_keeps_forward() {
        // Forward along +X, but rolled so local up points along -Z
        let rolled = look_rotation(Vec3::X, Vec3::NEG_Z);
        let fixed = face_upwards(rolled);
        assert!(approx(fixed * FORWARD, Vec3::X));
        assert!(approx(fixed * Vec3::Y, Vec3::Y));
    }

    #[test]
    fn test_oriented_rotation_without_jitter_is_socket() {
        let socket = Quat::from_rotation_y(0.7);
        let q = oriented_rotation(socket, OrientationJitter::default(), OrientationRules::default());
        assert!(q.angle_between(socket) < 1e-4);
    }

    #[test]
    fn test_roll_preserves_forward() {
        let socket = look_rotation(Vec3::X, Vec3::Y);
        let jitter = OrientationJitter { roll: 45.0, ..Default::default() };
        let q = oriented_rotation(socket, jitter, OrientationRules::default());
        assert!(approx(q * FORWARD, Vec3::X));
        assert!(!approx(q * Vec3::Y, Vec3::Y));
    }
}
