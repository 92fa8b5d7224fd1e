//! Branch templates and their sockets
//!
//! A template is the authored description of one kind of branch segment:
//! its capsule envelope, how it may be oriented, which layers it avoids or
//! needs to touch, how many of it a plant may contain, and up to
//! [`MAX_SOCKETS`] attachment points for child branches.

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::math::Pose;
use crate::world::{LayerId, LayerMask};

/// Maximum number of sockets on a single template.
pub const MAX_SOCKETS: usize = 4;

/// Index of a template inside a [`TemplateCatalog`](super::TemplateCatalog).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateId(pub u32);

impl TemplateId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A branch type that may grow from a socket, with its relative weight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SocketOption {
    pub template: TemplateId,
    pub weight: f32,
}

impl SocketOption {
    pub fn new(template: TemplateId, weight: f32) -> Self {
        Self { template, weight }
    }
}

/// Socket as authored: position plus Euler angles in degrees.
#[derive(Clone, Debug, PartialEq)]
pub struct SocketSpec {
    pub position: Vec3,
    /// Rotation in degrees, applied Z first, then X, then Y
    pub rotation_degrees: Vec3,
    pub options: Vec<SocketOption>,
}

impl SocketSpec {
    pub fn new(position: Vec3, rotation_degrees: Vec3) -> Self {
        Self {
            position,
            rotation_degrees,
            options: Vec::new(),
        }
    }

    /// Builder-style: add a candidate branch type.
    pub fn with_option(mut self, template: TemplateId, weight: f32) -> Self {
        self.options.push(SocketOption::new(template, weight));
        self
    }

    /// Local rotation of the socket relative to its template.
    pub fn rotation(&self) -> Quat {
        let r = self.rotation_degrees;
        Quat::from_euler(
            EulerRot::YXZ,
            r.y.to_radians(),
            r.x.to_radians(),
            r.z.to_radians(),
        )
    }
}

/// Socket after preprocessing: local pose and candidate list.
#[derive(Clone, Debug, PartialEq)]
pub struct Socket {
    pub local: Pose,
    pub options: Vec<SocketOption>,
}

impl Socket {
    /// Weight of `template` on this socket, if it is a candidate.
    pub fn option_weight(&self, template: TemplateId) -> Option<f32> {
        self.options
            .iter()
            .find(|o| o.template == template)
            .map(|o| o.weight)
    }
}

/// Named mesh variant with a relative pick weight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshVariant {
    pub name: String,
    pub weight: f32,
}

/// Authored description of a branch segment.
#[derive(Clone, Debug)]
pub struct BranchTemplate {
    pub name: String,
    /// Capsule radius
    pub radius: f32,
    /// Capsule length along the forward axis, caps included
    pub height: f32,
    /// Layer the branch's own collider lives on
    pub layer: LayerId,
    /// Branch will not grow through colliders on these layers
    pub obstacle_layers: LayerMask,
    /// If non-empty, the branch only grows when touching a surface on these layers
    pub surface_layers: LayerMask,
    /// Radius multiplier for the surface probe
    pub surface_distance: f32,
    /// Random pivot range in degrees (both X and Y)
    pub max_pivot_angle: f32,
    /// Random roll range in degrees around forward
    pub max_roll_angle: f32,
    /// -1 pulls branches straight down, +1 straight up
    pub vertical_bias: f32,
    /// Roll each branch so its up axis faces world up
    pub face_upwards: bool,
    pub depth_min: u32,
    pub depth_max: u32,
    pub max_count: u32,
    /// Max share of the whole plant, 0-100
    pub quota_percent: f32,
    /// Plant must have at least this many branches before this type grows
    pub min_total_other_branches: u32,
    pub sockets: Vec<SocketSpec>,
    pub mesh_variants: Vec<MeshVariant>,
}

impl Default for BranchTemplate {
    fn default() -> Self {
        Self {
            name: String::from("branch"),
            radius: 0.1,
            height: 1.0,
            layer: LayerId::DEFAULT,
            obstacle_layers: LayerMask::DEFAULT,
            surface_layers: LayerMask::NONE,
            surface_distance: 1.0,
            max_pivot_angle: 30.0,
            max_roll_angle: 30.0,
            vertical_bias: 0.0,
            face_upwards: false,
            depth_min: 0,
            depth_max: 12,
            max_count: 500,
            quota_percent: 100.0,
            min_total_other_branches: 0,
            sockets: Vec::new(),
            mesh_variants: Vec::new(),
        }
    }
}

impl BranchTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn needs_surface(&self) -> bool {
        !self.surface_layers.is_empty()
    }

    /// Whether a branch of this type may sit at `depth`.
    pub fn allows_depth(&self, depth: u32) -> bool {
        depth >= self.depth_min && depth <= self.depth_max
    }

    /// Check authoring values that would make growth misbehave.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.radius > 0.0) || !(self.height > 0.0) {
            return Err(format!("'{}' needs a positive radius and height", self.name));
        }
        if !(-1.0..=1.0).contains(&self.vertical_bias) {
            return Err(format!(
                "'{}' vertical bias {} outside [-1, 1]",
                self.name, self.vertical_bias
            ));
        }
        if !self.max_pivot_angle.is_finite() || !self.max_roll_angle.is_finite() {
            return Err(format!("'{}' has non-finite angle ranges", self.name));
        }
        if self.depth_min > self.depth_max {
            return Err(format!(
                "'{}' depth range {}..={} is empty",
                self.name, self.depth_min, self.depth_max
            ));
        }
        for socket in &self.sockets {
            if let Some(bad) = socket.options.iter().find(|o| !(o.weight >= 0.0)) {
                return Err(format!(
                    "'{}' has a socket option with weight {}",
                    self.name, bad.weight
                ));
            }
        }
        Ok(())
    }
}
