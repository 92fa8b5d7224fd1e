//! Mathematical utilities and data structures

pub mod aabb;
pub mod capsule;
pub mod placement;
pub mod pose;

pub use aabb::Aabb;
pub use capsule::Capsule;
pub use pose::{Pose, FORWARD, UP, WORLD_UP};
