//! Rktri Grow - incremental socket-based plant growth for 3D scenes

pub mod core;
pub mod math;
pub mod world;
pub mod catalog;
pub mod growth;
pub mod scene;
