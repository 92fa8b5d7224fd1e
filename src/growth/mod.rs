//! Incremental socket-based plant growth
//!
//! A plant starts from the root template of its species and repeatedly
//! picks an open socket, draws a branch type for it by weight, orients it
//! with random pivot and roll, and keeps it if the world has room. Growth
//! ends when the plant is full, nothing can grow any more, or placements
//! keep failing.

pub mod batch;
pub mod branch;
pub mod config;
pub mod events;
pub mod frontier;
pub mod instantiate;
pub mod plant;
pub mod registry;
pub mod report;
pub mod rng;

pub use batch::{grow_batch, grow_to_completion};
pub use branch::{Branch, BranchId, BranchPath};
pub use config::{GrowthBudget, MoveThreshold, PlantConfig};
pub use events::{GrowthEvent, GrowthStats, PlantState, StopReason};
pub use instantiate::{BranchInstantiator, GrowthEnvironment, SpawnRequest};
pub use plant::Plant;
pub use registry::{BranchType, BranchTypeRegistry};
pub use report::{BranchRecord, PlantReport};
pub use rng::{pick_weighted_index, GrowthRng, RngSnapshot};
