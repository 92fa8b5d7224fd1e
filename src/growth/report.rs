//! Serializable summary of a grown plant

use serde::{Deserialize, Serialize};

use crate::math::Pose;

use super::branch::{BranchId, BranchPath};
use super::events::{GrowthStats, PlantState, StopReason};
use super::plant::Plant;

/// One branch in a [`PlantReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchRecord {
    pub path: BranchPath,
    pub template: String,
    pub depth: u32,
    pub world: Pose,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh_variant: Option<String>,
}

/// Everything needed to compare or export a growth run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantReport {
    pub species: String,
    pub seed: u64,
    pub state: PlantState,
    pub stop_reason: Option<StopReason>,
    pub stats: GrowthStats,
    pub difficulty: f32,
    pub branches: Vec<BranchRecord>,
}

impl PlantReport {
    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    /// Branch records sorted by path, for comparing trees regardless of
    /// the order branches were added in.
    pub fn sorted_paths(&self) -> Vec<&BranchPath> {
        let mut paths: Vec<_> = self.branches.iter().map(|b| &b.path).collect();
        paths.sort();
        paths
    }

    pub fn to_json(&self) -> crate::core::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Plant {
    /// Snapshot of the plant as it stands now.
    pub fn report(&self) -> PlantReport {
        let catalog = self.catalog();
        let branches = self
            .branches()
            .iter()
            .enumerate()
            .map(|(i, branch)| BranchRecord {
                path: self.path(BranchId(i as u32)),
                template: catalog
                    .get(branch.template)
                    .map(|t| t.name.clone())
                    .unwrap_or_default(),
                depth: branch.depth,
                world: branch.world,
                mesh_variant: branch.mesh_variant.clone(),
            })
            .collect();

        PlantReport {
            species: self.config().species.name.clone(),
            seed: self.config().seed,
            state: self.state(),
            stop_reason: self.stop_reason(),
            stats: *self.stats(),
            difficulty: self.difficulty(),
            branches,
        }
    }
}
