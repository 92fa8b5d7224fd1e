//! Growth configuration
//!
//! Everything a host sets up before calling `restart`. All structs
//! round-trip through serde so plant setups can live in JSON next to the
//! catalog they grow from.

use serde::{Deserialize, Serialize};

use crate::catalog::PlantSpecies;

/// Per-tick work limits and the blocked threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthBudget {
    /// Placement attempts made for one branch add before giving up for now
    pub attempts_per_branch: u32,
    /// Branch adds tried per tick
    pub branches_per_tick: u32,
    /// Failed attempts since the last success after which growth is blocked
    pub max_failed_attempts: u32,
    /// Cap on distinct templates reachable from one root
    pub max_branch_types: usize,
}

impl Default for GrowthBudget {
    fn default() -> Self {
        Self {
            attempts_per_branch: 200,
            branches_per_tick: 20,
            max_failed_attempts: 5000,
            max_branch_types: 32,
        }
    }
}

/// How far a plant may drift before growth restarts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveThreshold {
    pub distance: f32,
    pub angle_degrees: f32,
}

impl Default for MoveThreshold {
    fn default() -> Self {
        Self {
            distance: 0.01,
            angle_degrees: 1.0,
        }
    }
}

/// Complete setup of one plant instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantConfig {
    pub species: PlantSpecies,
    pub seed: u64,
    pub budget: GrowthBudget,
    /// Restart growth when the plant pose moves beyond `move_threshold`
    pub restart_when_moved: bool,
    pub move_threshold: MoveThreshold,
    /// Keep branch colliders once growth completes
    pub keep_colliders: bool,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            species: PlantSpecies::default(),
            seed: 0,
            budget: GrowthBudget::default(),
            restart_when_moved: false,
            move_threshold: MoveThreshold::default(),
            keep_colliders: true,
        }
    }
}

impl PlantConfig {
    pub fn new(species: PlantSpecies, seed: u64) -> Self {
        Self {
            species,
            seed,
            ..Default::default()
        }
    }

    pub fn with_budget(mut self, budget: GrowthBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_restart_when_moved(mut self, threshold: MoveThreshold) -> Self {
        self.restart_when_moved = true;
        self.move_threshold = threshold;
        self
    }

    pub fn with_keep_colliders(mut self, keep: bool) -> Self {
        self.keep_colliders = keep;
        self
    }

    /// Load a plant setup from JSON (sync)
    pub fn load_sync(path: &std::path::Path) -> crate::core::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TemplateId;

    #[test]
    fn test_defaults() {
        let budget = GrowthBudget::default();
        assert_eq!(budget.attempts_per_branch, 200);
        assert_eq!(budget.branches_per_tick, 20);
        assert_eq!(budget.max_failed_attempts, 5000);
        assert_eq!(budget.max_branch_types, 32);

        let config = PlantConfig::default();
        assert!(!config.restart_when_moved);
        assert!(config.keep_colliders);
        assert_eq!(config.species.max_total_branches, 50);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "seed": 7, "budget": { "branches_per_tick": 3 } }"#;
        let config: PlantConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.budget.branches_per_tick, 3);
        assert_eq!(config.budget.attempts_per_branch, 200);
        assert_eq!(config.move_threshold, MoveThreshold::default());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = PlantConfig::new(PlantSpecies::new("ivy", TemplateId(2)), 99)
            .with_restart_when_moved(MoveThreshold { distance: 0.5, angle_degrees: 10.0 })
            .with_keep_colliders(false);
        let json = serde_json::to_string(&config).unwrap();
        let back: PlantConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
