//! Plant species: which template roots a plant and how large it may get

use serde::{Deserialize, Serialize};

use super::template::TemplateId;

/// Growth setup shared by every plant of one kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlantSpecies {
    pub name: String,
    /// Template of the root branch. `None` leaves a plant in `MissingData`.
    pub root: Option<TemplateId>,
    /// Growth stops once the plant has this many branches (root included)
    pub max_total_branches: usize,
}

impl Default for PlantSpecies {
    fn default() -> Self {
        Self {
            name: String::from("species"),
            root: None,
            max_total_branches: 50,
        }
    }
}

impl PlantSpecies {
    pub fn new(name: impl Into<String>, root: TemplateId) -> Self {
        Self {
            name: name.into(),
            root: Some(root),
            ..Default::default()
        }
    }

    pub fn with_max_total_branches(mut self, max: usize) -> Self {
        self.max_total_branches = max;
        self
    }
}
