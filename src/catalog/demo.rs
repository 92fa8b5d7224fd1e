//! Built-in demo catalog
//!
//! A small shrub and a ground creeper, used by the `grow_plant` binary when
//! no catalog file is given, and by the benchmarks.

use crate::core::Result;

use super::catalog::TemplateCatalog;
use super::file::CatalogFile;
use super::species::PlantSpecies;

/// Layer 1 is vegetation, layer 0 the ground (mask 1 | 2 = 3).
pub const DEMO_CATALOG_JSON: &str = r#"{
  "version": 1,
  "templates": [
    {
      "name": "stem",
      "radius": 0.06,
      "height": 0.8,
      "layer": 1,
      "obstacle_layers": 3,
      "max_pivot_angle": 15,
      "max_roll_angle": 180,
      "vertical_bias": 0.2,
      "depth_max": 6,
      "max_count": 12,
      "sockets": [
        { "position": [0, 0, 0.8], "options": [ { "template": "stem", "percent": 70 }, { "template": "twig", "percent": 30 } ] },
        { "position": [0, 0, 0.5], "rotation": [0, 55, 0], "options": [ { "template": "twig", "percent": 100 } ] },
        { "position": [0, 0, 0.3], "rotation": [0, -55, 0], "options": [ { "template": "twig", "percent": 100 } ] }
      ]
    },
    {
      "name": "twig",
      "radius": 0.03,
      "height": 0.4,
      "layer": 1,
      "obstacle_layers": 3,
      "max_pivot_angle": 25,
      "max_roll_angle": 180,
      "depth_min": 1,
      "depth_max": 9,
      "min_total_other_branches": 1,
      "sockets": [
        { "position": [0, 0, 0.4], "options": [ { "template": "twig", "percent": 40 }, { "template": "leaf", "percent": 60 } ] },
        { "position": [0, 0, 0.2], "rotation": [40, 0, 0], "options": [ { "template": "leaf", "percent": 100 } ] }
      ]
    },
    {
      "name": "leaf",
      "radius": 0.05,
      "height": 0.15,
      "layer": 1,
      "obstacle_layers": 2,
      "max_pivot_angle": 30,
      "max_roll_angle": 20,
      "face_upwards": true,
      "depth_min": 2,
      "depth_max": 10,
      "quota_percent": 45,
      "min_total_other_branches": 3,
      "mesh_variants": [ { "name": "leaf_round", "weight": 3 }, { "name": "leaf_narrow", "weight": 1 } ]
    },
    {
      "name": "vine",
      "radius": 0.04,
      "height": 0.5,
      "layer": 1,
      "obstacle_layers": 2,
      "surface_layers": 1,
      "surface_distance": 1.5,
      "max_pivot_angle": 35,
      "max_roll_angle": 0,
      "vertical_bias": -0.4,
      "face_upwards": true,
      "depth_max": 20,
      "sockets": [
        { "position": [0, 0, 0.5], "options": [ { "template": "vine", "percent": 100 } ] },
        { "position": [0, 0, 0.25], "rotation": [0, 70, 0], "options": [ { "template": "vine", "percent": 100 } ] }
      ]
    }
  ],
  "species": [
    { "name": "shrub", "root": "stem", "max_total_branches": 60 },
    { "name": "creeper", "root": "vine", "max_total_branches": 40 }
  ]
}"#;

/// Parse and resolve [`DEMO_CATALOG_JSON`].
pub fn demo_catalog() -> Result<(TemplateCatalog, Vec<PlantSpecies>)> {
    let file: CatalogFile = serde_json::from_str(DEMO_CATALOG_JSON)?;
    file.resolve()
}
