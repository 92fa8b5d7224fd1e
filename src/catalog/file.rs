//! JSON authoring format for template catalogs and species
//!
//! Templates are referenced by name in the file and resolved into
//! [`TemplateId`]s on load, so a catalog can be written by hand:
//!
//! ```json
//! {
//!   "templates": [
//!     { "name": "stem", "radius": 0.05, "height": 0.6,
//!       "sockets": [ { "position": [0, 0, 0.6], "options": [ { "template": "stem", "percent": 100 } ] } ] }
//!   ],
//!   "species": [ { "name": "vine", "root": "stem", "max_total_branches": 80 } ]
//! }
//! ```

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::world::{LayerId, LayerMask};

use super::catalog::TemplateCatalog;
use super::species::PlantSpecies;
use super::template::{BranchTemplate, MeshVariant, SocketSpec, TemplateId};

/// Current version of the catalog file format
pub const CATALOG_FILE_VERSION: u32 = 1;

/// Serialized catalog: templates plus species.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default = "default_version")]
    pub version: u32,
    pub templates: Vec<TemplateEntry>,
    #[serde(default)]
    pub species: Vec<SpeciesEntry>,
}

fn default_version() -> u32 {
    CATALOG_FILE_VERSION
}

/// One template; omitted fields take [`BranchTemplate::default`] values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateEntry {
    pub name: String,
    pub radius: f32,
    pub height: f32,
    pub layer: LayerId,
    pub obstacle_layers: LayerMask,
    pub surface_layers: LayerMask,
    pub surface_distance: f32,
    pub max_pivot_angle: f32,
    pub max_roll_angle: f32,
    pub vertical_bias: f32,
    pub face_upwards: bool,
    pub depth_min: u32,
    pub depth_max: u32,
    pub max_count: u32,
    pub quota_percent: f32,
    pub min_total_other_branches: u32,
    pub sockets: Vec<SocketEntry>,
    pub mesh_variants: Vec<MeshVariant>,
}

impl Default for TemplateEntry {
    fn default() -> Self {
        Self::from_template(&BranchTemplate::default(), &TemplateCatalog::new())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SocketEntry {
    pub position: [f32; 3],
    /// Euler angles in degrees
    pub rotation: [f32; 3],
    pub options: Vec<OptionEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionEntry {
    pub template: String,
    #[serde(default = "default_percent")]
    pub percent: f32,
}

fn default_percent() -> f32 {
    100.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesEntry {
    pub name: String,
    pub root: String,
    #[serde(default = "default_max_total_branches")]
    pub max_total_branches: usize,
}

fn default_max_total_branches() -> usize {
    PlantSpecies::default().max_total_branches
}

impl TemplateEntry {
    fn from_template(t: &BranchTemplate, catalog: &TemplateCatalog) -> Self {
        let name_of = |id: TemplateId| {
            catalog
                .get(id)
                .map(|t| t.name.clone())
                .unwrap_or_default()
        };
        Self {
            name: t.name.clone(),
            radius: t.radius,
            height: t.height,
            layer: t.layer,
            obstacle_layers: t.obstacle_layers,
            surface_layers: t.surface_layers,
            surface_distance: t.surface_distance,
            max_pivot_angle: t.max_pivot_angle,
            max_roll_angle: t.max_roll_angle,
            vertical_bias: t.vertical_bias,
            face_upwards: t.face_upwards,
            depth_min: t.depth_min,
            depth_max: t.depth_max,
            max_count: t.max_count,
            quota_percent: t.quota_percent,
            min_total_other_branches: t.min_total_other_branches,
            sockets: t
                .sockets
                .iter()
                .map(|s| SocketEntry {
                    position: s.position.to_array(),
                    rotation: s.rotation_degrees.to_array(),
                    options: s
                        .options
                        .iter()
                        .map(|o| OptionEntry {
                            template: name_of(o.template),
                            percent: o.weight,
                        })
                        .collect(),
                })
                .collect(),
            mesh_variants: t.mesh_variants.clone(),
        }
    }

    fn to_template(&self) -> BranchTemplate {
        BranchTemplate {
            name: self.name.clone(),
            radius: self.radius,
            height: self.height,
            layer: self.layer,
            obstacle_layers: self.obstacle_layers,
            surface_layers: self.surface_layers,
            surface_distance: self.surface_distance,
            max_pivot_angle: self.max_pivot_angle,
            max_roll_angle: self.max_roll_angle,
            vertical_bias: self.vertical_bias,
            face_upwards: self.face_upwards,
            depth_min: self.depth_min,
            depth_max: self.depth_max,
            max_count: self.max_count,
            quota_percent: self.quota_percent,
            min_total_other_branches: self.min_total_other_branches,
            // Sockets are wired once every template has an id
            sockets: Vec::new(),
            mesh_variants: self.mesh_variants.clone(),
        }
    }
}

impl CatalogFile {
    /// Capture a catalog and its species in file form.
    pub fn from_catalog(catalog: &TemplateCatalog, species: &[PlantSpecies]) -> Self {
        let templates = catalog
            .ids()
            .map(|id| TemplateEntry::from_template(&catalog[id], catalog))
            .collect();
        let species = species
            .iter()
            .filter_map(|s| {
                let root = catalog.get(s.root?)?;
                Some(SpeciesEntry {
                    name: s.name.clone(),
                    root: root.name.clone(),
                    max_total_branches: s.max_total_branches,
                })
            })
            .collect();
        Self {
            version: CATALOG_FILE_VERSION,
            templates,
            species,
        }
    }

    /// Build the catalog and species, resolving template names.
    pub fn resolve(&self) -> Result<(TemplateCatalog, Vec<PlantSpecies>)> {
        if self.version > CATALOG_FILE_VERSION {
            log::warn!(
                "Catalog file version {} is newer than supported version {}",
                self.version,
                CATALOG_FILE_VERSION
            );
        }

        let mut catalog = TemplateCatalog::new();
        for entry in &self.templates {
            catalog.add(entry.to_template())?;
        }

        for entry in &self.templates {
            let mut sockets = Vec::with_capacity(entry.sockets.len());
            for socket in &entry.sockets {
                let mut spec = SocketSpec::new(
                    Vec3::from_array(socket.position),
                    Vec3::from_array(socket.rotation),
                );
                for option in &socket.options {
                    let target = catalog.find(&option.template).ok_or_else(|| {
                        Error::UnknownTemplate(format!(
                            "'{}' socket option names '{}'",
                            entry.name, option.template
                        ))
                    })?;
                    spec = spec.with_option(target, option.percent);
                }
                sockets.push(spec);
            }

            let id = catalog
                .find(&entry.name)
                .ok_or_else(|| Error::UnknownTemplate(entry.name.clone()))?;
            if let Some(template) = catalog.get_mut(id) {
                template.sockets = sockets;
            }
        }

        catalog.validate()?;

        let species = self
            .species
            .iter()
            .map(|s| {
                let root = catalog
                    .find(&s.root)
                    .ok_or_else(|| Error::UnknownTemplate(format!("species '{}' root '{}'", s.name, s.root)))?;
                Ok(PlantSpecies {
                    name: s.name.clone(),
                    root: Some(root),
                    max_total_branches: s.max_total_branches,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        log::info!(
            "Resolved catalog with {} templates and {} species",
            catalog.len(),
            species.len()
        );

        Ok((catalog, species))
    }

    /// Save to file (sync)
    pub fn save_sync(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from file (sync)
    pub fn load_sync(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}
