//! Grow plants from a catalog and dump their reports as JSON.
//!
//! Usage:
//!   cargo run --release --bin grow_plant -- --species shrub --seed 7 --count 8
//!   cargo run --release --bin grow_plant -- --catalog plants.json --species fern --output ferns.json
//!
//! Without `--catalog` the built-in demo catalog is used. Each plant grows
//! alone on a flat ground slab; plants whose root needs a surface are laid
//! along the ground instead of standing up.

use std::f32::consts::FRAC_PI_2;
use std::path::PathBuf;
use std::sync::Arc;

use glam::{Quat, Vec3};

use rktri_grow::catalog::{demo, CatalogFile, PlantSpecies, TemplateCatalog};
use rktri_grow::core::{logging, Error, Result};
use rktri_grow::growth::{grow_batch, Plant, PlantConfig, PlantReport};
use rktri_grow::math::Pose;
use rktri_grow::scene::GrowthScene;

const GROUND_HALF_EXTENT: f32 = 50.0;

struct Args {
    catalog: Option<PathBuf>,
    species: String,
    seed: u64,
    count: usize,
    max_ticks: usize,
    output: Option<PathBuf>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();

    let value = |flag: &str| {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .cloned()
    };

    Args {
        catalog: value("--catalog").map(PathBuf::from),
        species: value("--species").unwrap_or_else(|| String::from("shrub")),
        seed: value("--seed").and_then(|s| s.parse().ok()).unwrap_or(1),
        count: value("--count").and_then(|s| s.parse().ok()).unwrap_or(1),
        max_ticks: value("--max-ticks").and_then(|s| s.parse().ok()).unwrap_or(500),
        output: value("--output").map(PathBuf::from),
    }
}

fn load_catalog(path: Option<&PathBuf>) -> Result<(TemplateCatalog, Vec<PlantSpecies>)> {
    match path {
        Some(path) => {
            log::info!("Loading catalog from {:?}", path);
            CatalogFile::load_sync(path)?.resolve()
        }
        None => {
            log::info!("Using built-in demo catalog");
            demo::demo_catalog()
        }
    }
}

/// Upright on the ground, or lying flat for surface-hugging roots.
fn starting_pose(catalog: &TemplateCatalog, species: &PlantSpecies) -> Pose {
    let root = species.root.and_then(|id| catalog.get(id));
    match root {
        Some(t) if !t.surface_layers.is_empty() => Pose::new(
            Vec3::new(0.0, t.radius, 0.0),
            Quat::from_rotation_x(FRAC_PI_2),
        ),
        _ => Pose::default(),
    }
}

fn run(args: Args) -> Result<()> {
    let (catalog, all_species) = load_catalog(args.catalog.as_ref())?;
    let species = all_species
        .iter()
        .find(|s| s.name == args.species)
        .cloned()
        .ok_or_else(|| {
            let known: Vec<&str> = all_species.iter().map(|s| s.name.as_str()).collect();
            Error::MissingData(format!(
                "species '{}' not in catalog (have: {})",
                args.species,
                known.join(", ")
            ))
        })?;

    let pose = starting_pose(&catalog, &species);
    let catalog = Arc::new(catalog);

    log::info!(
        "Growing {} '{}' plant(s) from seed {}",
        args.count,
        species.name,
        args.seed
    );

    let jobs: Vec<_> = (0..args.count as u64)
        .map(|i| {
            let config = PlantConfig::new(species.clone(), args.seed + i);
            let plant = Plant::new(Arc::clone(&catalog), config).with_pose(pose);
            let scene = GrowthScene::new().with_ground(GROUND_HALF_EXTENT, 0.0);
            (plant, scene)
        })
        .collect();

    let results = grow_batch(jobs, args.max_ticks);

    let mut reports: Vec<PlantReport> = Vec::with_capacity(results.len());
    for (plant, _scene, ticks) in &results {
        let report = plant.report();
        log::info!(
            "seed {}: {} branches in {} ticks, {:?} ({:?}), difficulty {:.2}",
            report.seed,
            report.branch_count(),
            ticks,
            report.state,
            report.stop_reason,
            report.difficulty
        );
        reports.push(report);
    }

    let json = serde_json::to_string_pretty(&reports)?;
    match args.output {
        Some(path) => {
            std::fs::write(&path, json)?;
            log::info!("Wrote {} report(s) to {:?}", reports.len(), path);
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn main() {
    logging::init();

    if let Err(e) = run(parse_args()) {
        log::error!("grow_plant failed: {}", e);
        std::process::exit(1);
    }
}
