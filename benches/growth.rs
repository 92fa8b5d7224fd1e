use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, black_box};
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use rktri_grow::catalog::{demo, PlantSpecies, TemplateCatalog};
use rktri_grow::growth::{grow_batch, grow_to_completion, pick_weighted_index, Plant, PlantConfig};
use rktri_grow::scene::GrowthScene;
use rktri_grow::world::LayerId;

fn shrub() -> (Arc<TemplateCatalog>, PlantSpecies) {
    let (catalog, species) = demo::demo_catalog().expect("demo catalog");
    let shrub = species
        .into_iter()
        .find(|s| s.name == "shrub")
        .expect("shrub species");
    (Arc::new(catalog), shrub)
}

/// Ground plus `count` rocks scattered around the plant's base.
fn crowded_scene(count: usize) -> GrowthScene {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let mut scene = GrowthScene::new().with_ground(20.0, 0.0);
    for i in 0..count {
        let center = Vec3::new(
            rng.gen_range(-2.5..2.5),
            rng.gen_range(0.5..4.0),
            rng.gen_range(-2.5..2.5),
        );
        // Keep the trunk's first segment clear
        if center.x.abs() < 0.3 && center.z.abs() < 0.3 {
            continue;
        }
        scene.add_sphere(format!("rock_{i}"), center, rng.gen_range(0.1..0.4), LayerId::DEFAULT);
    }
    scene
}

fn bench_grow_open(c: &mut Criterion) {
    let (catalog, species) = shrub();

    c.bench_function("grow_shrub_open", |b| {
        b.iter_batched(
            || {
                let plant = Plant::new(Arc::clone(&catalog), PlantConfig::new(species.clone(), 7));
                (plant, GrowthScene::new().with_ground(20.0, 0.0))
            },
            |(mut plant, mut scene)| {
                grow_to_completion(&mut plant, &mut scene, 500).expect("grow");
                black_box(plant.branch_count())
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_grow_crowded(c: &mut Criterion) {
    let (catalog, species) = shrub();

    c.bench_function("grow_shrub_crowded_200", |b| {
        b.iter_batched(
            || {
                let plant = Plant::new(Arc::clone(&catalog), PlantConfig::new(species.clone(), 7));
                (plant, crowded_scene(200))
            },
            |(mut plant, mut scene)| {
                grow_to_completion(&mut plant, &mut scene, 500).expect("grow");
                black_box(plant.branch_count())
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_grow_batch(c: &mut Criterion) {
    let (catalog, species) = shrub();

    c.bench_function("grow_batch_16_shrubs", |b| {
        b.iter_batched(
            || {
                (0..16u64)
                    .map(|seed| {
                        let config = PlantConfig::new(species.clone(), seed);
                        let plant = Plant::new(Arc::clone(&catalog), config);
                        (plant, GrowthScene::new().with_ground(20.0, 0.0))
                    })
                    .collect::<Vec<_>>()
            },
            |jobs| black_box(grow_batch(jobs, 500).len()),
            BatchSize::SmallInput,
        );
    });
}

fn bench_weighted_pick(c: &mut Criterion) {
    let weights: Vec<f32> = (1..=32).map(|w| w as f32).collect();

    c.bench_function("pick_weighted_index_32", |b| {
        let mut draw = 0.0f32;
        b.iter(|| {
            draw = (draw + 0.137) % 1.0;
            pick_weighted_index(black_box(weights.iter().copied()), draw)
        });
    });
}

criterion_group!(
    benches,
    bench_grow_open,
    bench_grow_crowded,
    bench_grow_batch,
    bench_weighted_pick,
);
criterion_main!(benches);
