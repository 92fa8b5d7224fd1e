//! Growing plants to completion, one at a time or many in parallel

use rayon::prelude::*;

use crate::core::Result;

use super::instantiate::GrowthEnvironment;
use super::plant::Plant;

/// Tick `plant` until it stops growing or `max_ticks` run out.
///
/// Starts a fresh run first unless the plant is already growing. Returns
/// the number of ticks used.
pub fn grow_to_completion<E: GrowthEnvironment + ?Sized>(
    plant: &mut Plant,
    env: &mut E,
    max_ticks: usize,
) -> Result<usize> {
    if !plant.is_growing() {
        plant.restart(env)?;
    }

    let mut ticks = 0;
    while plant.is_growing() && ticks < max_ticks {
        plant.tick(env);
        ticks += 1;
    }

    if plant.is_growing() {
        log::warn!(
            "Plant {} still growing after {} ticks ({} branches)",
            plant.id().0,
            ticks,
            plant.branch_count()
        );
    }
    Ok(ticks)
}

/// Grow independent plants in parallel, each in its own environment.
///
/// Results come back in input order. A plant whose setup is broken keeps
/// its `MissingData` state and reports zero ticks.
pub fn grow_batch<E>(jobs: Vec<(Plant, E)>, max_ticks: usize) -> Vec<(Plant, E, usize)>
where
    E: GrowthEnvironment + Send,
{
    let start = std::time::Instant::now();
    let results: Vec<_> = jobs
        .into_par_iter()
        .map(|(mut plant, mut env)| {
            let ticks = match grow_to_completion(&mut plant, &mut env, max_ticks) {
                Ok(ticks) => ticks,
                Err(e) => {
                    log::error!("Plant {} failed to start: {}", plant.id().0, e);
                    0
                }
            };
            (plant, env, ticks)
        })
        .collect();

    log::info!(
        "Grew {} plants in {:.1}ms",
        results.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    results
}
