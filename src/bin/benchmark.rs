//! Benchmark/headless simulation runner
//!
//! Usage: `benchmark [population] [days] [seed]`

use foragers::config::Config;
use foragers::World;
use std::env;
use std::time::Instant;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    let population: usize = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(500);

    let days: u32 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(100);

    let seed: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(42);

    log::info!("=== foragers Benchmark ===");
    log::info!("Population: {}", population);
    log::info!("Days: {}", days);

    // Load and modify config
    let mut config = Config::from_file("config.yaml").unwrap_or_default();
    config.agents.initial_population = population;
    config.day.days_total = days;

    // Scale the arena so the initial cohort fits on the border
    let step = config.arena.step;
    let side = ((population as f64 / 4.0).ceil() as i32 + 1).max(config.arena.right / step);
    config.arena.right = config.arena.left + side * step;
    config.arena.bottom = config.arena.top + side * step;

    let mut world = World::new_with_seed(config, seed)?;
    log::info!(
        "World created: {} agents, {} food cells",
        world.population(),
        world.food.len()
    );

    let start = Instant::now();
    let mut ticks: u64 = 0;

    while world.is_running() {
        while !world.advance_tick().day_complete {
            ticks += 1;
        }
        ticks += 1;

        let day = world.advance_day_boundary();
        if day.day % 10 == 0 {
            let elapsed = start.elapsed().as_secs_f64();
            log::info!(
                "Day {}/{} - Pop: {} - N/S/P: {}/{}/{} - {:.0} ticks/s",
                day.day,
                days,
                day.population,
                day.kinds.normal,
                day.kinds.speed,
                day.kinds.priority,
                ticks as f64 / elapsed.max(f64::EPSILON)
            );
        }
    }

    let elapsed = start.elapsed();
    log::info!("=== Simulation Complete ===");
    log::info!("Total ticks: {}", ticks);
    log::info!("Final population: {}", world.population());
    log::info!("Elapsed time: {:.2}s", elapsed.as_secs_f64());
    log::info!(
        "Average speed: {:.0} ticks/s",
        ticks as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );
    if let Some(summary) = world.history().summary() {
        log::info!(
            "Population: initial {} final {} max {} min {}",
            summary.initial,
            summary.final_population,
            summary.max,
            summary.min
        );
    }

    if world.status() == foragers::SimulationStatus::Collapsed {
        log::warn!("Population collapsed after {} days", world.history().len() - 1);
    }

    Ok(())
}
