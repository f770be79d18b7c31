//! # foragers
//!
//! Day/life natural-selection simulator for foraging agents.
//!
//! ## Features
//!
//! - **Grid arena**: agents spawn on the border, food sits inside
//! - **Selection**: eat and get home before the move budget runs out, or die
//! - **Mutations**: speed and priority mutants with heritable kinds
//! - **Predators**: optional purge days with pursuit, evasion and two-life damage
//! - **Configurable**: YAML configuration files
//! - **Reproducible**: Seeded random number generation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use foragers::{Config, World};
//!
//! // Create world with default config
//! let config = Config::default();
//! let mut world = World::new(config).unwrap();
//!
//! // Run simulation
//! world.run(10);
//!
//! // Check results
//! println!("Population: {}", world.population());
//! if let Some(summary) = world.history().summary() {
//!     println!("{}", summary);
//! }
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use foragers::Config;
//!
//! let mut config = Config::default();
//! config.agents.initial_population = 80;
//! config.food.percent = 30;
//! assert!(config.validate().is_ok());
//!
//! let predators = Config::predator_variant();
//! assert!(predators.predators.purges_enabled());
//! ```
//!
//! ## Driving ticks by hand
//!
//! ```rust
//! use foragers::{Config, World};
//!
//! let mut world = World::new_with_seed(Config::default(), 7).unwrap();
//! while !world.advance_tick().day_complete {}
//! let day = world.advance_day_boundary();
//! assert_eq!(day.day, 1);
//! assert_eq!(world.history().len(), 2);
//! ```

pub mod agent;
pub mod arena;
pub mod config;
pub mod evolution;
pub mod food;
pub mod foraging;
pub mod predator;
pub mod stats;
pub mod world;

// Re-export main types
pub use agent::{Agent, MutationKind};
pub use config::{Config, ConfigError};
pub use stats::History;
pub use world::{SimulationStatus, World};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a quick benchmark
pub fn benchmark(days: u32, population: usize) -> Result<BenchmarkResult, ConfigError> {
    use std::time::Instant;

    let mut config = Config::default();
    config.day.days_total = days;
    config.agents.initial_population = population;

    let mut world = World::new(config)?;

    let start = Instant::now();
    world.run(days);
    let elapsed = start.elapsed();

    let days_run = (world.history().len() - 1) as u32;
    let ticks = days_run as u64 * world.config.day.duration as u64;
    Ok(BenchmarkResult {
        days: days_run,
        initial_population: population,
        final_population: world.population(),
        elapsed_secs: elapsed.as_secs_f64(),
        ticks_per_second: ticks as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
        status: world.status(),
    })
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub days: u32,
    pub initial_population: usize,
    pub final_population: usize,
    pub elapsed_secs: f64,
    pub ticks_per_second: f64,
    pub status: SimulationStatus,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Days: {}", self.days)?;
        writeln!(f, "Population: {} -> {}", self.initial_population, self.final_population)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} ticks/s", self.ticks_per_second)?;
        writeln!(f, "Status: {:?}", self.status)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_quick_simulation() {
        let config = Config::default();
        let mut world = World::new_with_seed(config, 1).unwrap();

        world.run(3);

        assert!(world.history().len() >= 2);
        assert!(world.history().len() <= 4);
    }

    #[test]
    fn test_benchmark() {
        let result = benchmark(3, 30).unwrap();

        assert!(result.days >= 1 && result.days <= 3);
        assert!(result.ticks_per_second > 0.0);
    }

    #[test]
    fn test_benchmark_rejects_empty_population() {
        assert!(benchmark(3, 0).is_err());
    }
}
