//! foragers - CLI Entry Point
//!
//! Headless host for the foraging simulation.

use clap::{Args, Parser, Subcommand};
use foragers::stats::KindCounts;
use foragers::{benchmark, Config, ConfigError, SimulationStatus, World};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "foragers")]
#[command(version)]
#[command(about = "Natural-selection simulator for foraging agents with mutations and predators")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a new simulation
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        #[command(flatten)]
        overrides: Overrides,

        /// Output directory for the history (CSV and JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Print live counters every N ticks (0 = day summaries only)
        #[arg(long, default_value = "0")]
        ticks: u32,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Run several seeds in parallel and compare outcomes
    Batch {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        #[command(flatten)]
        overrides: Overrides,

        /// Number of runs
        #[arg(short, long, default_value = "8")]
        runs: u64,

        /// First seed; run i uses seed + i
        #[arg(long, default_value = "0")]
        seed: u64,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of days
        #[arg(short, long, default_value = "30")]
        days: u32,

        /// Population size
        #[arg(short, long, default_value = "200")]
        population: usize,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,

        /// Write the predator ruleset instead of the base one
        #[arg(long)]
        predators: bool,
    },
}

/// Command-line overrides on top of the config file
#[derive(Args, Debug, Default)]
struct Overrides {
    /// Days to simulate
    #[arg(long)]
    days: Option<u32>,

    /// Moves per agent per day
    #[arg(long)]
    steps: Option<u32>,

    /// Ticks per day
    #[arg(long)]
    duration: Option<u32>,

    /// Food as a percentage of interior cells (1-90)
    #[arg(long)]
    food: Option<u32>,

    /// Initial population
    #[arg(long)]
    population: Option<usize>,

    /// Predators per purge day
    #[arg(long)]
    predators: Option<usize>,

    /// Days between purges
    #[arg(long = "purge-every")]
    purge_every: Option<u32>,
}

impl Overrides {
    fn apply(&self, config: &mut Config) {
        if let Some(days) = self.days {
            config.day.days_total = days;
        }
        if let Some(steps) = self.steps {
            config.day.steps_per_life = steps;
        }
        if let Some(duration) = self.duration {
            config.day.duration = duration;
        }
        if let Some(food) = self.food {
            config.food.percent = food;
        }
        if let Some(population) = self.population {
            config.agents.initial_population = population;
        }
        if let Some(predators) = self.predators {
            config.predators.count = predators;
        }
        if let Some(every) = self.purge_every {
            config.predators.purge_frequency = every;
        }
        // Predators only come with the stamina ruleset
        if self.predators.is_some() || self.purge_every.is_some() {
            config.stamina.enabled = config.predators.purges_enabled();
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            overrides,
            output,
            seed,
            ticks,
            quiet,
        } => {
            let config = load_config(&config, &overrides)?;
            init_logging(&config.logging.level);
            run_simulation(config, output, seed, ticks, quiet)
        }

        Commands::Batch {
            config,
            overrides,
            runs,
            seed,
        } => {
            let config = load_config(&config, &overrides)?;
            init_logging(&config.logging.level);
            run_batch(config, runs, seed)
        }

        Commands::Benchmark { days, population } => {
            init_logging("info");
            run_benchmark(days, population)
        }

        Commands::Init { output, predators } => {
            init_logging("info");
            generate_config(output, predators)
        }
    }
}

fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_config(path: &Path, overrides: &Overrides) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if path.exists() {
        println!("Loading config from: {:?}", path);
        Config::from_file(path)?
    } else {
        println!("Using default configuration");
        Config::default()
    };
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

fn run_simulation(
    config: Config,
    output: Option<PathBuf>,
    seed: Option<u64>,
    ticks: u32,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Create world
    let mut world = match seed {
        Some(s) => World::new_with_seed(config.clone(), s)?,
        None => World::new(config.clone())?,
    };

    println!("Starting simulation");
    println!("  Seed: {}", world.seed());
    println!("  Initial population: {}", world.population());
    println!(
        "  Arena: {}x{} cells, {} food",
        world.bounds().columns(),
        world.bounds().rows(),
        world.food.len()
    );
    println!("  Days: {}", config.day.days_total);
    if config.predators.purges_enabled() {
        println!(
            "  Purge: {} predators every {} days",
            config.predators.count, config.predators.purge_frequency
        );
    }
    println!();

    let start = Instant::now();

    while world.is_running() {
        // Tick loop
        loop {
            let outcome = world.advance_tick();
            if !quiet && ticks > 0 && world.tick % ticks == 0 {
                println!("{}", world.live_stats().summary());
            }
            if outcome.day_complete {
                break;
            }
        }

        let day = world.advance_day_boundary();
        if !quiet {
            println!(
                "Day {:4} | Pop: {:5} | N/S/P: {}/{}/{} | Survived: {:5} | Born: {:5} | Killed: {}",
                day.day,
                day.population,
                day.kinds.normal,
                day.kinds.speed,
                day.kinds.priority,
                day.survivors,
                day.births,
                day.kills.total()
            );
        }
        if day.population_collapsed {
            println!("\nPopulation collapsed on day {}", day.day);
        }
    }

    let elapsed = start.elapsed();

    println!();
    if let Some(summary) = world.history().summary() {
        print!("{}", summary);
    }
    let kills = world.history().total_kills();
    if kills.total() > 0 {
        println!(
            "Predator kills (N/S/P): {}/{}/{}",
            kills.normal, kills.speed, kills.priority
        );
    }
    println!("Time: {:.2}s", elapsed.as_secs_f64());

    if let Some(output) = output {
        std::fs::create_dir_all(&output)?;

        let csv_path = output.join("history.csv");
        world.history().write_csv(&csv_path)?;
        println!("History CSV: {:?}", csv_path);

        let json_path = output.join("history.json");
        world.history().save_json(&json_path)?;
        println!("History JSON: {:?}", json_path);
    }

    Ok(())
}

/// Outcome of one batch run
struct BatchRun {
    seed: u64,
    status: SimulationStatus,
    days: u32,
    final_population: usize,
    max_population: usize,
    kinds: KindCounts,
}

fn run_batch(config: Config, runs: u64, base_seed: u64) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Batch: {} runs ===", runs);
    let start = Instant::now();

    let results: Vec<BatchRun> = (0..runs)
        .into_par_iter()
        .map(|i| -> Result<BatchRun, ConfigError> {
            let seed = base_seed + i;
            let mut world = World::new_with_seed(config.clone(), seed)?;
            world.run_to_end();

            let history = world.history();
            let summary = history.summary();
            Ok(BatchRun {
                seed,
                status: world.status(),
                days: summary.map_or(0, |s| s.days),
                final_population: summary.map_or(0, |s| s.final_population),
                max_population: summary.map_or(0, |s| s.max),
                kinds: history.last().map(|r| r.kinds).unwrap_or_default(),
            })
        })
        .collect::<Result<_, _>>()?;

    for run in &results {
        println!(
            "Seed {:6} | {:9} | Days: {:4} | Final: {:5} | Max: {:5} | N/S/P: {}/{}/{}",
            run.seed,
            format!("{:?}", run.status),
            run.days,
            run.final_population,
            run.max_population,
            run.kinds.normal,
            run.kinds.speed,
            run.kinds.priority
        );
    }

    let completed = results
        .iter()
        .filter(|r| r.status == SimulationStatus::Completed)
        .count();
    println!();
    println!("Completed: {}/{}", completed, results.len());
    println!("Time: {:.2}s", start.elapsed().as_secs_f64());

    Ok(())
}

fn run_benchmark(days: u32, population: usize) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== foragers Benchmark ===");
    println!("Days: {}", days);
    println!("Population: {}", population);
    println!();

    let result = benchmark(days, population)?;
    println!("{}", result);

    Ok(())
}

fn generate_config(output: PathBuf, predators: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = if predators {
        Config::predator_variant()
    } else {
        Config::default()
    };
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}
