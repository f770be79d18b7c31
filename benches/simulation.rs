//! Performance benchmarks for foragers

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use foragers::agent::{Agent, MutationKind};
use foragers::arena::Cell;
use foragers::food::FoodField;
use foragers::foraging::{self, PriorityOrder};
use foragers::{Config, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn bench_config(population: usize) -> Config {
    let mut config = Config::default();
    config.agents.initial_population = population;
    config.day.days_total = 1000;
    config
}

fn benchmark_world_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("world_tick");

    for population in [50, 200, 500].iter() {
        let mut world = World::new_with_seed(bench_config(*population), 42).unwrap();

        group.bench_with_input(
            BenchmarkId::new("population", population),
            population,
            |b, _| {
                b.iter(|| {
                    if world.advance_tick().day_complete {
                        world.advance_day_boundary();
                    }
                    if !world.is_running() {
                        world.reset();
                    }
                });
            },
        );
    }

    group.finish();
}

fn benchmark_full_day(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_day");

    for (name, config) in [
        ("base", bench_config(200)),
        ("predators", {
            let mut config = Config::predator_variant();
            config.agents.initial_population = 200;
            config.predators.purge_frequency = 1;
            config
        }),
    ] {
        group.bench_function(name, |b| {
            b.iter_batched(
                || World::new_with_seed(config.clone(), 7).unwrap(),
                |mut world| black_box(world.run_day()),
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn benchmark_foraging(c: &mut Criterion) {
    let config = Config::default();
    let bounds = config.arena.bounds();
    let cells: Vec<Cell> = bounds.interior_cells().take(100).collect();

    // Four contenders of mixed kinds on each of 100 food cells
    let agents: Vec<Agent> = (0..400u64)
        .map(|i| {
            let kind = MutationKind::ALL[(i % 3) as usize];
            let at = cells[(i % 100) as usize];
            let mut agent = Agent::new(i, kind, Cell::new(bounds.left, at.y), &config);
            agent.position = at;
            agent.at_home = false;
            agent.has_left_home = true;
            agent
        })
        .collect();
    let order = PriorityOrder::default();
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    c.bench_function("foraging_resolve_400", |b| {
        b.iter_batched(
            || (agents.clone(), FoodField::from_cells(cells.iter().copied())),
            |(mut agents, mut food)| {
                black_box(foraging::resolve(&mut agents, &mut food, &order, &config, &mut rng))
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

fn benchmark_food_generation(c: &mut Criterion) {
    let config = Config::default();
    let bounds = config.arena.bounds();
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    c.bench_function("food_generate", |b| {
        b.iter(|| FoodField::generate(black_box(&bounds), config.food.percent, &mut rng));
    });
}

criterion_group!(
    benches,
    benchmark_world_tick,
    benchmark_full_day,
    benchmark_foraging,
    benchmark_food_generation,
);
criterion_main!(benches);
