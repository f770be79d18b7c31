//! World simulation engine - the day/tick loop.
//!
//! A tick runs, in order: agent movement, predator hunting and contacts,
//! foraging, then the home-return rules. The day boundary resolves
//! survival and reproduction, resets the survivors and lays out new food.

use crate::agent::{Agent, AgentId, DeathCause, Hit, MutationKind};
use crate::arena::{Bounds, Cell};
use crate::config::{Config, ConfigError};
use crate::evolution::EvolutionEngine;
use crate::food::FoodField;
use crate::foraging::{self, Meal};
use crate::predator::{self, Contact, Predator};
use crate::stats::{DayRecord, History, KindCounts, LiveStats};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Where the run stands
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationStatus {
    Running,
    /// Nobody survived a day
    Collapsed,
    /// Every configured day was simulated
    Completed,
    /// Stopped from outside; the in-progress day was discarded
    Stopped,
}

/// An agent that died, with where it fell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathEvent {
    pub agent: AgentId,
    pub kind: MutationKind,
    pub position: Cell,
    pub cause: DeathCause,
}

impl DeathEvent {
    fn of(agent: &Agent, cause: DeathCause) -> Self {
        Self {
            agent: agent.id,
            kind: agent.kind,
            position: agent.position,
            cause,
        }
    }
}

/// What one tick did
#[derive(Clone, Debug, Default)]
pub struct TickOutcome {
    pub day: u32,
    /// Tick index within the day that was just run
    pub tick: u32,
    /// Agents that died this tick (starved or killed)
    pub deaths: Vec<DeathEvent>,
    pub meals: Vec<Meal>,
    pub contacts: Vec<Contact>,
    pub predators_spawned: usize,
    /// The day's ticks are used up; call `advance_day_boundary`
    pub day_complete: bool,
}

/// What a day boundary did
#[derive(Clone, Debug, Default)]
pub struct DayOutcome {
    /// The day that was resolved
    pub day: u32,
    /// Population entering the next day
    pub population: usize,
    pub kinds: KindCounts,
    /// Predator kills during the day, by victim kind
    pub kills: KindCounts,
    pub survivors: usize,
    pub births: usize,
    /// Agents that failed the end-of-day test (mid-day deaths excluded)
    pub deaths: Vec<DeathEvent>,
    pub population_collapsed: bool,
    /// No further days will run
    pub finished: bool,
}

/// The simulation world
pub struct World {
    // Population
    pub agents: Vec<Agent>,
    pub predators: Vec<Predator>,

    // Environment
    pub food: FoodField,
    bounds: Bounds,

    // State
    pub day: u32,
    pub tick: u32,
    status: SimulationStatus,

    // Configuration
    pub config: Config,

    // Statistics
    history: History,
    purge_today: bool,
    kills_today: KindCounts,
    starved_today: usize,

    // Evolution
    evolution: EvolutionEngine,

    // ID generation
    next_agent_id: AgentId,

    // Random number generator (seeded for reproducibility)
    rng: ChaCha8Rng,
    seed: u64,
}

impl World {
    /// Create a new world with the given configuration
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let seed = rand::thread_rng().gen();
        Self::new_with_seed(config, seed)
    }

    /// Create a new world with a specific seed for reproducibility
    pub fn new_with_seed(config: Config, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut world = Self {
            agents: Vec::new(),
            predators: Vec::new(),
            food: FoodField::default(),
            bounds: config.arena.bounds(),
            day: 1,
            tick: 0,
            status: SimulationStatus::Running,
            evolution: EvolutionEngine::from_config(&config),
            config,
            history: History::new(),
            purge_today: false,
            kills_today: KindCounts::default(),
            starved_today: 0,
            next_agent_id: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        };
        world.initialize();

        Ok(world)
    }

    /// Back to day 1, tick 0 with a fresh cohort and food field. The random
    /// stream restarts from the seed, so a reset replays the same run.
    pub fn initialize(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.history.clear();
        self.day = 1;
        self.tick = 0;
        self.status = SimulationStatus::Running;
        self.next_agent_id = 0;
        self.predators.clear();
        self.reset_day_counters();

        let count = self.config.agents.initial_population;
        let mut agents = Vec::with_capacity(count);
        for _ in 0..count {
            let home = self.bounds.random_border_cell(&mut self.rng);
            let id = self.next_id();
            agents.push(Agent::new(id, MutationKind::Normal, home, &self.config));
        }
        self.agents = agents;
        self.food = FoodField::generate(&self.bounds, self.config.food.percent, &mut self.rng);

        self.history.record(DayRecord {
            day: 0,
            population: self.agents.len(),
            kinds: KindCounts::from_agents(&self.agents),
            food_available: self.food.placed(),
            ..DayRecord::default()
        });

        log::debug!(
            "world initialized: seed={} population={} food={}",
            self.seed,
            self.agents.len(),
            self.food.len()
        );
    }

    /// Restart from day 1 with the same configuration
    pub fn reset(&mut self) {
        log::info!("simulation reset (seed {})", self.seed);
        self.initialize();
    }

    /// Abandon the run. The in-progress day is discarded; recorded history
    /// is kept. `initialize` starts over.
    pub fn stop(&mut self) {
        if self.status == SimulationStatus::Running {
            log::info!("simulation stopped on day {} tick {}", self.day, self.tick);
        }
        self.status = SimulationStatus::Stopped;
        self.agents.clear();
        self.predators.clear();
        self.food = FoodField::default();
        self.tick = 0;
        self.reset_day_counters();
    }

    /// One movement/foraging/transition pass
    pub fn advance_tick(&mut self) -> TickOutcome {
        let mut outcome = TickOutcome {
            day: self.day,
            tick: self.tick,
            ..TickOutcome::default()
        };

        if self.status != SimulationStatus::Running {
            return outcome;
        }
        if self.day_complete() {
            outcome.day_complete = true;
            return outcome;
        }

        // Phase 0: purge-day spawn
        if self.tick == 0 && self.config.predators.is_purge_day(self.day) {
            self.predators = predator::spawn(&self.bounds, &self.config.predators, &mut self.rng);
            self.purge_today = true;
            outcome.predators_spawned = self.predators.len();
            log::info!("purge on day {}: {} predators", self.day, self.predators.len());
        }

        // Phase 1: agents move, evading predators where they are now
        let threats: Vec<Cell> = self.predators.iter().map(|p| p.position).collect();
        for agent in &mut self.agents {
            agent.advance(&self.bounds, &threats, &self.config, &mut self.rng);
        }

        // Phase 2: predators hunt, then strike
        if !self.predators.is_empty() {
            for agent in &mut self.agents {
                agent.tick_invulnerability();
            }
            for predator in &mut self.predators {
                predator.hunt(&self.bounds, &self.agents, &mut self.rng);
            }

            let contacts = predator::resolve_contacts(
                &mut self.predators,
                &mut self.agents,
                &self.config.predators,
            );
            for contact in contacts.iter().filter(|c| c.hit == Hit::Killed) {
                self.kills_today.add(contact.kind);
                outcome.deaths.push(DeathEvent {
                    agent: contact.agent,
                    kind: contact.kind,
                    position: contact.position,
                    cause: DeathCause::Predation,
                });
            }
            outcome.contacts = contacts;
        }

        // Phase 3: foraging
        outcome.meals = foraging::resolve(
            &mut self.agents,
            &mut self.food,
            &self.config.policy.priority_order,
            &self.config,
            &mut self.rng,
        );

        // Phase 4: home-return rules
        for agent in &mut self.agents {
            if agent.settle() {
                self.starved_today += 1;
                outcome.deaths.push(DeathEvent::of(agent, DeathCause::Starvation));
            }
        }

        self.tick += 1;
        outcome.day_complete = self.day_complete();
        outcome
    }

    /// Resolve the day: survival, reproduction, reset and new food. Any
    /// ticks left in the day are run first.
    pub fn advance_day_boundary(&mut self) -> DayOutcome {
        if self.status != SimulationStatus::Running {
            return DayOutcome {
                day: self.day,
                population: self.population(),
                kinds: KindCounts::from_agents(&self.agents),
                population_collapsed: self.status == SimulationStatus::Collapsed,
                finished: true,
                ..DayOutcome::default()
            };
        }
        while !self.day_complete() {
            self.advance_tick();
        }

        let day = self.day;
        let mut deaths = Vec::new();
        let mut survivors = Vec::new();
        let mut offspring = Vec::new();

        for agent in std::mem::take(&mut self.agents) {
            if agent.survives_day() {
                if EvolutionEngine::can_reproduce(agent.times_eaten) {
                    let home = self.bounds.random_border_cell(&mut self.rng);
                    let child_id = self.next_id();
                    if let Some(child) =
                        self.evolution
                            .reproduce(&agent, child_id, home, &self.config, &mut self.rng)
                    {
                        offspring.push(child);
                    }
                }
                survivors.push(agent);
            } else if !agent.must_die {
                deaths.push(DeathEvent::of(&agent, DeathCause::Exposure));
            }
        }

        let survivor_count = survivors.len();
        let births = offspring.len();
        let food_available = self.food.placed();
        self.predators.clear();

        let mut population = survivors;
        population.extend(offspring);

        let mut record = DayRecord {
            day,
            population: population.len(),
            kinds: KindCounts::from_agents(&population),
            food_available,
            purge: self.purge_today,
            kills: self.kills_today,
            survivors: survivor_count,
            births,
            starved: self.starved_today,
            exposed: deaths.len(),
        };

        let collapsed = population.is_empty();
        if collapsed {
            record.kinds = KindCounts::default();
            self.status = SimulationStatus::Collapsed;
            self.food = FoodField::default();
            log::info!("population collapsed on day {}", day);
        } else {
            for agent in &mut population {
                let home = self.bounds.random_border_cell(&mut self.rng);
                agent.begin_day(home, &self.config);
            }
            self.food = FoodField::generate(&self.bounds, self.config.food.percent, &mut self.rng);
        }
        self.agents = population;

        log::debug!(
            "day {} resolved: population={} survivors={} births={} starved={} exposed={} kills={}",
            day,
            record.population,
            record.survivors,
            record.births,
            record.starved,
            record.exposed,
            record.kills.total()
        );

        let mut outcome = DayOutcome {
            day,
            population: record.population,
            kinds: record.kinds,
            kills: record.kills,
            survivors: survivor_count,
            births,
            deaths,
            population_collapsed: collapsed,
            finished: collapsed,
        };
        self.history.record(record);

        self.day += 1;
        self.tick = 0;
        self.reset_day_counters();

        if !collapsed && self.day > self.config.day.days_total {
            self.status = SimulationStatus::Completed;
            outcome.finished = true;
            log::info!("simulation completed after {} days", day);
        }
        outcome
    }

    /// Run the rest of the current day, boundary included
    pub fn run_day(&mut self) -> DayOutcome {
        while self.status == SimulationStatus::Running && !self.day_complete() {
            self.advance_tick();
        }
        self.advance_day_boundary()
    }

    /// Run up to `days` days; stops early when the run finishes
    pub fn run(&mut self, days: u32) -> Option<DayOutcome> {
        let mut last = None;
        for _ in 0..days {
            if !self.is_running() {
                break;
            }
            last = Some(self.run_day());
        }
        last
    }

    /// Run until the run finishes or the callback returns false
    pub fn run_with_callback<F>(&mut self, mut callback: F)
    where
        F: FnMut(&World, &DayOutcome) -> bool,
    {
        while self.is_running() {
            let outcome = self.run_day();
            if !callback(self, &outcome) {
                break;
            }
        }
    }

    /// Run every configured day
    pub fn run_to_end(&mut self) -> &History {
        while self.is_running() {
            self.run_day();
        }
        &self.history
    }

    #[inline]
    fn day_complete(&self) -> bool {
        self.tick >= self.config.day.duration
    }

    fn next_id(&mut self) -> AgentId {
        let id = self.next_agent_id;
        self.next_agent_id += 1;
        id
    }

    fn reset_day_counters(&mut self) {
        self.purge_today = false;
        self.kills_today = KindCounts::default();
        self.starved_today = 0;
    }

    /// Per-day log, oldest first
    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn status(&self) -> SimulationStatus {
        self.status
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.status == SimulationStatus::Running
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Living agents (mid-day casualties excluded)
    pub fn population(&self) -> usize {
        self.agents.iter().filter(|a| !a.must_die).count()
    }

    /// Counters for a statistics panel
    pub fn live_stats(&self) -> LiveStats {
        LiveStats {
            day: self.day,
            tick: self.tick,
            food_remaining: self.food.len(),
            predators: self.predators.len(),
            ..LiveStats::collect(&self.agents)
        }
    }

    /// Get seed for reproducibility
    pub fn seed(&self) -> u64 {
        self.seed
    }
}
