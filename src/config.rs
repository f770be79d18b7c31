//! Configuration system for the foraging simulation.
//!
//! Supports YAML configuration files with sensible defaults. The defaults
//! describe the base ruleset (no stamina, no predators); see
//! [`Config::predator_variant`] for the full ruleset.

use crate::arena::Bounds;
use crate::foraging::PriorityOrder;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub arena: ArenaConfig,
    pub day: DayConfig,
    pub food: FoodConfig,
    pub agents: AgentConfig,
    #[serde(default)]
    pub stamina: StaminaConfig,
    #[serde(default)]
    pub predators: PredatorConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Arena geometry, in arena units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaConfig {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
    /// Grid step; every position is a multiple of it away from `left`/`top`
    pub step: i32,
}

/// Day/life timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayConfig {
    /// Number of days to simulate
    pub days_total: u32,
    /// Move budget each agent gets per day
    pub steps_per_life: u32,
    /// Ticks per day; must exceed `steps_per_life`
    pub duration: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodConfig {
    /// Percentage of interior cells holding food (1-90)
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Size of the initial (all normal) cohort
    pub initial_population: usize,
    /// Manhattan radius, in cells, at which an agent notices a predator
    pub vision_radius: u32,
}

/// Stamina-modulated speed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaminaConfig {
    pub enabled: bool,
    pub max: f32,
    /// Drained per sub-step taken outside home
    pub drain_per_step: f32,
    /// Restored on every meal, capped at `max`
    pub recharge: f32,
}

/// Predator purges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredatorConfig {
    /// Predators spawned on each purge day
    pub count: usize,
    /// Purge on days where `day % purge_frequency == 0`; 0 disables purges
    pub purge_frequency: u32,
    /// Cells covered per tick
    pub speed: u32,
    /// Manhattan radius, in cells, for target acquisition
    pub vision_radius: u32,
    /// Euclidean contact distance, in arena units
    pub collision_radius: f32,
    /// Ticks of immunity after a non-lethal hit
    pub invulnerability_ticks: u32,
}

/// Policies the observed rule variants disagree on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Foraging rank, highest first
    pub priority_order: PriorityOrder,
    /// Chance a mutant parent passes its mutation to a mutant-candidate child
    pub inheritance_keep_probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
}

/// Errors raised while building or loading a configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("day duration ({duration}) must be greater than steps per life ({steps_per_life})")]
    DayTooShort { duration: u32, steps_per_life: u32 },
    #[error("steps per life must be at least 1")]
    NoSteps,
    #[error("days to simulate must be at least 1")]
    NoDays,
    #[error("food percentage must be within 1-90, got {0}")]
    FoodPercent(u32),
    #[error("initial population must be at least 1")]
    EmptyPopulation,
    #[error("invalid arena: {0}")]
    Arena(String),
    #[error("invalid stamina settings: {0}")]
    Stamina(String),
    #[error("invalid predator settings: {0}")]
    Predators(String),
    #[error("inheritance keep probability must be within 0-1, got {0}")]
    KeepProbability(f64),
    #[error("priority order must rank every mutation kind exactly once")]
    PriorityOrder,
    #[error("failed to read or write config: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            arena: ArenaConfig::default(),
            day: DayConfig::default(),
            food: FoodConfig::default(),
            agents: AgentConfig::default(),
            stamina: StaminaConfig::default(),
            predators: PredatorConfig::default(),
            policy: PolicyConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            left: 0,
            right: 600,
            top: 0,
            bottom: 540,
            step: 20,
        }
    }
}

impl Default for DayConfig {
    fn default() -> Self {
        Self {
            days_total: 30,
            steps_per_life: 100,
            duration: 300,
        }
    }
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self { percent: 20 }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            initial_population: 50,
            vision_radius: 3,
        }
    }
}

impl Default for StaminaConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max: 100.0,
            drain_per_step: 1.0,
            recharge: 40.0,
        }
    }
}

impl Default for PredatorConfig {
    fn default() -> Self {
        Self {
            count: 0,
            purge_frequency: 0,
            speed: 2,
            vision_radius: 6,
            collision_radius: 20.0,
            invulnerability_ticks: 10,
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            priority_order: PriorityOrder::default(),
            inheritance_keep_probability: 0.75,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl ArenaConfig {
    /// Grid bounds described by this section
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.left, self.right, self.top, self.bottom, self.step)
    }
}

impl PredatorConfig {
    /// Whether any predators can ever appear
    pub fn purges_enabled(&self) -> bool {
        self.count > 0 && self.purge_frequency > 0
    }

    /// Whether `day` is a purge day
    pub fn is_purge_day(&self, day: u32) -> bool {
        self.purges_enabled() && day % self.purge_frequency == 0
    }
}

impl Config {
    /// Build a validated configuration from the numeric parameters a
    /// configuration screen collects. Everything else keeps its default.
    pub fn configure(
        days_total: u32,
        steps_per_life: u32,
        day_duration: u32,
        food_percent: u32,
        initial_population: usize,
        num_predators: usize,
        purge_frequency: u32,
    ) -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.day.days_total = days_total;
        config.day.steps_per_life = steps_per_life;
        config.day.duration = day_duration;
        config.food.percent = food_percent;
        config.agents.initial_population = initial_population;
        config.predators.count = num_predators;
        config.predators.purge_frequency = purge_frequency;
        if config.predators.purges_enabled() {
            config.stamina.enabled = true;
        }
        config.validate()?;
        Ok(config)
    }

    /// Full ruleset: stamina plus a purge of two predators every third day,
    /// with the alternative 0.8 inheritance filter.
    pub fn predator_variant() -> Self {
        let mut config = Config::default();
        config.stamina.enabled = true;
        config.predators.count = 2;
        config.predators.purge_frequency = 3;
        config.policy.inheritance_keep_probability = 0.8;
        config
    }

    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values. Nothing is clamped here: a bad value
    /// is an error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.day.days_total == 0 {
            return Err(ConfigError::NoDays);
        }
        if self.day.steps_per_life == 0 {
            return Err(ConfigError::NoSteps);
        }
        if self.day.duration <= self.day.steps_per_life {
            return Err(ConfigError::DayTooShort {
                duration: self.day.duration,
                steps_per_life: self.day.steps_per_life,
            });
        }
        if !(1..=90).contains(&self.food.percent) {
            return Err(ConfigError::FoodPercent(self.food.percent));
        }
        if self.agents.initial_population == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        self.arena.bounds().check().map_err(ConfigError::Arena)?;

        let stamina = &self.stamina;
        if !(stamina.max > 0.0) {
            return Err(ConfigError::Stamina("max must be positive".to_string()));
        }
        if stamina.drain_per_step < 0.0 || stamina.recharge < 0.0 {
            return Err(ConfigError::Stamina(
                "drain and recharge cannot be negative".to_string(),
            ));
        }

        let predators = &self.predators;
        if predators.speed == 0 {
            return Err(ConfigError::Predators("speed must be at least 1".to_string()));
        }
        if !(predators.collision_radius >= 0.0) {
            return Err(ConfigError::Predators(
                "collision radius cannot be negative".to_string(),
            ));
        }

        let keep = self.policy.inheritance_keep_probability;
        if !(0.0..=1.0).contains(&keep) {
            return Err(ConfigError::KeepProbability(keep));
        }
        if !self.policy.priority_order.is_total() {
            return Err(ConfigError::PriorityOrder);
        }
        Ok(())
    }
}
