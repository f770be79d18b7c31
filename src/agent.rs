//! Agent structure, movement and the per-tick home-return rules.

use crate::arena::{Bounds, Cell, Direction};
use crate::config::Config;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique agent identifier
pub type AgentId = u64;

/// Heritable mutation carried by an agent
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    Normal,
    SpeedMutant,
    PriorityMutant,
}

/// Per-kind constants
struct KindTraits {
    base_speed: u32,
    life_cap: u8,
}

const NORMAL: KindTraits = KindTraits {
    base_speed: 1,
    life_cap: 1,
};
const SPEED_MUTANT: KindTraits = KindTraits {
    base_speed: 2,
    life_cap: 1,
};
const PRIORITY_MUTANT: KindTraits = KindTraits {
    base_speed: 1,
    life_cap: 2,
};

impl MutationKind {
    pub const ALL: [MutationKind; 3] = [
        MutationKind::Normal,
        MutationKind::SpeedMutant,
        MutationKind::PriorityMutant,
    ];

    /// The two kinds a heavy eater's offspring can mutate into
    pub const MUTANTS: [MutationKind; 2] = [MutationKind::SpeedMutant, MutationKind::PriorityMutant];

    fn traits(self) -> &'static KindTraits {
        match self {
            MutationKind::Normal => &NORMAL,
            MutationKind::SpeedMutant => &SPEED_MUTANT,
            MutationKind::PriorityMutant => &PRIORITY_MUTANT,
        }
    }

    /// Sub-steps per tick at full stamina
    #[inline]
    pub fn base_speed(self) -> u32 {
        self.traits().base_speed
    }

    /// Predator hits survivable minus one
    #[inline]
    pub fn life_cap(self) -> u8 {
        self.traits().life_cap
    }

    #[inline]
    pub fn is_mutant(self) -> bool {
        self != MutationKind::Normal
    }

    /// Position in [`MutationKind::ALL`], for per-kind counters
    #[inline]
    pub fn index(self) -> usize {
        match self {
            MutationKind::Normal => 0,
            MutationKind::SpeedMutant => 1,
            MutationKind::PriorityMutant => 2,
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MutationKind::Normal => "normal",
            MutationKind::SpeedMutant => "speed",
            MutationKind::PriorityMutant => "priority",
        };
        f.write_str(name)
    }
}

/// Cause of death tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Ran out of moves outside home
    Starvation,
    /// Lost its last life to a predator
    Predation,
    /// Failed the end-of-day test (did not eat, or did not make it home)
    Exposure,
}

/// Where an agent stands in its day, for renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayState {
    AtHome,
    Foraging,
    HomeSatisfied,
    Starved,
    Killed,
}

/// Outcome of a predator contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// Still inside the invulnerability window
    Shielded,
    Wounded,
    Killed,
}

/// A foraging agent
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Agent {
    // Identity
    pub id: AgentId,
    pub kind: MutationKind,

    // Position
    pub position: Cell,
    pub home: Cell,

    // Movement
    pub steps_remaining: u32,
    pub steps_per_life: u32,
    pub effective_speed: u32,
    pub stamina: f32,

    // Predator damage
    pub lives: u8,
    pub invulnerable_ticks: u32,

    // Per-day state
    pub active: bool,
    pub at_home: bool,
    pub has_left_home: bool,
    pub ate_today: bool,
    pub times_eaten: u32,
    pub must_die: bool,
    pub can_reproduce: bool,
    pub death_cause: Option<DeathCause>,

    /// Visited positions today, starting at home
    pub trajectory: Vec<Cell>,
}

impl Agent {
    /// Create an agent standing at `home`, ready for a new day
    pub fn new(id: AgentId, kind: MutationKind, home: Cell, config: &Config) -> Self {
        let mut agent = Self {
            id,
            kind,
            position: home,
            home,
            steps_remaining: 0,
            steps_per_life: config.day.steps_per_life,
            effective_speed: kind.base_speed(),
            stamina: config.stamina.max,
            lives: kind.life_cap(),
            invulnerable_ticks: 0,
            active: true,
            at_home: true,
            has_left_home: false,
            ate_today: false,
            times_eaten: 0,
            must_die: false,
            can_reproduce: false,
            death_cause: None,
            trajectory: Vec::new(),
        };
        agent.begin_day(home, config);
        agent
    }

    /// Reset everything day-scoped and place the agent at a new home
    pub fn begin_day(&mut self, home: Cell, config: &Config) {
        self.position = home;
        self.home = home;
        self.steps_per_life = config.day.steps_per_life;
        self.steps_remaining = self.steps_per_life;
        self.stamina = config.stamina.max;
        self.effective_speed = self.kind.base_speed();
        self.lives = self.kind.life_cap();
        self.invulnerable_ticks = 0;
        self.active = true;
        self.at_home = true;
        self.has_left_home = false;
        self.ate_today = false;
        self.times_eaten = 0;
        self.must_die = false;
        self.can_reproduce = false;
        self.death_cause = None;
        self.trajectory.clear();
        self.trajectory.push(home);
    }

    #[inline]
    pub fn base_speed(&self) -> u32 {
        self.kind.base_speed()
    }

    /// Take this tick's sub-steps. Evades the nearest threat within vision,
    /// otherwise wanders. Returns whether any sub-step was taken.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        bounds: &Bounds,
        threats: &[Cell],
        config: &Config,
        rng: &mut R,
    ) -> bool {
        if !self.active || self.steps_remaining == 0 {
            return false;
        }

        let sub_steps = if config.stamina.enabled {
            self.effective_speed
        } else {
            self.base_speed()
        };

        let mut moved = false;
        for _ in 0..sub_steps {
            if !self.active || self.steps_remaining == 0 {
                break;
            }

            let (dx, dy) = match self.nearest_threat(bounds, threats, config.agents.vision_radius) {
                Some(threat) => self.evasion(threat, rng),
                None => Direction::random(rng).unit(),
            };

            self.position = bounds.offset(self.position, dx, dy);
            self.steps_remaining -= 1;
            self.trajectory.push(self.position);
            moved = true;

            self.at_home = bounds.is_home(self.position);
            if !self.at_home {
                self.has_left_home = true;
                if config.stamina.enabled {
                    self.stamina = (self.stamina - config.stamina.drain_per_step).max(0.0);
                    self.recompute_speed(config);
                }
            }
        }

        moved
    }

    /// Closest threat within `radius` cells; first found wins ties
    fn nearest_threat(&self, bounds: &Bounds, threats: &[Cell], radius: u32) -> Option<Cell> {
        let mut best: Option<(u32, Cell)> = None;
        for &threat in threats {
            let distance = bounds.cell_distance(self.position, threat);
            if distance > radius {
                continue;
            }
            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, threat));
            }
        }
        best.map(|(_, cell)| cell)
    }

    /// Step away from `threat` along the axis with the larger gap
    fn evasion<R: Rng + ?Sized>(&self, threat: Cell, rng: &mut R) -> (i32, i32) {
        let dx = self.position.x - threat.x;
        let dy = self.position.y - threat.y;

        if dx.abs() >= dy.abs() {
            let sign = match dx.signum() {
                0 => {
                    if rng.gen::<bool>() {
                        1
                    } else {
                        -1
                    }
                }
                s => s,
            };
            (sign, 0)
        } else {
            (0, dy.signum())
        }
    }

    /// Effective speed follows the stamina ratio, never below one
    pub fn recompute_speed(&mut self, config: &Config) {
        let ratio = (self.stamina / config.stamina.max).clamp(0.0, 1.0);
        self.effective_speed = ((ratio * self.base_speed() as f32).floor() as u32).max(1);
    }

    /// Record a meal
    pub fn eat(&mut self, config: &Config) {
        self.times_eaten += 1;
        self.ate_today = true;
        if config.stamina.enabled {
            self.stamina = (self.stamina + config.stamina.recharge).min(config.stamina.max);
            self.recompute_speed(config);
        }
    }

    /// Apply the home-return rules for this tick. Returns true when the
    /// agent starved in the field.
    pub fn settle(&mut self) -> bool {
        if !self.active {
            return false;
        }

        if self.has_left_home && !self.at_home && self.steps_remaining == 0 {
            self.die(DeathCause::Starvation);
            return true;
        }

        if self.at_home && self.has_left_home {
            if self.ate_today {
                self.active = false;
                self.can_reproduce = self.times_eaten >= 2;
            } else if self.steps_remaining > 0 {
                // Came back hungry: back out next tick
                self.at_home = false;
            }
        }

        false
    }

    /// Predator contact
    pub fn take_hit(&mut self, invulnerability_ticks: u32) -> Hit {
        if self.invulnerable_ticks > 0 {
            return Hit::Shielded;
        }

        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.die(DeathCause::Predation);
            Hit::Killed
        } else {
            self.invulnerable_ticks = invulnerability_ticks;
            Hit::Wounded
        }
    }

    /// Count down the invulnerability window
    #[inline]
    pub fn tick_invulnerability(&mut self) {
        self.invulnerable_ticks = self.invulnerable_ticks.saturating_sub(1);
    }

    fn die(&mut self, cause: DeathCause) {
        self.active = false;
        self.must_die = true;
        self.death_cause = Some(cause);
    }

    /// End-of-day test: ate at least once and is home
    #[inline]
    pub fn survives_day(&self) -> bool {
        !self.must_die && self.ate_today && self.at_home
    }

    /// Current position in the home-return state machine
    pub fn state(&self) -> DayState {
        match self.death_cause {
            Some(DeathCause::Predation) => DayState::Killed,
            Some(_) => DayState::Starved,
            None if !self.active && self.ate_today && self.at_home => DayState::HomeSatisfied,
            None if self.at_home => DayState::AtHome,
            None => DayState::Foraging,
        }
    }
}
