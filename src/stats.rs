//! Statistics tracking: live counters and the per-day history log.

use crate::agent::{Agent, MutationKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Head count per mutation kind
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCounts {
    pub normal: usize,
    pub speed: usize,
    pub priority: usize,
}

impl KindCounts {
    pub fn from_agents<'a, I: IntoIterator<Item = &'a Agent>>(agents: I) -> Self {
        let mut counts = Self::default();
        for agent in agents {
            counts.add(agent.kind);
        }
        counts
    }

    #[inline]
    pub fn add(&mut self, kind: MutationKind) {
        *self.slot(kind) += 1;
    }

    #[inline]
    pub fn get(&self, kind: MutationKind) -> usize {
        match kind {
            MutationKind::Normal => self.normal,
            MutationKind::SpeedMutant => self.speed,
            MutationKind::PriorityMutant => self.priority,
        }
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.normal + self.speed + self.priority
    }

    fn slot(&mut self, kind: MutationKind) -> &mut usize {
        match kind {
            MutationKind::Normal => &mut self.normal,
            MutationKind::SpeedMutant => &mut self.speed,
            MutationKind::PriorityMutant => &mut self.priority,
        }
    }
}

/// One row of the history log. Day 0 is the initial cohort; day `n` holds
/// what happened during day `n` and the population that starts day `n + 1`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    pub day: u32,
    /// Population after the day's resolution
    pub population: usize,
    /// `population` split by kind
    pub kinds: KindCounts,
    /// Food cells placed for the day
    pub food_available: usize,
    /// Whether predators hunted this day
    pub purge: bool,
    /// Predator kills by victim kind
    pub kills: KindCounts,
    pub survivors: usize,
    pub births: usize,
    /// Ran out of moves in the field
    pub starved: usize,
    /// Failed the end-of-day test
    pub exposed: usize,
}

impl DayRecord {
    pub fn csv_header() -> &'static str {
        "day,population,normal,speed,priority,food_available,purge,killed_normal,killed_speed,killed_priority,survivors,births,starved,exposed"
    }

    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            self.day,
            self.population,
            self.kinds.normal,
            self.kinds.speed,
            self.kinds.priority,
            self.food_available,
            self.purge,
            self.kills.normal,
            self.kills.speed,
            self.kills.priority,
            self.survivors,
            self.births,
            self.starved,
            self.exposed,
        )
    }
}

/// Append-only per-day log
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct History {
    records: Vec<DayRecord>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record
    pub fn record(&mut self, record: DayRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[DayRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&DayRecord> {
        self.records.last()
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
    }

    /// Get population over time
    pub fn population_series(&self) -> Vec<(u32, usize)> {
        self.records.iter().map(|r| (r.day, r.population)).collect()
    }

    /// Get per-kind population over time
    pub fn kind_series(&self) -> Vec<(u32, KindCounts)> {
        self.records.iter().map(|r| (r.day, r.kinds)).collect()
    }

    /// Predator kills over the whole run
    pub fn total_kills(&self) -> KindCounts {
        let mut total = KindCounts::default();
        for record in &self.records {
            total.normal += record.kills.normal;
            total.speed += record.kills.speed;
            total.priority += record.kills.priority;
        }
        total
    }

    /// Initial, final, maximum and minimum population
    pub fn summary(&self) -> Option<PopulationSummary> {
        let first = self.records.first()?;
        let last = self.records.last()?;
        Some(PopulationSummary {
            days: last.day,
            initial: first.population,
            final_population: last.population,
            max: self.records.iter().map(|r| r.population).max().unwrap_or(0),
            min: self.records.iter().map(|r| r.population).min().unwrap_or(0),
        })
    }

    /// Render the log as CSV
    pub fn to_csv(&self) -> String {
        let mut out = String::from(DayRecord::csv_header());
        out.push('\n');
        for record in &self.records {
            out.push_str(&record.to_csv_row());
            out.push('\n');
        }
        out
    }

    /// Export the log to a CSV file
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "{}", DayRecord::csv_header())?;
        for record in &self.records {
            writeln!(writer, "{}", record.to_csv_row())?;
        }
        writer.flush()
    }

    /// Save history to file
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Load history from file
    pub fn load_json<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

/// End-of-run population figures
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationSummary {
    pub days: u32,
    pub initial: usize,
    pub final_population: usize,
    pub max: usize,
    pub min: usize,
}

impl fmt::Display for PopulationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Simulation Results ===")?;
        writeln!(f, "Days: {}", self.days)?;
        writeln!(f, "Initial population: {}", self.initial)?;
        writeln!(f, "Final population: {}", self.final_population)?;
        writeln!(f, "Maximum population: {}", self.max)?;
        writeln!(f, "Minimum population: {}", self.min)?;
        Ok(())
    }
}

/// Snapshot of the counters a statistics panel shows mid-day
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveStats {
    pub day: u32,
    pub tick: u32,
    pub population: usize,
    pub active: usize,
    pub at_home: usize,
    pub ate_today: usize,
    pub can_reproduce: usize,
    pub kinds: KindCounts,
    pub food_remaining: usize,
    pub predators: usize,
}

impl LiveStats {
    /// Agent counters; casualties awaiting removal are skipped. World-level
    /// fields are left at zero.
    pub fn collect(agents: &[Agent]) -> Self {
        let living: Vec<&Agent> = agents.iter().filter(|a| !a.must_die).collect();
        Self {
            population: living.len(),
            active: living.iter().filter(|a| a.active).count(),
            at_home: living.iter().filter(|a| a.at_home).count(),
            ate_today: living.iter().filter(|a| a.ate_today).count(),
            can_reproduce: living.iter().filter(|a| a.can_reproduce).count(),
            kinds: KindCounts::from_agents(living.iter().copied()),
            ..Self::default()
        }
    }

    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "D:{:4} T:{:4} | Pop:{:5} | Active:{:5} | Home:{:5} | Fed:{:5} | N/S/P:{}/{}/{} | Food:{:5} | Pred:{}",
            self.day,
            self.tick,
            self.population,
            self.active,
            self.at_home,
            self.ate_today,
            self.kinds.normal,
            self.kinds.speed,
            self.kinds.priority,
            self.food_remaining,
            self.predators,
        )
    }
}
