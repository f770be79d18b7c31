//! Predation system: purge-day hunters, pursuit and contact damage.

use crate::agent::{Agent, AgentId, Hit, MutationKind};
use crate::arena::{Bounds, Cell, Direction};
use crate::config::PredatorConfig;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub type PredatorId = u32;

/// A hunter present for one purge day
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Predator {
    pub id: PredatorId,
    pub position: Cell,
    /// Cells covered per tick
    pub speed: u32,
    /// Acquisition radius in cells (Manhattan)
    pub vision_radius: u32,
    /// Agent being chased; re-resolved every tick, never owned
    pub target: Option<AgentId>,
    pub kills: u32,
}

/// Result of a predator touching an agent
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contact {
    pub predator: PredatorId,
    pub agent: AgentId,
    pub kind: MutationKind,
    pub position: Cell,
    pub hit: Hit,
}

impl Predator {
    pub fn new(id: PredatorId, position: Cell, config: &PredatorConfig) -> Self {
        Self {
            id,
            position,
            speed: config.speed,
            vision_radius: config.vision_radius,
            target: None,
            kills: 0,
        }
    }

    /// Pick the nearest active agent out in the field within vision.
    /// Equal distances go to the agent found first, so the choice is a
    /// pure function of agent order.
    pub fn acquire(&mut self, bounds: &Bounds, agents: &[Agent]) -> Option<usize> {
        let mut best: Option<(u32, usize)> = None;
        for (idx, agent) in agents.iter().enumerate() {
            if !agent.active || agent.at_home {
                continue;
            }
            let distance = bounds.cell_distance(self.position, agent.position);
            if distance > self.vision_radius {
                continue;
            }
            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, idx));
            }
        }

        self.target = best.map(|(_, idx)| agents[idx].id);
        best.map(|(_, idx)| idx)
    }

    /// Close in along the axis with the larger gap, without overshooting
    pub fn pursue(&mut self, bounds: &Bounds, target: Cell) {
        let dx = target.x - self.position.x;
        let dy = target.y - self.position.y;
        let reach = bounds.step * self.speed as i32;

        let (x, y) = if dx == 0 && dy == 0 {
            return;
        } else if dx.abs() >= dy.abs() {
            (self.position.x + dx.signum() * dx.abs().min(reach), self.position.y)
        } else {
            (self.position.x, self.position.y + dy.signum() * dy.abs().min(reach))
        };
        self.position = bounds.align(bounds.clamp(x, y));
    }

    /// Unbiased cardinal walk at full speed
    pub fn wander<R: Rng + ?Sized>(&mut self, bounds: &Bounds, rng: &mut R) {
        let (ux, uy) = Direction::random(rng).unit();
        let speed = self.speed as i32;
        self.position = bounds.offset(self.position, ux * speed, uy * speed);
    }

    /// One tick of behaviour: chase if something is in sight, else wander
    pub fn hunt<R: Rng + ?Sized>(&mut self, bounds: &Bounds, agents: &[Agent], rng: &mut R) {
        match self.acquire(bounds, agents) {
            Some(idx) => self.pursue(bounds, agents[idx].position),
            None => self.wander(bounds, rng),
        }
    }
}

/// Spawn a purge-day pack on random home cells
pub fn spawn<R: Rng + ?Sized>(
    bounds: &Bounds,
    config: &PredatorConfig,
    rng: &mut R,
) -> Vec<Predator> {
    (0..config.count)
        .map(|i| Predator::new(i as PredatorId, bounds.random_border_cell(rng), config))
        .collect()
}

/// Check if a predator is close enough to strike (Euclidean)
#[inline]
pub fn is_in_range(predator: Cell, agent: Cell, collision_radius: f32) -> bool {
    predator.euclidean(&agent) <= collision_radius
}

/// Damage every exposed agent touching a predator. Hits are gathered
/// against the post-movement positions first and applied afterwards; an
/// agent takes at most one hit per tick.
pub fn resolve_contacts(
    predators: &mut [Predator],
    agents: &mut [Agent],
    config: &PredatorConfig,
) -> Vec<Contact> {
    let mut strikes: Vec<(usize, usize)> = Vec::new();
    for (agent_idx, agent) in agents.iter().enumerate() {
        if !agent.active || agent.at_home {
            continue;
        }
        let in_range = |p: &Predator| is_in_range(p.position, agent.position, config.collision_radius);

        // Credit the hunter that was chasing this agent, if it is in range
        let striker = predators
            .iter()
            .position(|p| p.target == Some(agent.id) && in_range(p))
            .or_else(|| predators.iter().position(in_range));

        if let Some(predator_idx) = striker {
            strikes.push((predator_idx, agent_idx));
        }
    }

    let mut contacts = Vec::with_capacity(strikes.len());
    for (predator_idx, agent_idx) in strikes {
        let agent = &mut agents[agent_idx];
        let hit = agent.take_hit(config.invulnerability_ticks);

        if hit == Hit::Killed {
            predators[predator_idx].kills += 1;
            for predator in predators.iter_mut() {
                if predator.target == Some(agent.id) {
                    predator.target = None;
                }
            }
            log::trace!("predator {} killed agent {}", predators[predator_idx].id, agent.id);
        }

        contacts.push(Contact {
            predator: predators[predator_idx].id,
            agent: agent.id,
            kind: agent.kind,
            position: agent.position,
            hit,
        });
    }

    contacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn bounds() -> Bounds {
        Bounds::new(0, 200, 0, 200, 20)
    }

    fn field_agent(id: AgentId, kind: MutationKind, at: Cell, config: &Config) -> Agent {
        let mut agent = Agent::new(id, kind, Cell::new(0, at.y), config);
        agent.position = at;
        agent.at_home = false;
        agent.has_left_home = true;
        agent
    }

    #[test]
    fn test_range_check() {
        assert!(is_in_range(Cell::new(20, 20), Cell::new(40, 20), 20.0));
        assert!(is_in_range(Cell::new(20, 20), Cell::new(20, 20), 0.0));
        // Diagonal neighbour is ~28 units away
        assert!(!is_in_range(Cell::new(20, 20), Cell::new(40, 40), 20.0));
    }

    #[test]
    fn test_spawn_on_border() {
        let mut config = Config::predator_variant();
        config.predators.count = 4;
        let b = bounds();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let pack = spawn(&b, &config.predators, &mut rng);
        assert_eq!(pack.len(), 4);
        assert!(pack.iter().all(|p| b.is_home(p.position)));
        assert!(pack.iter().all(|p| p.target.is_none() && p.kills == 0));
    }

    #[test]
    fn test_acquire_nearest_first_found() {
        let config = Config::predator_variant();
        let b = bounds();
        let mut predator = Predator::new(0, Cell::new(100, 100), &config.predators);
        let agents = vec![
            field_agent(10, MutationKind::Normal, Cell::new(160, 100), &config),
            field_agent(11, MutationKind::Normal, Cell::new(140, 100), &config),
            field_agent(12, MutationKind::Normal, Cell::new(60, 100), &config),
        ];

        // 11 and 12 tie at two cells; 11 comes first
        assert_eq!(predator.acquire(&b, &agents), Some(1));
        assert_eq!(predator.target, Some(11));
    }

    #[test]
    fn test_acquire_ignores_home_and_far_agents() {
        let mut config = Config::predator_variant();
        config.predators.vision_radius = 2;
        let b = bounds();
        let mut predator = Predator::new(0, Cell::new(100, 100), &config.predators);
        let mut resting = field_agent(1, MutationKind::Normal, Cell::new(120, 100), &config);
        resting.at_home = true;
        let far = field_agent(2, MutationKind::Normal, Cell::new(180, 180), &config);

        assert_eq!(predator.acquire(&b, &[resting, far]), None);
        assert_eq!(predator.target, None);
    }

    #[test]
    fn test_pursuit_never_overshoots() {
        let config = Config::predator_variant();
        let b = bounds();
        let mut predator = Predator::new(0, Cell::new(100, 100), &config.predators);
        assert_eq!(predator.speed, 2);

        predator.pursue(&b, Cell::new(120, 160));
        assert_eq!(predator.position, Cell::new(100, 140));
        predator.pursue(&b, Cell::new(120, 160));
        // Equal gaps: horizontal first, capped at one cell
        assert_eq!(predator.position, Cell::new(120, 140));
        predator.pursue(&b, Cell::new(120, 160));
        assert_eq!(predator.position, Cell::new(120, 160));
        predator.pursue(&b, Cell::new(120, 160));
        assert_eq!(predator.position, Cell::new(120, 160));
    }

    #[test]
    fn test_wander_stays_in_bounds() {
        let config = Config::predator_variant();
        let b = bounds();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut predator = Predator::new(0, Cell::new(0, 0), &config.predators);

        for _ in 0..200 {
            let before = predator.position;
            predator.wander(&b, &mut rng);
            assert!(b.contains(predator.position));
            assert!(before.manhattan(&predator.position) <= 40);
        }
    }

    #[test]
    fn test_contact_kills_single_life_agent() {
        let config = Config::predator_variant();
        let at = Cell::new(100, 100);
        let mut predators = vec![Predator::new(3, at, &config.predators)];
        predators[0].target = Some(7);
        let mut agents = vec![field_agent(7, MutationKind::SpeedMutant, at, &config)];

        let contacts = resolve_contacts(&mut predators, &mut agents, &config.predators);
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].hit, Hit::Killed);
        assert_eq!(predators[0].kills, 1);
        assert_eq!(predators[0].target, None);
        assert!(agents[0].must_die);
    }

    #[test]
    fn test_contact_wounds_priority_mutant_once() {
        let config = Config::predator_variant();
        let at = Cell::new(100, 100);
        let mut predators = vec![
            Predator::new(0, at, &config.predators),
            Predator::new(1, Cell::new(120, 100), &config.predators),
        ];
        let mut agents = vec![field_agent(1, MutationKind::PriorityMutant, at, &config)];

        // Two predators in range, still a single hit
        let contacts = resolve_contacts(&mut predators, &mut agents, &config.predators);
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].hit, Hit::Wounded);
        assert_eq!(agents[0].lives, 1);
        assert!(agents[0].active);

        // Next tick: shielded
        let contacts = resolve_contacts(&mut predators, &mut agents, &config.predators);
        assert_eq!(contacts[0].hit, Hit::Shielded);
        assert_eq!(agents[0].lives, 1);
    }

    #[test]
    fn test_home_agents_are_safe() {
        let config = Config::predator_variant();
        let at = Cell::new(0, 100);
        let mut predators = vec![Predator::new(0, at, &config.predators)];
        let mut agents = vec![Agent::new(1, MutationKind::Normal, at, &config)];

        assert!(resolve_contacts(&mut predators, &mut agents, &config.predators).is_empty());
        assert!(agents[0].active);
    }
}
