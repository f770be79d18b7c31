//! Foraging: who gets the food when several agents share a cell.

use crate::agent::{Agent, AgentId, MutationKind};
use crate::arena::Cell;
use crate::config::Config;
use crate::food::FoodField;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Strict ranking of mutation kinds at a contested food cell, highest first
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriorityOrder([MutationKind; 3]);

impl Default for PriorityOrder {
    /// Priority mutants first, then speed mutants, then normals
    fn default() -> Self {
        Self([
            MutationKind::PriorityMutant,
            MutationKind::SpeedMutant,
            MutationKind::Normal,
        ])
    }
}

impl PriorityOrder {
    pub const fn new(order: [MutationKind; 3]) -> Self {
        Self(order)
    }

    /// Speed mutants first, then priority mutants, then normals
    pub const fn speed_first() -> Self {
        Self([
            MutationKind::SpeedMutant,
            MutationKind::PriorityMutant,
            MutationKind::Normal,
        ])
    }

    /// Every kind appears exactly once
    pub fn is_total(&self) -> bool {
        MutationKind::ALL
            .iter()
            .all(|kind| self.0.iter().filter(|k| *k == kind).count() == 1)
    }

    /// 0 is the highest rank
    pub fn rank(&self, kind: MutationKind) -> usize {
        self.0
            .iter()
            .position(|k| *k == kind)
            .unwrap_or(self.0.len())
    }

    pub fn kinds(&self) -> &[MutationKind; 3] {
        &self.0
    }
}

/// One food unit eaten this tick
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    pub cell: Cell,
    pub agent: AgentId,
    pub kind: MutationKind,
}

/// Resolve this tick's foraging. At most one agent eats per food cell;
/// ties inside the winning kind are broken uniformly at random.
pub fn resolve<R: Rng + ?Sized>(
    agents: &mut [Agent],
    food: &mut FoodField,
    order: &PriorityOrder,
    config: &Config,
    rng: &mut R,
) -> Vec<Meal> {
    // Occupancy of food cells by agents still out foraging
    let mut occupancy: BTreeMap<Cell, Vec<usize>> = BTreeMap::new();
    for (idx, agent) in agents.iter().enumerate() {
        if agent.active && !agent.at_home && food.contains(agent.position) {
            occupancy.entry(agent.position).or_default().push(idx);
        }
    }

    let winners: Vec<(Cell, usize)> = occupancy
        .iter()
        .filter_map(|(cell, contenders)| {
            pick_winner(&*agents, contenders, order, rng).map(|idx| (*cell, idx))
        })
        .collect();

    let mut meals = Vec::with_capacity(winners.len());
    for (cell, idx) in winners {
        if food.consume(cell) {
            let agent = &mut agents[idx];
            agent.eat(config);
            meals.push(Meal {
                cell,
                agent: agent.id,
                kind: agent.kind,
            });
        }
    }

    meals
}

fn pick_winner<R: Rng + ?Sized>(
    agents: &[Agent],
    contenders: &[usize],
    order: &PriorityOrder,
    rng: &mut R,
) -> Option<usize> {
    let best_rank = contenders
        .iter()
        .map(|&idx| order.rank(agents[idx].kind))
        .min()?;

    let finalists: Vec<usize> = contenders
        .iter()
        .copied()
        .filter(|&idx| order.rank(agents[idx].kind) == best_rank)
        .collect();

    finalists.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn forager(id: AgentId, kind: MutationKind, at: Cell, config: &Config) -> Agent {
        let mut agent = Agent::new(id, kind, Cell::new(0, at.y), config);
        agent.position = at;
        agent.at_home = false;
        agent.has_left_home = true;
        agent
    }

    #[test]
    fn test_priority_order_ranks() {
        let order = PriorityOrder::default();
        assert!(order.is_total());
        assert_eq!(order.rank(MutationKind::PriorityMutant), 0);
        assert_eq!(order.rank(MutationKind::Normal), 2);

        let alt = PriorityOrder::speed_first();
        assert!(alt.is_total());
        assert_eq!(alt.rank(MutationKind::SpeedMutant), 0);
    }

    #[test]
    fn test_single_forager_eats() {
        let config = Config::default();
        let cell = Cell::new(40, 40);
        let mut agents = vec![forager(1, MutationKind::Normal, cell, &config)];
        let mut food = FoodField::from_cells([cell]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let meals = resolve(&mut agents, &mut food, &PriorityOrder::default(), &config, &mut rng);
        assert_eq!(meals.len(), 1);
        assert!(agents[0].ate_today);
        assert_eq!(agents[0].times_eaten, 1);
        assert!(food.is_empty());
    }

    #[test]
    fn test_higher_rank_wins() {
        let config = Config::default();
        let cell = Cell::new(40, 40);
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        for order in [PriorityOrder::default(), PriorityOrder::speed_first()] {
            let mut agents = vec![
                forager(1, MutationKind::Normal, cell, &config),
                forager(2, MutationKind::SpeedMutant, cell, &config),
                forager(3, MutationKind::PriorityMutant, cell, &config),
            ];
            let mut food = FoodField::from_cells([cell]);
            let meals = resolve(&mut agents, &mut food, &order, &config, &mut rng);

            assert_eq!(meals.len(), 1);
            assert_eq!(meals[0].kind, order.kinds()[0]);
            assert_eq!(agents.iter().filter(|a| a.ate_today).count(), 1);
        }
    }

    #[test]
    fn test_same_kind_tie_is_fair() {
        let config = Config::default();
        let cell = Cell::new(40, 40);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut wins = [0usize; 2];

        for _ in 0..2000 {
            let mut agents = vec![
                forager(1, MutationKind::Normal, cell, &config),
                forager(2, MutationKind::Normal, cell, &config),
            ];
            let mut food = FoodField::from_cells([cell]);
            let meals = resolve(&mut agents, &mut food, &PriorityOrder::default(), &config, &mut rng);
            wins[(meals[0].agent - 1) as usize] += 1;
        }

        assert!(wins[0] > 850 && wins[1] > 850, "wins: {:?}", wins);
    }

    #[test]
    fn test_one_eater_per_cell() {
        let config = Config::default();
        let a = Cell::new(40, 40);
        let b = Cell::new(60, 40);
        let mut agents: Vec<Agent> = (0..6)
            .map(|i| forager(i, MutationKind::Normal, if i % 2 == 0 { a } else { b }, &config))
            .collect();
        let mut food = FoodField::from_cells([a, b]);
        let mut rng = ChaCha8Rng::seed_from_u64(4);

        let meals = resolve(&mut agents, &mut food, &PriorityOrder::default(), &config, &mut rng);
        assert_eq!(meals.len(), 2);
        assert_ne!(meals[0].cell, meals[1].cell);
        assert_eq!(agents.iter().filter(|a| a.ate_today).count(), 2);
    }

    #[test]
    fn test_inactive_and_home_agents_skip() {
        let config = Config::default();
        let cell = Cell::new(40, 40);
        let mut resting = forager(1, MutationKind::PriorityMutant, cell, &config);
        resting.active = false;
        let mut homebound = forager(2, MutationKind::PriorityMutant, cell, &config);
        homebound.at_home = true;
        let mut agents = vec![resting, homebound];
        let mut food = FoodField::from_cells([cell]);
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let meals = resolve(&mut agents, &mut food, &PriorityOrder::default(), &config, &mut rng);
        assert!(meals.is_empty());
        assert_eq!(food.len(), 1);
    }

    #[test]
    fn test_meal_recharges_stamina() {
        let mut config = Config::default();
        config.stamina.enabled = true;
        let cell = Cell::new(40, 40);
        let mut hungry = forager(1, MutationKind::Normal, cell, &config);
        hungry.stamina = 10.0;
        let mut agents = vec![hungry];
        let mut food = FoodField::from_cells([cell]);
        let mut rng = ChaCha8Rng::seed_from_u64(6);

        resolve(&mut agents, &mut food, &PriorityOrder::default(), &config, &mut rng);
        assert_eq!(agents[0].stamina, 10.0 + config.stamina.recharge);
    }
}
