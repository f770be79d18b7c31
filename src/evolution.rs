//! Reproduction and mutation inheritance.

use crate::agent::{Agent, AgentId, MutationKind};
use crate::arena::Cell;
use crate::config::Config;
use rand::seq::SliceRandom;
use rand::Rng;

/// Meals needed in one day to reproduce
pub const REPRODUCTION_MEALS: u32 = 2;

/// Meals needed in one day for the offspring to mutate
pub const MUTATION_MEALS: u32 = 3;

/// Evolution engine for asexual, kind-level inheritance
#[derive(Clone, Debug)]
pub struct EvolutionEngine {
    /// Chance a mutant parent's mutant-candidate child keeps the mutation
    pub keep_probability: f64,
}

impl EvolutionEngine {
    /// Create evolution engine from config
    pub fn from_config(config: &Config) -> Self {
        Self {
            keep_probability: config.policy.inheritance_keep_probability,
        }
    }

    /// Whether a survivor with this many meals gets a child
    #[inline]
    pub fn can_reproduce(times_eaten: u32) -> bool {
        times_eaten >= REPRODUCTION_MEALS
    }

    /// Kind drawn before the inheritance filter. Heavy eaters produce a
    /// mutant regardless of their own kind; others breed true.
    pub fn candidate_kind<R: Rng + ?Sized>(
        parent: MutationKind,
        times_eaten: u32,
        rng: &mut R,
    ) -> MutationKind {
        if times_eaten >= MUTATION_MEALS {
            *MutationKind::MUTANTS
                .choose(rng)
                .unwrap_or(&MutationKind::SpeedMutant)
        } else {
            parent
        }
    }

    /// Final offspring kind. A mutant parent only passes a mutation on with
    /// `keep_probability`; a normal parent's forced mutation is kept as is.
    pub fn offspring_kind<R: Rng + ?Sized>(
        &self,
        parent: MutationKind,
        times_eaten: u32,
        rng: &mut R,
    ) -> MutationKind {
        let candidate = Self::candidate_kind(parent, times_eaten, rng);

        if candidate.is_mutant() && parent.is_mutant() && !rng.gen_bool(self.keep_probability) {
            MutationKind::Normal
        } else {
            candidate
        }
    }

    /// Child of `parent`, or `None` if it did not eat enough
    pub fn reproduce<R: Rng + ?Sized>(
        &self,
        parent: &Agent,
        child_id: AgentId,
        home: Cell,
        config: &Config,
        rng: &mut R,
    ) -> Option<Agent> {
        if !Self::can_reproduce(parent.times_eaten) {
            return None;
        }
        let kind = self.offspring_kind(parent.kind, parent.times_eaten, rng);
        Some(Agent::new(child_id, kind, home, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn engine(keep: f64) -> EvolutionEngine {
        let mut config = Config::default();
        config.policy.inheritance_keep_probability = keep;
        EvolutionEngine::from_config(&config)
    }

    #[test]
    fn test_two_meals_breed_true() {
        let engine = engine(0.75);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..200 {
            assert_eq!(
                engine.offspring_kind(MutationKind::Normal, 2, &mut rng),
                MutationKind::Normal
            );
        }
    }

    #[test]
    fn test_heavy_eater_never_draws_normal() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut seen = [0usize; 3];
        for parent in MutationKind::ALL {
            for _ in 0..300 {
                let kind = EvolutionEngine::candidate_kind(parent, 3, &mut rng);
                seen[kind.index()] += 1;
            }
        }
        assert_eq!(seen[MutationKind::Normal.index()], 0);
        assert!(seen[MutationKind::SpeedMutant.index()] > 350);
        assert!(seen[MutationKind::PriorityMutant.index()] > 350);
    }

    #[test]
    fn test_normal_parent_keeps_forced_mutation() {
        let engine = engine(0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..200 {
            assert!(engine.offspring_kind(MutationKind::Normal, 4, &mut rng).is_mutant());
        }
    }

    #[test]
    fn test_mutant_parent_can_revert() {
        let engine = engine(0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        assert_eq!(
            engine.offspring_kind(MutationKind::PriorityMutant, 5, &mut rng),
            MutationKind::Normal
        );
        assert_eq!(
            engine.offspring_kind(MutationKind::SpeedMutant, 2, &mut rng),
            MutationKind::Normal
        );
    }

    #[test]
    fn test_inheritance_filter_rate() {
        let engine = engine(0.8);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let trials = 1000;
        let kept = (0..trials)
            .filter(|_| {
                engine.offspring_kind(MutationKind::SpeedMutant, 2, &mut rng)
                    == MutationKind::SpeedMutant
            })
            .count();
        // 800 expected; sigma ~12.6
        assert!((740..=860).contains(&kept), "kept {}", kept);
    }

    #[test]
    fn test_reproduce_requires_two_meals() {
        let config = Config::default();
        let engine = EvolutionEngine::from_config(&config);
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut parent = Agent::new(1, MutationKind::Normal, Cell::new(0, 20), &config);

        parent.times_eaten = 1;
        assert!(engine
            .reproduce(&parent, 2, Cell::new(0, 40), &config, &mut rng)
            .is_none());

        parent.times_eaten = 2;
        let child = engine
            .reproduce(&parent, 2, Cell::new(0, 40), &config, &mut rng)
            .unwrap();
        assert_eq!(child.id, 2);
        assert_eq!(child.kind, MutationKind::Normal);
        assert_eq!(child.position, Cell::new(0, 40));
        assert_eq!(child.times_eaten, 0);
    }
}
