//! Baseline strategy: uniformly random decisions. Used as the fallback
//! when no inference server is configured, and in tests.

use crate::npc::decisions::Decision;
use crate::npc::{DecisionStrategy, NpcState};
use crate::sim::SimContext;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Picks decisions at random, visiting random reachable buildings.
pub struct RandomStrategy {
    rng: StdRng,
}

impl RandomStrategy {
    /// Creates a seeded random strategy.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl DecisionStrategy for RandomStrategy {
    fn select_next(&mut self, _state: &mut NpcState, ctx: &SimContext) -> Decision {
        match self.rng.gen_range(0..4) {
            0 => Decision::idle(),
            1 => Decision::wander(),
            2 => {
                let visitable = ctx.map.visitable();
                if visitable.is_empty() {
                    return Decision::idle();
                }
                let id = visitable[self.rng.gen_range(0..visitable.len())];
                let kind = ctx.map.structures[id].kind;
                let linger = self.rng.gen_range(5.0..20.0);
                let disappear = self.rng.gen_bool(0.5);
                Decision::visit(id, kind, linger, disappear)
            }
            _ => Decision::talk_to_npc(),
        }
    }
}
