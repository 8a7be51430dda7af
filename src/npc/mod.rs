//! # Villagers
//!
//! The per-villager decision engine. Each villager runs exactly one
//! [`Decision`] at a time through a start/advance/finish lifecycle; a
//! pluggable [`DecisionStrategy`] picks the next decision whenever the
//! current one ends. An external look-at override (the player engaging the
//! villager) freezes the machine without consulting the strategy.

pub mod decisions;
pub mod llm;
pub mod memory;
pub mod nav;
pub mod random;

pub use decisions::{Decision, DecisionStatus};
pub use llm::LlmStrategy;
pub use memory::Memory;
pub use nav::NavAgent;
pub use random::RandomStrategy;

use crate::map::grid::WorldPos;
use crate::sim::SimContext;
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;

/// Hunger/thirst growth per simulated second.
const NEED_GROWTH_PER_SEC: f32 = 0.5;
/// How far a villager can see others, in world units.
const VISION_RANGE: f32 = 30.0;

/// Chooses the next decision for a villager.
///
/// Implementations must never block: the LLM-backed strategy spawns its
/// requests and answers with a waiting decision instead. The state is
/// mutable so a strategy can refine it, e.g. settle pending memory scores.
pub trait DecisionStrategy: Send {
    fn select_next(&mut self, state: &mut NpcState, ctx: &SimContext) -> Decision;
}

/// Mutable villager state the decisions and strategies operate on.
pub struct NpcState {
    pub name: String,
    /// Id of the model this villager thinks with.
    pub model_id: String,
    pub nav: NavAgent,
    pub hunger: f32,
    pub thirst: f32,
    /// Fixed background the villager always remembers.
    pub core_memories: Vec<String>,
    /// Accumulated observations and experiences.
    pub memories: Vec<Memory>,
    /// Point the villager is forced to face while the player engages them.
    pub look_target: Option<WorldPos>,
    /// False while the villager is inside a building.
    pub visible: bool,
    /// Label of the last decision that was interrupted.
    pub stopped_action: Option<String>,
    /// Per-villager rng for decision-local randomness.
    pub rng: StdRng,
    /// Last action seen per observed villager, for duplicate suppression.
    seen_actions: HashMap<String, String>,
}

/// One villager: state, current decision, and the strategy that picks the
/// next one.
pub struct Npc {
    pub state: NpcState,
    decision: Option<Decision>,
    strategy: Box<dyn DecisionStrategy>,
}

impl Npc {
    /// Creates a villager standing at a position.
    pub fn new(
        name: impl Into<String>,
        model_id: impl Into<String>,
        position: WorldPos,
        strategy: Box<dyn DecisionStrategy>,
        seed: u64,
    ) -> Self {
        Self {
            state: NpcState {
                name: name.into(),
                model_id: model_id.into(),
                nav: NavAgent::new(position, 3.0),
                hunger: 0.0,
                thirst: 0.0,
                core_memories: Vec::new(),
                memories: Vec::new(),
                look_target: None,
                visible: true,
                stopped_action: None,
                rng: StdRng::seed_from_u64(seed),
                seen_actions: HashMap::new(),
            },
            decision: None,
            strategy,
        }
    }

    /// Current decision, if any.
    pub fn decision(&self) -> Option<&Decision> {
        self.decision.as_ref()
    }

    /// Label of the current activity for other villagers to observe.
    pub fn action_label(&self) -> Option<String> {
        self.decision.as_ref().map(|d| d.label())
    }

    /// Advances the villager by one simulation tick.
    ///
    /// Needs grow with time regardless of activity. While a look target is
    /// set the decision machine is frozen: the current decision is
    /// interrupted (its label recorded as the stopped action) and no new
    /// one is selected until the override clears.
    pub fn tick(&mut self, ctx: &SimContext, dt: f32) {
        self.state.hunger += NEED_GROWTH_PER_SEC * dt;
        self.state.thirst += NEED_GROWTH_PER_SEC * dt;
        for memory in &mut self.state.memories {
            memory.decay(dt / 3600.0);
        }

        if self.state.look_target.is_some() {
            if let Some(interrupted) = self.decision.take() {
                debug!(
                    "{} interrupted while {}",
                    self.state.name,
                    interrupted.label()
                );
                self.state.stopped_action = Some(interrupted.label());
            }
            self.state.nav.reset_path();
            return;
        }

        self.observe(ctx);

        match self.decision.take() {
            None => {
                let mut decision = self.strategy.select_next(&mut self.state, ctx);
                debug!("{} starts {}", self.state.name, decision.label());
                decision.start(&mut self.state, ctx);
                self.decision = Some(decision);
            }
            Some(mut decision) => {
                if decision.advance(&mut self.state, ctx, dt) == DecisionStatus::Finished {
                    debug!("{} finishes {}", self.state.name, decision.label());
                    decision.finish(&mut self.state, ctx);
                } else {
                    self.decision = Some(decision);
                }
            }
        }

        self.state.nav.advance(dt);
    }

    /// Records "Saw X doing Y" memories for visible villagers, suppressing
    /// repeats of the same action per observed villager.
    fn observe(&mut self, ctx: &SimContext) {
        for view in ctx.roster {
            if view.name == self.state.name || !view.visible {
                continue;
            }
            let Some(action) = &view.action else {
                continue;
            };
            if view.position.distance(self.state.nav.position) > VISION_RANGE {
                continue;
            }
            if self.state.seen_actions.get(&view.name) == Some(action) {
                continue;
            }
            self.state
                .seen_actions
                .insert(view.name.clone(), action.clone());
            self.state.memories.push(Memory::unscored(
                format!("Saw {} {}", view.name, action),
                9.0,
                2.0,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{GenerationConfig, MapGenerator, VillageMap};
    use crate::sim::{NpcView, SimContext};

    struct ScriptedStrategy {
        decisions: Vec<Decision>,
    }

    impl DecisionStrategy for ScriptedStrategy {
        fn select_next(&mut self, _state: &mut NpcState, _ctx: &SimContext) -> Decision {
            if self.decisions.is_empty() {
                Decision::idle_for(1.0)
            } else {
                self.decisions.remove(0)
            }
        }
    }

    fn test_map() -> VillageMap {
        MapGenerator::with_default_catalogs(GenerationConfig::for_testing(42))
            .generate_map()
            .unwrap()
    }

    fn ctx<'a>(map: &'a VillageMap, roster: &'a [NpcView]) -> SimContext<'a> {
        SimContext {
            map,
            roster,
            service_ready: true,
            player_position: None,
            time: 0.0,
        }
    }

    fn scripted_npc(decisions: Vec<Decision>) -> Npc {
        Npc::new(
            "Edric",
            "model-edric",
            WorldPos::new(0.0, 0.0),
            Box::new(ScriptedStrategy { decisions }),
            7,
        )
    }

    #[test]
    fn test_decision_lifecycle_idle() {
        let map = test_map();
        let roster = Vec::new();
        let ctx = ctx(&map, &roster);
        let mut npc = scripted_npc(vec![Decision::idle_for(1.0)]);

        // First tick selects and starts, without advancing.
        npc.tick(&ctx, 0.6);
        assert!(npc.decision().is_some());

        // 0.6 + 0.6 > 1.0: second advance finishes the idle.
        npc.tick(&ctx, 0.6);
        npc.tick(&ctx, 0.6);
        assert!(npc.decision().is_none());
    }

    #[test]
    fn test_needs_grow_each_tick() {
        let map = test_map();
        let roster = Vec::new();
        let ctx = ctx(&map, &roster);
        let mut npc = scripted_npc(vec![]);

        npc.tick(&ctx, 2.0);
        assert_eq!(npc.state.hunger, 1.0);
        assert_eq!(npc.state.thirst, 1.0);
    }

    #[test]
    fn test_look_override_interrupts_and_freezes() {
        let map = test_map();
        let roster = Vec::new();
        let ctx = ctx(&map, &roster);
        let mut npc = scripted_npc(vec![Decision::idle_for(100.0)]);

        npc.tick(&ctx, 0.1);
        assert!(npc.decision().is_some());

        npc.state.look_target = Some(WorldPos::new(5.0, 5.0));
        npc.tick(&ctx, 0.1);
        assert!(npc.decision().is_none());
        assert_eq!(npc.state.stopped_action.as_deref(), Some("standing around"));
        assert!(npc.state.nav.destination().is_none());

        // Frozen: no new decision while the override holds.
        npc.tick(&ctx, 0.1);
        assert!(npc.decision().is_none());

        // Released: the strategy is consulted again.
        npc.state.look_target = None;
        npc.tick(&ctx, 0.1);
        assert!(npc.decision().is_some());
    }

    #[test]
    fn test_observation_memories_deduplicate() {
        let map = test_map();
        let roster = vec![NpcView {
            name: "Mira".to_string(),
            position: WorldPos::new(5.0, 0.0),
            action: Some("standing around".to_string()),
            visible: true,
        }];
        let ctx = ctx(&map, &roster);
        let mut npc = scripted_npc(vec![]);

        npc.tick(&ctx, 0.1);
        npc.tick(&ctx, 0.1);
        let observed: Vec<_> = npc
            .state
            .memories
            .iter()
            .filter(|m| m.text.starts_with("Saw Mira"))
            .collect();
        assert_eq!(observed.len(), 1);
        assert_eq!(observed[0].text, "Saw Mira standing around");
    }

    #[test]
    fn test_observation_respects_vision_range() {
        let map = test_map();
        let roster = vec![NpcView {
            name: "Mira".to_string(),
            position: WorldPos::new(500.0, 0.0),
            action: Some("wandering the streets".to_string()),
            visible: true,
        }];
        let ctx = ctx(&map, &roster);
        let mut npc = scripted_npc(vec![]);

        npc.tick(&ctx, 0.1);
        assert!(npc.state.memories.iter().all(|m| !m.text.starts_with("Saw")));
    }

    #[test]
    fn test_visit_resets_thirst() {
        let map = test_map();
        let Some((well_id, _)) = map.first_of_kind(crate::map::StructureKind::Well) else {
            // Seeded test map always has a well; guard anyway.
            return;
        };
        let roster = Vec::new();
        let ctx = ctx(&map, &roster);
        let mut npc = scripted_npc(vec![Decision::visit(
            well_id,
            crate::map::StructureKind::Well,
            0.5,
            false,
        )]);
        // Start next to the well so travel is instant.
        npc.state.nav.position = map.grid.tile(map.structures[well_id].anchor.unwrap()).front_anchor;

        for _ in 0..50 {
            npc.tick(&ctx, 0.5);
        }
        // The visit reset thirst partway through; hunger never reset.
        assert!(npc.state.thirst < npc.state.hunger);
    }
}
