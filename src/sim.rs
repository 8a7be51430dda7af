//! # Simulation
//!
//! Ties the generated village and the villagers together. Each tick builds
//! a read-only context (map, roster snapshot, service readiness, player
//! position) and advances every villager against it, so no villager ever
//! observes another mid-update.

use crate::map::grid::WorldPos;
use crate::map::VillageMap;
use crate::npc::Npc;

/// What one villager looks like to the others this tick.
#[derive(Debug, Clone)]
pub struct NpcView {
    pub name: String,
    pub position: WorldPos,
    /// Label of the activity, if the villager is doing anything.
    pub action: Option<String>,
    /// False while the villager is inside a building.
    pub visible: bool,
}

/// Per-tick read-only context handed to every villager.
pub struct SimContext<'a> {
    pub map: &'a VillageMap,
    /// Snapshot of every villager, taken before any of them advanced.
    pub roster: &'a [NpcView],
    /// Whether the inference service is connected and healthy.
    pub service_ready: bool,
    /// Player position while the player is engaging villagers.
    pub player_position: Option<WorldPos>,
    /// Simulated seconds since the simulation started.
    pub time: f32,
}

/// The running world: a village and its villagers.
pub struct Simulation {
    pub map: VillageMap,
    npcs: Vec<Npc>,
    service_ready: bool,
    player_position: Option<WorldPos>,
    time: f32,
}

impl Simulation {
    /// Creates a simulation over a generated village.
    pub fn new(map: VillageMap) -> Self {
        Self {
            map,
            npcs: Vec::new(),
            service_ready: false,
            player_position: None,
            time: 0.0,
        }
    }

    /// Adds a villager to the roster.
    pub fn add_npc(&mut self, npc: Npc) {
        self.npcs.push(npc);
    }

    /// Borrow the villagers.
    pub fn npcs(&self) -> &[Npc] {
        &self.npcs
    }

    /// Mutably borrow the villagers.
    pub fn npcs_mut(&mut self) -> &mut [Npc] {
        &mut self.npcs
    }

    /// Flips the inference-service readiness flag villagers gate on.
    pub fn set_service_ready(&mut self, ready: bool) {
        self.service_ready = ready;
    }

    /// Moves (or clears) the player's position.
    pub fn set_player_position(&mut self, position: Option<WorldPos>) {
        self.player_position = position;
    }

    /// Simulated seconds since start.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Advances the whole world by one tick.
    pub fn tick(&mut self, dt: f32) {
        self.time += dt;

        let roster: Vec<NpcView> = self
            .npcs
            .iter()
            .map(|npc| NpcView {
                name: npc.state.name.clone(),
                position: npc.state.nav.position,
                action: npc.action_label(),
                visible: npc.state.visible,
            })
            .collect();

        let map = &self.map;
        for npc in &mut self.npcs {
            let ctx = SimContext {
                map,
                roster: &roster,
                service_ready: self.service_ready,
                player_position: self.player_position,
                time: self.time,
            };
            npc.tick(&ctx, dt);
        }
    }
}
