//! # Decisions
//!
//! The things a villager can be doing, as an enum of small structs driven
//! through a single start/advance/finish lifecycle. One decision runs at a
//! time; the agent asks its strategy for the next one only when the current
//! decision reports finished.

use crate::map::grid::WorldPos;
use crate::map::structures::{StructureId, StructureKind};
use crate::npc::llm::ReplyMailbox;
use crate::npc::memory::Memory;
use crate::npc::NpcState;
use crate::sim::SimContext;
use rand::Rng;

/// Upper bound on a random idle stretch, in seconds.
const MAX_IDLE_SECS: f32 = 15.0;
/// How long a conversation between villagers lasts.
const TALK_SECS: f32 = 10.0;
/// How close a villager gets to a conversation partner.
const TALK_STOPPING: f32 = 2.0;

/// Outcome of advancing a decision by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionStatus {
    Running,
    Finished,
}

/// A villager's current activity.
#[derive(Debug, Clone)]
pub enum Decision {
    Idle(IdleDecision),
    Wander(WanderDecision),
    VisitBuilding(VisitDecision),
    TalkToNpc(TalkDecision),
    TalkToPlayer(TalkToPlayerDecision),
    WaitForService(WaitForServiceDecision),
    WaitForReply(WaitForReplyDecision),
}

#[derive(Debug, Clone)]
pub struct IdleDecision {
    remaining: f32,
    started: bool,
}

#[derive(Debug, Clone)]
pub struct WanderDecision {
    target: Option<WorldPos>,
}

#[derive(Debug, Clone)]
pub struct VisitDecision {
    pub structure: StructureId,
    pub kind: StructureKind,
    pub stopping_distance: f32,
    pub linger: f32,
    /// Whether the villager steps out of sight while inside.
    pub disappear: bool,
    remaining: f32,
    lingering: bool,
}

#[derive(Debug, Clone)]
pub struct TalkDecision {
    partner: Option<String>,
    remaining: f32,
    talking: bool,
}

#[derive(Debug, Clone)]
pub struct TalkToPlayerDecision;

#[derive(Debug, Clone)]
pub struct WaitForServiceDecision;

#[derive(Debug, Clone)]
pub struct WaitForReplyDecision {
    mailbox: ReplyMailbox,
}

impl Decision {
    /// Idle for a random stretch drawn at start.
    pub fn idle() -> Self {
        Decision::Idle(IdleDecision {
            remaining: 0.0,
            started: false,
        })
    }

    /// Idle for a fixed duration.
    pub fn idle_for(secs: f32) -> Self {
        Decision::Idle(IdleDecision {
            remaining: secs,
            started: true,
        })
    }

    /// Wander to a random free tile.
    pub fn wander() -> Self {
        Decision::Wander(WanderDecision { target: None })
    }

    /// Walk to a building and linger there.
    pub fn visit(structure: StructureId, kind: StructureKind, linger: f32, disappear: bool) -> Self {
        Decision::VisitBuilding(VisitDecision {
            structure,
            kind,
            stopping_distance: 1.5,
            linger,
            disappear,
            remaining: 0.0,
            lingering: false,
        })
    }

    /// Seek out the nearest other villager and chat.
    pub fn talk_to_npc() -> Self {
        Decision::TalkToNpc(TalkDecision {
            partner: None,
            remaining: 0.0,
            talking: false,
        })
    }

    /// Follow and face the player while they are engaged.
    pub fn talk_to_player() -> Self {
        Decision::TalkToPlayer(TalkToPlayerDecision)
    }

    /// Hold until the inference service reports ready.
    pub fn wait_for_service() -> Self {
        Decision::WaitForService(WaitForServiceDecision)
    }

    /// Hold until a reply lands in the mailbox.
    pub fn wait_for_reply(mailbox: ReplyMailbox) -> Self {
        Decision::WaitForReply(WaitForReplyDecision { mailbox })
    }

    /// Short label of the activity, as other villagers would describe it.
    pub fn label(&self) -> String {
        match self {
            Decision::Idle(_) => "standing around".to_string(),
            Decision::Wander(_) => "wandering the streets".to_string(),
            Decision::VisitBuilding(v) => format!("visiting the {}", kind_name(v.kind)),
            Decision::TalkToNpc(t) => match &t.partner {
                Some(name) => format!("talking with {}", name),
                None => "looking for someone to talk to".to_string(),
            },
            Decision::TalkToPlayer(_) => "talking with the stranger".to_string(),
            Decision::WaitForService(_) | Decision::WaitForReply(_) => {
                "lost in thought".to_string()
            }
        }
    }

    /// One-time setup when the decision becomes current.
    pub fn start(&mut self, state: &mut NpcState, ctx: &SimContext) {
        match self {
            Decision::Idle(idle) => {
                if !idle.started {
                    idle.remaining = state.rng.gen_range(0.0..MAX_IDLE_SECS);
                    idle.started = true;
                }
                state.nav.reset_path();
            }
            Decision::Wander(wander) => {
                let free: Vec<WorldPos> = ctx
                    .map
                    .grid
                    .iter()
                    .filter(|t| t.is_free())
                    .map(|t| t.center)
                    .collect();
                if free.is_empty() {
                    return;
                }
                let target = free[state.rng.gen_range(0..free.len())];
                wander.target = Some(target);
                state.nav.set_destination(target, 0.5);
            }
            Decision::VisitBuilding(visit) => {
                let entrance = ctx
                    .map
                    .structures
                    .get(visit.structure)
                    .and_then(|s| s.anchor)
                    .map(|anchor| ctx.map.grid.tile(anchor).front_anchor);
                match entrance {
                    Some(entrance) => {
                        state.nav.set_destination(entrance, visit.stopping_distance)
                    }
                    // No entrance to walk to, linger in place instead.
                    None => visit.lingering = true,
                }
            }
            Decision::TalkToNpc(talk) => {
                let nearest = ctx
                    .roster
                    .iter()
                    .filter(|v| v.name != state.name)
                    .min_by(|a, b| {
                        let da = a.position.distance_squared(state.nav.position);
                        let db = b.position.distance_squared(state.nav.position);
                        da.total_cmp(&db)
                    });
                match nearest {
                    Some(partner) => {
                        talk.partner = Some(partner.name.clone());
                        state.nav.set_destination(partner.position, TALK_STOPPING);
                    }
                    None => talk.talking = true,
                }
            }
            Decision::TalkToPlayer(_)
            | Decision::WaitForService(_)
            | Decision::WaitForReply(_) => {}
        }
    }

    /// Advances the decision by one tick.
    pub fn advance(&mut self, state: &mut NpcState, ctx: &SimContext, dt: f32) -> DecisionStatus {
        match self {
            Decision::Idle(idle) => {
                idle.remaining -= dt;
                if idle.remaining <= 0.0 {
                    DecisionStatus::Finished
                } else {
                    DecisionStatus::Running
                }
            }
            Decision::Wander(wander) => {
                if wander.target.is_none() || state.nav.arrived() {
                    DecisionStatus::Finished
                } else {
                    DecisionStatus::Running
                }
            }
            Decision::VisitBuilding(visit) => {
                if !visit.lingering {
                    if state.nav.arrived() {
                        visit.lingering = true;
                        visit.remaining = visit.linger;
                        state.nav.reset_path();
                        if visit.disappear {
                            state.visible = false;
                        }
                    }
                    return DecisionStatus::Running;
                }
                visit.remaining -= dt;
                if visit.remaining <= 0.0 {
                    DecisionStatus::Finished
                } else {
                    DecisionStatus::Running
                }
            }
            Decision::TalkToNpc(talk) => {
                if !talk.talking {
                    if state.nav.arrived() {
                        talk.talking = true;
                        talk.remaining = TALK_SECS;
                        state.nav.reset_path();
                    }
                    return DecisionStatus::Running;
                }
                talk.remaining -= dt;
                if talk.remaining <= 0.0 {
                    DecisionStatus::Finished
                } else {
                    DecisionStatus::Running
                }
            }
            Decision::TalkToPlayer(_) => match ctx.player_position {
                // The player moves freely, so the destination re-plans every
                // tick.
                Some(player) => {
                    state.nav.set_destination(player, TALK_STOPPING);
                    DecisionStatus::Running
                }
                None => DecisionStatus::Finished,
            },
            Decision::WaitForService(_) => {
                if ctx.service_ready {
                    DecisionStatus::Finished
                } else {
                    DecisionStatus::Running
                }
            }
            Decision::WaitForReply(wait) => {
                // Peek only; the strategy consumes the reply when it picks
                // the next decision.
                let has_reply = wait
                    .mailbox
                    .lock()
                    .map(|slot| slot.is_some())
                    .unwrap_or(false);
                if has_reply {
                    DecisionStatus::Finished
                } else {
                    DecisionStatus::Running
                }
            }
        }
    }

    /// Cleanup when the decision finishes.
    pub fn finish(&mut self, state: &mut NpcState, _ctx: &SimContext) {
        match self {
            Decision::VisitBuilding(visit) => {
                state.visible = true;
                match visit.kind {
                    StructureKind::Well => state.thirst = 0.0,
                    StructureKind::Tavern => state.hunger = 0.0,
                    _ => {}
                }
            }
            Decision::TalkToNpc(talk) => {
                if let Some(partner) = &talk.partner {
                    state.memories.push(Memory::unscored(
                        format!("Talked with {}", partner),
                        8.0,
                        3.0,
                    ));
                }
            }
            _ => {}
        }
    }
}

/// Lowercase display name of a structure kind.
pub fn kind_name(kind: StructureKind) -> &'static str {
    match kind {
        StructureKind::House => "house",
        StructureKind::Church => "church",
        StructureKind::Well => "well",
        StructureKind::Blacksmith => "blacksmith",
        StructureKind::Tavern => "tavern",
        StructureKind::Wall => "wall",
        StructureKind::Tower => "tower",
        StructureKind::Gate => "gate",
        StructureKind::Tree => "tree",
        StructureKind::Decoration => "decoration",
        StructureKind::Clue => "clue",
    }
}
