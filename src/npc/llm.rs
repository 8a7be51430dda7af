//! # LLM Decision Strategy
//!
//! Lets an inference server pick what a villager does next. The strategy
//! never blocks the simulation tick: it snapshots the villager's world
//! into a JSON prompt, spawns the chat request onto the runtime, and hands
//! back a waiting decision whose mailbox the spawned task fills. The reply
//! is a bare 1-based index into the action list the villager was offered;
//! anything unparsable degrades to idling.

use crate::llm::{ChatMessage, ChatRequest, ChatResponse, LlmService};
use crate::map::structures::{StructureId, StructureKind};
use crate::npc::decisions::Decision;
use crate::npc::{DecisionStrategy, NpcState};
use crate::sim::SimContext;
use log::{debug, error};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Single-slot mailbox a spawned chat task delivers into.
pub type ReplyMailbox = Arc<Mutex<Option<ChatResponse>>>;

/// Obtained memories beyond this count are dropped from prompts, keeping
/// the heaviest ones.
const PROMPT_MEMORY_LIMIT: usize = 8;

/// What choosing an offered action means mechanically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionKind {
    Idle,
    Wander,
    VisitWell,
    VisitTavern,
    VisitChurch,
    TalkToNpc,
}

/// One line of the action menu offered to the model.
struct EnvironmentAction {
    kind: ActionKind,
    label: String,
    distance: i32,
    structure: Option<StructureId>,
}

#[derive(Serialize)]
struct ObtainedMemoryDto {
    memory: String,
    weight: i32,
}

#[derive(Serialize)]
struct EnvironmentActionDto {
    action: String,
    distance: i32,
}

#[derive(Serialize)]
struct NeedDto {
    need: String,
    weight: i32,
}

/// The world snapshot a villager sends when asking what to do.
#[derive(Serialize)]
struct DecisionSnapshot {
    core_memories: Vec<String>,
    obtained_memories: Vec<ObtainedMemoryDto>,
    current_environment: Vec<EnvironmentActionDto>,
    needs: Vec<NeedDto>,
    stopped_action: Option<String>,
}

/// Strategy that defers decision making to the inference server.
pub struct LlmStrategy {
    service: Arc<dyn LlmService>,
    mailbox: ReplyMailbox,
    /// The action menu sent with the outstanding request. `Some` doubles as
    /// the in-flight guard; the reply is parsed against this menu, not a
    /// rebuilt one, since the roster can shift mid-flight.
    offered: Option<Vec<EnvironmentAction>>,
    /// Text of the memory whose relevance score is outstanding.
    scoring: Option<String>,
    relevance: Arc<Mutex<Option<i32>>>,
    rng: StdRng,
}

impl LlmStrategy {
    /// Creates a strategy talking to a service.
    pub fn new(service: Arc<dyn LlmService>, seed: u64) -> Self {
        Self {
            service,
            mailbox: Arc::new(Mutex::new(None)),
            offered: None,
            scoring: None,
            relevance: Arc::new(Mutex::new(None)),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The action menu for this villager right now.
    fn environment_actions(state: &NpcState, ctx: &SimContext) -> Vec<EnvironmentAction> {
        let mut actions = vec![
            EnvironmentAction {
                kind: ActionKind::Idle,
                label: "stand around for a while".to_string(),
                distance: 0,
                structure: None,
            },
            EnvironmentAction {
                kind: ActionKind::Wander,
                label: "wander the streets".to_string(),
                distance: 0,
                structure: None,
            },
        ];

        let targets = [
            (StructureKind::Well, ActionKind::VisitWell, "drink at the well"),
            (StructureKind::Tavern, ActionKind::VisitTavern, "eat at the tavern"),
            (StructureKind::Church, ActionKind::VisitChurch, "pray at the church"),
        ];
        for (kind, action_kind, label) in targets {
            if let Some((id, structure)) = ctx.map.first_of_kind(kind) {
                actions.push(EnvironmentAction {
                    kind: action_kind,
                    label: label.to_string(),
                    distance: state.nav.position.distance(structure.position).round() as i32,
                    structure: Some(id),
                });
            }
        }

        let nearest_other = ctx
            .roster
            .iter()
            .filter(|v| v.name != state.name && v.visible)
            .map(|v| v.position.distance(state.nav.position))
            .min_by(f32::total_cmp);
        if let Some(distance) = nearest_other {
            actions.push(EnvironmentAction {
                kind: ActionKind::TalkToNpc,
                label: "talk to a neighbor".to_string(),
                distance: distance.round() as i32,
                structure: None,
            });
        }

        actions
    }

    fn snapshot(state: &NpcState, actions: &[EnvironmentAction]) -> DecisionSnapshot {
        let mut memories: Vec<&crate::npc::Memory> = state.memories.iter().collect();
        memories.sort_by(|a, b| b.weight().total_cmp(&a.weight()));
        memories.truncate(PROMPT_MEMORY_LIMIT);

        DecisionSnapshot {
            core_memories: state.core_memories.clone(),
            obtained_memories: memories
                .into_iter()
                .map(|m| ObtainedMemoryDto {
                    memory: m.text.clone(),
                    weight: m.prompt_weight(),
                })
                .collect(),
            current_environment: actions
                .iter()
                .map(|a| EnvironmentActionDto {
                    action: a.label.clone(),
                    distance: a.distance,
                })
                .collect(),
            needs: vec![
                NeedDto {
                    need: "hunger".to_string(),
                    weight: state.hunger.round() as i32,
                },
                NeedDto {
                    need: "thirst".to_string(),
                    weight: state.thirst.round() as i32,
                },
            ],
            stopped_action: state.stopped_action.clone(),
        }
    }

    /// Spawns the chat request for a snapshot onto the runtime.
    fn send_request(&mut self, state: &NpcState, actions: &[EnvironmentAction]) {
        let snapshot = Self::snapshot(state, actions);
        let body = match serde_json::to_string(&snapshot) {
            Ok(body) => body,
            Err(e) => {
                error!("failed to serialize decision snapshot: {}", e);
                return;
            }
        };

        let system = format!(
            "You are {}, a villager. Given your memories, needs, and the \
             numbered list of possible actions in current_environment, reply \
             with a single number between 1 and {} choosing one action. Reply \
             with the number only.",
            state.name,
            actions.len()
        );
        let request = ChatRequest::new(
            &state.model_id,
            vec![ChatMessage::system(system), ChatMessage::user(body)],
        );

        let request_id = Uuid::new_v4();
        debug!("[{}] {} asks for a decision", request_id, state.name);

        let service = Arc::clone(&self.service);
        let mailbox = Arc::clone(&self.mailbox);
        tokio::spawn(async move {
            let reply = match service.chat(&request).await {
                Ok(reply) => reply,
                Err(e) => {
                    error!("[{}] chat request failed: {}", request_id, e);
                    ChatResponse::failure(e.to_string())
                }
            };
            debug!("[{}] reply delivered", request_id);
            let mut slot = mailbox.lock().unwrap_or_else(|e| e.into_inner());
            *slot = Some(reply);
        });
    }

    /// Settles pending memory relevance scores through the service, one
    /// outstanding request at a time and never blocking the tick.
    fn refresh_relevance(&mut self, state: &mut NpcState) {
        if let Some(text) = &self.scoring {
            let delivered = self
                .relevance
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .take();
            let Some(score) = delivered else { return };
            if let Some(memory) = state
                .memories
                .iter_mut()
                .find(|m| m.pending_score && m.text == *text)
            {
                memory.relevance = score as f32;
                memory.pending_score = false;
            }
            self.scoring = None;
            return;
        }

        let Some(memory) = state.memories.iter().find(|m| m.pending_score) else {
            return;
        };
        let text = memory.text.clone();
        let concerns = state.core_memories.clone();
        let model_id = state.model_id.clone();
        let service = Arc::clone(&self.service);
        let slot = Arc::clone(&self.relevance);
        debug!("{} rates the relevance of {:?}", state.name, text);
        self.scoring = Some(text.clone());
        tokio::spawn(async move {
            let score = score_relevance(service.as_ref(), &model_id, &text, &concerns).await;
            *slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(score);
        });
    }

    /// Maps a reply back onto a decision via the menu that was sent.
    fn decision_from_reply(
        &mut self,
        reply: &ChatResponse,
        actions: &[EnvironmentAction],
    ) -> Decision {
        if !reply.success {
            error!("inference request failed: {}", reply.response);
            return Decision::idle();
        }

        let choice = match reply.response.trim().parse::<usize>() {
            Ok(n) if n >= 1 && n <= actions.len() => &actions[n - 1],
            _ => {
                error!("unparsable decision reply: {:?}", reply.response);
                return Decision::idle();
            }
        };

        match choice.kind {
            ActionKind::Idle => Decision::idle(),
            ActionKind::Wander => Decision::wander(),
            ActionKind::VisitWell => match choice.structure {
                Some(id) => Decision::visit(
                    id,
                    StructureKind::Well,
                    self.rng.gen_range(3.0..10.0),
                    false,
                ),
                None => Decision::idle(),
            },
            ActionKind::VisitTavern => match choice.structure {
                Some(id) => Decision::visit(
                    id,
                    StructureKind::Tavern,
                    self.rng.gen_range(10.0..30.0),
                    true,
                ),
                None => Decision::idle(),
            },
            ActionKind::VisitChurch => match choice.structure {
                Some(id) => Decision::visit(
                    id,
                    StructureKind::Church,
                    self.rng.gen_range(10.0..30.0),
                    true,
                ),
                None => Decision::idle(),
            },
            ActionKind::TalkToNpc => Decision::talk_to_npc(),
        }
    }
}

impl DecisionStrategy for LlmStrategy {
    fn select_next(&mut self, state: &mut NpcState, ctx: &SimContext) -> Decision {
        if !ctx.service_ready {
            return Decision::wait_for_service();
        }

        self.refresh_relevance(state);

        let delivered = self
            .mailbox
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(reply) = delivered {
            let offered = self.offered.take().unwrap_or_default();
            return self.decision_from_reply(&reply, &offered);
        }

        if self.offered.is_some() {
            // One request per villager at a time; keep waiting on the same
            // mailbox.
            return Decision::wait_for_reply(Arc::clone(&self.mailbox));
        }

        let actions = Self::environment_actions(state, ctx);
        self.send_request(state, &actions);
        self.offered = Some(actions);
        Decision::wait_for_reply(Arc::clone(&self.mailbox))
    }
}

/// Parses a relevance score reply (bare integer 1-10), defaulting when the
/// reply is unusable.
pub fn parse_relevance(reply: &str) -> i32 {
    reply
        .trim()
        .parse::<i32>()
        .ok()
        .filter(|v| (1..=10).contains(v))
        .unwrap_or(crate::config::DEFAULT_RELEVANCE)
}

/// Asks the model how relevant a memory is to a villager's concerns.
/// Transport failures and unusable replies fall back to the default score.
pub async fn score_relevance(
    service: &dyn LlmService,
    model_id: &str,
    memory: &str,
    concerns: &[String],
) -> i32 {
    let prompt = format!(
        "Rate how relevant the following memory is to this villager's \
         concerns on a scale of 1 to 10. Reply with the number only.\n\
         Concerns: {}\nMemory: {}",
        concerns.join("; "),
        memory
    );
    let request = ChatRequest::new(model_id, vec![ChatMessage::user(prompt)]);
    match service.chat(&request).await {
        Ok(reply) if reply.success => parse_relevance(&reply.response),
        Ok(reply) => {
            error!("relevance request failed: {}", reply.response);
            crate::config::DEFAULT_RELEVANCE
        }
        Err(e) => {
            error!("relevance request failed: {}", e);
            crate::config::DEFAULT_RELEVANCE
        }
    }
}
