//! # LLM Service Contract
//!
//! DTOs and the async trait for the external inference server villagers
//! think with. Field names follow the server's JSON contract, so the
//! structs serialize straight onto the wire.

pub mod http;

pub use http::HttpLlmService;

use crate::{HamletError, HamletResult};
use async_trait::async_trait;
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// One message of a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `"system"`, `"user"`, or `"assistant"`.
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    /// A system-role message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// A user-role message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model_id: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl ChatRequest {
    /// Builds a request with the sampling parameters every villager uses.
    pub fn new(model_id: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model_id: model_id.into(),
            messages,
            max_tokens: 1500,
            temperature: 0.5,
            top_p: 0.95,
        }
    }
}

/// Chat completion reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default)]
    pub generation_time: f64,
    #[serde(default)]
    pub total_tokens: u32,
    pub success: bool,
}

impl ChatResponse {
    /// A failed reply carrying an error description. Spawned request tasks
    /// deliver transport errors into the mailbox this way, so the decision
    /// engine sees one reply shape.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            response: message.into(),
            generation_time: 0.0,
            total_tokens: 0,
            success: false,
        }
    }
}

/// Model load request with llama-style context parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadModelRequest {
    pub model_id: String,
    pub model_path: String,
    pub n_ctx: u32,
    pub f16_kv: bool,
    pub n_parts: i32,
    pub seed: i64,
    pub n_gpu_layers: u32,
}

impl LoadModelRequest {
    /// Defaults matching the inference server's expectations.
    pub fn new(model_id: impl Into<String>, model_path: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            model_path: model_path.into(),
            n_ctx: 4096,
            f16_kv: true,
            n_parts: -1,
            seed: -1,
            n_gpu_layers: 0,
        }
    }
}

/// Generic success/message reply for load and unload calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceReply {
    pub success: bool,
    #[serde(default)]
    pub response: Option<String>,
}

/// Server health report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerStatus {
    pub healthy: bool,
    /// Ids of models currently loaded on the server.
    #[serde(default)]
    pub models: Vec<String>,
}

/// The inference server every villager talks to.
///
/// All calls are async; simulation code never awaits them on the tick path
/// and instead spawns tasks that deliver into per-villager mailboxes.
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Health and loaded-model report.
    async fn status(&self) -> HamletResult<ServerStatus>;

    /// Loads a model onto the server.
    async fn load_model(&self, request: &LoadModelRequest) -> HamletResult<ServiceReply>;

    /// Unloads a model by id.
    async fn unload_model(&self, model_id: &str) -> HamletResult<ServiceReply>;

    /// Runs a chat completion.
    async fn chat(&self, request: &ChatRequest) -> HamletResult<ChatResponse>;
}

/// Connects to the service: checks health and unloads any models a
/// previous run left behind. Returns whether the server reported healthy.
pub async fn connect(service: &dyn LlmService) -> HamletResult<bool> {
    let status = service.status().await?;
    if !status.healthy {
        warn!("inference server reachable but not healthy");
        return Ok(false);
    }

    for model_id in &status.models {
        info!("unloading leftover model {}", model_id);
        if let Err(e) = service.unload_model(model_id).await {
            warn!("failed to unload leftover model {}: {}", model_id, e);
        }
    }
    Ok(true)
}

impl From<reqwest::Error> for HamletError {
    fn from(e: reqwest::Error) -> Self {
        HamletError::LlmError(e.to_string())
    }
}
