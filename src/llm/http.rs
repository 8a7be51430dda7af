//! Reqwest-backed implementation of the inference service contract.

use crate::llm::{
    ChatRequest, ChatResponse, LlmService, LoadModelRequest, ServerStatus, ServiceReply,
};
use crate::HamletResult;
use async_trait::async_trait;
use log::debug;
use std::time::Duration;

/// HTTP client for the inference server.
///
/// # Examples
///
/// ```no_run
/// use hamlet::HttpLlmService;
///
/// let service = HttpLlmService::new("http://127.0.0.1:5000");
/// ```
pub struct HttpLlmService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpLlmService {
    /// Creates a client for a server base URL (no trailing slash needed).
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }
}

#[async_trait]
impl LlmService for HttpLlmService {
    async fn status(&self) -> HamletResult<ServerStatus> {
        let status = self
            .client
            .get(self.url("status"))
            .send()
            .await?
            .json::<ServerStatus>()
            .await?;
        debug!(
            "server status: healthy={} models={}",
            status.healthy,
            status.models.len()
        );
        Ok(status)
    }

    async fn load_model(&self, request: &LoadModelRequest) -> HamletResult<ServiceReply> {
        debug!("loading model {}", request.model_id);
        let reply = self
            .client
            .post(self.url("load"))
            .json(request)
            .send()
            .await?
            .json::<ServiceReply>()
            .await?;
        Ok(reply)
    }

    async fn unload_model(&self, model_id: &str) -> HamletResult<ServiceReply> {
        debug!("unloading model {}", model_id);
        let reply = self
            .client
            .post(self.url("unload"))
            .json(&serde_json::json!({ "model_id": model_id }))
            .send()
            .await?
            .json::<ServiceReply>()
            .await?;
        Ok(reply)
    }

    async fn chat(&self, request: &ChatRequest) -> HamletResult<ChatResponse> {
        let reply = self
            .client
            .post(self.url("chat"))
            .json(request)
            .send()
            .await?
            .json::<ChatResponse>()
            .await?;
        Ok(reply)
    }
}
