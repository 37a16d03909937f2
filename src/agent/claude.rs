use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::agent::sse::text_fragments;
use crate::agent::{ChatMessage, ChatModel, FragmentStream, Role};
use crate::error::{AppError, Result};

const CLAUDE_API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

pub struct ClaudeClient {
    client: Client,
    api_key: String,
    max_tokens: u32,
}

impl ClaudeClient {
    pub fn new(api_key: &str, max_tokens: u32) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            max_tokens,
        }
    }
}

#[async_trait]
impl ChatModel for ClaudeClient {
    async fn stream_chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        cancel: &CancellationToken,
    ) -> Result<FragmentStream> {
        let request = MessagesRequest::new(model, self.max_tokens, messages);

        let send = self
            .client
            .post(CLAUDE_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send();

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AppError::Cancelled),
            response = send => response?,
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ModelApi(format!("API returned {status}: {body}")));
        }

        tracing::debug!(model, "Model stream opened");

        Ok(text_fragments(response.bytes_stream())
            .take_until(cancel.clone().cancelled_owned())
            .boxed())
    }
}

// --- Request types ---

#[derive(Debug, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub system: String,
    pub messages: Vec<Message>,
    pub stream: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl MessagesRequest {
    /// System messages travel in the top-level `system` field; the rest stay in order.
    pub fn new(model: &str, max_tokens: u32, messages: &[ChatMessage]) -> Self {
        let system = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let messages = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| Message {
                role: m.role,
                content: m.content.clone(),
            })
            .collect();

        Self {
            model: model.to_string(),
            max_tokens,
            system,
            messages,
            stream: true,
        }
    }
}
