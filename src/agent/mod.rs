pub mod claude;
pub mod prompt;
pub mod relay;
pub mod sse;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::error::Result;

/// Lazy, finite, non-restartable sequence of text fragments.
pub type FragmentStream = BoxStream<'static, Result<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A language model that streams its reply.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Start a streamed completion. The returned stream ends when the model
    /// finishes or `cancel` fires.
    async fn stream_chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        cancel: &CancellationToken,
    ) -> Result<FragmentStream>;
}
