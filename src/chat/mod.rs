pub mod actions;
pub mod command;
pub mod followup;
pub mod router;
pub mod stream;
pub mod tokenizer;

use std::future::Future;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, Result};

pub use command::Command;

/// One user turn as delivered by the chat front-end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub prompt: String,
}

impl Request {
    pub fn new(command: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            prompt: prompt.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnMetadata {
    pub command: String,
}

/// Final value of a turn, tagged with the command that ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnResult {
    pub metadata: TurnMetadata,
}

impl TurnResult {
    pub fn new(command: Command) -> Self {
        Self {
            metadata: TurnMetadata {
                command: command.tag().to_string(),
            },
        }
    }

    pub fn command(&self) -> &str {
        &self.metadata.command
    }
}

/// Run `fut` unless the turn is cancelled first.
pub async fn until_cancelled<F: Future>(cancel: &CancellationToken, fut: F) -> Result<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AppError::Cancelled),
        output = fut => Ok(output),
    }
}

/// Fail fast when the turn was cancelled between suspension points.
pub fn ensure_active(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(AppError::Cancelled);
    }
    Ok(())
}
