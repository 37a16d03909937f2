use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::agent::{relay, ChatModel};
use crate::chat::stream::ResponseStream;
use crate::chat::{Command, Request, TurnResult};
use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::platform::CiBackend;
use crate::workflow::{deploy, status};

/// Per-router settings taken from configuration at start-up.
#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub deploy_workflow_id: String,
    pub model_id: String,
    pub status_pacing: Duration,
}

impl From<&AppConfig> for RouterSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            deploy_workflow_id: config.github.deploy_workflow_id.clone(),
            model_id: config.model.model.clone(),
            status_pacing: config.status.pacing(),
        }
    }
}

/// Routes each turn to exactly one handler.
pub struct CommandRouter {
    backend: Arc<dyn CiBackend>,
    model: Arc<dyn ChatModel>,
    settings: RouterSettings,
}

impl CommandRouter {
    pub fn new(
        backend: Arc<dyn CiBackend>,
        model: Arc<dyn ChatModel>,
        settings: RouterSettings,
    ) -> Self {
        Self {
            backend,
            model,
            settings,
        }
    }

    /// Run one turn. The result is always tagged with the command that ran,
    /// whether or not its handler succeeded.
    pub async fn handle(
        &self,
        request: &Request,
        stream: &ResponseStream,
        cancel: &CancellationToken,
    ) -> TurnResult {
        let command = Command::parse(&request.command);
        tracing::info!(command = %command, "Handling chat turn");

        if let Err(e) = self.dispatch(command, &request.prompt, stream, cancel).await {
            match e {
                AppError::Cancelled => {
                    tracing::info!(command = %command, "Turn cancelled");
                }
                e => {
                    tracing::error!(command = %command, error = %e, "Turn failed");
                    stream.markdown(failure_notice(command, &e));
                }
            }
        }

        TurnResult::new(command)
    }

    async fn dispatch(
        &self,
        command: Command,
        prompt: &str,
        stream: &ResponseStream,
        cancel: &CancellationToken,
    ) -> Result<()> {
        match command {
            Command::Scan => {
                // TODO: start the SAST workflow once a scan workflow id is configurable
                stream.progress("Kicking off your SAST scan...");
            }
            Command::Status => {
                stream.progress("Getting status of workflow...");
                status::poll_status(
                    self.backend.as_ref(),
                    self.settings.status_pacing,
                    prompt,
                    stream,
                    cancel,
                )
                .await?;
            }
            Command::Deploy => {
                stream.progress("Deploying branch...");
                deploy::dispatch_deploy(
                    self.backend.as_ref(),
                    &self.settings.deploy_workflow_id,
                    prompt,
                    stream,
                    cancel,
                )
                .await?;
            }
            Command::OrderFreePizzaToDesk => {
                stream.progress("Nice try...");
            }
            Command::Chat => {
                relay::relay(
                    self.model.as_ref(),
                    &self.settings.model_id,
                    prompt,
                    stream,
                    cancel,
                )
                .await?;
            }
        }
        Ok(())
    }
}

fn failure_notice(command: Command, error: &AppError) -> String {
    match (error, command.usage()) {
        (e, Some(usage)) if e.is_input_error() => format!("{e}. Usage: `{usage}`"),
        (AppError::StreamInterrupted(_), _) => format!("\n\n_{error}_"),
        _ if command == Command::Chat => format!("**Chat failed:** {error}"),
        _ => format!("**`/{command}` failed:** {error}"),
    }
}
