use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::agent::claude::ClaudeClient;
use crate::agent::ChatModel;
use crate::chat::actions::{CommandRegistry, OpenUrlCommand, SystemUrlOpener, OPEN_URL_COMMAND};
use crate::chat::router::{CommandRouter, RouterSettings};
use crate::config::AppConfig;
use crate::platform::github::GitHubActions;
use crate::platform::CiBackend;

pub struct AppState {
    pub router: CommandRouter,
    pub commands: CommandRegistry,
    /// Parent of every turn's cancellation token.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: &AppConfig) -> crate::error::Result<Self> {
        let backend: Arc<dyn CiBackend> = Arc::new(GitHubActions::new(&config.github)?);
        let model: Arc<dyn ChatModel> = Arc::new(ClaudeClient::new(
            &config.model.api_key,
            config.model.max_tokens,
        ));

        let mut commands = CommandRegistry::new();
        commands.register(
            OPEN_URL_COMMAND,
            Box::new(OpenUrlCommand::new(Arc::new(SystemUrlOpener::new()?))),
        )?;

        Ok(Self::with_parts(config, backend, model, commands))
    }

    pub fn with_parts(
        config: &AppConfig,
        backend: Arc<dyn CiBackend>,
        model: Arc<dyn ChatModel>,
        commands: CommandRegistry,
    ) -> Self {
        let router = CommandRouter::new(backend, model, RouterSettings::from(config));
        Self {
            router,
            commands,
            shutdown: CancellationToken::new(),
        }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/chat", post(crate::api::handler::handle_chat))
        .route("/commands/:id", post(crate::api::handler::invoke_command))
        .route("/health", get(crate::api::handler::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
