use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use aiops::config::AppConfig;
use aiops::server::{create_router, AppState};
use aiops::shutdown::{cancel_turns, wait_for_shutdown};

#[derive(Parser)]
#[command(name = "aiops", about = "Chat command router for GitHub Actions deployments")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;

    tracing::info!(
        host = %config.server.host,
        port = %config.server.port,
        owner = %config.github.owner,
        repo = %config.github.repo,
        model = %config.model.model,
        "Starting AIOps server"
    );

    let state = Arc::new(AppState::new(&config)?);
    let app = create_router(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind(format!(
        "{}:{}",
        config.server.host, config.server.port
    ))
    .await?;

    tracing::info!("Listening on {}", listener.local_addr()?);

    let shutdown_state = Arc::clone(&state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_shutdown().await;
            cancel_turns(&shutdown_state);
        })
        .await?;

    tracing::info!("Shutdown complete");

    Ok(())
}
