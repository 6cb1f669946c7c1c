mod api;
mod routes;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use switchboard_core::{Brain, Orchestrator, PlatformClient, Settings};

use crate::routes::{router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Logging Setup
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    info!("Switchboard Gateway Initializing...");

    // 2. Configuration, read once and handed to every collaborator
    let settings = Settings::from_env().context("Failed to load configuration")?;
    settings.log_credentials();

    // 3. Upstream clients
    let platform = Arc::new(
        PlatformClient::new(settings.platform.clone()).context("Failed to build platform client")?,
    );
    let brain = Arc::new(
        Brain::new(settings.completion.clone()).context("Failed to build completion client")?,
    );
    let orchestrator = Orchestrator::new(
        platform.clone(),
        brain,
        settings.completion.model.clone(),
        settings.agent,
    );
    info!(
        "Agent ready (max {} completion rounds per query)",
        settings.agent.max_iterations
    );

    // 4. Bundle State and define routes
    let app = router(AppState {
        platform,
        orchestrator: Arc::new(orchestrator),
    });

    // 5. Start Server
    let listener = TcpListener::bind(&settings.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", settings.listen_addr))?;
    info!("Gateway listening on {}...", settings.listen_addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
