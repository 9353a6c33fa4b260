//! DAO Governance Analyzer binary entrypoint.
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.

use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dao_governance_analyzer::api;
use dao_governance_analyzer::config::AnalyzerConfig;
use dao_governance_analyzer::metrics::Metrics;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("dao_governance_analyzer=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();

    let config = AnalyzerConfig::load();
    info!(
        provider = %config.ai.provider,
        ai_enabled = config.ai.enabled,
        "starting dao-governance-analyzer"
    );

    let metrics = Metrics::init(config.ai.enabled);

    let state = api::AppState::from_config(&config);
    let router = api::create_router(state)
        .merge(metrics.router())
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!(addr = %config.server.bind, "api listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
