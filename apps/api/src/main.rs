mod agents;
mod config;
mod document;
mod errors;
mod gateway;
mod llm_client;
mod mailer;
mod models;
mod routes;
mod state;
mod workflow;

#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::document::PdfTextExtractor;
use crate::gateway::Gateway;
use crate::llm_client::LlmClient;
use crate::mailer::SmtpMailer;
use crate::routes::build_router;
use crate::state::AppState;
use crate::workflow::rate_limiter::SleepRateLimiter;
use crate::workflow::runner::Workflow;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting HireWire API v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded configuration: {config:?}");

    // No key means every agent answers from its fallback.
    let gateway = match config.gemini_api_key.clone() {
        Some(key) => {
            let llm = LlmClient::new(key)?;
            info!(
                "LLM client initialized (models: {} / {})",
                llm_client::STRUCTURED_MODEL,
                llm_client::FREE_TEXT_MODEL
            );
            Gateway::new(Arc::new(llm))
        }
        None => {
            warn!("GEMINI_API_KEY not set; running in offline mode");
            Gateway::offline()
        }
    };

    let mailer = SmtpMailer::new(config.smtp_host.clone(), config.smtp_port);
    info!("SMTP transport targets {}:{}", config.smtp_host, config.smtp_port);

    let workflow = Workflow::new(
        gateway,
        Arc::new(mailer),
        Arc::new(SleepRateLimiter),
        Arc::new(PdfTextExtractor),
        config.dispatch_policy(),
    );

    let state = AppState::new(workflow, config.clone());

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
