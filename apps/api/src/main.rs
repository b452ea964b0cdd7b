mod config;
mod errors;
mod llm_client;
mod recommendations;
mod routes;
mod state;
mod weather;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::recommendations::service::RecommendationService;
use crate::routes::build_router;
use crate::state::AppState;
use crate::weather::WeatherClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting EcoConnect API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize weather client
    let weather = WeatherClient::new(config.openweather_api_key.clone())?;
    info!("Weather client initialized");

    // Initialize LLM client
    let llm = LlmClient::new(config.gemini_api_key.clone(), config.gemini_model.clone())?;
    info!("LLM client initialized (model: {})", llm.model());

    let service = RecommendationService::new(
        Arc::new(weather),
        Arc::new(llm),
        config.recommendation_count,
    )?;
    info!(
        "Recommendation service ready ({} trees per request, marker '{}')",
        config.recommendation_count,
        service.extractor().marker()
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        service,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the dashboard host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
