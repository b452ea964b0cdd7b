pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::recommendations::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/weather", get(handlers::handle_weather))
        .route("/api/v1/recommendations", post(handlers::handle_recommend))
        .route(
            "/api/v1/recommendations/extract",
            post(handlers::handle_extract),
        )
        .with_state(state)
}
