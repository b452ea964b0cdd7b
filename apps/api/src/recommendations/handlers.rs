//! Axum route handlers for the Recommendations API.

use axum::{
    extract::{Query, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::recommendations::extractor::RecommendationBlock;
use crate::recommendations::service::RecommendationReport;
use crate::state::AppState;
use crate::weather::WeatherConditions;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CoordinatesQuery {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub recommendations: Vec<RecommendationBlock>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/recommendations/extract
///
/// Runs the block extractor over a raw model response sent as the request body.
/// Any body is accepted, including an empty one; invalid UTF-8 is replaced.
pub async fn handle_extract(State(state): State<AppState>, body: Bytes) -> Json<ExtractResponse> {
    let recommendations = state.service.extractor().extract_lossy(&body);
    Json(ExtractResponse { recommendations })
}

/// GET /api/v1/weather?lat=..&lon=..
pub async fn handle_weather(
    State(state): State<AppState>,
    Query(params): Query<CoordinatesQuery>,
) -> Result<Json<WeatherConditions>, AppError> {
    let weather = state.service.weather(params.lat, params.lon).await?;
    Ok(Json(weather))
}

/// POST /api/v1/recommendations
///
/// Full pipeline: weather lookup → prompt → generative model → extraction.
pub async fn handle_recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> Result<Json<RecommendationReport>, AppError> {
    let report = state
        .service
        .recommend(request.latitude, request.longitude)
        .await?;
    Ok(Json(report))
}
