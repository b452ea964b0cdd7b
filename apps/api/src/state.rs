use crate::config::Config;
use crate::recommendations::service::RecommendationService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Weather + generation + extraction pipeline. Clients sit behind traits for tests.
    pub service: RecommendationService,
}
