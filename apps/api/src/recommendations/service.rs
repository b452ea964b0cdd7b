//! Recommendation pipeline: weather → prompt → generative model → block extraction.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::recommendations::extractor::{BlockExtractor, RecommendationBlock};
use crate::recommendations::prompts::{build_tree_prompt, TREE_MARKER};
use crate::weather::{WeatherConditions, WeatherSource};

/// Result of one recommendation run.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationReport {
    pub weather: WeatherConditions,
    pub recommendations: Vec<RecommendationBlock>,
    /// True when generation failed and `recommendations` is empty for that reason.
    pub degraded: bool,
}

#[derive(Clone)]
pub struct RecommendationService {
    weather: Arc<dyn WeatherSource>,
    generator: Arc<dyn TextGenerator>,
    extractor: BlockExtractor,
    count: u32,
}

impl RecommendationService {
    pub fn new(
        weather: Arc<dyn WeatherSource>,
        generator: Arc<dyn TextGenerator>,
        count: u32,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            weather,
            generator,
            extractor: BlockExtractor::new(TREE_MARKER)?.with_item_label("Tree"),
            count,
        })
    }

    pub fn extractor(&self) -> &BlockExtractor {
        &self.extractor
    }

    /// Current conditions at a coordinate.
    pub async fn weather(&self, latitude: f64, longitude: f64) -> Result<WeatherConditions, AppError> {
        validate_coordinates(latitude, longitude)?;
        Ok(self.weather.current(latitude, longitude).await?)
    }

    /// Full pipeline. A generation failure degrades to an empty list rather than an error.
    pub async fn recommend(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<RecommendationReport, AppError> {
        let weather = self.weather(latitude, longitude).await?;
        let prompt = build_tree_prompt(&weather, self.count);

        match self.generator.generate(&prompt).await {
            Ok(text) => {
                let recommendations = self.extractor.extract(&text);
                info!(
                    "Generated {} recommendation(s) for {}",
                    recommendations.len(),
                    weather.location
                );
                Ok(RecommendationReport {
                    weather,
                    recommendations,
                    degraded: false,
                })
            }
            Err(e) => {
                error!("Error fetching recommendations: {e}");
                Ok(RecommendationReport {
                    weather,
                    recommendations: vec![],
                    degraded: true,
                })
            }
        }
    }
}

fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), AppError> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(AppError::Validation(
            "latitude must be between -90 and 90".to_string(),
        ));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(AppError::Validation(
            "longitude must be between -180 and 180".to_string(),
        ));
    }
    Ok(())
}
