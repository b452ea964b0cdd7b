//! Weather client — current conditions from OpenWeatherMap.
//!
//! The upstream JSON is loosely shaped, so it is read into [`RawWeatherResponse`]
//! (everything optional) and validated into [`WeatherConditions`] here, at the edge.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const OPENWEATHER_API_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Incomplete weather response: missing {0}")]
    Incomplete(&'static str),
}

/// Validated current conditions for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherConditions {
    pub location: String,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub wind_speed_ms: f64,
    pub description: String,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
}

/// Source of current weather. Implemented by [`WeatherClient`].
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current(&self, latitude: f64, longitude: f64)
        -> Result<WeatherConditions, WeatherError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Upstream response shape
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct RawWeatherResponse {
    pub name: Option<String>,
    pub main: Option<RawMain>,
    pub wind: Option<RawWind>,
    #[serde(default)]
    pub weather: Vec<RawDescription>,
    pub sys: Option<RawSys>,
}

#[derive(Debug, Deserialize)]
pub struct RawMain {
    pub temp: Option<f64>,
    pub humidity: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RawWind {
    pub speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RawDescription {
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawSys {
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawError {
    message: String,
}

impl TryFrom<RawWeatherResponse> for WeatherConditions {
    type Error = WeatherError;

    fn try_from(raw: RawWeatherResponse) -> Result<Self, Self::Error> {
        let main = raw.main.ok_or(WeatherError::Incomplete("main"))?;
        let temperature_c = main.temp.ok_or(WeatherError::Incomplete("main.temp"))?;
        let humidity_pct = main
            .humidity
            .ok_or(WeatherError::Incomplete("main.humidity"))?;
        let wind_speed_ms = raw
            .wind
            .and_then(|w| w.speed)
            .ok_or(WeatherError::Incomplete("wind.speed"))?;
        let description = raw
            .weather
            .into_iter()
            .next()
            .and_then(|w| w.description)
            .ok_or(WeatherError::Incomplete("weather[0].description"))?;

        let (sunrise, sunset) = match raw.sys {
            Some(sys) => (
                sys.sunrise.and_then(unix_to_utc),
                sys.sunset.and_then(unix_to_utc),
            ),
            None => (None, None),
        };

        Ok(WeatherConditions {
            location: raw.name.unwrap_or_default(),
            temperature_c,
            humidity_pct,
            wind_speed_ms,
            description,
            sunrise,
            sunset,
        })
    }
}

fn unix_to_utc(seconds: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0)
}

/// OpenWeatherMap current-weather client (metric units).
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
}

impl WeatherClient {
    pub fn new(api_key: String) -> Result<Self, WeatherError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(15))
                .build()?,
            api_key,
        })
    }
}

#[async_trait]
impl WeatherSource for WeatherClient {
    async fn current(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherConditions, WeatherError> {
        let response = self
            .client
            .get(OPENWEATHER_API_URL)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("units", "metric".to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<RawError>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(WeatherError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let raw: RawWeatherResponse = response.json().await?;
        let conditions = WeatherConditions::try_from(raw)?;

        debug!(
            "Weather for ({latitude}, {longitude}): {}°C, {}% humidity, {} m/s wind",
            conditions.temperature_c, conditions.humidity_pct, conditions.wind_speed_ms
        );

        Ok(conditions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_RESPONSE: &str = r#"{
        "coord": {"lon": 77.59, "lat": 12.97},
        "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}],
        "main": {"temp": 27.4, "feels_like": 28.1, "humidity": 62, "pressure": 1012},
        "wind": {"speed": 4.1, "deg": 250},
        "sys": {"country": "IN", "sunrise": 1700000000, "sunset": 1700043200},
        "name": "Bengaluru",
        "cod": 200
    }"#;

    #[test]
    fn test_full_response_converts() {
        let raw: RawWeatherResponse = serde_json::from_str(FULL_RESPONSE).unwrap();
        let conditions = WeatherConditions::try_from(raw).unwrap();
        assert_eq!(conditions.location, "Bengaluru");
        assert!((conditions.temperature_c - 27.4).abs() < f64::EPSILON);
        assert!((conditions.humidity_pct - 62.0).abs() < f64::EPSILON);
        assert!((conditions.wind_speed_ms - 4.1).abs() < f64::EPSILON);
        assert_eq!(conditions.description, "broken clouds");
        assert_eq!(conditions.sunrise.unwrap().timestamp(), 1_700_000_000);
        assert_eq!(conditions.sunset.unwrap().timestamp(), 1_700_043_200);
    }

    #[test]
    fn test_missing_main_is_incomplete() {
        let raw: RawWeatherResponse =
            serde_json::from_str(r#"{"wind": {"speed": 1.0}, "weather": []}"#).unwrap();
        let err = WeatherConditions::try_from(raw).unwrap_err();
        assert!(matches!(err, WeatherError::Incomplete("main")));
    }

    #[test]
    fn test_missing_description_is_incomplete() {
        let raw: RawWeatherResponse = serde_json::from_str(
            r#"{"main": {"temp": 10.0, "humidity": 40}, "wind": {"speed": 2.0}, "weather": []}"#,
        )
        .unwrap();
        let err = WeatherConditions::try_from(raw).unwrap_err();
        assert!(matches!(
            err,
            WeatherError::Incomplete("weather[0].description")
        ));
    }

    #[test]
    fn test_missing_sys_and_name_are_tolerated() {
        let raw: RawWeatherResponse = serde_json::from_str(
            r#"{"main": {"temp": -3.5, "humidity": 80}, "wind": {"speed": 0.0},
                "weather": [{"description": "light snow"}]}"#,
        )
        .unwrap();
        let conditions = WeatherConditions::try_from(raw).unwrap();
        assert_eq!(conditions.location, "");
        assert!(conditions.sunrise.is_none());
        assert!(conditions.sunset.is_none());
    }

    #[test]
    fn test_error_message_formats() {
        let err = WeatherError::Api {
            status: 401,
            message: "Invalid API key".to_string(),
        };
        assert_eq!(err.to_string(), "API error (status 401): Invalid API key");
    }
}
