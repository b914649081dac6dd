//! Current conditions and forecast for a coordinate pair.

use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use tracing::instrument;

use crate::api::ApiClient;
use crate::types::{Coordinates, CurrentWeather, ForecastPoint, WeatherError, WeatherReport};

const CURRENT_PATH: &str = "/data/2.5/weather";
const FORECAST_PATH: &str = "/data/2.5/forecast";
const UNITS: &str = "metric";

/// Source of weather data for resolved coordinates.
///
/// Both halves must succeed; a failure in either is a failure of the whole call.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch_current_and_forecast(
        &self,
        coordinates: Coordinates,
    ) -> Result<WeatherReport, WeatherError>;
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    #[serde(default)]
    name: String,
    #[serde(default)]
    sys: Option<CurrentSys>,
    #[serde(default)]
    weather: Vec<ConditionEntry>,
    main: MainReadings,
}

#[derive(Debug, Deserialize)]
struct CurrentSys {
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConditionEntry {
    main: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
    #[serde(default)]
    feels_like: Option<f64>,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    list: Vec<ForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct ForecastEntry {
    dt: i64,
    main: MainReadings,
    #[serde(default)]
    wind: Option<Wind>,
}

#[derive(Debug, Deserialize)]
struct Wind {
    speed: f64,
}

/// Humidity arrives as a JSON number; keep it in 0..=100.
fn humidity_pct(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

impl From<CurrentResponse> for CurrentWeather {
    fn from(resp: CurrentResponse) -> Self {
        let (condition_label, icon_id) = resp
            .weather
            .into_iter()
            .next()
            .map(|c| (c.main, c.icon))
            .unwrap_or_default();

        Self {
            city: resp.name,
            country: resp.sys.and_then(|s| s.country).unwrap_or_default(),
            condition_label,
            icon_id,
            temperature_c: resp.main.temp,
            feels_like_c: resp.main.feels_like.unwrap_or(resp.main.temp),
            humidity_pct: humidity_pct(resp.main.humidity),
        }
    }
}

impl TryFrom<ForecastEntry> for ForecastPoint {
    type Error = WeatherError;

    fn try_from(entry: ForecastEntry) -> Result<Self, Self::Error> {
        let timestamp = DateTime::from_timestamp(entry.dt, 0)
            .ok_or_else(|| WeatherError::Parse(format!("Invalid forecast timestamp {}", entry.dt)))?;

        Ok(Self {
            timestamp,
            temperature_c: entry.main.temp,
            humidity_pct: humidity_pct(entry.main.humidity),
            wind_speed: entry.wind.map(|w| w.speed).unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    api: ApiClient,
    language: String,
}

impl WeatherProvider {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            language: "en".to_string(),
        }
    }

    /// Language for forecast descriptions. Empty means the API default.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    fn coordinate_params(coordinates: Coordinates) -> Vec<(&'static str, String)> {
        vec![
            ("lat", coordinates.latitude.to_string()),
            ("lon", coordinates.longitude.to_string()),
            ("units", UNITS.to_string()),
        ]
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_current(&self, coordinates: Coordinates) -> Result<CurrentWeather, WeatherError> {
        let params = Self::coordinate_params(coordinates);
        let resp: CurrentResponse = self.api.get_json(CURRENT_PATH, &params).await?;
        Ok(CurrentWeather::from(resp))
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_forecast(
        &self,
        coordinates: Coordinates,
    ) -> Result<Vec<ForecastPoint>, WeatherError> {
        let mut params = Self::coordinate_params(coordinates);
        if !self.language.trim().is_empty() {
            params.push(("lang", self.language.clone()));
        }

        let resp: ForecastResponse = self.api.get_json(FORECAST_PATH, &params).await?;
        resp.list.into_iter().map(ForecastPoint::try_from).collect()
    }
}

#[async_trait]
impl WeatherSource for WeatherProvider {
    async fn fetch_current_and_forecast(
        &self,
        coordinates: Coordinates,
    ) -> Result<WeatherReport, WeatherError> {
        let (current, forecast) = tokio::try_join!(
            self.fetch_current(coordinates),
            self.fetch_forecast(coordinates)
        )?;

        tracing::info!(
            "Fetched weather for {}: {:.1}°C, {} forecast points",
            current.city,
            current.temperature_c,
            forecast.len()
        );

        Ok(WeatherReport {
            coordinates,
            current,
            forecast,
        })
    }
}
