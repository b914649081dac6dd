use chrono::{DateTime, Utc};
use meteo_core::{AppError, ConfigError, NetworkError};
use serde::{Deserialize, Serialize};

const ICON_URL_BASE: &str = "https://openweathermap.org/img/wn";

/// A latitude/longitude pair. The map pin and the key of every weather fetch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// A place returned by geocoding, not yet confirmed by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCandidate {
    pub name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationCandidate {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// "Rome, IT"
    pub fn label(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }
}

/// Current conditions at the searched place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub city: String,
    pub country: String,
    /// Short condition group, e.g. "Clouds"
    pub condition_label: String,
    /// OpenWeatherMap icon code, e.g. "04d"
    pub icon_id: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
}

impl CurrentWeather {
    /// Icon image URL, when the API reported an icon
    pub fn icon_url(&self) -> Option<String> {
        if self.icon_id.is_empty() {
            None
        } else {
            Some(format!("{}/{}.png", ICON_URL_BASE, self.icon_id))
        }
    }
}

/// One step of the forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: DateTime<Utc>,
    pub temperature_c: f64,
    pub humidity_pct: u8,
    /// Metres per second
    pub wind_speed: f64,
}

impl ForecastPoint {
    /// Short axis label, e.g. "Mon 15:00"
    pub fn label(&self) -> String {
        self.timestamp.format("%a %H:00").to_string()
    }
}

/// Everything one successful fetch produced, keyed by the coordinates it was
/// fetched for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub coordinates: Coordinates,
    pub current: CurrentWeather,
    pub forecast: Vec<ForecastPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

/// The temperature, humidity and wind series a chart needs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastSeries {
    pub temperature: Vec<SeriesPoint>,
    pub humidity: Vec<SeriesPoint>,
    pub wind: Vec<SeriesPoint>,
}

impl ForecastSeries {
    pub fn from_points(points: &[ForecastPoint]) -> Self {
        let mut series = Self::default();
        for point in points {
            let label = point.label();
            series.temperature.push(SeriesPoint {
                label: label.clone(),
                value: point.temperature_c,
            });
            series.humidity.push(SeriesPoint {
                label: label.clone(),
                value: f64::from(point.humidity_pct),
            });
            series.wind.push(SeriesPoint {
                label,
                value: point.wind_speed,
            });
        }
        series
    }

    pub fn is_empty(&self) -> bool {
        self.temperature.is_empty()
    }
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<WeatherError> for AppError {
    fn from(err: WeatherError) -> Self {
        match err {
            WeatherError::Network(e) => AppError::Network(e),
            WeatherError::Parse(message) => AppError::Network(NetworkError::InvalidResponse(message)),
            WeatherError::Config(e) => AppError::Config(e),
        }
    }
}
