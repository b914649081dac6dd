//! Fakes for the network seams.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::DateTime;
use meteo_core::NetworkError;
use meteo_weather::{
    Coordinates, CurrentWeather, ForecastPoint, Geocoder, LocationCandidate, WeatherError,
    WeatherReport, WeatherSource,
};
use parking_lot::Mutex;

pub fn rome() -> LocationCandidate {
    LocationCandidate {
        name: "Rome".to_string(),
        country: "IT".to_string(),
        latitude: 41.9,
        longitude: 12.5,
    }
}

/// Geocoder backed by a fixed table of places, matched case-insensitively.
#[derive(Default)]
pub struct FakeGeocoder {
    places: HashMap<String, LocationCandidate>,
    suggest_calls: AtomicUsize,
    resolve_calls: AtomicUsize,
}

impl FakeGeocoder {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_rome() -> Self {
        let mut geocoder = Self::default();
        geocoder.insert(rome());
        geocoder
    }

    pub fn insert(&mut self, candidate: LocationCandidate) {
        self.places.insert(candidate.name.to_lowercase(), candidate);
    }

    pub fn suggest_calls(&self) -> usize {
        self.suggest_calls.load(Ordering::SeqCst)
    }

    pub fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn suggest(&self, query: &str) -> Vec<LocationCandidate> {
        self.suggest_calls.fetch_add(1, Ordering::SeqCst);
        let prefix = query.trim().to_lowercase();
        let mut matches: Vec<LocationCandidate> = self
            .places
            .iter()
            .filter(|(name, _)| name.starts_with(&prefix))
            .map(|(_, c)| c.clone())
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name));
        matches
    }

    async fn resolve(&self, query: &str) -> Option<LocationCandidate> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        self.places.get(&query.trim().to_lowercase()).cloned()
    }
}

/// Weather source that reports 18.2°C / 55% for any coordinates, or always fails.
pub struct FakeWeather {
    fail: bool,
    calls: AtomicUsize,
    last: Mutex<Option<Coordinates>>,
}

impl FakeWeather {
    pub fn ok() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::ok()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_coordinates(&self) -> Option<Coordinates> {
        *self.last.lock()
    }
}

#[async_trait]
impl WeatherSource for FakeWeather {
    async fn fetch_current_and_forecast(
        &self,
        coordinates: Coordinates,
    ) -> Result<WeatherReport, WeatherError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock() = Some(coordinates);

        if self.fail {
            return Err(WeatherError::Network(NetworkError::ServerError {
                status: 502,
                message: "Bad Gateway".to_string(),
            }));
        }

        let point = |dt: i64, temperature_c: f64| ForecastPoint {
            timestamp: DateTime::from_timestamp(dt, 0).unwrap_or_default(),
            temperature_c,
            humidity_pct: 60,
            wind_speed: 2.0,
        };

        Ok(WeatherReport {
            coordinates,
            current: CurrentWeather {
                city: "Rome".to_string(),
                country: "IT".to_string(),
                condition_label: "Clouds".to_string(),
                icon_id: "04d".to_string(),
                temperature_c: 18.2,
                feels_like_c: 17.6,
                humidity_pct: 55,
            },
            forecast: vec![point(1715007600, 19.0), point(1715018400, 16.4)],
        })
    }
}
