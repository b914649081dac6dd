//! Forward geocoding: free-text place names to candidate locations.
//! Uses the OpenWeatherMap direct geocoding endpoint.

use async_trait::async_trait;
use meteo_core::MAX_SUGGESTIONS;
use serde::Deserialize;
use tracing::instrument;

use crate::api::ApiClient;
use crate::types::{LocationCandidate, WeatherError};

const GEOCODE_PATH: &str = "/geo/1.0/direct";

/// Queries shorter than this never reach the network
pub const MIN_QUERY_CHARS: usize = 2;

/// True when `query` is long enough to geocode. Counts characters, not bytes,
/// after trimming surrounding whitespace.
pub fn is_searchable(query: &str) -> bool {
    query.trim().chars().count() >= MIN_QUERY_CHARS
}

/// Resolves place names. Failures are logged and reported as "no match".
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Up to five candidates for an in-progress query
    async fn suggest(&self, query: &str) -> Vec<LocationCandidate>;

    /// The best match for a submitted query
    async fn resolve(&self, query: &str) -> Option<LocationCandidate>;
}

#[derive(Debug, Deserialize)]
struct DirectGeocodeEntry {
    name: String,
    #[serde(default)]
    country: Option<String>,
    lat: f64,
    lon: f64,
}

impl From<DirectGeocodeEntry> for LocationCandidate {
    fn from(entry: DirectGeocodeEntry) -> Self {
        Self {
            name: entry.name,
            country: entry.country.unwrap_or_default(),
            latitude: entry.lat,
            longitude: entry.lon,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenWeatherGeocoder {
    api: ApiClient,
    suggestion_limit: usize,
}

impl OpenWeatherGeocoder {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            suggestion_limit: MAX_SUGGESTIONS,
        }
    }

    /// Clamped to `1..=5`
    pub fn with_suggestion_limit(mut self, limit: usize) -> Self {
        self.suggestion_limit = limit.clamp(1, MAX_SUGGESTIONS);
        self
    }

    /// Raw lookup that keeps the error, for callers that want to tell
    /// "no match" apart from "request failed".
    #[instrument(skip(self), level = "debug")]
    pub async fn lookup(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<LocationCandidate>, WeatherError> {
        let params = [("q", query.trim().to_string()), ("limit", limit.to_string())];
        let entries: Vec<DirectGeocodeEntry> = self.api.get_json(GEOCODE_PATH, &params).await?;

        let mut candidates: Vec<LocationCandidate> =
            entries.into_iter().map(LocationCandidate::from).collect();
        candidates.truncate(limit);
        Ok(candidates)
    }
}

#[async_trait]
impl Geocoder for OpenWeatherGeocoder {
    async fn suggest(&self, query: &str) -> Vec<LocationCandidate> {
        if !is_searchable(query) {
            return Vec::new();
        }

        match self.lookup(query, self.suggestion_limit).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!("Error fetching suggestions for {:?}: {}", query, e);
                Vec::new()
            }
        }
    }

    async fn resolve(&self, query: &str) -> Option<LocationCandidate> {
        match self.lookup(query, 1).await {
            Ok(candidates) => {
                let best = candidates.into_iter().next();
                if let Some(c) = &best {
                    tracing::info!("Geocoded {:?} to {} ({})", query, c.label(), c.coordinates());
                }
                best
            }
            Err(e) => {
                tracing::warn!("Geocoding {:?} failed: {}", query, e);
                None
            }
        }
    }
}
