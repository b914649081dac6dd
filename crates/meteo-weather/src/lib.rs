//! Weather lookup for Meteo
//!
//! Geocodes place names and fetches current conditions plus forecast from the
//! OpenWeatherMap API.

pub mod api;
pub mod geocode;
pub mod provider;
pub mod types;

pub use api::ApiClient;
pub use geocode::{is_searchable, Geocoder, OpenWeatherGeocoder, MIN_QUERY_CHARS};
pub use provider::{WeatherProvider, WeatherSource};
pub use types::*;
