use meteo_weather::{Coordinates, CurrentWeather, ForecastPoint, ForecastSeries, LocationCandidate};

use crate::state::SearchState;

/// Identifies one submitted search. Ids increase monotonically per orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RequestId(pub u64);

impl RequestId {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything the front-end renders. Only the orchestrator mutates it.
///
/// `current`, `forecast` and `coordinates` always belong to the same
/// successful search; a failed search leaves all three as they were.
#[derive(Debug, Clone, Default)]
pub struct SearchSession {
    pub input: String,
    pub suggestions: Vec<LocationCandidate>,
    pub current: Option<CurrentWeather>,
    pub forecast: Vec<ForecastPoint>,
    pub coordinates: Option<Coordinates>,
    pub state: SearchState,
    /// User-facing text for the last failure
    pub error_message: Option<String>,
    pub latest_request: RequestId,
}

impl SearchSession {
    /// Whether a spinner should be shown
    pub fn loading(&self) -> bool {
        self.state.is_in_flight()
    }

    pub fn has_weather(&self) -> bool {
        self.current.is_some()
    }

    /// Chart series for the current forecast
    pub fn series(&self) -> ForecastSeries {
        ForecastSeries::from_points(&self.forecast)
    }
}
