//! Search state machine.
//!
//! `Idle -> Validating -> Geocoding -> FetchingWeather -> Success | Failed -> Idle`.
//! Only one search is tracked at a time; the orchestrator owns the transitions.

use crate::error::SearchError;

/// Progress of the tracked search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Validating,
    Geocoding,
    FetchingWeather,
    Success,
    Failed(SearchError),
}

impl SearchState {
    /// True while a network call for the tracked search is outstanding.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Geocoding | Self::FetchingWeather)
    }

    /// True once the tracked search has produced a result.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Success | Self::Failed(_))
    }

    /// The failure, if the last search failed.
    pub fn error(&self) -> Option<&SearchError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// State after validation passed.
    pub fn on_validated(&self) -> Self {
        Self::Geocoding
    }

    /// State after the geocoder resolved a location.
    pub fn on_geocoded(&self) -> Self {
        match self {
            Self::Geocoding => Self::FetchingWeather,
            other => other.clone(),
        }
    }

    /// State after the user dismisses a result.
    pub fn on_reset(&self) -> Self {
        if self.is_in_flight() {
            self.clone()
        } else {
            Self::Idle
        }
    }
}

impl std::fmt::Display for SearchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Validating => write!(f, "validating"),
            Self::Geocoding => write!(f, "geocoding"),
            Self::FetchingWeather => write!(f, "fetching weather"),
            Self::Success => write!(f, "success"),
            Self::Failed(e) => write!(f, "failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_is_neither_in_flight_nor_settled() {
        let s = SearchState::Idle;
        assert!(!s.is_in_flight());
        assert!(!s.is_settled());
        assert_eq!(s.error(), None);
    }

    #[test]
    fn network_states_are_in_flight() {
        assert!(SearchState::Geocoding.is_in_flight());
        assert!(SearchState::FetchingWeather.is_in_flight());
        assert!(!SearchState::Validating.is_in_flight());
    }

    #[test]
    fn geocoded_advances_only_from_geocoding() {
        assert_eq!(SearchState::Geocoding.on_geocoded(), SearchState::FetchingWeather);
        assert_eq!(SearchState::Success.on_geocoded(), SearchState::Success);
    }

    #[test]
    fn reset_returns_settled_to_idle() {
        assert_eq!(SearchState::Success.on_reset(), SearchState::Idle);
        assert_eq!(
            SearchState::Failed(SearchError::NotFound).on_reset(),
            SearchState::Idle
        );
        assert_eq!(SearchState::Geocoding.on_reset(), SearchState::Geocoding);
    }

    #[test]
    fn failed_exposes_error() {
        let s = SearchState::Failed(SearchError::TooShort);
        assert!(s.is_settled());
        assert_eq!(s.error(), Some(&SearchError::TooShort));
        assert_eq!(s.to_string(), "failed: query shorter than 2 characters");
    }
}
