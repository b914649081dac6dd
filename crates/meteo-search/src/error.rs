//! Search outcomes that are shown to the user instead of weather.

use meteo_core::MessagesConfig;
use thiserror::Error;

/// Why a search did not produce weather. All of these are recovered locally
/// and rendered with the configured message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("empty query")]
    EmptyQuery,

    #[error("query shorter than 2 characters")]
    TooShort,

    #[error("no location matches the query")]
    NotFound,

    /// Network, HTTP status and decode failures, deliberately not told apart
    #[error("weather lookup failed: {0}")]
    General(String),
}

impl SearchError {
    /// The configured user-facing text for this outcome
    pub fn message<'a>(&self, messages: &'a MessagesConfig) -> &'a str {
        match self {
            Self::EmptyQuery => &messages.empty,
            Self::TooShort => &messages.too_short,
            Self::NotFound => &messages.not_found,
            Self::General(_) => &messages.general,
        }
    }

    /// Validation failures are decided before any network call
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyQuery | Self::TooShort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_come_from_config() {
        let mut messages = MessagesConfig::default();
        assert_eq!(SearchError::EmptyQuery.message(&messages), "Please insert a city");
        assert_eq!(SearchError::TooShort.message(&messages), "Insert at least 2 characters");
        assert_eq!(SearchError::NotFound.message(&messages), "City not found");
        assert_eq!(
            SearchError::General("timeout".into()).message(&messages),
            "A general error occurred"
        );

        messages.not_found = "Città non trovata".into();
        assert_eq!(SearchError::NotFound.message(&messages), "Città non trovata");
    }

    #[test]
    fn test_is_validation() {
        assert!(SearchError::EmptyQuery.is_validation());
        assert!(SearchError::TooShort.is_validation());
        assert!(!SearchError::NotFound.is_validation());
    }
}
