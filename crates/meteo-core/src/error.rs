//! Centralized error types for the Meteo application.
//!
//! This module provides a typed error hierarchy that:
//! - Enables precise error handling throughout the codebase
//! - Provides user-friendly messages suitable for display
//! - Preserves full error context for debugging/logging

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a display-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Storage(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::ServerError { status: 401, .. } => {
                "The weather API key was rejected. Check your settings."
            }
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The weather service is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request failed. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::ServerError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Local key-value storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read {key}: {message}")]
    Read { key: String, message: String },

    #[error("Failed to write {key}: {message}")]
    Write { key: String, message: String },

    #[error("Stored value for {key} is corrupted: {message}")]
    Corruption { key: String, message: String },
}

impl StorageError {
    pub fn read(key: impl Into<String>, message: impl ToString) -> Self {
        Self::Read {
            key: key.into(),
            message: message.to_string(),
        }
    }

    pub fn write(key: impl Into<String>, message: impl ToString) -> Self {
        Self::Write {
            key: key.into(),
            message: message.to_string(),
        }
    }

    pub fn corruption(key: impl Into<String>, message: impl ToString) -> Self {
        Self::Corruption {
            key: key.into(),
            message: message.to_string(),
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            StorageError::Read { .. } => "Unable to read saved cities.",
            StorageError::Write { .. } => "Unable to save your cities. Please try again.",
            StorageError::Corruption { .. } => {
                "Saved cities could not be read. Consider resetting app data."
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::MissingSetting(_) => "A required setting is missing. Check your settings.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_non_empty() {
        let errors = vec![
            AppError::Network(NetworkError::Timeout),
            AppError::Storage(StorageError::read("favorites", "denied")),
            AppError::Config(ConfigError::MissingSetting("weather.api_key".into())),
            AppError::Io(std::io::Error::new(std::io::ErrorKind::Other, "io")),
        ];

        for err in errors {
            assert!(!err.user_message().is_empty(), "{err:?}");
        }
    }

    #[test]
    fn test_app_error_conversion() {
        let err: AppError = ConfigError::MissingSetting("weather.api_key".into()).into();
        assert!(matches!(err, AppError::Config(ConfigError::MissingSetting(_))));
    }

    #[test]
    fn test_server_error_messages_by_status() {
        let unauthorized = NetworkError::ServerError {
            status: 401,
            message: "Invalid API key".into(),
        };
        assert!(unauthorized.user_message().contains("API key"));
        assert_eq!(unauthorized.status(), Some(401));

        let unavailable = NetworkError::ServerError {
            status: 503,
            message: String::new(),
        };
        assert!(unavailable.user_message().contains("try again later"));
        assert_eq!(NetworkError::Timeout.status(), None);
    }

    #[test]
    fn test_storage_error_display_names_key() {
        let err = StorageError::corruption("favorites", "expected a list");
        assert!(err.to_string().contains("favorites"));
        assert!(err.to_string().contains("expected a list"));
    }
}
