use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{AppError, ConfigError};

/// Environment variable consulted first for the OpenWeatherMap API key
pub const API_KEY_ENV: &str = "OPEN_WEATHER_MAP_API_KEY";

/// Fallback environment variable for the API key
pub const API_KEY_ENV_FALLBACK: &str = "METEO_API_KEY";

/// The geocoding endpoint never returns more than this many candidates per query
pub const MAX_SUGGESTIONS: usize = 5;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// A missing API key on its own is `MissingSetting`, anything else `Invalid`
    pub fn to_config_error(&self) -> ConfigError {
        match self.errors.as_slice() {
            [only] if only.field == "weather.api_key" => {
                ConfigError::MissingSetting(only.field.clone())
            }
            _ => ConfigError::Invalid(self.error_summary()),
        }
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory the configuration was loaded from
    #[serde(skip)]
    pub config_dir: PathBuf,

    /// Weather API settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Where favorites and other local state live
    #[serde(default)]
    pub storage: StorageConfig,

    /// User-facing messages for search outcomes
    #[serde(default)]
    pub messages: MessagesConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key. Usually supplied through `OPEN_WEATHER_MAP_API_KEY`
    /// rather than written to disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// API base URL, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Language code passed to the forecast endpoint
    #[serde(default = "default_language")]
    pub language: String,

    /// Number of suggestions requested while typing
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,

    /// Quiet period before a suggestion lookup fires
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_suggestion_limit() -> usize {
    MAX_SUGGESTIONS
}

fn default_debounce_ms() -> u64 {
    500
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            language: default_language(),
            suggestion_limit: default_suggestion_limit(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl WeatherConfig {
    /// The configured API key, trimmed. Empty values count as missing.
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ConfigError::MissingSetting("weather.api_key".to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for persisted key-value records (favorites)
    #[serde(default = "default_data_dir_str")]
    pub data_dir: String,
}

fn default_data_dir_str() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("meteo")
        .to_string_lossy()
        .into_owned()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir_str(),
        }
    }
}

impl StorageConfig {
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }
}

/// Short texts shown to the user when a search does not succeed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesConfig {
    #[serde(default = "default_empty_message")]
    pub empty: String,
    #[serde(default = "default_too_short_message")]
    pub too_short: String,
    #[serde(default = "default_not_found_message")]
    pub not_found: String,
    #[serde(default = "default_general_message")]
    pub general: String,
    /// `{city}` is replaced with the city name
    #[serde(default = "default_already_favorite_message")]
    pub already_favorite: String,
}

fn default_empty_message() -> String {
    "Please insert a city".to_string()
}

fn default_too_short_message() -> String {
    "Insert at least 2 characters".to_string()
}

fn default_not_found_message() -> String {
    "City not found".to_string()
}

fn default_general_message() -> String {
    "A general error occurred".to_string()
}

fn default_already_favorite_message() -> String {
    "{city} is already in the favorites' list".to_string()
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            empty: default_empty_message(),
            too_short: default_too_short_message(),
            not_found: default_not_found_message(),
            general: default_general_message(),
            already_favorite: default_already_favorite_message(),
        }
    }
}

impl MessagesConfig {
    pub fn already_favorite_for(&self, city: &str) -> String {
        self.already_favorite.replace("{city}", city)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("meteo");

        Self {
            config_dir,
            weather: WeatherConfig::default(),
            storage: StorageConfig::default(),
            messages: MessagesConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing defaults there first if missing.
    /// Every section is optional.
    ///
    /// # Errors
    /// `AppError::Io` if the file cannot be read, `ConfigError::ParseError`
    /// if it is not valid TOML for this schema.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

        if !path.exists() {
            let config = Self {
                config_dir,
                ..Self::default()
            };
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path)
            .map_err(AppError::from)
            .context("Failed to read config file")?;

        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| AppError::Config(ConfigError::ParseError(e.to_string())))
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.config_dir = config_dir;

        Ok(config)
    }

    /// Load configuration, apply environment overrides and validate it.
    ///
    /// A missing API key is a validation error, so startup fails here rather
    /// than on the first request.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(AppError::Config(validation.to_config_error())).context(format!(
                "Configuration validation failed: {}",
                validation.error_summary()
            ));
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Pick up the API key from the environment when set
    pub fn apply_env_overrides(&mut self) {
        self.apply_api_key_override(
            std::env::var(API_KEY_ENV)
                .ok()
                .or_else(|| std::env::var(API_KEY_ENV_FALLBACK).ok()),
        );
    }

    fn apply_api_key_override(&mut self, key: Option<String>) {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            tracing::debug!("Using API key from environment");
            self.weather.api_key = Some(key);
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.weather.api_key().is_err() {
            result.add_error(
                "weather.api_key",
                format!("API key is not set (export {})", API_KEY_ENV),
            );
        }

        self.validate_url(&self.weather.base_url, "weather.base_url", &mut result);

        if self.weather.suggestion_limit == 0 {
            result.add_error(
                "weather.suggestion_limit",
                "Suggestion limit must be greater than 0",
            );
        } else if self.weather.suggestion_limit > MAX_SUGGESTIONS {
            result.add_warning(
                "weather.suggestion_limit",
                format!("Suggestion limit is capped at {}", MAX_SUGGESTIONS),
            );
        }

        if self.weather.debounce_ms == 0 {
            result.add_warning(
                "weather.debounce_ms",
                "Debounce disabled (0 ms), every keystroke triggers a lookup",
            );
        }

        if self.weather.language.trim().is_empty() {
            result.add_warning("weather.language", "Language is empty, API default is used");
        }

        if self.storage.data_dir.trim().is_empty() {
            result.add_error("storage.data_dir", "Data directory must not be empty");
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("meteo");

        Ok(config_dir.join("config.toml"))
    }
}
