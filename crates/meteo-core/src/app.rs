use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ValidationResult;
use crate::error::AppError;
use crate::Config;

/// Application state and lifecycle manager
pub struct App {
    config: Arc<Config>,
    validation: ValidationResult,
}

impl App {
    /// Load and validate configuration. Fails when the API key is missing.
    pub fn new() -> Result<Self> {
        let (config, validation) = Config::load_validated()?;
        Ok(Self {
            config: Arc::new(config),
            validation,
        })
    }

    /// Build an application around an already loaded configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let validation = config.validate();
        if !validation.is_valid() {
            return Err(AppError::Config(validation.to_config_error())).context(format!(
                "Configuration validation failed: {}",
                validation.error_summary()
            ));
        }
        Ok(Self {
            config: Arc::new(config),
            validation,
        })
    }

    /// Create the data directory
    pub fn initialize(&mut self) -> Result<()> {
        let data_dir = self.data_dir();
        std::fs::create_dir_all(&data_dir)
            .map_err(AppError::from)
            .with_context(|| format!("Failed to create {}", data_dir.display()))?;
        tracing::info!("Data directory: {}", data_dir.display());
        Ok(())
    }

    pub fn shutdown(&mut self) -> Result<()> {
        tracing::info!("Shutting down application");
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn shared_config(&self) -> Arc<Config> {
        self.config.clone()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.config.storage.data_dir()
    }

    /// Warnings collected while validating the configuration
    pub fn warnings(&self) -> &ValidationResult {
        &self.validation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn with_config_rejects_missing_key() {
        let err = App::with_config(Config::default()).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::Config(ConfigError::MissingSetting(_)))
        ));
    }

    #[test]
    fn initialize_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("data");
        std::fs::write(&blocker, "not a directory").unwrap();

        let mut config = Config::default();
        config.weather.api_key = Some("key".into());
        config.storage.data_dir = blocker.join("meteo").to_string_lossy().into_owned();

        let mut app = App::with_config(config).unwrap();
        let err = app.initialize().unwrap_err();
        assert!(matches!(err.downcast_ref::<AppError>(), Some(AppError::Io(_))));
    }

    #[test]
    fn initialize_creates_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.weather.api_key = Some("key".into());
        config.storage.data_dir = dir.path().join("data").to_string_lossy().into_owned();

        let mut app = App::with_config(config).unwrap();
        app.initialize().unwrap();
        assert!(dir.path().join("data").is_dir());
        app.shutdown().unwrap();
    }
}
