//! Configuration module for the paystable CLI.
//!
//! Handles loading configuration from TOML files, CLI arguments,
//! and environment variables.

pub mod file;
pub mod runtime;

use crate::config::file::FileConfig;
use crate::config::runtime::AppConfig;
use paystable_core::config::FlowConfig;
use paystable_sdk::fiat::NumberLocale;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    backend_url_override: Option<Url>,
    locale_override: Option<String>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(
        config_path: impl AsRef<Path>,
        backend_url_override: Option<Url>,
        locale_override: Option<String>,
    ) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            backend_url_override,
            locale_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file (a missing file yields the defaults)
    /// 2. Apply CLI overrides
    /// 3. Validate and build the runtime configuration
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let file_config = match std::fs::read_to_string(&self.config_path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    "No config file at {:?}, using defaults",
                    self.config_path
                );
                FileConfig::default()
            }
            Err(e) => return Err(e.into()),
        };
        self.build(file_config)
    }

    fn build(&self, file_config: FileConfig) -> Result<AppConfig, ConfigError> {
        if file_config.backend.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "backend.timeout_secs must be greater than zero".to_string(),
            ));
        }

        let backend_url = match &self.backend_url_override {
            Some(url) => url.clone(),
            None => Url::parse(&file_config.backend.url).map_err(|e| {
                ConfigError::ValidationError(format!(
                    "invalid backend.url {:?}: {e}",
                    file_config.backend.url
                ))
            })?,
        };

        let locale = match self
            .locale_override
            .as_deref()
            .or(file_config.display.locale.as_deref())
        {
            Some(tag) => tag
                .parse::<NumberLocale>()
                .map_err(|e| ConfigError::ValidationError(e.to_string()))?,
            None => NumberLocale::system(),
        };

        Ok(AppConfig {
            backend_url,
            locale,
            flow: FlowConfig {
                request_timeout: Duration::from_secs(file_config.backend.timeout_secs),
                poll_status: file_config.polling.enabled,
                demo_mode: file_config.display.demo_mode,
            },
        })
    }
}
