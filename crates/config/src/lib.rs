#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for the sovereign tools
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/sovereign/config.toml)
//! - Environment variables
//! - CLI flags (applied by the binaries)

pub mod constants;
pub mod core;

pub use crate::core::{ChatConfig, GeneralConfig, PathConfig, VerifyConfig};

use serde::{Deserialize, Serialize};
use sov_errors::{ConfigError, Error};
use sov_types::{ColorChoice, OutputFormat};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub verify: VerifyConfig,

    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub paths: PathConfig,
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join(constants::APP_DIR).join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this structure.
    pub fn from_toml(contents: &str) -> Result<Self, Error> {
        toml::from_str(contents).map_err(Error::from)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = match Self::default_path() {
            Ok(path) => path,
            Err(_) => return Ok(Self::default()),
        };

        if config_path.exists() {
            tracing::debug!(path = %config_path.display(), "loading config file");
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// If path is provided, loads from that file.
    /// If path is None, uses the default loading behavior.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        self.merge_env_from(|key| std::env::var(key).ok())
    }

    /// Merge values from an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to a value that cannot be
    /// parsed into the expected type.
    pub fn merge_env_from<F>(&mut self, lookup: F) -> Result<(), Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        use constants::{
            ENV_API_KEY, ENV_BASE_URL, ENV_COLOR, ENV_MODEL, ENV_OUTPUT, ENV_VERIFY_ALGORITHM,
            ENV_VERIFY_CHUNK_SIZE,
        };

        if let Some(output) = lookup(ENV_OUTPUT) {
            self.general.default_output = match output.as_str() {
                "plain" => OutputFormat::Plain,
                "tty" => OutputFormat::Tty,
                "json" => OutputFormat::Json,
                _ => return Err(invalid(ENV_OUTPUT, output)),
            };
        }

        if let Some(color) = lookup(ENV_COLOR) {
            self.general.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => return Err(invalid(ENV_COLOR, color)),
            };
        }

        if let Some(algorithm) = lookup(ENV_VERIFY_ALGORITHM) {
            self.verify.algorithm = algorithm
                .parse()
                .map_err(|_| invalid(ENV_VERIFY_ALGORITHM, algorithm))?;
        }

        if let Some(chunk_size) = lookup(ENV_VERIFY_CHUNK_SIZE) {
            self.verify.chunk_size = chunk_size
                .parse()
                .map_err(|_| invalid(ENV_VERIFY_CHUNK_SIZE, chunk_size))?;
        }

        if let Some(base_url) = lookup(ENV_BASE_URL) {
            self.chat.base_url = base_url;
        }
        if let Some(api_key) = lookup(ENV_API_KEY) {
            self.chat.api_key = api_key;
        }
        if let Some(model) = lookup(ENV_MODEL) {
            self.chat.model = model;
        }

        Ok(())
    }

    /// Directory for debug log files (with default)
    #[must_use]
    pub fn log_dir(&self) -> PathBuf {
        self.paths.log_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(constants::APP_DIR)
                .join("logs")
        })
    }

    /// Directory for chat transcripts (with default)
    #[must_use]
    pub fn transcript_dir(&self) -> PathBuf {
        self.chat.transcript_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".local")
                .join("share")
                .join("sovereign-chat")
        })
    }
}

fn invalid(field: &str, value: String) -> Error {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value,
    }
    .into()
}
