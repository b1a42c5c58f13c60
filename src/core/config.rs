//! Application configuration management
//!
//! Handles loading and saving application settings including:
//! - Backend base URL
//! - Request timeout
//! - Credential storage backend
//!
//! ## Environment Variable Override
//!
//! - `FUEL_LOG_API_URL` - backend base URL
//! - `FUEL_LOG_CREDENTIAL_BACKEND` - `keyring`, `file` or `memory`
//!
//! Priority: env var > config file > default

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{FuelLogError, Result};

/// Default backend address (local development server)
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Environment variable that overrides the configured base URL
pub const API_URL_ENV: &str = "FUEL_LOG_API_URL";

/// Environment variable that overrides the configured credential backend
pub const CREDENTIAL_BACKEND_ENV: &str = "FUEL_LOG_CREDENTIAL_BACKEND";

/// Where the bearer token is persisted between runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialBackendKind {
    /// System keyring (default)
    #[default]
    Keyring,
    /// JSON file in the config directory
    File,
    /// Process memory only; nothing survives a restart
    Memory,
}

impl CredentialBackendKind {
    /// Get the configuration identifier
    pub fn name(&self) -> &'static str {
        match self {
            CredentialBackendKind::Keyring => "keyring",
            CredentialBackendKind::File => "file",
            CredentialBackendKind::Memory => "memory",
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "keyring" => Some(CredentialBackendKind::Keyring),
            "file" => Some(CredentialBackendKind::File),
            "memory" => Some(CredentialBackendKind::Memory),
            _ => None,
        }
    }

    /// Get all available backends
    pub fn all() -> &'static [CredentialBackendKind] {
        &[
            CredentialBackendKind::Keyring,
            CredentialBackendKind::File,
            CredentialBackendKind::Memory,
        ]
    }
}

impl std::fmt::Display for CredentialBackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL every API path is joined onto
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Credential storage backend
    #[serde(default)]
    pub credential_backend: CredentialBackendKind,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_timeout(),
            credential_backend: CredentialBackendKind::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, or create default if not exists
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Get the configuration directory
    pub fn config_dir() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "fuel-log", "fuel-log")
            .ok_or_else(|| FuelLogError::Config("Could not determine config directory".into()))?;

        Ok(project_dirs.config_dir().to_path_buf())
    }

    /// Resolve the backend base URL
    ///
    /// Priority: `FUEL_LOG_API_URL` > config file > default
    pub fn base_url(&self) -> Result<Url> {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                return parse_base_url(&url);
            }
        }
        parse_base_url(&self.api_base_url)
    }

    /// Resolve the credential backend
    ///
    /// Priority: `FUEL_LOG_CREDENTIAL_BACKEND` > config file > default
    pub fn credential_backend(&self) -> Result<CredentialBackendKind> {
        if let Ok(value) = std::env::var(CREDENTIAL_BACKEND_ENV) {
            if !value.trim().is_empty() {
                return CredentialBackendKind::from_str(&value).ok_or_else(|| {
                    FuelLogError::Config(format!(
                        "Invalid {} value '{}'",
                        CREDENTIAL_BACKEND_ENV, value
                    ))
                });
            }
        }
        Ok(self.credential_backend)
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Set the base URL after validating it
    pub fn set_api_base_url(&mut self, url: &str) -> Result<()> {
        let parsed = parse_base_url(url)?;
        self.api_base_url = parsed.as_str().trim_end_matches('/').to_string();
        Ok(())
    }
}

/// Parse and validate a backend base URL
///
/// Only absolute `http`/`https` URLs are accepted.
pub fn parse_base_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url.trim())
        .map_err(|e| FuelLogError::Config(format!("Invalid API base URL '{}': {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FuelLogError::Config(format!(
            "Unsupported URL scheme '{}' in API base URL (expected http or https)",
            other
        ))),
    }
}
