//! Configuration CLI command handlers

use crate::cli::commands::{ConfigCommand, ConfigKey};
use crate::core::config::{Config, CredentialBackendKind, API_URL_ENV, DEFAULT_API_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::error::{FuelLogError, Result};

/// Handle configuration commands
pub fn handle_config(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Set { key, value } => handle_set(key, value),
        ConfigCommand::Get { key } => handle_get(key),
        ConfigCommand::Remove { key } => handle_remove(key),
    }
}

/// Handle setting a configuration value
fn handle_set(key: ConfigKey, value: String) -> Result<()> {
    let mut config = Config::load()?;

    match key {
        ConfigKey::ApiUrl => {
            config.set_api_base_url(&value)?;
            config.save()?;
            println!("API URL set to: {}", config.api_base_url);
        }
        ConfigKey::Timeout => {
            let secs = parse_timeout(&value)?;
            config.request_timeout_secs = secs;
            config.save()?;
            println!("Request timeout set to: {}s", secs);
        }
        ConfigKey::CredentialBackend => {
            let backend = CredentialBackendKind::from_str(&value).ok_or_else(|| {
                FuelLogError::InvalidInput(format!(
                    "Invalid credential backend '{}'. Available backends: {}",
                    value,
                    CredentialBackendKind::all()
                        .iter()
                        .map(|b| b.name())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })?;
            config.credential_backend = backend;
            config.save()?;

            println!("Credential backend set to: {}", backend);
            println!();
            println!("  Log in again to store your token in the new backend.");
        }
    }
    Ok(())
}

/// Handle getting a configuration value
fn handle_get(key: ConfigKey) -> Result<()> {
    let config = Config::load()?;

    match key {
        ConfigKey::ApiUrl => {
            println!("API URL: {}", config.api_base_url);
            if let Ok(url) = std::env::var(API_URL_ENV) {
                if !url.trim().is_empty() {
                    println!("  (overridden by {}: {})", API_URL_ENV, url.trim());
                }
            }
        }
        ConfigKey::Timeout => {
            println!("Request timeout: {}s", config.request_timeout_secs);
        }
        ConfigKey::CredentialBackend => {
            println!("Credential backend: {}", config.credential_backend()?);
        }
    }
    Ok(())
}

/// Handle resetting a configuration value
fn handle_remove(key: ConfigKey) -> Result<()> {
    let mut config = Config::load()?;

    match key {
        ConfigKey::ApiUrl => {
            config.api_base_url = DEFAULT_API_BASE_URL.to_string();
            config.save()?;
            println!("API URL reset to default: {}", DEFAULT_API_BASE_URL);
        }
        ConfigKey::Timeout => {
            config.request_timeout_secs = DEFAULT_TIMEOUT_SECS;
            config.save()?;
            println!("Request timeout reset to default: {}s", DEFAULT_TIMEOUT_SECS);
        }
        ConfigKey::CredentialBackend => {
            config.credential_backend = CredentialBackendKind::default();
            config.save()?;
            println!(
                "Credential backend reset to default: {}",
                CredentialBackendKind::default()
            );
        }
    }
    Ok(())
}

/// Parse a timeout in whole seconds
fn parse_timeout(value: &str) -> Result<u64> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(FuelLogError::InvalidInput(format!(
            "Invalid timeout '{}'. Expected a whole number of seconds greater than 0.",
            value
        ))),
    }
}
