//! CLI module for fuel-log
//!
//! This module contains all CLI command definitions and handlers using clap.

pub mod commands;
pub mod auth;
pub mod vehicle;
pub mod log;
pub mod config;

use std::io::{self, Write};
use std::sync::Arc;

use crate::api::client::ApiClient;
use crate::core::config::Config;
use crate::core::session::SessionStore;
use crate::error::{FuelLogError, Result};

pub use commands::{Cli, Commands};

/// Build an API client from the saved configuration
pub fn connect() -> Result<ApiClient> {
    let config = Config::load()?;
    let session = Arc::new(SessionStore::from_config(&config)?);
    tracing::debug!(backend = session.backend_name(), "session store ready");
    ApiClient::from_config(&config, session)
}

/// Build an API client and make sure a token is available
pub fn connect_authenticated() -> Result<ApiClient> {
    let client = connect()?;
    client.session().require_credential()?;
    Ok(client)
}

/// Prompt for a value on stdin
pub(crate) fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim_end_matches(['\r', '\n']).to_string();

    if input.is_empty() {
        return Err(FuelLogError::InvalidInput(format!("No {} provided", label.to_lowercase())));
    }
    Ok(input)
}
