//! Custom error types for fuel-log
//!
//! Every failure a caller can see lands in one of the variants below. The
//! CLI and the workflow turn them into a single user-facing message with
//! [`FuelLogError::user_message`].

use thiserror::Error;

use crate::workflow::validation::ValidationError;

/// Message shown when the backend cannot be reached
pub const NETWORK_MESSAGE: &str =
    "Cannot reach the server. Check your internet connection and try again.";

/// Main error type for the fuel-log client
#[derive(Error, Debug)]
pub enum FuelLogError {
    /// Local, user-correctable input problem. Never reaches the network.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Transport unreachable or timed out
    #[error("Network request failed: {0}\n\n  → Check your internet connection and try again.")]
    Network(String),

    /// Backend rejected the request with a non-2xx status
    #[error("Server returned {status}: {}", message.as_deref().unwrap_or("no details"))]
    Api {
        /// HTTP status code
        status: u16,
        /// Message provided by the backend, if any
        message: Option<String>,
    },

    /// Response body did not have the expected shape
    #[error("Failed to parse response: {0}")]
    Decode(String),

    /// Local credential persistence failed
    #[error("Cannot access credential storage: {0}\n\n  → Your session will not survive a restart.\n  → On Linux: Ensure a secret service (like gnome-keyring) is running, or run 'fuellog config set credential-backend file'.")]
    Storage(String),

    /// User is not logged in
    #[error("You are not logged in.\n\n  → Run 'fuellog auth login --email <EMAIL>' to authenticate.")]
    NotAuthenticated,

    /// A submission is already in flight
    #[error("A fuel log is already being submitted. Please wait.")]
    Busy,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization/deserialization error
    #[error("Configuration file is invalid: {0}")]
    Toml(String),

    /// Invalid input from user
    #[error("{0}")]
    InvalidInput(String),

    /// Backend or transport failure, already worded for the user
    #[error("{0}")]
    Backend(String),
}

impl FuelLogError {
    /// Build an API error from a status and an optional backend message
    pub fn api(status: u16, message: Option<String>) -> Self {
        FuelLogError::Api { status, message }
    }

    /// The single message shown to a user for this error
    ///
    /// Backend messages are surfaced verbatim. `fallback` is used for API
    /// errors that carry no message and for decode failures, which are not
    /// meaningful to a user.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            FuelLogError::Validation(e) => e.to_string(),
            FuelLogError::Network(_) => NETWORK_MESSAGE.to_string(),
            FuelLogError::Api {
                message: Some(message),
                ..
            } => message.clone(),
            FuelLogError::Api { message: None, .. } | FuelLogError::Decode(_) => {
                fallback.to_string()
            }
            other => other.to_string(),
        }
    }

    /// Replace transport and backend detail with the message a user sees
    ///
    /// Local errors (validation, storage, configuration) are kept as they
    /// are; their own text already tells the user what to do.
    pub fn into_user_facing(self, fallback: &str) -> Self {
        match self {
            FuelLogError::Api {
                status: 401,
                message: None,
            } => FuelLogError::NotAuthenticated,
            FuelLogError::Network(_) | FuelLogError::Api { .. } | FuelLogError::Decode(_) => {
                tracing::debug!(error = %self, "backend call failed");
                FuelLogError::Backend(self.user_message(fallback))
            }
            other => other,
        }
    }

    /// Whether the backend rejected the credential
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, FuelLogError::Api { status: 401, .. })
    }
}

impl From<keyring::Error> for FuelLogError {
    fn from(err: keyring::Error) -> Self {
        FuelLogError::Storage(err.to_string())
    }
}

impl From<toml::de::Error> for FuelLogError {
    fn from(err: toml::de::Error) -> Self {
        FuelLogError::Toml(err.to_string())
    }
}

impl From<toml::ser::Error> for FuelLogError {
    fn from(err: toml::ser::Error) -> Self {
        FuelLogError::Toml(err.to_string())
    }
}

impl From<serde_json::Error> for FuelLogError {
    fn from(err: serde_json::Error) -> Self {
        FuelLogError::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for FuelLogError {
    fn from(err: reqwest::Error) -> Self {
        // Classify transport failures so callers never see raw reqwest errors
        crate::api::error_handler::classify_transport_error(err)
    }
}

/// Result type alias using FuelLogError
pub type Result<T> = std::result::Result<T, FuelLogError>;
