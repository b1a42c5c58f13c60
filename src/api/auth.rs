//! Login, registration and logout
//!
//! Login exchanges email and password for a bearer token and hands it to the
//! [`SessionStore`](crate::core::SessionStore). Both login and registration
//! go out without credentials.

use chrono::{Local, NaiveDate};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::api::client::ApiClient;
use crate::error::{FuelLogError, Result};
use crate::workflow::validation::ValidationError;

/// Login endpoint; credentials travel in the query string
pub const LOGIN_PATH: &str = "/v1/customer/login";

/// Registration endpoint
pub const REGISTER_PATH: &str = "/customer/add";

/// Shown when a login fails without a backend message
pub const LOGIN_FALLBACK: &str = "Invalid email or password.";

/// Shown when a registration fails without a backend message
pub const REGISTER_FALLBACK: &str = "Failed to register. Please check your details.";

/// Result of a successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    /// Whether the token reached durable storage. `false` means the session
    /// lasts until the process exits.
    pub persisted: bool,
}

/// New account details
#[derive(Debug, Clone)]
pub struct Registration {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    /// Date of birth, `YYYY-MM-DD`
    pub dob: String,
    pub password: SecretString,
}

/// Wire form of [`Registration`]
#[derive(Serialize)]
struct RegisterRequest<'a> {
    firstname: &'a str,
    lastname: &'a str,
    email: &'a str,
    dob: &'a str,
    password: &'a str,
}

impl Registration {
    /// Check the form before it is sent
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        let required = [
            ("first name", self.firstname.as_str()),
            ("last name", self.lastname.as_str()),
            ("email", self.email.as_str()),
            ("date of birth", self.dob.as_str()),
            ("password", self.password.expose_secret()),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField(field));
            }
        }

        validate_email(&self.email)?;
        parse_date_of_birth(&self.dob)?;
        Ok(())
    }

    fn to_request(&self) -> RegisterRequest<'_> {
        RegisterRequest {
            firstname: self.firstname.trim(),
            lastname: self.lastname.trim(),
            email: self.email.trim(),
            dob: self.dob.trim(),
            password: self.password.expose_secret(),
        }
    }
}

/// Handler for authentication operations
pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    /// Create a new auth handler
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Log in and make the returned token the active credential
    ///
    /// A storage failure does not fail the login; it is reported through
    /// [`LoginOutcome::persisted`].
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<LoginOutcome> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ValidationError::MissingField("email").into());
        }
        if password.expose_secret().is_empty() {
            return Err(ValidationError::MissingField("password").into());
        }

        tracing::info!(email, "logging in");

        let request = self
            .client
            .anonymous_request(Method::POST, LOGIN_PATH)?
            .query(&[("email", email), ("password", password.expose_secret())]);
        let response = self.client.send(request).await?;
        let token = parse_token(response.text())?;

        let persisted = match self.client.session().set_credential(token.expose_secret()) {
            Ok(()) => true,
            Err(FuelLogError::Storage(e)) => {
                tracing::warn!(error = %e, "logged in, but the session will not survive a restart");
                false
            }
            Err(e) => return Err(e),
        };

        Ok(LoginOutcome { persisted })
    }

    /// Create a new account
    pub async fn register(&self, registration: &Registration) -> Result<()> {
        registration.validate()?;

        tracing::info!(email = registration.email.trim(), "registering account");

        let request = self
            .client
            .anonymous_request(Method::POST, REGISTER_PATH)?
            .json(&registration.to_request());
        self.client.send(request).await?;
        Ok(())
    }

    /// Drop the active credential and its stored copy
    pub fn logout(&self) -> Result<()> {
        self.client.session().set_credential("")
    }
}

/// Extract the bearer token from a login response body
///
/// The backend answers with the token as raw text; a JSON string or a
/// `{"token": ...}` object is accepted too. Any other JSON value is refused.
pub fn parse_token(body: &str) -> Result<SecretString> {
    let trimmed = body.trim();

    let token = match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(serde_json::Value::Object(map)) => map
            .get("token")
            .and_then(|t| t.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                FuelLogError::Decode("login response has no token field".to_string())
            })?,
        // null, booleans, numbers and arrays are JSON, but never a token
        Ok(_) => {
            return Err(FuelLogError::Decode(
                "login response did not contain a bearer token".to_string(),
            ))
        }
        Err(_) => trimmed.to_string(),
    };

    let token = token.trim();
    if token.is_empty() || token.chars().any(char::is_whitespace) {
        return Err(FuelLogError::Decode(
            "login response did not contain a bearer token".to_string(),
        ));
    }

    Ok(SecretString::from(token.to_string()))
}

fn validate_email(email: &str) -> std::result::Result<(), ValidationError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ValidationError::InvalidEmail),
    }
}

/// Parse a `YYYY-MM-DD` date of birth that is not in the future
pub fn parse_date_of_birth(dob: &str) -> std::result::Result<NaiveDate, ValidationError> {
    let date = NaiveDate::parse_from_str(dob.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDateOfBirth)?;
    if date > Local::now().date_naive() {
        return Err(ValidationError::InvalidDateOfBirth);
    }
    Ok(date)
}
