//! Backend and transport error classification
//!
//! Turns reqwest failures and non-2xx bodies into [`FuelLogError`] variants
//! so callers can tell "server unreachable" from "server said no" from
//! "server said something we cannot read".

use crate::error::FuelLogError;

/// Longest plain-text body that is still shown to the user as a message
const MAX_PLAIN_MESSAGE_LEN: usize = 200;

/// Placeholder messages some backends send instead of a real one
const EMPTY_MESSAGES: &[&str] = &["No message available", "null"];

/// Classifies a reqwest error into a [`FuelLogError`]
///
/// Timeouts and connection failures are network errors; body decoding
/// failures are decode errors; a request that could not even be built points
/// at a bad configuration.
pub fn classify_transport_error(err: reqwest::Error) -> FuelLogError {
    if err.is_timeout() {
        return FuelLogError::Network("request timed out".to_string());
    }

    if err.is_connect() {
        return FuelLogError::Network(format!("cannot connect to server ({})", err));
    }

    if err.is_decode() {
        return FuelLogError::Decode(err.to_string());
    }

    if err.is_builder() {
        return FuelLogError::Config(format!("invalid request: {}", err));
    }

    FuelLogError::Network(err.to_string())
}

/// Extract a user-facing message from an error response body
///
/// Accepts a JSON object with a `message` field, a bare JSON string, or a
/// short plain-text body. HTML error pages and placeholder messages yield
/// `None` so the caller falls back to its own wording.
pub fn extract_backend_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        let message = match &value {
            serde_json::Value::Object(map) => map
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string),
            serde_json::Value::String(s) => Some(s.clone()),
            _ => None,
        };
        return message.filter(|m| is_meaningful(m));
    }

    if trimmed.starts_with('<') || trimmed.len() > MAX_PLAIN_MESSAGE_LEN {
        return None;
    }

    Some(trimmed.to_string()).filter(|m| is_meaningful(m))
}

fn is_meaningful(message: &str) -> bool {
    let message = message.trim();
    !message.is_empty() && !EMPTY_MESSAGES.contains(&message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_from_json_object() {
        let body = r#"{"timestamp":"2024-01-01","status":401,"message":"Bad credentials"}"#;
        assert_eq!(
            extract_backend_message(body),
            Some("Bad credentials".to_string())
        );
    }

    #[test]
    fn test_message_from_json_string() {
        assert_eq!(
            extract_backend_message(r#""Email already in use""#),
            Some("Email already in use".to_string())
        );
    }

    #[test]
    fn test_placeholder_message_is_ignored() {
        let body = r#"{"status":500,"error":"Internal Server Error","message":"No message available"}"#;
        assert_eq!(extract_backend_message(body), None);
    }

    #[test]
    fn test_plain_text_message() {
        assert_eq!(
            extract_backend_message("Vehicle not found\n"),
            Some("Vehicle not found".to_string())
        );
    }

    #[test]
    fn test_html_and_empty_are_ignored() {
        assert_eq!(extract_backend_message("<html><body>502</body></html>"), None);
        assert_eq!(extract_backend_message("   "), None);
        assert_eq!(extract_backend_message(r#"{"error":"x"}"#), None);
    }
}
