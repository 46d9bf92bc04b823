//! Error types for the Truyen client core

use thiserror::Error;

/// Client-wide result type
pub type Result<T> = std::result::Result<T, ClientError>;

/// Client error type
#[derive(Error, Debug)]
pub enum ClientError {
    /// Backend answered with a non-2xx status
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Response parsed but lacks a required field
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    /// A protected action was invoked without a usable access token
    #[error("Authentication required")]
    AuthRequired,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Build an API error from a status code and an optional response body.
    ///
    /// The backend puts a human-readable reason in the body's `message`
    /// field; when it is missing the status line is used instead.
    pub fn from_response(status: u16, body: Option<&serde_json::Value>) -> Self {
        let message = body
            .and_then(|b| b.get("message"))
            .and_then(|m| m.as_str())
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Request failed with status {}", status));

        ClientError::Api { status, message }
    }

    /// HTTP status of an API error
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_auth_required(&self) -> bool {
        matches!(self, ClientError::AuthRequired)
            || matches!(self, ClientError::Api { status: 401, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_from_body() {
        let body = json!({"message": "Email already registered"});
        let err = ClientError::from_response(409, Some(&body));
        assert_eq!(err.to_string(), "Email already registered");
        assert_eq!(err.status(), Some(409));
    }

    #[test]
    fn test_message_fallback() {
        let err = ClientError::from_response(502, None);
        assert_eq!(err.to_string(), "Request failed with status 502");

        let body = json!({"message": ""});
        let err = ClientError::from_response(500, Some(&body));
        assert_eq!(err.to_string(), "Request failed with status 500");
    }

    #[test]
    fn test_auth_required() {
        assert!(ClientError::AuthRequired.is_auth_required());
        assert!(ClientError::from_response(401, None).is_auth_required());
        assert!(!ClientError::from_response(404, None).is_auth_required());
    }
}
