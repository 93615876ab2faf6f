//! Error types for control-plane operations.
//!
//! The taxonomy mirrors how failures surface from the remote API:
//! [`Error::Transport`] for connection-level failures, [`Error::Api`] for
//! non-2xx responses carrying a structured `{"error": ...}` body,
//! [`Error::Protocol`] for responses that are not JSON or lack a mandatory
//! field (the raw payload is attached for diagnosis), and
//! [`Error::BusinessRule`] for precondition violations detected before any
//! mutating call is attempted. Nothing is retried internally; every error
//! aborts the enclosing operation.

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while driving the control plane.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Connection or timeout failure at the HTTP layer. Never retried.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API returned a non-success status code.
    #[error("API request failed with status {status}: {message}")]
    Api {
        /// HTTP status code returned by the control plane.
        status: u16,
        /// Message extracted from the response's `error` field, or the raw
        /// body when no structured error is present.
        message: String,
    },

    /// The response was not JSON or lacked a required field.
    ///
    /// The raw payload is carried verbatim so callers can diagnose whether
    /// the remote side misbehaved or the operation genuinely failed.
    #[error("{message}; payload: {payload}")]
    Protocol {
        /// What was expected of the response.
        message: String,
        /// The offending response, untouched.
        payload: Value,
    },

    /// A precondition on remote inventory did not hold (missing or
    /// ambiguous source, destination name collision). Raised before any
    /// mutating call is issued.
    #[error("{0}")]
    BusinessRule(String),

    /// The client was constructed with invalid configuration.
    #[error("invalid client configuration: {0}")]
    Config(String),

    /// A payload template referenced a parameter with no supplied value.
    #[error("template parameter `{0}` has no value")]
    MissingTemplateParam(String),

    /// Failed to serialize or deserialize a payload.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a protocol error with the raw payload attached.
    pub fn protocol(message: impl Into<String>, payload: Value) -> Self {
        Self::Protocol {
            message: message.into(),
            payload,
        }
    }

    /// Create a business-rule error with the given message.
    pub fn business_rule(message: impl Into<String>) -> Self {
        Self::BusinessRule(message.into())
    }

    /// Create an API error from a status code and raw response body.
    ///
    /// The body is probed for the control plane's structured
    /// `{"error": ...}` shape; when present, only the `error` value is kept
    /// as the message.
    pub fn api(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|doc| doc.get("error").cloned())
            .map_or_else(
                || body.to_string(),
                |err| match err {
                    Value::String(s) => s,
                    other => other.to_string(),
                },
            );
        Self::Api { status, message }
    }

    /// Returns `true` if this error was raised by a business-rule check
    /// rather than by the transport or the remote API.
    pub fn is_business_rule(&self) -> bool {
        matches!(self, Self::BusinessRule(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_extracts_structured_message() {
        let err = Error::api(409, r#"{"error": "Universe already exists"}"#);
        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "Universe already exists");
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn api_error_keeps_raw_body_when_unstructured() {
        let err = Error::api(502, "<html>Bad Gateway</html>");
        assert!(err.to_string().contains("Bad Gateway"));
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn api_error_stringifies_structured_non_string_error() {
        let err = Error::api(400, r#"{"error": {"universeName": ["invalid"]}}"#);
        assert!(err.to_string().contains("universeName"));
    }

    #[test]
    fn protocol_error_carries_payload() {
        let err = Error::protocol("missing version", serde_json::json!({"status": "running"}));
        assert!(err.to_string().contains("missing version"));
        assert!(err.to_string().contains("running"));
    }
}
