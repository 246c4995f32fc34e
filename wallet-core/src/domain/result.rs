//! Result, error and envelope types for the core library

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("User not authenticated")]
    NotAuthenticated,

    #[error("No internet connection")]
    Offline,

    #[error("Network error: {0}")]
    Network(String),

    #[error("{message}")]
    Api { status: Option<u16>, message: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an API error from a server message
    pub fn api(status: Option<u16>, msg: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: msg.into(),
        }
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// True for failures raised before any store interaction or request
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// The `{success, data, message}` wire shape used by the wallet backend.
///
/// Also used by the CLI for `--json` output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Create a successful envelope
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// Create a failed envelope
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }

    /// Convert into a result, using `fallback` when the server sent no message
    pub fn into_result(self, fallback: &str) -> Result<T> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err(Error::api(None, "Response contained no data")),
            (false, _) => Err(Error::api(
                None,
                self.message.unwrap_or_else(|| fallback.to_string()),
            )),
        }
    }
}

impl<T> From<Result<T>> for Envelope<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::fail(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_ok() {
        let envelope: Envelope<i32> = Envelope::ok(42);
        assert!(envelope.success);
        assert_eq!(envelope.data, Some(42));
        assert!(envelope.message.is_none());
    }

    #[test]
    fn test_envelope_fail() {
        let envelope: Envelope<i32> = Envelope::fail("Insufficient balance");
        assert!(!envelope.success);
        assert!(envelope.data.is_none());
        assert_eq!(envelope.message, Some("Insufficient balance".to_string()));
    }

    #[test]
    fn test_from_result() {
        let ok: Result<i32> = Ok(42);
        let envelope: Envelope<i32> = ok.into();
        assert!(envelope.success);

        let err: Result<i32> = Err(Error::validation("Amount must be positive"));
        let envelope: Envelope<i32> = err.into();
        assert!(!envelope.success);
        assert_eq!(envelope.message.unwrap(), "Amount must be positive");
    }

    #[test]
    fn test_into_result_uses_fallback_message() {
        let envelope: Envelope<i32> = serde_json::from_str(r#"{"success": false}"#).unwrap();
        let err = envelope.into_result("Failed to add funds").unwrap_err();
        assert_eq!(err.to_string(), "Failed to add funds");
    }

    #[test]
    fn test_missing_data_defaults_to_none() {
        let envelope: Envelope<serde_json::Value> =
            serde_json::from_str(r#"{"success": true, "message": "ok"}"#).unwrap();
        assert!(envelope.data.is_none());
    }
}
