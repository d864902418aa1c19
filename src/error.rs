//! # Errors
//!
//! This module defines the two error families of the crate:
//!
//! - [`ResourceError`] - configuration, construction and store errors. These are
//!   *fatal* to whatever produced them (a resource definition that cannot be built,
//!   an effect run that cannot start, a dispatch on a closed store).
//! - [`TransportError`] - a failed remote call. Built-in effects never propagate these;
//!   they are translated into [`ErrorInfo`] and stored under `meta.error`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Errors raised by resource construction, effect setup and the store runtime.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("Resource name must not be empty")]
    EmptyName,
    #[error("Invalid initial state: {0}")]
    InvalidState(String),
    #[error("Resource '{0}' has no path configured")]
    MissingPath(String),
    #[error("Resource '{0}' has no transport configured")]
    MissingTransport(String),
    #[error("Invalid path template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },
    #[error("Missing path parameter '{0}'")]
    MissingParam(String),
    #[error("Path parameter '{name}' must be a string or number, got {value}")]
    InvalidParam { name: String, value: Value },
    #[error("Unknown operation '{operation}' on resource '{resource}'")]
    UnknownOperation { resource: String, operation: String },
    #[error("Store closed")]
    StoreClosed,
    #[error("Store dropped response channel")]
    StoreDropped,
    #[error("Resource '{0}' is not registered with the store")]
    UnknownResource(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Transport setup failed: {0}")]
    TransportSetup(String),
    #[error("Task failed: {0}")]
    TaskFailed(String),
}

/// A failed remote call.
///
/// `status` and `data` are only present when a response was actually received.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    pub status: Option<u16>,
    pub data: Option<Value>,
}

impl TransportError {
    /// A failure carrying the status and body of a received response.
    pub fn response(status: u16, data: Value) -> Self {
        Self {
            message: format!("Request failed with status {}", status),
            status: Some(status),
            data: Some(data),
        }
    }

    /// A failure that never produced a response (connection refused, timeout, ...).
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            data: None,
        }
    }
}

/// Structured error stored under `meta.error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub status: u16,
    pub data: Value,
}

impl Default for ErrorInfo {
    fn default() -> Self {
        Self {
            status: 0,
            data: json!({}),
        }
    }
}

impl From<&TransportError> for ErrorInfo {
    fn from(error: &TransportError) -> Self {
        Self {
            status: error.status.unwrap_or(0),
            data: error.data.clone().unwrap_or_else(|| json!({})),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_info_from_response_failure() {
        let error = TransportError::response(404, json!({"message": "nf"}));
        let info = ErrorInfo::from(&error);
        assert_eq!(info.status, 404);
        assert_eq!(info.data, json!({"message": "nf"}));
    }

    #[test]
    fn test_error_info_defaults_without_response() {
        let error = TransportError::network("connection refused");
        let info = ErrorInfo::from(&error);
        assert_eq!(info, ErrorInfo::default());
        assert_eq!(serde_json::to_value(&info).unwrap(), json!({"status": 0, "data": {}}));
    }
}
