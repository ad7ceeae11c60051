//! Error types for the Actions API client.
//!
//! # Design
//! HTTP failures are discriminated by status code into a small closed set so
//! callers can decide on retries without parsing messages. Every HTTP variant
//! keeps the numeric status and the raw response body, and both appear in the
//! rendered message.

use thiserror::Error;

/// Result type using `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by the Actions clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 401 or 403: the API key was missing, invalid or lacks access.
    #[error("authentication failed: HTTP {status}: {body}")]
    Authentication { status: u16, body: String },

    /// 404: the connection or action type does not exist.
    #[error("not found: HTTP 404: {body}")]
    NotFound { body: String },

    /// Any other 4xx: the request was rejected as invalid.
    #[error("request rejected: HTTP {status}: {body}")]
    Validation { status: u16, body: String },

    /// 408, 429 and 5xx. Worth retrying at the caller's discretion.
    #[error("server error: HTTP {status}: {body}")]
    Server { status: u16, body: String },

    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded into the expected record.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Missing or invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Classify an error status (>= 400) with its raw body.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            401 | 403 => ApiError::Authentication { status, body },
            404 => ApiError::NotFound { body },
            408 | 429 => ApiError::Server { status, body },
            400..=499 => ApiError::Validation { status, body },
            _ => ApiError::Server { status, body },
        }
    }

    /// HTTP status of the failed response, if the error came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Authentication { status, .. }
            | ApiError::Validation { status, .. }
            | ApiError::Server { status, .. } => Some(*status),
            ApiError::NotFound { .. } => Some(404),
            _ => None,
        }
    }

    /// Raw response body of the failed response, if any.
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::Authentication { body, .. }
            | ApiError::NotFound { body }
            | ApiError::Validation { body, .. }
            | ApiError::Server { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Server { .. } | ApiError::Transport(_))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Deserialization(err.to_string())
    }
}
