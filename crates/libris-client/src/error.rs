//! Client error types.

use thiserror::Error;

/// Fallback shown when a failed response carries no usable message.
pub const REQUEST_FAILED: &str = "request failed";

/// Message shown when no response reached the client.
pub const NETWORK_ERROR: &str = "network error";

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// The login provider declined to issue a code (e.g. the user cancelled).
    #[error("login declined by provider: {0}")]
    AuthProviderDenied(String),

    /// The server rejected the bearer token (HTTP 401).
    #[error("session expired, please log in again")]
    Unauthenticated,

    /// Server returned a non-success status other than 401.
    #[error("{message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// `detail`, then `message`, then a fixed fallback.
        message: String,
        /// Raw response body, when one was sent.
        body: Option<serde_json::Value>,
    },

    /// No response reached the client (DNS, refused connection, timeout).
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persisting the session failed.
    #[error("Session store error: {0}")]
    Session(String),
}

impl Error {
    /// Check if this is an authentication error.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Error::Unauthenticated)
    }

    /// Check if the request never got a response.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// HTTP status carried by a server error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Server { status, .. } => Some(*status),
            Error::Unauthenticated => Some(401),
            _ => None,
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Pick the user-facing message out of an error body.
///
/// `detail` wins over `message`. FastAPI-style validation errors send
/// `detail` as a list of `{msg}` objects; the first `msg` is used.
pub(crate) fn server_message(body: Option<&serde_json::Value>) -> String {
    let Some(body) = body else {
        return REQUEST_FAILED.to_string();
    };

    let detail = body.get("detail").and_then(|d| match d {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => items
            .first()
            .and_then(|item| item.get("msg"))
            .and_then(|m| m.as_str())
            .map(str::to_string),
        _ => None,
    });

    detail
        .or_else(|| {
            body.get("message")
                .and_then(|m| m.as_str())
                .filter(|m| !m.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| REQUEST_FAILED.to_string())
}
