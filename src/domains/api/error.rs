//! Upstream call error types.

use thiserror::Error;

/// Errors that can occur while calling the upstream API.
///
/// Every variant renders to the same `{"error": "<message>"}` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The caller asked for an HTTP method the dispatcher does not support.
    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    /// Neither the requested nor the default connection is configured.
    #[error("Unknown connection: {0}")]
    UnknownConnection(String),

    /// URL, connection, or timeout failure.
    #[error("{0}")]
    Transport(String),

    /// The upstream answered with a 4xx or 5xx status.
    #[error("{0}")]
    Status(String),

    /// The upstream answered successfully but not with the expected shape.
    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),
}

impl ApiError {
    /// Create an "unexpected shape" error.
    pub fn unexpected_shape(msg: impl Into<String>) -> Self {
        Self::UnexpectedShape(msg.into())
    }

    /// Render this error as the JSON error envelope.
    pub fn to_envelope(&self) -> String {
        error_envelope(&self.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        let message = error_chain(&err);
        if err.is_status() {
            Self::Status(message)
        } else {
            Self::Transport(message)
        }
    }
}

/// Join an error and its sources as `"outer: inner: root"`.
///
/// reqwest's own message names only the failed step; the cause (refused,
/// timed out, bad URL) lives further down the chain.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Encode a message as `{"error": "<message>"}`.
pub fn error_envelope(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}
