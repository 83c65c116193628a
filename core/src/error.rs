//! Error types for the widgets client.
//!
//! # Design
//! Three outcomes matter to callers: the request never produced a response
//! (`Transport`), the service answered with a status the operation did not
//! expect (`UnexpectedStatus`), or a body could not be decoded
//! (`MalformedResponse`). Nothing here is retried or logged; every error is
//! handed back to the immediate caller.

use thiserror::Error;

/// Failure before a response was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request cancelled")]
    Cancelled,

    #[error("request deadline exceeded")]
    DeadlineExceeded,

    #[error("http transport failed: {0}")]
    Http(String),
}

/// Errors returned by `WidgetsClient` parse methods and `WidgetsService`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The status code differed from the operation's success code. `message`
    /// comes from the service's error envelope.
    #[error("status code not expected, got: {status}, message: {message}")]
    UnexpectedStatus { status: u16, message: String },

    /// A response body could not be decoded into the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(#[source] serde_json::Error),

    /// The request payload could not be encoded to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),
}

impl ApiError {
    /// Status code reported by the service, if the error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            ApiError::Transport(TransportError::Cancelled | TransportError::DeadlineExceeded)
        )
    }
}

/// Errors raised while assembling a `ClientConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
