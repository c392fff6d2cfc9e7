//! Failure taxonomy shared by the HTTP data providers

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when fetching data from a provider
///
/// `RequestFailed`, `Status` and `ParseError` are network failures; the
/// provider could not be reached or answered with something unusable.
/// `Unavailable` means the provider answered but had nothing for the point.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("{message} (HTTP {status})")]
    Status { status: u16, message: String },

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// A field in the response could not be interpreted
    #[error("Invalid field in response: {0}")]
    InvalidField(String),

    /// Provider returned an empty or missing result set
    #[error("{0}")]
    Unavailable(String),
}

impl FetchError {
    pub(crate) fn status(status: StatusCode, message: impl Into<String>) -> Self {
        FetchError::Status {
            status: status.as_u16(),
            message: message.into(),
        }
    }

    pub(crate) fn unavailable(message: impl Into<String>) -> Self {
        FetchError::Unavailable(message.into())
    }

    /// Whether the provider was reached but had no data for the point
    pub fn is_unavailable(&self) -> bool {
        matches!(self, FetchError::Unavailable(_))
    }

    /// Whether the request failed or the response was unusable
    pub fn is_network_failure(&self) -> bool {
        !self.is_unavailable()
    }
}
