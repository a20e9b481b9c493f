//! Error types for sample sources, the feed and the session client.

use thiserror::Error;

/// Errors a sample source can report for a single fetch.
///
/// The feed treats `Unauthorized` as terminal and everything else as
/// transient.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The endpoint rejected our session (HTTP 401 or 403).
    #[error("Not authorized")]
    Unauthorized,

    /// The endpoint could not be reached (connect failure, timeout, dropped connection).
    #[error("Failed to connect to backend: {0}")]
    Unreachable(String),

    /// The endpoint answered, but not with a usable stats record.
    #[error("Backend error: {0}")]
    ServerError(String),
}

impl SourceError {
    /// Whether the feed should stop polling after this error.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SourceError::Unauthorized)
    }
}

#[cfg(feature = "remote")]
impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Unreachable("request timed out".to_string())
        } else if err.is_decode() || err.is_status() {
            SourceError::ServerError(err.to_string())
        } else {
            SourceError::Unreachable(err.to_string())
        }
    }
}

/// Errors returned by feed lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// The tick interval must be non-zero.
    #[error("Tick interval must be greater than zero")]
    InvalidInterval,

    /// `start` was called outside a tokio runtime.
    #[error("Feed must be started from within a tokio runtime")]
    NoRuntime,
}

/// Errors from the login/logout/register endpoints.
#[cfg(feature = "remote")]
#[derive(Debug, Error)]
pub enum SessionError {
    /// Username or password was not accepted.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The request was refused for another reason (bad input, duplicate user, ...).
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The backend could not be reached.
    #[error("Failed to connect to backend: {0}")]
    Unreachable(String),

    /// The backend failed to handle the request.
    #[error("Backend error: {0}")]
    ServerError(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

#[cfg(feature = "remote")]
impl From<reqwest::Error> for SessionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SessionError::Unreachable("request timed out".to_string())
        } else if err.is_builder() {
            SessionError::Client(err.to_string())
        } else if err.is_decode() || err.is_status() {
            SessionError::ServerError(err.to_string())
        } else {
            SessionError::Unreachable(err.to_string())
        }
    }
}
