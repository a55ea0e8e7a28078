//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::QuestionError;
use quiz_core::session::TransitionError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Failure talking to a remote collaborator.
///
/// Carries a human-readable message and an HTTP-like status; `0` means the request
/// never produced a response (network failure or timeout).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub status: u16,
}

impl ApiError {
    #[must_use]
    pub fn new(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }

    /// No response was received.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(message, 0)
    }

    /// The service answered with a non-success status.
    #[must_use]
    pub fn http(status: reqwest::StatusCode) -> Self {
        let reason = status.canonical_reason().unwrap_or("unexpected status");
        Self::new(format!("Failed to fetch: {reason}"), status.as_u16())
    }

    /// The service answered, but not with what we asked for.
    #[must_use]
    pub fn malformed(detail: impl std::fmt::Display, status: u16) -> Self {
        Self::new(format!("Unexpected response from server: {detail}"), status)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map_or(0, |status| status.as_u16());
        if err.is_timeout() {
            Self::network("The request timed out.")
        } else if err.is_decode() {
            Self::malformed(err, status)
        } else {
            Self::new(err.to_string(), status)
        }
    }
}

/// Errors detected before any session starts; not retryable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("API URL is not configured. Please set TRIVIA_API_URL or pass --api-url.")]
    MissingApiUrl,

    #[error("invalid API URL {raw:?}: {reason}")]
    InvalidApiUrl { raw: String, reason: String },

    #[error("invalid timeout {raw:?}: expected a whole number of seconds greater than zero")]
    InvalidTimeout { raw: String },
}

/// Errors emitted by `QuestionProvider`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProviderError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("could not produce a quiz about {topic:?}")]
    EmptyQuiz { topic: String },

    #[error("question source sent an invalid question: {0}")]
    InvalidQuestion(#[from] QuestionError),
}

impl ProviderError {
    /// HTTP-like status for the failure; `0` when there was no response.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            ProviderError::Api(err) => err.status,
            ProviderError::EmptyQuiz { .. } | ProviderError::InvalidQuestion(_) => 200,
        }
    }

    /// Apologetic text suitable for showing to the player.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ProviderError::Api(err) => {
                format!("Sorry, we could not load the questions ({err}). Please try again.")
            }
            ProviderError::EmptyQuiz { topic } => {
                format!("Sorry, we could not produce a quiz about {topic}. Please try again.")
            }
            ProviderError::InvalidQuestion(_) => {
                "Sorry, the quiz we received was broken. Please try again.".to_string()
            }
        }
    }
}

/// Errors emitted by `SessionController` when an action does not fit the session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ControllerError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Errors emitted by `HighScoreStore`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HighScoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error("could not build the HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}
