//! Error types for the newswire tracker
//!
//! One enum per layer:
//! - `TokenError`: persisted-query token acquisition failures
//! - `ApiError`: content API client errors
//! - `PersistenceError`: known-entry store and feed file writes
//! - `NotifyError`: webhook delivery failures
//! - `ConfigError`: startup configuration problems (always fatal)
//! - `PollError`: the failure of one stream cycle
//! - `AppError`: HTTP layer errors rendered as responses

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Token provider errors
///
/// `Clone` so one failed acquisition can be handed to every waiter.
#[derive(Debug, Clone, Error)]
pub enum TokenError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Browser never issued a request carrying the {0} token")]
    NotObserved(String),

    #[error("Token acquisition timed out after {0}s")]
    Timeout(u64),

    #[error("Token acquisition was abandoned before completing")]
    Abandoned,

    #[error("Malformed token parameter: {0}")]
    Malformed(String),
}

impl From<chromiumoxide::error::CdpError> for TokenError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        TokenError::Browser(e.to_string())
    }
}

/// Content API client errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    #[error("Persisted query token is stale")]
    StaleCredential,

    #[error("Upstream returned an error payload: {0}")]
    Upstream(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl ApiError {
    /// Map a transport error, singling out timeouts
    pub fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Request(e)
        }
    }
}

/// Durable write failures (known-entry store, feed documents)
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PersistenceError {
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        PersistenceError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Webhook delivery errors
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Webhook rejected the request: {status} - {message}")]
    Status { status: u16, message: String },
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid genre '{0}'")]
    UnknownGenre(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Failure of a single poll cycle
#[derive(Debug, Error)]
pub enum PollError {
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

/// HTTP layer errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Feed has not been generated yet")]
    FeedNotReady,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::FeedNotReady => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Feed is initializing, please try again in a few seconds.",
            ),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "Not Found"),
            AppError::Internal(msg) => {
                tracing::error!("Error reading feed file: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        };

        (status, [(header::CONTENT_TYPE, "text/plain")], body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_not_ready_maps_to_503() {
        let response = AppError::FeedNotReady.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn not_found_maps_to_404() {
        let response = AppError::NotFound("/nope".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_maps_to_500() {
        let response = AppError::Internal("disk on fire".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn poll_error_wraps_stale_credential() {
        let err: PollError = ApiError::StaleCredential.into();
        assert!(matches!(err, PollError::Api(ApiError::StaleCredential)));
        assert!(err.to_string().contains("stale"));
    }
}
