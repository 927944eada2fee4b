//! Error types for the proxy.
//!
//! Three layers of errors exist, each owned by the component that produces it:
//!
//! - [`SpotifyError`] - failures reported by the token-scoped Web API client
//! - [`OAuthError`] - failures of the authorization gateway (URL construction,
//!   code exchange, token refresh)
//! - [`ApiError`] - the outward error kinds returned to HTTP callers
//!
//! Upstream errors are matched explicitly into [`ApiError`] so every route
//! answers with one of 401, 400 or 500 and a `{"detail": ...}` body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Failure of a single Spotify Web API call.
#[derive(Debug, thiserror::Error)]
pub enum SpotifyError {
    /// The provider rejected the access token (HTTP 401).
    #[error("{0}")]
    Unauthorized(String),

    /// The provider answered with any other error status.
    #[error("http status: {status}, reason: {message}")]
    Api { status: u16, message: String },

    /// The request never produced a provider answer.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered successfully but the body could not be decoded.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

/// Failure of the authorization gateway.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("Spotify client credentials are not configured: {0}")]
    Configuration(String),

    /// The token endpoint refused the code or refresh token.
    #[error("{0}")]
    Exchange(String),

    #[error("token request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Outward error kinds of the HTTP surface.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Translates an upstream failure for a pass-through operation.
    ///
    /// `action` names the operation in the message, e.g. `"search"`.
    pub fn upstream(action: &str, err: SpotifyError) -> Self {
        match err {
            SpotifyError::Unauthorized(message) => {
                tracing::warn!(action, %message, "Spotify rejected access token");
                ApiError::Unauthorized(format!("Invalid or expired token: {message}"))
            }
            SpotifyError::Api { status, message } => {
                tracing::warn!(action, status, %message, "Spotify API error");
                ApiError::BadRequest(format!("Spotify API error: {message}"))
            }
            other => {
                tracing::error!(action, error = %other, "upstream call failed");
                ApiError::Internal(format!("Error in {action}: {other}"))
            }
        }
    }

    /// Translates an upstream failure of the profile fetch.
    ///
    /// Any error the provider reports while reading the profile means the
    /// token cannot be used for this session.
    pub fn profile(err: SpotifyError) -> Self {
        match err {
            SpotifyError::Unauthorized(message) | SpotifyError::Api { message, .. } => {
                tracing::warn!(%message, "Spotify rejected profile request");
                ApiError::Unauthorized("Invalid or expired token".to_string())
            }
            other => {
                tracing::error!(error = %other, "profile request failed");
                ApiError::Internal(format!("Error getting user profile: {other}"))
            }
        }
    }
}

impl From<OAuthError> for ApiError {
    fn from(err: OAuthError) -> Self {
        match err {
            OAuthError::Configuration(_) => ApiError::Internal(err.to_string()),
            OAuthError::Exchange(_) | OAuthError::Http(_) => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "detail": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}
