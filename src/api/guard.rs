use axum::{
    extract::{FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::{error::ApiError, utils};

/// Access token of the current request, attached by [`require_bearer`].
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<BearerToken>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Invalid authorization header".to_string()))
    }
}

/// Rejects requests without a usable `Authorization: Bearer` header.
///
/// On success the token is stored in the request extensions for
/// [`BearerToken`] to pick up; no upstream call happens on rejection.
pub async fn require_bearer(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(utils::parse_bearer)
        .map(str::to_string);

    match token {
        Some(token) => {
            request.extensions_mut().insert(BearerToken(token));
            Ok(next.run(request).await)
        }
        None => {
            tracing::debug!(path = %request.uri().path(), "missing or malformed bearer token");
            Err(ApiError::Unauthorized(
                "Invalid authorization header".to_string(),
            ))
        }
    }
}
