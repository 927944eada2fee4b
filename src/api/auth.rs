use std::collections::HashMap;

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
};

use crate::{
    error::ApiError,
    server::AppState,
    types::{AuthUrlResponse, CallbackResponse, RefreshRequest, RefreshResponse},
    utils,
};

/// `GET /api/auth/login`: returns the Spotify authorization URL.
///
/// Responds with 500 when the application credentials are not configured.
pub async fn login(State(state): State<AppState>) -> Result<Json<AuthUrlResponse>, ApiError> {
    let auth_url = state.gateway.begin_login().map_err(|e| {
        tracing::error!(error = %e, "cannot build authorization URL");
        ApiError::from(e)
    })?;

    tracing::info!(%auth_url, "generated authorization URL");
    Ok(Json(AuthUrlResponse { auth_url }))
}

/// `GET /api/auth/callback`: exchanges the authorization `code` for tokens.
///
/// A missing code, a denied authorization or a rejected exchange is a 400.
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<CallbackResponse>, ApiError> {
    let Some(code) = utils::non_empty(params.get("code").map(String::as_str)) else {
        if let Some(reason) = params.get("error") {
            return Err(ApiError::BadRequest(format!(
                "Error in auth callback: authorization denied ({reason})"
            )));
        }
        return Err(ApiError::BadRequest(
            "Error in auth callback: code is required".to_string(),
        ));
    };

    let token = state.gateway.complete_login(&code).await.map_err(|e| {
        tracing::warn!(error = %e, "authorization code exchange failed");
        ApiError::from(e)
    })?;

    Ok(Json(CallbackResponse {
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        expires_in: token.expires_in,
    }))
}

/// `POST /api/auth/refresh`: trades a refresh token for a new access token.
///
/// A missing or rejected refresh token is a 400.
pub async fn refresh(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RefreshResponse>, ApiError> {
    let request: RefreshRequest = utils::parse_json_body(&body)?;
    let Some(refresh_token) = utils::non_empty(request.refresh_token.as_deref()) else {
        return Err(ApiError::BadRequest(
            "Refresh token is required".to_string(),
        ));
    };

    let token = state.gateway.refresh(&refresh_token).await.map_err(|e| {
        tracing::warn!(error = %e, "token refresh failed");
        ApiError::from(e)
    })?;

    Ok(Json(RefreshResponse {
        access_token: token.access_token,
        expires_in: token.expires_in,
        refresh_token: token.refresh_token,
    }))
}
