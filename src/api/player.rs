use axum::{Json, body::Bytes, extract::State};
use serde_json::Value;

use crate::{
    api::BearerToken,
    error::ApiError,
    server::AppState,
    types::{PauseRequest, PauseResponse, PlayRequest, PlayResponse},
    utils,
};

/// `POST /api/play`: starts a track on the active (or given) device.
///
/// A missing `track_uri` is a 400; provider errors go through [`ApiError::upstream`].
pub async fn play(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    body: Bytes,
) -> Result<Json<PlayResponse>, ApiError> {
    let request: PlayRequest = utils::parse_json_body(&body)?;
    let Some(track_uri) = utils::non_empty(request.track_uri.as_deref()) else {
        return Err(ApiError::BadRequest("track_uri is required".to_string()));
    };
    let position_ms = request.position_ms.unwrap_or(0);
    let device_id = utils::non_empty(request.device_id.as_deref());

    state
        .spotify
        .client(&token)
        .start_playback(&track_uri, position_ms, device_id.as_deref())
        .await
        .map_err(|e| ApiError::upstream("play", e))?;

    tracing::debug!(%track_uri, position_ms, device = ?device_id, "playback started");
    Ok(Json(PlayResponse {
        status: "playing",
        position_ms,
        track_uri,
    }))
}

/// `POST /api/pause`: pauses playback. The body is optional.
pub async fn pause(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    body: Bytes,
) -> Result<Json<PauseResponse>, ApiError> {
    let request: PauseRequest = utils::parse_json_body(&body)?;
    let device_id = utils::non_empty(request.device_id.as_deref());

    state
        .spotify
        .client(&token)
        .pause_playback(device_id.as_deref())
        .await
        .map_err(|e| ApiError::upstream("pause", e))?;

    Ok(Json(PauseResponse { status: "paused" }))
}

/// `GET /api/playback/state`: current playback, or `null` when nothing plays.
pub async fn playback_state(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<Value>, ApiError> {
    let playback = state
        .spotify
        .client(&token)
        .current_playback()
        .await
        .map_err(|e| ApiError::upstream("playback state", e))?;

    Ok(Json(playback))
}

/// `GET /api/devices`: the user's available devices, passed through as-is.
pub async fn devices(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<Value>, ApiError> {
    let devices = state
        .spotify
        .client(&token)
        .devices()
        .await
        .map_err(|e| ApiError::upstream("devices", e))?;

    Ok(Json(devices))
}
