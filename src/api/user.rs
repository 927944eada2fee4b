use axum::{Json, extract::State};

use crate::{
    api::BearerToken, error::ApiError, server::AppState, types::UserProfile,
};

/// `GET /api/user/profile`: the current user's profile, reshaped.
///
/// Any error reported by Spotify is treated as an invalid token (401).
pub async fn profile(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<UserProfile>, ApiError> {
    let user = state
        .spotify
        .client(&token)
        .current_user()
        .await
        .map_err(ApiError::profile)?;

    Ok(Json(UserProfile::from(user)))
}
