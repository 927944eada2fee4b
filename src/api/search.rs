use std::collections::HashMap;

use axum::{
    Json,
    extract::{Query, State},
};
use serde_json::Value;

use crate::{
    api::BearerToken,
    error::ApiError,
    server::AppState,
    utils::{self, DEFAULT_SEARCH_TYPE},
};

/// `GET /api/search?q=..&type=track&limit=20`, relayed verbatim.
pub async fn search(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let Some(query) = utils::non_empty(params.get("q").map(String::as_str)) else {
        return Err(ApiError::BadRequest("q is required".to_string()));
    };
    let kind = utils::non_empty(params.get("type").map(String::as_str))
        .unwrap_or_else(|| DEFAULT_SEARCH_TYPE.to_string());
    let limit = utils::parse_limit(params.get("limit").map(String::as_str))?;

    let results = state
        .spotify
        .client(&token)
        .search(&query, &kind, limit)
        .await
        .map_err(|e| ApiError::upstream("search", e))?;

    Ok(Json(results))
}
