use base64::{Engine, engine::general_purpose::STANDARD};
use serde::de::DeserializeOwned;

use crate::{config::SPOTIFY_SCOPES, error::ApiError};

pub const DEFAULT_SEARCH_TYPE: &str = "track";
pub const DEFAULT_SEARCH_LIMIT: u32 = 20;

/// Extracts the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively; the token must be a single
/// non-empty word.
pub fn parse_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }
    Some(token)
}

/// Value of the `Authorization: Basic` header used against the token endpoint.
pub fn basic_credentials(client_id: &str, client_secret: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{client_id}:{client_secret}"))
    )
}

pub fn scope_string() -> String {
    SPOTIFY_SCOPES.join(" ")
}

/// Returns the trimmed value if it is present and not blank.
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Parses the `limit` query parameter, falling back to the default.
pub fn parse_limit(value: Option<&str>) -> Result<u32, ApiError> {
    match non_empty(value) {
        None => Ok(DEFAULT_SEARCH_LIMIT),
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| ApiError::BadRequest(format!("limit must be a positive integer, got '{raw}'"))),
    }
}

/// Decodes an optional JSON request body. An empty body yields the default.
pub fn parse_json_body<T>(body: &[u8]) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {e}")))
}
