use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Token credential obtained from the accounts service.
///
/// Handed back to the caller and never stored by the proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCredential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: u64,
}

/// Raw body of a successful token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenEndpointResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    pub scope: Option<String>,
}

/// Error body of the token endpoint, e.g. `{"error": "invalid_grant", ...}`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenEndpointError {
    pub error: String,
    pub error_description: Option<String>,
}

/// Error body of the Web API, e.g. `{"error": {"status": 401, "message": ...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct WebApiErrorResponse {
    pub error: WebApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebApiErrorBody {
    pub status: Option<u16>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Followers {
    pub total: Option<u64>,
}

/// Current user as returned by `GET /me`.
#[derive(Debug, Clone, Deserialize)]
pub struct PrivateUser {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub product: Option<String>,
    pub images: Option<Vec<Value>>,
    pub followers: Option<Followers>,
}

/// Profile shape returned to the browser.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub product: String,
    pub is_premium: bool,
    pub images: Vec<Value>,
    pub followers: u64,
}

impl From<PrivateUser> for UserProfile {
    fn from(user: PrivateUser) -> Self {
        let product = user.product.unwrap_or_else(|| "free".to_string());
        UserProfile {
            id: user.id,
            display_name: user.display_name.unwrap_or_else(|| "User".to_string()),
            email: user.email.unwrap_or_default(),
            is_premium: product == "premium",
            product,
            images: user.images.unwrap_or_default(),
            followers: user.followers.and_then(|f| f.total).unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayRequest {
    pub track_uri: Option<String>,
    pub position_ms: Option<u64>,
    pub device_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PauseRequest {
    pub device_id: Option<String>,
}

/// Body of `PUT /me/player/play`.
#[derive(Debug, Clone, Serialize)]
pub struct StartPlaybackBody {
    pub uris: Vec<String>,
    pub position_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthUrlResponse {
    pub auth_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CallbackResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub expires_in: u64,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayResponse {
    pub status: &'static str,
    pub position_ms: u64,
    pub track_uri: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PauseResponse {
    pub status: &'static str,
}
