//! Router tests.
//!
//! The Web API is replaced by a fake client factory that records every
//! upstream call, so the tests can assert both the HTTP answer and whether
//! Spotify would have been contacted.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use sporlproxy::{
    config::{DEFAULT_ALLOWED_ORIGINS, SPOTIFY_SCOPES, SpotifyConfig},
    error::SpotifyError,
    server::{AppState, router},
    spotify::{ClientFactory, OAuthGateway, SpotifyApi},
    types::PrivateUser,
};

const PROTECTED: [(&str, &str); 6] = [
    ("GET", "/api/user/profile"),
    ("GET", "/api/search?q=test"),
    ("POST", "/api/play"),
    ("POST", "/api/pause"),
    ("GET", "/api/playback/state"),
    ("GET", "/api/devices"),
];

#[derive(Clone)]
struct FakeSpotify {
    calls: Arc<Mutex<Vec<String>>>,
    failure: Option<(u16, &'static str)>,
    profile: Value,
    payload: Value,
}

impl FakeSpotify {
    fn new() -> Self {
        FakeSpotify {
            calls: Arc::new(Mutex::new(Vec::new())),
            failure: None,
            profile: json!({ "id": "user-1", "product": "premium" }),
            payload: json!({ "ok": true }),
        }
    }

    fn failing(status: u16, message: &'static str) -> Self {
        FakeSpotify {
            failure: Some((status, message)),
            ..Self::new()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), SpotifyError> {
        self.calls.lock().unwrap().push(call);
        match self.failure {
            None => Ok(()),
            Some((401, message)) => Err(SpotifyError::Unauthorized(message.to_string())),
            Some((status, message)) => Err(SpotifyError::Api {
                status,
                message: message.to_string(),
            }),
        }
    }
}

impl ClientFactory for FakeSpotify {
    fn client(&self, access_token: &str) -> Box<dyn SpotifyApi> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("client {access_token}"));
        Box::new(self.clone())
    }
}

#[async_trait]
impl SpotifyApi for FakeSpotify {
    async fn current_user(&self) -> Result<PrivateUser, SpotifyError> {
        self.record("me".to_string())?;
        Ok(serde_json::from_value(self.profile.clone()).unwrap())
    }

    async fn search(&self, query: &str, kind: &str, limit: u32) -> Result<Value, SpotifyError> {
        self.record(format!("search {query} {kind} {limit}"))?;
        Ok(self.payload.clone())
    }

    async fn start_playback(
        &self,
        track_uri: &str,
        position_ms: u64,
        device_id: Option<&str>,
    ) -> Result<(), SpotifyError> {
        self.record(format!(
            "play {track_uri} {position_ms} {}",
            device_id.unwrap_or("-")
        ))
    }

    async fn pause_playback(&self, device_id: Option<&str>) -> Result<(), SpotifyError> {
        self.record(format!("pause {}", device_id.unwrap_or("-")))
    }

    async fn current_playback(&self) -> Result<Value, SpotifyError> {
        self.record("playback".to_string())?;
        Ok(self.payload.clone())
    }

    async fn devices(&self) -> Result<Value, SpotifyError> {
        self.record("devices".to_string())?;
        Ok(self.payload.clone())
    }
}

fn test_config() -> SpotifyConfig {
    SpotifyConfig::new("test-client", "test-secret", "http://localhost:3000/callback")
}

fn app_with(fake: FakeSpotify, config: SpotifyConfig) -> Router {
    let origins: Vec<String> = DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect();
    router(AppState::new(OAuthGateway::new(config), fake), &origins)
}

fn app(fake: FakeSpotify) -> Router {
    app_with(fake, test_config())
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::from_bytes(method.as_bytes()).unwrap())
        .uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

// ============================================================================
// Public endpoints
// ============================================================================

#[tokio::test]
async fn test_root() {
    let (status, body) = send(app(FakeSpotify::new()), request("GET", "/", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("running"));
}

#[tokio::test]
async fn test_health_is_independent_of_auth_and_upstream() {
    let fake = FakeSpotify::failing(500, "upstream down");
    let (status, body) = send(
        app_with(fake.clone(), SpotifyConfig {
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            ..test_config()
        }),
        request("GET", "/api/health", None, None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["message"].is_string());
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn test_login_url_contains_required_parameters() {
    let (status, body) = send(
        app(FakeSpotify::new()),
        request("GET", "/api/auth/login", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let auth_url = url::Url::parse(body["auth_url"].as_str().unwrap()).unwrap();
    assert_eq!(auth_url.host_str(), Some("accounts.spotify.com"));
    assert_eq!(auth_url.path(), "/authorize");

    let params: std::collections::HashMap<String, String> =
        auth_url.query_pairs().into_owned().collect();
    assert_eq!(params["client_id"], "test-client");
    assert_eq!(params["response_type"], "code");
    assert_eq!(params["redirect_uri"], "http://localhost:3000/callback");

    let scopes: Vec<&str> = params["scope"].split(' ').collect();
    assert_eq!(scopes, SPOTIFY_SCOPES.to_vec());
}

#[tokio::test]
async fn test_login_without_credentials_is_internal_error() {
    let config = SpotifyConfig {
        client_secret: None,
        ..test_config()
    };
    let (status, body) = send(
        app_with(FakeSpotify::new(), config),
        request("GET", "/api/auth/login", None, None),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("SPOTIFY_CLIENT_SECRET"));
}

#[tokio::test]
async fn test_callback_requires_code() {
    let (status, body) = send(
        app(FakeSpotify::new()),
        request("GET", "/api/auth/callback", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("code"));

    let (status, body) = send(
        app(FakeSpotify::new()),
        request("GET", "/api/auth/callback?error=access_denied", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("access_denied"));
}

#[tokio::test]
async fn test_refresh_requires_refresh_token() {
    let (status, body) = send(
        app(FakeSpotify::new()),
        request("POST", "/api/auth/refresh", None, Some(json!({}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Refresh token is required");

    let (status, _) = send(
        app(FakeSpotify::new()),
        request("POST", "/api/auth/refresh", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Bearer guard
// ============================================================================

#[tokio::test]
async fn test_protected_endpoints_without_token() {
    for (method, uri) in PROTECTED {
        let fake = FakeSpotify::new();
        let body = (method == "POST").then(|| json!({ "track_uri": "spotify:track:abc" }));
        let (status, response) = send(app(fake.clone()), request(method, uri, None, body)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert!(response["detail"].is_string(), "{method} {uri}");
        assert!(fake.calls().is_empty(), "{method} {uri} reached upstream");
    }
}

#[tokio::test]
async fn test_protected_endpoints_with_malformed_header() {
    for header_value in ["Basic dXNlcjpwYXNz", "Bearer ", "Bearertoken", "token"] {
        for (method, uri) in PROTECTED {
            let fake = FakeSpotify::new();
            let req = Request::builder()
                .method(Method::from_bytes(method.as_bytes()).unwrap())
                .uri(uri)
                .header(header::AUTHORIZATION, header_value)
                .body(Body::empty())
                .unwrap();
            let (status, _) = send(app(fake.clone()), req).await;

            assert_eq!(status, StatusCode::UNAUTHORIZED, "{header_value:?} {uri}");
            assert!(fake.calls().is_empty());
        }
    }
}

#[tokio::test]
async fn test_protected_endpoints_with_rejected_token() {
    for (method, uri) in PROTECTED {
        let fake = FakeSpotify::failing(401, "Invalid access token");
        let body = (method == "POST").then(|| json!({ "track_uri": "spotify:track:abc" }));
        let (status, _) = send(
            app(fake.clone()),
            request(method, uri, Some("not-a-real-token"), body),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(fake.calls()[0], "client not-a-real-token");
    }
}

// ============================================================================
// Profile
// ============================================================================

#[tokio::test]
async fn test_profile_premium() {
    let fake = FakeSpotify {
        profile: json!({
            "id": "user-1",
            "display_name": "Ada",
            "email": "ada@example.com",
            "product": "premium",
            "images": [{"url": "https://i.scdn.co/image/abc"}],
            "followers": {"total": 7}
        }),
        ..FakeSpotify::new()
    };
    let (status, body) = send(
        app(fake.clone()),
        request("GET", "/api/user/profile", Some("good"), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "id": "user-1",
            "display_name": "Ada",
            "email": "ada@example.com",
            "product": "premium",
            "is_premium": true,
            "images": [{"url": "https://i.scdn.co/image/abc"}],
            "followers": 7
        })
    );
    assert_eq!(fake.calls(), vec!["client good", "me"]);
}

#[tokio::test]
async fn test_profile_without_product_is_free() {
    let fake = FakeSpotify {
        profile: json!({ "id": "user-2" }),
        ..FakeSpotify::new()
    };
    let (status, body) = send(
        app(fake),
        request("GET", "/api/user/profile", Some("good"), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"], "free");
    assert_eq!(body["is_premium"], false);
    assert_eq!(body["display_name"], "User");
}

#[tokio::test]
async fn test_profile_provider_error_is_unauthorized() {
    let (status, body) = send(
        app(FakeSpotify::failing(403, "Forbidden")),
        request("GET", "/api/user/profile", Some("good"), None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Invalid or expired token");
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
async fn test_search_defaults() {
    let fake = FakeSpotify {
        payload: json!({ "tracks": { "items": [], "total": 0 } }),
        ..FakeSpotify::new()
    };
    let (status, body) = send(
        app(fake.clone()),
        request("GET", "/api/search?q=daft%20punk", Some("good"), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "tracks": { "items": [], "total": 0 } }));
    assert_eq!(fake.calls(), vec!["client good", "search daft punk track 20"]);
}

#[tokio::test]
async fn test_search_with_type_and_limit() {
    let fake = FakeSpotify::new();
    let (status, _) = send(
        app(fake.clone()),
        request("GET", "/api/search?q=abba&type=artist&limit=5", Some("good"), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(fake.calls()[1], "search abba artist 5");
}

#[tokio::test]
async fn test_search_requires_query() {
    for uri in ["/api/search?q=", "/api/search?q=%20%20", "/api/search"] {
        let fake = FakeSpotify::new();
        let (status, body) = send(app(fake.clone()), request("GET", uri, Some("good"), None)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["detail"], "q is required");
        assert!(fake.calls().is_empty());
    }
}

#[tokio::test]
async fn test_search_rejects_invalid_limit() {
    let fake = FakeSpotify::new();
    let (status, _) = send(
        app(fake.clone()),
        request("GET", "/api/search?q=abba&limit=lots", Some("good"), None),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn test_search_provider_error_is_bad_request() {
    let (status, body) = send(
        app(FakeSpotify::failing(400, "Invalid limit")),
        request("GET", "/api/search?q=abba&limit=500", Some("good"), None),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Spotify API error: Invalid limit");
}

// ============================================================================
// Playback
// ============================================================================

#[tokio::test]
async fn test_play_requires_track_uri() {
    for body in [Some(json!({ "position_ms": 1000 })), Some(json!({ "track_uri": "" })), None] {
        let fake = FakeSpotify::new();
        let (status, response) = send(
            app(fake.clone()),
            request("POST", "/api/play", Some("good"), body),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["detail"], "track_uri is required");
        assert!(fake.calls().is_empty());
    }
}

#[tokio::test]
async fn test_play_success() {
    let fake = FakeSpotify::new();
    let (status, body) = send(
        app(fake.clone()),
        request(
            "POST",
            "/api/play",
            Some("good"),
            Some(json!({ "track_uri": "spotify:track:abc", "position_ms": 5000 })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "status": "playing", "position_ms": 5000, "track_uri": "spotify:track:abc" })
    );
    assert_eq!(fake.calls(), vec!["client good", "play spotify:track:abc 5000 -"]);
}

#[tokio::test]
async fn test_play_defaults_position_and_forwards_device() {
    let fake = FakeSpotify::new();
    let (status, body) = send(
        app(fake.clone()),
        request(
            "POST",
            "/api/play",
            Some("good"),
            Some(json!({ "track_uri": "spotify:track:abc", "device_id": "dev-1" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["position_ms"], 0);
    assert_eq!(fake.calls()[1], "play spotify:track:abc 0 dev-1");
}

#[tokio::test]
async fn test_play_provider_error_is_bad_request() {
    let (status, body) = send(
        app(FakeSpotify::failing(404, "Player command failed: No active device found")),
        request(
            "POST",
            "/api/play",
            Some("good"),
            Some(json!({ "track_uri": "spotify:track:abc" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("No active device found"));
}

#[tokio::test]
async fn test_play_rejects_invalid_json() {
    let fake = FakeSpotify::new();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/play")
        .header(header::AUTHORIZATION, "Bearer good")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"track_uri\":"))
        .unwrap();
    let (status, _) = send(app(fake.clone()), req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn test_pause_without_body() {
    let fake = FakeSpotify::new();
    let (status, body) = send(
        app(fake.clone()),
        request("POST", "/api/pause", Some("good"), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "paused" }));
    assert_eq!(fake.calls(), vec!["client good", "pause -"]);
}

#[tokio::test]
async fn test_pause_forwards_device() {
    let fake = FakeSpotify::new();
    let (status, _) = send(
        app(fake.clone()),
        request("POST", "/api/pause", Some("good"), Some(json!({ "device_id": "dev-9" }))),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(fake.calls()[1], "pause dev-9");
}

#[tokio::test]
async fn test_playback_state_and_devices_pass_through() {
    let fake = FakeSpotify {
        payload: json!({ "devices": [{ "id": "dev-1", "is_active": true }] }),
        ..FakeSpotify::new()
    };

    let (status, body) = send(
        app(fake.clone()),
        request("GET", "/api/devices", Some("good"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["devices"][0]["id"], "dev-1");

    let fake = FakeSpotify {
        payload: Value::Null,
        ..FakeSpotify::new()
    };
    let (status, body) = send(
        app(fake.clone()),
        request("GET", "/api/playback/state", Some("good"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
    assert_eq!(fake.calls(), vec!["client good", "playback"]);
}

// ============================================================================
// CORS
// ============================================================================

#[tokio::test]
async fn test_cors_preflight_from_allowed_origin() {
    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/play")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization,content-type")
        .body(Body::empty())
        .unwrap();
    let response = app(FakeSpotify::new()).oneshot(req).await.unwrap();
    let headers = response.headers();

    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST");
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
        "authorization,content-type"
    );
}

#[tokio::test]
async fn test_cors_ignores_unknown_origin() {
    let req = Request::builder()
        .uri("/api/health")
        .header(header::ORIGIN, "http://evil.example")
        .body(Body::empty())
        .unwrap();
    let response = app(FakeSpotify::new()).oneshot(req).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}
