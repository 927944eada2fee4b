use std::{net::SocketAddr, str::FromStr, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    api,
    config::Config,
    spotify::{ClientFactory, OAuthGateway, WebApiClientFactory},
};

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<OAuthGateway>,
    pub spotify: Arc<dyn ClientFactory>,
}

impl AppState {
    pub fn new(gateway: OAuthGateway, spotify: impl ClientFactory + 'static) -> Self {
        AppState {
            gateway: Arc::new(gateway),
            spotify: Arc::new(spotify),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let http = reqwest::Client::new();
        Self::new(
            OAuthGateway::with_client(config.spotify.clone(), http.clone()),
            WebApiClientFactory::with_client(config.spotify.api_url.clone(), http),
        )
    }
}

/// Builds the complete HTTP surface of the proxy.
pub fn router(state: AppState, allowed_origins: &[String]) -> Router {
    let guarded = Router::new()
        .route("/api/user/profile", get(api::profile))
        .route("/api/search", get(api::search))
        .route("/api/play", post(api::play))
        .route("/api/pause", post(api::pause))
        .route("/api/playback/state", get(api::playback_state))
        .route("/api/devices", get(api::devices))
        .route_layer(middleware::from_fn(api::require_bearer));

    Router::new()
        .route("/", get(api::root))
        .route("/api/health", get(api::health))
        .route("/api/auth/login", get(api::login))
        .route("/api/auth/callback", get(api::callback))
        .route("/api/auth/refresh", post(api::refresh))
        .merge(guarded)
        .with_state(state)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// Credentialed CORS for the configured origins.
///
/// Wildcards are not allowed together with credentials, so methods and
/// headers mirror whatever the preflight asks for.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

pub async fn start_api_server(config: &Config) -> Result<()> {
    let addr = SocketAddr::from_str(&config.server_address)
        .with_context(|| format!("Failed to parse server address '{}'", config.server_address))?;

    let app = router(AppState::from_config(config), &config.allowed_origins);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, "proxy listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
