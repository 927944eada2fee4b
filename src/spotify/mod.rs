//! # Spotify Integration Module
//!
//! This module is the only place that talks to Spotify. It is split along the
//! two services Spotify exposes:
//!
//! ```text
//! HTTP handlers (crate::api)
//!          ↓
//! Spotify Integration Layer
//!     ├── auth    - accounts service: authorize URL, code exchange, refresh
//!     └── client  - Web API: profile, search, playback, devices
//!          ↓
//! HTTP Layer (reqwest, JSON)
//! ```
//!
//! ## Authorization
//!
//! [`auth::OAuthGateway`] implements the authorization-code flow with a client
//! secret. It is built once from [`crate::config::SpotifyConfig`] and is
//! stateless: every token it obtains is returned to the caller and forgotten.
//!
//! ## Web API
//!
//! [`SpotifyApi`] is the seam between the router and the Web API. Handlers ask
//! a [`ClientFactory`] for a client bound to the caller's access token, issue
//! exactly one call on it and drop it. [`client::WebApiClientFactory`] is the
//! production implementation; tests substitute their own.
//!
//! ## Error Types
//!
//! Web API calls fail with [`crate::error::SpotifyError`], the gateway with
//! [`crate::error::OAuthError`]. Neither retries.

pub mod auth;
pub mod client;

use async_trait::async_trait;
use serde_json::Value;

use crate::{error::SpotifyError, types::PrivateUser};

pub use auth::OAuthGateway;
pub use client::{WebApiClient, WebApiClientFactory};

/// Operations the proxy performs on behalf of a user.
///
/// An implementation is bound to one access token for its whole life.
#[async_trait]
pub trait SpotifyApi: Send + Sync {
    /// `GET /me`
    async fn current_user(&self) -> Result<PrivateUser, SpotifyError>;

    /// `GET /search`, returned verbatim.
    async fn search(&self, query: &str, kind: &str, limit: u32) -> Result<Value, SpotifyError>;

    /// `PUT /me/player/play` for a single track.
    async fn start_playback(
        &self,
        track_uri: &str,
        position_ms: u64,
        device_id: Option<&str>,
    ) -> Result<(), SpotifyError>;

    /// `PUT /me/player/pause`
    async fn pause_playback(&self, device_id: Option<&str>) -> Result<(), SpotifyError>;

    /// `GET /me/player`, `Value::Null` when nothing is playing.
    async fn current_playback(&self) -> Result<Value, SpotifyError>;

    /// `GET /me/player/devices`, returned verbatim.
    async fn devices(&self) -> Result<Value, SpotifyError>;
}

/// Builds a [`SpotifyApi`] scoped to a single access token.
pub trait ClientFactory: Send + Sync {
    fn client(&self, access_token: &str) -> Box<dyn SpotifyApi>;
}
