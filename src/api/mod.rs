//! # API Module
//!
//! HTTP endpoints of the proxy. Every handler is a plain async function wired
//! into the router by [`crate::server::router`].
//!
//! ## Endpoints
//!
//! ### Public
//!
//! - [`root`], [`health`] - liveness; never touch Spotify
//! - [`login`] - authorization URL for the browser to visit
//! - [`callback`] - exchanges the `code` query parameter for tokens
//! - [`refresh`] - exchanges a refresh token for a new access token
//!
//! ### Guarded
//!
//! These sit behind [`require_bearer`] and read the token through the
//! [`BearerToken`] extractor:
//!
//! - [`profile`] - reshaped `GET /me`
//! - [`search`] - `GET /search`
//! - [`play`], [`pause`] - playback control
//! - [`playback_state`], [`devices`] - player reads
//!
//! Each guarded handler builds one token-scoped client, issues exactly one
//! upstream call and drops the client. Failures are answered through
//! [`crate::error::ApiError`].

mod auth;
mod guard;
mod health;
mod player;
mod search;
mod user;

pub use auth::{callback, login, refresh};
pub use guard::{BearerToken, require_bearer};
pub use health::{health, root};
pub use player::{devices, pause, play, playback_state};
pub use search::search;
pub use user::profile;
