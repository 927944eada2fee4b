//! Configuration management for the proxy.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. The values are collected once at startup into a
//! [`Config`] which is then handed to the authorization gateway and the router.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the working directory
//! 3. `.env` file in the local data directory
//! 4. Application defaults (where applicable)

use std::{env, io, path::PathBuf};

use anyhow::{Context, Result};

pub const DEFAULT_SERVER_ADDRESS: &str = "0.0.0.0:8001";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";

/// Origins of the local frontend dev servers.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

/// Permissions requested from the user during authorization.
pub const SPOTIFY_SCOPES: [&str; 7] = [
    "user-read-playback-state",
    "user-modify-playback-state",
    "user-read-private",
    "streaming",
    "user-read-currently-playing",
    "user-library-read",
    "playlist-read-private",
];

/// Loads environment variables from `.env` files.
///
/// The working directory is tried first, then the platform-specific local data
/// directory under `sporlproxy/.env`. Variables that are already set are never
/// overwritten, so the first source wins.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/sporlproxy/.env`
/// - macOS: `~/Library/Application Support/sporlproxy/.env`
/// - Windows: `%LOCALAPPDATA%/sporlproxy/.env`
///
/// # Errors
///
/// Returns an error if the data directory cannot be created or an existing
/// `.env` file cannot be parsed. A missing file is not an error.
pub async fn load_env() -> Result<(), String> {
    check_dotenv(dotenv::dotenv())?;

    let path = data_env_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        check_dotenv(dotenv::from_path(&path))?;
    }
    Ok(())
}

// A missing file is fine, anything else (e.g. a malformed line) is reported.
fn check_dotenv<T>(result: dotenv::Result<T>) -> Result<(), String> {
    match result {
        Ok(_) => Ok(()),
        Err(dotenv::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.to_string()),
    }
}

fn data_env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("sporlproxy/.env");
    path
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Spotify application credentials and endpoints.
///
/// Credentials are optional at load time so the proxy can start (and answer
/// health checks) without them; the gateway reports their absence when a login
/// is attempted.
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
}

impl SpotifyConfig {
    /// Config with the given credentials and the public Spotify endpoints.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: Some(client_id.into()),
            client_secret: Some(client_secret.into()),
            redirect_uri: Some(redirect_uri.into()),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

/// Application configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub allowed_origins: Vec<String>,
    pub log_format: LogFormat,
    pub spotify: SpotifyConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let log_format = match get("LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => anyhow::bail!("Invalid LOG_FORMAT '{other}', expected 'text' or 'json'"),
        };

        let server_address =
            get("SERVER_ADDRESS").unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string());
        server_address
            .parse::<std::net::SocketAddr>()
            .with_context(|| format!("Invalid SERVER_ADDRESS '{server_address}'"))?;

        let allowed_origins = match get("CORS_ALLOWED_ORIGINS") {
            Some(list) => parse_origins(&list),
            None => DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        Ok(Config {
            server_address,
            allowed_origins,
            log_format,
            spotify: SpotifyConfig {
                client_id: get("SPOTIFY_CLIENT_ID"),
                client_secret: get("SPOTIFY_CLIENT_SECRET"),
                redirect_uri: get("REDIRECT_URI"),
                auth_url: get("SPOTIFY_API_AUTH_URL")
                    .unwrap_or_else(|| DEFAULT_AUTH_URL.to_string()),
                token_url: get("SPOTIFY_API_TOKEN_URL")
                    .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
                api_url: get("SPOTIFY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            },
        })
    }
}

/// Splits a comma-separated origin list, dropping blanks and trailing slashes.
pub fn parse_origins(list: &str) -> Vec<String> {
    list.split(',')
        .map(|o| o.trim().trim_end_matches('/'))
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}
