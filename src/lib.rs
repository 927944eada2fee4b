//! Spotify Web API proxy library
//!
//! This library provides a thin HTTP proxy that lets a browser frontend log in
//! with Spotify and drive playback without holding the application's client
//! secret. The proxy is stateless: tokens are handed back to the caller and
//! presented again as bearer tokens on every request.
//!
//! # Modules
//!
//! - `api` - HTTP endpoint handlers and the bearer guard
//! - `config` - Configuration management and environment variables
//! - `error` - Upstream, gateway and HTTP error types
//! - `server` - Router assembly and the HTTP server
//! - `spotify` - Spotify accounts service and Web API clients
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use sporlproxy::{config, server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     config::load_env().await.map_err(anyhow::Error::msg)?;
//!     let config = config::Config::from_env()?;
//!     server::start_api_server(&config).await
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogFormat;

const DEFAULT_LOG_FILTER: &str = "sporlproxy=info,tower_http=info";

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the built-in filter.
pub fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => subscriber.with(fmt::layer().json()).init(),
        LogFormat::Text => subscriber.with(fmt::layer()).init(),
    }
}

/// Prints an informational message with a blue bullet point.
///
/// Used for console output of the command-line interface; request handling
/// logs through `tracing` instead.
///
/// # Example
///
/// ```
/// info!("Open the following URL to authorize:");
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// This macro will cause the program to exit immediately after printing
/// the error message. It should only be used for fatal errors where
/// recovery is not possible.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
