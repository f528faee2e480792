//! Twilight Feed HTTP Server Binary
//!
//! Main entry point for the calendar feed server. Loads configuration, sets up
//! the HTTP router with the SPA ephemeris oracle and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! FEED_AUTH_TOKEN=$(openssl rand -hex 32) cargo run --bin twilight-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `FEED_CONFIG`: Path to a `feed.toml` (default: searched in `.`, `backend/`, `..`)
//! - `FEED_AUTH_TOKEN`, `FEED_WINDOW_DAYS`, `FEED_UPDATE_INTERVAL`,
//!   `FEED_DEFAULT_TIMEZONE`, `FEED_YEAR_CACHE_CAPACITY`, `FEED_REQUEST_TIMEOUT`:
//!   override the matching config keys
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use twilight_feed::ephemeris::SpaEphemerisProvider;
use twilight_feed::http::{create_router, AppState};
use twilight_feed::FeedConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting Twilight Feed HTTP Server");

    let config = FeedConfig::load()?;
    if !config.token_configured() {
        warn!("No access token configured; every feed request will be refused");
    }
    info!(
        "Configuration loaded: window {} days, refresh every {}s, default zone {}",
        config.window_days, config.update_interval_secs, config.default_timezone
    );

    // Create application state
    let state = AppState::new(config, Arc::new(SpaEphemerisProvider::new()));

    // Create router with all endpoints
    let app = create_router(state);

    // Determine bind address
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Server listening on http://{}", addr);
    info!("Feed endpoint: http://{}/v1/feed?token=...", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
