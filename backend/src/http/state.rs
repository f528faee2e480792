//! Application state for the HTTP server.

use std::sync::Arc;

use crate::config::FeedConfig;
use crate::ephemeris::SolarEphemerisProvider;
use crate::services::{AccessGate, YearStatsCache};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Immutable settings loaded at startup
    pub config: Arc<FeedConfig>,
    pub gate: Arc<AccessGate>,
    /// Ephemeris oracle used for every feed
    pub provider: Arc<dyn SolarEphemerisProvider>,
    /// Yearly statistics shared across requests
    pub year_stats: Arc<YearStatsCache>,
}

impl AppState {
    /// Create the application state from configuration and an oracle.
    pub fn new(config: FeedConfig, provider: Arc<dyn SolarEphemerisProvider>) -> Self {
        let gate = AccessGate::new(config.auth_token.clone());
        let year_stats = YearStatsCache::new(config.year_cache_capacity, config.year_cache_ttl());
        Self {
            config: Arc::new(config),
            gate: Arc::new(gate),
            provider,
            year_stats: Arc::new(year_stats),
        }
    }
}
