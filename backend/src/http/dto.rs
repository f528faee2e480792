//! Data Transfer Objects for the HTTP API.

use serde::{Deserialize, Serialize};

/// Query string of `GET /v1/feed`.
pub use crate::validation::FeedParams as FeedQuery;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Crate version
    pub version: String,
    /// Whether a usable access token is configured
    pub token_configured: bool,
}
