//! Error types for feed operations.

use crate::config::ConfigError;
use crate::ephemeris::EphemerisError;

/// Result type for feed operations
pub type FeedResult<T> = Result<T, FeedError>;

/// Error type for feed construction and serving.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Missing or wrong access token, or no token configured at all.
    #[error("Invalid or missing access token")]
    InvalidAuthentication,

    /// Neither a phase kind nor a solar moment was selected, so the feed
    /// would be empty.
    #[error(
        "No phase kinds selected; choose at least one of night, astro-dawn, nautical-dawn, \
         civil-dawn, daylight, civil-dusk, nautical-dusk, astro-dusk, sunrise, sunset"
    )]
    InvalidSelection,

    /// The ephemeris oracle could not resolve a day.
    ///
    /// The per-request cache downgrades this to an empty day, so it only
    /// surfaces from direct oracle use.
    #[error(transparent)]
    EphemerisUnavailable(#[from] EphemerisError),

    /// The cooperative deadline passed between two days of the walk.
    #[error("Feed computation exceeded its deadline after {days_processed} days")]
    DeadlineExceeded { days_processed: usize },

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl FeedError {
    /// Stable code used in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            FeedError::InvalidAuthentication => "INVALID_AUTHENTICATION",
            FeedError::InvalidSelection => "INVALID_SELECTION",
            FeedError::EphemerisUnavailable(_) => "EPHEMERIS_UNAVAILABLE",
            FeedError::DeadlineExceeded { .. } => "DEADLINE_EXCEEDED",
            FeedError::Config(_) => "CONFIGURATION_ERROR",
        }
    }
}
