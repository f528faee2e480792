//! # Twilight Feed
//!
//! Calendar feeds of solar illumination phases.
//!
//! For a coordinate and a window of dates this crate produces the sequence of
//! night, astronomical/nautical/civil twilight and daylight phases, annotates
//! each phase with its duration and (for daylight and night) how it ranks
//! against the rest of its calendar year, and serializes the result as an
//! iCalendar document that calendar clients can subscribe to.
//!
//! ## Architecture
//!
//! - [`models`]: coordinates, phase kinds, per-day crossing sets and local-day helpers
//! - [`ephemeris`]: the injected solar ephemeris oracle and its request-scoped cache
//! - [`services`]: segmentation, yearly statistics, feed assembly and access control
//! - [`calendar`]: iCalendar text serialization
//! - [`validation`]: lenient sanitization of raw feed parameters
//! - [`config`]: process-wide immutable configuration
//! - [`http`]: Axum-based HTTP server exposing the feed endpoint
//!
//! ## Performance
//!
//! Yearly daylight distributions are the expensive part of a feed (one oracle
//! call per day of the year). They are built at most once per
//! `(coordinate, timezone, year)` and shared through
//! [`services::year_stats::YearStatsCache`], so a 365-day feed costs roughly
//! 2 × 365 oracle calls instead of 365².

pub mod calendar;
pub mod checksum;
pub mod config;
pub mod ephemeris;
pub mod error;
pub mod models;
pub mod services;
pub mod validation;

#[cfg(feature = "http-server")]
pub mod http;

pub use config::FeedConfig;
pub use error::FeedError;
