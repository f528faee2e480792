//! HTTP server module for the twilight feed.
//!
//! An axum server that exposes the feed assembler as a subscribable
//! calendar URL.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Token check, lenient query sanitization                │
//! │  - iCalendar response, CORS, compression, tracing         │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │ spawn_blocking
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Service Layer (services/)                                │
//! │  - Segmentation, yearly statistics, feed assembly         │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Ephemeris oracle (ephemeris/)                            │
//! │  - SpaEphemerisProvider / fixtures                        │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
