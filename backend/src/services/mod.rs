//! Service layer for feed construction.
//!
//! This module sits between the ephemeris oracle and the HTTP handlers.
//! Services turn raw crossing instants into phase segments, rank them
//! against yearly distributions, and assemble the final event list.

pub mod access;
pub mod feed;
pub mod formatting;
pub mod segments;
pub mod year_stats;

pub use access::{AccessGate, PLACEHOLDER_TOKEN};
pub use feed::{event_uid, nth_event_uid, FeedAssembler, FeedEvent, FeedRequest};
pub use formatting::DisplayFormat;
pub use segments::{CrossingTimeline, PhaseSegment, SegmentBuilder};
pub use year_stats::{YearStatisticsIndex, YearStatsCache};
