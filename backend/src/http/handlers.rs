//! HTTP handlers for the feed API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for the actual work.

use std::time::Instant;

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::{info, warn};

use super::dto::{FeedQuery, HealthResponse};
use super::error::AppError;
use super::state::AppState;
use crate::calendar::{self, CalendarMeta};
use crate::services::FeedAssembler;
use crate::validation::sanitize_timezone;

/// Attachment name offered to browsers downloading the feed.
pub const FEED_FILENAME: &str = "twilight-calendar.ics";

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint. Reports whether a usable token is configured so a
/// deployment still on the placeholder is easy to spot.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        token_configured: state.gate.is_configured(),
    })
}

// =============================================================================
// Feed
// =============================================================================

/// GET /v1/feed
///
/// Build and return the iCalendar feed described by the query string.
pub async fn get_feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<Response, AppError> {
    if let Err(e) = state.gate.check(query.token.as_deref()) {
        warn!(
            "Rejected feed request (token {})",
            if query.token.is_some() { "mismatch" } else { "missing" }
        );
        return Err(e.into());
    }

    let tz = sanitize_timezone(query.zone.as_deref(), state.config.default_tz());
    let today = Utc::now().with_timezone(&tz).date_naive();
    let request = query.build_request(&state.config, today);

    let refresh_secs = state.config.update_interval().as_secs();
    let meta = CalendarMeta::new(
        format!("Twilight Calendar for {}", request.coordinate.label()),
        request.tz.name(),
        refresh_secs,
    );
    let deadline = Instant::now() + state.config.request_timeout();
    let started = Instant::now();

    let worker = state.clone();
    let events = tokio::task::spawn_blocking(move || {
        FeedAssembler::new(worker.provider.as_ref(), &worker.year_stats)
            .with_window_days(worker.config.window_days)
            .with_deadline(deadline)
            .assemble(&request)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?
    .map_err(|e| {
        warn!("Feed request failed: {}", e);
        AppError::from(e)
    })?;

    info!(
        "Served {} events for {} in {:?}",
        events.len(),
        meta.name,
        started.elapsed()
    );

    let body = calendar::render(&events, &meta);
    let headers = [
        (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
        (
            header::CACHE_CONTROL,
            format!("max-age={}", refresh_secs),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", FEED_FILENAME),
        ),
        (header::X_CONTENT_TYPE_OPTIONS, "nosniff".to_string()),
        (header::X_FRAME_OPTIONS, "DENY".to_string()),
    ];

    Ok((headers, body).into_response())
}
