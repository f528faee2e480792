//! Lenient sanitization of raw feed parameters.
//!
//! Calendar clients replay subscription URLs for years, so bad values fall
//! back to defaults instead of failing the request. Only the token and the
//! phase selection can make a request fail, and those are checked elsewhere.

use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::config::FeedConfig;
use crate::models::{Coordinate, PhaseSelection, SolarMoment};
use crate::services::{DisplayFormat, FeedRequest};

/// Longest accepted free-text note, in characters.
pub const MAX_NOTE_CHARS: usize = 500;
/// Offsets are limited to one day either way, in minutes.
pub const MAX_OFFSET_MINUTES: i64 = 1440;
pub const ELEVATION_RANGE_M: (f64, f64) = (-500.0, 9000.0);

/// Query parameters of a feed request, exactly as received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FeedParams {
    pub token: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub elevation: Option<String>,
    pub zone: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub rise_off: Option<String>,
    pub set_off: Option<String>,
    pub twelve: Option<String>,
    pub description: Option<String>,
    pub phases: Option<String>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
}

impl FeedParams {
    /// Sanitize every parameter into a [`FeedRequest`].
    ///
    /// `today` is the default start date. The selection may come out empty;
    /// the assembler rejects that.
    pub fn build_request(&self, config: &FeedConfig, today: NaiveDate) -> FeedRequest {
        let fallback = config.default_coordinate();
        let coordinate = Coordinate::new(
            sanitize_float(self.lat.as_deref(), fallback.latitude, -90.0, 90.0),
            sanitize_float(self.lon.as_deref(), fallback.longitude, -180.0, 180.0),
        );
        let coordinate = match sanitize_elevation(self.elevation.as_deref()) {
            Some(elevation) => coordinate.with_elevation(elevation),
            None => coordinate,
        };

        let tz = sanitize_timezone(self.zone.as_deref(), config.default_tz());
        let start = sanitize_date(self.start.as_deref(), today);
        let end = sanitize_date(self.end.as_deref(), start + Duration::days(364));

        FeedRequest::new(coordinate, tz, start, end, self.selection())
            .with_moments(self.moments())
            .with_offsets(
                sanitize_offset(self.rise_off.as_deref()),
                sanitize_offset(self.set_off.as_deref()),
            )
            .with_display(DisplayFormat::from_twelve_hour(is_truthy(
                self.twelve.as_deref(),
            )))
            .with_note(sanitize_text(
                self.description.as_deref().unwrap_or_default(),
                MAX_NOTE_CHARS,
            ))
    }

    /// Phase kinds named by `phases`.
    pub fn selection(&self) -> PhaseSelection {
        self.phases
            .as_deref()
            .map(PhaseSelection::parse_list)
            .unwrap_or_default()
    }

    /// Sunrise and sunset instants, asked for by the `sunrise`/`sunset`
    /// checkboxes or by name inside `phases`.
    pub fn moments(&self) -> Vec<SolarMoment> {
        let listed = self.phases.as_deref().unwrap_or_default();
        SolarMoment::ALL
            .into_iter()
            .filter(|moment| {
                let flag = match moment {
                    SolarMoment::Sunrise => self.sunrise.as_deref(),
                    SolarMoment::Sunset => self.sunset.as_deref(),
                };
                is_truthy(flag)
                    || listed
                        .split(',')
                        .any(|item| item.parse::<SolarMoment>() == Ok(*moment))
            })
            .collect()
    }
}

/// `value` parsed as a float inside `[min, max]`, else `default`.
pub fn sanitize_float(value: Option<&str>, default: f64, min: f64, max: f64) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && (min..=max).contains(v))
        .unwrap_or(default)
}

/// `value` parsed as an integer inside `[min, max]`, else `default`.
pub fn sanitize_int(value: Option<&str>, default: i64, min: i64, max: i64) -> i64 {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| (min..=max).contains(v))
        .unwrap_or(default)
}

pub fn sanitize_offset(value: Option<&str>) -> i64 {
    sanitize_int(value, 0, -MAX_OFFSET_MINUTES, MAX_OFFSET_MINUTES)
}

pub fn sanitize_elevation(value: Option<&str>) -> Option<f64> {
    let (min, max) = ELEVATION_RANGE_M;
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && (min..=max).contains(v))
}

/// A known IANA zone name, else `default`.
pub fn sanitize_timezone(value: Option<&str>, default: Tz) -> Tz {
    value
        .and_then(|v| v.trim().parse::<Tz>().ok())
        .unwrap_or(default)
}

/// A `YYYY-MM-DD` date, else `default`.
pub fn sanitize_date(value: Option<&str>, default: NaiveDate) -> NaiveDate {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d").ok())
        .unwrap_or(default)
}

/// Strip markup, collapse line breaks to spaces and cut to `max_chars`.
pub fn sanitize_text(value: &str, max_chars: usize) -> String {
    let mut plain = String::with_capacity(value.len());
    let mut in_tag = false;
    for c in value.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            '\r' | '\n' => {
                if !plain.ends_with(' ') {
                    plain.push(' ');
                }
            }
            _ => plain.push(c),
        }
    }
    plain.trim().chars().take(max_chars).collect()
}

/// Checkbox semantics: present means on, unless spelled as an explicit off.
pub fn is_truthy(value: Option<&str>) -> bool {
    match value {
        None => false,
        Some(v) => !matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "0" | "false" | "off" | "no"
        ),
    }
}
