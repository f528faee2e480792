//! Assembly of the event sequence for one feed request.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use log::debug;
use serde::Serialize;

use super::formatting::{day_percent, DisplayFormat, EventText, PhaseFigures};
use super::segments::{CrossingTimeline, PhaseSegment, SegmentBuilder};
use super::year_stats::{YearStatisticsIndex, YearStatsCache};
use crate::checksum::calculate_checksum;
use crate::ephemeris::{EphemerisCache, SolarEphemerisProvider};
use crate::error::{FeedError, FeedResult};
use crate::models::{
    date_range, day_bounds, Boundary, Coordinate, EventKind, PhaseKind, PhaseSelection, Side,
    SolarMoment,
};

/// Default maximum number of days in one feed.
pub const DEFAULT_WINDOW_DAYS: u32 = 365;

/// Domain suffix of every event UID.
pub const UID_DOMAIN: &str = "twilight-feed";

/// Oracle days around the walked date whose crossings can fall inside it or
/// close its last segment.
const TIMELINE_OFFSETS: [i64; 4] = [-1, 0, 1, 2];

/// A validated feed request.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedRequest {
    pub coordinate: Coordinate,
    pub tz: Tz,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub selection: PhaseSelection,
    /// Sunrise and sunset instants reported as zero-length events
    pub moments: Vec<SolarMoment>,
    /// Minutes added to dawn-side crossings
    pub rise_offset_minutes: i64,
    /// Minutes added to dusk-side crossings
    pub set_offset_minutes: i64,
    pub display: DisplayFormat,
    /// Free text appended to every description
    pub note: String,
}

impl FeedRequest {
    pub fn new(
        coordinate: Coordinate,
        tz: Tz,
        start: NaiveDate,
        end: NaiveDate,
        selection: PhaseSelection,
    ) -> Self {
        Self {
            coordinate,
            tz,
            start,
            end,
            selection,
            moments: Vec::new(),
            rise_offset_minutes: 0,
            set_offset_minutes: 0,
            display: DisplayFormat::default(),
            note: String::new(),
        }
    }

    pub fn with_moments(mut self, moments: impl IntoIterator<Item = SolarMoment>) -> Self {
        self.moments.extend(moments);
        self.moments.sort_unstable();
        self.moments.dedup();
        self
    }

    pub fn with_offsets(mut self, rise_minutes: i64, set_minutes: i64) -> Self {
        self.rise_offset_minutes = rise_minutes;
        self.set_offset_minutes = set_minutes;
        self
    }

    pub fn with_display(mut self, display: DisplayFormat) -> Self {
        self.display = display;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Nothing at all was asked for.
    pub fn is_empty(&self) -> bool {
        self.selection.is_empty() && self.moments.is_empty()
    }

    fn offsets(&self) -> (Duration, Duration) {
        (
            Duration::minutes(self.rise_offset_minutes),
            Duration::minutes(self.set_offset_minutes),
        )
    }
}

/// One calendar event ready for serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedEvent {
    pub uid: String,
    pub kind: EventKind,
    /// Local day the unshifted start falls in
    pub date: NaiveDate,
    /// Start after offsets
    pub start: DateTime<Utc>,
    /// End after offsets, never before `start`; equal to it for a moment
    pub end: DateTime<Utc>,
    /// Start as reported by the oracle
    pub natural_start: DateTime<Utc>,
    pub summary: String,
    pub description: String,
    /// Unshifted duration
    pub duration_secs: i64,
    pub day_percent: f64,
    pub percentile: Option<f64>,
}

/// Deterministic identifier of the first `kind` event on local `date` at
/// `coordinate`.
///
/// `YYYYMMDD-<kind>-<16 hex chars>@twilight-feed`, where the hex is a prefix
/// of `sha256("<kind>|<YYYY-MM-DD>|<lat>|<lon>")` over the rounded coordinate.
pub fn event_uid(kind: impl Into<EventKind>, date: NaiveDate, coordinate: &Coordinate) -> String {
    nth_event_uid(kind, date, coordinate, 0)
}

/// Identifier of the `occurrence`-th (from zero) `kind` event on `date`.
///
/// Near the poles a local day can hold the same phase twice; later
/// occurrences append `|<occurrence>` to the hashed material.
pub fn nth_event_uid(
    kind: impl Into<EventKind>,
    date: NaiveDate,
    coordinate: &Coordinate,
    occurrence: usize,
) -> String {
    let kind = kind.into();
    let rounded = coordinate.rounded();
    let mut material = format!(
        "{}|{}|{:.4}|{:.4}",
        kind.slug(),
        date.format("%Y-%m-%d"),
        rounded.latitude,
        rounded.longitude
    );
    if occurrence > 0 {
        material.push_str(&format!("|{}", occurrence));
    }
    let hash = calculate_checksum(&material);
    format!(
        "{}-{}-{}@{}",
        date.format("%Y%m%d"),
        kind.slug(),
        &hash[..16],
        UID_DOMAIN
    )
}

/// Walks a date window and turns its phase segments into feed events.
pub struct FeedAssembler<'a> {
    provider: &'a dyn SolarEphemerisProvider,
    year_stats: &'a YearStatsCache,
    window_days: u32,
    deadline: Option<Instant>,
}

impl<'a> FeedAssembler<'a> {
    pub fn new(provider: &'a dyn SolarEphemerisProvider, year_stats: &'a YearStatsCache) -> Self {
        Self {
            provider,
            year_stats,
            window_days: DEFAULT_WINDOW_DAYS,
            deadline: None,
        }
    }

    pub fn with_window_days(mut self, window_days: u32) -> Self {
        self.window_days = window_days.max(1);
        self
    }

    /// Abort with [`FeedError::DeadlineExceeded`] once `deadline` has passed.
    /// Checked between days.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Dates actually covered by `request`: `end` before `start` collapses to
    /// one day and the window is cut at `window_days`.
    pub fn window(&self, request: &FeedRequest) -> (NaiveDate, NaiveDate) {
        let start = request.start;
        let end = request.end.max(start);
        let limit = start
            .checked_add_signed(Duration::days(i64::from(self.window_days) - 1))
            .unwrap_or(NaiveDate::MAX);
        if end > limit {
            debug!(
                "Clamping feed window {}..{} to {} days",
                start, request.end, self.window_days
            );
        }
        (start, end.min(limit))
    }

    /// Events for `request`, ordered by start with unique UIDs.
    pub fn assemble(&self, request: &FeedRequest) -> FeedResult<Vec<FeedEvent>> {
        if request.is_empty() {
            return Err(FeedError::InvalidSelection);
        }

        let (first, last) = self.window(request);
        let tz = request.tz;
        let text = EventText::new(tz, request.display);
        let mut walk = Walk {
            cache: EphemerisCache::new(self.provider, request.coordinate, tz),
            years: HashMap::new(),
            covered_until: None,
            seen: HashSet::new(),
            events: Vec::new(),
        };

        for (processed, date) in date_range(first, last).enumerate() {
            if let Some(deadline) = self.deadline {
                if Instant::now() >= deadline {
                    return Err(FeedError::DeadlineExceeded {
                        days_processed: processed,
                    });
                }
            }

            let today = walk.cache.get(date);
            let timeline = walk.timeline_around(date);
            let mut occurrences: HashMap<EventKind, usize> = HashMap::new();

            for segment in SegmentBuilder::build_on(date, tz, &today, &timeline) {
                // Counted before any skipping so numbering never depends on the window
                let nth = next_occurrence(&mut occurrences, segment.kind.into());
                if segment.carried {
                    let covered = walk.covered_until.is_some_and(|c| c >= segment.end);
                    if processed == 0 || covered {
                        continue;
                    }
                }
                walk.covered_until = Some(
                    walk.covered_until
                        .map_or(segment.end, |c| c.max(segment.end)),
                );

                if request.selection.contains(segment.kind) {
                    self.push_segment(&mut walk, request, &text, date, nth, &segment);
                }
            }

            if !request.moments.is_empty() {
                let (midnight, next_midnight) = day_bounds(date, tz);
                for &(boundary, at) in timeline.between(midnight, next_midnight) {
                    let Some(moment) = SolarMoment::at(boundary) else {
                        continue;
                    };
                    let nth = next_occurrence(&mut occurrences, moment.into());
                    if request.moments.contains(&moment) {
                        self.push_moment(&mut walk, request, &text, date, nth, moment, at);
                    }
                }
            }
        }

        let Walk {
            mut events, cache, ..
        } = walk;
        events.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then_with(|| a.kind.cmp(&b.kind))
                .then_with(|| a.uid.cmp(&b.uid))
        });

        debug!(
            "Assembled {} events for {} ({} oracle calls)",
            events.len(),
            request.coordinate.label(),
            cache.oracle_calls()
        );
        Ok(events)
    }

    fn push_segment(
        &self,
        walk: &mut Walk<'_>,
        request: &FeedRequest,
        text: &EventText,
        date: NaiveDate,
        nth: usize,
        segment: &PhaseSegment,
    ) {
        let kind = EventKind::Phase(segment.kind);
        if !walk.seen.insert((kind, segment.start)) {
            return;
        }

        let duration_secs = segment.duration_secs();
        let percentile = if is_ranked(segment) {
            let index = walk.year_index(self.year_stats, self.provider, date.year());
            index.percentile_for(segment.kind, duration_secs)
        } else {
            None
        };
        let figures = PhaseFigures {
            duration_secs,
            day_percent: day_percent(duration_secs),
            percentile,
            year: date.year(),
        };

        let (rise, set) = request.offsets();
        let start = shifted(segment.start, segment.from, rise, set);
        let end = shifted(segment.end, segment.to, rise, set).max(start);

        walk.events.push(FeedEvent {
            uid: nth_event_uid(kind, date, &request.coordinate, nth),
            kind,
            date,
            start,
            end,
            natural_start: segment.start,
            summary: text.summary(segment.kind, segment.start, segment.end),
            description: text.description(
                segment.kind,
                segment.start,
                segment.end,
                &figures,
                &request.note,
            ),
            duration_secs,
            day_percent: figures.day_percent,
            percentile,
        });
    }

    #[allow(clippy::too_many_arguments)]
    fn push_moment(
        &self,
        walk: &mut Walk<'_>,
        request: &FeedRequest,
        text: &EventText,
        date: NaiveDate,
        nth: usize,
        moment: SolarMoment,
        at: DateTime<Utc>,
    ) {
        let kind = EventKind::Moment(moment);
        if !walk.seen.insert((kind, at)) {
            return;
        }

        let (rise, set) = request.offsets();
        let start = shifted(at, Some(moment.boundary()), rise, set);

        walk.events.push(FeedEvent {
            uid: nth_event_uid(kind, date, &request.coordinate, nth),
            kind,
            date,
            start,
            end: start,
            natural_start: at,
            summary: text.moment_summary(moment, at),
            description: text.moment_description(moment, at, &request.note),
            duration_secs: 0,
            day_percent: 0.0,
            percentile: None,
        });
    }
}

/// Mutable state of one walk over the window.
struct Walk<'a> {
    cache: EphemerisCache<'a>,
    years: HashMap<i32, Arc<YearStatisticsIndex>>,
    covered_until: Option<DateTime<Utc>>,
    seen: HashSet<(EventKind, DateTime<Utc>)>,
    events: Vec<FeedEvent>,
}

impl Walk<'_> {
    /// Crossings of the oracle days around `date`, merged.
    fn timeline_around(&mut self, date: NaiveDate) -> CrossingTimeline {
        let days: Vec<_> = TIMELINE_OFFSETS
            .into_iter()
            .filter_map(|offset| date.checked_add_signed(Duration::days(offset)))
            .map(|day| self.cache.get(day))
            .collect();
        self.cache.forget_before(date.pred_opt().unwrap_or(date));
        CrossingTimeline::merge(&days)
    }

    fn year_index(
        &mut self,
        shared: &YearStatsCache,
        provider: &dyn SolarEphemerisProvider,
        year: i32,
    ) -> Arc<YearStatisticsIndex> {
        let coordinate = *self.cache.coordinate();
        let tz = self.cache.timezone();
        self.years
            .entry(year)
            .or_insert_with(|| shared.get_or_build(provider, &coordinate, tz, year))
            .clone()
    }
}

fn next_occurrence(occurrences: &mut HashMap<EventKind, usize>, kind: EventKind) -> usize {
    let count = occurrences.entry(kind).or_insert(0);
    *count += 1;
    *count - 1
}

/// Only a full sunrise-to-sunset daylight or a full dusk-to-dawn night is
/// comparable with the yearly distributions.
fn is_ranked(segment: &PhaseSegment) -> bool {
    match segment.kind {
        PhaseKind::Daylight => {
            segment.from == Some(Boundary::Sunrise) && segment.to == Some(Boundary::Sunset)
        }
        PhaseKind::Night => {
            segment.from == Some(Boundary::AstroDusk) && segment.to == Some(Boundary::AstroDawn)
        }
        _ => false,
    }
}

fn shifted(
    instant: DateTime<Utc>,
    boundary: Option<Boundary>,
    rise: Duration,
    set: Duration,
) -> DateTime<Utc> {
    match boundary.map(|b| b.side()) {
        Some(Side::Dawn) => instant + rise,
        Some(Side::Dusk) => instant + set,
        None => instant,
    }
}
