use std::collections::HashSet;

use chrono::{NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use twilight_feed::calendar::{self, CalendarMeta};
use twilight_feed::ephemeris::fixture::{
    day_from, CountingProvider, SyntheticProvider, TableProvider,
};
use twilight_feed::ephemeris::{EphemerisError, SolarEphemerisProvider, SpaEphemerisProvider};
use twilight_feed::error::FeedError;
use twilight_feed::models::{
    Boundary, Coordinate, DayEphemeris, EventKind, PhaseKind, PhaseSelection,
};
use twilight_feed::services::{DisplayFormat, FeedAssembler, FeedRequest};

mod support;
use support::{date, portland, portland_provider, stats_cache, svalbard, LOS_ANGELES};

fn daylight_only() -> PhaseSelection {
    PhaseSelection::none().with(PhaseKind::Daylight)
}

#[test]
fn test_portland_summer_day() {
    let provider = portland_provider();
    let stats = stats_cache();
    let request = FeedRequest::new(
        portland(),
        LOS_ANGELES,
        date(2025, 6, 21),
        date(2025, 6, 21),
        daylight_only(),
    )
    .with_display(DisplayFormat::TwelveHour);

    let events = FeedAssembler::new(&provider, &stats).assemble(&request).unwrap();
    assert_eq!(events.len(), 1);

    let event = &events[0];
    assert_eq!(event.kind, EventKind::Phase(PhaseKind::Daylight));
    assert_eq!(event.duration_secs, 57_600);
    assert_eq!(event.day_percent, 66.7);
    let percentile = event.percentile.unwrap();
    assert!(percentile > 99.0, "solstice percentile {}", percentile);
    assert_eq!(event.summary, "Daylight: 5:30 AM - 9:30 PM");
    assert!(event.description.contains("of days in 2025 at this location"));
    assert!(event.uid.starts_with("20250621-daylight-"));
}

#[test]
fn test_arctic_polar_day_feed() {
    let provider = SyntheticProvider::arctic();
    let stats = stats_cache();
    let request = FeedRequest::new(
        svalbard(),
        chrono_tz::Europe::Oslo,
        date(2025, 6, 21),
        date(2025, 6, 21),
        PhaseSelection::none()
            .with(PhaseKind::Daylight)
            .with(PhaseKind::Night),
    );

    let events = FeedAssembler::new(&provider, &stats).assemble(&request).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EventKind::Phase(PhaseKind::Daylight));
    assert_eq!(events[0].duration_secs, 86_400);
    // A whole-day segment has no sunrise or sunset to rank
    assert_eq!(events[0].percentile, None);
}

#[test]
fn test_empty_selection_is_rejected_before_any_oracle_call() {
    let provider = CountingProvider::new(portland_provider());
    let stats = stats_cache();
    let request = FeedRequest::new(
        portland(),
        LOS_ANGELES,
        date(2025, 1, 1),
        date(2025, 12, 31),
        PhaseSelection::none(),
    );

    let result = FeedAssembler::new(&provider, &stats).assemble(&request);
    assert!(matches!(result, Err(FeedError::InvalidSelection)));
    assert_eq!(provider.calls(), 0);
    assert_eq!(stats.builds(), 0);
}

#[test]
fn test_identical_requests_render_identical_calendars() {
    let provider = portland_provider();
    let request = FeedRequest::new(
        portland(),
        LOS_ANGELES,
        date(2025, 3, 1),
        date(2025, 4, 30),
        PhaseSelection::all(),
    )
    .with_offsets(-10, 10)
    .with_note("Walk the dog");
    let meta = CalendarMeta::new("Twilight", "America/Los_Angeles", 86_400);

    let first = FeedAssembler::new(&provider, &stats_cache())
        .assemble(&request)
        .unwrap();
    let second = FeedAssembler::new(&provider, &stats_cache())
        .assemble(&request)
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(
        calendar::render(&first, &meta),
        calendar::render(&second, &meta)
    );
}

#[test]
fn test_uids_unique_and_events_ordered() {
    let provider = portland_provider();
    let stats = stats_cache();
    let request = FeedRequest::new(
        portland(),
        LOS_ANGELES,
        date(2025, 1, 1),
        date(2025, 12, 31),
        PhaseSelection::all(),
    );
    let events = FeedAssembler::new(&provider, &stats).assemble(&request).unwrap();

    let uids: HashSet<&str> = events.iter().map(|e| e.uid.as_str()).collect();
    assert_eq!(uids.len(), events.len());
    for pair in events.windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
    }
    // Eight phases per day, the first day's leading night fragment excluded
    assert_eq!(events.len(), 365 * 8);
}

#[test]
fn test_year_statistics_are_shared_across_the_window() {
    let provider = CountingProvider::new(portland_provider());
    let stats = stats_cache();
    let request = FeedRequest::new(
        portland(),
        LOS_ANGELES,
        date(2025, 1, 1),
        date(2025, 12, 31),
        daylight_only(),
    );
    FeedAssembler::new(&provider, &stats).assemble(&request).unwrap();

    // 368 days for the walk (one day of context before, two after) plus 366
    // for the yearly index, never 365²
    assert_eq!(stats.builds(), 1);
    assert!(provider.calls() <= 368 + 366, "{} oracle calls", provider.calls());

    let before = provider.calls();
    FeedAssembler::new(&provider, &stats).assemble(&request).unwrap();
    assert_eq!(stats.builds(), 1);
    assert_eq!(provider.calls() - before, 368);
}

#[test]
fn test_window_is_clamped() {
    let provider = portland_provider();
    let stats = stats_cache();
    let request = FeedRequest::new(
        portland(),
        LOS_ANGELES,
        date(2025, 1, 1),
        date(2027, 1, 1),
        daylight_only(),
    );
    let events = FeedAssembler::new(&provider, &stats)
        .with_window_days(10)
        .assemble(&request)
        .unwrap();
    assert_eq!(events.len(), 10);
    assert_eq!(events.last().unwrap().date, date(2025, 1, 10));
}

/// Delegates to the synthetic year but cannot resolve one date.
struct FailsOn {
    inner: SyntheticProvider,
    date: NaiveDate,
}

impl SolarEphemerisProvider for FailsOn {
    fn crossings(
        &self,
        date: NaiveDate,
        tz: Tz,
        coordinate: &Coordinate,
    ) -> Result<DayEphemeris, EphemerisError> {
        if date == self.date {
            return Err(EphemerisError::unavailable(date, "no convergence"));
        }
        self.inner.crossings(date, tz, coordinate)
    }
}

#[test]
fn test_failed_oracle_day_is_skipped_not_fatal() {
    let provider = FailsOn {
        inner: SyntheticProvider::temperate(),
        date: date(2025, 5, 2),
    };
    let stats = stats_cache();
    let request = FeedRequest::new(
        Coordinate::new(10.0, 10.0),
        chrono_tz::UTC,
        date(2025, 5, 1),
        date(2025, 5, 3),
        daylight_only(),
    );

    let events = FeedAssembler::new(&provider, &stats).assemble(&request).unwrap();
    let dates: Vec<_> = events.iter().map(|e| e.date).collect();
    assert_eq!(dates, vec![date(2025, 5, 1), date(2025, 5, 3)]);
    assert!(events.iter().all(|e| e.percentile.is_some()));
}

fn utc(y: i32, m: u32, d: u32, h: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

#[test]
fn test_two_nights_on_one_date_keep_distinct_uids() {
    let dark = DayEphemeris {
        polar_phase: Some(PhaseKind::Night),
        ..DayEphemeris::default()
    };
    let provider = TableProvider::new(dark)
        .with_day(
            date(2025, 1, 2),
            day_from(&[
                (Boundary::AstroDawn, utc(2025, 1, 2, 10)),
                (Boundary::AstroDusk, utc(2025, 1, 2, 14)),
            ]),
        )
        .with_day(
            date(2025, 1, 3),
            day_from(&[
                (Boundary::AstroDawn, utc(2025, 1, 3, 10)),
                (Boundary::AstroDusk, utc(2025, 1, 3, 14)),
            ]),
        );
    let stats = stats_cache();
    let request = FeedRequest::new(
        Coordinate::new(80.0, 0.0),
        chrono_tz::UTC,
        date(2025, 1, 1),
        date(2025, 1, 3),
        PhaseSelection::none().with(PhaseKind::Night),
    );

    let events = FeedAssembler::new(&provider, &stats).assemble(&request).unwrap();
    let spans: Vec<_> = events.iter().map(|e| (e.start, e.end)).collect();
    assert_eq!(
        spans,
        vec![
            (utc(2025, 1, 1, 0), utc(2025, 1, 2, 0)),
            (utc(2025, 1, 2, 0), utc(2025, 1, 2, 10)),
            (utc(2025, 1, 2, 14), utc(2025, 1, 3, 10)),
            (utc(2025, 1, 3, 14), utc(2025, 1, 4, 0)),
        ]
    );

    let uids: HashSet<&str> = events.iter().map(|e| e.uid.as_str()).collect();
    assert_eq!(uids.len(), 4);
}

fn assert_contiguous(coordinate: Coordinate, tz: Tz, start: NaiveDate, end: NaiveDate) {
    let provider = SpaEphemerisProvider::new();
    let stats = stats_cache();
    let request = FeedRequest::new(coordinate, tz, start, end, PhaseSelection::all());
    let events = FeedAssembler::new(&provider, &stats).assemble(&request).unwrap();
    assert!(!events.is_empty());

    for event in &events {
        assert!(event.end > event.start, "{} is empty", event.uid);
    }
    for pair in events.windows(2) {
        assert_eq!(
            pair[0].end, pair[1].start,
            "{} and {} do not meet",
            pair[0].uid, pair[1].uid
        );
    }
    let uids: HashSet<&str> = events.iter().map(|e| e.uid.as_str()).collect();
    assert_eq!(uids.len(), events.len());
}

#[test]
fn test_fairbanks_late_summer_tiles_without_gaps() {
    // Nautical and astronomical dusk drift past local midnight here
    assert_contiguous(
        Coordinate::new(64.8378, -147.7164),
        chrono_tz::America::Anchorage,
        date(2025, 8, 1),
        date(2025, 8, 21),
    );
}

#[test]
fn test_tromso_spring_into_midnight_sun_tiles_without_gaps() {
    assert_contiguous(
        Coordinate::new(69.6492, 18.9553),
        chrono_tz::Europe::Oslo,
        date(2025, 5, 5),
        date(2025, 6, 1),
    );
}
