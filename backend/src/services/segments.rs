//! Segmentation of one local day into contiguous illumination phases.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::models::{day_bounds, Boundary, DayEphemeris, PhaseKind};

/// The sun cannot cross the same horizon in the same direction twice within
/// this span, so closer reports are one crossing seen from two oracle days.
const REPEAT_WINDOW_MINUTES: i64 = 60;

/// One contiguous span of a single phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseSegment {
    pub kind: PhaseKind,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Crossing that opened the segment; `None` for a local-midnight edge
    pub from: Option<Boundary>,
    /// Crossing that closed the segment; `None` for a local-midnight edge
    pub to: Option<Boundary>,
    /// The phase was already in effect at the start of the day
    pub carried: bool,
}

impl PhaseSegment {
    pub fn duration_secs(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }

    /// Seconds of this segment inside `[from, to)`.
    pub fn clipped_secs(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
        let start = self.start.max(from);
        let end = self.end.min(to);
        (end - start).num_seconds().max(0)
    }
}

/// Crossings of consecutive oracle days merged into one chronological line.
///
/// The oracle groups crossings by solar day, so a dusk can be reported by one
/// date and fall after the next local midnight. Segmenting against the merged
/// line assigns every crossing to the local day it actually falls in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrossingTimeline {
    crossings: Vec<(Boundary, DateTime<Utc>)>,
}

impl CrossingTimeline {
    pub fn merge<'d>(days: impl IntoIterator<Item = &'d DayEphemeris>) -> Self {
        let mut all: Vec<(Boundary, DateTime<Utc>)> =
            days.into_iter().flat_map(|day| day.boundaries()).collect();
        all.sort_by_key(|(b, t)| (*t, *b));

        let window = Duration::minutes(REPEAT_WINDOW_MINUTES);
        let mut crossings: Vec<(Boundary, DateTime<Utc>)> = Vec::with_capacity(all.len());
        for (boundary, at) in all {
            let repeat = crossings
                .iter()
                .rev()
                .take_while(|(_, t)| at - *t < window)
                .any(|(b, _)| *b == boundary);
            if !repeat {
                crossings.push((boundary, at));
            }
        }
        Self { crossings }
    }

    pub fn crossings(&self) -> &[(Boundary, DateTime<Utc>)] {
        &self.crossings
    }

    /// Crossings in `[from, to)`.
    pub fn between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> &[(Boundary, DateTime<Utc>)] {
        let lo = self.crossings.partition_point(|(_, t)| *t < from);
        let hi = self.crossings.partition_point(|(_, t)| *t < to).max(lo);
        &self.crossings[lo..hi]
    }

    /// Latest crossing strictly before `at`.
    pub fn last_before(&self, at: DateTime<Utc>) -> Option<(Boundary, DateTime<Utc>)> {
        let idx = self.crossings.partition_point(|(_, t)| *t < at);
        idx.checked_sub(1).map(|i| self.crossings[i])
    }

    /// Earliest crossing strictly after `at`.
    pub fn first_after(&self, at: DateTime<Utc>) -> Option<(Boundary, DateTime<Utc>)> {
        let idx = self.crossings.partition_point(|(_, t)| *t <= at);
        self.crossings.get(idx).copied()
    }
}

/// Turns crossings into the ordered phase segments of a local day.
pub struct SegmentBuilder;

impl SegmentBuilder {
    /// Segments of the local day `date` in `tz` from the oracle answers for
    /// `date` and the day after.
    ///
    /// Shorthand for [`SegmentBuilder::build_on`] over a timeline of just
    /// those two days; a crossing `today` reports past the next midnight
    /// belongs to tomorrow and only closes today's last segment.
    pub fn build(
        date: NaiveDate,
        tz: Tz,
        today: &DayEphemeris,
        tomorrow: &DayEphemeris,
    ) -> Vec<PhaseSegment> {
        Self::build_on(date, tz, today, &CrossingTimeline::merge([today, tomorrow]))
    }

    /// Segments of the local day `date` cut from `timeline`.
    ///
    /// `today` is the oracle answer for `date`; it decides whether the day is
    /// resolved and which phase a day without crossings holds.
    ///
    /// - Only crossings inside `[midnight, next midnight)` open segments.
    /// - The first segment starts at local midnight, is marked `carried`, and
    ///   takes the phase that precedes the day's first crossing.
    /// - Each following segment is labeled by the phase after its opening
    ///   crossing.
    /// - The last segment runs to the first crossing of the next local day, so
    ///   a night spanning midnight is one segment. When the next day has no
    ///   crossing it stops at the next local midnight.
    /// - A day without crossings yields one segment `[midnight, next midnight)`
    ///   of its polar phase, or nothing when the day is unresolved.
    ///
    /// Zero-length spans are never produced, and segments of consecutive days
    /// never overlap.
    pub fn build_on(
        date: NaiveDate,
        tz: Tz,
        today: &DayEphemeris,
        timeline: &CrossingTimeline,
    ) -> Vec<PhaseSegment> {
        if today.is_unresolved() {
            return Vec::new();
        }

        let (midnight, next_midnight) = day_bounds(date, tz);
        let horizon = date
            .succ_opt()
            .map(|next| day_bounds(next, tz).1)
            .unwrap_or(next_midnight);
        let inside = timeline.between(midnight, next_midnight);

        let (first, last) = match (inside.first(), inside.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => {
                let kind = today
                    .polar_phase
                    .or_else(|| timeline.last_before(midnight).map(|(b, _)| b.phase_after()))
                    .or_else(|| timeline.first_after(midnight).map(|(b, _)| b.phase_before()));
                return kind
                    .map(|kind| PhaseSegment {
                        kind,
                        start: midnight,
                        end: next_midnight,
                        from: None,
                        to: None,
                        carried: false,
                    })
                    .into_iter()
                    .collect();
            }
        };

        let mut segments = Vec::with_capacity(inside.len() + 1);

        if first.1 > midnight {
            segments.push(PhaseSegment {
                kind: first.0.phase_before(),
                start: midnight,
                end: first.1,
                from: None,
                to: Some(first.0),
                carried: true,
            });
        }

        for pair in inside.windows(2) {
            let (open, start) = pair[0];
            let (close, end) = pair[1];
            if end > start {
                segments.push(PhaseSegment {
                    kind: open.phase_after(),
                    start,
                    end,
                    from: Some(open),
                    to: Some(close),
                    carried: false,
                });
            }
        }

        let (closing, end) = match timeline.first_after(last.1) {
            Some((boundary, at)) if at < horizon => (Some(boundary), at),
            _ => (None, next_midnight),
        };
        if end > last.1 {
            segments.push(PhaseSegment {
                kind: last.0.phase_after(),
                start: last.1,
                end,
                from: Some(last.0),
                to: closing,
                carried: false,
            });
        }

        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::fixture::day_from;
    use crate::models::SECONDS_PER_DAY;
    use chrono::{Duration, TimeZone};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, d, h, m, 0).unwrap()
    }

    fn equinox(d: u32) -> DayEphemeris {
        day_from(&[
            (Boundary::AstroDawn, at(d, 4, 30)),
            (Boundary::NauticalDawn, at(d, 5, 5)),
            (Boundary::CivilDawn, at(d, 5, 35)),
            (Boundary::Sunrise, at(d, 6, 0)),
            (Boundary::Sunset, at(d, 18, 0)),
            (Boundary::CivilDusk, at(d, 18, 25)),
            (Boundary::NauticalDusk, at(d, 18, 55)),
            (Boundary::AstroDusk, at(d, 19, 30)),
        ])
    }

    #[test]
    fn test_full_day_sequence() {
        let segments = SegmentBuilder::build(date(2025, 3, 20), Tz::UTC, &equinox(20), &equinox(21));
        let kinds: Vec<PhaseKind> = segments.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                PhaseKind::Night,
                PhaseKind::AstroDawn,
                PhaseKind::NauticalDawn,
                PhaseKind::CivilDawn,
                PhaseKind::Daylight,
                PhaseKind::CivilDusk,
                PhaseKind::NauticalDusk,
                PhaseKind::AstroDusk,
                PhaseKind::Night,
            ]
        );
        assert!(segments[0].carried);
        assert!(segments[1..].iter().all(|s| !s.carried));

        // Night runs to tomorrow's astronomical dawn
        let night = segments.last().unwrap();
        assert_eq!(night.end, at(21, 4, 30));
        assert_eq!(night.to, Some(Boundary::AstroDawn));
    }

    #[test]
    fn test_contiguous_and_covers_day() {
        let (midnight, next) = day_bounds(date(2025, 3, 20), Tz::UTC);
        let segments = SegmentBuilder::build(date(2025, 3, 20), Tz::UTC, &equinox(20), &equinox(21));
        for pair in segments.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        let covered: i64 = segments.iter().map(|s| s.clipped_secs(midnight, next)).sum();
        assert_eq!(covered, SECONDS_PER_DAY);
    }

    #[test]
    fn test_polar_day_single_segment() {
        let polar = DayEphemeris {
            polar_phase: Some(PhaseKind::Daylight),
            ..DayEphemeris::default()
        };
        let segments = SegmentBuilder::build(date(2025, 6, 21), Tz::UTC, &polar, &polar);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].kind, PhaseKind::Daylight);
        assert_eq!(segments[0].duration_secs(), SECONDS_PER_DAY);
    }

    #[test]
    fn test_unresolved_day_has_no_segments() {
        let segments = SegmentBuilder::build(
            date(2025, 3, 20),
            Tz::UTC,
            &DayEphemeris::unavailable(),
            &equinox(21),
        );
        assert!(segments.is_empty());
    }

    #[test]
    fn test_missing_tomorrow_stops_at_midnight() {
        let segments = SegmentBuilder::build(
            date(2025, 3, 20),
            Tz::UTC,
            &equinox(20),
            &DayEphemeris::unavailable(),
        );
        let last = segments.last().unwrap();
        assert_eq!(last.end, at(21, 0, 0));
        assert_eq!(last.to, None);
    }

    #[test]
    fn test_missing_twilight_boundaries_are_skipped() {
        // Sun never drops below -12°: no nautical or astronomical crossings
        let today = day_from(&[
            (Boundary::CivilDawn, at(20, 1, 40)),
            (Boundary::Sunrise, at(20, 2, 50)),
            (Boundary::Sunset, at(20, 21, 10)),
            (Boundary::CivilDusk, at(20, 22, 20)),
        ]);
        let tomorrow = day_from(&[(Boundary::CivilDawn, at(21, 1, 38))]);
        let segments = SegmentBuilder::build(date(2025, 3, 20), Tz::UTC, &today, &tomorrow);

        let kinds: Vec<PhaseKind> = segments.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                PhaseKind::NauticalDawn,
                PhaseKind::CivilDawn,
                PhaseKind::Daylight,
                PhaseKind::CivilDusk,
                PhaseKind::NauticalDusk,
            ]
        );
        assert!(segments.iter().all(|s| s.duration_secs() > 0));
        assert_eq!(segments.last().unwrap().end - at(20, 22, 20), Duration::minutes(198));
    }

    #[test]
    fn test_coincident_crossings_do_not_make_empty_segments() {
        let today = day_from(&[
            (Boundary::Sunrise, at(20, 6, 0)),
            (Boundary::CivilDawn, at(20, 6, 0)),
            (Boundary::Sunset, at(20, 18, 0)),
        ]);
        let segments = SegmentBuilder::build(date(2025, 3, 20), Tz::UTC, &today, &today);
        assert!(segments.iter().all(|s| s.duration_secs() > 0));
    }
    #[test]
    fn test_crossing_after_midnight_belongs_to_next_day() {
        // Civil dusk reported for the 20th lands at 00:02 on the 21st
        let today = day_from(&[
            (Boundary::Sunrise, at(20, 3, 0)),
            (Boundary::Sunset, at(20, 23, 10)),
            (Boundary::CivilDusk, at(21, 0, 2)),
        ]);
        let tomorrow = day_from(&[
            (Boundary::Sunrise, at(21, 3, 2)),
            (Boundary::Sunset, at(21, 23, 8)),
        ]);
        let timeline = CrossingTimeline::merge([&today, &tomorrow]);

        let first = SegmentBuilder::build_on(date(2025, 3, 20), Tz::UTC, &today, &timeline);
        let last = first.last().unwrap();
        assert_eq!(last.kind, PhaseKind::CivilDusk);
        assert_eq!((last.start, last.end), (at(20, 23, 10), at(21, 0, 2)));

        let second = SegmentBuilder::build_on(date(2025, 3, 21), Tz::UTC, &tomorrow, &timeline);
        assert!(second[0].carried);
        assert_eq!(second[0].end, at(21, 0, 2));
        assert_eq!(second[1].kind, PhaseKind::NauticalDusk);
        assert_eq!(second[1].start, at(21, 0, 2));
        assert!(second.iter().all(|s| s.start >= at(21, 0, 0)));
    }

    #[test]
    fn test_trailing_segment_stops_before_a_day_without_crossings() {
        let today = day_from(&[
            (Boundary::Sunrise, at(20, 1, 0)),
            (Boundary::Sunset, at(20, 23, 0)),
        ]);
        let polar = DayEphemeris {
            polar_phase: Some(PhaseKind::Daylight),
            ..DayEphemeris::default()
        };
        let later = day_from(&[(Boundary::Sunset, at(22, 23, 30))]);
        let timeline = CrossingTimeline::merge([&today, &polar, &later]);

        let segments = SegmentBuilder::build_on(date(2025, 3, 20), Tz::UTC, &today, &timeline);
        let last = segments.last().unwrap();
        assert_eq!(last.end, at(21, 0, 0));
        assert_eq!(last.to, None);

        let next = SegmentBuilder::build_on(date(2025, 3, 21), Tz::UTC, &polar, &timeline);
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].start, last.end);
        assert_eq!(next[0].kind, PhaseKind::Daylight);
    }

    #[test]
    fn test_timeline_merges_repeated_reports() {
        let a = day_from(&[(Boundary::Sunset, at(20, 23, 50))]);
        let b = day_from(&[
            (Boundary::Sunset, at(20, 23, 52)),
            (Boundary::Sunrise, at(21, 0, 20)),
            (Boundary::Sunset, at(21, 23, 40)),
        ]);
        let timeline = CrossingTimeline::merge([&a, &b]);
        assert_eq!(
            timeline.crossings(),
            &[
                (Boundary::Sunset, at(20, 23, 50)),
                (Boundary::Sunrise, at(21, 0, 20)),
                (Boundary::Sunset, at(21, 23, 40)),
            ]
        );
        assert_eq!(timeline.between(at(21, 0, 0), at(22, 0, 0)).len(), 2);
        assert_eq!(timeline.last_before(at(21, 0, 0)).map(|c| c.0), Some(Boundary::Sunset));
        assert_eq!(timeline.first_after(at(21, 0, 20)).map(|c| c.1), Some(at(21, 23, 40)));
    }
}
