//! Deterministic oracles for testing and local development.
//!
//! None of these model the real sky. They produce plausible, reproducible
//! crossing sets (including polar day and night) so segmentation and
//! statistics can be exercised without an astronomical library.

use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

use super::{EphemerisError, SolarEphemerisProvider};
use crate::models::{local_instant, Boundary, Coordinate, DayEphemeris, PhaseKind};

const HALF_DAY_SECS: f64 = 43_200.0;
/// Day of year the synthetic daylight curve peaks (June 21 in common years).
const PEAK_ORDINAL: f64 = 172.0;

/// Oracle whose daylight length follows a cosine over the year.
///
/// Daylight on day-of-year `n` is
/// `mean + amplitude * cos(2π (n − 172) / 365.25)` hours, centred on a fixed
/// local solar noon. Each twilight band adds a fixed number of minutes on both
/// sides. A half-length at or beyond 12 h means the sun never drops below that
/// horizon; at or below zero it never climbs above it. The coordinate is
/// ignored.
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    pub mean_daylight_hours: f64,
    pub amplitude_hours: f64,
    pub solar_noon: NaiveTime,
    pub civil_minutes: f64,
    pub nautical_minutes: f64,
    pub astro_minutes: f64,
}

impl SyntheticProvider {
    /// Mid-latitude year: 8 h to 16 h of daylight, every horizon crossed daily.
    pub fn temperate() -> Self {
        Self {
            mean_daylight_hours: 12.0,
            amplitude_hours: 4.0,
            solar_noon: NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN),
            civil_minutes: 30.0,
            nautical_minutes: 35.0,
            astro_minutes: 40.0,
        }
    }

    /// High-latitude year with weeks of midnight sun and polar night.
    pub fn arctic() -> Self {
        Self {
            amplitude_hours: 14.0,
            ..Self::temperate()
        }
    }

    pub fn with_solar_noon(mut self, hour: u32, minute: u32) -> Self {
        if let Some(noon) = NaiveTime::from_hms_opt(hour, minute, 0) {
            self.solar_noon = noon;
        }
        self
    }

    pub fn daylight_hours(&self, date: NaiveDate) -> f64 {
        let phase = 2.0 * PI * (date.ordinal() as f64 - PEAK_ORDINAL) / 365.25;
        self.mean_daylight_hours + self.amplitude_hours * phase.cos()
    }

    fn half_lengths(&self, date: NaiveDate) -> [(f64, Boundary, Boundary); 4] {
        let day = self.daylight_hours(date) * 1800.0;
        let civil = day + self.civil_minutes * 60.0;
        let nautical = civil + self.nautical_minutes * 60.0;
        let astro = nautical + self.astro_minutes * 60.0;
        [
            (day, Boundary::Sunrise, Boundary::Sunset),
            (civil, Boundary::CivilDawn, Boundary::CivilDusk),
            (nautical, Boundary::NauticalDawn, Boundary::NauticalDusk),
            (astro, Boundary::AstroDawn, Boundary::AstroDusk),
        ]
    }
}

impl SolarEphemerisProvider for SyntheticProvider {
    fn crossings(
        &self,
        date: NaiveDate,
        tz: Tz,
        _coordinate: &Coordinate,
    ) -> Result<DayEphemeris, EphemerisError> {
        let noon = local_instant(date, self.solar_noon, tz);
        let halves = self.half_lengths(date);

        let mut day = DayEphemeris {
            transit: Some(noon),
            ..DayEphemeris::default()
        };
        let mut crossed = false;
        for (half, dawn, dusk) in halves {
            if half > 0.0 && half < HALF_DAY_SECS {
                let offset = Duration::seconds(half.round() as i64);
                day.set(dawn, Some(noon - offset));
                day.set(dusk, Some(noon + offset));
                crossed = true;
            }
        }

        if !crossed {
            let kinds = [
                PhaseKind::Daylight,
                PhaseKind::CivilDawn,
                PhaseKind::NauticalDawn,
                PhaseKind::AstroDawn,
            ];
            day.polar_phase = Some(
                halves
                    .iter()
                    .zip(kinds)
                    .find(|((half, _, _), _)| *half >= HALF_DAY_SECS)
                    .map(|(_, kind)| kind)
                    .unwrap_or(PhaseKind::Night),
            );
        }

        Ok(day)
    }
}

/// Oracle answering from a fixed table, with a fallback for unlisted dates.
#[derive(Debug, Clone, Default)]
pub struct TableProvider {
    days: HashMap<NaiveDate, DayEphemeris>,
    fallback: DayEphemeris,
    failing: HashSet<NaiveDate>,
}

impl TableProvider {
    pub fn new(fallback: DayEphemeris) -> Self {
        Self {
            fallback,
            ..Self::default()
        }
    }

    pub fn with_day(mut self, date: NaiveDate, day: DayEphemeris) -> Self {
        self.days.insert(date, day);
        self
    }

    /// Make the oracle fail for `date`.
    pub fn failing_on(mut self, date: NaiveDate) -> Self {
        self.failing.insert(date);
        self
    }
}

impl SolarEphemerisProvider for TableProvider {
    fn crossings(
        &self,
        date: NaiveDate,
        _tz: Tz,
        _coordinate: &Coordinate,
    ) -> Result<DayEphemeris, EphemerisError> {
        if self.failing.contains(&date) {
            return Err(EphemerisError::unavailable(date, "no convergence"));
        }
        Ok(self.days.get(&date).copied().unwrap_or(self.fallback))
    }
}

/// Wraps another oracle and counts how often it is consulted.
#[derive(Debug, Default)]
pub struct CountingProvider<P> {
    inner: P,
    calls: AtomicUsize,
}

impl<P> CountingProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }
}

impl<P: SolarEphemerisProvider> SolarEphemerisProvider for CountingProvider<P> {
    fn crossings(
        &self,
        date: NaiveDate,
        tz: Tz,
        coordinate: &Coordinate,
    ) -> Result<DayEphemeris, EphemerisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.crossings(date, tz, coordinate)
    }
}

/// Build a [`DayEphemeris`] from `(boundary, instant)` pairs.
pub fn day_from(pairs: &[(Boundary, DateTime<Utc>)]) -> DayEphemeris {
    let mut day = DayEphemeris::default();
    for (boundary, instant) in pairs {
        day.set(*boundary, Some(*instant));
    }
    day
}
