//! Request-scoped memo of oracle answers.

use std::collections::HashMap;

use chrono::NaiveDate;
use chrono_tz::Tz;
use log::warn;

use super::SolarEphemerisProvider;
use crate::models::{Coordinate, DayEphemeris};

/// Memoizes [`SolarEphemerisProvider`] results for one coordinate and timezone.
///
/// Each date reaches the oracle at most once for the lifetime of the cache.
/// Oracle failures are stored as [`DayEphemeris::unavailable`] so a failing
/// day is not retried and never aborts the caller.
pub struct EphemerisCache<'a> {
    provider: &'a dyn SolarEphemerisProvider,
    coordinate: Coordinate,
    tz: Tz,
    days: HashMap<NaiveDate, DayEphemeris>,
    oracle_calls: usize,
    failures: usize,
}

impl<'a> EphemerisCache<'a> {
    pub fn new(provider: &'a dyn SolarEphemerisProvider, coordinate: Coordinate, tz: Tz) -> Self {
        Self {
            provider,
            coordinate,
            tz,
            days: HashMap::new(),
            oracle_calls: 0,
            failures: 0,
        }
    }

    pub fn get(&mut self, date: NaiveDate) -> DayEphemeris {
        if let Some(day) = self.days.get(&date) {
            return *day;
        }

        self.oracle_calls += 1;
        let day = match self.provider.crossings(date, self.tz, &self.coordinate) {
            Ok(day) => day,
            Err(e) => {
                self.failures += 1;
                warn!("{}; treating the day as having no crossings", e);
                DayEphemeris::unavailable()
            }
        };
        self.days.insert(date, day);
        day
    }

    /// Drop every memoized day before `date`.
    ///
    /// The feed walk only looks one day back and two days ahead, so this
    /// keeps the cache at a handful of entries regardless of window length.
    pub fn forget_before(&mut self, date: NaiveDate) {
        self.days.retain(|d, _| *d >= date);
    }

    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Number of times the oracle was consulted.
    pub fn oracle_calls(&self) -> usize {
        self.oracle_calls
    }

    /// Number of days the oracle could not resolve.
    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::fixture::{CountingProvider, TableProvider};
    use crate::models::PhaseKind;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_same_date_hits_oracle_once() {
        let polar = DayEphemeris {
            polar_phase: Some(PhaseKind::Night),
            ..DayEphemeris::default()
        };
        let provider = CountingProvider::new(TableProvider::new(polar));
        let mut cache = EphemerisCache::new(&provider, Coordinate::new(80.0, 0.0), Tz::UTC);

        let first = cache.get(date(2025, 1, 1));
        let second = cache.get(date(2025, 1, 1));
        assert_eq!(first, second);
        assert_eq!(provider.calls(), 1);
        assert_eq!(cache.oracle_calls(), 1);

        cache.get(date(2025, 1, 2));
        assert_eq!(provider.calls(), 2);
    }

    #[test]
    fn test_failure_becomes_unavailable_day() {
        let provider = TableProvider::new(DayEphemeris::default()).failing_on(date(2025, 2, 1));
        let mut cache = EphemerisCache::new(&provider, Coordinate::new(10.0, 10.0), Tz::UTC);

        let day = cache.get(date(2025, 2, 1));
        assert!(day.is_unresolved());
        assert_eq!(cache.failures(), 1);

        // Stored, not retried
        cache.get(date(2025, 2, 1));
        assert_eq!(cache.oracle_calls(), 1);
    }

    #[test]
    fn test_forget_before() {
        let provider = TableProvider::new(DayEphemeris::default());
        let mut cache = EphemerisCache::new(&provider, Coordinate::new(0.0, 0.0), Tz::UTC);
        for d in 1..=5 {
            cache.get(date(2025, 3, d));
        }
        cache.forget_before(date(2025, 3, 4));
        assert_eq!(cache.len(), 2);
    }
}
