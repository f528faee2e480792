//! Yearly daylight and night distributions, and the process-wide cache that
//! shares them between requests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono_tz::Tz;
use log::debug;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::ephemeris::{EphemerisCache, SolarEphemerisProvider};
use crate::models::{year_dates, Coordinate, CoordinateKey, PhaseKind};

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Sorted durations of every daylight period and every night of one year.
///
/// Daylight is `sunset − sunrise` for each day of the year that has both.
/// Night is `astro_dawn(d + 1) − astro_dusk(d)` for each day `d` of the year
/// whose dusk and next-day dawn both exist, so December 31 looks at January 1
/// of the following year. Days without the crossings are left out.
#[derive(Debug, Clone, PartialEq)]
pub struct YearStatisticsIndex {
    year: i32,
    daylight: Vec<i64>,
    night: Vec<i64>,
}

impl YearStatisticsIndex {
    /// Build the index by querying the oracle for every day of `year`.
    ///
    /// Costs one oracle call per day plus one for the following January 1.
    pub fn for_year(
        provider: &dyn SolarEphemerisProvider,
        coordinate: &Coordinate,
        tz: Tz,
        year: i32,
    ) -> Self {
        let mut cache = EphemerisCache::new(provider, *coordinate, tz);
        let mut daylight = Vec::with_capacity(366);
        let mut night = Vec::with_capacity(366);

        for date in year_dates(year) {
            let today = cache.get(date);
            if let Some(secs) = today.daylight_secs() {
                daylight.push(secs);
            }
            if let (Some(dusk), Some(next)) = (today.astro_dusk, date.succ_opt()) {
                if let Some(dawn) = cache.get(next).astro_dawn {
                    let secs = (dawn - dusk).num_seconds();
                    if secs > 0 {
                        night.push(secs);
                    }
                }
            }
            cache.forget_before(date);
        }

        debug!(
            "Built {} statistics for {} in {}: {} daylight, {} night samples ({} oracle calls, {} failures)",
            year,
            coordinate.label(),
            tz.name(),
            daylight.len(),
            night.len(),
            cache.oracle_calls(),
            cache.failures()
        );

        Self::from_durations(year, daylight, night)
    }

    /// Build an index from raw durations in seconds, in any order.
    pub fn from_durations(year: i32, mut daylight: Vec<i64>, mut night: Vec<i64>) -> Self {
        daylight.sort_unstable();
        night.sort_unstable();
        Self {
            year,
            daylight,
            night,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Share of the year's days with strictly shorter daylight, in percent.
    ///
    /// `None` when the year has no day with both a sunrise and a sunset.
    pub fn percentile(&self, secs: i64) -> Option<f64> {
        rank(&self.daylight, secs)
    }

    /// Share of the year's nights that are strictly shorter, in percent.
    pub fn night_percentile(&self, secs: i64) -> Option<f64> {
        rank(&self.night, secs)
    }

    /// Percentile of a segment of `kind`, for the kinds that are ranked.
    pub fn percentile_for(&self, kind: PhaseKind, secs: i64) -> Option<f64> {
        match kind {
            PhaseKind::Daylight => self.percentile(secs),
            PhaseKind::Night => self.night_percentile(secs),
            _ => None,
        }
    }

    pub fn daylight_samples(&self) -> &[i64] {
        &self.daylight
    }

    pub fn night_samples(&self) -> &[i64] {
        &self.night
    }
}

fn rank(sorted: &[i64], secs: i64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let shorter = sorted.partition_point(|d| *d < secs);
    Some(round1(shorter as f64 / sorted.len() as f64 * 100.0))
}

/// Identity of a cached index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct YearKey {
    pub coordinate: CoordinateKey,
    pub timezone: &'static str,
    pub year: i32,
}

impl YearKey {
    pub fn new(coordinate: &Coordinate, tz: Tz, year: i32) -> Self {
        Self {
            coordinate: coordinate.key(),
            timezone: tz.name(),
            year,
        }
    }
}

struct Entry {
    index: Arc<OnceCell<Arc<YearStatisticsIndex>>>,
    inserted: Instant,
}

/// Bounded, expiring cache of [`YearStatisticsIndex`] shared by all requests.
///
/// Concurrent misses on the same key wait for a single build. The map lock is
/// only held to look up or insert the slot, never while the index is built.
pub struct YearStatsCache {
    entries: Mutex<HashMap<YearKey, Entry>>,
    capacity: usize,
    ttl: Duration,
    builds: AtomicUsize,
}

impl YearStatsCache {
    /// A cache holding at most `capacity` years, each for at most `ttl`.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
            ttl,
            builds: AtomicUsize::new(0),
        }
    }

    /// Cached index for `(coordinate, tz, year)`, built on first use.
    ///
    /// The coordinate is rounded before use, so nearby requests share one
    /// index.
    pub fn get_or_build(
        &self,
        provider: &dyn SolarEphemerisProvider,
        coordinate: &Coordinate,
        tz: Tz,
        year: i32,
    ) -> Arc<YearStatisticsIndex> {
        let coordinate = coordinate.rounded();
        let key = YearKey::new(&coordinate, tz, year);
        let slot = self.slot(key);

        slot.get_or_init(|| {
            self.builds.fetch_add(1, Ordering::SeqCst);
            Arc::new(YearStatisticsIndex::for_year(provider, &coordinate, tz, year))
        })
        .clone()
    }

    fn slot(&self, key: YearKey) -> Arc<OnceCell<Arc<YearStatisticsIndex>>> {
        let mut entries = self.entries.lock();
        let now = Instant::now();
        entries.retain(|_, e| now.duration_since(e.inserted) < self.ttl);

        if let Some(entry) = entries.get(&key) {
            return entry.index.clone();
        }

        if entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.inserted)
                .map(|(k, _)| *k);
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }

        let index = Arc::new(OnceCell::new());
        entries.insert(
            key,
            Entry {
                index: index.clone(),
                inserted: now,
            },
        );
        index
    }

    /// Number of indexes built since the cache was created.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl std::fmt::Debug for YearStatsCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YearStatsCache")
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl)
            .field("entries", &self.len())
            .field("builds", &self.builds())
            .finish()
    }
}
