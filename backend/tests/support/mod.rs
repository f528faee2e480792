#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use chrono::NaiveDate;
use chrono_tz::Tz;

use twilight_feed::ephemeris::fixture::SyntheticProvider;
use twilight_feed::models::Coordinate;
use twilight_feed::services::YearStatsCache;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the variables on unwind and serializes access to the process
/// environment, since tests run in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// Every `FEED_*` variable the configuration reads, cleared.
pub const CLEAN_FEED_ENV: [(&str, Option<&str>); 7] = [
    ("FEED_CONFIG", None),
    ("FEED_AUTH_TOKEN", None),
    ("FEED_WINDOW_DAYS", None),
    ("FEED_UPDATE_INTERVAL", None),
    ("FEED_DEFAULT_TIMEZONE", None),
    ("FEED_YEAR_CACHE_CAPACITY", None),
    ("FEED_REQUEST_TIMEOUT", None),
];

pub const LOS_ANGELES: Tz = chrono_tz::America::Los_Angeles;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// The default feed location.
pub fn portland() -> Coordinate {
    Coordinate::new(45.5875, -122.5889)
}

pub fn svalbard() -> Coordinate {
    Coordinate::new(78.2232, 15.6267)
}

/// Synthetic Portland-like year: 16 h of daylight at the June solstice,
/// centred on 13:30 local daylight time (sunrise 05:30, sunset 21:30).
pub fn portland_provider() -> SyntheticProvider {
    SyntheticProvider::temperate().with_solar_noon(13, 30)
}

pub fn stats_cache() -> YearStatsCache {
    YearStatsCache::new(16, Duration::from_secs(86_400))
}
