//! Local-day arithmetic in the feed's timezone.
//!
//! Days are local calendar days: midnight to midnight on the wall clock of the
//! requested timezone, which is 23 or 25 hours long across DST changes.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Nominal length of a day, used for "percent of day" figures.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// The UTC instant at which the wall clock in `tz` shows `time` on `date`.
///
/// Ambiguous wall times (DST fall-back) resolve to the earlier instant.
/// Wall times that do not exist (DST spring-forward gap) resolve to the first
/// representable quarter hour after the gap.
pub fn local_instant(date: NaiveDate, time: NaiveTime, tz: Tz) -> DateTime<Utc> {
    let naive = date.and_time(time);
    if let Some(t) = tz.from_local_datetime(&naive).earliest() {
        return t.with_timezone(&Utc);
    }
    (1..=12)
        .find_map(|quarter| {
            tz.from_local_datetime(&(naive + Duration::minutes(15 * quarter)))
                .earliest()
        })
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

/// Start of `date` in `tz`.
pub fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    local_instant(date, NaiveTime::MIN, tz)
}

/// Local noon of `date`, the anchor passed to the ephemeris oracle.
pub fn local_noon(date: NaiveDate, tz: Tz) -> DateTime<Tz> {
    let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN);
    local_instant(date, noon, tz).with_timezone(&tz)
}

/// `[midnight, next midnight)` of `date` in `tz`.
pub fn day_bounds(date: NaiveDate, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = local_midnight(date, tz);
    let end = match date.succ_opt() {
        Some(next) => local_midnight(next, tz),
        None => start + Duration::days(1),
    };
    (start, end)
}

/// Calendar date of `instant` on the wall clock of `tz`.
pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Every date in `[start, end]`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

/// Every date of the calendar year `year`.
pub fn year_dates(year: i32) -> impl Iterator<Item = NaiveDate> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .into_iter()
        .flat_map(|first| first.iter_days())
        .take_while(move |d| d.year() == year)
}

pub fn days_in_year(year: i32) -> u32 {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366
    } else {
        365
    }
}

#[cfg(test)]
#[path = "time_tests.rs"]
mod time_tests;
