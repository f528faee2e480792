use super::*;
use chrono::Timelike;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_utc_day_is_86400_seconds() {
    let (start, end) = day_bounds(date(2025, 6, 21), Tz::UTC);
    assert_eq!((end - start).num_seconds(), SECONDS_PER_DAY);
    assert_eq!(start.hour(), 0);
}

#[test]
fn test_local_midnight_los_angeles_summer() {
    // PDT is UTC-7
    let midnight = local_midnight(date(2025, 6, 21), chrono_tz::America::Los_Angeles);
    assert_eq!(midnight, Utc.with_ymd_and_hms(2025, 6, 21, 7, 0, 0).unwrap());
}

#[test]
fn test_dst_days_are_not_86400() {
    let tz = chrono_tz::America::Los_Angeles;
    let (start, end) = day_bounds(date(2025, 3, 9), tz);
    assert_eq!((end - start).num_seconds(), 23 * 3600);
    let (start, end) = day_bounds(date(2025, 11, 2), tz);
    assert_eq!((end - start).num_seconds(), 25 * 3600);
}

#[test]
fn test_local_instant_in_gap_moves_forward() {
    // 02:30 does not exist in Los Angeles on 2025-03-09
    let tz = chrono_tz::America::Los_Angeles;
    let t = local_instant(date(2025, 3, 9), NaiveTime::from_hms_opt(2, 30, 0).unwrap(), tz);
    let local = t.with_timezone(&tz);
    assert_eq!(local.hour(), 3);
}

#[test]
fn test_local_noon_keeps_timezone() {
    let tz = chrono_tz::Europe::Oslo;
    let noon = local_noon(date(2025, 1, 15), tz);
    assert_eq!(noon.hour(), 12);
    assert_eq!(noon.date_naive(), date(2025, 1, 15));
}

#[test]
fn test_local_date_crosses_utc_midnight() {
    let instant = Utc.with_ymd_and_hms(2025, 6, 22, 3, 0, 0).unwrap();
    assert_eq!(
        local_date(instant, chrono_tz::America::Los_Angeles),
        date(2025, 6, 21)
    );
}

#[test]
fn test_year_dates_and_length() {
    assert_eq!(year_dates(2024).count(), 366);
    assert_eq!(year_dates(2025).count(), 365);
    assert_eq!(days_in_year(2024), 366);
    assert_eq!(days_in_year(2100), 365);
    assert_eq!(year_dates(2025).last(), Some(date(2025, 12, 31)));
}

#[test]
fn test_date_range_inclusive() {
    let days: Vec<_> = date_range(date(2025, 12, 30), date(2026, 1, 2)).collect();
    assert_eq!(days.len(), 4);
    assert_eq!(date_range(date(2025, 1, 2), date(2025, 1, 1)).count(), 0);
}
