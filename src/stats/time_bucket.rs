//! Time bucketing utilities for stats aggregation
//!
//! - Day buckets: "YYYY-MM-DD" keys in the device's local calendar
//! - Time-of-day buckets: morning / afternoon / evening by minute of day

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Timelike, Utc};

use super::models::TimeOfDay;

/// 03:00
pub const MORNING_START_MINUTE: u32 = 3 * 60;
/// 11:30
pub const AFTERNOON_START_MINUTE: u32 = 11 * 60 + 30;
/// 18:00
pub const EVENING_START_MINUTE: u32 = 18 * 60;
const MINUTES_PER_DAY: u32 = 24 * 60;

/// Format a calendar date as a day bucket.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use skipfeed::stats::day_bucket;
///
/// let date = NaiveDate::from_ymd_opt(2023, 12, 28).unwrap();
/// assert_eq!(day_bucket(date), "2023-12-28");
/// ```
pub fn day_bucket(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Local calendar date of an instant in the given timezone.
pub fn local_date<Tz: TimeZone>(timestamp: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    timestamp.with_timezone(tz).date_naive()
}

/// Parse a day bucket string back to a date.
pub fn parse_day_bucket(bucket: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(bucket, "%Y-%m-%d").ok()
}

/// The first day of a trailing window of `days` days ending on `today`.
///
/// A zero-day window is treated as one day so the window always contains today.
pub fn window_start(today: NaiveDate, days: u32) -> NaiveDate {
    let back = u64::from(days.max(1) - 1);
    today.checked_sub_days(Days::new(back)).unwrap_or(NaiveDate::MIN)
}

/// Every date of a trailing window ending on `today`, oldest first.
pub fn window_days(today: NaiveDate, days: u32) -> Vec<NaiveDate> {
    let start = window_start(today, days);
    start.iter_days().take(days.max(1) as usize).collect()
}

/// Minutes since local midnight.
pub fn minute_of_day<Tz: TimeZone>(timestamp: &DateTime<Utc>, tz: &Tz) -> u32 {
    let local = timestamp.with_timezone(tz);
    local.hour() * 60 + local.minute()
}

/// Classify a minute of the day.
///
/// Evening spans midnight and is the union of two half-open ranges,
/// `[18:00, 24:00)` and `[00:00, 03:00)`.
pub fn time_of_day(minute_of_day: u32) -> TimeOfDay {
    match minute_of_day {
        MORNING_START_MINUTE..AFTERNOON_START_MINUTE => TimeOfDay::Morning,
        AFTERNOON_START_MINUTE..EVENING_START_MINUTE => TimeOfDay::Afternoon,
        EVENING_START_MINUTE..MINUTES_PER_DAY | 0..MORNING_START_MINUTE => TimeOfDay::Evening,
        // chrono reports leap seconds within minute 59, so this is unreachable in practice
        _ => TimeOfDay::Evening,
    }
}
