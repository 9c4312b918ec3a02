//! Julian day counters used by date and timestamp columns.
//!
//! Day 0 is midnight of 24 November 4714 BC in the proleptic Gregorian
//! calendar. Values are naive wall-clock times; no zone is attached.
//! Counters past the calendar's range saturate to `Date::MAX`.

use time::{Date, Duration, PrimitiveDateTime};

/// Calendar date for a day counter.
pub fn day_to_date(day: u32) -> Date {
    i32::try_from(day)
        .ok()
        .and_then(|day| Date::from_julian_day(day).ok())
        .unwrap_or(Date::MAX)
}

/// Date-time for a day counter plus milliseconds past midnight.
pub fn day_ms_to_datetime(day: u32, ms: u32) -> PrimitiveDateTime {
    let midnight = day_to_date(day).midnight();
    midnight
        .checked_add(Duration::milliseconds(i64::from(ms)))
        .unwrap_or(midnight)
}

/// Inverse of [`day_to_date`].
pub fn date_to_day(date: Date) -> u32 {
    u32::try_from(date.to_julian_day()).unwrap_or(0)
}
