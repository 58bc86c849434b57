//! Calendar date helpers.
//!
//! All dates are local calendar days. `today()` reads the local wall clock,
//! never UTC, so a log written just after midnight lands on the right day.

use crate::{Error, Result};
use chrono::{DateTime, Datelike, Days, Local, NaiveDate, TimeZone, Utc};

/// Today's date in the local timezone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Current instant truncated to the millisecond precision records are stored with
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    Utc.timestamp_millis_opt(now.timestamp_millis())
        .single()
        .unwrap_or(now)
}

/// Monday on or before `date`
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    // Sunday belongs to the week that started six days earlier
    let back = match date.weekday().num_days_from_sunday() {
        0 => 6,
        day => day - 1,
    };
    date - Days::new(u64::from(back))
}

/// The seven dates, Monday through Sunday, of the week containing `date`
pub fn week_dates(date: NaiveDate) -> [NaiveDate; 7] {
    let monday = start_of_week(date);
    std::array::from_fn(|i| monday + Days::new(i as u64))
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| Error::Validation(format!("Invalid date '{}': {}", s, e)))
}

/// Parse a `YYYY-MM` month into (year, month)
pub fn parse_month(s: &str) -> Result<(i32, u32)> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .map_err(|e| Error::Validation(format!("Invalid month '{}': {}", s, e)))?;
    Ok((first.year(), first.month()))
}

/// Number of days in the given month
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (first, next) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        _ => 0,
    }
}
