//! Time helpers — business timezone conversion
//!
//! Date → timestamp conversion happens at the API/service layer; stores and
//! metrics only ever see `i64` Unix millis.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use shared::error::ErrorCode;

use super::{AppError, AppResult};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Parse a date string (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// Parse an IANA timezone name
pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.trim().parse::<Tz>().ok()
}

/// Unix millis → local date-time in the business timezone
pub fn to_local(millis: i64, tz: Tz) -> DateTime<Tz> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap_or_default()
        .with_timezone(&tz)
}

/// Unix millis → local calendar date in the business timezone
pub fn local_date(millis: i64, tz: Tz) -> NaiveDate {
    to_local(millis, tz).date_naive()
}

/// Date start (00:00:00) → Unix millis (business timezone)
///
/// DST gap fallback: if local midnight does not exist, fall back to UTC.
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    let naive = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// Date end → next day 00:00:00 as Unix millis (business timezone)
///
/// Callers use `< end` (exclusive).
pub fn day_end_millis(date: NaiveDate, tz: Tz) -> i64 {
    match date.succ_opt() {
        Some(next) => day_start_millis(next, tz),
        None => day_start_millis(date, tz) + DAY_MS,
    }
}

/// Half-open time window `[start_ms, end_ms)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl TimeWindow {
    pub fn new(start_ms: i64, end_ms: i64) -> Self {
        Self { start_ms, end_ms }
    }

    /// Inclusive calendar-day range in the business timezone
    pub fn from_dates(start: NaiveDate, end: NaiveDate, tz: Tz) -> AppResult<Self> {
        if end < start {
            return Err(AppError::with_message(
                ErrorCode::ReportInvalidRange,
                format!("Range end {end} is before start {start}"),
            ));
        }
        Ok(Self::new(day_start_millis(start, tz), day_end_millis(end, tz)))
    }

    /// The local calendar day containing `now`
    pub fn day_of(now: i64, tz: Tz) -> Self {
        let today = local_date(now, tz);
        Self::new(day_start_millis(today, tz), day_end_millis(today, tz))
    }

    /// `days` calendar days ending with (and including) the day of `now`
    ///
    /// Never reaches back past 1970-01-01.
    pub fn trailing_days(now: i64, days: u32, tz: Tz) -> Self {
        let today = local_date(now, tz);
        let floor = NaiveDate::default().min(today);
        let first = today
            .checked_sub_days(Days::new(u64::from(days.max(1) - 1)))
            .map_or(floor, |d| d.max(floor));
        Self::new(day_start_millis(first, tz), day_end_millis(today, tz))
    }

    /// Calendar month containing `now`
    pub fn month_of(now: i64, tz: Tz) -> Self {
        let today = local_date(now, tz);
        let first = today.with_day(1).unwrap_or(today);
        let next = if first.month() == 12 {
            NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
        };
        let end = next
            .map(|d| day_start_millis(d, tz))
            .unwrap_or_else(|| day_end_millis(today, tz));
        Self::new(day_start_millis(first, tz), end)
    }

    /// Calendar year containing `now`
    pub fn year_of(now: i64, tz: Tz) -> Self {
        let year = local_date(now, tz).year();
        let start = NaiveDate::from_ymd_opt(year, 1, 1)
            .map(|d| day_start_millis(d, tz))
            .unwrap_or(now);
        let end = NaiveDate::from_ymd_opt(year + 1, 1, 1)
            .map(|d| day_start_millis(d, tz))
            .unwrap_or(now);
        Self::new(start, end)
    }

    /// Window of the same length immediately before this one
    pub fn previous(&self) -> Self {
        let len = self.len_ms();
        Self::new(self.start_ms - len, self.start_ms)
    }

    pub fn len_ms(&self) -> i64 {
        (self.end_ms - self.start_ms).max(0)
    }

    pub fn contains(&self, millis: i64) -> bool {
        millis >= self.start_ms && millis < self.end_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tz() -> Tz {
        chrono_tz::America::Argentina::Buenos_Aires
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> i64 {
        tz().with_ymd_and_hms(y, m, d, h, 0, 0)
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2025-03-09").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()
        );
        assert!(parse_date("09/03/2025").is_err());
    }

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone("America/Argentina/Buenos_Aires"), Some(tz()));
        assert_eq!(parse_timezone("Mars/Olympus"), None);
    }

    #[test]
    fn test_day_of_uses_local_calendar() {
        // 22:00 local on Mar 9 is already Mar 10 in UTC
        let now = at(2025, 3, 9, 22);
        let w = TimeWindow::day_of(now, tz());
        assert_eq!(w.start_ms, at(2025, 3, 9, 0));
        assert_eq!(w.end_ms, at(2025, 3, 10, 0));
        assert!(w.contains(now));
        assert!(!w.contains(w.end_ms));
    }

    #[test]
    fn test_trailing_days() {
        let now = at(2025, 3, 9, 12);
        let w = TimeWindow::trailing_days(now, 7, tz());
        assert_eq!(w.start_ms, at(2025, 3, 3, 0));
        assert_eq!(w.end_ms, at(2025, 3, 10, 0));
    }

    #[test]
    fn test_trailing_days_huge_count_stops_at_epoch() {
        let now = at(2025, 3, 9, 12);
        let w = TimeWindow::trailing_days(now, u32::MAX, tz());
        assert_eq!(w.start_ms, day_start_millis(NaiveDate::default(), tz()));
        assert_eq!(w.end_ms, at(2025, 3, 10, 0));
    }

    #[test]
    fn test_month_and_year() {
        let now = at(2025, 12, 15, 12);
        let m = TimeWindow::month_of(now, tz());
        assert_eq!(m.start_ms, at(2025, 12, 1, 0));
        assert_eq!(m.end_ms, at(2026, 1, 1, 0));
        let y = TimeWindow::year_of(now, tz());
        assert_eq!(y.start_ms, at(2025, 1, 1, 0));
        assert_eq!(y.end_ms, at(2026, 1, 1, 0));
    }

    #[test]
    fn test_previous_window() {
        let w = TimeWindow::new(1_000, 3_000);
        assert_eq!(w.previous(), TimeWindow::new(-1_000, 1_000));
    }

    #[test]
    fn test_from_dates_rejects_inverted_range() {
        let a = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        let b = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let err = TimeWindow::from_dates(a, b, tz()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ReportInvalidRange);
        let w = TimeWindow::from_dates(b, a, tz()).unwrap();
        assert_eq!(w.end_ms, at(2025, 3, 10, 0));
    }
}
