// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting and local calendar dates.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, SecondsFormat, Utc};

/// Largest UTC offset accepted from clients (UTC+14 / UTC-14 plus slack).
const MAX_OFFSET_MINUTES: i32 = 18 * 60;

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_ymd(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// The user's local clock: a fixed UTC offset plus the instant treated as "now".
///
/// All "today" and "local date" decisions go through this type, so callers pass
/// the user's timezone explicitly rather than relying on the server's zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalClock {
    offset: FixedOffset,
    now: Option<DateTime<Utc>>,
}

impl LocalClock {
    /// Clock for an offset in minutes east of UTC (e.g. `-420` for PDT).
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        if !(-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&minutes) {
            return None;
        }
        FixedOffset::east_opt(minutes * 60).map(|offset| Self { offset, now: None })
    }

    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
            now: None,
        }
    }

    /// Pin "now" to a fixed instant (used by tests and replays).
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }

    /// Today's calendar date in the local offset.
    pub fn today(&self) -> NaiveDate {
        self.local_date(self.now())
    }

    /// Calendar date of an instant in the local offset.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_local_date_crosses_midnight_by_offset() {
        let instant = Utc.with_ymd_and_hms(2024, 9, 10, 3, 30, 0).unwrap();
        let pacific = LocalClock::from_offset_minutes(-7 * 60).unwrap();
        let utc = LocalClock::utc();

        assert_eq!(
            pacific.local_date(instant),
            NaiveDate::from_ymd_opt(2024, 9, 9).unwrap()
        );
        assert_eq!(
            utc.local_date(instant),
            NaiveDate::from_ymd_opt(2024, 9, 10).unwrap()
        );
    }

    #[test]
    fn test_pinned_today() {
        let now = Utc.with_ymd_and_hms(2024, 9, 10, 23, 0, 0).unwrap();
        let clock = LocalClock::from_offset_minutes(120).unwrap().at(now);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 9, 11).unwrap());
    }

    #[test]
    fn test_rejects_absurd_offsets() {
        assert!(LocalClock::from_offset_minutes(24 * 60).is_none());
        assert!(LocalClock::from_offset_minutes(-19 * 60).is_none());
        assert!(LocalClock::from_offset_minutes(i32::MIN).is_none());
        assert!(LocalClock::from_offset_minutes(i32::MAX).is_none());
        assert!(LocalClock::from_offset_minutes(-18 * 60).is_some());
    }

    #[test]
    fn test_parse_ymd() {
        assert_eq!(
            parse_ymd(" 2024-09-09 "),
            NaiveDate::from_ymd_opt(2024, 9, 9)
        );
        assert_eq!(parse_ymd("09/09/2024"), None);
    }
}
