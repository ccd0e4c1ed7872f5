pub mod period;

use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::date_util::query_date;
use crate::error::{Error, Result};

pub use period::Period;

/// Inclusive calendar date range for one report request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidRange(format!(
                "start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse `YYYY-MM-DD` bounds.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let parse = |s: &str| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map_err(|e| Error::InvalidRange(format!("{s}: {e}")))
        };
        Self::new(parse(start)?, parse(end)?)
    }

    /// The dashboard's default window: `days` days back through `today`.
    pub fn last_days(days: u32, today: NaiveDate) -> Result<Self> {
        let start = today
            .checked_sub_signed(Duration::days(days as i64))
            .ok_or_else(|| Error::InvalidRange(format!("{days} days before {today}")))?;
        Self::new(start, today)
    }

    pub fn from_period(period: &Period) -> Result<Self> {
        period.date_range()
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// `startDate` / `endDate` query parameters.
    pub fn query_params(&self) -> [(&'static str, String); 2] {
        [
            ("startDate", query_date(self.start)),
            ("endDate", query_date(self.end)),
        ]
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", query_date(self.start), query_date(self.end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_rejects_inverted_range() {
        let err = DateRange::new(date(2025, 2, 1), date(2025, 1, 1)).unwrap_err();
        assert!(matches!(err, Error::InvalidRange(_)));
    }

    #[test]
    fn test_single_day_range() {
        let r = DateRange::new(date(2025, 2, 1), date(2025, 2, 1)).unwrap();
        assert_eq!(r.days(), 1);
    }

    #[test]
    fn test_parse() {
        let r = DateRange::parse("2025-01-01", "2025-01-31").unwrap();
        assert_eq!(r.days(), 31);
        assert!(DateRange::parse("2025-01-01", "31/01/2025").is_err());
    }

    #[test]
    fn test_last_days() {
        let r = DateRange::last_days(7, date(2025, 3, 10)).unwrap();
        assert_eq!(r.start(), date(2025, 3, 3));
        assert_eq!(r.end(), date(2025, 3, 10));
    }

    #[test]
    fn test_from_period() {
        let r = DateRange::from_period(&Period::parse_at("30d", date(2025, 3, 31)).unwrap()).unwrap();
        assert_eq!(r.start(), date(2025, 3, 2));
        assert_eq!(r.days(), 30);

        let q = DateRange::from_period(&Period::parse("2025-Q1").unwrap()).unwrap();
        assert_eq!((q.start(), q.end()), (date(2025, 1, 1), date(2025, 3, 31)));
    }

    #[test]
    fn test_query_params() {
        let r = DateRange::new(date(2025, 1, 5), date(2025, 2, 9)).unwrap();
        let [(k1, v1), (k2, v2)] = r.query_params();
        assert_eq!((k1, v1.as_str()), ("startDate", "2025-01-05"));
        assert_eq!((k2, v2.as_str()), ("endDate", "2025-02-09"));
        assert_eq!(r.to_string(), "2025-01-05 .. 2025-02-09");
    }
}
