use std::sync::LazyLock;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use regex::Regex;

use super::DateRange;
use crate::date_util::{last_day_of_month, quarter_of};
use crate::error::{Error, Result};

static RE_HALF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})-H([12])$").unwrap());
static RE_QUARTER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})-Q([1-4])$").unwrap());
static RE_WEEK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})-W(\d{1,2})$").unwrap());
static RE_MONTH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})$").unwrap());

/// A named reporting period, resolved to a concrete [`DateRange`] on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Period {
    Year(i32),
    Half(i32, u8),
    Quarter(i32, u8),
    Month(i32, u8),
    Week(i32, u8),
    /// Last N days ending on (and including) the given date.
    Rolling(u32, NaiveDate),
    YearToDate(i32, NaiveDate),
    QuarterToDate(i32, u8, NaiveDate),
    MonthToDate(i32, u8, NaiveDate),
    WeekToDate(i32, u8, NaiveDate),
}

impl Period {
    /// Parse a period string relative to today's local date.
    pub fn parse(s: &str) -> Result<Self> {
        Self::parse_at(s, chrono::Local::now().date_naive())
    }

    /// Parse a period string relative to `today`.
    ///
    /// Supported formats:
    /// - `2025`: year
    /// - `2025-H1`: half
    /// - `2025-Q1`: quarter
    /// - `2025-01`: month
    /// - `2025-W05`: ISO week
    /// - `30d`: rolling last N days, today included
    /// - `ytd`, `qtd`, `mtd`, `wtd`: current year/quarter/month/week to date
    pub fn parse_at(s: &str, today: NaiveDate) -> Result<Self> {
        let s = s.trim();

        match s.to_lowercase().as_str() {
            "ytd" => return Ok(Period::YearToDate(today.year(), today)),
            "qtd" => {
                return Ok(Period::QuarterToDate(today.year(), quarter_of(today), today));
            }
            "mtd" => {
                return Ok(Period::MonthToDate(today.year(), today.month() as u8, today));
            }
            "wtd" => {
                let iw = today.iso_week();
                return Ok(Period::WeekToDate(iw.year(), iw.week() as u8, today));
            }
            _ => {}
        }

        if let Some(n) = s.strip_suffix(['d', 'D']) {
            if let Ok(n) = n.parse::<u32>() {
                if n == 0 {
                    return Err(Error::PeriodParse(format!("rolling period must be at least 1 day: {s}")));
                }
                return Ok(Period::Rolling(n, today));
            }
        }

        if s.len() == 4 {
            if let Ok(year) = s.parse::<i32>() {
                return Ok(Period::Year(year));
            }
        }

        if let Some((year, half)) = captures_pair(&RE_HALF, s) {
            return Ok(Period::Half(year, half));
        }

        if let Some((year, q)) = captures_pair(&RE_QUARTER, s) {
            return Ok(Period::Quarter(year, q));
        }

        if let Some((year, week)) = captures_pair(&RE_WEEK, s) {
            if (1..=53).contains(&week) {
                return Ok(Period::Week(year, week));
            }
        }

        if let Some((year, month)) = captures_pair(&RE_MONTH, s) {
            if (1..=12).contains(&month) {
                return Ok(Period::Month(year, month));
            }
        }

        Err(Error::PeriodParse(format!("unrecognized period: {s}")))
    }

    /// Canonical key, e.g. `2025-Q1` or `30d`.
    pub fn to_key(&self) -> String {
        match self {
            Period::Year(y) => format!("{y}"),
            Period::Half(y, h) => format!("{y}-H{h}"),
            Period::Quarter(y, q) => format!("{y}-Q{q}"),
            Period::Month(y, m) => format!("{y}-{m:02}"),
            Period::Week(y, w) => format!("{y}-W{w:02}"),
            Period::Rolling(n, _) => format!("{n}d"),
            Period::YearToDate(y, _) => format!("{y}-ytd"),
            Period::QuarterToDate(y, q, _) => format!("{y}-Q{q}-td"),
            Period::MonthToDate(y, m, _) => format!("{y}-{m:02}-td"),
            Period::WeekToDate(y, w, _) => format!("{y}-W{w:02}-td"),
        }
    }

    /// Resolve to an inclusive date range.
    pub fn date_range(&self) -> Result<DateRange> {
        let (start, end) = match self {
            Period::Year(y) => (ymd(*y, 1, 1)?, ymd(*y, 12, 31)?),
            Period::Half(y, 1) => (ymd(*y, 1, 1)?, ymd(*y, 6, 30)?),
            Period::Half(y, _) => (ymd(*y, 7, 1)?, ymd(*y, 12, 31)?),
            Period::Quarter(y, q) => {
                let start_month = (*q as u32 - 1) * 3 + 1;
                let end_month = *q as u32 * 3;
                (ymd(*y, start_month, 1)?, last_day_of_month(*y, end_month))
            }
            Period::Month(y, m) => (ymd(*y, *m as u32, 1)?, last_day_of_month(*y, *m as u32)),
            Period::Week(y, w) => {
                let start = iso_monday(*y, *w)?;
                (start, start + Duration::days(6))
            }
            Period::Rolling(n, as_of) => {
                let start = as_of
                    .checked_sub_signed(Duration::days(*n as i64 - 1))
                    .ok_or_else(|| Error::PeriodParse(format!("rolling period too long: {n}d")))?;
                (start, *as_of)
            }
            Period::YearToDate(y, today) => (ymd(*y, 1, 1)?, *today),
            Period::QuarterToDate(y, q, today) => {
                let start_month = (*q as u32 - 1) * 3 + 1;
                (ymd(*y, start_month, 1)?, *today)
            }
            Period::MonthToDate(y, m, today) => (ymd(*y, *m as u32, 1)?, *today),
            Period::WeekToDate(y, w, today) => (iso_monday(*y, *w)?, *today),
        };
        DateRange::new(start, end)
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_key())
    }
}

fn captures_pair(re: &Regex, s: &str) -> Option<(i32, u8)> {
    let caps = re.captures(s)?;
    let year = caps[1].parse().ok()?;
    let n = caps[2].parse().ok()?;
    Some((year, n))
}

fn ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| Error::PeriodParse(format!("invalid date {year}-{month:02}-{day:02}")))
}

fn iso_monday(year: i32, week: u8) -> Result<NaiveDate> {
    NaiveDate::from_isoywd_opt(year, week as u32, Weekday::Mon)
        .ok_or_else(|| Error::PeriodParse(format!("invalid ISO week {year}-W{week:02}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(Period::parse("2025").unwrap(), Period::Year(2025));
    }

    #[test]
    fn test_parse_half_and_quarter() {
        assert_eq!(Period::parse("2025-H2").unwrap(), Period::Half(2025, 2));
        assert_eq!(Period::parse("2025-Q4").unwrap(), Period::Quarter(2025, 4));
    }

    #[test]
    fn test_parse_month_and_week() {
        assert_eq!(Period::parse("2025-12").unwrap(), Period::Month(2025, 12));
        assert_eq!(Period::parse("2025-W05").unwrap(), Period::Week(2025, 5));
        assert_eq!(Period::parse("2025-W1").unwrap(), Period::Week(2025, 1));
    }

    #[test]
    fn test_parse_rolling() {
        let today = date(2025, 3, 10);
        assert_eq!(
            Period::parse_at("30d", today).unwrap(),
            Period::Rolling(30, today)
        );
        assert!(Period::parse_at("0d", today).is_err());
    }

    #[test]
    fn test_parse_to_date() {
        let today = date(2025, 5, 14);
        assert_eq!(
            Period::parse_at("QTD", today).unwrap(),
            Period::QuarterToDate(2025, 2, today)
        );
        assert_eq!(
            Period::parse_at("mtd", today).unwrap(),
            Period::MonthToDate(2025, 5, today)
        );
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Period::parse("garbage").is_err());
        assert!(Period::parse("2025-Q5").is_err());
        assert!(Period::parse("2025-13").is_err());
        assert!(Period::parse("2025-W60").is_err());
    }

    #[test]
    fn test_to_key() {
        assert_eq!(Period::Half(2025, 1).to_key(), "2025-H1");
        assert_eq!(Period::Month(2025, 1).to_key(), "2025-01");
        assert_eq!(Period::Rolling(7, date(2025, 1, 1)).to_key(), "7d");
    }

    #[test]
    fn test_date_range_quarter() {
        let r = Period::Quarter(2025, 2).date_range().unwrap();
        assert_eq!(r.start(), date(2025, 4, 1));
        assert_eq!(r.end(), date(2025, 6, 30));
    }

    #[test]
    fn test_date_range_month_leap() {
        let r = Period::Month(2024, 2).date_range().unwrap();
        assert_eq!(r.start(), date(2024, 2, 1));
        assert_eq!(r.end(), date(2024, 2, 29));
    }

    #[test]
    fn test_date_range_week() {
        let r = Period::Week(2025, 1).date_range().unwrap();
        assert_eq!(r.start().weekday(), Weekday::Mon);
        assert_eq!(r.days(), 7);
    }

    #[test]
    fn test_date_range_rolling_includes_today() {
        let today = date(2025, 3, 10);
        let r = Period::Rolling(7, today).date_range().unwrap();
        assert_eq!(r.start(), date(2025, 3, 4));
        assert_eq!(r.end(), today);
        assert_eq!(r.days(), 7);
    }

    #[test]
    fn test_date_range_to_date() {
        let today = date(2025, 8, 20);
        let r = Period::parse_at("qtd", today).unwrap().date_range().unwrap();
        assert_eq!(r.start(), date(2025, 7, 1));
        assert_eq!(r.end(), today);
    }
}
