use chrono::{Datelike, Duration, NaiveDate};

/// Get the last day of a given month.
pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next.unwrap_or(NaiveDate::MAX) - Duration::days(1)
}

/// Get the quarter (1-4) for a given date.
pub fn quarter_of(d: NaiveDate) -> u8 {
    ((d.month() - 1) / 3 + 1) as u8
}

/// Re-format a compact `YYYYMMDD` date as a `DD/MM` chart label.
/// Values that don't parse are returned unchanged.
pub fn compact_date_label(raw: &str) -> String {
    match NaiveDate::parse_from_str(raw.trim(), "%Y%m%d") {
        Ok(d) => d.format("%d/%m").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Format a date the way the reporting worker expects it in query strings.
pub fn query_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}
