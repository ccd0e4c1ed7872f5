use serde_json::Value;

use super::types::{Ga4Timeseries, Ga4Totals, GeoRow, NormalizedGa4, TrafficRow};
use super::{count, error_marker, ratio, rows, text};
use crate::date_util::compact_date_label;

/// Normalize a GA4 worker payload.
///
/// Totals come from the first `totals.rows` entry with metrics in the order
/// sessions, newUsers, engagedSessions, conversions. Timeseries rows arrive
/// newest first and are flipped to ascending order.
pub fn normalize_ga4(payload: &Value) -> NormalizedGa4 {
    let totals_row = rows(payload, "/totals/rows").first();
    let sessions = metric(totals_row, 0);
    let engaged_sessions = metric(totals_row, 2);
    let totals = Ga4Totals {
        sessions,
        new_users: metric(totals_row, 1),
        engaged_sessions,
        conversions: metric(totals_row, 3),
        engagement_rate: ratio(engaged_sessions as f64, sessions as f64),
    };

    let mut timeseries = Ga4Timeseries::default();
    for row in rows(payload, "/timeseries/rows").iter().rev() {
        timeseries
            .labels
            .push(compact_date_label(&dimension(Some(row), 0)));
        timeseries.sessions.push(metric(Some(row), 0));
        timeseries.new_users.push(metric(Some(row), 1));
    }

    let traffic = rows(payload, "/traffic/rows")
        .iter()
        .map(|row| TrafficRow {
            source: dimension(Some(row), 0),
            sessions: metric(Some(row), 0),
            users: metric(Some(row), 1),
            conversions: metric(Some(row), 2),
        })
        .collect();

    let geo = rows(payload, "/geo/rows")
        .iter()
        .map(|row| GeoRow {
            country: dimension(Some(row), 0),
            users: metric(Some(row), 0),
        })
        .collect();

    NormalizedGa4 {
        totals,
        timeseries,
        traffic,
        geo,
        error: error_marker(payload),
    }
}

fn metric(row: Option<&Value>, index: usize) -> u64 {
    count(positional(row, "metricValues", index))
}

fn dimension(row: Option<&Value>, index: usize) -> String {
    text(positional(row, "dimensionValues", index))
}

/// `row[list][index].value`
fn positional<'a>(row: Option<&'a Value>, list: &str, index: usize) -> Option<&'a Value> {
    row?.get(list)?.get(index)?.get("value")
}
