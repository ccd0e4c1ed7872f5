use serde_json::Value;

use super::types::{AdsCampaign, AdsTotals, NormalizedAds};
use super::{count, error_marker, num, ratio, rows, text};

const MICROS_PER_UNIT: f64 = 1_000_000.0;

/// Normalize a Google Ads worker payload.
///
/// `costMicros` and `averageCpc` are converted from micros. The totals-level
/// cost per conversion is recomputed from cost and conversions; per-campaign
/// `costPerConversion` is passed through as reported.
pub fn normalize_ads(payload: &Value) -> NormalizedAds {
    let metrics = payload.pointer("/totals/metrics");
    let field = |name: &str| metrics.and_then(|m| m.get(name));

    let cost = num(field("costMicros")) / MICROS_PER_UNIT;
    let conversions = num(field("conversions"));
    let totals = AdsTotals {
        cost,
        clicks: count(field("clicks")),
        impressions: count(field("impressions")),
        ctr: num(field("ctr")),
        cost_per_click: num(field("averageCpc")) / MICROS_PER_UNIT,
        conversions,
        cost_per_conversion: ratio(cost, conversions),
    };

    let campaigns = rows(payload, "/campaigns")
        .iter()
        .map(normalize_campaign)
        .collect();

    NormalizedAds {
        totals,
        campaigns,
        error: error_marker(payload),
    }
}

fn normalize_campaign(row: &Value) -> AdsCampaign {
    let metrics = row.get("metrics");
    let field = |name: &str| metrics.and_then(|m| m.get(name));

    AdsCampaign {
        name: text(row.pointer("/campaign/name")),
        clicks: count(field("clicks")),
        impressions: count(field("impressions")),
        cost: num(field("costMicros")) / MICROS_PER_UNIT,
        conversions: num(field("conversions")),
        cost_per_conversion: num(field("costPerConversion")),
        search_impression_share: num(field("searchImpressionShare")).clamp(0.0, 1.0),
    }
}
