use serde_json::Value;

use super::types::{MetaCampaign, MetaTotals, NormalizedMeta};
use super::{count, error_marker, finite, num, rows, text};

/// Action types counted as conversions when a client doesn't override them.
pub const DEFAULT_META_CONVERSION_EVENTS: [&str; 4] = [
    "purchase",
    "lead",
    "complete_registration",
    "onsite_conversion.post_save",
];

/// Normalize a Meta Ads worker payload.
///
/// `conversion_events` replaces the default allowlist entirely when
/// non-empty. Totals are sums over the campaign rows in `data`.
pub fn normalize_meta(payload: &Value, conversion_events: &[String]) -> NormalizedMeta {
    let allowlist: Vec<&str> = if conversion_events.is_empty() {
        DEFAULT_META_CONVERSION_EVENTS.to_vec()
    } else {
        conversion_events.iter().map(String::as_str).collect()
    };

    let campaigns: Vec<MetaCampaign> = rows(payload, "/data")
        .iter()
        .map(|row| normalize_campaign(row, &allowlist))
        .collect();

    let totals = campaigns.iter().fold(MetaTotals::default(), |mut t, c| {
        t.spend = finite(t.spend + c.spend);
        t.impressions = t.impressions.saturating_add(c.impressions);
        t.clicks = t.clicks.saturating_add(c.clicks);
        t.conversions = t.conversions.saturating_add(c.conversions);
        t
    });

    NormalizedMeta {
        totals,
        campaigns,
        error: error_marker(payload),
    }
}

fn normalize_campaign(row: &Value, allowlist: &[&str]) -> MetaCampaign {
    let conversions = rows(row, "/actions")
        .iter()
        .filter(|a| is_allowed(a, allowlist))
        .map(|a| count(a.get("value")))
        .fold(0u64, u64::saturating_add);

    // First matching entry wins; several matching tags are not averaged.
    let cost_per_conversion = rows(row, "/cost_per_action_type")
        .iter()
        .find(|a| is_allowed(a, allowlist))
        .map_or(0.0, |a| num(a.get("value")));

    MetaCampaign {
        name: text(row.get("campaign_name")),
        spend: num(row.get("spend")),
        impressions: count(row.get("impressions")),
        clicks: count(row.get("clicks")),
        ctr: num(row.get("ctr")),
        cost_per_click: num(row.get("cpc")),
        conversions,
        cost_per_conversion,
    }
}

fn is_allowed(action: &Value, allowlist: &[&str]) -> bool {
    action
        .get("action_type")
        .and_then(Value::as_str)
        .is_some_and(|tag| allowlist.contains(&tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn events(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_allowlist_counts_purchase() {
        let payload = json!({
            "data": [{ "campaign_name": "Spring", "actions": [{ "action_type": "purchase", "value": "3" }] }]
        });
        let meta = normalize_meta(&payload, &[]);
        assert_eq!(meta.campaigns[0].conversions, 3);
        assert_eq!(meta.totals.conversions, 3);
    }

    #[test]
    fn test_override_replaces_default_allowlist() {
        let payload = json!({
            "data": [{ "actions": [{ "action_type": "purchase", "value": "3" }] }]
        });
        let meta = normalize_meta(&payload, &events(&["custom_event"]));
        assert_eq!(meta.totals.conversions, 0);
    }

    #[test]
    fn test_sums_all_matching_actions() {
        let payload = json!({
            "data": [{ "actions": [
                { "action_type": "lead", "value": "2" },
                { "action_type": "link_click", "value": "50" },
                { "action_type": "purchase", "value": 4 },
                { "action_type": "lead", "value": "1" }
            ] }]
        });
        let meta = normalize_meta(&payload, &[]);
        assert_eq!(meta.totals.conversions, 7);
    }

    #[test]
    fn test_huge_spend_sums_stay_finite() {
        let payload = json!({ "data": [{ "spend": "1e308" }, { "spend": "1e308" }] });
        let meta = normalize_meta(&payload, &[]);
        assert!(meta.totals.spend.is_finite());
        assert_eq!(meta.totals.spend, 0.0);
    }

    #[test]
    fn test_counter_sums_saturate() {
        let payload = json!({ "data": [
            { "impressions": "18446744073709551615", "clicks": "18446744073709551615", "actions": [
                { "action_type": "lead", "value": "18446744073709551615" },
                { "action_type": "purchase", "value": "1" }
            ] },
            { "impressions": "1", "clicks": "1", "actions": [{ "action_type": "lead", "value": "1" }] }
        ] });
        let meta = normalize_meta(&payload, &[]);
        assert_eq!(meta.campaigns[0].conversions, u64::MAX);
        assert_eq!(meta.totals.impressions, u64::MAX);
        assert_eq!(meta.totals.clicks, u64::MAX);
        assert_eq!(meta.totals.conversions, u64::MAX);
    }

    #[test]
    fn test_cost_per_conversion_first_match_wins() {
        let payload = json!({
            "data": [{ "cost_per_action_type": [
                { "action_type": "link_click", "value": "0.10" },
                { "action_type": "lead", "value": "4.50" },
                { "action_type": "purchase", "value": "20.00" }
            ] }]
        });
        let meta = normalize_meta(&payload, &[]);
        assert_eq!(meta.campaigns[0].cost_per_conversion, 4.5);

        let meta = normalize_meta(&payload, &events(&["purchase"]));
        assert_eq!(meta.campaigns[0].cost_per_conversion, 20.0);
    }

    #[test]
    fn test_totals_roll_up_campaigns() {
        let payload = json!({
            "data": [
                { "campaign_name": "A", "spend": "10.5", "impressions": "1000", "clicks": "20", "ctr": "2.0", "cpc": "0.525" },
                { "campaign_name": "B", "spend": 4.5, "impressions": 500, "clicks": 5 }
            ]
        });
        let meta = normalize_meta(&payload, &[]);
        assert_eq!(
            meta.totals,
            MetaTotals {
                spend: 15.0,
                impressions: 1500,
                clicks: 25,
                conversions: 0,
            }
        );
        assert_eq!(meta.campaigns[0].cost_per_click, 0.525);
        assert_eq!(meta.campaigns[0].ctr, 2.0);
    }

    #[test]
    fn test_empty_and_malformed_payloads() {
        for payload in [
            json!({}),
            json!(null),
            json!({ "data": null }),
            json!({ "data": "nope" }),
        ] {
            assert_eq!(normalize_meta(&payload, &[]), NormalizedMeta::default());
        }

        // Rows that aren't objects still yield a zero-filled campaign.
        let meta = normalize_meta(&json!({ "data": [42, { "actions": "x" }] }), &[]);
        assert_eq!(meta.campaigns.len(), 2);
        assert_eq!(meta.totals, MetaTotals::default());
    }

    #[test]
    fn test_error_payload_keeps_marker() {
        let meta = normalize_meta(&json!({ "error": "Invalid OAuth access token" }), &[]);
        assert_eq!(meta.totals, MetaTotals::default());
        assert_eq!(meta.error.as_deref(), Some("Invalid OAuth access token"));
    }
}
