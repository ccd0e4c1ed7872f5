use serde::Serialize;

use super::Report;
use crate::normalize::{finite, ratio};

/// KPIs that combine totals from more than one source.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlendedKpis {
    /// Google Ads cost plus Meta spend.
    pub cost: f64,
    pub clicks: u64,
    /// GA4 + Google Ads + Meta conversions. The same real-world conversion
    /// is counted once per source that tracked it.
    pub conversions: f64,
    /// `cost / conversions`, 0 when there are no conversions.
    pub cpa: f64,
    /// GA4 engagement rate, carried for display.
    pub engagement_rate: f64,
}

/// Compute the blended KPIs for an assembled report.
pub fn blend(report: &Report) -> BlendedKpis {
    let cost = finite(report.ads.totals.cost + report.meta.totals.spend);
    let clicks = report.ads.totals.clicks.saturating_add(report.meta.totals.clicks);
    let conversions = finite(
        report.ga4.totals.conversions as f64
            + report.ads.totals.conversions
            + report.meta.totals.conversions as f64,
    );

    BlendedKpis {
        cost,
        clicks,
        conversions,
        cpa: ratio(cost, conversions),
        engagement_rate: report.ga4.totals.engagement_rate,
    }
}
