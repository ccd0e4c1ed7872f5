use serde::Serialize;

/// GA4 headline totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ga4Totals {
    pub sessions: u64,
    pub new_users: u64,
    pub engaged_sessions: u64,
    pub conversions: u64,
    /// Engaged sessions as a fraction of sessions; 0 when there are no sessions.
    pub engagement_rate: f64,
}

/// Daily series in ascending date order; all three vectors have the same length.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ga4Timeseries {
    pub labels: Vec<String>,
    pub sessions: Vec<u64>,
    pub new_users: Vec<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrafficRow {
    pub source: String,
    pub sessions: u64,
    pub users: u64,
    pub conversions: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeoRow {
    pub country: String,
    pub users: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedGa4 {
    pub totals: Ga4Totals,
    pub timeseries: Ga4Timeseries,
    pub traffic: Vec<TrafficRow>,
    pub geo: Vec<GeoRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Google Ads totals, money in currency units.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdsTotals {
    pub cost: f64,
    pub clicks: u64,
    pub impressions: u64,
    pub ctr: f64,
    pub cost_per_click: f64,
    pub conversions: f64,
    /// Always `cost / conversions`, never the upstream figure.
    pub cost_per_conversion: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdsCampaign {
    pub name: String,
    pub clicks: u64,
    pub impressions: u64,
    pub cost: f64,
    pub conversions: f64,
    /// Upstream `costPerConversion`, passed through unconverted.
    pub cost_per_conversion: f64,
    /// 0..1
    pub search_impression_share: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedAds {
    pub totals: AdsTotals,
    pub campaigns: Vec<AdsCampaign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Meta totals, rolled up from the campaign rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetaTotals {
    pub spend: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetaCampaign {
    pub name: String,
    pub spend: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub ctr: f64,
    pub cost_per_click: f64,
    pub conversions: u64,
    pub cost_per_conversion: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedMeta {
    pub totals: MetaTotals,
    pub campaigns: Vec<MetaCampaign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
