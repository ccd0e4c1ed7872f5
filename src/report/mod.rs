pub mod kpi;

pub use kpi::{blend, BlendedKpis};

use serde::Serialize;
use serde_json::Value;

use crate::normalize::{normalize_ads, normalize_ga4, normalize_meta};
use crate::normalize::{NormalizedAds, NormalizedGa4, NormalizedMeta};
use crate::profile::ClientProfile;
use crate::range::DateRange;
use crate::source::{RawSourceResult, SourceStatuses};

/// One client's normalized data across all three sources.
///
/// Every block is always present; sources that were not configured or
/// failed contribute their zero-filled default.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    pub ga4: NormalizedGa4,
    pub ads: NormalizedAds,
    pub meta: NormalizedMeta,
    pub ads_sandbox: bool,
    pub ads_sandbox_reason: Option<String>,
    pub meta_sandbox: bool,
    pub meta_sandbox_reason: Option<String>,
    pub sources: SourceStatuses,
}

impl Report {
    pub fn kpis(&self) -> BlendedKpis {
        blend(self)
    }
}

/// Normalize the three raw results and combine them into a [`Report`].
pub fn assemble(
    ga4: &RawSourceResult,
    ads: &RawSourceResult,
    meta: &RawSourceResult,
    profile: &ClientProfile,
) -> Report {
    let ga4_payload = ga4.payload();
    let ads_payload = ads.payload();
    let meta_payload = meta.payload();

    Report {
        ga4: normalize_ga4(&ga4_payload),
        ads: normalize_ads(&ads_payload),
        meta: normalize_meta(&meta_payload, &profile.meta_conversion_events),
        ads_sandbox: sandbox_flag(&ads_payload),
        ads_sandbox_reason: sandbox_reason(&ads_payload),
        meta_sandbox: sandbox_flag(&meta_payload),
        meta_sandbox_reason: sandbox_reason(&meta_payload),
        sources: SourceStatuses {
            ga4: ga4.status(),
            ads: ads.status(),
            meta: meta.status(),
        },
    }
}

fn sandbox_flag(payload: &Value) -> bool {
    payload
        .get("sandbox")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn sandbox_reason(payload: &Value) -> Option<String> {
    payload
        .get("sandbox_reason")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// A report plus its blended KPIs, labelled with the client and range.
#[derive(Debug, Clone, Serialize)]
pub struct ClientReport {
    pub client_id: String,
    pub client_name: String,
    pub range: DateRange,
    pub report: Report,
    pub kpis: BlendedKpis,
}

impl ClientReport {
    pub fn new(profile: &ClientProfile, range: DateRange, report: Report) -> Self {
        let kpis = report.kpis();
        Self {
            client_id: profile.id.clone(),
            client_name: profile.name.clone(),
            range,
            report,
            kpis,
        }
    }
}
