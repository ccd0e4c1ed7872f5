use serde::{Deserialize, Deserializer, Serialize};

use crate::source::Source;

/// A client whose sources are aggregated into one report.
///
/// Deserializes from the dashboard's camelCase client configuration. The
/// `id` is usually the key of the client map and is filled in by
/// [`crate::config::Config`] after loading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfile {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ga4_property_id: Option<String>,
    #[serde(default, alias = "gadsCustomerId", alias = "gAdsCustomerId")]
    pub ads_customer_id: Option<String>,
    #[serde(default)]
    pub meta_ad_account_id: Option<String>,
    /// Meta action types counted as conversions. Empty means the default allowlist.
    #[serde(default, deserialize_with = "deserialize_event_list")]
    pub meta_conversion_events: Vec<String>,
}

impl ClientProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_ga4(mut self, property_id: impl Into<String>) -> Self {
        self.ga4_property_id = Some(property_id.into());
        self
    }

    pub fn with_ads(mut self, customer_id: impl Into<String>) -> Self {
        self.ads_customer_id = Some(customer_id.into());
        self
    }

    pub fn with_meta(mut self, ad_account_id: impl Into<String>) -> Self {
        self.meta_ad_account_id = Some(ad_account_id.into());
        self
    }

    pub fn with_meta_events(mut self, events: &str) -> Self {
        self.meta_conversion_events = parse_event_list(events);
        self
    }

    /// Identifier for `source`, if configured and non-blank.
    pub fn identifier(&self, source: Source) -> Option<&str> {
        let id = match source {
            Source::Ga4 => self.ga4_property_id.as_deref(),
            Source::Ads => self.ads_customer_id.as_deref(),
            Source::Meta => self.meta_ad_account_id.as_deref(),
        };
        id.map(str::trim).filter(|s| !s.is_empty())
    }

    /// Sources that will be queried for this profile.
    pub fn configured_sources(&self) -> Vec<Source> {
        Source::ALL
            .into_iter()
            .filter(|s| self.identifier(*s).is_some())
            .collect()
    }
}

/// Split a comma-separated event list, trimming entries and dropping blanks.
pub fn parse_event_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect()
}

/// Accepts `"purchase, lead"`, `["purchase", "lead"]`, or null.
fn deserialize_event_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        List(Vec<String>),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Raw::Text(s)) => parse_event_list(&s),
        Some(Raw::List(items)) => items
            .iter()
            .flat_map(|s| parse_event_list(s))
            .collect(),
    })
}
