use std::fmt;

use serde::Serialize;
use serde_json::{json, Map, Value};

/// One of the three external reporting systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Ga4,
    Ads,
    Meta,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Ga4, Source::Ads, Source::Meta];

    /// Endpoint path on the reporting worker.
    pub fn path(&self) -> &'static str {
        match self {
            Source::Ga4 => "/ga4",
            Source::Ads => "/google-ads",
            Source::Meta => "/meta-ads",
        }
    }

    /// Name of the query parameter carrying the source identifier.
    pub fn id_param(&self) -> &'static str {
        match self {
            Source::Ga4 => "propertyId",
            Source::Ads => "customerId",
            Source::Meta => "adAccountId",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Source::Ga4 => "GA4",
            Source::Ads => "Google Ads",
            Source::Meta => "Meta Ads",
        };
        f.write_str(name)
    }
}

/// Why a configured source did not produce a usable payload.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureCause {
    /// Non-2xx HTTP status.
    Status(u16),
    /// The request never completed (connection, timeout).
    Transport(String),
    /// 2xx response whose body is not JSON.
    Decode(String),
}

/// Outcome of one source request, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawSourceResult {
    /// Identifier not configured; no request was made.
    Absent,
    Success(Value),
    Failure {
        cause: FailureCause,
        body: Option<String>,
    },
}

impl RawSourceResult {
    /// The JSON tree a normalizer should see for this outcome.
    ///
    /// Failures become `{"error": "<text>"}` so normalizers degrade to
    /// zero-filled totals while keeping the error text as a marker.
    pub fn payload(&self) -> Value {
        match self {
            RawSourceResult::Absent => Value::Object(Map::new()),
            RawSourceResult::Success(v) => v.clone(),
            RawSourceResult::Failure { cause, body } => {
                let text = match (body.as_deref(), cause) {
                    (Some(b), _) if !b.trim().is_empty() => b.to_string(),
                    (_, FailureCause::Status(code)) => format!("HTTP {code}"),
                    (_, FailureCause::Transport(msg)) => msg.clone(),
                    (_, FailureCause::Decode(msg)) => msg.clone(),
                };
                json!({ "error": text })
            }
        }
    }

    pub fn status(&self) -> SourceStatus {
        match self {
            RawSourceResult::Absent => SourceStatus::NotConfigured,
            RawSourceResult::Success(_) => SourceStatus::Ok,
            RawSourceResult::Failure { cause, .. } => match cause {
                FailureCause::Status(status) => SourceStatus::HttpError { status: *status },
                FailureCause::Transport(message) => SourceStatus::TransportError {
                    message: message.clone(),
                },
                FailureCause::Decode(message) => SourceStatus::InvalidBody {
                    message: message.clone(),
                },
            },
        }
    }
}

/// Per-source diagnostics carried alongside the normalized data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SourceStatus {
    #[default]
    NotConfigured,
    Ok,
    HttpError { status: u16 },
    TransportError { message: String },
    InvalidBody { message: String },
}

impl SourceStatus {
    pub fn is_failure(&self) -> bool {
        !matches!(self, SourceStatus::NotConfigured | SourceStatus::Ok)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceStatuses {
    pub ga4: SourceStatus,
    pub ads: SourceStatus,
    pub meta: SourceStatus,
}
