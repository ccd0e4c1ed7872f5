//! Concurrent source fetch.
//!
//! Up to three GETs run concurrently on the caller's task. HTTP error
//! statuses are always isolated to their source; transport failures are
//! isolated or fatal depending on [`TransportErrorPolicy`]. One deadline
//! covers the whole call, and dropping the future cancels every request
//! still in flight.

pub mod http;

#[cfg(test)]
pub(crate) mod testing;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::profile::ClientProfile;
use crate::range::DateRange;
use crate::report::{assemble, Report};
use crate::source::{FailureCause, RawSourceResult, Source};

pub use http::HttpTransport;

/// A read-only GET against the reporting worker.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub path: &'static str,
    pub query: Vec<(&'static str, String)>,
    pub bearer: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request could not complete (connection refused, reset, timeout).
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct TransportFailure(pub String);

/// HTTP transport supplied by the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, request: &ApiRequest) -> std::result::Result<HttpResponse, TransportFailure>;
}

/// What a transport failure on one source does to the whole call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportErrorPolicy {
    /// The source reports `TransportError` and the others carry on.
    #[default]
    Isolate,
    /// The whole call fails with [`Error::Transport`].
    Abort,
}

#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Bound on each individual request.
    pub request_timeout: Duration,
    /// Bound on the whole aggregation.
    pub deadline: Duration,
    pub transport_errors: TransportErrorPolicy,
    /// Send the bearer credential to the Meta endpoint as well.
    pub authenticate_meta: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            deadline: Duration::from_secs(60),
            transport_errors: TransportErrorPolicy::Isolate,
            authenticate_meta: true,
        }
    }
}

/// Build the request for `source`, or `None` if the profile lacks its identifier.
pub fn build_request(
    source: Source,
    profile: &ClientProfile,
    range: &DateRange,
    credential: &str,
    options: &FetchOptions,
) -> Option<ApiRequest> {
    let id = profile.identifier(source)?;

    let mut query = vec![(source.id_param(), id.to_string())];
    query.extend(range.query_params());
    if source == Source::Meta && !profile.meta_conversion_events.is_empty() {
        query.push(("events", profile.meta_conversion_events.join(",")));
    }

    let authenticated = source != Source::Meta || options.authenticate_meta;
    Some(ApiRequest {
        path: source.path(),
        query,
        bearer: authenticated.then(|| credential.to_string()),
    })
}

/// Fetch the raw results for all three sources, in `Source::ALL` order.
pub async fn fetch_sources<T: Transport + ?Sized>(
    transport: &T,
    profile: &ClientProfile,
    range: &DateRange,
    credential: &str,
    options: &FetchOptions,
) -> Result<[RawSourceResult; 3]> {
    let all = async {
        tokio::try_join!(
            fetch_one(transport, Source::Ga4, profile, range, credential, options),
            fetch_one(transport, Source::Ads, profile, range, credential, options),
            fetch_one(transport, Source::Meta, profile, range, credential, options),
        )
    };

    match tokio::time::timeout(options.deadline, all).await {
        Ok(results) => {
            let (ga4, ads, meta) = results?;
            Ok([ga4, ads, meta])
        }
        Err(_) => {
            log::warn!(
                "Report for {} exceeded deadline of {:?}; cancelling in-flight requests",
                profile.id,
                options.deadline
            );
            Err(Error::DeadlineExceeded(options.deadline))
        }
    }
}

/// Fetch, normalize, and assemble one client's report.
pub async fn fetch_report<T: Transport + ?Sized>(
    transport: &T,
    profile: &ClientProfile,
    range: &DateRange,
    credential: &str,
    options: &FetchOptions,
) -> Result<Report> {
    let [ga4, ads, meta] = fetch_sources(transport, profile, range, credential, options).await?;
    let report = assemble(&ga4, &ads, &meta, profile);

    let failed = [&report.sources.ga4, &report.sources.ads, &report.sources.meta]
        .iter()
        .filter(|s| s.is_failure())
        .count();
    log::info!(
        "Report for {} ({range}): {} sources queried, {failed} failed",
        profile.id,
        profile.configured_sources().len()
    );
    Ok(report)
}

async fn fetch_one<T: Transport + ?Sized>(
    transport: &T,
    source: Source,
    profile: &ClientProfile,
    range: &DateRange,
    credential: &str,
    options: &FetchOptions,
) -> Result<RawSourceResult> {
    let Some(request) = build_request(source, profile, range, credential, options) else {
        log::debug!("{source} not configured for {}; skipping", profile.id);
        return Ok(RawSourceResult::Absent);
    };

    log::debug!("Requesting {source} ({}) for {}", request.path, profile.id);
    let outcome = match tokio::time::timeout(options.request_timeout, transport.get(&request)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(TransportFailure(format!(
            "request timed out after {:?}",
            options.request_timeout
        ))),
    };

    match outcome {
        Ok(response) => Ok(classify(source, response)),
        Err(failure) => match options.transport_errors {
            TransportErrorPolicy::Abort => Err(Error::Transport {
                target: source,
                message: failure.0,
            }),
            TransportErrorPolicy::Isolate => {
                log::warn!("{source} request failed: {failure}");
                Ok(RawSourceResult::Failure {
                    cause: FailureCause::Transport(failure.0),
                    body: None,
                })
            }
        },
    }
}

fn classify(source: Source, response: HttpResponse) -> RawSourceResult {
    if !response.is_success() {
        log::warn!("{source} responded with HTTP {}", response.status);
        return RawSourceResult::Failure {
            cause: FailureCause::Status(response.status),
            body: Some(response.body),
        };
    }

    match serde_json::from_str(&response.body) {
        Ok(payload) => RawSourceResult::Success(payload),
        Err(e) => {
            log::warn!("{source} returned a body that is not JSON: {e}");
            RawSourceResult::Failure {
                cause: FailureCause::Decode(format!("invalid JSON from {source}: {e}")),
                body: None,
            }
        }
    }
}
