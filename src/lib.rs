pub mod config;
pub mod date_util;
pub mod error;
pub mod fetch;
pub mod format;
pub mod normalize;
pub mod profile;
pub mod range;
pub mod report;
pub mod source;

use std::sync::Arc;

pub use config::{Config, RemoteConfig};
pub use error::{Error, Result};
pub use fetch::{FetchOptions, HttpTransport, Transport, TransportErrorPolicy};
pub use profile::ClientProfile;
pub use range::{DateRange, Period};
pub use report::{BlendedKpis, ClientReport, Report};
pub use source::{Source, SourceStatus};

use fetch::ApiRequest;

/// Main entry point: a configured client directory plus a transport to the
/// reporting worker.
pub struct PerfDash {
    config: Config,
    transport: Arc<dyn Transport>,
}

impl PerfDash {
    /// Build with the `reqwest` transport pointed at the configured worker URL.
    pub fn new(config: Config) -> Result<Self> {
        let options = config.fetch_options();
        let transport = HttpTransport::new(config.worker_url()?, options.request_timeout)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetch and assemble the report for an explicit profile.
    pub async fn fetch_report(
        &self,
        profile: &ClientProfile,
        range: &DateRange,
        credential: &str,
    ) -> Result<Report> {
        let options = self.config.fetch_options();
        fetch::fetch_report(self.transport.as_ref(), profile, range, credential, &options).await
    }

    /// Report plus blended KPIs for a configured client (by key or name).
    pub async fn client_report(
        &self,
        client: &str,
        range: &DateRange,
        credential: &str,
    ) -> Result<ClientReport> {
        let profile = self.config.client(client)?;
        let report = self.fetch_report(profile, range, credential).await?;
        Ok(ClientReport::new(profile, *range, report))
    }

    /// Read the worker's `/config` document.
    pub async fn remote_config(&self, credential: &str) -> Result<RemoteConfig> {
        let request = ApiRequest {
            path: "/config",
            query: Vec::new(),
            bearer: Some(credential.to_string()),
        };
        let response = self
            .transport
            .get(&request)
            .await
            .map_err(|e| Error::Http(format!("remote config: {e}")))?;
        if !response.is_success() {
            return Err(Error::Http(format!(
                "remote config responded with HTTP {}",
                response.status
            )));
        }
        Ok(serde_json::from_str(&response.body)?)
    }

    /// Replace the local client directory with the worker's, if it has one.
    pub async fn sync_remote_clients(&mut self, credential: &str) -> Result<usize> {
        let remote = self.remote_config(credential).await?;
        self.config.merge_remote(remote);
        log::info!("Loaded {} clients from remote config", self.config.clients.len());
        Ok(self.config.clients.len())
    }
}
