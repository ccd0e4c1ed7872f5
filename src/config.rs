use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fetch::{FetchOptions, TransportErrorPolicy};
use crate::profile::ClientProfile;

pub const WORKER_URL_ENV: &str = "PERFDASH_WORKER_URL";
pub const TOKEN_ENV: &str = "PERFDASH_TOKEN";

/// Settings file, by default `~/.perfdash/config.json`.
///
/// Uses the dashboard's camelCase keys so an exported dashboard
/// configuration can be dropped in as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub worker_url: Option<String>,
    pub clients: BTreeMap<String, ClientProfile>,
    pub request_timeout_secs: u64,
    pub deadline_secs: u64,
    pub transport_errors: TransportErrorPolicy,
    pub authenticate_meta: bool,
}

impl Default for Config {
    fn default() -> Self {
        let fetch = FetchOptions::default();
        Self {
            worker_url: None,
            clients: BTreeMap::new(),
            request_timeout_secs: fetch.request_timeout.as_secs(),
            deadline_secs: fetch.deadline.as_secs(),
            transport_errors: fetch.transport_errors,
            authenticate_meta: fetch.authenticate_meta,
        }
    }
}

/// The worker's `/config` document. Only the client directory is used.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub clients: Option<BTreeMap<String, ClientProfile>>,
}

impl Config {
    /// Default config path (`~/.perfdash/config.json`).
    pub fn default_path() -> Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| Error::Config("cannot determine home directory".into()))?
            .join(".perfdash")
            .join("config.json"))
    }

    /// Load the default config file; a missing file yields an empty config.
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file at {}; using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load a config file that must exist.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let mut config: Config = serde_json::from_str(text)?;
        config.fill_client_ids();
        Ok(config)
    }

    /// Apply `PERFDASH_WORKER_URL` if set.
    pub fn with_env(self) -> Self {
        self.with_worker_url(std::env::var(WORKER_URL_ENV).ok())
    }

    pub fn with_worker_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.worker_url = Some(url);
        }
        self
    }

    pub fn worker_url(&self) -> Result<&str> {
        self.worker_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "worker URL not set. Add \"workerUrl\" to the config file or set {WORKER_URL_ENV}"
                ))
            })
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            request_timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
            deadline: Duration::from_secs(self.deadline_secs.max(1)),
            transport_errors: self.transport_errors,
            authenticate_meta: self.authenticate_meta,
        }
    }

    /// Look a client up by key, then by case-insensitive display name.
    pub fn client(&self, key_or_name: &str) -> Result<&ClientProfile> {
        if let Some(profile) = self.clients.get(key_or_name) {
            return Ok(profile);
        }
        self.clients
            .values()
            .find(|p| p.name.eq_ignore_ascii_case(key_or_name))
            .ok_or_else(|| Error::UnknownClient(key_or_name.to_string()))
    }

    /// The client selected when none is named: the first by key.
    pub fn default_client(&self) -> Result<&ClientProfile> {
        self.clients
            .values()
            .next()
            .ok_or_else(|| Error::Config("no clients configured".into()))
    }

    /// Replace the client directory with the remote one, when it has one.
    pub fn merge_remote(&mut self, remote: RemoteConfig) {
        if let Some(clients) = remote.clients {
            self.clients = clients;
            self.fill_client_ids();
        }
    }

    fn fill_client_ids(&mut self) {
        for (key, profile) in self.clients.iter_mut() {
            if profile.id.is_empty() {
                profile.id = key.clone();
            }
        }
    }
}

/// Bearer credential from `PERFDASH_TOKEN`.
pub fn credential_from_env() -> Result<String> {
    std::env::var(TOKEN_ENV)
        .ok()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| Error::Config(format!("no credential. Pass --token or set {TOKEN_ENV}")))
}
