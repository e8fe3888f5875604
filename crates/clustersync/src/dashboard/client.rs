//! Dashboard HTTP client
//!
//! Uses synchronous HTTP (ureq) to be executor-agnostic.

use anyhow::{Context, Result};
use log::debug;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use super::DashboardApi;
use super::api::{DashboardStatsResponse, SyncAllResponse, SyncStartResponse};
use crate::config::SyncSettings;
use crate::models::{ClusterId, ClusterStats};

/// HTTP client for the dashboard backend
pub struct DashboardClient {
    agent: ureq::Agent,
    base_url: Url,
}

impl DashboardClient {
    /// Marks requests as programmatic so the backend answers with JSON
    /// instead of redirecting like it would for a page navigation.
    const REQUESTED_WITH: &'static str = "XMLHttpRequest";

    /// Create a client for the backend at `base_url`
    ///
    /// # Arguments
    /// * `base_url` - Root of the dashboard, e.g. `http://pve-manager.local:8000`
    /// * `timeout` - Upper bound for a whole request, connect included
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base_url =
            Url::parse(base_url).with_context(|| format!("Invalid dashboard URL: {base_url}"))?;

        // Url::join drops the last path segment unless it ends with a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();

        Ok(Self {
            agent: ureq::Agent::new_with_config(config),
            base_url,
        })
    }

    /// Create a client from loaded settings
    pub fn from_settings(settings: &SyncSettings) -> Result<Self> {
        Self::new(&settings.base_url, settings.request_timeout())
    }

    /// The normalized base URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Failed to build URL for {path}"))
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        debug!("GET {}", url);

        let mut response = self
            .agent
            .get(url.as_str())
            .header("X-Requested-With", Self::REQUESTED_WITH)
            .header("Accept", "application/json")
            .call()
            .with_context(|| format!("Failed to send {what} request"))?;

        response
            .body_mut()
            .read_json()
            .with_context(|| format!("Failed to parse {what} response"))
    }
}

impl DashboardApi for DashboardClient {
    fn start_sync(&self, cluster_id: &ClusterId) -> Result<SyncStartResponse> {
        let path = format!("clusters/{}/sync/", urlencoding::encode(cluster_id.as_str()));
        self.get_json(&path, "sync cluster")
    }

    fn start_sync_all(&self) -> Result<SyncAllResponse> {
        self.get_json("clusters/sync-all/", "sync all clusters")
    }

    fn dashboard_stats(&self) -> Result<DashboardStatsResponse> {
        self.get_json("api/dashboard/stats/", "dashboard stats")
    }

    fn cluster_stats(&self, cluster_id: &ClusterId) -> Result<ClusterStats> {
        let path = format!(
            "api/cluster/{}/stats/",
            urlencoding::encode(cluster_id.as_str())
        );
        self.get_json(&path, "cluster stats")
    }
}
