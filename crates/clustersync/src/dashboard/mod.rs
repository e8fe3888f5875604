//! Dashboard backend integration
//!
//! This module provides:
//! - The [`DashboardApi`] trait the coordinator talks to
//! - An HTTP client for the real backend
//! - An in-memory backend for tests and offline runs

mod client;
mod memory;

pub use client::DashboardClient;
pub use memory::{InMemoryDashboard, SyncReply};

use anyhow::Result;

use crate::models::{ClusterId, ClusterStats};
use api::{DashboardStatsResponse, SyncAllResponse, SyncStartResponse};

/// Operations the sync coordinator needs from the dashboard backend
///
/// Implementations report transport, HTTP status and decoding problems as
/// errors. A parsed response whose status is not `"started"` is a value,
/// not an error; classifying it is the caller's job.
pub trait DashboardApi: Send + Sync {
    /// Ask the backend to start syncing one cluster
    fn start_sync(&self, cluster_id: &ClusterId) -> Result<SyncStartResponse>;

    /// Ask the backend to start syncing every active cluster
    fn start_sync_all(&self) -> Result<SyncAllResponse>;

    /// Fetch dashboard-wide counters
    fn dashboard_stats(&self) -> Result<DashboardStatsResponse>;

    /// Fetch details for a single cluster
    fn cluster_stats(&self, cluster_id: &ClusterId) -> Result<ClusterStats>;
}

/// Dashboard API response types
pub mod api {
    use serde::{Deserialize, Serialize};

    use crate::models::{ClusterId, ClusterSummary, StatsSnapshot};

    /// Status value the backend uses when a sync job was queued
    pub const STATUS_STARTED: &str = "started";

    /// Response from `GET /clusters/{id}/sync/`
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct SyncStartResponse {
        pub status: String,
        #[serde(default)]
        pub message: String,
        pub task_id: Option<String>,
        pub cluster_id: Option<ClusterId>,
    }

    impl SyncStartResponse {
        pub fn is_started(&self) -> bool {
            self.status == STATUS_STARTED
        }
    }

    /// One queued job in a sync-all response
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct SyncTask {
        pub cluster_id: ClusterId,
        pub task_id: Option<String>,
        pub name: Option<String>,
    }

    /// Response from `GET /clusters/sync-all/`
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct SyncAllResponse {
        pub status: String,
        #[serde(default)]
        pub message: String,
        #[serde(default)]
        pub tasks: Vec<SyncTask>,
    }

    impl SyncAllResponse {
        pub fn is_started(&self) -> bool {
            self.status == STATUS_STARTED
        }
    }

    /// Response from `GET /api/dashboard/stats/`
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct DashboardStatsResponse {
        pub stats: StatsSnapshot,
        #[serde(default)]
        pub clusters: Vec<ClusterSummary>,
    }
}
