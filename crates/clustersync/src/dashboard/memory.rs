//! In-memory dashboard backend
//!
//! Answers the same questions as the HTTP backend from local state and
//! records every request path, so tests can assert what was (or was not)
//! sent over the wire.

use anyhow::{Result, anyhow, bail};
use std::sync::Mutex;

use super::DashboardApi;
use super::api::{DashboardStatsResponse, SyncAllResponse, SyncStartResponse, SyncTask};
use crate::models::{
    ClusterCounts, ClusterId, ClusterInfo, ClusterStats, ClusterSummary, StatsSnapshot,
};

/// How the in-memory backend answers sync-start requests
#[derive(Debug, Clone, PartialEq)]
pub enum SyncReply {
    /// Accept the job and answer with this message
    Started(String),
    /// Parse fine but report a status other than `"started"`
    Rejected { status: String, message: String },
    /// Behave like a dropped connection
    Unreachable,
}

struct DashboardState {
    clusters: Vec<ClusterSummary>,
    stats: StatsSnapshot,
    sync_reply: Option<SyncReply>,
    stats_available: bool,
    requests: Vec<String>,
}

/// In-memory implementation of [`DashboardApi`]
pub struct InMemoryDashboard {
    state: Mutex<DashboardState>,
}

impl InMemoryDashboard {
    /// Create a backend with no clusters that accepts every sync
    pub fn new() -> Self {
        Self {
            state: Mutex::new(DashboardState {
                clusters: Vec::new(),
                stats: StatsSnapshot::default(),
                sync_reply: None,
                stats_available: true,
                requests: Vec::new(),
            }),
        }
    }

    /// Register a cluster so sync-all and cluster stats know about it
    pub fn add_cluster(&self, id: impl Into<ClusterId>, name: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.clusters.push(ClusterSummary {
                id: id.into(),
                name: name.to_string(),
                node_count: 0,
                vm_count: 0,
            });
        }
    }

    /// Replace the counters served by the stats endpoint
    pub fn set_stats(&self, stats: StatsSnapshot) {
        if let Ok(mut state) = self.state.lock() {
            state.stats = stats;
        }
    }

    /// Script the answer to subsequent sync-start requests
    ///
    /// Without a scripted reply every sync is accepted with the backend's
    /// usual "Sync initiated" message.
    pub fn set_sync_reply(&self, reply: SyncReply) {
        if let Ok(mut state) = self.state.lock() {
            state.sync_reply = Some(reply);
        }
    }

    /// Make the stats endpoints fail (`false`) or answer again (`true`)
    pub fn set_stats_available(&self, available: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.stats_available = available;
        }
    }

    /// Every request path seen so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|state| state.requests.clone())
            .unwrap_or_default()
    }

    /// Number of requests whose path equals `path`
    pub fn request_count(&self, path: &str) -> usize {
        self.requests().iter().filter(|p| p.as_str() == path).count()
    }

    fn record(&self, path: String) -> Result<std::sync::MutexGuard<'_, DashboardState>> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| anyhow!("in-memory dashboard state poisoned"))?;
        state.requests.push(path);
        Ok(state)
    }
}

impl Default for InMemoryDashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardApi for InMemoryDashboard {
    fn start_sync(&self, cluster_id: &ClusterId) -> Result<SyncStartResponse> {
        let state = self.record(format!("/clusters/{cluster_id}/sync/"))?;

        match state.sync_reply.clone() {
            Some(SyncReply::Unreachable) => bail!("connection refused"),
            Some(SyncReply::Rejected { status, message }) => Ok(SyncStartResponse {
                status,
                message,
                task_id: None,
                cluster_id: Some(cluster_id.clone()),
            }),
            Some(SyncReply::Started(message)) => Ok(started(cluster_id, message)),
            None => {
                let name = state
                    .clusters
                    .iter()
                    .find(|c| &c.id == cluster_id)
                    .map_or_else(|| cluster_id.to_string(), |c| c.name.clone());
                Ok(started(cluster_id, format!("Sync initiated for cluster {name}")))
            }
        }
    }

    fn start_sync_all(&self) -> Result<SyncAllResponse> {
        let state = self.record("/clusters/sync-all/".to_string())?;

        let tasks: Vec<SyncTask> = state
            .clusters
            .iter()
            .map(|c| SyncTask {
                cluster_id: c.id.clone(),
                task_id: Some(format!("task-{}", c.id)),
                name: Some(c.name.clone()),
            })
            .collect();

        match state.sync_reply.clone() {
            Some(SyncReply::Unreachable) => bail!("connection refused"),
            Some(SyncReply::Rejected { status, message }) => Ok(SyncAllResponse {
                status,
                message,
                tasks: Vec::new(),
            }),
            Some(SyncReply::Started(message)) => Ok(SyncAllResponse {
                status: super::api::STATUS_STARTED.to_string(),
                message,
                tasks,
            }),
            None => Ok(SyncAllResponse {
                status: super::api::STATUS_STARTED.to_string(),
                message: format!("Sync initiated for {} cluster(s)", tasks.len()),
                tasks,
            }),
        }
    }

    fn dashboard_stats(&self) -> Result<DashboardStatsResponse> {
        let state = self.record("/api/dashboard/stats/".to_string())?;
        if !state.stats_available {
            bail!("dashboard stats unavailable");
        }

        Ok(DashboardStatsResponse {
            stats: state.stats.clone(),
            clusters: state.clusters.clone(),
        })
    }

    fn cluster_stats(&self, cluster_id: &ClusterId) -> Result<ClusterStats> {
        let state = self.record(format!("/api/cluster/{cluster_id}/stats/"))?;
        if !state.stats_available {
            bail!("cluster stats unavailable");
        }

        let cluster = state
            .clusters
            .iter()
            .find(|c| &c.id == cluster_id)
            .ok_or_else(|| anyhow!("cluster {cluster_id} not found"))?;

        Ok(ClusterStats {
            cluster: ClusterInfo {
                id: cluster.id.clone(),
                name: cluster.name.clone(),
                is_active: true,
            },
            stats: ClusterCounts {
                node_count: cluster.node_count,
                vm_count: cluster.vm_count,
                ..ClusterCounts::default()
            },
            nodes: Vec::new(),
            vms: Vec::new(),
        })
    }
}

fn started(cluster_id: &ClusterId, message: String) -> SyncStartResponse {
    SyncStartResponse {
        status: super::api::STATUS_STARTED.to_string(),
        message,
        task_id: Some(format!("task-{cluster_id}")),
        cluster_id: Some(cluster_id.clone()),
    }
}
