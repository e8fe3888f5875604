//! Aggregate stats reported by the dashboard backend

use serde::{Deserialize, Serialize};

use super::ClusterId;

/// Dashboard-wide counters, fetched fresh on every poll tick
///
/// Snapshots are never merged: each one overwrites whatever the page shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_vms: u64,
    pub running_vms: u64,
    pub stopped_vms: u64,
    pub total_nodes: u64,
    pub online_nodes: u64,
    /// Average node CPU usage in percent
    #[serde(default)]
    pub avg_cpu: f64,
    /// Average node RAM usage in percent
    #[serde(default)]
    pub avg_ram: f64,
}

/// Per-cluster entry in the dashboard stats response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub id: ClusterId,
    pub name: String,
    pub node_count: u64,
    pub vm_count: u64,
}

/// Identity block of a cluster stats response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterInfo {
    pub id: ClusterId,
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
}

/// Counters for a single cluster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterCounts {
    pub node_count: u64,
    pub vm_count: u64,
    pub running_vms: u64,
    pub online_nodes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStats {
    pub id: u64,
    pub name: String,
    pub status: String,
    pub cpu_usage: f64,
    pub ram_usage: f64,
    pub disk_usage: f64,
    pub vm_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VmStats {
    pub id: u64,
    pub name: String,
    pub vmid: u64,
    pub status: String,
    #[serde(default)]
    pub cpu_usage: f64,
    pub ram_mb: Option<u64>,
    pub node_name: String,
}

/// Body of `GET /api/cluster/{id}/stats/`
///
/// Only logged today. The backend caps `vms` at 20 entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterStats {
    pub cluster: ClusterInfo,
    pub stats: ClusterCounts,
    #[serde(default)]
    pub nodes: Vec<NodeStats>,
    #[serde(default)]
    pub vms: Vec<VmStats>,
}

impl ClusterStats {
    /// One-line summary used in log output
    pub fn summary(&self) -> String {
        format!(
            "{} ({}): {}/{} nodes online, {}/{} VMs running",
            self.cluster.name,
            self.cluster.id,
            self.stats.online_nodes,
            self.stats.node_count,
            self.stats.running_vms,
            self.stats.vm_count,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_parses_backend_payload() {
        let json = r#"{
            "total_vms": 12, "running_vms": 9, "stopped_vms": 3,
            "total_nodes": 4, "online_nodes": 4,
            "avg_cpu": 23.57, "avg_ram": 61.0
        }"#;

        let snapshot: StatsSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.total_vms, 12);
        assert_eq!(snapshot.stopped_vms, 3);
        assert!((snapshot.avg_cpu - 23.57).abs() < f64::EPSILON);
    }

    #[test]
    fn test_snapshot_missing_averages_default_to_zero() {
        let json = r#"{
            "total_vms": 0, "running_vms": 0, "stopped_vms": 0,
            "total_nodes": 0, "online_nodes": 0
        }"#;

        let snapshot: StatsSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.avg_cpu, 0.0);
        assert_eq!(snapshot.avg_ram, 0.0);
    }

    #[test]
    fn test_cluster_stats_summary() {
        let json = r#"{
            "cluster": {"id": 3, "name": "pve-east", "is_active": true},
            "stats": {"node_count": 3, "vm_count": 10, "running_vms": 8, "online_nodes": 2},
            "nodes": [{"id": 1, "name": "pve1", "status": "online",
                       "cpu_usage": 12.5, "ram_usage": 40.0, "disk_usage": 55.1, "vm_count": 4}],
            "vms": [{"id": 9, "name": "web", "vmid": 101, "status": "running",
                     "cpu_usage": 0, "ram_mb": null, "node_name": "pve1"}]
        }"#;

        let stats: ClusterStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.cluster.id, ClusterId::new("3"));
        assert_eq!(stats.vms[0].ram_mb, None);
        assert_eq!(
            stats.summary(),
            "pve-east (3): 2/3 nodes online, 8/10 VMs running"
        );
    }
}
