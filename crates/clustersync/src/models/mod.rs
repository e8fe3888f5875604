//! Domain models for cluster sync state and dashboard stats

mod cluster;
mod stats;

pub use cluster::{ClusterId, SyncSet};
pub use stats::{
    ClusterCounts, ClusterInfo, ClusterStats, ClusterSummary, NodeStats, StatsSnapshot, VmStats,
};
