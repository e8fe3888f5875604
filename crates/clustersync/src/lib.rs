//! Cluster sync crate - client-side sync status coordination
//!
//! This crate provides the state behind a cluster dashboard's sync buttons:
//! - Domain models (ClusterId, SyncSet, StatsSnapshot)
//! - Dashboard API client and an in-memory backend
//! - A page abstraction with an in-memory implementation
//! - Toast notifications and live stat projection
//! - The sync coordinator with its background and fast poll loops
//!
//! This crate has zero UI dependencies; front-ends implement [`Page`].

pub mod config;
pub mod dashboard;
pub mod models;
pub mod page;
pub mod render;
pub mod sync;

pub use config::SyncSettings;
pub use dashboard::{DashboardApi, DashboardClient, InMemoryDashboard, SyncReply};
pub use models::{ClusterId, ClusterStats, StatsSnapshot, SyncSet};
pub use page::{Button, ButtonId, ButtonState, MemoryPage, Page, ToastContainer};
pub use render::{NotificationSink, StatsProjector, Toast, ToastId, ToastKind, ToastPhase};
pub use sync::{
    // Coordinator
    BUSY_ALL_LABEL, BUSY_LABEL, COMPLETED_MESSAGE, SyncCoordinator, SyncStartError,
    // Timing (inject ManualClock in tests)
    Clock, CompletionPolicy, FixedDelay, ManualClock, SystemClock,
    // Timers
    TimerId, TimerKind, TimerQueue,
};
