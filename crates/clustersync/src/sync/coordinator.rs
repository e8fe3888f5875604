//! The sync coordinator
//!
//! Coordinates between the dashboard backend, the page and the timers:
//! 1. An action asks the backend to start a sync job
//! 2. Accepted clusters join the sync set and the fast poll starts
//! 3. A fixed grace period later the batch is declared complete and the
//!    page is reloaded
//!
//! A background poll refreshes the same counters independently of all this.

use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::timers::{DueTimer, TimerId, TimerKind, TimerQueue};
use super::timing::{Clock, CompletionPolicy, FixedDelay};
use crate::config::{MAX_DELAY, SyncSettings};
use crate::dashboard::DashboardApi;
use crate::dashboard::api::SyncStartResponse;
use crate::models::{ClusterId, ClusterStats, SyncSet};
use crate::page::{ButtonId, Page};
use crate::render::{NotificationSink, StatsProjector, ToastKind};

/// Label shown on a cluster's sync button while its request is out
pub const BUSY_LABEL: &str = "Syncing...";

/// Label shown on the sync-all button while its request is out
pub const BUSY_ALL_LABEL: &str = "Syncing All...";

/// Toast shown when the completion heuristic fires
pub const COMPLETED_MESSAGE: &str = "Sync completed!";

const ALREADY_SYNCING_MESSAGE: &str = "Sync already in progress for this cluster";

/// Why a sync job was not started
#[derive(Debug, thiserror::Error)]
pub enum SyncStartError {
    /// Network, HTTP status or decoding failure
    #[error("Failed to initiate sync")]
    RequestFailed { reason: String },
    /// The backend answered, but not with "started"
    #[error("{}", rejection_message(.message))]
    Rejected { status: String, message: String },
}

impl SyncStartError {
    fn request_failed(err: anyhow::Error) -> Self {
        Self::RequestFailed {
            reason: format!("{err:#}"),
        }
    }

    /// Detail for the log line; the toast only shows `Display`
    fn detail(&self) -> String {
        match self {
            Self::RequestFailed { reason } => reason.clone(),
            Self::Rejected { status, message } => format!("status {status:?}: {message}"),
        }
    }
}

fn rejection_message(message: &str) -> &str {
    if message.trim().is_empty() {
        "Sync was not started"
    } else {
        message
    }
}

/// Owns the sync set and every timer, and renders outcomes onto the page
///
/// Construct once at startup, call [`start`](Self::start), then drive it
/// by calling actions and [`run_due`](Self::run_due). Call
/// [`shutdown`](Self::shutdown) on teardown.
pub struct SyncCoordinator<P: Page> {
    api: Arc<dyn DashboardApi>,
    page: P,
    clock: Arc<dyn Clock>,
    policy: Box<dyn CompletionPolicy>,
    notifier: NotificationSink,
    projector: StatsProjector,
    background_interval: Duration,
    fast_interval: Duration,
    reload_delay: Duration,
    syncing: SyncSet,
    timers: TimerQueue,
    background_poll: Option<TimerId>,
    sync_poll: Option<TimerId>,
    completion: Option<TimerId>,
    reload: Option<TimerId>,
}

impl<P: Page> SyncCoordinator<P> {
    /// Create a coordinator. Nothing is polled until [`start`](Self::start).
    pub fn new(
        api: Arc<dyn DashboardApi>,
        page: P,
        clock: Arc<dyn Clock>,
        settings: &SyncSettings,
    ) -> Self {
        Self {
            api,
            page,
            clock,
            policy: Box::new(FixedDelay(settings.completion_delay())),
            notifier: NotificationSink::new(settings.toast_duration()),
            projector: StatsProjector::new(),
            background_interval: settings.background_interval(),
            fast_interval: settings.fast_interval(),
            reload_delay: settings.reload_delay(),
            syncing: SyncSet::new(),
            timers: TimerQueue::new(),
            background_poll: None,
            sync_poll: None,
            completion: None,
            reload: None,
        }
    }

    /// Replace the completion heuristic
    pub fn with_completion_policy(mut self, policy: impl CompletionPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    /// Replace the stat slot table
    pub fn with_projector(mut self, projector: StatsProjector) -> Self {
        self.projector = projector;
        self
    }

    /// Refresh stats once and start the background poll
    ///
    /// Calling this again while the background poll runs does nothing.
    pub fn start(&mut self) {
        if self.background_poll.is_some() {
            debug!("Background refresh already running");
            return;
        }

        let now = self.clock.now();
        info!(
            "Starting background stats refresh every {}s",
            self.background_interval.as_secs()
        );
        self.refresh_dashboard("background");
        self.background_poll = Some(self.timers.schedule_repeating(
            TimerKind::BackgroundPoll,
            now + self.background_interval,
            self.background_interval,
        ));
    }

    /// Stop every loop and pending timer
    pub fn shutdown(&mut self) {
        self.background_poll = None;
        self.sync_poll = None;
        self.completion = None;
        self.reload = None;
        self.timers.cancel_all();
        info!("Sync coordinator stopped");
    }

    /// Start a sync for one cluster
    ///
    /// A cluster already in the sync set is not requested again; the user
    /// gets a warning instead.
    pub fn sync_one(&mut self, cluster_id: &ClusterId, button: Option<&ButtonId>) {
        if self.syncing.contains(cluster_id) {
            warn!("Sync already in progress for cluster {}", cluster_id);
            let now = self.clock.now();
            self.toast(now, ALREADY_SYNCING_MESSAGE, ToastKind::Warning);
            return;
        }

        // Optimistic: the guard above must see the cluster while the
        // request is out
        self.syncing.insert(cluster_id.clone());
        self.mark_busy(button, BUSY_LABEL);
        info!("Requesting sync for cluster {}", cluster_id);

        let outcome = self
            .api
            .start_sync(cluster_id)
            .map_err(SyncStartError::request_failed)
            .and_then(accepted);
        let now = self.clock.now();

        match outcome {
            Ok(response) => {
                info!("Sync started for cluster {}", cluster_id);
                self.toast(now, started_message(&response.message), ToastKind::Success);
                self.start_sync_polling(now);
            }
            Err(err) => {
                error!("Sync for cluster {} not started: {}", cluster_id, err.detail());
                self.toast(now, &err.to_string(), ToastKind::Error);
                self.syncing.remove(cluster_id);
                self.restore_button(button);
            }
        }
    }

    /// Start a sync for every cluster the backend knows
    ///
    /// Clusters join the sync set only once the backend has accepted, so a
    /// failure has nothing to roll back beyond the button.
    pub fn sync_all(&mut self, button: Option<&ButtonId>) {
        self.mark_busy(button, BUSY_ALL_LABEL);
        info!("Requesting sync for all clusters");

        let outcome = self
            .api
            .start_sync_all()
            .map_err(SyncStartError::request_failed)
            .and_then(|response| {
                if response.is_started() {
                    Ok(response)
                } else {
                    Err(SyncStartError::Rejected {
                        status: response.status,
                        message: response.message,
                    })
                }
            });
        let now = self.clock.now();

        match outcome {
            Ok(response) => {
                info!("Sync started for {} cluster(s)", response.tasks.len());
                self.toast(now, started_message(&response.message), ToastKind::Success);
                self.syncing
                    .extend(response.tasks.into_iter().map(|task| task.cluster_id));
                self.start_sync_polling(now);
            }
            Err(err) => {
                error!("Sync for all clusters not started: {}", err.detail());
                self.toast(now, &err.to_string(), ToastKind::Error);
                self.restore_button(button);
            }
        }
    }

    /// Fetch one cluster's stats and log them
    ///
    /// Failures are logged only, like poll failures.
    pub fn refresh_cluster_stats(&self, cluster_id: &ClusterId) -> Option<ClusterStats> {
        match self.api.cluster_stats(cluster_id) {
            Ok(stats) => {
                info!("Cluster stats updated: {}", stats.summary());
                Some(stats)
            }
            Err(e) => {
                warn!("Failed to refresh stats for cluster {}: {:#}", cluster_id, e);
                None
            }
        }
    }

    /// Fire every timer due at the clock's current time, in deadline order.
    ///
    /// Returns how many timers fired.
    pub fn run_due(&mut self) -> usize {
        let now = self.clock.now();
        let mut fired = 0;

        while let Some(due) = self.timers.pop_due(now) {
            fired += 1;
            self.dispatch(due);
        }

        fired
    }

    /// When the host should call [`run_due`](Self::run_due) next
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    /// Clusters currently believed to be syncing
    pub fn syncing(&self) -> &SyncSet {
        &self.syncing
    }

    pub fn is_syncing(&self, cluster_id: &ClusterId) -> bool {
        self.syncing.contains(cluster_id)
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    pub fn is_background_polling(&self) -> bool {
        self.background_poll.is_some_and(|id| self.timers.is_active(id))
    }

    pub fn is_sync_polling(&self) -> bool {
        self.sync_poll.is_some_and(|id| self.timers.is_active(id))
    }

    /// When the current batch will be declared complete
    pub fn completion_deadline(&self) -> Option<Instant> {
        self.completion.and_then(|id| self.timers.deadline(id))
    }

    /// When the pending page reload will happen
    pub fn reload_deadline(&self) -> Option<Instant> {
        self.reload.and_then(|id| self.timers.deadline(id))
    }

    fn dispatch(&mut self, due: DueTimer) {
        match due.kind {
            TimerKind::BackgroundPoll => self.refresh_dashboard("background"),
            TimerKind::SyncPoll => self.on_sync_poll(due.id),
            TimerKind::Completion => self.on_completion(due.deadline),
            TimerKind::Reload => {
                self.reload = None;
                info!("Reloading page");
                self.page.reload();
                self.refresh_dashboard("reload");
            }
            TimerKind::ToastExit(id) => {
                self.notifier
                    .begin_exit(&mut self.page, &mut self.timers, due.deadline, id)
            }
            TimerKind::ToastRemove(id) => self.page.remove_toast(id),
        }
    }

    /// (Re)start the fast poll and re-arm the completion timer
    fn start_sync_polling(&mut self, now: Instant) {
        if let Some(id) = self.sync_poll.take() {
            self.timers.cancel(id);
        }
        if let Some(id) = self.completion.take() {
            self.timers.cancel(id);
        }

        self.sync_poll = Some(self.timers.schedule_repeating(
            TimerKind::SyncPoll,
            now + self.fast_interval,
            self.fast_interval,
        ));

        let delay = self.policy.estimate_completion(now).min(MAX_DELAY);
        self.completion = Some(self.timers.schedule_once(TimerKind::Completion, now + delay));
        debug!(
            "Fast refresh every {}s, completion assumed in {}ms",
            self.fast_interval.as_secs(),
            delay.as_millis()
        );
    }

    fn on_sync_poll(&mut self, id: TimerId) {
        if self.syncing.is_empty() {
            debug!("Nothing syncing, stopping fast refresh");
            self.timers.cancel(id);
            if self.sync_poll == Some(id) {
                self.sync_poll = None;
            }
            return;
        }

        self.refresh_dashboard("sync");
    }

    fn on_completion(&mut self, at: Instant) {
        self.completion = None;
        info!("Assuming sync finished for {} cluster(s)", self.syncing.len());
        self.syncing.clear();
        self.toast(at, COMPLETED_MESSAGE, ToastKind::Success);

        for id in self.page.sync_buttons() {
            if let Some(button) = self.page.button_mut(&id) {
                button.restore();
                button.disabled = false;
            }
        }

        if let Some(id) = self.sync_poll.take() {
            self.timers.cancel(id);
        }
        if let Some(id) = self.reload.take() {
            self.timers.cancel(id);
        }
        self.reload = Some(self.timers.schedule_once(TimerKind::Reload, at + self.reload_delay));
    }

    fn refresh_dashboard(&mut self, source: &str) {
        match self.api.dashboard_stats() {
            Ok(response) => {
                let refreshed_at = self.clock.wall_now();
                let changed = self
                    .projector
                    .project(&mut self.page, &response.stats, refreshed_at);
                debug!("{} refresh: {} slot(s) changed", source, changed);
            }
            Err(e) => warn!("Failed to refresh dashboard ({} poll): {:#}", source, e),
        }
    }

    fn toast(&mut self, now: Instant, message: &str, kind: ToastKind) {
        self.notifier
            .notify(&mut self.page, &mut self.timers, now, message, kind);
    }

    fn mark_busy(&mut self, button: Option<&ButtonId>, label: &str) {
        let Some(id) = button else {
            return;
        };
        match self.page.button_mut(id) {
            Some(button) => button.mark_busy(label),
            None => debug!("Button {} is not on the page", id.as_str()),
        }
    }

    fn restore_button(&mut self, button: Option<&ButtonId>) {
        if let Some(button) = button.and_then(|id| self.page.button_mut(id)) {
            button.restore();
        }
    }
}

fn accepted(response: SyncStartResponse) -> Result<SyncStartResponse, SyncStartError> {
    if response.is_started() {
        Ok(response)
    } else {
        Err(SyncStartError::Rejected {
            status: response.status,
            message: response.message,
        })
    }
}

fn started_message(message: &str) -> &str {
    if message.trim().is_empty() {
        "Sync initiated"
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::{InMemoryDashboard, SyncReply};
    use crate::models::StatsSnapshot;
    use crate::page::{Button, MemoryPage};
    use crate::render::{StatField, StatSlot};
    use crate::sync::ManualClock;

    struct Harness {
        coordinator: SyncCoordinator<MemoryPage>,
        backend: Arc<InMemoryDashboard>,
        clock: Arc<ManualClock>,
    }

    fn harness() -> Harness {
        let backend = Arc::new(InMemoryDashboard::new());
        backend.add_cluster("c1", "pve-east");
        backend.add_cluster("c2", "pve-west");
        let clock = Arc::new(ManualClock::new());
        let page = MemoryPage::dashboard()
            .with_button(Button::sync_trigger("sync-c1", "Sync"))
            .with_button(Button::sync_trigger("sync-all", "Sync All"));

        let coordinator =
            SyncCoordinator::new(backend.clone(), page, clock.clone(), &SyncSettings::default());
        Harness {
            coordinator,
            backend,
            clock,
        }
    }

    #[test]
    fn test_rejection_message_fallback() {
        let err = SyncStartError::Rejected {
            status: "error".to_string(),
            message: String::new(),
        };
        assert_eq!(err.to_string(), "Sync was not started");

        let err = SyncStartError::Rejected {
            status: "busy".to_string(),
            message: "Cluster is locked".to_string(),
        };
        assert_eq!(err.to_string(), "Cluster is locked");
    }

    #[test]
    fn test_request_failure_display_hides_detail() {
        let err = SyncStartError::request_failed(anyhow::anyhow!("connection refused"));
        assert_eq!(err.to_string(), "Failed to initiate sync");
        assert_eq!(err.detail(), "connection refused");
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut h = harness();
        h.coordinator.start();
        h.coordinator.start();

        assert_eq!(h.coordinator.timers().count(TimerKind::BackgroundPoll), 1);
        assert_eq!(h.backend.request_count("/api/dashboard/stats/"), 1);
    }

    #[test]
    fn test_restart_replaces_completion_deadline() {
        let mut h = harness();
        h.coordinator.sync_one(&ClusterId::new("c1"), None);
        let first = h.coordinator.completion_deadline().unwrap();

        h.clock.advance(Duration::from_secs(3));
        h.coordinator.run_due();
        h.coordinator.sync_one(&ClusterId::new("c2"), None);
        let second = h.coordinator.completion_deadline().unwrap();

        assert_eq!(second - first, Duration::from_secs(3));
        assert_eq!(h.coordinator.timers().count(TimerKind::Completion), 1);
        assert_eq!(h.coordinator.timers().count(TimerKind::SyncPoll), 1);
    }

    #[test]
    fn test_custom_completion_policy() {
        struct TenSeconds;
        impl CompletionPolicy for TenSeconds {
            fn estimate_completion(&self, _started_at: Instant) -> Duration {
                Duration::from_secs(10)
            }
        }

        let Harness {
            coordinator,
            backend: _backend,
            clock,
        } = harness();
        let mut coordinator = coordinator.with_completion_policy(TenSeconds);
        coordinator.sync_one(&ClusterId::new("c1"), None);

        clock.advance(Duration::from_secs(5));
        coordinator.run_due();
        assert!(coordinator.is_syncing(&ClusterId::new("c1")));

        clock.advance(Duration::from_secs(5));
        coordinator.run_due();
        assert!(coordinator.syncing().is_empty());
    }

    #[test]
    fn test_custom_projector_drives_refresh() {
        static TOTALS: &[StatSlot] = &[StatSlot {
            field: StatField::TotalVms,
            slot: "vm-total",
        }];

        let backend = Arc::new(InMemoryDashboard::new());
        backend.set_stats(StatsSnapshot {
            total_vms: 7,
            ..StatsSnapshot::default()
        });
        let page = MemoryPage::new()
            .with_slot("vm-total", "0")
            .with_slot("total-vms", "0");

        let mut coordinator = SyncCoordinator::new(
            backend,
            page,
            Arc::new(ManualClock::new()),
            &SyncSettings::default(),
        )
        .with_projector(StatsProjector::with_slots(TOTALS));
        coordinator.start();

        assert_eq!(coordinator.page().slot_text("vm-total").as_deref(), Some("7"));
        assert_eq!(coordinator.page().slot_text("total-vms").as_deref(), Some("0"));
    }

    #[test]
    fn test_oversized_completion_estimate_is_capped() {
        struct Forever;
        impl CompletionPolicy for Forever {
            fn estimate_completion(&self, _started_at: Instant) -> Duration {
                Duration::MAX
            }
        }

        let Harness {
            coordinator,
            backend: _backend,
            clock,
        } = harness();
        let mut coordinator = coordinator.with_completion_policy(Forever);
        coordinator.sync_one(&ClusterId::new("c1"), None);

        assert_eq!(coordinator.completion_deadline(), Some(clock.now() + MAX_DELAY));
    }

    #[test]
    fn test_rejected_sync_rolls_back() {
        let mut h = harness();
        h.backend.set_sync_reply(SyncReply::Rejected {
            status: "error".to_string(),
            message: "Cluster is inactive".to_string(),
        });

        let button = ButtonId::new("sync-c1");
        h.coordinator.sync_one(&ClusterId::new("c1"), Some(&button));

        assert!(h.coordinator.syncing().is_empty());
        assert!(!h.coordinator.is_sync_polling());
        let toast = h.coordinator.page().toasts().last().unwrap();
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.message, "Cluster is inactive");
        let restored = h.coordinator.page().button(&button).unwrap();
        assert_eq!(restored.label, "Sync");
        assert!(!restored.disabled);
    }

    #[test]
    fn test_shutdown_cancels_everything() {
        let mut h = harness();
        h.coordinator.start();
        h.coordinator.sync_one(&ClusterId::new("c1"), None);
        assert!(h.coordinator.is_background_polling());
        assert!(h.coordinator.is_sync_polling());

        h.coordinator.shutdown();
        assert!(!h.coordinator.is_background_polling());
        assert!(!h.coordinator.is_sync_polling());
        assert!(h.coordinator.next_deadline().is_none());

        h.clock.advance(Duration::from_secs(120));
        assert_eq!(h.coordinator.run_due(), 0);
    }

    #[test]
    fn test_cluster_stats_failure_is_swallowed() {
        let h = harness();
        assert!(h.coordinator.refresh_cluster_stats(&ClusterId::new("c1")).is_some());

        h.backend.set_stats_available(false);
        assert!(h.coordinator.refresh_cluster_stats(&ClusterId::new("c1")).is_none());
        assert!(h.coordinator.page().toasts().is_empty());
    }
}
