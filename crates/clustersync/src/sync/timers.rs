//! Cancellable one-shot and repeating timers
//!
//! Nothing here sleeps. The owner asks for due timers with [`TimerQueue::pop_due`]
//! and decides what firing means.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::render::ToastId;

/// Handle to a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Slow stats refresh, runs for the page's lifetime
    BackgroundPoll,
    /// Fast stats refresh while clusters are syncing
    SyncPoll,
    /// Completion heuristic: declare the current batch finished
    Completion,
    /// Reload the page after completion
    Reload,
    /// Start the exit animation of a toast
    ToastExit(ToastId),
    /// Drop a toast from the container
    ToastRemove(ToastId),
}

/// A timer that has come due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueTimer {
    pub id: TimerId,
    pub kind: TimerKind,
    /// When the timer was meant to fire; use this, not the clock, as "now"
    /// for anything the handler schedules
    pub deadline: Instant,
}

#[derive(Debug, Clone)]
struct Timer {
    kind: TimerKind,
    deadline: Instant,
    period: Option<Duration>,
}

/// Set of pending timers keyed by handle
#[derive(Debug, Default)]
pub struct TimerQueue {
    next_id: u64,
    timers: HashMap<TimerId, Timer>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire once at `deadline`
    pub fn schedule_once(&mut self, kind: TimerKind, deadline: Instant) -> TimerId {
        self.insert(Timer {
            kind,
            deadline,
            period: None,
        })
    }

    /// Fire at `first` and every `period` after that until cancelled
    pub fn schedule_repeating(
        &mut self,
        kind: TimerKind,
        first: Instant,
        period: Duration,
    ) -> TimerId {
        // A zero period would make pop_due spin forever
        let period = period.max(Duration::from_millis(1));
        self.insert(Timer {
            kind,
            deadline: first,
            period: Some(period),
        })
    }

    fn insert(&mut self, timer: Timer) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.timers.insert(id, timer);
        id
    }

    /// Cancel a timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    /// Deadline of an active timer
    pub fn deadline(&self, id: TimerId) -> Option<Instant> {
        self.timers.get(&id).map(|t| t.deadline)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Number of active timers of the given kind
    pub fn count(&self, kind: TimerKind) -> usize {
        self.timers.values().filter(|t| t.kind == kind).count()
    }

    /// Earliest deadline among active timers
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.values().map(|t| t.deadline).min()
    }

    /// Take the earliest timer due at `now`
    ///
    /// Ties go to the timer scheduled first. Repeating timers stay queued
    /// with their deadline moved one period on, so a long jump in `now`
    /// yields every missed tick in order.
    pub fn pop_due(&mut self, now: Instant) -> Option<DueTimer> {
        let (&id, _) = self
            .timers
            .iter()
            .filter(|(_, t)| t.deadline <= now)
            .min_by_key(|(id, t)| (t.deadline, **id))?;

        let timer = self.timers.get_mut(&id)?;
        let due = DueTimer {
            id,
            kind: timer.kind,
            deadline: timer.deadline,
        };

        match timer.period {
            Some(period) => timer.deadline += period,
            None => {
                self.timers.remove(&id);
            }
        }

        Some(due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_one_shot_fires_once() {
        let mut timers = TimerQueue::new();
        let t0 = Instant::now();
        let id = timers.schedule_once(TimerKind::Reload, t0 + ms(1000));

        assert!(timers.pop_due(t0 + ms(999)).is_none());
        let due = timers.pop_due(t0 + ms(1000)).unwrap();
        assert_eq!(due.id, id);
        assert_eq!(due.deadline, t0 + ms(1000));
        assert!(!timers.is_active(id));
        assert!(timers.pop_due(t0 + ms(5000)).is_none());
    }

    #[test]
    fn test_repeating_catches_up_in_order() {
        let mut timers = TimerQueue::new();
        let t0 = Instant::now();
        timers.schedule_repeating(TimerKind::SyncPoll, t0 + ms(2000), ms(2000));

        let mut fired = Vec::new();
        while let Some(due) = timers.pop_due(t0 + ms(7000)) {
            fired.push(due.deadline - t0);
        }

        assert_eq!(fired, vec![ms(2000), ms(4000), ms(6000)]);
        assert_eq!(timers.next_deadline(), Some(t0 + ms(8000)));
    }

    #[test]
    fn test_due_timers_come_out_by_deadline_then_schedule_order() {
        let mut timers = TimerQueue::new();
        let t0 = Instant::now();
        let late = timers.schedule_once(TimerKind::Completion, t0 + ms(5000));
        let first = timers.schedule_once(TimerKind::Reload, t0 + ms(1000));
        let tie = timers.schedule_once(TimerKind::BackgroundPoll, t0 + ms(1000));

        let order: Vec<TimerId> = std::iter::from_fn(|| timers.pop_due(t0 + ms(5000)))
            .map(|d| d.id)
            .collect();
        assert_eq!(order, vec![first, tie, late]);
    }

    #[test]
    fn test_cancel() {
        let mut timers = TimerQueue::new();
        let t0 = Instant::now();
        let id = timers.schedule_repeating(TimerKind::BackgroundPoll, t0, ms(30_000));

        assert!(timers.cancel(id));
        assert!(!timers.cancel(id));
        assert!(timers.is_empty());
        assert!(timers.pop_due(t0 + ms(60_000)).is_none());
    }

    #[test]
    fn test_count_by_kind() {
        let mut timers = TimerQueue::new();
        let t0 = Instant::now();
        timers.schedule_once(TimerKind::ToastExit(ToastId(1)), t0);
        timers.schedule_once(TimerKind::ToastExit(ToastId(2)), t0);
        timers.schedule_repeating(TimerKind::SyncPoll, t0, ms(2000));

        assert_eq!(timers.count(TimerKind::SyncPoll), 1);
        assert_eq!(timers.count(TimerKind::ToastExit(ToastId(1))), 1);
        assert_eq!(timers.len(), 3);
    }
}
