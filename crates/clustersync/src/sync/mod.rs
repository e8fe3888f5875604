//! Sync coordination: triggering sync jobs and polling for their effects
//!
//! The coordinator owns the set of syncing clusters and every timer. It is
//! single-threaded: the host calls actions and [`SyncCoordinator::run_due`]
//! from one loop, and nothing here blocks except the HTTP calls themselves.

mod coordinator;
mod timers;
mod timing;

pub use coordinator::{BUSY_ALL_LABEL, BUSY_LABEL, COMPLETED_MESSAGE, SyncCoordinator, SyncStartError};
pub use timers::{DueTimer, TimerId, TimerKind, TimerQueue};
pub use timing::{Clock, CompletionPolicy, FixedDelay, ManualClock, SystemClock};
