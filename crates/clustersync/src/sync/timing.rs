//! Time sources and the completion heuristic
//!
//! The coordinator never reads the system clock directly, so tests can
//! drive every timer with a [`ManualClock`].

use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Source of monotonic and wall-clock time
pub trait Clock: Send + Sync {
    /// Monotonic time used for timer deadlines
    fn now(&self) -> Instant;

    /// Wall-clock time shown to the user
    fn wall_now(&self) -> DateTime<Utc>;
}

/// The real clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    wall_origin: DateTime<Utc>,
    elapsed: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            wall_origin: Utc::now(),
            elapsed: Mutex::new(Duration::ZERO),
        }
    }

    /// Move time forward by `by`
    pub fn advance(&self, by: Duration) {
        if let Ok(mut elapsed) = self.elapsed.lock() {
            *elapsed += by;
        }
    }

    /// Time elapsed since the clock was created
    pub fn elapsed(&self) -> Duration {
        self.elapsed.lock().map(|e| *e).unwrap_or_default()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn wall_now(&self) -> DateTime<Utc> {
        let offset = TimeDelta::from_std(self.elapsed()).unwrap_or(TimeDelta::zero());
        self.wall_origin + offset
    }
}

/// Decides when a batch of sync jobs is assumed to be finished
///
/// The coordinator has no view of real job state. Whatever this returns is
/// taken as the truth: once it elapses, every cluster counts as synced.
pub trait CompletionPolicy: Send + Sync {
    /// Delay after `started_at` at which the batch is declared complete
    fn estimate_completion(&self, started_at: Instant) -> Duration;
}

/// Assume every sync finishes within a fixed delay
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl CompletionPolicy for FixedDelay {
    fn estimate_completion(&self, _started_at: Instant) -> Duration {
        self.0
    }
}
