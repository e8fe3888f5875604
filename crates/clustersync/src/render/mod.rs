//! Rendering helpers: toasts and live stat counters
//!
//! Neither helper keeps state between calls. Everything they draw lives on
//! the [`Page`](crate::page::Page); everything they schedule lives in the
//! coordinator's timer queue.

mod notify;
mod stats;

pub use notify::{NotificationSink, TOAST_EXIT_ANIMATION, Toast, ToastId, ToastKind, ToastPhase};
pub use stats::{
    HIGHLIGHT_COLOR, LAST_UPDATED_SLOT, STAT_SLOTS, StatField, StatSlot, StatsProjector,
};
