//! Transient toast notifications

use log::{error, info, warn};
use std::time::{Duration, Instant};

use crate::page::Page;
use crate::sync::{TimerKind, TimerQueue};

/// How long the slide-out animation runs before a toast is removed
pub const TOAST_EXIT_ANIMATION: Duration = Duration::from_millis(300);

/// Severity of a toast, which picks its color and icon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
    Warning,
}

impl ToastKind {
    /// Parse a kind name; anything unrecognized is treated as info
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "success" => Self::Success,
            "error" => Self::Error,
            "warning" => Self::Warning,
            _ => Self::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
            Self::Warning => "warning",
        }
    }

    /// Background gradient of the toast
    pub fn color(&self) -> &'static str {
        match self {
            Self::Success => "linear-gradient(135deg, #10b981, #34d399)",
            Self::Error => "linear-gradient(135deg, #ef4444, #dc2626)",
            Self::Info => "linear-gradient(135deg, #3b82f6, #60a5fa)",
            Self::Warning => "linear-gradient(135deg, #f59e0b, #fbbf24)",
        }
    }

    /// Bootstrap icon class shown before the message
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Success => "bi-check-circle-fill",
            Self::Error => "bi-x-circle-fill",
            Self::Info => "bi-info-circle-fill",
            Self::Warning => "bi-exclamation-triangle-fill",
        }
    }
}

/// Identifier assigned by the toast container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ToastId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    /// Slid in and readable
    Shown,
    /// Sliding out, about to be removed
    Leaving,
}

/// A rendered notification
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: ToastId,
    pub kind: ToastKind,
    pub message: String,
    pub color: &'static str,
    pub icon: &'static str,
    pub phase: ToastPhase,
}

impl Toast {
    pub fn new(kind: ToastKind, message: impl Into<String>) -> Self {
        Self {
            id: ToastId::default(),
            kind,
            message: message.into(),
            color: kind.color(),
            icon: kind.icon(),
            phase: ToastPhase::Shown,
        }
    }
}

/// Puts toasts on the page and schedules their removal
#[derive(Debug, Clone)]
pub struct NotificationSink {
    duration: Duration,
}

impl NotificationSink {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Show a toast for the default duration
    pub fn notify<P: Page + ?Sized>(
        &self,
        page: &mut P,
        timers: &mut TimerQueue,
        now: Instant,
        message: &str,
        kind: ToastKind,
    ) -> ToastId {
        self.notify_for(page, timers, now, message, kind, self.duration)
    }

    /// Show a toast that starts leaving after `duration`
    pub fn notify_for<P: Page + ?Sized>(
        &self,
        page: &mut P,
        timers: &mut TimerQueue,
        now: Instant,
        message: &str,
        kind: ToastKind,
        duration: Duration,
    ) -> ToastId {
        match kind {
            ToastKind::Error => error!("[toast] {}", message),
            ToastKind::Warning => warn!("[toast] {}", message),
            ToastKind::Success | ToastKind::Info => info!("[toast] {}", message),
        }

        let id = page.append_toast(Toast::new(kind, message));
        timers.schedule_once(TimerKind::ToastExit(id), now + duration);
        id
    }

    /// Start the exit animation and schedule removal once it has run
    pub fn begin_exit<P: Page + ?Sized>(
        &self,
        page: &mut P,
        timers: &mut TimerQueue,
        now: Instant,
        id: ToastId,
    ) {
        page.toast_leaving(id);
        timers.schedule_once(TimerKind::ToastRemove(id), now + TOAST_EXIT_ANIMATION);
    }
}

impl Default for NotificationSink {
    fn default() -> Self {
        Self::new(Duration::from_millis(4000))
    }
}
