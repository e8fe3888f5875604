//! Terminal rendering of the dashboard page
//!
//! Keeps page state in a [`MemoryPage`] and prints what a browser would
//! show: toasts as they appear, and a counter line whenever a refresh
//! changed something.

use clustersync::render::{LAST_UPDATED_SLOT, STAT_SLOTS};
use clustersync::{Button, ButtonId, MemoryPage, Page, Toast, ToastId, ToastKind};

/// Button that triggers a sync of every cluster
pub const SYNC_ALL_BUTTON: &str = "sync-all";

pub struct TerminalPage {
    inner: MemoryPage,
    /// Slots that pulsed since the last printed counter line
    changed: usize,
    /// Print the next refresh even if nothing changed
    reloaded: bool,
}

impl TerminalPage {
    pub fn new() -> Self {
        let mut inner = MemoryPage::new();
        for entry in STAT_SLOTS.iter().filter(|s| !s.slot.starts_with("sidebar-")) {
            inner = inner.with_slot(entry.slot, "-");
        }
        inner = inner
            .with_slot(LAST_UPDATED_SLOT, "never")
            .with_button(Button::sync_trigger(SYNC_ALL_BUTTON, "Sync All"));

        Self {
            inner,
            changed: 0,
            reloaded: false,
        }
    }

    /// Button ID used for a cluster's sync button, added on first use
    pub fn cluster_button(&mut self, cluster: &str) -> ButtonId {
        let id = ButtonId::new(format!("sync-{cluster}"));
        if self.inner.button(&id).is_none() {
            self.inner = std::mem::take(&mut self.inner)
                .with_button(Button::sync_trigger(id.as_str(), "Sync"));
        }
        id
    }

    /// One-line view of the counters
    pub fn summary_line(&self) -> String {
        let text = |slot: &str| self.inner.slot_text(slot).unwrap_or_default();
        format!(
            "[{}] VMs {}/{} running, {} stopped | nodes {}/{} online | CPU {} | RAM {}",
            text(LAST_UPDATED_SLOT),
            text("running-vms"),
            text("total-vms"),
            text("stopped-vms"),
            text("online-nodes"),
            text("total-nodes"),
            text("avg-cpu"),
            text("avg-ram"),
        )
    }

    /// Labels of buttons currently showing their busy state
    pub fn busy_buttons(&self) -> Vec<String> {
        self.inner
            .buttons()
            .iter()
            .filter(|b| b.disabled)
            .map(|b| format!("{} ({})", b.id.as_str(), b.label))
            .collect()
    }
}

impl Default for TerminalPage {
    fn default() -> Self {
        Self::new()
    }
}

fn badge(kind: ToastKind) -> &'static str {
    match kind {
        ToastKind::Success => "[ok]",
        ToastKind::Error => "[error]",
        ToastKind::Info => "[info]",
        ToastKind::Warning => "[warn]",
    }
}

impl Page for TerminalPage {
    fn slot_text(&self, slot: &str) -> Option<String> {
        self.inner.slot_text(slot)
    }

    fn set_slot_text(&mut self, slot: &str, text: &str) {
        self.inner.set_slot_text(slot, text);
    }

    fn pulse(&mut self, slot: &str) {
        self.changed += 1;
        self.inner.pulse(slot);
    }

    fn flash(&mut self, slot: &str, color: &str) {
        self.inner.flash(slot, color);
        // The projector flashes "last updated" once per refresh, after
        // every counter has been written
        if slot == LAST_UPDATED_SLOT && (self.changed > 0 || self.reloaded) {
            println!("{}", self.summary_line());
            self.changed = 0;
            self.reloaded = false;
        }
    }

    fn append_toast(&mut self, toast: Toast) -> ToastId {
        println!("{} {}", badge(toast.kind), toast.message);
        self.inner.append_toast(toast)
    }

    fn toast_leaving(&mut self, id: ToastId) {
        self.inner.toast_leaving(id);
    }

    fn remove_toast(&mut self, id: ToastId) {
        self.inner.remove_toast(id);
    }

    fn button(&self, id: &ButtonId) -> Option<&Button> {
        self.inner.button(id)
    }

    fn button_mut(&mut self, id: &ButtonId) -> Option<&mut Button> {
        self.inner.button_mut(id)
    }

    fn sync_buttons(&self) -> Vec<ButtonId> {
        self.inner.sync_buttons()
    }

    fn reload(&mut self) {
        self.inner.reload();
        println!("-- reloaded --");
        self.changed = 0;
        self.reloaded = true;
    }
}
