//! In-memory page implementation
//!
//! Used by tests and by front-ends that render from a snapshot of page
//! state rather than reacting to each change.

use std::collections::BTreeMap;

use super::{Button, ButtonId, Page, ToastContainer};
use crate::render::{LAST_UPDATED_SLOT, STAT_SLOTS, Toast, ToastId};

#[derive(Debug, Default)]
struct Slot {
    text: String,
    pulses: u32,
    flash: Option<String>,
}

/// In-memory implementation of [`Page`]
#[derive(Debug, Default)]
pub struct MemoryPage {
    slots: BTreeMap<String, Slot>,
    buttons: Vec<Button>,
    toast_container: Option<ToastContainer>,
    reloads: u32,
}

impl MemoryPage {
    /// An empty page: no slots, no buttons, no toast container
    pub fn new() -> Self {
        Self::default()
    }

    /// A page carrying every stat slot plus the "last updated" slot
    pub fn dashboard() -> Self {
        let mut page = Self::new();
        for slot in STAT_SLOTS {
            page = page.with_slot(slot.slot, "0");
        }
        page.with_slot(LAST_UPDATED_SLOT, "")
    }

    pub fn with_slot(mut self, slot: &str, text: &str) -> Self {
        self.slots.insert(
            slot.to_string(),
            Slot {
                text: text.to_string(),
                ..Slot::default()
            },
        );
        self
    }

    pub fn with_button(mut self, button: Button) -> Self {
        self.buttons.push(button);
        self
    }

    /// How many times a slot has pulsed
    pub fn pulse_count(&self, slot: &str) -> u32 {
        self.slots.get(slot).map_or(0, |s| s.pulses)
    }

    /// Color of the most recent flash on a slot
    pub fn flash_color(&self, slot: &str) -> Option<&str> {
        self.slots.get(slot).and_then(|s| s.flash.as_deref())
    }

    /// The toast container, if any toast was ever shown
    pub fn toast_container(&self) -> Option<&ToastContainer> {
        self.toast_container.as_ref()
    }

    /// Toasts currently in the container
    pub fn toasts(&self) -> &[Toast] {
        self.toast_container
            .as_ref()
            .map(|container| container.toasts())
            .unwrap_or(&[])
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    pub fn reload_count(&self) -> u32 {
        self.reloads
    }
}

impl Page for MemoryPage {
    fn slot_text(&self, slot: &str) -> Option<String> {
        self.slots.get(slot).map(|s| s.text.clone())
    }

    fn set_slot_text(&mut self, slot: &str, text: &str) {
        if let Some(s) = self.slots.get_mut(slot) {
            s.text = text.to_string();
        }
    }

    fn pulse(&mut self, slot: &str) {
        if let Some(s) = self.slots.get_mut(slot) {
            s.pulses += 1;
        }
    }

    fn flash(&mut self, slot: &str, color: &str) {
        if let Some(s) = self.slots.get_mut(slot) {
            s.flash = Some(color.to_string());
        }
    }

    fn append_toast(&mut self, toast: Toast) -> ToastId {
        self.toast_container
            .get_or_insert_with(ToastContainer::new)
            .push(toast)
    }

    fn toast_leaving(&mut self, id: ToastId) {
        if let Some(container) = self.toast_container.as_mut() {
            container.set_leaving(id);
        }
    }

    fn remove_toast(&mut self, id: ToastId) {
        if let Some(container) = self.toast_container.as_mut() {
            container.remove(id);
        }
    }

    fn button(&self, id: &ButtonId) -> Option<&Button> {
        self.buttons.iter().find(|b| &b.id == id)
    }

    fn button_mut(&mut self, id: &ButtonId) -> Option<&mut Button> {
        self.buttons.iter_mut().find(|b| &b.id == id)
    }

    fn sync_buttons(&self) -> Vec<ButtonId> {
        self.buttons
            .iter()
            .filter(|b| b.sync_trigger)
            .map(|b| b.id.clone())
            .collect()
    }

    fn reload(&mut self) {
        self.reloads += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ToastKind;

    #[test]
    fn test_container_created_lazily() {
        let mut page = MemoryPage::new();
        assert!(page.toast_container().is_none());
        assert!(page.toasts().is_empty());

        page.append_toast(Toast::new(ToastKind::Success, "done"));
        assert!(page.toast_container().is_some());
        assert_eq!(page.toasts().len(), 1);
    }

    #[test]
    fn test_absent_slot_is_ignored() {
        let mut page = MemoryPage::new().with_slot("total-vms", "3");
        page.set_slot_text("running-vms", "2");
        page.pulse("running-vms");

        assert_eq!(page.slot_text("running-vms"), None);
        assert_eq!(page.slot_text("total-vms").as_deref(), Some("3"));
    }

    #[test]
    fn test_sync_buttons_only_lists_marked() {
        let page = MemoryPage::new()
            .with_button(Button::sync_trigger("sync-1", "Sync"))
            .with_button(Button::new("logout", "Log out"))
            .with_button(Button::sync_trigger("sync-all", "Sync All"));

        assert_eq!(
            page.sync_buttons(),
            vec![ButtonId::new("sync-1"), ButtonId::new("sync-all")]
        );
    }
}
