//! Display surface the coordinator renders into
//!
//! The dashboard page is modelled as named text slots, a stack of toasts
//! and a set of buttons. [`MemoryPage`] keeps all of it in memory; a
//! front-end implements [`Page`] to put the same state on screen.

mod memory;

pub use memory::MemoryPage;

use crate::render::{Toast, ToastId, ToastPhase};

/// Trait for the page the coordinator updates
///
/// Lookups by name may miss: pages only carry the slots and buttons their
/// markup includes, and callers skip whatever is absent.
pub trait Page {
    /// Current text of a named slot, `None` if the page has no such slot
    fn slot_text(&self, slot: &str) -> Option<String>;

    /// Replace the text of a slot. No-op for absent slots.
    fn set_slot_text(&mut self, slot: &str, text: &str);

    /// Play the short "value changed" animation on a slot
    fn pulse(&mut self, slot: &str);

    /// Briefly tint a slot with `color`
    fn flash(&mut self, slot: &str, color: &str);

    /// Append a toast to the toast container, creating the container on
    /// first use. Returns the ID assigned to the toast.
    fn append_toast(&mut self, toast: Toast) -> ToastId;

    /// Start the exit animation of a toast
    fn toast_leaving(&mut self, id: ToastId);

    /// Remove a toast from the container
    fn remove_toast(&mut self, id: ToastId);

    fn button(&self, id: &ButtonId) -> Option<&Button>;

    fn button_mut(&mut self, id: &ButtonId) -> Option<&mut Button>;

    /// IDs of every button carrying the sync-trigger marker
    fn sync_buttons(&self) -> Vec<ButtonId>;

    /// Reload the whole page from the server
    fn reload(&mut self);
}

/// Identifier of a button on the page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ButtonId(pub String);

impl ButtonId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ButtonId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The parts of a button a sync action changes and later puts back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonState {
    pub label: String,
    pub disabled: bool,
}

/// A clickable control on the page
#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    pub id: ButtonId,
    pub label: String,
    pub disabled: bool,
    /// Marks the button as a sync trigger, so completion can find and
    /// re-enable it without knowing which one was clicked
    pub sync_trigger: bool,
    /// State saved before the button was switched to its busy look
    pub saved: Option<ButtonState>,
}

impl Button {
    /// A plain button
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: ButtonId::new(id),
            label: label.into(),
            disabled: false,
            sync_trigger: false,
            saved: None,
        }
    }

    /// A button carrying the sync-trigger marker
    pub fn sync_trigger(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            sync_trigger: true,
            ..Self::new(id, label)
        }
    }

    pub fn state(&self) -> ButtonState {
        ButtonState {
            label: self.label.clone(),
            disabled: self.disabled,
        }
    }

    /// Disable the button and show `busy_label`
    ///
    /// Only the first call saves state: saving again would record the busy
    /// look as the "original".
    pub fn mark_busy(&mut self, busy_label: &str) {
        if self.saved.is_none() {
            self.saved = Some(self.state());
        }
        self.disabled = true;
        self.label = busy_label.to_string();
    }

    /// Put back the saved state, if any. Returns whether anything was restored.
    pub fn restore(&mut self) -> bool {
        match self.saved.take() {
            Some(state) => {
                self.label = state.label;
                self.disabled = state.disabled;
                true
            }
            None => false,
        }
    }
}

/// Stacking container for toasts
///
/// Toasts keep insertion order; there is no cap on how many are shown.
#[derive(Debug, Default)]
pub struct ToastContainer {
    next_id: u64,
    toasts: Vec<Toast>,
}

impl ToastContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a toast, assigning it a fresh ID
    pub fn push(&mut self, mut toast: Toast) -> ToastId {
        self.next_id += 1;
        let id = ToastId(self.next_id);
        toast.id = id;
        self.toasts.push(toast);
        id
    }

    pub fn set_leaving(&mut self, id: ToastId) {
        if let Some(toast) = self.toasts.iter_mut().find(|t| t.id == id) {
            toast.phase = ToastPhase::Leaving;
        }
    }

    pub fn remove(&mut self, id: ToastId) -> Option<Toast> {
        let index = self.toasts.iter().position(|t| t.id == id)?;
        Some(self.toasts.remove(index))
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn get(&self, id: ToastId) -> Option<&Toast> {
        self.toasts.iter().find(|t| t.id == id)
    }
}
