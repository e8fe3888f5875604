//! Projection of dashboard stats onto page slots
//!
//! Which counter lands in which slot is a table, [`STAT_SLOTS`]; adding a
//! slot to the page means adding a row, not code.

use chrono::{DateTime, Local, Utc};
use log::debug;

use crate::models::StatsSnapshot;
use crate::page::Page;

/// Slot showing when the counters were last refreshed
pub const LAST_UPDATED_SLOT: &str = "last-updated";

/// Tint applied to the "last updated" slot on refresh
pub const HIGHLIGHT_COLOR: &str = "#10b981";

/// A counter in [`StatsSnapshot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatField {
    TotalVms,
    RunningVms,
    StoppedVms,
    TotalNodes,
    OnlineNodes,
    AvgCpu,
    AvgRam,
}

impl StatField {
    /// Display text for this counter
    pub fn render(self, snapshot: &StatsSnapshot) -> String {
        match self {
            Self::TotalVms => snapshot.total_vms.to_string(),
            Self::RunningVms => snapshot.running_vms.to_string(),
            Self::StoppedVms => snapshot.stopped_vms.to_string(),
            Self::TotalNodes => snapshot.total_nodes.to_string(),
            Self::OnlineNodes => snapshot.online_nodes.to_string(),
            Self::AvgCpu => format!("{:.1}%", snapshot.avg_cpu),
            Self::AvgRam => format!("{:.1}%", snapshot.avg_ram),
        }
    }
}

/// Maps a counter to the name of the slot displaying it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatSlot {
    pub field: StatField,
    pub slot: &'static str,
}

const fn slot(field: StatField, slot: &'static str) -> StatSlot {
    StatSlot { field, slot }
}

/// Every stat slot the dashboard and its sidebar can carry
pub const STAT_SLOTS: &[StatSlot] = &[
    slot(StatField::TotalVms, "total-vms"),
    slot(StatField::RunningVms, "running-vms"),
    slot(StatField::StoppedVms, "stopped-vms"),
    slot(StatField::TotalNodes, "total-nodes"),
    slot(StatField::OnlineNodes, "online-nodes"),
    slot(StatField::AvgCpu, "avg-cpu"),
    slot(StatField::AvgRam, "avg-ram"),
    slot(StatField::TotalVms, "sidebar-total-vms"),
    slot(StatField::RunningVms, "sidebar-running-vms"),
    slot(StatField::StoppedVms, "sidebar-stopped-vms"),
    slot(StatField::TotalNodes, "sidebar-total-nodes"),
    slot(StatField::OnlineNodes, "sidebar-online-nodes"),
    slot(StatField::AvgCpu, "sidebar-avg-cpu"),
    slot(StatField::AvgRam, "sidebar-avg-ram"),
];

/// Writes a stats snapshot into whichever slots the page carries
#[derive(Debug, Clone)]
pub struct StatsProjector {
    slots: &'static [StatSlot],
}

impl StatsProjector {
    pub fn new() -> Self {
        Self { slots: STAT_SLOTS }
    }

    /// A projector over a custom slot table
    pub fn with_slots(slots: &'static [StatSlot]) -> Self {
        Self { slots }
    }

    pub fn slots(&self) -> &'static [StatSlot] {
        self.slots
    }

    /// Update every present slot whose text changed and pulse it.
    ///
    /// Absent slots are skipped. Returns the number of stat slots updated;
    /// the "last updated" slot is not counted.
    pub fn project<P: Page + ?Sized>(
        &self,
        page: &mut P,
        snapshot: &StatsSnapshot,
        refreshed_at: DateTime<Utc>,
    ) -> usize {
        let mut updated = 0;

        for entry in self.slots {
            let Some(current) = page.slot_text(entry.slot) else {
                continue;
            };

            let text = entry.field.render(snapshot);
            if current != text {
                page.set_slot_text(entry.slot, &text);
                page.pulse(entry.slot);
                updated += 1;
            }
        }

        if page.slot_text(LAST_UPDATED_SLOT).is_some() {
            let stamp = refreshed_at.with_timezone(&Local).format("%H:%M:%S").to_string();
            page.set_slot_text(LAST_UPDATED_SLOT, &stamp);
            page.flash(LAST_UPDATED_SLOT, HIGHLIGHT_COLOR);
        }

        debug!("Projected stats onto page ({} slots changed)", updated);
        updated
    }
}

impl Default for StatsProjector {
    fn default() -> Self {
        Self::new()
    }
}
