// --- File: crates/agendador_gcal/src/guard.rs ---
//! Re-validation of a single slot right before it is committed.

use agendador_common::{BookingError, CalendarReader, SharedProperty};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

use crate::slot::{Slot, SlotKey};

pub const SLOT_TAKEN_MESSAGE: &str = "That time was just taken. Please choose another slot.";

/// Which check found the conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictReason {
    /// A booking with the same slot key exists.
    SlotKeyTaken,
    /// Some calendar entry overlaps the slot.
    Overlap,
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictReason::SlotKeyTaken => f.write_str("slot key already booked"),
            ConflictReason::Overlap => f.write_str("overlaps a busy window"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotConflict {
    pub slot_key: SlotKey,
    pub reason: ConflictReason,
    pub message: String,
}

impl SlotConflict {
    fn new(slot_key: SlotKey, reason: ConflictReason) -> Self {
        Self {
            slot_key,
            reason,
            message: SLOT_TAKEN_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Proceed(Slot),
    Conflict(SlotConflict),
}

/// Two sequential checks against the calendar: slot key, then free/busy overlap.
///
/// Nothing is locked. Two callers can both get `Proceed` for the same slot; the
/// slot key written at commit makes the loser visible to later checks.
#[derive(Clone)]
pub struct ConflictGuard {
    reader: Arc<dyn CalendarReader>,
    calendar_id: String,
}

impl ConflictGuard {
    pub fn new(reader: Arc<dyn CalendarReader>, calendar_id: impl Into<String>) -> Self {
        Self {
            reader,
            calendar_id: calendar_id.into(),
        }
    }

    pub async fn check_and_reserve(&self, slot: Slot) -> Result<GuardOutcome, BookingError> {
        let key = slot.key();
        let day = slot.day_window();
        let lookup = slot.lookup_window();

        let property = SharedProperty::slot_key(key.as_str());
        let tagged = self
            .reader
            .list_events_by_shared_property(&self.calendar_id, day.start, day.end, &property)
            .await
            .map_err(|e| {
                error!("slot key lookup for {} failed: {}", key, e);
                e.into_read_error()
            })?;
        if tagged
            .iter()
            .any(|ev| ev.slot_key.as_deref() == Some(key.as_str()))
        {
            info!("slot {} rejected: {}", key, ConflictReason::SlotKeyTaken);
            return Ok(GuardOutcome::Conflict(SlotConflict::new(
                key,
                ConflictReason::SlotKeyTaken,
            )));
        }

        let busy = self
            .reader
            .query_free_busy(&self.calendar_id, lookup.start, lookup.end, slot.tz().name())
            .await
            .map_err(|e| {
                error!("free/busy check for {} failed: {}", key, e);
                e.into_read_error()
            })?;
        let window = slot.window();
        if busy.iter().any(|b| b.window().overlaps(&window)) {
            info!("slot {} rejected: {}", key, ConflictReason::Overlap);
            return Ok(GuardOutcome::Conflict(SlotConflict::new(
                key,
                ConflictReason::Overlap,
            )));
        }

        Ok(GuardOutcome::Proceed(slot))
    }
}
