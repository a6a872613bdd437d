// --- File: crates/agendador_gcal/src/availability.rs ---
use agendador_common::{
    input_format_error, BookingError, CalendarReader, SharedProperty, TimeWindow,
};
use agendador_config::AvailabilityMode;
use chrono::NaiveDate;
use chrono_tz::Tz;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, error};

use crate::slot::Slot;
use crate::timezone;

/// Free/busy answer per candidate slot, keyed by `HH:mm`.
pub type AvailabilityMap = BTreeMap<String, bool>;

/// Computes which candidate slots of a day are free.
#[derive(Clone)]
pub struct AvailabilityResolver {
    reader: Arc<dyn CalendarReader>,
    calendar_id: String,
    creator_tag: String,
}

impl AvailabilityResolver {
    pub fn new(
        reader: Arc<dyn CalendarReader>,
        calendar_id: impl Into<String>,
        creator_tag: impl Into<String>,
    ) -> Self {
        Self {
            reader,
            calendar_id: calendar_id.into(),
            creator_tag: creator_tag.into(),
        }
    }

    /// Resolves every candidate with one calendar read.
    ///
    /// Candidates are validated before the read. A failed read is an error,
    /// never an all-free answer.
    pub async fn resolve(
        &self,
        date: NaiveDate,
        tz: Tz,
        duration_minutes: u32,
        candidates: &[String],
        mode: AvailabilityMode,
    ) -> Result<AvailabilityMap, BookingError> {
        if candidates.is_empty() {
            return Err(input_format_error("at least one candidate slot is required"));
        }
        let slots = candidates
            .iter()
            .map(|c| Slot::new(date, timezone::parse_time(c)?, duration_minutes, tz))
            .collect::<Result<Vec<_>, _>>()?;

        let (day_start, day_end) = timezone::day_bounds(date, tz)?;
        // Late slots may run past midnight.
        let busy_end = slots
            .iter()
            .map(Slot::end_utc)
            .fold(day_end, |latest, end| latest.max(end));
        debug!(
            "resolving {} slots on {} ({}) in {} mode, window {} .. {}",
            slots.len(),
            date,
            tz,
            mode,
            day_start,
            day_end
        );

        let availability: AvailabilityMap = match mode {
            AvailabilityMode::SelfCreatedOnly => {
                let property = SharedProperty::created_by(self.creator_tag.as_str());
                let events = self
                    .reader
                    .list_events_by_shared_property(&self.calendar_id, day_start, day_end, &property)
                    .await
                    .map_err(|e| {
                        error!("listing tagged events failed: {}", e);
                        e.into_read_error()
                    })?;
                let taken: HashSet<String> =
                    events.into_iter().filter_map(|ev| ev.slot_key).collect();

                slots
                    .iter()
                    .map(|slot| (slot.start_label(), !taken.contains(slot.key().as_str())))
                    .collect()
            }
            AvailabilityMode::AnyEvent => {
                let busy = self
                    .reader
                    .query_free_busy(&self.calendar_id, day_start, busy_end, tz.name())
                    .await
                    .map_err(|e| {
                        error!("free/busy query failed: {}", e);
                        e.into_read_error()
                    })?;
                let busy: Vec<TimeWindow> = busy.iter().map(|b| *b.window()).collect();

                slots
                    .iter()
                    .map(|slot| {
                        let window = slot.window();
                        (slot.start_label(), !busy.iter().any(|b| b.overlaps(&window)))
                    })
                    .collect()
            }
        };

        Ok(availability)
    }
}
