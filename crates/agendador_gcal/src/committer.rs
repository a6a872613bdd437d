// --- File: crates/agendador_gcal/src/committer.rs ---
use agendador_common::{
    log_result, BookingError, CalendarEvent, CalendarWriter, EventTime, NewCalendarEvent,
};
use std::sync::Arc;

use crate::booking::ValidatedBooking;

/// Writes bookings to the calendar, tagged with their slot key.
#[derive(Clone)]
pub struct BookingCommitter {
    writer: Arc<dyn CalendarWriter>,
    calendar_id: String,
    business_name: String,
    creator_tag: String,
    notify_email: Option<String>,
}

impl BookingCommitter {
    pub fn new(
        writer: Arc<dyn CalendarWriter>,
        calendar_id: impl Into<String>,
        business_name: impl Into<String>,
        creator_tag: impl Into<String>,
        notify_email: Option<String>,
    ) -> Self {
        Self {
            writer,
            calendar_id: calendar_id.into(),
            business_name: business_name.into(),
            creator_tag: creator_tag.into(),
            notify_email: notify_email.filter(|e| !e.trim().is_empty()),
        }
    }

    /// Builds the event for a booking. Start and end stay local wall time.
    pub fn build_event(&self, booking: &ValidatedBooking) -> NewCalendarEvent {
        let slot = &booking.slot;
        let tz_name = slot.tz().name().to_string();

        let mut attendees = vec![booking.email.clone()];
        if let Some(notify) = &self.notify_email {
            attendees.push(notify.clone());
        }

        NewCalendarEvent {
            summary: format!(
                "Visit: {} {} ({})",
                booking.first_name, booking.last_name, self.business_name
            ),
            description: describe(booking),
            start: EventTime {
                date_time: slot.local_start(),
                time_zone: tz_name.clone(),
            },
            end: EventTime {
                date_time: slot.local_end(),
                time_zone: tz_name,
            },
            attendees,
            slot_key: slot.key().to_string(),
            created_by: self.creator_tag.clone(),
        }
    }

    /// One remote write. Failures keep the provider detail.
    pub async fn commit(&self, booking: &ValidatedBooking) -> Result<CalendarEvent, BookingError> {
        let event = self.build_event(booking);
        let slot_key = event.slot_key.clone();
        let result = self
            .writer
            .insert_event(&self.calendar_id, event)
            .await
            .map_err(|e| e.into_write_error());
        log_result(
            result,
            &format!("booking {} committed", slot_key),
            &format!("booking {} failed", slot_key),
        )
    }
}

fn describe(booking: &ValidatedBooking) -> String {
    let slot = &booking.slot;
    format!(
        "Customer: {} {}\nEmail: {}\nPhone: {}\nAddress: {}\n\nNotes:\n{}\n\nSlot: {} {} ({}min)",
        booking.first_name,
        booking.last_name,
        booking.email,
        booking.phone,
        booking.address,
        booking.note.as_deref().unwrap_or("(no notes)"),
        slot.date().format(crate::timezone::DATE_FORMAT),
        slot.start_label(),
        slot.duration_minutes(),
    )
}
