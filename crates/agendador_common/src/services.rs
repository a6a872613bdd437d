// --- File: crates/agendador_common/src/services.rs ---
//! Calendar ports.
//!
//! The booking engine talks to a calendar only through [`CalendarReader`] and
//! [`CalendarWriter`]. The Google adapter and the in-memory test calendar both
//! implement them, so the engine never sees a provider type.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::error::CalendarPortError;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Shared extended property holding the slot key of a booking.
pub const SLOT_KEY_PROPERTY: &str = "slot_key";
/// Shared extended property naming the service instance that created a booking.
pub const CREATED_BY_PROPERTY: &str = "created_by";

/// Half-open interval `[start, end)` on the UTC timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        overlaps(self.start, self.end, other.start, other.end)
    }
}

/// Half-open overlap test. Touching intervals do not overlap.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// An interval reported busy by the calendar provider, whatever created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusyWindow(TimeWindow);

impl BusyWindow {
    /// Returns `None` for empty or inverted windows.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start < end).then(|| BusyWindow(TimeWindow::new(start, end)))
    }

    pub fn window(&self) -> &TimeWindow {
        &self.0
    }
}

/// A `key=value` filter on shared extended properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedProperty {
    pub key: String,
    pub value: String,
}

impl SharedProperty {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn slot_key(value: impl Into<String>) -> Self {
        Self::new(SLOT_KEY_PROPERTY, value)
    }

    pub fn created_by(value: impl Into<String>) -> Self {
        Self::new(CREATED_BY_PROPERTY, value)
    }
}

impl fmt::Display for SharedProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// An existing event, reduced to the tags the engine cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedEvent {
    pub id: String,
    pub slot_key: Option<String>,
    pub created_by: Option<String>,
}

/// Local wall-clock time plus the IANA zone it is expressed in.
/// No UTC offset is attached; the provider resolves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventTime {
    pub date_time: NaiveDateTime,
    pub time_zone: String,
}

/// Event to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCalendarEvent {
    pub summary: String,
    pub description: String,
    pub start: EventTime,
    pub end: EventTime,
    pub attendees: Vec<String>,
    pub slot_key: String,
    pub created_by: String,
}

/// What the provider returned for an inserted event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub html_link: Option<String>,
    pub slot_key: String,
}

/// Read side of a calendar.
pub trait CalendarReader: Send + Sync {
    /// Events in `[time_min, time_max)` carrying the given shared property.
    fn list_events_by_shared_property<'a>(
        &'a self,
        calendar_id: &'a str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
        property: &'a SharedProperty,
    ) -> BoxFuture<'a, Vec<TaggedEvent>, CalendarPortError>;

    /// Busy intervals in `[time_min, time_max)`, from any event.
    fn query_free_busy<'a>(
        &'a self,
        calendar_id: &'a str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
        time_zone: &'a str,
    ) -> BoxFuture<'a, Vec<BusyWindow>, CalendarPortError>;
}

/// Write side of a calendar.
pub trait CalendarWriter: Send + Sync {
    /// Inserts the event, notifying attendees.
    fn insert_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event: NewCalendarEvent,
    ) -> BoxFuture<'a, CalendarEvent, CalendarPortError>;
}
