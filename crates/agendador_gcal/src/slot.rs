// --- File: crates/agendador_gcal/src/slot.rs ---
use agendador_common::{input_format_error, BookingError, TimeWindow};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::timezone::{self, DATE_FORMAT, TIME_FORMAT};

/// Identity of a booking attempt: `"{date}T{HH:mm}"`, independent of the customer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey(String);

impl SlotKey {
    pub fn new(date: NaiveDate, start: NaiveTime) -> Self {
        SlotKey(format!(
            "{}T{}",
            date.format(DATE_FORMAT),
            start.format(TIME_FORMAT)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for SlotKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl PartialEq<str> for SlotKey {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// A fixed-length slot on a local calendar day. The UTC interval and the day
/// window are derived once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    date: NaiveDate,
    start_local: NaiveTime,
    local_end: NaiveDateTime,
    duration: Duration,
    tz: Tz,
    start_utc: DateTime<Utc>,
    end_utc: DateTime<Utc>,
    day: TimeWindow,
}

impl Slot {
    pub fn new(
        date: NaiveDate,
        start_local: NaiveTime,
        duration_minutes: u32,
        tz: Tz,
    ) -> Result<Self, BookingError> {
        if duration_minutes == 0 {
            return Err(input_format_error("slot duration must be positive"));
        }
        let duration = Duration::minutes(i64::from(duration_minutes));
        let start_utc = timezone::local_to_utc(date, start_local, tz)?;
        let overflow = || input_format_error(format!("slot {date} {start_local} ends out of range"));
        let end_utc = start_utc.checked_add_signed(duration).ok_or_else(overflow)?;
        let local_end = date
            .and_time(start_local)
            .checked_add_signed(duration)
            .ok_or_else(overflow)?;
        let (day_start, day_end) = timezone::day_bounds(date, tz)?;
        Ok(Self {
            date,
            start_local,
            local_end,
            duration,
            tz,
            start_utc,
            end_utc,
            day: TimeWindow::new(day_start, day_end),
        })
    }

    pub fn parse(date: &str, time: &str, tz: &str, duration_minutes: u32) -> Result<Self, BookingError> {
        Slot::new(
            timezone::parse_date(date)?,
            timezone::parse_time(time)?,
            duration_minutes,
            timezone::parse_time_zone(tz)?,
        )
    }

    pub fn key(&self) -> SlotKey {
        SlotKey::new(self.date, self.start_local)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn start_local(&self) -> NaiveTime {
        self.start_local
    }

    pub fn start_label(&self) -> String {
        timezone::format_time(self.start_local)
    }

    /// Local wall-clock start, without offset.
    pub fn local_start(&self) -> NaiveDateTime {
        self.date.and_time(self.start_local)
    }

    /// Local wall-clock end, start plus duration on the wall clock. May fall on
    /// the next day.
    pub fn local_end(&self) -> NaiveDateTime {
        self.local_end
    }

    pub fn duration_minutes(&self) -> i64 {
        self.duration.num_minutes()
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    pub fn start_utc(&self) -> DateTime<Utc> {
        self.start_utc
    }

    pub fn end_utc(&self) -> DateTime<Utc> {
        self.end_utc
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start_utc, self.end_utc)
    }

    /// UTC window of the slot's local day.
    pub fn day_window(&self) -> TimeWindow {
        self.day
    }

    /// Window to read when checking the slot: its local day, extended to the
    /// slot's end when the slot runs past midnight.
    pub fn lookup_window(&self) -> TimeWindow {
        TimeWindow::new(self.day.start, self.day.end.max(self.end_utc))
    }
}
