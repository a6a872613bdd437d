// --- File: crates/agendador_gcal/src/slots.rs ---
use agendador_common::{input_format_error, BookingError};
use chrono::{Duration, NaiveTime};

use crate::timezone::{format_time, parse_time};

/// Candidate start times of a business day, `start..=end` every `step`.
///
/// Cloning restarts the sequence from the same state. The sequence stops at the
/// end of the day instead of wrapping past midnight.
#[derive(Debug, Clone)]
pub struct SlotCatalog {
    next: Option<NaiveTime>,
    end: NaiveTime,
    step: Duration,
}

impl SlotCatalog {
    pub fn new(start: NaiveTime, end_inclusive: NaiveTime, step_minutes: u32) -> Result<Self, BookingError> {
        if step_minutes == 0 {
            return Err(input_format_error("slot step must be at least one minute"));
        }
        Ok(Self {
            next: (start <= end_inclusive).then_some(start),
            end: end_inclusive,
            step: Duration::minutes(i64::from(step_minutes)),
        })
    }
}

impl Iterator for SlotCatalog {
    type Item = NaiveTime;

    fn next(&mut self) -> Option<NaiveTime> {
        let current = self.next?;
        let (following, wrapped) = current.overflowing_add_signed(self.step);
        self.next = (wrapped == 0 && following > current && following <= self.end)
            .then_some(following);
        Some(current)
    }
}

/// `generate_slots("09:00", "17:00", 30)` -> `["09:00", "09:30", ..., "17:00"]`.
pub fn generate_slots(
    start_local: &str,
    end_local_inclusive: &str,
    step_minutes: u32,
) -> Result<Vec<String>, BookingError> {
    let start = parse_time(start_local)?;
    let end = parse_time(end_local_inclusive)?;
    Ok(SlotCatalog::new(start, end, step_minutes)?
        .map(format_time)
        .collect())
}
