// --- File: crates/agendador_gcal/src/timezone.rs ---
//! Wall-clock to UTC conversion for arbitrary IANA zones.
//!
//! All timezone arithmetic of the engine lives here. The conversion is
//! non-iterative: the zone offset is sampled once, at the instant obtained by
//! reading the wall time as if it were UTC. For wall times within |offset| hours
//! after a DST transition the sampled offset can be the pre-transition one, and
//! wall times that fall into a gap or an overlap are resolved by that same rule.
//! Such wall times are classified and logged, never silently accepted.

use agendador_common::{input_format_error, BookingError};
use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeZone, Utc,
};
use chrono_tz::Tz;
use tracing::warn;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// How a wall time maps onto the zone's timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallTimeKind {
    /// Exactly one instant has this wall time.
    Regular,
    /// Clocks were set back; two instants share this wall time.
    Ambiguous,
    /// Clocks jumped forward over it; no instant has this wall time.
    Skipped,
}

/// Years a calendar date may carry.
pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

/// Parses a `YYYY-MM-DD` date with a four-digit year.
pub fn parse_date(date: &str) -> Result<NaiveDate, BookingError> {
    let trimmed = date.trim();
    let invalid = || input_format_error(format!("invalid date '{date}', expected YYYY-MM-DD"));
    // chrono's %Y also takes signed and extended years.
    let bytes = trimmed.as_bytes();
    if bytes.len() != 10 || !bytes[..4].iter().all(u8::is_ascii_digit) || bytes[4] != b'-' {
        return Err(invalid());
    }
    let parsed = NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| invalid())?;
    check_year(parsed)?;
    Ok(parsed)
}

fn check_year(date: NaiveDate) -> Result<(), BookingError> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
        return Err(input_format_error(format!(
            "date {date} is outside years {MIN_YEAR}..={MAX_YEAR}"
        )));
    }
    Ok(())
}

fn out_of_range(what: impl std::fmt::Display) -> BookingError {
    input_format_error(format!("{what} is out of the supported time range"))
}

/// Parses a 24h `HH:mm` time.
pub fn parse_time(time: &str) -> Result<NaiveTime, BookingError> {
    let trimmed = time.trim();
    // chrono accepts single-digit hours; the slot format does not.
    if trimmed.len() != 5 {
        return Err(input_format_error(format!(
            "invalid time '{time}', expected HH:mm"
        )));
    }
    NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
        .map_err(|_| input_format_error(format!("invalid time '{time}', expected HH:mm")))
}

pub fn parse_time_zone(tz: &str) -> Result<Tz, BookingError> {
    tz.trim()
        .parse::<Tz>()
        .map_err(|_| input_format_error(format!("unknown time zone '{tz}'")))
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub fn classify_wall_time(naive: NaiveDateTime, tz: Tz) -> WallTimeKind {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(_) => WallTimeKind::Regular,
        LocalResult::Ambiguous(_, _) => WallTimeKind::Ambiguous,
        LocalResult::None => WallTimeKind::Skipped,
    }
}

/// Converts a naive local date-time in `tz` to the UTC instant.
pub fn naive_local_to_utc(naive: NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>, BookingError> {
    check_year(naive.date())?;
    let kind = classify_wall_time(naive, tz);
    if kind != WallTimeKind::Regular {
        warn!(
            "wall time {} in {} is {:?} around a DST transition; using the offset sampled at the naive instant",
            naive, tz, kind
        );
    }

    let guess = naive.and_utc();
    let sampled = tz.offset_from_utc_datetime(&guess.naive_utc()).fix();
    let rendered = naive
        .checked_add_signed(Duration::seconds(i64::from(sampled.local_minus_utc())))
        .ok_or_else(|| out_of_range(naive))?;
    let offset = naive - rendered;
    naive
        .checked_add_signed(offset)
        .map(|utc| utc.and_utc())
        .ok_or_else(|| out_of_range(naive))
}

pub fn local_to_utc(
    date: NaiveDate,
    time: NaiveTime,
    tz: Tz,
) -> Result<DateTime<Utc>, BookingError> {
    naive_local_to_utc(date.and_time(time), tz)
}

/// String form of [`local_to_utc`], validating every part.
pub fn local_to_utc_str(date: &str, time: &str, tz: &str) -> Result<DateTime<Utc>, BookingError> {
    let date = parse_date(date)?;
    let time = parse_time(time)?;
    let tz = parse_time_zone(tz)?;
    local_to_utc(date, time, tz)
}

/// Renders an instant as local date and `HH:mm` in `tz`.
pub fn utc_to_local(instant: DateTime<Utc>, tz: Tz) -> (NaiveDate, String) {
    let local = instant.with_timezone(&tz);
    (local.date_naive(), format_time(local.time()))
}

/// UTC window covering `date` in `tz`, from 00:00 to 23:59:59.999 local.
pub fn day_bounds(
    date: NaiveDate,
    tz: Tz,
) -> Result<(DateTime<Utc>, DateTime<Utc>), BookingError> {
    let start = local_to_utc(date, NaiveTime::MIN, tz)?;
    let last_minute = NaiveTime::MIN + Duration::minutes(23 * 60 + 59);
    let end = local_to_utc(date, last_minute, tz)?
        .checked_add_signed(Duration::milliseconds(59_999))
        .ok_or_else(|| out_of_range(date))?;
    Ok((start, end))
}
