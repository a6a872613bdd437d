// --- File: crates/agendador_gcal/src/booking.rs ---
use agendador_common::{input_format_error, BookingError};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::slot::Slot;
use crate::timezone;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("Invalid regex"));

/// Booking request as submitted by the booking form.
///
/// The aliases accept the Spanish field names of the legacy web form.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookingRequest {
    #[serde(alias = "nombre")]
    #[cfg_attr(feature = "openapi", schema(example = "Ana"))]
    pub first_name: String,
    #[serde(alias = "apellido")]
    #[cfg_attr(feature = "openapi", schema(example = "Rojas"))]
    pub last_name: String,
    #[cfg_attr(feature = "openapi", schema(example = "ana@example.com"))]
    pub email: String,
    #[serde(default, alias = "celular")]
    pub phone: String,
    #[serde(default, alias = "direccion")]
    pub address: String,
    /// Local date, YYYY-MM-DD.
    #[serde(alias = "fechaISO")]
    #[cfg_attr(feature = "openapi", schema(example = "2024-06-02", format = "date"))]
    pub date: String,
    /// Local start time, HH:mm.
    #[serde(alias = "horaHHmm")]
    #[cfg_attr(feature = "openapi", schema(example = "10:00"))]
    pub time: String,
    /// IANA zone; the configured zone when absent.
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(example = "America/Santiago"))]
    pub tz: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// A request whose fields passed validation, bound to its slot.
#[derive(Debug, Clone)]
pub struct ValidatedBooking {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub note: Option<String>,
    pub slot: Slot,
}

impl BookingRequest {
    pub fn validate(
        &self,
        default_tz: Tz,
        duration_minutes: u32,
    ) -> Result<ValidatedBooking, BookingError> {
        let first_name = required("first_name", &self.first_name)?;
        let last_name = required("last_name", &self.last_name)?;
        let email = required("email", &self.email)?;
        if !EMAIL_RE.is_match(&email) {
            return Err(input_format_error(format!("invalid email '{email}'")));
        }
        let date = required("date", &self.date)?;
        let time = required("time", &self.time)?;

        let tz = match self.tz.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => timezone::parse_time_zone(name)?,
            _ => default_tz,
        };
        let slot = Slot::new(
            timezone::parse_date(&date)?,
            timezone::parse_time(&time)?,
            duration_minutes,
            tz,
        )?;

        Ok(ValidatedBooking {
            first_name,
            last_name,
            email,
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
            note: self
                .note
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            slot,
        })
    }
}

fn required(field: &str, value: &str) -> Result<String, BookingError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(input_format_error(format!("{field} is required")));
    }
    Ok(value.to_string())
}
