// --- File: crates/agendador_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// Failures of the booking engine.
///
/// A slot conflict is deliberately absent: it is an expected outcome of a booking
/// attempt, not a fault, and travels as a value instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// Malformed date, time, timezone or request field. Raised before any remote call.
    #[error("Invalid input: {0}")]
    InputFormat(String),

    /// A calendar read failed; availability is unknown, never assumed free.
    #[error("Availability could not be resolved: {0}")]
    Availability(String),

    /// The calendar write failed. Carries the provider detail.
    #[error("Booking could not be committed: {0}")]
    Commit(String),

    /// The calendar credential could not be obtained or was rejected.
    #[error("Calendar credential error: {0}")]
    Credential(String),

    /// Deployment configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BookingError {
    /// Stable machine-readable code used in JSON error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            BookingError::InputFormat(_) => "INVALID_INPUT",
            BookingError::Availability(_) => "AVAIL_ERROR",
            BookingError::Commit(_) => "COMMIT_ERROR",
            BookingError::Credential(_) => "CREDENTIAL_ERROR",
            BookingError::Config(_) => "CONFIG_ERROR",
        }
    }
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for BookingError {
    fn status_code(&self) -> u16 {
        match self {
            BookingError::InputFormat(_) => 400,
            BookingError::Availability(_) => 502,
            BookingError::Commit(_) => 502,
            BookingError::Credential(_) => 502,
            BookingError::Config(_) => 500,
        }
    }
}

/// Errors raised by a calendar port implementation.
///
/// The engine decides what they mean: the same transport failure is an
/// availability error on a read and a commit error on a write.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarPortError {
    #[error("credential unavailable: {0}")]
    Credential(String),

    #[error("calendar request failed: {0}")]
    Transport(String),

    #[error("calendar provider answered {status}: {detail}")]
    Provider { status: u16, detail: String },

    #[error("unexpected calendar response: {0}")]
    Decode(String),
}

impl CalendarPortError {
    /// Maps a failed read into the booking taxonomy.
    pub fn into_read_error(self) -> BookingError {
        match self {
            CalendarPortError::Credential(msg) => BookingError::Credential(msg),
            CalendarPortError::Provider { status: 401, detail } => BookingError::Credential(detail),
            other => BookingError::Availability(other.to_string()),
        }
    }

    /// Maps a failed write into the booking taxonomy.
    pub fn into_write_error(self) -> BookingError {
        match self {
            CalendarPortError::Credential(msg) => BookingError::Credential(msg),
            CalendarPortError::Provider { status: 401, detail } => BookingError::Credential(detail),
            other => BookingError::Commit(other.to_string()),
        }
    }
}

pub fn input_format_error<T: fmt::Display>(message: T) -> BookingError {
    BookingError::InputFormat(message.to_string())
}

pub fn config_error<T: fmt::Display>(message: T) -> BookingError {
    BookingError::Config(message.to_string())
}
