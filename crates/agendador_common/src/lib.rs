// --- File: crates/agendador_common/src/lib.rs ---

pub mod error; // Error taxonomy
pub mod http; // HTTP error responses
pub mod logging; // Logging utilities
pub mod services; // Calendar ports

pub use error::{
    config_error, input_format_error, BookingError, CalendarPortError, HttpStatusCode,
};

pub use http::IntoHttpResponse;

pub use logging::{init_with_level, log_result, parse_level};

pub use services::{
    overlaps, BoxFuture, BusyWindow, CalendarEvent, CalendarReader, CalendarWriter, EventTime,
    NewCalendarEvent, SharedProperty, TaggedEvent, TimeWindow, CREATED_BY_PROPERTY,
    SLOT_KEY_PROPERTY,
};
