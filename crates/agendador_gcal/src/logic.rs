// --- File: crates/agendador_gcal/src/logic.rs ---
use agendador_common::{config_error, input_format_error, BookingError};
use agendador_config::{AppConfig, AvailabilityMode};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

use crate::availability::{AvailabilityMap, AvailabilityResolver};
use crate::booking::BookingRequest;
use crate::committer::BookingCommitter;
use crate::guard::{ConflictGuard, GuardOutcome, SlotConflict};
use crate::handle::{CalendarHandle, CalendarPorts};
use crate::slots::generate_slots;
use crate::timezone;

// --- Data Structures ---
#[derive(Deserialize, Debug, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct AvailabilityQuery {
    /// Local date in YYYY-MM-DD format
    #[cfg_attr(feature = "openapi", schema(format = "date", example = "2024-06-02"))]
    pub date: String,

    /// IANA time zone; the configured zone when absent
    #[cfg_attr(feature = "openapi", schema(example = "America/Santiago"))]
    pub tz: Option<String>,

    /// Comma separated HH:mm candidates; the configured catalog when absent
    #[cfg_attr(feature = "openapi", schema(example = "09:00,09:30,10:00"))]
    pub slots: Option<String>,

    /// `self-created-only` or `any-event`; the configured mode when absent
    #[cfg_attr(feature = "openapi", schema(example = "any-event"))]
    pub mode: Option<String>,

    /// Must match the configured slot length when given
    #[cfg_attr(feature = "openapi", schema(example = 15))]
    pub duration_minutes: Option<u32>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AvailabilityResponse {
    pub ok: bool,
    pub date: String,
    pub tz: String,
    pub mode: String,
    pub availability: AvailabilityMap,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookingResponse {
    pub ok: bool,
    pub event_id: String,
    pub slot_key: String,
    pub link: Option<String>,
}

/// Body of a 409 answer.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SlotTakenResponse {
    pub ok: bool,
    pub error: String,
    pub message: String,
    pub slot_key: String,
}

impl From<&SlotConflict> for SlotTakenResponse {
    fn from(conflict: &SlotConflict) -> Self {
        Self {
            ok: false,
            error: "SLOT_TAKEN".to_string(),
            message: conflict.message.clone(),
            slot_key: conflict.slot_key.to_string(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SlotsResponse {
    pub slots: Vec<String>,
    pub duration_minutes: u32,
    pub time_zone: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
    Committed(BookingResponse),
    Conflict(SlotConflict),
}

/// Validate, guard, commit. Holds no per-request state.
pub struct BookingEngine {
    config: Arc<AppConfig>,
    calendar: Arc<CalendarHandle>,
    default_tz: Tz,
    catalog: Vec<String>,
}

impl BookingEngine {
    /// Checks the booking section of the configuration up front.
    pub fn new(config: Arc<AppConfig>, calendar: Arc<CalendarHandle>) -> Result<Self, BookingError> {
        let booking = &config.booking;
        let default_tz = Tz::from_str(booking.time_zone.trim())
            .map_err(|_| config_error(format!("booking.time_zone '{}' is not an IANA zone", booking.time_zone)))?;
        let catalog = generate_slots(&booking.slot_start, &booking.slot_end, booking.slot_step_minutes)
            .map_err(|e| config_error(format!("booking slot catalog: {e}")))?;
        if catalog.is_empty() {
            return Err(config_error("booking.slot_end is before booking.slot_start"));
        }
        Ok(Self {
            config,
            calendar,
            default_tz,
            catalog,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn slot_catalog(&self) -> SlotsResponse {
        SlotsResponse {
            slots: self.catalog.clone(),
            duration_minutes: self.config.booking.duration_minutes,
            time_zone: self.default_tz.name().to_string(),
        }
    }

    fn resolve_tz(&self, tz: Option<&str>) -> Result<Tz, BookingError> {
        match tz.map(str::trim) {
            Some(name) if !name.is_empty() => timezone::parse_time_zone(name),
            _ => Ok(self.default_tz),
        }
    }

    async fn ports(&self) -> Result<&CalendarPorts, BookingError> {
        self.calendar.get().await
    }

    pub async fn availability(&self, query: &AvailabilityQuery) -> Result<AvailabilityResponse, BookingError> {
        let booking = &self.config.booking;
        let date = timezone::parse_date(&query.date)?;
        let tz = self.resolve_tz(query.tz.as_deref())?;
        let mode = match query.mode.as_deref().map(str::trim) {
            Some(m) if !m.is_empty() => AvailabilityMode::from_str(m).map_err(input_format_error)?,
            _ => booking.availability_mode,
        };
        if let Some(requested) = query.duration_minutes {
            if requested != booking.duration_minutes {
                return Err(input_format_error(format!(
                    "duration_minutes must be {} for this deployment",
                    booking.duration_minutes
                )));
            }
        }
        let candidates: Vec<String> = match query.slots.as_deref() {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            None => self.catalog.clone(),
        };
        // Rejects malformed candidates before the client is built.
        for candidate in &candidates {
            timezone::parse_time(candidate)?;
        }

        let ports = self.ports().await?;
        let resolver = AvailabilityResolver::new(
            ports.reader.clone(),
            self.config.google.calendar_id.as_str(),
            booking.creator_tag.as_str(),
        );
        let availability = resolver
            .resolve(date, tz, booking.duration_minutes, &candidates, mode)
            .await?;

        Ok(AvailabilityResponse {
            ok: true,
            date: date.format(timezone::DATE_FORMAT).to_string(),
            tz: tz.name().to_string(),
            mode: mode.to_string(),
            availability,
        })
    }

    pub async fn book(&self, request: &BookingRequest) -> Result<BookingOutcome, BookingError> {
        let booking = request.validate(self.default_tz, self.config.booking.duration_minutes)?;
        let ports = self.ports().await?;
        let calendar_id = self.config.google.calendar_id.as_str();

        let guard = ConflictGuard::new(ports.reader.clone(), calendar_id);
        let slot = match guard.check_and_reserve(booking.slot.clone()).await? {
            GuardOutcome::Proceed(slot) => slot,
            GuardOutcome::Conflict(conflict) => return Ok(BookingOutcome::Conflict(conflict)),
        };
        info!("slot {} is free, committing", slot.key());

        let committer = BookingCommitter::new(
            ports.writer.clone(),
            calendar_id,
            self.config.booking.business_name.as_str(),
            self.config.booking.creator_tag.as_str(),
            self.config.google.notify_email.clone(),
        );
        let event = committer.commit(&booking).await?;

        Ok(BookingOutcome::Committed(BookingResponse {
            ok: true,
            event_id: event.id,
            slot_key: event.slot_key,
            link: event.html_link,
        }))
    }
}
