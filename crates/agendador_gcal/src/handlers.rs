// File: crates/agendador_gcal/src/handlers.rs
use agendador_common::{input_format_error, BookingError};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::booking::BookingRequest;
use crate::logic::{
    AvailabilityQuery, AvailabilityResponse, BookingEngine, BookingOutcome, SlotTakenResponse,
    SlotsResponse,
};
#[cfg(feature = "openapi")]
use crate::logic::BookingResponse;

// Shared state for the booking handlers
#[derive(Clone)]
pub struct BookingState {
    pub engine: Arc<BookingEngine>,
}

/// Handler resolving which slots of a day are free.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/availability",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Availability per slot", body = AvailabilityResponse),
        (status = 400, description = "Malformed date, time, zone, mode or duration"),
        (status = 502, description = "Calendar could not be read")
    ),
    tag = "Booking"
))]
pub async fn get_availability_handler(
    State(state): State<Arc<BookingState>>,
    query: Result<Query<AvailabilityQuery>, QueryRejection>,
) -> Result<Json<AvailabilityResponse>, BookingError> {
    let Query(query) = query.map_err(|rejection| input_format_error(rejection.body_text()))?;
    let span = info_span!("availability", request_id = %Uuid::new_v4(), date = %query.date);
    async move {
        let response = state.engine.availability(&query).await?;
        let free = response.availability.values().filter(|free| **free).count();
        info!(
            "{} of {} slots free ({})",
            free,
            response.availability.len(),
            response.mode
        );
        Ok(Json(response))
    }
    .instrument(span)
    .await
}

/// Handler booking one slot: validate, re-check, commit.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/book",
    request_body = BookingRequest,
    responses(
        (status = 200, description = "Booking committed", body = BookingResponse),
        (status = 409, description = "Slot already taken", body = SlotTakenResponse),
        (status = 400, description = "Invalid booking request"),
        (status = 502, description = "Calendar read or write failed")
    ),
    tag = "Booking"
))]
pub async fn book_slot_handler(
    State(state): State<Arc<BookingState>>,
    request: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<Response, BookingError> {
    let Json(request) = request.map_err(|rejection| input_format_error(rejection.body_text()))?;
    let span = info_span!("book", request_id = %Uuid::new_v4());
    async move {
        match state.engine.book(&request).await? {
            BookingOutcome::Committed(booking) => {
                info!("booked {} as event {}", booking.slot_key, booking.event_id);
                Ok(Json(booking).into_response())
            }
            BookingOutcome::Conflict(conflict) => {
                info!("conflict on {}: {}", conflict.slot_key, conflict.reason);
                Ok((
                    StatusCode::CONFLICT,
                    Json(SlotTakenResponse::from(&conflict)),
                )
                    .into_response())
            }
        }
    }
    .instrument(span)
    .await
}

/// Handler returning the configured slot catalog.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/slots",
    responses(
        (status = 200, description = "Configured candidate slots", body = SlotsResponse)
    ),
    tag = "Booking"
))]
pub async fn get_slots_handler(State(state): State<Arc<BookingState>>) -> Json<SlotsResponse> {
    Json(state.engine.slot_catalog())
}
