// File: crates/agendador_gcal/src/doc.rs

#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::booking::BookingRequest;
use crate::logic::{
    AvailabilityQuery, AvailabilityResponse, BookingResponse, SlotTakenResponse, SlotsResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::get_availability_handler,
        crate::handlers::book_slot_handler,
        crate::handlers::get_slots_handler
    ),
    components(
        schemas(
            AvailabilityQuery,
            AvailabilityResponse,
            BookingRequest,
            BookingResponse,
            SlotTakenResponse,
            SlotsResponse
        )
    ),
    tags(
        (name = "Booking", description = "Appointment availability and booking")
    ),
    servers(
        (url = "/api", description = "Booking API server")
    )
)]
pub struct BookingApiDoc;
