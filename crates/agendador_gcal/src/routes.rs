// --- File: crates/agendador_gcal/src/routes.rs ---

use crate::handlers::{book_slot_handler, get_availability_handler, get_slots_handler, BookingState};
use crate::logic::BookingEngine;
use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Creates a router with the booking routes, relative to where it is nested.
pub fn routes(engine: Arc<BookingEngine>) -> Router {
    let state = Arc::new(BookingState { engine });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/availability", get(get_availability_handler))
        .route("/book", post(book_slot_handler))
        .route("/slots", get(get_slots_handler))
        .layer(cors)
        .with_state(state)
}
