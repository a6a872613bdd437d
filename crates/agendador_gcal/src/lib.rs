// --- File: crates/agendador_gcal/src/lib.rs ---
// Declare modules within this crate
pub mod auth;
pub mod availability;
pub mod booking;
#[cfg(test)]
mod booking_flow_test;
pub mod committer;
pub mod doc;
#[cfg(test)]
mod engine_proptest;
pub mod guard;
pub mod handle;
pub mod handlers;
pub mod logic;
pub mod routes;
pub mod service;
pub mod slot;
pub mod slots;
pub mod timezone;

pub use logic::BookingEngine;
pub use routes::routes;
