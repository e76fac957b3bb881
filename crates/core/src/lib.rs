//! Domain core for viewing-appointment scheduling.
//!
//! Pure logic only: availability rules, the appointment window validator,
//! viewing request/status rules and the booking orchestration that talks to
//! persistence through the [`booking::ViewingStore`] trait. No database or
//! HTTP dependencies live here.

pub mod availability;
pub mod booking;
pub mod clock;
pub mod error;
pub mod scheduling;
pub mod search;
pub mod types;
pub mod viewing;
