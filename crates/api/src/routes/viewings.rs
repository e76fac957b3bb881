//! Route definitions for viewing appointments.
//!
//! Mounted at `/viewings` and `/properties` by `api_routes()`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::viewings;
use crate::state::AppState;

/// Viewing routes.
///
/// ```text
/// GET    /rules             -> get_rules
/// POST   /check             -> check_candidate
/// POST   /                  -> create_viewing
/// GET    /                  -> list_viewings
/// GET    /{id}              -> get_viewing
/// PUT    /{id}/status       -> update_viewing_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/rules", get(viewings::get_rules))
        .route("/check", post(viewings::check_candidate))
        .route(
            "/",
            post(viewings::create_viewing).get(viewings::list_viewings),
        )
        .route("/{id}", get(viewings::get_viewing))
        .route("/{id}/status", put(viewings::update_viewing_status))
}

/// Property-scoped viewing routes.
///
/// ```text
/// GET    /{property_id}/viewing-slots?date=YYYY-MM-DD -> list_slots
/// ```
pub fn property_router() -> Router<AppState> {
    Router::new().route("/{property_id}/viewing-slots", get(viewings::list_slots))
}
