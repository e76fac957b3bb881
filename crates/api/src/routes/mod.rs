pub mod health;
pub mod viewings;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /viewings/rules                                   active scheduling rules
/// /viewings/check                                   validate a candidate (POST)
/// /viewings                                         list, book
/// /viewings/{id}                                    get
/// /viewings/{id}/status                             change status (PUT)
///
/// /properties/{property_id}/viewing-slots           open slots for a date
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/viewings", viewings::router())
        .nest("/properties", viewings::property_router())
}
