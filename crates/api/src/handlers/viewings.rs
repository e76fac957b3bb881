//! Handlers for viewing appointments.
//!
//! Every date/time decision goes through `lettings_core::scheduling`, with
//! "now" read once per request from the state's clock.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use lettings_core::availability::ClockTime;
use lettings_core::booking;
use lettings_core::error::CoreError;
use lettings_core::scheduling::{self, AppointmentCandidate};
use lettings_core::search::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use lettings_core::types::DbId;
use lettings_core::viewing::{self, ViewingRequest};
use lettings_db::models::viewing::{UpdateViewingStatus, ViewingListParams};
use lettings_db::repositories::{PgViewingStore, ViewingRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for slot listing (`?date=YYYY-MM-DD`).
#[derive(Debug, Deserialize)]
pub struct SlotParams {
    pub date: Option<String>,
}

/// Open slots for one property on one day.
#[derive(Debug, Serialize)]
pub struct SlotList {
    pub property_id: DbId,
    pub date: NaiveDate,
    pub slots: Vec<ClockTime>,
}

// ---------------------------------------------------------------------------
// GET /viewings/rules
// ---------------------------------------------------------------------------

/// Return the active scheduling rules so clients can pre-filter pickers.
pub async fn get_rules(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    Ok(Json(DataResponse {
        data: state.config.viewing_rules.clone(),
    }))
}

// ---------------------------------------------------------------------------
// POST /viewings/check
// ---------------------------------------------------------------------------

/// Validate a candidate date/time without booking it.
///
/// Always 200; the verdict is in the body.
pub async fn check_candidate(
    State(state): State<AppState>,
    Json(candidate): Json<AppointmentCandidate>,
) -> AppResult<impl IntoResponse> {
    let now = state.clock.now();
    let result = scheduling::validate(&candidate, &state.config.viewing_rules, now);
    Ok(Json(DataResponse { data: result }))
}

// ---------------------------------------------------------------------------
// GET /properties/{property_id}/viewing-slots
// ---------------------------------------------------------------------------

/// List bookable, still-free slots for a property on a given date.
pub async fn list_slots(
    State(state): State<AppState>,
    Path(property_id): Path<DbId>,
    Query(params): Query<SlotParams>,
) -> AppResult<impl IntoResponse> {
    let raw = params
        .date
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("date query parameter is required".into()))?;
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("Invalid date '{raw}'. Expected YYYY-MM-DD")))?;

    let store = PgViewingStore::new(state.pool.clone());
    let now = state.clock.now();
    let slots =
        booking::open_slots(&store, property_id, date, &state.config.viewing_rules, now).await?;

    Ok(Json(DataResponse {
        data: SlotList {
            property_id,
            date,
            slots,
        },
    }))
}

// ---------------------------------------------------------------------------
// POST /viewings
// ---------------------------------------------------------------------------

/// Book a viewing. Stored as `pending` until the lessor responds.
pub async fn create_viewing(
    State(state): State<AppState>,
    Json(input): Json<ViewingRequest>,
) -> AppResult<impl IntoResponse> {
    let store = PgViewingStore::new(state.pool.clone());
    let now = state.clock.now();

    let viewing = booking::book_viewing(&store, &input, &state.config.viewing_rules, now)
        .await
        .inspect_err(|e| {
            if let booking::BookingError::Rejected(result) = e {
                tracing::warn!(
                    property_id = input.property_id,
                    violation = result.violation.code(),
                    "Viewing request rejected",
                );
            }
        })?;

    tracing::info!(
        viewing_id = viewing.id,
        property_id = viewing.property_id,
        date = %viewing.preferred_date,
        "Viewing requested",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: viewing })))
}

// ---------------------------------------------------------------------------
// GET /viewings
// ---------------------------------------------------------------------------

/// List viewings with optional property and status filters.
pub async fn list_viewings(
    State(state): State<AppState>,
    Query(params): Query<ViewingListParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(ref s) = params.status {
        viewing::validate_status(s)?;
    }

    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(params.offset);

    let viewings = ViewingRepo::list_filtered(
        &state.pool,
        params.property_id,
        params.status.as_deref(),
        limit,
        offset,
    )
    .await?;

    Ok(Json(DataResponse { data: viewings }))
}

// ---------------------------------------------------------------------------
// GET /viewings/{id}
// ---------------------------------------------------------------------------

/// Get a single viewing by ID.
pub async fn get_viewing(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let viewing = ViewingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Viewing",
            id,
        }))?;

    Ok(Json(DataResponse { data: viewing }))
}

// ---------------------------------------------------------------------------
// PUT /viewings/{id}/status
// ---------------------------------------------------------------------------

/// Move a viewing through its lifecycle (confirm, decline, cancel, complete).
pub async fn update_viewing_status(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateViewingStatus>,
) -> AppResult<impl IntoResponse> {
    viewing::validate_status(&input.status)?;

    let existing = ViewingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Viewing",
            id,
        }))?;

    viewing::validate_transition(&existing.status, &input.status)?;

    let Some(updated) =
        ViewingRepo::update_status(&state.pool, id, &existing.status, &input.status).await?
    else {
        // The row changed (or vanished) between the read and the write.
        return Err(match ViewingRepo::find_by_id(&state.pool, id).await? {
            Some(current) => AppError::Core(CoreError::Conflict(format!(
                "Viewing {id} is now '{}' and can no longer move from '{}'",
                current.status, existing.status
            ))),
            None => AppError::Core(CoreError::NotFound {
                entity: "Viewing",
                id,
            }),
        });
    };

    tracing::info!(
        viewing_id = id,
        from = %existing.status,
        to = %updated.status,
        "Viewing status updated",
    );

    Ok(Json(DataResponse { data: updated }))
}
