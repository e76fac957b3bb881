//! Viewing booking orchestration.
//!
//! Persistence is reached only through the [`ViewingStore`] trait, which
//! callers pass in explicitly. The `db` crate provides the PostgreSQL
//! implementation; tests use an in-memory one.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::availability::{AvailabilityRules, ClockTime};
use crate::error::CoreError;
use crate::scheduling::{self, ValidationResult};
use crate::types::{DbId, LocalInstant};
use crate::viewing::{NewViewing, ViewingRequest};

/// Storage for viewing appointments.
#[async_trait]
pub trait ViewingStore: Send + Sync {
    /// The persisted row handed back to the caller.
    type Record: Send;
    /// Backend failure (connection loss, constraint violation, ...).
    type Error: Send;

    /// Start times on `date` already held by a `pending` or `confirmed`
    /// viewing of `property_id`.
    async fn booked_times(
        &self,
        property_id: DbId,
        date: NaiveDate,
    ) -> Result<Vec<ClockTime>, Self::Error>;

    /// Persist a new viewing and return the stored record.
    async fn insert_pending(&self, viewing: &NewViewing) -> Result<Self::Record, Self::Error>;
}

/// Why a booking did not go through.
#[derive(Debug, thiserror::Error)]
pub enum BookingError<E> {
    /// Contact fields failed validation, or the slot is already taken.
    #[error(transparent)]
    Invalid(#[from] CoreError),

    /// The requested date/time is outside the booking window.
    #[error("Viewing time rejected: {}", .0.violation.code())]
    Rejected(ValidationResult),

    /// The store failed.
    #[error("Viewing store error")]
    Store(E),
}

/// Validate a viewing request and persist it as `pending`.
///
/// Nothing reaches [`ViewingStore::insert_pending`] unless the contact
/// fields are valid, the requested time passes [`scheduling::validate`],
/// and no held viewing of that property starts within one slot length of
/// the requested time.
pub async fn book_viewing<S: ViewingStore>(
    store: &S,
    request: &ViewingRequest,
    rules: &AvailabilityRules,
    now: LocalInstant,
) -> Result<S::Record, BookingError<S::Error>> {
    request.validate_fields()?;

    let result = scheduling::validate(&request.candidate(), rules, now);
    if !result.valid {
        return Err(BookingError::Rejected(result));
    }

    // A valid result guarantees both parts are present and well-formed.
    let (Some(date), Some(time)) = (
        request.preferred_date,
        ClockTime::parse(&request.preferred_time),
    ) else {
        return Err(CoreError::Internal("validated candidate lost its date or time".into()).into());
    };

    let taken = store
        .booked_times(request.property_id, date)
        .await
        .map_err(BookingError::Store)?;
    if let Some(held) = taken.iter().find(|&&held| rules.overlaps(held, time)) {
        return Err(CoreError::Conflict(format!(
            "The {time} slot on {date} overlaps the {held} viewing already booked for this property"
        ))
        .into());
    }

    let viewing = NewViewing::pending(request, date, time);
    store
        .insert_pending(&viewing)
        .await
        .map_err(BookingError::Store)
}

/// Slots on `date` that pass the scheduling rules and do not overlap a
/// viewing already held for `property_id`.
pub async fn open_slots<S: ViewingStore>(
    store: &S,
    property_id: DbId,
    date: NaiveDate,
    rules: &AvailabilityRules,
    now: LocalInstant,
) -> Result<Vec<ClockTime>, S::Error> {
    let candidates = scheduling::available_slots(date, rules, now);
    if candidates.is_empty() {
        return Ok(candidates);
    }
    let taken = store.booked_times(property_id, date).await?;
    Ok(candidates
        .into_iter()
        .filter(|&slot| !taken.iter().any(|&held| rules.overlaps(held, slot)))
        .collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
