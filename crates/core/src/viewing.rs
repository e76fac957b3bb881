//! Viewing request fields and status lifecycle.
//!
//! Defines the valid viewing statuses, transition rules, and the request
//! DTO submitted from the listing page's booking form.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::availability::ClockTime;
use crate::error::CoreError;
use crate::scheduling::AppointmentCandidate;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Status constants
// ---------------------------------------------------------------------------

/// Initial status for a newly requested viewing.
pub const STATUS_PENDING: &str = "pending";
/// The lessor accepted the requested slot.
pub const STATUS_CONFIRMED: &str = "confirmed";
/// The lessor turned the request down.
pub const STATUS_DECLINED: &str = "declined";
/// Withdrawn by either side before it took place.
pub const STATUS_CANCELLED: &str = "cancelled";
/// The viewing took place.
pub const STATUS_COMPLETED: &str = "completed";

/// All valid viewing statuses.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_PENDING,
    STATUS_CONFIRMED,
    STATUS_DECLINED,
    STATUS_CANCELLED,
    STATUS_COMPLETED,
];

/// Statuses that hold their slot against other bookings.
pub const SLOT_HOLDING_STATUSES: &[&str] = &[STATUS_PENDING, STATUS_CONFIRMED];

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

/// Returns the set of statuses that `from_status` may transition to.
///
/// - `pending`   -> `confirmed`, `declined`, `cancelled`
/// - `confirmed` -> `completed`, `cancelled`
/// - `declined`, `cancelled`, `completed` are terminal
pub fn valid_transitions(from_status: &str) -> &'static [&'static str] {
    match from_status {
        STATUS_PENDING => &[STATUS_CONFIRMED, STATUS_DECLINED, STATUS_CANCELLED],
        STATUS_CONFIRMED => &[STATUS_COMPLETED, STATUS_CANCELLED],
        _ => &[],
    }
}

/// Validate that a status transition from `current` to `next` is allowed.
pub fn validate_transition(current: &str, next: &str) -> Result<(), CoreError> {
    let allowed = valid_transitions(current);
    if allowed.contains(&next) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Cannot transition viewing from '{current}' to '{next}'. Allowed transitions: {allowed:?}"
        )))
    }
}

/// Validate that a status string is one of the known statuses.
pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid viewing status '{status}'. Must be one of: {VALID_STATUSES:?}"
        )))
    }
}

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

/// A prospective tenant's viewing request, as submitted.
///
/// Contact fields are checked with [`Validate`]; the requested date/time is
/// checked separately by the scheduling validator.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ViewingRequest {
    #[validate(range(min = 1, message = "must reference a property"))]
    pub property_id: DbId,
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(max = 40, message = "must be at most 40 characters"))]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "crate::scheduling::empty_date_as_none")]
    pub preferred_date: Option<NaiveDate>,
    #[serde(default)]
    pub preferred_time: String,
    #[validate(length(max = 2000, message = "must be at most 2000 characters"))]
    pub message: Option<String>,
}

impl ViewingRequest {
    /// Check contact fields, returning a `CoreError::Validation` listing
    /// every offending field.
    pub fn validate_fields(&self) -> Result<(), CoreError> {
        self.validate()?;
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation("name: must not be blank".into()));
        }
        Ok(())
    }

    /// The date/time part of the request, for window validation.
    pub fn candidate(&self) -> AppointmentCandidate {
        AppointmentCandidate::new(self.preferred_date, self.preferred_time.clone())
    }
}

/// A validated viewing ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewViewing {
    pub property_id: DbId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub preferred_date: NaiveDate,
    pub preferred_time: ClockTime,
    pub message: Option<String>,
    pub status: &'static str,
}

impl NewViewing {
    /// Build a `pending` viewing from a request whose date and time have
    /// already passed window validation. Text fields are trimmed and blank
    /// optional fields dropped.
    pub fn pending(request: &ViewingRequest, date: NaiveDate, time: ClockTime) -> Self {
        Self {
            property_id: request.property_id,
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            phone: non_blank(request.phone.as_deref()),
            preferred_date: date,
            preferred_time: time,
            message: non_blank(request.message.as_deref()),
            status: STATUS_PENDING,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
