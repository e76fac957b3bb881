//! Viewing appointment entity model and DTOs.

use chrono::{NaiveDate, NaiveTime};
use lettings_core::availability::ClockTime;
use lettings_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize, Serializer};
use sqlx::FromRow;

/// A row from the `viewings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Viewing {
    pub id: DbId,
    pub property_id: DbId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub preferred_date: NaiveDate,
    #[serde(serialize_with = "serialize_hh_mm")]
    pub preferred_time: NaiveTime,
    pub message: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for changing a viewing's status.
#[derive(Debug, Deserialize)]
pub struct UpdateViewingStatus {
    pub status: String,
}

/// Query parameters for listing viewings.
#[derive(Debug, Deserialize)]
pub struct ViewingListParams {
    pub property_id: Option<DbId>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Times are stored as `TIME` but exposed the way they are entered, `HH:MM`.
fn serialize_hh_mm<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&ClockTime::from_naive_time(*time))
}
