//! Repository for the `viewings` table.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use lettings_core::availability::ClockTime;
use lettings_core::booking::ViewingStore;
use lettings_core::types::DbId;
use lettings_core::viewing::{NewViewing, SLOT_HOLDING_STATUSES};
use sqlx::PgPool;

use crate::models::viewing::Viewing;

/// Column list for `viewings` queries.
const COLUMNS: &str = "\
    id, property_id, name, email, phone, \
    preferred_date, preferred_time, message, status, created_at, updated_at";

/// Provides CRUD operations for viewings.
pub struct ViewingRepo;

impl ViewingRepo {
    /// Insert a new viewing, returning the full row.
    pub async fn create(pool: &PgPool, input: &NewViewing) -> Result<Viewing, sqlx::Error> {
        let query = format!(
            "INSERT INTO viewings \
                (property_id, name, email, phone, preferred_date, preferred_time, message, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Viewing>(&query)
            .bind(input.property_id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(input.preferred_date)
            .bind(input.preferred_time.as_naive_time())
            .bind(&input.message)
            .bind(input.status)
            .fetch_one(pool)
            .await
    }

    /// Find a viewing by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Viewing>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM viewings WHERE id = $1");
        sqlx::query_as::<_, Viewing>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List viewings with optional filters for property and status.
    ///
    /// Results are ordered newest-first.
    pub async fn list_filtered(
        pool: &PgPool,
        property_id: Option<DbId>,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Viewing>, sqlx::Error> {
        let mut conditions: Vec<String> = Vec::new();
        let mut param_idx: usize = 1;

        if property_id.is_some() {
            conditions.push(format!("property_id = ${param_idx}"));
            param_idx += 1;
        }
        if status.is_some() {
            conditions.push(format!("status = ${param_idx}"));
            param_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM viewings {where_clause} \
             ORDER BY created_at DESC, id DESC \
             LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let mut q = sqlx::query_as::<_, Viewing>(&query);

        if let Some(pid) = property_id {
            q = q.bind(pid);
        }
        if let Some(s) = status {
            q = q.bind(s);
        }
        q = q.bind(limit).bind(offset);

        q.fetch_all(pool).await
    }

    /// Start times on `date` held by a live (pending/confirmed) viewing.
    pub async fn booked_times(
        pool: &PgPool,
        property_id: DbId,
        date: NaiveDate,
    ) -> Result<Vec<NaiveTime>, sqlx::Error> {
        let statuses: Vec<String> = SLOT_HOLDING_STATUSES.iter().map(|s| s.to_string()).collect();
        let rows: Vec<(NaiveTime,)> = sqlx::query_as(
            "SELECT preferred_time FROM viewings \
             WHERE property_id = $1 AND preferred_date = $2 AND status = ANY($3) \
             ORDER BY preferred_time",
        )
        .bind(property_id)
        .bind(date)
        .bind(&statuses)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(t,)| t).collect())
    }

    /// Move a viewing from `expected_status` to `new_status`.
    ///
    /// Returns `None` when the row is missing or its status is no longer
    /// `expected_status`, so a transition validated against a stale read
    /// never lands.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        expected_status: &str,
        new_status: &str,
    ) -> Result<Option<Viewing>, sqlx::Error> {
        let query = format!(
            "UPDATE viewings SET status = $1 WHERE id = $2 AND status = $3 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Viewing>(&query)
            .bind(new_status)
            .bind(id)
            .bind(expected_status)
            .fetch_optional(pool)
            .await
    }
}

/// [`ViewingStore`] backed by PostgreSQL.
#[derive(Clone)]
pub struct PgViewingStore {
    pool: PgPool,
}

impl PgViewingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ViewingStore for PgViewingStore {
    type Record = Viewing;
    type Error = sqlx::Error;

    async fn booked_times(
        &self,
        property_id: DbId,
        date: NaiveDate,
    ) -> Result<Vec<ClockTime>, sqlx::Error> {
        let times = ViewingRepo::booked_times(&self.pool, property_id, date).await?;
        Ok(times.into_iter().map(ClockTime::from_naive_time).collect())
    }

    async fn insert_pending(&self, viewing: &NewViewing) -> Result<Viewing, sqlx::Error> {
        let row = ViewingRepo::create(&self.pool, viewing).await?;
        tracing::debug!(
            viewing_id = row.id,
            property_id = row.property_id,
            "Viewing row inserted",
        );
        Ok(row)
    }
}
