/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Row timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Wall-clock instant in the caller's local time zone.
///
/// Scheduling never converts between zones; "now" and candidate instants
/// are compared as naive local date-times.
pub type LocalInstant = chrono::NaiveDateTime;
