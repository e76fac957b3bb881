//! Pagination helpers shared by list endpoints.

/// Default page size for viewing lists.
pub const DEFAULT_LIMIT: i64 = 50;

/// Largest page size a client may request.
pub const MAX_LIMIT: i64 = 200;

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(clamp_limit(None, DEFAULT_LIMIT, MAX_LIMIT), 50);
        assert_eq!(clamp_limit(Some(0), DEFAULT_LIMIT, MAX_LIMIT), 1);
        assert_eq!(clamp_limit(Some(-5), DEFAULT_LIMIT, MAX_LIMIT), 1);
        assert_eq!(clamp_limit(Some(1_000), DEFAULT_LIMIT, MAX_LIMIT), 200);
        assert_eq!(clamp_limit(Some(20), DEFAULT_LIMIT, MAX_LIMIT), 20);
    }

    #[test]
    fn offset_is_non_negative() {
        assert_eq!(clamp_offset(None), 0);
        assert_eq!(clamp_offset(Some(-3)), 0);
        assert_eq!(clamp_offset(Some(40)), 40);
    }
}
