use lettings_core::availability::{parse_weekday_list, AvailabilityRules, ClockTime, RulesConfig};
use lettings_core::error::CoreError;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Viewing scheduling policy applied to every booking.
    pub viewing_rules: AvailabilityRules,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                 |
    /// |-----------------------------|-------------------------|
    /// | `HOST`                      | `0.0.0.0`               |
    /// | `PORT`                      | `3000`                  |
    /// | `CORS_ORIGINS`              | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                    |
    /// | `VIEWING_START_TIME`        | `09:00`                 |
    /// | `VIEWING_END_TIME`          | `17:00`                 |
    /// | `VIEWING_SLOT_MINUTES`      | `60`                    |
    /// | `VIEWING_DAYS_IN_ADVANCE`   | `30`                    |
    /// | `VIEWING_MIN_NOTICE_HOURS`  | `24`                    |
    /// | `VIEWING_EXCLUDED_WEEKDAYS` | `0,6`                   |
    ///
    /// Panics on malformed values so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let viewing_rules = viewing_rules_from(|key| std::env::var(key).ok())
            .unwrap_or_else(|e| panic!("Invalid viewing rules configuration: {e}"));

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            viewing_rules,
        }
    }
}

/// Build viewing rules from `lookup`, falling back to the defaults for any
/// key it does not provide.
pub fn viewing_rules_from<F>(lookup: F) -> Result<AvailabilityRules, CoreError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = RulesConfig::default();

    if let Some(v) = lookup("VIEWING_START_TIME") {
        config.start_time = v.trim().parse::<ClockTime>()?;
    }
    if let Some(v) = lookup("VIEWING_END_TIME") {
        config.end_time = v.trim().parse::<ClockTime>()?;
    }
    if let Some(v) = lookup("VIEWING_SLOT_MINUTES") {
        config.slot_duration_minutes = parse_int("VIEWING_SLOT_MINUTES", &v)?;
    }
    if let Some(v) = lookup("VIEWING_DAYS_IN_ADVANCE") {
        config.days_in_advance = parse_int("VIEWING_DAYS_IN_ADVANCE", &v)?;
    }
    if let Some(v) = lookup("VIEWING_MIN_NOTICE_HOURS") {
        config.min_notice_hours = parse_int("VIEWING_MIN_NOTICE_HOURS", &v)?;
    }
    if let Some(v) = lookup("VIEWING_EXCLUDED_WEEKDAYS") {
        config.excluded_weekdays = parse_weekday_list(&v)?;
    }

    AvailabilityRules::new(config)
}

fn parse_int(key: &str, value: &str) -> Result<i64, CoreError> {
    value
        .trim()
        .parse()
        .map_err(|_| CoreError::Validation(format!("{key} must be an integer, got '{value}'")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn no_overrides_yields_defaults() {
        let rules = viewing_rules_from(lookup(&[])).unwrap();
        assert_eq!(rules, AvailabilityRules::default());
    }

    #[test]
    fn overrides_are_applied() {
        let rules = viewing_rules_from(lookup(&[
            ("VIEWING_START_TIME", "8:00"),
            ("VIEWING_END_TIME", "20:00"),
            ("VIEWING_SLOT_MINUTES", "30"),
            ("VIEWING_DAYS_IN_ADVANCE", "14"),
            ("VIEWING_MIN_NOTICE_HOURS", "2"),
            ("VIEWING_EXCLUDED_WEEKDAYS", ""),
        ]))
        .unwrap();
        assert_eq!(rules.start_time().to_string(), "08:00");
        assert_eq!(rules.end_time().to_string(), "20:00");
        assert_eq!(rules.slot_duration_minutes(), 30);
        assert_eq!(rules.days_in_advance(), 14);
        assert_eq!(rules.min_notice_hours(), 2);
        assert!(rules.excluded_weekdays().is_empty());
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert_matches!(
            viewing_rules_from(lookup(&[("VIEWING_SLOT_MINUTES", "hourly")])),
            Err(CoreError::Validation(m)) if m.contains("VIEWING_SLOT_MINUTES")
        );
        assert!(viewing_rules_from(lookup(&[("VIEWING_START_TIME", "9am")])).is_err());
        assert!(viewing_rules_from(lookup(&[("VIEWING_MIN_NOTICE_HOURS", "-4")])).is_err());
        assert!(viewing_rules_from(lookup(&[("VIEWING_END_TIME", "08:00")])).is_err());
        assert!(
            viewing_rules_from(lookup(&[("VIEWING_SLOT_MINUTES", "9223372036854775807")])).is_err()
        );
    }
}
