//! Viewing appointment window validation.
//!
//! [`validate`] decides whether a candidate date/time may be booked under a
//! set of [`AvailabilityRules`]. It is the single shared implementation used
//! by the booking endpoint, the slot picker and the inline "check" endpoint.
//!
//! The function is pure: "now" is supplied by the caller, nothing is read from
//! a system clock, and no time-zone conversion happens. Candidate and "now"
//! are both naive local date-times.

use chrono::{Datelike, Days, NaiveDate, TimeDelta};
use serde::{Deserialize, Deserializer, Serialize};

use crate::availability::{AvailabilityRules, ClockTime};
use crate::types::LocalInstant;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A proposed booking awaiting validation.
///
/// `date` is `None` when the user has not picked a day yet; an empty string
/// on the wire deserializes to `None`. `time` is kept raw so that format
/// problems are reported as a violation instead of a decode error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentCandidate {
    #[serde(default, deserialize_with = "empty_date_as_none")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time: String,
}

impl AppointmentCandidate {
    pub fn new(date: Option<NaiveDate>, time: impl Into<String>) -> Self {
        Self {
            date,
            time: time.into(),
        }
    }
}

/// The rule a candidate broke. Exactly one is reported per validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Violation {
    None,
    MissingFields,
    InvalidTimeFormat,
    TooSoon,
    TooFar,
    ExcludedDay,
    OutsideBusinessHours,
}

impl Violation {
    /// Wire name, e.g. `"TOO_SOON"`.
    pub fn code(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::MissingFields => "MISSING_FIELDS",
            Self::InvalidTimeFormat => "INVALID_TIME_FORMAT",
            Self::TooSoon => "TOO_SOON",
            Self::TooFar => "TOO_FAR",
            Self::ExcludedDay => "EXCLUDED_DAY",
            Self::OutsideBusinessHours => "OUTSIDE_BUSINESS_HOURS",
        }
    }
}

/// Outcome of [`validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub violation: Violation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            violation: Violation::None,
            message: None,
        }
    }

    fn reject(violation: Violation, message: String) -> Self {
        Self {
            valid: false,
            violation,
            message: Some(message),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check `candidate` against `rules` relative to `now`.
///
/// Checks run in a fixed order and the first failure wins:
///
/// 1. date and time present            -> `MISSING_FIELDS`
/// 2. time is `H:MM` / `HH:MM`         -> `INVALID_TIME_FORMAT`
/// 3. instant >= now + min notice      -> `TOO_SOON`
/// 4. instant <= now + days in advance -> `TOO_FAR` (calendar-day addition)
/// 5. weekday not excluded             -> `EXCLUDED_DAY`
/// 6. time in `[start_time, end_time)` -> `OUTSIDE_BUSINESS_HOURS`
pub fn validate(
    candidate: &AppointmentCandidate,
    rules: &AvailabilityRules,
    now: LocalInstant,
) -> ValidationResult {
    let Some(date) = candidate.date else {
        return missing_fields();
    };
    if candidate.time.trim().is_empty() {
        return missing_fields();
    }

    let Some(time) = ClockTime::parse(&candidate.time) else {
        return ValidationResult::reject(
            Violation::InvalidTimeFormat,
            format!(
                "'{}' is not a valid time. Use HH:MM (24-hour)",
                candidate.time
            ),
        );
    };

    check_window(date, time, rules, now)
}

/// Every slot on `date` that would pass [`validate`].
///
/// Slots are the rule's business-day grid (`start_time` stepped by
/// `slot_duration_minutes`). Returns an empty list for excluded days or
/// dates entirely outside the booking window.
pub fn available_slots(
    date: NaiveDate,
    rules: &AvailabilityRules,
    now: LocalInstant,
) -> Vec<ClockTime> {
    rules
        .slot_times()
        .into_iter()
        .filter(|&slot| check_window(date, slot, rules, now).valid)
        .collect()
}

/// Steps 3-6 of [`validate`], on already-parsed input.
fn check_window(
    date: NaiveDate,
    time: ClockTime,
    rules: &AvailabilityRules,
    now: LocalInstant,
) -> ValidationResult {
    let instant = date.and_time(time.as_naive_time());

    let notice = rules.min_notice_hours();
    // Saturating: an absurdly large notice means nothing is ever early enough.
    let too_soon = match TimeDelta::try_hours(notice).and_then(|d| now.checked_add_signed(d)) {
        Some(min_instant) => instant < min_instant,
        None => true,
    };
    if too_soon {
        return ValidationResult::reject(
            Violation::TooSoon,
            format!("Please select a time at least {notice} hours in advance"),
        );
    }

    let horizon = rules.days_in_advance();
    // `days_in_advance` is non-negative by construction.
    let too_far = match now.checked_add_days(Days::new(horizon.unsigned_abs())) {
        Some(max_instant) => instant > max_instant,
        None => false,
    };
    if too_far {
        return ValidationResult::reject(
            Violation::TooFar,
            format!("Please select a date within {horizon} days from today"),
        );
    }

    let weekday = date.weekday();
    if rules.is_excluded(weekday) {
        return ValidationResult::reject(
            Violation::ExcludedDay,
            format!("Viewings are not available on {}", weekday_name(weekday)),
        );
    }

    if !rules.contains_time(time) {
        return ValidationResult::reject(
            Violation::OutsideBusinessHours,
            format!(
                "Please select a time between {} and {}",
                rules.start_time(),
                rules.end_time()
            ),
        );
    }

    ValidationResult::ok()
}

fn missing_fields() -> ValidationResult {
    ValidationResult::reject(
        Violation::MissingFields,
        "Please select both a date and a time".to_string(),
    )
}

fn weekday_name(weekday: chrono::Weekday) -> &'static str {
    use chrono::Weekday::*;
    match weekday {
        Mon => "Mondays",
        Tue => "Tuesdays",
        Wed => "Wednesdays",
        Thu => "Thursdays",
        Fri => "Fridays",
        Sat => "Saturdays",
        Sun => "Sundays",
    }
}

/// Deserialize `""` / `null` / missing as `None`, otherwise `YYYY-MM-DD`.
pub(crate) fn empty_date_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::availability::RulesConfig;

    /// 09:00-17:00, 30 days, 24 hours notice, weekends excluded.
    fn rules() -> AvailabilityRules {
        AvailabilityRules::default()
    }

    /// Monday 2024-06-03 10:00.
    fn now() -> LocalInstant {
        date(2024, 6, 3).and_hms_opt(10, 0, 0).unwrap()
    }

    const ALL_VIOLATIONS: [Violation; 7] = [
        Violation::None,
        Violation::MissingFields,
        Violation::InvalidTimeFormat,
        Violation::TooSoon,
        Violation::TooFar,
        Violation::ExcludedDay,
        Violation::OutsideBusinessHours,
    ];

    #[test]
    fn codes_match_serde_names() {
        for (index, violation) in ALL_VIOLATIONS.into_iter().enumerate() {
            // No wildcard: a new variant fails to compile until listed above.
            let position = match violation {
                Violation::None => 0,
                Violation::MissingFields => 1,
                Violation::InvalidTimeFormat => 2,
                Violation::TooSoon => 3,
                Violation::TooFar => 4,
                Violation::ExcludedDay => 5,
                Violation::OutsideBusinessHours => 6,
            };
            assert_eq!(position, index);

            let wire = serde_json::to_value(violation).unwrap();
            assert_eq!(wire, serde_json::json!(violation.code()));
            assert_eq!(serde_json::from_value::<Violation>(wire).unwrap(), violation);
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn check(d: NaiveDate, time: &str) -> ValidationResult {
        validate(&AppointmentCandidate::new(Some(d), time), &rules(), now())
    }

    // -- Reference scenarios ------------------------------------------------

    #[test]
    fn exactly_min_notice_is_accepted() {
        let result = check(date(2024, 6, 4), "10:00");
        assert!(result.valid);
        assert_eq!(result.violation, Violation::None);
        assert_eq!(result.message, None);
    }

    #[test]
    fn one_minute_before_min_notice_is_too_soon() {
        let result = check(date(2024, 6, 4), "09:59");
        assert!(!result.valid);
        assert_eq!(result.violation, Violation::TooSoon);
        assert_eq!(
            result.message.as_deref(),
            Some("Please select a time at least 24 hours in advance")
        );
    }

    #[test]
    fn sunday_is_excluded() {
        assert_eq!(check(date(2024, 6, 9), "10:00").violation, Violation::ExcludedDay);
    }

    #[test]
    fn saturday_is_excluded() {
        let result = check(date(2024, 6, 8), "10:00");
        assert_eq!(result.violation, Violation::ExcludedDay);
        assert_matches!(result.message, Some(m) if m.contains("Saturdays"));
    }

    #[test]
    fn before_opening_is_outside_business_hours() {
        let result = check(date(2024, 6, 5), "08:30");
        assert_eq!(result.violation, Violation::OutsideBusinessHours);
        assert_eq!(
            result.message.as_deref(),
            Some("Please select a time between 09:00 and 17:00")
        );
    }

    #[test]
    fn beyond_horizon_is_too_far() {
        let result = check(date(2024, 7, 10), "10:00");
        assert_eq!(result.violation, Violation::TooFar);
        assert_matches!(result.message, Some(m) if m.contains("30 days"));
    }

    #[test]
    fn weekday_afternoon_is_valid() {
        assert_eq!(check(date(2024, 6, 5), "14:00"), ValidationResult::ok());
    }

    #[test]
    fn empty_date_is_missing_fields() {
        let candidate: AppointmentCandidate =
            serde_json::from_str(r#"{"date":"","time":"10:00"}"#).unwrap();
        assert_eq!(candidate.date, None);
        let result = validate(&candidate, &rules(), now());
        assert_eq!(result.violation, Violation::MissingFields);
    }

    // -- Presence and format ------------------------------------------------

    #[test]
    fn missing_fields_wins_over_everything() {
        for time in ["", "   "] {
            let result = check(date(2024, 6, 9), time);
            assert_eq!(result.violation, Violation::MissingFields, "time={time:?}");
        }
        let no_date = AppointmentCandidate::new(None, "not-a-time");
        assert_eq!(
            validate(&no_date, &rules(), now()).violation,
            Violation::MissingFields
        );
    }

    #[test]
    fn malformed_times_are_invalid_format() {
        // Even on an otherwise excluded, too-soon day the format check runs first.
        for bad in ["24:00", "9:60", "9", "9:5", "09:00:00", "nine", "09.00"] {
            let result = check(date(2024, 6, 3), bad);
            assert_eq!(result.violation, Violation::InvalidTimeFormat, "time={bad}");
        }
    }

    #[test]
    fn single_digit_hour_is_accepted() {
        assert!(check(date(2024, 6, 5), "9:30").valid);
    }

    // -- Window bounds ---------------------------------------------------------

    #[test]
    fn horizon_boundary_is_inclusive() {
        // now + 30 calendar days = 2024-07-03 10:00 (a Wednesday).
        assert!(check(date(2024, 7, 3), "10:00").valid);
        assert_eq!(check(date(2024, 7, 3), "10:01").violation, Violation::TooFar);
    }

    #[test]
    fn end_time_is_exclusive() {
        assert!(check(date(2024, 6, 5), "16:59").valid);
        assert_eq!(
            check(date(2024, 6, 5), "17:00").violation,
            Violation::OutsideBusinessHours
        );
    }

    #[test]
    fn past_dates_are_too_soon() {
        assert_eq!(check(date(2024, 5, 1), "10:00").violation, Violation::TooSoon);
    }

    #[test]
    fn window_checks_precede_day_and_hour_checks() {
        // Too far and on a Sunday: horizon wins.
        assert_eq!(check(date(2024, 7, 14), "10:00").violation, Violation::TooFar);
        // Too soon and outside hours: notice wins.
        assert_eq!(check(date(2024, 6, 3), "20:00").violation, Violation::TooSoon);
        // Excluded day and outside hours: day wins.
        assert_eq!(check(date(2024, 6, 8), "20:00").violation, Violation::ExcludedDay);
    }

    #[test]
    fn zero_notice_and_zero_horizon_allow_only_now() {
        let rules = AvailabilityRules::new(RulesConfig {
            min_notice_hours: 0,
            days_in_advance: 0,
            excluded_weekdays: vec![],
            ..RulesConfig::default()
        })
        .unwrap();
        let at = |t: &str| validate(&AppointmentCandidate::new(Some(date(2024, 6, 3)), t), &rules, now());
        assert!(at("10:00").valid);
        assert_eq!(at("09:59").violation, Violation::TooSoon);
        assert_eq!(at("10:01").violation, Violation::TooFar);
    }

    #[test]
    fn validation_is_idempotent() {
        let candidate = AppointmentCandidate::new(Some(date(2024, 6, 9)), "10:00");
        let first = validate(&candidate, &rules(), now());
        let second = validate(&candidate, &rules(), now());
        assert_eq!(first, second);
    }

    #[test]
    fn violation_serializes_screaming_snake_case() {
        let json = serde_json::to_value(check(date(2024, 6, 5), "08:30")).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["violation"], "OUTSIDE_BUSINESS_HOURS");
        assert_eq!(Violation::OutsideBusinessHours.code(), "OUTSIDE_BUSINESS_HOURS");

        let ok = serde_json::to_value(ValidationResult::ok()).unwrap();
        assert_eq!(ok["violation"], "NONE");
        assert!(ok.get("message").is_none());
    }

    #[test]
    fn malformed_date_fails_to_deserialize() {
        let parsed =
            serde_json::from_str::<AppointmentCandidate>(r#"{"date":"06/05/2024","time":"10:00"}"#);
        assert!(parsed.is_err());
    }

    // -- available_slots ----------------------------------------------------------

    #[test]
    fn slots_on_open_day_cover_business_hours() {
        let slots = available_slots(date(2024, 6, 5), &rules(), now());
        let labels: Vec<String> = slots.iter().map(ToString::to_string).collect();
        assert_eq!(
            labels,
            ["09:00", "10:00", "11:00", "12:00", "13:00", "14:00", "15:00", "16:00"]
        );
    }

    #[test]
    fn slots_respect_min_notice() {
        let slots = available_slots(date(2024, 6, 4), &rules(), now());
        assert_eq!(slots.first().map(ToString::to_string).as_deref(), Some("10:00"));
        assert_eq!(slots.len(), 7);
    }

    #[test]
    fn no_slots_on_excluded_or_out_of_window_days() {
        assert!(available_slots(date(2024, 6, 9), &rules(), now()).is_empty());
        assert!(available_slots(date(2024, 7, 10), &rules(), now()).is_empty());
        assert!(available_slots(date(2024, 6, 3), &rules(), now()).is_empty());
    }

    #[test]
    fn every_listed_slot_validates() {
        let d = date(2024, 7, 3);
        for slot in available_slots(d, &rules(), now()) {
            let candidate = AppointmentCandidate::new(Some(d), slot.to_string());
            assert!(validate(&candidate, &rules(), now()).valid, "slot {slot}");
        }
    }
}
