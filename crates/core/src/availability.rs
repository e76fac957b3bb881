//! Viewing availability rules.
//!
//! [`AvailabilityRules`] is the static scheduling policy consulted by the
//! appointment window validator: business hours, slot granularity, the
//! advance-booking horizon, minimum notice and excluded weekdays. A rules
//! value can only be obtained through [`AvailabilityRules::new`] (or serde,
//! which routes through the same checks), so every instance in circulation
//! satisfies its invariants.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{NaiveTime, Timelike, Weekday};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Default opening hour for viewings (09:00).
pub const DEFAULT_START_HOUR: u32 = 9;

/// Default closing hour for viewings (17:00, exclusive).
pub const DEFAULT_END_HOUR: u32 = 17;

/// Default slot length in minutes.
pub const DEFAULT_SLOT_DURATION_MINUTES: i64 = 60;

/// Default advance-booking horizon in calendar days.
pub const DEFAULT_DAYS_IN_ADVANCE: i64 = 30;

/// Default minimum notice in hours.
pub const DEFAULT_MIN_NOTICE_HOURS: i64 = 24;

/// Sunday and Saturday (0 = Sunday .. 6 = Saturday).
pub const DEFAULT_EXCLUDED_WEEKDAYS: &[u8] = &[0, 6];

/// Highest valid weekday index (Saturday).
pub const MAX_WEEKDAY_INDEX: u8 = 6;

/// Longest allowed slot: one full day.
pub const MAX_SLOT_DURATION_MINUTES: i64 = 24 * 60;

// ---------------------------------------------------------------------------
// ClockTime
// ---------------------------------------------------------------------------

/// Accepts `H:MM` or `HH:MM`. ASCII digits only; ranges are checked after
/// matching.
static CLOCK_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{1,2}):([0-9]{2})$").expect("valid regex"));

/// A time of day with minute precision.
///
/// Serialized as a zero-padded `HH:MM` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    /// Build from an hour (0-23) and minute (0-59).
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Parse `H:MM` / `HH:MM`. Returns `None` for anything else, including
    /// out-of-range hours or minutes and surrounding whitespace.
    pub fn parse(input: &str) -> Option<Self> {
        let caps = CLOCK_TIME_RE.captures(input)?;
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps[2].parse().ok()?;
        Self::new(hour, minute)
    }

    /// Truncates seconds and sub-seconds.
    pub fn from_naive_time(time: NaiveTime) -> Self {
        Self(time.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(time))
    }

    pub fn as_naive_time(self) -> NaiveTime {
        self.0
    }

    pub fn hour(self) -> u32 {
        self.0.hour()
    }

    pub fn minute(self) -> u32 {
        self.0.minute()
    }

    /// Minutes elapsed since midnight.
    pub fn minutes_of_day(self) -> i64 {
        i64::from(self.hour()) * 60 + i64::from(self.minute())
    }

    fn from_minutes_of_day(minutes: i64) -> Option<Self> {
        if !(0..24 * 60).contains(&minutes) {
            return None;
        }
        Self::new((minutes / 60) as u32, (minutes % 60) as u32)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            CoreError::Validation(format!("Invalid time '{s}'. Expected H:MM or HH:MM"))
        })
    }
}

impl TryFrom<String> for ClockTime {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Unchecked rule values, as read from configuration or a request body.
///
/// Missing fields fall back to the defaults above.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub slot_duration_minutes: i64,
    pub days_in_advance: i64,
    pub min_notice_hours: i64,
    pub excluded_weekdays: Vec<u8>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            start_time: default_start_time(),
            end_time: default_end_time(),
            slot_duration_minutes: DEFAULT_SLOT_DURATION_MINUTES,
            days_in_advance: DEFAULT_DAYS_IN_ADVANCE,
            min_notice_hours: DEFAULT_MIN_NOTICE_HOURS,
            excluded_weekdays: DEFAULT_EXCLUDED_WEEKDAYS.to_vec(),
        }
    }
}

/// Validated, immutable scheduling policy.
///
/// Invariants:
/// - `start_time < end_time`
/// - `0 < slot_duration_minutes <= MAX_SLOT_DURATION_MINUTES`
/// - `days_in_advance >= 0`, `min_notice_hours >= 0`
/// - excluded weekdays are sorted, deduplicated and within `0..=6`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RulesConfig")]
pub struct AvailabilityRules {
    start_time: ClockTime,
    end_time: ClockTime,
    slot_duration_minutes: i64,
    days_in_advance: i64,
    min_notice_hours: i64,
    excluded_weekdays: Vec<u8>,
}

impl AvailabilityRules {
    /// Check `config` against the rule invariants.
    pub fn new(config: RulesConfig) -> Result<Self, CoreError> {
        if config.start_time >= config.end_time {
            return Err(CoreError::Validation(format!(
                "start_time ({}) must be before end_time ({})",
                config.start_time, config.end_time
            )));
        }
        if !(1..=MAX_SLOT_DURATION_MINUTES).contains(&config.slot_duration_minutes) {
            return Err(CoreError::Validation(format!(
                "slot_duration_minutes must be between 1 and {MAX_SLOT_DURATION_MINUTES}, got {}",
                config.slot_duration_minutes
            )));
        }
        if config.days_in_advance < 0 {
            return Err(CoreError::Validation(format!(
                "days_in_advance must not be negative, got {}",
                config.days_in_advance
            )));
        }
        if config.min_notice_hours < 0 {
            return Err(CoreError::Validation(format!(
                "min_notice_hours must not be negative, got {}",
                config.min_notice_hours
            )));
        }
        if let Some(bad) = config
            .excluded_weekdays
            .iter()
            .find(|&&d| d > MAX_WEEKDAY_INDEX)
        {
            return Err(CoreError::Validation(format!(
                "Excluded weekday {bad} is out of range (0 = Sunday .. 6 = Saturday)"
            )));
        }

        let mut excluded_weekdays = config.excluded_weekdays;
        excluded_weekdays.sort_unstable();
        excluded_weekdays.dedup();

        Ok(Self {
            start_time: config.start_time,
            end_time: config.end_time,
            slot_duration_minutes: config.slot_duration_minutes,
            days_in_advance: config.days_in_advance,
            min_notice_hours: config.min_notice_hours,
            excluded_weekdays,
        })
    }

    pub fn start_time(&self) -> ClockTime {
        self.start_time
    }

    pub fn end_time(&self) -> ClockTime {
        self.end_time
    }

    pub fn slot_duration_minutes(&self) -> i64 {
        self.slot_duration_minutes
    }

    pub fn days_in_advance(&self) -> i64 {
        self.days_in_advance
    }

    pub fn min_notice_hours(&self) -> i64 {
        self.min_notice_hours
    }

    pub fn excluded_weekdays(&self) -> &[u8] {
        &self.excluded_weekdays
    }

    /// Whether no viewings are offered on `weekday`.
    pub fn is_excluded(&self, weekday: Weekday) -> bool {
        let index = weekday.num_days_from_sunday() as u8;
        self.excluded_weekdays.binary_search(&index).is_ok()
    }

    /// Whether `time` lies within business hours, `[start_time, end_time)`.
    pub fn contains_time(&self, time: ClockTime) -> bool {
        self.start_time <= time && time < self.end_time
    }

    /// Whether viewings starting at `a` and `b` would share any part of a
    /// slot, i.e. start less than `slot_duration_minutes` apart.
    pub fn overlaps(&self, a: ClockTime, b: ClockTime) -> bool {
        (a.minutes_of_day() - b.minutes_of_day()).abs() < self.slot_duration_minutes
    }

    /// Slot start times for one business day: `start_time`, then every
    /// `slot_duration_minutes` while still before `end_time`.
    pub fn slot_times(&self) -> Vec<ClockTime> {
        let end = self.end_time.minutes_of_day();
        let mut slots = Vec::new();
        let mut minutes = self.start_time.minutes_of_day();
        while minutes < end {
            match ClockTime::from_minutes_of_day(minutes) {
                Some(slot) => slots.push(slot),
                None => break,
            }
            match minutes.checked_add(self.slot_duration_minutes) {
                Some(next) => minutes = next,
                None => break,
            }
        }
        slots
    }
}

impl Default for AvailabilityRules {
    fn default() -> Self {
        Self {
            start_time: default_start_time(),
            end_time: default_end_time(),
            slot_duration_minutes: DEFAULT_SLOT_DURATION_MINUTES,
            days_in_advance: DEFAULT_DAYS_IN_ADVANCE,
            min_notice_hours: DEFAULT_MIN_NOTICE_HOURS,
            excluded_weekdays: DEFAULT_EXCLUDED_WEEKDAYS.to_vec(),
        }
    }
}

impl TryFrom<RulesConfig> for AvailabilityRules {
    type Error = CoreError;

    fn try_from(config: RulesConfig) -> Result<Self, Self::Error> {
        Self::new(config)
    }
}

/// Parse a comma-separated weekday list such as `"0,6"`.
///
/// An empty or all-whitespace string yields an empty list. Range checking
/// happens in [`AvailabilityRules::new`].
pub fn parse_weekday_list(input: &str) -> Result<Vec<u8>, CoreError> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u8>().map_err(|_| {
                CoreError::Validation(format!("Invalid weekday index '{s}'. Expected 0-6"))
            })
        })
        .collect()
}

fn default_start_time() -> ClockTime {
    ClockTime(NaiveTime::MIN + chrono::Duration::hours(i64::from(DEFAULT_START_HOUR)))
}

fn default_end_time() -> ClockTime {
    ClockTime(NaiveTime::MIN + chrono::Duration::hours(i64::from(DEFAULT_END_HOUR)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
