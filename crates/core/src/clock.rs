//! "Now" sources.
//!
//! Scheduling functions take "now" as an argument. Services hold a
//! [`Clock`] and read it once per request, so tests can pin time with
//! [`FixedClock`].

use crate::types::LocalInstant;

/// Supplies the current local wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> LocalInstant;
}

/// Reads the host's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> LocalInstant {
        chrono::Local::now().naive_local()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub LocalInstant);

impl Clock for FixedClock {
    fn now(&self) -> LocalInstant {
        self.0
    }
}
