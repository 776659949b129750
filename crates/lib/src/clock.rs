//! Time sources for change timestamps.
//!
//! Commits stamp each [`Change`](crate::change::Change) with the reading of
//! the document's [`Clock`]. Production documents use [`SystemClock`];
//! tests swap in [`FixedClock`] to get reproducible change hashes.
//!
//! ```
//! use accord::{Clock, SystemClock};
//!
//! let clock = SystemClock;
//! assert!(clock.now_millis() > 0);
//! ```

use std::fmt::Debug;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};

#[cfg(any(test, feature = "testing"))]
use std::sync::{Mutex, MutexGuard};

/// A source of wall-clock milliseconds.
pub trait Clock: Send + Sync + Debug {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;

    /// The current reading as a UTC datetime.
    fn now_utc(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.now_millis()).unwrap_or_default()
    }
}

/// Reads the operating system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

/// Deterministic clock for tests.
///
/// Every [`now_millis`](Clock::now_millis) call returns the current value and
/// then advances it by one millisecond, unless the clock is held.
///
/// ```
/// use accord::{Clock, FixedClock};
///
/// let clock = FixedClock::new(1000);
/// assert_eq!(clock.now_millis(), 1000);
/// assert_eq!(clock.now_millis(), 1001);
///
/// let _hold = clock.hold();
/// assert_eq!(clock.now_millis(), clock.now_millis());
/// ```
#[cfg(any(test, feature = "testing"))]
pub struct FixedClock {
    state: Mutex<FixedClockState>,
}

#[cfg(any(test, feature = "testing"))]
struct FixedClockState {
    millis: i64,
    held: bool,
}

/// Keeps a [`FixedClock`] frozen until dropped.
#[cfg(any(test, feature = "testing"))]
pub struct ClockHold<'a>(&'a FixedClock);

#[cfg(any(test, feature = "testing"))]
impl Drop for ClockHold<'_> {
    fn drop(&mut self) {
        self.0.state().held = false;
    }
}

#[cfg(any(test, feature = "testing"))]
impl FixedClock {
    /// Create a clock starting at `millis`.
    pub fn new(millis: i64) -> Self {
        Self {
            state: Mutex::new(FixedClockState {
                millis,
                held: false,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, FixedClockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Freeze the clock until the returned guard is dropped.
    pub fn hold(&self) -> ClockHold<'_> {
        self.state().held = true;
        ClockHold(self)
    }

    /// Move the clock forward by `ms`.
    pub fn advance(&self, ms: i64) {
        self.state().millis += ms;
    }

    /// Jump to an absolute time.
    pub fn set(&self, ms: i64) {
        self.state().millis = ms;
    }

    /// Peek at the current value without advancing.
    pub fn get(&self) -> i64 {
        self.state().millis
    }
}

#[cfg(any(test, feature = "testing"))]
impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        let mut state = self.state();
        let t = state.millis;
        if !state.held {
            state.millis += 1;
        }
        t
    }
}

#[cfg(any(test, feature = "testing"))]
impl Default for FixedClock {
    fn default() -> Self {
        // 2024-01-01 00:00:00 UTC
        Self::new(1_704_067_200_000)
    }
}

#[cfg(any(test, feature = "testing"))]
impl Debug for FixedClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("FixedClock")
            .field("millis", &state.millis)
            .field("held", &state.held)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_advances_per_reading() {
        let clock = FixedClock::new(1000);
        assert_eq!(clock.now_millis(), 1000);
        assert_eq!(clock.now_millis(), 1001);
        assert_eq!(clock.get(), 1002);
    }

    #[test]
    fn hold_freezes_until_dropped() {
        let clock = FixedClock::new(50);
        {
            let _hold = clock.hold();
            assert_eq!(clock.now_millis(), 50);
            assert_eq!(clock.now_millis(), 50);
        }
        assert_eq!(clock.now_millis(), 50);
        assert_eq!(clock.now_millis(), 51);
    }

    #[test]
    fn advance_and_set() {
        let clock = FixedClock::new(0);
        clock.advance(250);
        assert_eq!(clock.get(), 250);
        clock.set(9_000);
        assert_eq!(clock.get(), 9_000);
    }

    #[test]
    fn utc_reading_matches_millis() {
        let clock = FixedClock::default();
        let _hold = clock.hold();
        assert_eq!(clock.now_utc().to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.now_millis() > 1_577_836_800_000);
    }
}
