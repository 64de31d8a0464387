//! Microsecond clock and time-unit helpers
//!
//! All series timestamps are epoch microseconds held in a `u64`. Windows are
//! given in seconds relative to a series' start time and converted here.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Microseconds in one second
pub const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Convert seconds to whole microseconds, truncating toward zero.
///
/// Negative and NaN inputs saturate to 0.
#[inline]
pub fn secs_to_micros(secs: f64) -> u64 {
    (secs * MICROS_PER_SECOND) as u64
}

/// Convert a microsecond span to fractional seconds
#[inline]
pub fn micros_to_secs(micros: u64) -> f64 {
    micros as f64 / MICROS_PER_SECOND
}

/// Source of "now" in epoch microseconds
pub trait Clock: Send + Sync {
    /// Current time in microseconds since the Unix epoch
    fn now_us(&self) -> u64;
}

/// Wall-clock time from the standard library
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_us(&self) -> u64 {
        // A clock set before 1970 reads as the epoch itself
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or(0)
    }
}

/// Manually driven clock for tests and replays
#[derive(Debug, Default)]
pub struct FixedClock {
    micros: AtomicU64,
}

impl FixedClock {
    pub fn new(initial_us: u64) -> Self {
        Self {
            micros: AtomicU64::new(initial_us),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, micros: u64) {
        self.micros.fetch_add(micros, Ordering::Relaxed);
    }

    pub fn set(&self, micros: u64) {
        self.micros.store(micros, Ordering::Relaxed);
    }
}

impl Clock for FixedClock {
    fn now_us(&self) -> u64 {
        self.micros.load(Ordering::Relaxed)
    }
}
