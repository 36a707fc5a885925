//! Bounded retry policy for optimistic writes.
//!
//! Contention is bounded by attempt count, never by wall-clock time. A writer
//! asks [`RetryPolicy::attempts`] for the attempt numbers it may use and gives
//! up with a typed error once they run out.

use std::ops::RangeInclusive;

/// Attempts used when no explicit bound is configured.
pub const DEFAULT_MAX_WRITE_ATTEMPTS: u32 = 5;

/// Upper limit accepted from configuration.
pub const MAX_CONFIGURABLE_ATTEMPTS: u32 = 50;

/// How many times a conflicting write transaction is attempted in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
}

impl RetryPolicy {
    /// Build a policy, clamping the bound to `1..=MAX_CONFIGURABLE_ATTEMPTS`.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.clamp(1, MAX_CONFIGURABLE_ATTEMPTS),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// 1-based attempt numbers, first attempt included.
    pub fn attempts(&self) -> RangeInclusive<u32> {
        1..=self.max_attempts
    }

    /// Whether another attempt may follow attempt number `attempt`.
    pub fn has_next(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_WRITE_ATTEMPTS)
    }
}
