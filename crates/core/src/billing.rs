//! # Session Billing
//!
//! Turns the length of a parking session into a charge. Elapsed time is billed
//! per started minute and multiplied by a flat per-minute rate. Charges are kept
//! unrounded; [`present_charge`] truncates to cents for display only.

use chrono::{DateTime, Utc};

use crate::errors::{ParkError, ParkResult};

/// Currency units charged per billed minute unless configured otherwise.
pub const DEFAULT_RATE_PER_MINUTE: f64 = 0.05;

const MILLIS_PER_MINUTE: i64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionBilling {
    rate_per_minute: f64,
}

impl Default for SessionBilling {
    fn default() -> Self {
        Self {
            rate_per_minute: DEFAULT_RATE_PER_MINUTE,
        }
    }
}

impl SessionBilling {
    /// Creates a billing policy with a custom rate.
    ///
    /// # Errors
    ///
    /// * `ParkError::InvalidArgument` - the rate is negative, NaN or infinite
    pub fn new(rate_per_minute: f64) -> ParkResult<Self> {
        if !rate_per_minute.is_finite() || rate_per_minute < 0.0 {
            return Err(ParkError::InvalidArgument(format!(
                "Rate per minute must be a non-negative number, got {}",
                rate_per_minute
            )));
        }
        Ok(Self { rate_per_minute })
    }

    pub fn rate_per_minute(&self) -> f64 {
        self.rate_per_minute
    }

    /// Charge for `total_minutes` billed minutes.
    ///
    /// # Errors
    ///
    /// * `ParkError::InvalidArgument` - `total_minutes` is negative
    pub fn compute(&self, total_minutes: i64) -> ParkResult<f64> {
        if total_minutes < 0 {
            return Err(ParkError::InvalidArgument(format!(
                "Total time cannot be negative, got {} minutes",
                total_minutes
            )));
        }
        Ok(total_minutes as f64 * self.rate_per_minute)
    }
}

/// Whole minutes between `start` and `end`, rounded up. Any started minute
/// counts as a full one.
///
/// When `end` precedes `start` the result truncates toward zero, so an end
/// less than a minute early yields 0. Callers must reject that ordering first.
pub fn billable_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let elapsed_ms = (end - start).num_milliseconds();
    let whole = elapsed_ms / MILLIS_PER_MINUTE;
    if elapsed_ms % MILLIS_PER_MINUTE > 0 {
        whole + 1
    } else {
        whole
    }
}

/// Formats a charge with two decimals, truncating rather than rounding.
pub fn present_charge(charge: f64) -> String {
    // The epsilon absorbs representation error such as 0.29 * 100 = 28.999...
    let cents = (charge * 100.0 + 1e-9).trunc();
    format!("{:.2}", cents / 100.0)
}
