//! # Controller configuration.
//!
//! Provides [`ControllerConfig`], the settings for the admission loop and
//! the event system.
//!
//! Unlike many knobs of this shape, `max_concurrent = 0` is **not** a
//! sentinel for "unlimited": the ceiling is load-bearing, so zero is rejected
//! at construction with
//! [`ControllerError::InvalidConcurrency`](crate::ControllerError).

use std::time::Duration;

use crate::error::ControllerError;

/// Configuration for a [`Controller`](crate::Controller).
///
/// Three knobs:
/// - `max_concurrent`: worker ceiling (must be ≥ 1; validated at build time)
/// - `poll_interval`: admission loop park fallback (min 1ms; clamped)
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
///
/// Fields are public; the `*_clamped` accessors keep the clamping in one
/// place.
#[derive(Clone, Debug)]
pub struct ControllerConfig {
    /// Maximum number of workers running concurrently.
    ///
    /// The admission loop never holds more than this many live workers;
    /// remaining records wait in FIFO order. Must be at least 1.
    pub max_concurrent: usize,

    /// Upper bound on how long the admission loop parks between passes.
    ///
    /// The loop normally wakes on worker-completion signals; this interval
    /// bounds the stall when a signal races ahead of the join handle
    /// flipping to finished.
    pub poll_interval: Duration,

    /// Ring size of the event broadcast channel.
    ///
    /// A receiver that falls more than this many events behind gets
    /// `Lagged` and skips the oldest items. Minimum value is 1 (enforced
    /// by Bus).
    pub bus_capacity: usize,
}

impl ControllerConfig {
    /// Rejects configurations the admission loop cannot honor.
    pub fn validate(&self) -> Result<(), ControllerError> {
        if self.max_concurrent == 0 {
            return Err(ControllerError::InvalidConcurrency);
        }
        Ok(())
    }

    /// Returns the park interval clamped to a minimum of 1ms.
    ///
    /// A zero interval would turn the admission loop into a busy spin.
    #[inline]
    pub fn poll_interval_clamped(&self) -> Duration {
        self.poll_interval.max(Duration::from_millis(1))
    }

    /// Returns the bus capacity clamped to a minimum of 1.
    ///
    /// `broadcast::channel` panics on zero, so the builder goes through
    /// this accessor.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for ControllerConfig {
    /// Defaults: `max_concurrent = 1` (strictly sequential drain),
    /// `poll_interval = 100ms`, `bus_capacity = 1024`.
    fn default() -> Self {
        Self {
            max_concurrent: 1,
            poll_interval: Duration::from_millis(100),
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_sequential() {
        let cfg = ControllerConfig::default();
        assert_eq!(cfg.max_concurrent, 1);
        assert_eq!(cfg.poll_interval, Duration::from_millis(100));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_ceiling_is_rejected() {
        let cfg = ControllerConfig {
            max_concurrent: 0,
            ..ControllerConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ControllerError::InvalidConcurrency));
    }

    #[test]
    fn clamps_guard_degenerate_values() {
        let cfg = ControllerConfig {
            max_concurrent: 2,
            poll_interval: Duration::ZERO,
            bus_capacity: 0,
        };
        assert_eq!(cfg.poll_interval_clamped(), Duration::from_millis(1));
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
