//! Event sampling: turning raw arrival timestamps into frequency samples.
//!
//! The sampler owns the "previous timestamp" state. Each accepted event
//! pair yields one [`Sample`] carrying the elapsed time and its reciprocal,
//! the instantaneous polling frequency.

use crate::collector::types::TICK_TO_SECONDS;
use serde::{Deserialize, Serialize};

/// One accepted timing measurement.
///
/// Invariant: `dt_seconds > 0` and `hz == 1 / dt_seconds`. A sample is
/// never constructed from a non-positive delta.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Sample {
    /// Elapsed time since the previous event, in seconds
    pub dt_seconds: f64,
    /// Instantaneous frequency, `1 / dt_seconds`
    pub hz: f64,
}

/// Derives frequency samples from successive monotonic timestamps.
#[derive(Debug)]
pub struct EventSampler {
    /// Tick count of the previous event, unset until the baseline arrives
    last_ticks: Option<u64>,
    /// Seconds per tick of the driving clock
    tick_to_seconds: f64,
}

impl EventSampler {
    /// Create a sampler for the process monotonic clock (nanosecond ticks).
    pub fn new() -> Self {
        Self::with_tick_scale(TICK_TO_SECONDS)
    }

    /// Create a sampler with an explicit tick-to-seconds conversion factor.
    pub fn with_tick_scale(tick_to_seconds: f64) -> Self {
        Self {
            last_ticks: None,
            tick_to_seconds,
        }
    }

    /// Process one event arrival.
    ///
    /// The first event after construction or [`reset`](Self::reset)
    /// establishes the baseline and produces nothing. A zero or negative
    /// delta (duplicate timestamp, clock anomaly) also produces nothing,
    /// but still replaces the stored timestamp so one degenerate event
    /// cannot poison subsequent measurements.
    pub fn on_event(&mut self, now_ticks: u64) -> Option<Sample> {
        let last = self.last_ticks.replace(now_ticks)?;

        // checked_sub keeps a backwards-jumping clock from wrapping
        let delta = now_ticks.checked_sub(last)?;
        let dt = delta as f64 * self.tick_to_seconds;
        if dt <= 0.0 {
            return None;
        }

        Some(Sample {
            dt_seconds: dt,
            hz: 1.0 / dt,
        })
    }

    /// Drop the stored baseline; the next event starts fresh.
    pub fn reset(&mut self) {
        self.last_ticks = None;
    }
}

impl Default for EventSampler {
    fn default() -> Self {
        Self::new()
    }
}
