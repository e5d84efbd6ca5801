//! Rolling statistics over recent frequency samples.
//!
//! A fixed-capacity FIFO of the most recent instantaneous frequencies
//! backs the windowed average. The sum over the window is maintained
//! incrementally so every operation stays O(1) per event regardless of
//! the window size.

use crate::core::sampler::Sample;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default capacity of the rolling frequency window.
pub const DEFAULT_WINDOW_CAPACITY: usize = 500;

/// Read-only view of the current statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Frequency of the most recent accepted sample (0 before the first)
    pub instant_hz: f64,
    /// Mean frequency over the rolling window (0 while the window is empty)
    pub average_hz: f64,
    /// Number of samples currently in the window
    pub window_count: usize,
    /// Highest instantaneous frequency since the last reset
    pub peak_hz: f64,
    /// Count of accepted samples since the last reset
    pub total_samples: u64,
}

impl Snapshot {
    fn empty() -> Self {
        Self {
            instant_hz: 0.0,
            average_hz: 0.0,
            window_count: 0,
            peak_hz: 0.0,
            total_samples: 0,
        }
    }
}

/// Rolling statistics engine.
pub struct RollingStats {
    window: VecDeque<f64>,
    capacity: usize,
    running_sum: f64,
    instant_hz: f64,
    peak_hz: f64,
    total_samples: u64,
}

impl RollingStats {
    /// Create an engine with the default window capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_WINDOW_CAPACITY)
    }

    /// Create an engine with an explicit window capacity (must be >= 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
            running_sum: 0.0,
            instant_hz: 0.0,
            peak_hz: 0.0,
            total_samples: 0,
        }
    }

    /// Fold one accepted sample into the statistics and return the
    /// resulting snapshot.
    pub fn accept(&mut self, sample: &Sample) -> Snapshot {
        self.window.push_back(sample.hz);
        self.running_sum += sample.hz;

        if self.window.len() > self.capacity {
            // Strict FIFO eviction, oldest first
            if let Some(evicted) = self.window.pop_front() {
                self.running_sum -= evicted;
            }
        }

        self.instant_hz = sample.hz;
        if sample.hz > self.peak_hz {
            self.peak_hz = sample.hz;
        }
        self.total_samples += 1;

        // window length is >= 1 here, so the division is safe
        Snapshot {
            instant_hz: self.instant_hz,
            average_hz: self.running_sum / self.window.len() as f64,
            window_count: self.window.len(),
            peak_hz: self.peak_hz,
            total_samples: self.total_samples,
        }
    }

    /// Current snapshot; valid anytime, including before the first sample.
    pub fn snapshot(&self) -> Snapshot {
        if self.window.is_empty() {
            return Snapshot {
                total_samples: self.total_samples,
                ..Snapshot::empty()
            };
        }

        Snapshot {
            instant_hz: self.instant_hz,
            average_hz: self.running_sum / self.window.len() as f64,
            window_count: self.window.len(),
            peak_hz: self.peak_hz,
            total_samples: self.total_samples,
        }
    }

    /// Clear the window, sum, peak, and counters.
    pub fn reset(&mut self) {
        self.window.clear();
        self.running_sum = 0.0;
        self.instant_hz = 0.0;
        self.peak_hz = 0.0;
        self.total_samples = 0;
    }

    /// Configured window capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for RollingStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(hz: f64) -> Sample {
        Sample {
            dt_seconds: 1.0 / hz,
            hz,
        }
    }

    #[test]
    fn test_single_sample() {
        let mut stats = RollingStats::new();
        let snap = stats.accept(&sample(100.0));

        assert_eq!(snap.instant_hz, 100.0);
        assert_eq!(snap.average_hz, 100.0);
        assert_eq!(snap.window_count, 1);
        assert_eq!(snap.peak_hz, 100.0);
        assert_eq!(snap.total_samples, 1);
    }

    #[test]
    fn test_window_bound_and_eviction() {
        let mut stats = RollingStats::with_capacity(3);
        for hz in [10.0, 20.0, 30.0, 40.0] {
            stats.accept(&sample(hz));
        }

        let snap = stats.snapshot();
        assert_eq!(snap.window_count, 3);
        // 10.0 was evicted; the average covers exactly [20, 30, 40]
        assert!((snap.average_hz - 30.0).abs() < 1e-9);
        assert_eq!(snap.total_samples, 4);
    }

    #[test]
    fn test_incremental_average_matches_window_sum() {
        let mut stats = RollingStats::with_capacity(50);
        let mut kept: Vec<f64> = Vec::new();

        for i in 1..=200u32 {
            let hz = 50.0 + (i as f64 * 7.3) % 950.0;
            kept.push(hz);
            if kept.len() > 50 {
                kept.remove(0);
            }
            let snap = stats.accept(&sample(hz));

            let expected: f64 = kept.iter().sum();
            assert!((snap.average_hz * snap.window_count as f64 - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_peak_monotonic() {
        let mut stats = RollingStats::new();
        let mut last_peak = 0.0;
        for hz in [100.0, 500.0, 250.0, 125.0, 1000.0, 60.0] {
            let snap = stats.accept(&sample(hz));
            assert!(snap.peak_hz >= last_peak);
            last_peak = snap.peak_hz;
        }
        assert_eq!(last_peak, 1000.0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut stats = RollingStats::new();
        stats.accept(&sample(100.0));
        stats.accept(&sample(200.0));

        stats.reset();
        let snap = stats.snapshot();
        assert_eq!(snap.instant_hz, 0.0);
        assert_eq!(snap.average_hz, 0.0);
        assert_eq!(snap.window_count, 0);
        assert_eq!(snap.peak_hz, 0.0);
        assert_eq!(snap.total_samples, 0);
    }

    #[test]
    fn test_large_sequence_never_exceeds_capacity() {
        let mut stats = RollingStats::new();
        for i in 0..1200u32 {
            let snap = stats.accept(&sample(100.0 + i as f64));
            assert!(snap.window_count <= DEFAULT_WINDOW_CAPACITY);
        }
        assert_eq!(stats.snapshot().window_count, DEFAULT_WINDOW_CAPACITY);
        assert_eq!(stats.snapshot().total_samples, 1200);
    }

    #[test]
    fn test_empty_snapshot() {
        let stats = RollingStats::new();
        let snap = stats.snapshot();
        assert_eq!(snap.window_count, 0);
        assert_eq!(snap.average_hz, 0.0);
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let stats = RollingStats::with_capacity(0);
        assert_eq!(stats.capacity(), 1);
    }
}
