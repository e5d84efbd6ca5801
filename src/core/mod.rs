//! Core measurement pipeline for the polling-rate meter.
//!
//! This module contains:
//! - Event sampling (arrival timestamps → frequency samples)
//! - Rolling statistics (windowed average, peak, counters)
//! - The poll meter tying both to the session log

pub mod meter;
pub mod sampler;
pub mod stats;

// Re-export commonly used types
pub use meter::PollMeter;
pub use sampler::{EventSampler, Sample};
pub use stats::{RollingStats, Snapshot, DEFAULT_WINDOW_CAPACITY};
