//! Event types shared by the platform capture backends.
//!
//! A motion event carries nothing but its arrival time and the kind of
//! device that produced it. Position, buttons, and deltas are irrelevant
//! to polling-rate measurement and are never captured.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Instant;

/// Resolution of the monotonic tick clock (nanoseconds).
pub const TICKS_PER_SECOND: u64 = 1_000_000_000;

/// Seconds per tick of the monotonic clock.
pub const TICK_TO_SECONDS: f64 = 1.0 / TICKS_PER_SECOND as f64;

fn clock_origin() -> Instant {
    static ORIGIN: OnceLock<Instant> = OnceLock::new();
    *ORIGIN.get_or_init(Instant::now)
}

/// Current monotonic tick count.
///
/// Ticks are nanoseconds since an arbitrary process-local origin. Only
/// differences between readings are meaningful; absolute values must not
/// be compared across runs.
pub fn monotonic_ticks() -> u64 {
    clock_origin().elapsed().as_nanos() as u64
}

/// Which kind of input device produced a raw event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceKind {
    Mouse,
    Keyboard,
    Other,
}

/// A raw motion report, reduced to its arrival time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MotionEvent {
    /// Monotonic tick count captured at delivery
    pub ticks: u64,
    /// Device that produced the report
    pub device: DeviceKind,
}

impl MotionEvent {
    /// Create a mouse motion event stamped with the current tick count.
    pub fn mouse() -> Self {
        Self {
            ticks: monotonic_ticks(),
            device: DeviceKind::Mouse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_monotonic() {
        let a = monotonic_ticks();
        let b = monotonic_ticks();
        assert!(b >= a);
    }

    #[test]
    fn test_mouse_event_kind() {
        let event = MotionEvent::mouse();
        assert_eq!(event.device, DeviceKind::Mouse);
    }

    #[test]
    fn test_tick_scale() {
        assert!((TICK_TO_SECONDS * TICKS_PER_SECOND as f64 - 1.0).abs() < 1e-12);
    }
}
