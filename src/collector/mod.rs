//! Raw motion capture for the polling-rate meter.
//!
//! This module provides platform-specific backends that register for raw
//! mouse motion and deliver one monotonic-timestamped event per hardware
//! report over a bounded channel.

pub mod types;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub mod noop;

// Re-export commonly used types
pub use types::{monotonic_ticks, DeviceKind, MotionEvent, TICKS_PER_SECOND, TICK_TO_SECONDS};

#[cfg(target_os = "macos")]
pub use macos::{check_permission, raise_process_priority, CollectorConfig, CollectorError, MacOSCollector};

/// Platform-agnostic collector type alias
#[cfg(target_os = "macos")]
pub type Collector = MacOSCollector;

#[cfg(target_os = "windows")]
pub use windows::{check_permission, raise_process_priority, CollectorConfig, CollectorError, WindowsCollector};

/// Platform-agnostic collector type alias
#[cfg(target_os = "windows")]
pub type Collector = WindowsCollector;

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub use noop::{check_permission, raise_process_priority, CollectorConfig, CollectorError, NoopCollector};

/// Platform-agnostic collector type alias
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub type Collector = NoopCollector;
