//! mousehz - mouse polling-rate meter.
//!
//! This library measures how many raw motion reports per second a pointing
//! device delivers, by timestamping successive events with a monotonic
//! clock and deriving instantaneous, windowed-average, and peak frequency
//! statistics. An optional session log records each accepted sample for
//! CSV export.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                         mousehz                            │
//! ├────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌───────────┐   ┌──────────────────┐     │
//! │  │ Collector │──▶│  Sampler  │──▶│  Rolling Stats   │     │
//! │  │ (OS hook) │   │ (dt → Hz) │   │ (window/peak)    │     │
//! │  └───────────┘   └─────┬─────┘   └────────┬─────────┘     │
//! │                        │                  ▼                │
//! │                        ▼            ┌──────────┐           │
//! │                  ┌───────────┐      │ Snapshot │           │
//! │                  │ SessionLog│      └──────────┘           │
//! │                  │  (CSV)    │                             │
//! │                  └───────────┘                             │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Threading
//!
//! The OS capture callback only stamps the clock and performs a
//! non-blocking channel send. One thread drains that channel and owns the
//! [`PollMeter`] exclusively; all statistics mutation, snapshots, resets,
//! and logging toggles happen on that single thread of control, which is
//! why the core carries no locks.
//!
//! # Example
//!
//! ```no_run
//! use mousehz::{collector, core::PollMeter};
//!
//! let mut collector = collector::Collector::new(collector::CollectorConfig::default());
//! collector.start().expect("raw input registration failed");
//!
//! let mut meter = PollMeter::new(500, std::path::PathBuf::from("mouse_poll_log.csv"));
//! while let Ok(event) = collector.receiver().recv() {
//!     if let Some(snapshot) = meter.on_event(event.ticks) {
//!         println!("{:.0} Hz (avg {:.0})", snapshot.instant_hz, snapshot.average_hz);
//!     }
//! }
//! ```

pub mod collector;
pub mod config;
pub mod core;
pub mod export;

// Re-export key types at crate root for convenience
pub use collector::{Collector, CollectorConfig, CollectorError, DeviceKind, MotionEvent};
pub use config::{Config, ConfigError};
pub use core::{EventSampler, PollMeter, RollingStats, Sample, Snapshot, DEFAULT_WINDOW_CAPACITY};
pub use export::{ExportError, LogRecord, SessionLog, EXPORT_FILENAME};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
