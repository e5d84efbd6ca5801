//! The poll meter: sampler, rolling statistics, and session log behind
//! one control surface.
//!
//! A `PollMeter` is owned exclusively by the thread that drains the
//! collector channel, so every mutation happens on a single logical
//! thread of control and no locking is required. Readers elsewhere must
//! go through that thread (or wrap the meter in a mutex themselves).

use std::path::{Path, PathBuf};

use crate::core::sampler::{EventSampler, Sample};
use crate::core::stats::{RollingStats, Snapshot};
use crate::export::{ExportError, LogRecord, SessionLog};

/// Aggregates the measurement pipeline and exposes the control commands.
pub struct PollMeter {
    sampler: EventSampler,
    stats: RollingStats,
    log: SessionLog,
    export_path: PathBuf,
}

impl PollMeter {
    /// Create a meter with the given window capacity and CSV export path.
    pub fn new(window_capacity: usize, export_path: PathBuf) -> Self {
        Self {
            sampler: EventSampler::new(),
            stats: RollingStats::with_capacity(window_capacity),
            log: SessionLog::new(),
            export_path,
        }
    }

    /// Replace the sampler, e.g. to drive the meter from a coarser clock.
    pub fn with_sampler(mut self, sampler: EventSampler) -> Self {
        self.sampler = sampler;
        self
    }

    /// Feed one raw event arrival.
    ///
    /// Returns the updated snapshot when the event produced a sample, or
    /// `None` for baseline and degenerate events, which leave every
    /// statistic untouched. Infallible: a raw event can never error, only
    /// decline to produce output.
    pub fn on_event(&mut self, now_ticks: u64) -> Option<Snapshot> {
        let sample = self.sampler.on_event(now_ticks)?;
        self.record(&sample);
        Some(self.stats.accept(&sample))
    }

    fn record(&mut self, sample: &Sample) {
        if self.log.is_enabled() {
            self.log.record(LogRecord::from_sample(sample));
        }
    }

    /// Read-only snapshot; safe to call anytime.
    pub fn snapshot(&self) -> Snapshot {
        self.stats.snapshot()
    }

    /// Clear all statistics and the timing baseline.
    ///
    /// The next event is treated as a fresh baseline rather than a
    /// spurious huge or zero delta.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
        self.sampler.reset();
    }

    /// Begin accumulating log records.
    pub fn start_logging(&mut self) {
        self.log.enable();
    }

    /// Stop logging and export the accumulated records as CSV.
    ///
    /// Returns the export path on success. On failure the buffer is kept
    /// so [`export_log`](Self::export_log) can retry.
    pub fn stop_logging(&mut self) -> Result<PathBuf, ExportError> {
        let path = self.export_path.clone();
        self.log.disable(&path)?;
        Ok(path)
    }

    /// Re-attempt an export without touching the logging state.
    pub fn export_log(&self) -> Result<&Path, ExportError> {
        self.log.export_to(&self.export_path)?;
        Ok(&self.export_path)
    }

    /// Whether logging is currently active.
    pub fn is_logging(&self) -> bool {
        self.log.is_enabled()
    }

    /// Number of records waiting in the log buffer.
    pub fn pending_records(&self) -> usize {
        self.log.len()
    }

    /// The CSV destination for this session.
    pub fn export_path(&self) -> &Path {
        &self.export_path
    }
}
