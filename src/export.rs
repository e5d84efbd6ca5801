//! Session log accumulation and CSV export.
//!
//! While logging is enabled, every accepted sample is appended to an
//! in-memory buffer as a [`LogRecord`]. Stopping the log exports the
//! buffer as a CSV file; the buffer is cleared only after the write
//! succeeds, so a failed export can be retried without data loss.

use chrono::{DateTime, Local, SecondsFormat};
use std::path::{Path, PathBuf};

use crate::core::sampler::Sample;

/// Constant export filename.
pub const EXPORT_FILENAME: &str = "mouse_poll_log.csv";

/// Header row of the exported CSV.
pub const CSV_HEADER: &str = "timestamp,dt_seconds,hz";

/// One logged timing measurement.
#[derive(Debug, Clone)]
pub struct LogRecord {
    /// Wall-clock time the sample was accepted
    pub timestamp: DateTime<Local>,
    /// Elapsed time between the two events, in seconds
    pub dt_seconds: f64,
    /// Instantaneous frequency
    pub hz: f64,
}

impl LogRecord {
    /// Create a record for a sample accepted now.
    pub fn from_sample(sample: &Sample) -> Self {
        Self {
            timestamp: Local::now(),
            dt_seconds: sample.dt_seconds,
            hz: sample.hz,
        }
    }

    /// Render as a CSV data row.
    fn to_csv_row(&self) -> String {
        format!(
            "{},{:.9},{:.2}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, false),
            self.dt_seconds,
            self.hz
        )
    }
}

/// Errors that can occur while exporting the session log.
#[derive(Debug)]
pub enum ExportError {
    /// The export directory could not be created
    DirectoryCreation(String),
    /// Writing the CSV file failed
    Io(String),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::DirectoryCreation(e) => {
                write!(f, "Could not create export directory: {e}")
            }
            ExportError::Io(e) => write!(f, "Could not write CSV file: {e}"),
        }
    }
}

impl std::error::Error for ExportError {}

/// Ordered accumulator of log records for one logging session.
pub struct SessionLog {
    enabled: bool,
    records: Vec<LogRecord>,
}

impl SessionLog {
    /// Create an empty, disabled log.
    pub fn new() -> Self {
        Self {
            enabled: false,
            records: Vec::new(),
        }
    }

    /// Whether records are currently being accepted.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of buffered records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Start accepting records.
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Append a record; no-op while disabled.
    pub fn record(&mut self, record: LogRecord) {
        if self.enabled {
            self.records.push(record);
        }
    }

    /// Stop accepting records and export the buffer to `path`.
    ///
    /// The buffer is cleared only when the write succeeds. On failure the
    /// records stay intact so the caller can fix the destination and call
    /// [`export_to`](Self::export_to) again.
    pub fn disable(&mut self, path: &Path) -> Result<(), ExportError> {
        self.enabled = false;
        self.export_to(path)?;
        self.records.clear();
        Ok(())
    }

    /// Serialize the buffered records and overwrite `path`.
    ///
    /// A pure drain: records are written in arrival order, none filtered.
    pub fn export_to(&self, path: &Path) -> Result<(), ExportError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ExportError::DirectoryCreation(e.to_string()))?;
        }

        std::fs::write(path, self.render_csv()).map_err(|e| ExportError::Io(e.to_string()))
    }

    /// Render the full CSV document, header included.
    pub fn render_csv(&self) -> String {
        let mut csv = String::with_capacity((self.records.len() + 1) * 64);
        csv.push_str(CSV_HEADER);
        csv.push('\n');
        for record in &self.records {
            csv.push_str(&record.to_csv_row());
            csv.push('\n');
        }
        csv
    }
}

impl Default for SessionLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Default export directory: the desktop, falling back to the local data
/// directory, falling back to the working directory.
pub fn default_export_dir() -> PathBuf {
    dirs::desktop_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(dt: f64) -> LogRecord {
        LogRecord {
            timestamp: Local::now(),
            dt_seconds: dt,
            hz: 1.0 / dt,
        }
    }

    #[test]
    fn test_disabled_log_drops_records() {
        let mut log = SessionLog::new();
        log.record(record(0.01));
        assert!(log.is_empty());
    }

    #[test]
    fn test_enabled_log_keeps_order() {
        let mut log = SessionLog::new();
        log.enable();
        log.record(record(0.01));
        log.record(record(0.02));
        assert_eq!(log.len(), 2);

        let csv = log.render_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert!(lines[1].ends_with(",0.010000000,100.00"));
        assert!(lines[2].ends_with(",0.020000000,50.00"));
    }

    #[test]
    fn test_csv_ends_with_newline() {
        let mut log = SessionLog::new();
        log.enable();
        log.record(record(0.001));
        assert!(log.render_csv().ends_with('\n'));
    }

    #[test]
    fn test_header_only_when_empty() {
        let log = SessionLog::new();
        assert_eq!(log.render_csv(), format!("{CSV_HEADER}\n"));
    }

    #[test]
    fn test_disable_exports_and_clears() {
        let mut log = SessionLog::new();
        log.enable();
        log.record(record(0.005));

        let path = std::env::temp_dir().join(format!(
            "mousehz-export-test-{}.csv",
            std::process::id()
        ));
        log.disable(&path).expect("export should succeed");

        assert!(!log.is_enabled());
        assert!(log.is_empty());

        let content = std::fs::read_to_string(&path).expect("file should exist");
        assert_eq!(content.lines().count(), 2);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_failed_export_keeps_buffer() {
        let mut log = SessionLog::new();
        log.enable();
        log.record(record(0.005));

        // Writing to a directory path fails on every platform
        let dir = std::env::temp_dir();
        assert!(log.disable(&dir).is_err());

        assert!(!log.is_enabled());
        assert_eq!(log.len(), 1);
    }
}
