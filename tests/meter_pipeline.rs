//! End-to-end tests for the measurement pipeline: synthetic event
//! timestamps in, statistics and CSV artifacts out.

use mousehz::{core::EventSampler, PollMeter, DEFAULT_WINDOW_CAPACITY, EXPORT_FILENAME};
use std::path::{Path, PathBuf};

fn test_export_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("mousehz-it-{tag}-{}", std::process::id()))
}

/// Meter driven by a 1ms tick so test timestamps stay small integers.
fn millis_meter(dir: &Path) -> PollMeter {
    PollMeter::new(DEFAULT_WINDOW_CAPACITY, dir.join(EXPORT_FILENAME))
        .with_sampler(EventSampler::with_tick_scale(0.001))
}

#[test]
fn steady_1khz_stream_converges_on_1000hz() {
    let dir = test_export_path("steady");
    let mut meter = millis_meter(&dir);

    // 1ms spacing = 1000 Hz polling
    for ticks in 0..=600u64 {
        meter.on_event(ticks);
    }

    let snap = meter.snapshot();
    assert_eq!(snap.total_samples, 600);
    assert_eq!(snap.window_count, DEFAULT_WINDOW_CAPACITY);
    assert!((snap.instant_hz - 1000.0).abs() < 1e-9);
    assert!((snap.average_hz - 1000.0).abs() < 1e-9);
    assert!((snap.peak_hz - 1000.0).abs() < 1e-9);
}

#[test]
fn oldest_samples_age_out_of_the_average() {
    let dir = test_export_path("ageout");
    let mut meter = millis_meter(&dir);

    // Window of 500: one slow 10ms gap followed by 500 fast 1ms gaps
    // pushes the slow sample out entirely.
    meter.on_event(0);
    meter.on_event(10);
    for i in 1..=500u64 {
        meter.on_event(10 + i);
    }

    let snap = meter.snapshot();
    assert_eq!(snap.window_count, 500);
    assert!((snap.average_hz - 1000.0).abs() < 1e-9);
    // The 100 Hz sample still counts toward the session peak source data
    assert_eq!(snap.total_samples, 501);
    assert!((snap.peak_hz - 1000.0).abs() < 1e-9);
}

#[test]
fn jittery_stream_average_matches_exact_mean() {
    let dir = test_export_path("jitter");
    let mut meter = millis_meter(&dir);

    let gaps = [2u64, 3, 2, 5, 1, 4, 2, 2, 3, 1];
    let mut ticks = 0u64;
    meter.on_event(ticks);

    let mut expected_sum = 0.0;
    for gap in gaps {
        ticks += gap;
        meter.on_event(ticks);
        expected_sum += 1000.0 / gap as f64;
    }

    let snap = meter.snapshot();
    assert_eq!(snap.window_count, gaps.len());
    let expected_avg = expected_sum / gaps.len() as f64;
    assert!((snap.average_hz - expected_avg).abs() < 1e-9);
    assert!((snap.peak_hz - 1000.0).abs() < 1e-9);
}

#[test]
fn degenerate_timestamps_do_not_disturb_the_session() {
    let dir = test_export_path("degenerate");
    let mut meter = millis_meter(&dir);

    meter.on_event(100);
    meter.on_event(110);
    let before = meter.snapshot();

    // Duplicate and backwards timestamps are filtered, not counted
    assert!(meter.on_event(110).is_none());
    assert!(meter.on_event(50).is_none());
    assert_eq!(meter.snapshot(), before);

    // Measurement resumes from the rewritten baseline
    let snap = meter.on_event(60).expect("10ms after the 50-tick baseline");
    assert!((snap.instant_hz - 100.0).abs() < 1e-9);
}

#[test]
fn logged_session_exports_ordered_csv() {
    let dir = test_export_path("csv");
    let mut meter = millis_meter(&dir);

    meter.on_event(0);
    meter.start_logging();
    meter.on_event(10); // 100 Hz
    meter.on_event(12); // 500 Hz

    let path = meter.stop_logging().expect("export should succeed");
    let content = std::fs::read_to_string(&path).expect("csv should exist");
    let lines: Vec<&str> = content.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "timestamp,dt_seconds,hz");
    assert!(lines[1].ends_with(",0.010000000,100.00"));
    assert!(lines[2].ends_with(",0.002000000,500.00"));

    // Each data row starts with an ISO-8601 timestamp
    for line in &lines[1..] {
        let ts = line.split(',').next().expect("timestamp field");
        assert!(ts.contains('T'), "not an ISO-8601 timestamp: {ts}");
    }

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn relogging_after_export_starts_empty() {
    let dir = test_export_path("relog");
    let mut meter = millis_meter(&dir);

    meter.on_event(0);
    meter.start_logging();
    meter.on_event(10);
    meter.stop_logging().expect("first export");

    meter.start_logging();
    assert_eq!(meter.pending_records(), 0);
    meter.on_event(20);
    assert_eq!(meter.pending_records(), 1);

    let path = meter.stop_logging().expect("second export");
    let content = std::fs::read_to_string(&path).expect("csv should exist");
    // Full replace: only the header and the one new record
    assert_eq!(content.lines().count(), 2);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn reset_during_logging_keeps_the_log_buffer() {
    let dir = test_export_path("resetlog");
    let mut meter = millis_meter(&dir);

    meter.on_event(0);
    meter.start_logging();
    meter.on_event(10);

    meter.reset_stats();
    // Clearing statistics is independent of the log state machine
    assert!(meter.is_logging());
    assert_eq!(meter.pending_records(), 1);
    assert_eq!(meter.snapshot().total_samples, 0);

    let _ = std::fs::remove_dir_all(&dir);
}
