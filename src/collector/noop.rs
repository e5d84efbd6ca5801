//! Fallback (noop) implementation of motion capture.
//!
//! This exists so the crate (and binary) can compile on targets without a
//! supported raw-input backend. Registration succeeds but no motion events
//! are ever delivered.

use crate::collector::types::MotionEvent;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Configuration for the motion capture backend.
///
/// On unsupported platforms this is accepted but no events are captured.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Capacity of the event channel between the capture callback and the
    /// meter loop. Events are dropped, never blocked on, when it is full.
    pub channel_capacity: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 10_000,
        }
    }
}

/// Errors that can occur during motion capture.
#[derive(Debug)]
pub enum CollectorError {
    AlreadyRunning,
}

impl std::fmt::Display for CollectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectorError::AlreadyRunning => write!(f, "Collector is already running"),
        }
    }
}

impl std::error::Error for CollectorError {}

/// A noop collector that never emits events.
pub struct NoopCollector {
    _sender: Sender<MotionEvent>,
    receiver: Receiver<MotionEvent>,
    running: Arc<AtomicBool>,
}

impl NoopCollector {
    /// Create a new noop collector.
    pub fn new(config: CollectorConfig) -> Self {
        let (sender, receiver) = bounded(config.channel_capacity);
        Self {
            _sender: sender,
            receiver,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Register for raw motion events.
    ///
    /// On unsupported platforms, this simply marks the collector as running.
    pub fn start(&mut self) -> Result<(), CollectorError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(CollectorError::AlreadyRunning);
        }
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Stop capturing events.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Check if the collector is currently running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the receiver for motion events.
    pub fn receiver(&self) -> &Receiver<MotionEvent> {
        &self.receiver
    }

    /// Try to receive an event without blocking.
    pub fn try_recv(&self) -> Option<MotionEvent> {
        self.receiver.try_recv().ok()
    }
}

/// On unsupported platforms there is no input-monitoring permission gate.
pub fn check_permission() -> bool {
    true
}

/// Scheduling priority is left untouched on this platform; the
/// priority-class boost is a Windows facility.
pub fn raise_process_priority() -> bool {
    false
}
