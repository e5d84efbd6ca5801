//! macOS implementation of motion capture using a CGEvent tap.
//!
//! This module registers a listen-only event tap for mouse movement at the
//! session level and forwards one timestamped event per motion report. It
//! requires Input Monitoring permission.

use crate::collector::types::MotionEvent;
use core_foundation::runloop::{kCFRunLoopCommonModes, CFRunLoop};
use core_graphics::event::{
    CGEvent, CGEventTap, CGEventTapLocation, CGEventTapOptions, CGEventTapPlacement, CGEventType,
    CallbackResult,
};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Configuration for the motion capture backend.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Capacity of the event channel between the tap callback and the
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

/// The macOS motion collector using a CGEvent tap.
pub struct MacOSCollector {
    sender: Sender<MotionEvent>,
    receiver: Receiver<MotionEvent>,
    running: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
}

impl MacOSCollector {
    /// Create a new macOS collector with the given configuration.
    pub fn new(config: CollectorConfig) -> Self {
        // Bounded channel so a stalled consumer cannot grow memory unboundedly
        let (sender, receiver) = bounded(config.channel_capacity);

        Self {
            sender,
            receiver,
            running: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
        }
    }

    /// Register for raw mouse motion and start delivering events.
    ///
    /// Returns an error if:
    /// - The collector is already running
    /// - Input Monitoring permission is not granted
    pub fn start(&mut self) -> Result<(), CollectorError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(CollectorError::AlreadyRunning);
        }

        self.running.store(true, Ordering::SeqCst);

        let sender = self.sender.clone();
        let running = self.running.clone();

        let handle = thread::spawn(move || {
            if let Err(e) = run_event_loop(sender, running.clone()) {
                eprintln!("Event loop error: {e}");
            }
            running.store(false, Ordering::SeqCst);
        });

        self.thread_handle = Some(handle);
        Ok(())
    }

    /// Stop capturing events.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            // The thread exits when running becomes false
            let _ = handle.join();
        }
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

impl Drop for MacOSCollector {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Errors that can occur during motion capture.
#[derive(Debug)]
pub enum CollectorError {
    AlreadyRunning,
    PermissionDenied,
    TapCreationFailed,
    RunLoopSourceFailed,
}

impl std::fmt::Display for CollectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectorError::AlreadyRunning => write!(f, "Collector is already running"),
            CollectorError::PermissionDenied => {
                write!(f, "Input Monitoring permission not granted")
            }
            CollectorError::TapCreationFailed => write!(f, "Failed to create CGEvent tap"),
            CollectorError::RunLoopSourceFailed => {
                write!(f, "Failed to create run loop source")
            }
        }
    }
}

impl std::error::Error for CollectorError {}

/// Mouse motion event types the tap listens for.
///
/// Dragged variants are included because macOS reports motion with a held
/// button as a distinct event type at the same device polling cadence.
fn motion_event_types() -> Vec<CGEventType> {
    vec![
        CGEventType::MouseMoved,
        CGEventType::LeftMouseDragged,
        CGEventType::RightMouseDragged,
    ]
}

// The tap callback cannot capture variables, so the sender lives in
// thread-local storage on the tap thread. A single shared static: the
// loop installs the sender here and the callback reads the same slot.
thread_local! {
    static EVENT_SENDER: std::cell::RefCell<Option<Sender<MotionEvent>>> = const { std::cell::RefCell::new(None) };
}

/// Stamp and forward one motion report from the tap thread.
fn forward_motion() {
    // Stamp before anything else so queueing noise does not skew dt
    let motion = MotionEvent::mouse();

    EVENT_SENDER.with(|sender_cell| {
        if let Some(ref sender) = *sender_cell.borrow() {
            // Never block inside the tap; drop the event if full
            let _ = sender.try_send(motion);
        }
    });
}

/// Callback function for the CGEvent tap.
fn event_callback(
    _proxy: core_graphics::event::CGEventTapProxy,
    event_type: CGEventType,
    _event: &CGEvent,
) -> CallbackResult {
    if matches!(
        event_type,
        CGEventType::MouseMoved | CGEventType::LeftMouseDragged | CGEventType::RightMouseDragged
    ) {
        forward_motion();
    }

    // Return the event unchanged (we're passive observers)
    CallbackResult::Keep
}

/// Run the Core Graphics event loop.
fn run_event_loop(sender: Sender<MotionEvent>, running: Arc<AtomicBool>) -> Result<(), CollectorError> {
    EVENT_SENDER.with(|s| {
        *s.borrow_mut() = Some(sender);
    });

    // Create the event tap
    let tap = CGEventTap::new(
        CGEventTapLocation::Session,
        CGEventTapPlacement::HeadInsertEventTap,
        CGEventTapOptions::ListenOnly,
        motion_event_types(),
        event_callback,
    )
    .map_err(|_| CollectorError::TapCreationFailed)?;

    // Create the run loop source
    let source = tap
        .mach_port()
        .create_runloop_source(0)
        .map_err(|_| CollectorError::RunLoopSourceFailed)?;

    // Add source to the run loop
    let run_loop = CFRunLoop::get_current();
    unsafe {
        run_loop.add_source(&source, kCFRunLoopCommonModes);
    }

    // Enable the tap
    tap.enable();

    // Run the loop until stopped
    while running.load(Ordering::SeqCst) {
        CFRunLoop::run_in_mode(
            unsafe { kCFRunLoopCommonModes },
            std::time::Duration::from_millis(100),
            false,
        );
    }

    // The tap is automatically disabled when dropped
    Ok(())
}

/// Check if the application has Input Monitoring permission.
///
/// macOS provides no direct permission query; creating a passive tap fails
/// when permission is not granted, which stands in for one.
pub fn check_permission() -> bool {
    let result = CGEventTap::new(
        CGEventTapLocation::Session,
        CGEventTapPlacement::HeadInsertEventTap,
        CGEventTapOptions::ListenOnly,
        vec![CGEventType::MouseMoved],
        |_proxy, _type, _event| CallbackResult::Keep,
    );

    result.is_ok()
}

/// Scheduling priority is left untouched on macOS; the priority-class
/// boost is a Windows facility.
pub fn raise_process_priority() -> bool {
    false
}
