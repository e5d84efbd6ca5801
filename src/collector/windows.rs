//! Windows implementation of motion capture using a low-level mouse hook.
//!
//! This module registers a `WH_MOUSE_LL` hook on a dedicated background
//! thread and forwards one timestamped event per `WM_MOUSEMOVE` message.
//! The hook callback does nothing beyond stamping the monotonic clock and
//! a non-blocking channel send, so it never stalls the system input path.

use crate::collector::types::MotionEvent;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Threading::{
    GetCurrentProcess, GetCurrentThreadId, SetPriorityClass, HIGH_PRIORITY_CLASS,
};
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, GetMessageW, PostThreadMessageW, SetWindowsHookExW, UnhookWindowsHookEx,
    HHOOK, MSG, WH_MOUSE_LL, WM_MOUSEMOVE, WM_QUIT,
};

/// Configuration for the motion capture backend.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Capacity of the event channel between the hook callback and the
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

/// How long `start()` waits for the hook thread to report its
/// registration outcome.
const REGISTRATION_TIMEOUT: Duration = Duration::from_secs(5);

/// The Windows motion collector using a low-level mouse hook.
pub struct WindowsCollector {
    sender: Sender<MotionEvent>,
    receiver: Receiver<MotionEvent>,
    running: Arc<AtomicBool>,
    /// Native thread id of the hook thread; 0 while no hook is installed
    hook_thread_id: Arc<AtomicU32>,
    thread_handle: Option<JoinHandle<()>>,
}

impl WindowsCollector {
    /// Create a new Windows collector with the given configuration.
    pub fn new(config: CollectorConfig) -> Self {
        // Bounded channel so a stalled consumer cannot grow memory unboundedly
        let (sender, receiver) = bounded(config.channel_capacity);

        Self {
            sender,
            receiver,
            running: Arc::new(AtomicBool::new(false)),
            hook_thread_id: Arc::new(AtomicU32::new(0)),
            thread_handle: None,
        }
    }

    /// Register for raw mouse motion and start delivering events.
    ///
    /// Returns an error if the collector is already running or if the hook
    /// cannot be installed. The hook is installed on the background thread,
    /// so `start()` waits for that thread to report the registration
    /// outcome before returning. Installation failure means no events will
    /// ever arrive and must be surfaced to the user; there is no retry.
    pub fn start(&mut self) -> Result<(), CollectorError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(CollectorError::AlreadyRunning);
        }

        self.running.store(true, Ordering::SeqCst);

        let sender = self.sender.clone();
        let running = self.running.clone();
        let hook_thread_id = self.hook_thread_id.clone();
        let (ready_tx, ready_rx) = bounded(1);

        let handle = thread::spawn(move || {
            run_hook_loop(sender, running.clone(), hook_thread_id, ready_tx);
            running.store(false, Ordering::SeqCst);
        });

        let outcome = match ready_rx.recv_timeout(REGISTRATION_TIMEOUT) {
            Ok(result) => result,
            Err(_) => Err(CollectorError::RegistrationFailed),
        };

        match outcome {
            Ok(()) => {
                self.thread_handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                let _ = handle.join();
                Err(e)
            }
        }
    }

    /// Stop capturing events.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        // GetMessageW only returns when a message arrives, so the hook
        // thread must be woken explicitly before it can observe the flag.
        let thread_id = self.hook_thread_id.load(Ordering::SeqCst);
        if thread_id != 0 {
            unsafe {
                let _ = PostThreadMessageW(thread_id, WM_QUIT, WPARAM(0), LPARAM(0));
            }
        }

        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
        self.hook_thread_id.store(0, Ordering::SeqCst);
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

impl Drop for WindowsCollector {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Errors that can occur during motion capture.
#[derive(Debug)]
pub enum CollectorError {
    AlreadyRunning,
    RegistrationFailed,
}

impl std::fmt::Display for CollectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectorError::AlreadyRunning => write!(f, "Collector is already running"),
            CollectorError::RegistrationFailed => {
                write!(f, "Failed to register the low-level mouse hook")
            }
        }
    }
}

impl std::error::Error for CollectorError {}

// The hook callback cannot capture variables, so the sender lives in
// thread-local storage on the hook thread.
thread_local! {
    static EVENT_SENDER: std::cell::RefCell<Option<Sender<MotionEvent>>> = const { std::cell::RefCell::new(None) };
}

/// Stamp and forward one motion report from the hook thread.
fn forward_motion() {
    // Stamp before anything else so queueing noise does not skew dt
    let event = MotionEvent::mouse();

    EVENT_SENDER.with(|sender| {
        if let Some(ref s) = *sender.borrow() {
            // Never block inside the hook; drop the event if full
            let _ = s.try_send(event);
        }
    });
}

/// Low-level mouse hook callback.
///
/// Only the arrival time of `WM_MOUSEMOVE` matters; the hook struct
/// (coordinates, buttons) is deliberately ignored.
unsafe extern "system" fn mouse_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code >= 0 && w_param.0 as u32 == WM_MOUSEMOVE {
        forward_motion();
    }

    // Pass the event to the next hook
    CallNextHookEx(HHOOK::default(), n_code, w_param, l_param)
}

/// Run the Windows hook message loop.
///
/// The hook-installation outcome is reported through `ready` so the
/// spawning thread can surface registration failure from `start()`.
fn run_hook_loop(
    sender: Sender<MotionEvent>,
    running: Arc<AtomicBool>,
    hook_thread_id: Arc<AtomicU32>,
    ready: Sender<Result<(), CollectorError>>,
) {
    // Store sender in thread-local for the callback
    EVENT_SENDER.with(|s| {
        *s.borrow_mut() = Some(sender);
    });

    unsafe {
        let hook = match SetWindowsHookExW(WH_MOUSE_LL, Some(mouse_hook_proc), None, 0) {
            Ok(hook) => hook,
            Err(_) => {
                let _ = ready.send(Err(CollectorError::RegistrationFailed));
                return;
            }
        };

        // Publish the thread id so stop() can post WM_QUIT at us
        hook_thread_id.store(GetCurrentThreadId(), Ordering::SeqCst);
        let _ = ready.send(Ok(()));

        // Message loop; the hook runs as a side effect of message retrieval
        let mut msg = MSG::default();
        while running.load(Ordering::SeqCst) {
            let result = GetMessageW(&mut msg, HWND::default(), 0, 0);

            if result.0 == 0 {
                // WM_QUIT received
                break;
            } else if result.0 < 0 {
                break;
            }
        }

        // Unhook before exiting
        let _ = UnhookWindowsHookEx(hook);
    }
}

/// Check if the application can install low-level hooks.
///
/// Low-level hooks generally work without explicit permission; this checks
/// by installing and immediately removing a temporary hook.
pub fn check_permission() -> bool {
    unsafe {
        match SetWindowsHookExW(WH_MOUSE_LL, Some(mouse_hook_proc), None, 0) {
            Ok(hook) => {
                let _ = UnhookWindowsHookEx(hook);
                true
            }
            Err(_) => false,
        }
    }
}

/// Raise the process priority class to reduce scheduling jitter in the
/// timing measurement. Best effort; the caller ignores failure.
pub fn raise_process_priority() -> bool {
    unsafe { SetPriorityClass(GetCurrentProcess(), HIGH_PRIORITY_CLASS).is_ok() }
}
