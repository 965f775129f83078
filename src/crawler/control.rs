//! Cooperative pause/stop signalling
//!
//! Signals are observed only at page-loop boundaries: an in-flight render or
//! download batch always runs to completion before a pause or stop takes
//! effect.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Clonable handle carrying the stop and pause flags for one run
///
/// The shell keeps one clone to signal with; the coordinator polls another.
#[derive(Clone, Default)]
pub struct ControlHandle {
    inner: Arc<ControlFlags>,
}

#[derive(Default)]
struct ControlFlags {
    stop: AtomicBool,
    pause: AtomicBool,
}

impl ControlHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a stop; takes effect at the next loop boundary
    pub fn stop(&self) {
        self.inner.stop.store(true, Ordering::SeqCst);
    }

    /// Requests a pause; the loop holds at the next page boundary
    pub fn pause(&self) {
        self.inner.pause.store(true, Ordering::SeqCst);
    }

    /// Clears a pause
    pub fn resume(&self) {
        self.inner.pause.store(false, Ordering::SeqCst);
    }

    pub fn stop_requested(&self) -> bool {
        self.inner.stop.load(Ordering::SeqCst)
    }

    pub fn is_paused(&self) -> bool {
        self.inner.pause.load(Ordering::SeqCst)
    }
}
