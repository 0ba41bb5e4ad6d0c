//! Observability layer (`SPEC_FULL.md` §1.2) — ambient infrastructure
//! carried even though spec.md's Non-goals never mention metrics.
//!
//! Mirrors the teacher's `monitoring` module shape: a `Monitor` trait
//! consuming structured [`FrameworkEvent`]s, a zero-overhead
//! [`NoopMonitor`] default, and a bounded [`InMemoryMonitor`] ring buffer
//! tests assert against.

pub mod event;

pub use event::{FrameworkEvent, Severity};

// Layer 1: Standard library imports
use std::collections::VecDeque;

// Layer 2: Third-party crate imports
use parking_lot::Mutex;

// Layer 3: Internal module imports
// (none)

/// Sink for structured runtime events. Implementations must be cheap on
/// the hot path — `record` runs inline on sender and worker threads.
pub trait Monitor: Send + Sync {
    fn record(&self, event: FrameworkEvent);
}

/// Default monitor: discards every event. Zero overhead beyond the
/// virtual call.
#[derive(Debug, Default)]
pub struct NoopMonitor;

impl Monitor for NoopMonitor {
    fn record(&self, _event: FrameworkEvent) {}
}

/// A bounded ring buffer of recent events, for tests and diagnostics.
/// Once `capacity` is reached, the oldest event is dropped to admit the
/// newest.
pub struct InMemoryMonitor {
    events: Mutex<VecDeque<FrameworkEvent>>,
    capacity: usize,
}

impl InMemoryMonitor {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
        }
    }

    /// A snapshot of currently buffered events, oldest first.
    pub fn events(&self) -> Vec<FrameworkEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Count of buffered events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&FrameworkEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| predicate(e)).count()
    }
}

impl Default for InMemoryMonitor {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl Monitor for InMemoryMonitor {
    fn record(&self, event: FrameworkEvent) {
        let mut events = self.events.lock();
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }
}
