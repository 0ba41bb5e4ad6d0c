//! Shared test support: a [`Receiver`] that captures every envelope of a
//! known type it is sent, for assertions against what an actor replied
//! with (spec.md §8's concrete scenarios all end with "observes a reply").

#![allow(dead_code, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use theron::alloc::LocalCache;
use theron::{Address, Envelope, Framework, TypeTag};

/// Registers itself at a fixed receiver index and records every envelope
/// of type `T` handed to it, decoded and destroyed immediately.
pub struct Capture<T> {
    received: Mutex<Vec<(Address, T)>>,
}

impl<T: Send + 'static + Clone> Capture<T> {
    pub fn install(index: u32) -> (Address, Arc<Self>) {
        let capture = Arc::new(Capture {
            received: Mutex::new(Vec::new()),
        });
        Framework::register_receiver(index, capture.clone()).unwrap();
        (Address::receiver(index).unwrap(), capture)
    }

    pub fn values(&self) -> Vec<(Address, T)> {
        self.received.lock().clone()
    }

    /// Poll until at least `n` envelopes have arrived, or `timeout` elapses.
    pub fn wait_for(&self, n: usize, timeout: Duration) -> Vec<(Address, T)> {
        let deadline = Instant::now() + timeout;
        loop {
            let values = self.values();
            if values.len() >= n || Instant::now() >= deadline {
                return values;
            }
            std::thread::yield_now();
        }
    }
}

impl<T: Send + 'static + Clone> theron::framework::registry::Receiver for Capture<T> {
    fn push(&self, envelope: Envelope) {
        let sender = envelope.sender();
        if envelope.type_tag() == TypeTag::of::<T>() {
            // SAFETY: the tag check above confirms this envelope's payload
            // was constructed as a `T`.
            let value = unsafe { envelope.payload::<T>() }.clone();
            self.received.lock().push((sender, value));
        }
        let cache = LocalCache::with_defaults();
        envelope.destroy(&cache);
    }
}
