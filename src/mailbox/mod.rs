//! Per-actor mailbox: FIFO, lock, and "scheduled" bit (spec.md §3, §4.3).
//!
//! Design rule the dispatch loop relies on: **at most one mailbox-processing
//! action per scheduling**. A worker pops exactly one envelope per
//! scheduling, then re-queues the mailbox if it is still non-empty — this
//! gives fair round-robin scheduling across mailboxes under load rather
//! than one mailbox monopolizing a worker.

// Layer 1: Standard library imports
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

// Layer 2: Third-party crate imports
use parking_lot::Mutex;

// Layer 3: Internal module imports
use crate::message::Envelope;

/// A FIFO of pending envelopes, a lock, and a "scheduled" bit.
///
/// `Mailbox` is deliberately a standalone, lock-guarded cell: it knows
/// nothing about directories, actors, or ref-counting — those concerns
/// live in [`crate::directory::Entry`], which embeds one `Mailbox` per
/// registered actor.
pub struct Mailbox {
    fifo: Mutex<VecDeque<Envelope>>,
    scheduled: AtomicBool,
}

impl Mailbox {
    /// A new, empty, unscheduled mailbox.
    pub fn new() -> Self {
        Self {
            fifo: Mutex::new(VecDeque::new()),
            scheduled: AtomicBool::new(false),
        }
    }

    /// Append `envelope` to the tail of the FIFO.
    ///
    /// Returns `true` if the mailbox was empty immediately before this
    /// push — the send path uses this to decide whether the mailbox needs
    /// scheduling (spec.md §4.6 step 7).
    pub fn push(&self, envelope: Envelope) -> bool {
        let mut fifo = self.fifo.lock();
        let was_empty = fifo.is_empty();
        fifo.push_back(envelope);
        was_empty
    }

    /// Remove and return the head envelope, if any.
    ///
    /// The dispatch loop pops the head transactionally rather than peeking
    /// and popping in two separate locked sections: since only one worker
    /// ever processes a given mailbox at a time (enforced by the
    /// scheduled-bit protocol), taking ownership of the head here and
    /// holding it across the unlocked handler call is equivalent to, and
    /// simpler than, re-acquiring the lock afterward to remove an
    /// already-identified head.
    pub fn pop(&self) -> Option<Envelope> {
        self.fifo.lock().pop_front()
    }

    /// Inspect the head envelope under the lock without removing it.
    pub fn head<R>(&self, f: impl FnOnce(Option<&Envelope>) -> R) -> R {
        let fifo = self.fifo.lock();
        f(fifo.front())
    }

    /// Number of envelopes currently queued.
    pub fn count(&self) -> usize {
        self.fifo.lock().len()
    }

    /// `true` if no envelopes are queued.
    pub fn is_empty(&self) -> bool {
        self.fifo.lock().is_empty()
    }

    /// Set the scheduled bit. Returns `true` if it transitioned
    /// false→true (the caller uses this to decide whether the mailbox
    /// actually needs pushing onto the work queue).
    pub fn mark_scheduled(&self) -> bool {
        !self.scheduled.swap(true, Ordering::AcqRel)
    }

    /// Clear the scheduled bit.
    pub fn clear_scheduled(&self) {
        self.scheduled.store(false, Ordering::Release);
    }

    /// Atomically decide, under the FIFO lock, whether this dispatch cycle
    /// ends by re-queuing (FIFO still non-empty: returns `true`, scheduled
    /// bit left set) or by going idle (FIFO empty: returns `false`,
    /// scheduled bit cleared).
    ///
    /// The check and the scheduled-bit clear must happen under the same
    /// lock a concurrent `push` takes: otherwise a push landing between a
    /// separate "is it empty" check and a separate "clear scheduled" store
    /// could see the bit still set and skip re-scheduling, stranding its
    /// message unscheduled. Serializing both through the FIFO's mutex
    /// means a racing push either lands before this call (so the FIFO is
    /// observed non-empty here and the mailbox is re-queued) or after it
    /// (so it observes the bit already cleared and re-schedules itself).
    pub fn finish_dispatch(&self) -> bool {
        let fifo = self.fifo.lock();
        if fifo.is_empty() {
            self.scheduled.store(false, Ordering::Release);
            false
        } else {
            true
        }
    }

    /// Current value of the scheduled bit.
    pub fn is_scheduled(&self) -> bool {
        self.scheduled.load(Ordering::Acquire)
    }
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::LocalCache;
    use crate::message::TypeTag;
    use crate::util::Address;

    fn envelope(cache: &LocalCache, value: u32) -> Envelope {
        Envelope::new(cache, TypeTag::of::<u32>(), Address::local(1, 1).unwrap(), value).unwrap()
    }

    #[test]
    fn push_reports_prior_emptiness() {
        let cache = LocalCache::with_defaults();
        let mailbox = Mailbox::new();
        assert!(mailbox.push(envelope(&cache, 1)));
        assert!(!mailbox.push(envelope(&cache, 2)));

        while let Some(e) = mailbox.pop() {
            e.destroy(&cache);
        }
    }

    #[test]
    fn pop_is_fifo_order() {
        let cache = LocalCache::with_defaults();
        let mailbox = Mailbox::new();
        mailbox.push(envelope(&cache, 1));
        mailbox.push(envelope(&cache, 2));

        let first = mailbox.pop().unwrap();
        assert_eq!(unsafe { *first.payload::<u32>() }, 1);
        first.destroy(&cache);

        let second = mailbox.pop().unwrap();
        assert_eq!(unsafe { *second.payload::<u32>() }, 2);
        second.destroy(&cache);

        assert!(mailbox.pop().is_none());
    }

    #[test]
    fn head_peeks_without_removing() {
        let cache = LocalCache::with_defaults();
        let mailbox = Mailbox::new();
        mailbox.push(envelope(&cache, 9));

        let value = mailbox.head(|e| e.map(|e| unsafe { *e.payload::<u32>() }));
        assert_eq!(value, Some(9));
        assert_eq!(mailbox.count(), 1);

        mailbox.pop().unwrap().destroy(&cache);
    }

    #[test]
    fn scheduled_bit_transitions() {
        let mailbox = Mailbox::new();
        assert!(!mailbox.is_scheduled());
        assert!(mailbox.mark_scheduled());
        assert!(mailbox.is_scheduled());
        assert!(!mailbox.mark_scheduled());
        mailbox.clear_scheduled();
        assert!(!mailbox.is_scheduled());
    }

    #[test]
    fn finish_dispatch_clears_scheduled_only_when_empty() {
        let cache = LocalCache::with_defaults();
        let mailbox = Mailbox::new();
        mailbox.mark_scheduled();
        mailbox.push(envelope(&cache, 1));

        assert!(mailbox.finish_dispatch());
        assert!(mailbox.is_scheduled());

        mailbox.pop().unwrap().destroy(&cache);
        assert!(!mailbox.finish_dispatch());
        assert!(!mailbox.is_scheduled());
    }

    #[test]
    fn count_and_is_empty_track_fifo_length() {
        let cache = LocalCache::with_defaults();
        let mailbox = Mailbox::new();
        assert!(mailbox.is_empty());
        mailbox.push(envelope(&cache, 1));
        assert_eq!(mailbox.count(), 1);
        assert!(!mailbox.is_empty());
        mailbox.pop().unwrap().destroy(&cache);
        assert!(mailbox.is_empty());
    }
}
