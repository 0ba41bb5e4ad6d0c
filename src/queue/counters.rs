//! Work-queue counters (spec.md §4.4, §6): `messages_processed`,
//! `yields`, `local_pushes`, `shared_pushes`, `mailbox_queue_max`.
//!
//! Per spec.md §5 ("Counter arrays are per-worker atomics to avoid
//! contention"), each counter except `mailbox_queue_max` is tracked as one
//! `AtomicU32` per worker slot rather than a single shared atomic,
//! eliminating cache-line contention between workers incrementing their
//! own counters. `get_counter` sums across slots; `reset_counters` zeroes
//! every slot. One extra slot (index `max_threads`) absorbs pushes from
//! non-worker callers (client threads, actor constructors) so their
//! activity is still counted without contending with worker slots.

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicU32, Ordering};

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
// (none)

/// Which counter [`Counters::get`] / API callers name (spec.md §6
/// `get_counter(c)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    MessagesProcessed,
    Yields,
    LocalPushes,
    SharedPushes,
    MailboxQueueMax,
}

#[derive(Default)]
struct WorkerSlot {
    messages_processed: AtomicU32,
    yields: AtomicU32,
    local_pushes: AtomicU32,
    shared_pushes: AtomicU32,
}

/// Per-worker counter array plus the single shared `mailbox_queue_max`
/// high-water mark.
pub struct Counters {
    slots: Vec<WorkerSlot>,
    external_slot: usize,
    mailbox_queue_max: AtomicU32,
}

impl Counters {
    /// `max_threads` worker slots plus one reserved for non-worker
    /// callers.
    pub fn new(max_threads: usize) -> Self {
        let mut slots = Vec::with_capacity(max_threads + 1);
        slots.resize_with(max_threads + 1, WorkerSlot::default);
        Self {
            slots,
            external_slot: max_threads,
            mailbox_queue_max: AtomicU32::new(0),
        }
    }

    /// The slot index for non-worker callers.
    pub fn external_slot(&self) -> usize {
        self.external_slot
    }

    pub fn record_message_processed(&self, slot: usize) {
        self.slots[slot].messages_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_yield(&self, slot: usize) {
        self.slots[slot].yields.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_local_push(&self, slot: usize) {
        self.slots[slot].local_pushes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_shared_push(&self, slot: usize) {
        self.slots[slot].shared_pushes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a newly observed shared-tier depth against the running
    /// high-water mark.
    pub fn record_queue_depth(&self, depth: u32) {
        self.mailbox_queue_max.fetch_max(depth, Ordering::Relaxed);
    }

    /// Sum (or read, for `MailboxQueueMax`) the named counter across all
    /// slots.
    pub fn get(&self, counter: Counter) -> u32 {
        match counter {
            Counter::MessagesProcessed => self
                .slots
                .iter()
                .map(|s| s.messages_processed.load(Ordering::Relaxed))
                .sum(),
            Counter::Yields => self.slots.iter().map(|s| s.yields.load(Ordering::Relaxed)).sum(),
            Counter::LocalPushes => self
                .slots
                .iter()
                .map(|s| s.local_pushes.load(Ordering::Relaxed))
                .sum(),
            Counter::SharedPushes => self
                .slots
                .iter()
                .map(|s| s.shared_pushes.load(Ordering::Relaxed))
                .sum(),
            Counter::MailboxQueueMax => self.mailbox_queue_max.load(Ordering::Relaxed),
        }
    }

    /// Zero every per-worker slot and the queue-depth high-water mark
    /// (spec.md §6 `reset_counters`).
    pub fn reset(&self) {
        for slot in &self.slots {
            slot.messages_processed.store(0, Ordering::Relaxed);
            slot.yields.store(0, Ordering::Relaxed);
            slot.local_pushes.store(0, Ordering::Relaxed);
            slot.shared_pushes.store(0, Ordering::Relaxed);
        }
        self.mailbox_queue_max.store(0, Ordering::Relaxed);
    }
}
