//! Two-tier work queue: a shared FIFO of scheduled mailbox indices plus a
//! single-slot per-worker local tier (spec.md §4.4).
//!
//! Mailboxes are referenced by their directory index (`u32`) rather than by
//! pointer — the directory's pages never move or free a live entry, so an
//! index is as stable a reference as a pointer would be, and is `Copy`,
//! trivially sendable between threads.

pub mod counters;

pub use counters::{Counter, Counters};

// Layer 1: Standard library imports
use std::cell::Cell;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

// Layer 2: Third-party crate imports
use parking_lot::{Condvar, Mutex};

// Layer 3: Internal module imports
// (none)

/// A worker's single-slot local tier. Only the owning worker reads or
/// writes it — no synchronization required (spec.md §4.4).
pub struct LocalTier {
    slot: Cell<Option<u32>>,
}

impl LocalTier {
    /// An empty local slot.
    pub fn new() -> Self {
        Self {
            slot: Cell::new(None),
        }
    }

    /// Take the held mailbox index, if any, leaving the slot empty.
    pub fn take(&self) -> Option<u32> {
        self.slot.take()
    }

    /// Occupy the slot with `mailbox_index`. Returns the index that was
    /// previously held, if the slot was occupied — spec.md's eviction
    /// rule: at most one mailbox is held locally, and it is always the
    /// most recently scheduled one.
    pub fn set(&self, mailbox_index: u32) -> Option<u32> {
        self.slot.replace(Some(mailbox_index))
    }
}

impl Default for LocalTier {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a newly scheduled mailbox should land (spec.md §4.4 push policy).
pub enum PushTarget<'a> {
    /// The caller is not a worker, or did not request tail affinity: push
    /// onto the shared tier and wake one waiter.
    Shared,
    /// The caller is a worker that finished handling a message by sending
    /// a reply (`tail_send`): prefer the worker's own local slot.
    Local(&'a LocalTier),
}

/// The shared FIFO tier plus the counters spec.md §4.4/§6 require.
pub struct WorkQueue {
    fifo: Mutex<VecDeque<u32>>,
    condvar: Condvar,
    counters: Counters,
}

impl WorkQueue {
    /// An empty queue, sized for `max_threads` worker counter slots.
    pub fn new(max_threads: usize) -> Self {
        Self {
            fifo: Mutex::new(VecDeque::new()),
            condvar: Condvar::new(),
            counters: Counters::new(max_threads),
        }
    }

    /// The queue's counters (spec.md §6 `get_counter`/`reset_counters`).
    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    /// Schedule `mailbox_index` per the push policy in `target`, crediting
    /// the counters for `counter_slot` (a worker id, or
    /// [`Counters::external_slot`] for non-worker callers).
    pub fn schedule(&self, mailbox_index: u32, target: PushTarget<'_>, counter_slot: usize) {
        match target {
            PushTarget::Shared => self.push_shared(mailbox_index, counter_slot),
            PushTarget::Local(local) => {
                self.counters.record_local_push(counter_slot);
                if let Some(evicted) = local.set(mailbox_index) {
                    self.push_shared(evicted, counter_slot);
                }
            }
        }
    }

    fn push_shared(&self, mailbox_index: u32, counter_slot: usize) {
        let mut fifo = self.fifo.lock();
        fifo.push_back(mailbox_index);
        let depth = fifo.len() as u32;
        drop(fifo);

        self.counters.record_shared_push(counter_slot);
        self.counters.record_queue_depth(depth);
        self.condvar.notify_one();
    }

    /// Pop per spec.md §4.4 pop policy: take the worker's local slot if
    /// occupied, else block on the shared tier's condition variable.
    /// Returns `None` only when woken with `running` false (shutdown).
    pub fn pop(&self, local: &LocalTier, running: &AtomicBool, counter_slot: usize) -> Option<u32> {
        if let Some(index) = local.take() {
            return Some(index);
        }
        self.pop_shared_blocking(running, counter_slot)
    }

    fn pop_shared_blocking(&self, running: &AtomicBool, counter_slot: usize) -> Option<u32> {
        let mut fifo = self.fifo.lock();
        loop {
            if let Some(index) = fifo.pop_front() {
                return Some(index);
            }
            if !running.load(Ordering::Acquire) {
                return None;
            }
            self.counters.record_yield(counter_slot);
            self.condvar.wait(&mut fifo);
        }
    }

    /// Wake every worker blocked on the shared tier — used on shutdown and
    /// on `set_max_threads` decreases so sleeping workers can observe the
    /// new target (spec.md §4.5, §4.9).
    pub fn wake_all(&self) {
        self.condvar.notify_all();
    }

    /// Current shared-tier depth, for tests and diagnostics.
    pub fn shared_len(&self) -> usize {
        self.fifo.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn shared_push_then_pop_preserves_order() {
        let queue = WorkQueue::new(1);
        let local = LocalTier::new();
        let running = AtomicBool::new(true);

        queue.schedule(1, PushTarget::Shared, 0);
        queue.schedule(2, PushTarget::Shared, 0);

        assert_eq!(queue.pop(&local, &running, 0), Some(1));
        assert_eq!(queue.pop(&local, &running, 0), Some(2));
    }

    #[test]
    fn local_push_prefers_local_slot() {
        let queue = WorkQueue::new(1);
        let local = LocalTier::new();
        let running = AtomicBool::new(true);

        queue.schedule(1, PushTarget::Local(&local), 0);
        assert_eq!(queue.shared_len(), 0);
        assert_eq!(queue.pop(&local, &running, 0), Some(1));
    }

    #[test]
    fn second_local_push_evicts_first_to_shared_tier() {
        let queue = WorkQueue::new(1);
        let local = LocalTier::new();

        queue.schedule(1, PushTarget::Local(&local), 0);
        queue.schedule(2, PushTarget::Local(&local), 0);

        assert_eq!(queue.shared_len(), 1);
        assert_eq!(local.take(), Some(2));
    }

    #[test]
    fn pop_unblocks_on_shutdown_signal() {
        let queue = Arc::new(WorkQueue::new(1));
        let running = Arc::new(AtomicBool::new(true));

        let worker_queue = Arc::clone(&queue);
        let worker_running = Arc::clone(&running);
        let handle = thread::spawn(move || {
            let local = LocalTier::new();
            worker_queue.pop(&local, &worker_running, 0)
        });

        thread::sleep(Duration::from_millis(20));
        running.store(false, Ordering::Release);
        queue.wake_all();

        assert_eq!(handle.join().unwrap(), None);
    }

    #[test]
    fn queue_depth_high_water_mark_tracks_shared_pushes() {
        let queue = WorkQueue::new(1);
        queue.schedule(1, PushTarget::Shared, 0);
        queue.schedule(2, PushTarget::Shared, 0);
        assert_eq!(queue.counters().get(Counter::MailboxQueueMax), 2);
    }
}
