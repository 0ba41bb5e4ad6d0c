//! Dynamic worker-thread pool (spec.md §4.5).
//!
//! There is no separate manager thread: resizing happens synchronously
//! inside [`Pool::set_target`]/[`Pool::set_min_threads`] on whichever
//! thread calls them, spawning new workers immediately when the target
//! rises. When it falls, workers observe the lower `target_threads` the
//! next time they would otherwise block for work and self-terminate via
//! [`Pool::should_exit`]'s CAS loop, so at most one worker claims each
//! vacated slot.

pub mod worker;

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

// Layer 2: Third-party crate imports
use parking_lot::Mutex;

// Layer 3: Internal module imports
use crate::framework::inner::FrameworkInner;
use crate::queue::WorkQueue;

/// Thread-count bookkeeping plus the live worker `JoinHandle`s.
pub struct Pool {
    num_threads: AtomicU32,
    target_threads: AtomicU32,
    peak_threads: AtomicU32,
    min_threads: AtomicU32,
    /// The current ceiling reported by `get_max_threads`, written by
    /// every `set_target` call so it always reflects the last
    /// `set_max_threads` (spec.md §6 `get_max_threads` "reads the
    /// appropriate field", mirroring how `get_min_threads` reflects
    /// `min_threads`). Bounded above by `hard_cap`.
    max_threads: AtomicU32,
    /// The construction-time `max_threads_per_framework` (spec.md §6),
    /// never changes after `new`. Bounds every clamp and sizes
    /// `free_worker_ids`/`Counters`.
    hard_cap: u32,
    /// Worker ids available to hand out, bounded to `0..hard_cap` so
    /// they double as `Counters` slot indices (`queue/counters.rs`)
    /// without ever aliasing `external_slot` (`= hard_cap`). A worker
    /// returns its id here when it exits (`should_exit`), and the next
    /// `spawn_one` draws from it instead of minting a fresh, ever-growing
    /// id — otherwise repeated grow/shrink cycles (spec.md §4.5) would
    /// eventually hand out an id `>= hard_cap` and panic indexing
    /// `Counters::slots`.
    free_worker_ids: Mutex<Vec<usize>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Pool {
    /// An unstarted pool, capped at `hard_cap` (spec.md §6
    /// `max_threads_per_framework`).
    pub fn new(hard_cap: u32) -> Self {
        let hard_cap = hard_cap.max(1);
        let free_worker_ids = (0..hard_cap as usize).rev().collect();
        Self {
            num_threads: AtomicU32::new(0),
            target_threads: AtomicU32::new(0),
            peak_threads: AtomicU32::new(0),
            min_threads: AtomicU32::new(1),
            max_threads: AtomicU32::new(hard_cap),
            hard_cap,
            free_worker_ids: Mutex::new(free_worker_ids),
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Spawn `initial` workers against `framework` and set them as the
    /// floor for future resizes (spec.md §6 `initial_thread_count`).
    /// Called once, immediately after the owning `Arc<FrameworkInner>` is
    /// constructed.
    pub fn start(&self, framework: &Arc<FrameworkInner>, initial: u32) {
        self.min_threads.store(initial.clamp(1, self.hard_cap), Ordering::Release);
        self.set_target(framework, initial);
    }

    pub fn get_num_threads(&self) -> u32 {
        self.num_threads.load(Ordering::Acquire)
    }

    pub fn get_peak_threads(&self) -> u32 {
        self.peak_threads.load(Ordering::Acquire)
    }

    pub fn get_min_threads(&self) -> u32 {
        self.min_threads.load(Ordering::Acquire)
    }

    pub fn get_max_threads(&self) -> u32 {
        self.max_threads.load(Ordering::Acquire)
    }

    /// Raise the floor on worker count, immediately resizing up if the
    /// current target sits below the new minimum (spec.md §6
    /// `set_min_threads`).
    pub fn set_min_threads(&self, framework: &Arc<FrameworkInner>, min: u32) -> u32 {
        let min = min.clamp(1, self.hard_cap);
        self.min_threads.store(min, Ordering::Release);
        if self.target_threads.load(Ordering::Acquire) < min {
            self.set_target(framework, min);
        }
        min
    }

    /// Resize the pool's target thread count, clamped to
    /// `[min_threads, max_threads_per_framework]` (spec.md §4.5 / §6
    /// `set_max_threads`). Returns the clamped value actually applied.
    /// Also records the applied value as the new `get_max_threads`
    /// ceiling.
    pub fn set_target(&self, framework: &Arc<FrameworkInner>, requested: u32) -> u32 {
        let floor = self.min_threads.load(Ordering::Acquire).max(1);
        let clamped = requested.clamp(floor, self.hard_cap);
        self.target_threads.store(clamped, Ordering::Release);
        self.max_threads.store(clamped, Ordering::Release);

        loop {
            let current = self.num_threads.load(Ordering::Acquire);
            if current >= clamped {
                break;
            }
            if self
                .num_threads
                .compare_exchange(current, current + 1, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                continue;
            }
            self.peak_threads.fetch_max(current + 1, Ordering::AcqRel);
            self.spawn_one(framework);
        }

        framework.wake_workers();
        clamped
    }

    fn spawn_one(&self, framework: &Arc<FrameworkInner>) {
        let worker_id = self
            .free_worker_ids
            .lock()
            .pop()
            .expect("a free worker id for every slot num_threads was just incremented into");
        let framework = Arc::clone(framework);
        let handle = std::thread::Builder::new()
            .name(format!("theron-worker-{worker_id}"))
            .spawn(move || worker::run(framework, worker_id))
            .expect("failed to spawn worker thread");
        self.handles.lock().push(handle);
    }

    /// Called by a worker right before it would otherwise block for more
    /// work. Returns `true` if it should exit instead: either the
    /// framework is shutting down (every worker exits, decrementing
    /// unconditionally), or `num_threads` currently exceeds
    /// `target_threads`, in which case exactly one of the racing workers
    /// wins the CAS and claims the vacated slot. A worker that exits hands
    /// `worker_id` back to `free_worker_ids` so a later `spawn_one` reuses
    /// it instead of minting a new, unbounded one.
    pub fn should_exit(&self, shutting_down: bool, worker_id: usize) -> bool {
        if shutting_down {
            self.num_threads.fetch_sub(1, Ordering::AcqRel);
            self.free_worker_ids.lock().push(worker_id);
            return true;
        }
        loop {
            let current = self.num_threads.load(Ordering::Acquire);
            let target = self.target_threads.load(Ordering::Acquire);
            if current <= target {
                return false;
            }
            if self
                .num_threads
                .compare_exchange(current, current - 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                self.free_worker_ids.lock().push(worker_id);
                return true;
            }
        }
    }

    /// Drive every worker to exit and join their threads (spec.md §4.9).
    pub fn shutdown(&self, queue: &WorkQueue) {
        self.target_threads.store(0, Ordering::Release);
        queue.wake_all();
        let mut handles = self.handles.lock();
        for handle in handles.drain(..) {
            let _ = handle.join();
        }
    }
}
