//! The public façade (spec.md §4.9, §6): owns the allocator, directory,
//! queue, pool, and fallback handler; exposes `register_actor`,
//! `deregister_actor`, `send`/`tail_send`, counters, and thread-count
//! controls. Mirrors the teacher's `System`/`SystemConfig` split — a thin
//! `Arc`-wrapped handle (cheap to clone, shareable across threads) in
//! front of the actual state in [`inner::FrameworkInner`].

pub mod config;
pub mod errors;
pub(crate) mod inner;
pub mod registry;

pub use config::{ConfigError, FrameworkBuilder, FrameworkParams};
pub use errors::FrameworkError;
pub use registry::Receiver;

// Layer 1: Standard library imports
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use parking_lot::RwLock;

// Layer 3: Internal module imports
use crate::alloc::SharedCache;
use crate::directory::{ActorRegistration, Directory};
use crate::message::{ActorContext, Envelope, FallbackHandler, HandlerTable};
use crate::monitoring::{FrameworkEvent, Monitor, NoopMonitor};
use crate::pool::Pool;
use crate::queue::{Counter, PushTarget, WorkQueue};
use crate::util::Address;
use inner::FrameworkInner;

/// A reference-counted handle to a registered actor's directory slot
/// (spec.md §6 `register_actor`'s `directory_handle`).
///
/// Cloning increments the entry's `ref_count`; dropping decrements it and,
/// on the decrement that reaches zero, schedules the actor's mailbox one
/// final time so the dispatch loop observes the zero count and runs GC
/// (spec.md §4.8's "external holders increment before sharing and
/// decrement on drop").
pub struct ActorHandle {
    inner: Arc<FrameworkInner>,
    index: u32,
}

impl ActorHandle {
    /// The address this handle's actor is reachable at.
    pub fn address(&self) -> Address {
        Address::local(self.inner.index, self.index).unwrap_or(Address::NULL)
    }
}

impl Clone for ActorHandle {
    fn clone(&self) -> Self {
        if let Some(entry) = self.inner.directory.get(self.index) {
            entry.increment_ref();
        }
        Self {
            inner: Arc::clone(&self.inner),
            index: self.index,
        }
    }
}

impl Drop for ActorHandle {
    fn drop(&mut self) {
        let Some(entry) = self.inner.directory.get(self.index) else {
            return;
        };
        if entry.decrement_ref() && entry.mailbox().mark_scheduled() {
            self.inner.queue.schedule(
                self.index,
                PushTarget::Shared,
                self.inner.queue.counters().external_slot(),
            );
        }
    }
}

/// A running actor framework: one allocator, directory, work queue, and
/// worker pool.
pub struct Framework(Arc<FrameworkInner>);

impl Framework {
    /// Start a framework with `params`, discarding monitor events
    /// (spec.md §6). See [`Self::with_monitor`] to wire up observability.
    pub fn new(params: FrameworkParams) -> Result<Self, FrameworkError> {
        Self::with_monitor(params, Box::new(NoopMonitor))
    }

    /// Start a framework with `params`, recording runtime events to
    /// `monitor` (`SPEC_FULL.md` §1.2).
    pub fn with_monitor(params: FrameworkParams, monitor: Box<dyn Monitor>) -> Result<Self, FrameworkError> {
        let index = registry::allocate_framework_index().ok_or(FrameworkError::FrameworkIndexExhausted)?;

        let directory = Directory::new(params.max_actors);
        let queue = WorkQueue::new(params.max_threads_per_framework as usize);
        let shared_cache = SharedCache::new(params.max_pools, params.max_blocks, params.cacheline_alignment);
        let pool = Pool::new(params.max_threads_per_framework);
        let initial_thread_count = params.initial_thread_count;

        let inner = Arc::new(FrameworkInner {
            index,
            params,
            directory,
            queue,
            shared_cache,
            fallback: RwLock::new(None),
            monitor,
            pool,
            running: AtomicBool::new(true),
            accepting_registrations: AtomicBool::new(true),
        });

        registry::register_framework(index, &inner);
        registry::raise_receiver_capacity(inner.params.max_receivers);
        inner.pool.start(&inner, initial_thread_count);

        Ok(Framework(inner))
    }

    /// Register a handler table (and optional default handler and
    /// diagnostic name) at a fresh directory slot (spec.md §6
    /// `register_actor`).
    ///
    /// # Errors
    ///
    /// [`FrameworkError::ShuttingDown`] once shutdown has begun;
    /// [`FrameworkError::RegistrationExhausted`] once the directory's
    /// index space is full — per spec.md §7, the caller must not proceed
    /// on this error.
    pub fn register_actor(
        &self,
        handler_table: Box<dyn HandlerTable>,
        default_handler: Option<Box<dyn Fn(&Envelope, &ActorContext<'_>) + Send + Sync>>,
        name: Option<String>,
    ) -> Result<(Address, ActorHandle), FrameworkError> {
        if self.0.rejects_registrations() {
            return Err(FrameworkError::ShuttingDown);
        }

        let index = self
            .0
            .directory
            .reserve()
            .map_err(FrameworkError::RegistrationExhausted)?;
        let entry = self.0.directory.get(index).expect("entry just reserved");
        entry.install(ActorRegistration {
            handler_table,
            default_handler,
            name: name.clone(),
        });

        let address = Address::local(self.0.index, index).unwrap_or(Address::NULL);
        self.0.monitor.record(FrameworkEvent::actor_registered(address, name));

        Ok((
            address,
            ActorHandle {
                inner: Arc::clone(&self.0),
                index,
            },
        ))
    }

    /// Tear down an actor's registration and release its directory slot
    /// (spec.md §6 `deregister_actor`). Normally called by the dispatch
    /// loop's GC path; exposed here as a synchronous test hook.
    ///
    /// Consumes `handle` without running its `Drop` decrement: the
    /// teardown below already accounts for (and requires) the reference
    /// this handle represented.
    ///
    /// # Errors
    ///
    /// [`FrameworkError::NotQuiescent`] if the entry still has a nonzero
    /// reference count or a pending pin (spec.md §6: "only valid when
    /// ref_count is zero").
    pub fn deregister_actor(&self, handle: ActorHandle) -> Result<(), FrameworkError> {
        let address = handle.address();
        let entry = self
            .0
            .directory
            .get(handle.index)
            .ok_or(FrameworkError::NotQuiescent(address))?;

        if entry.ref_count() != 0 || !entry.is_quiescent() {
            return Err(FrameworkError::NotQuiescent(address));
        }

        entry.take_for_gc();
        self.0
            .directory
            .release(handle.index)
            .map_err(FrameworkError::RegistrationExhausted)?;
        self.0.monitor.record(FrameworkEvent::actor_garbage_collected(address));

        std::mem::forget(handle);
        Ok(())
    }

    /// Send `value` to `to`, attributing it to `from`. Returns `true` if
    /// it reached a mailbox or receiver — *not* whether a handler matched
    /// it (spec.md §6 `send`).
    pub fn send<T: Send + 'static>(&self, from: Address, to: Address, value: T) -> bool {
        self.0.send(from, to, value)
    }

    /// As [`Self::send`], but prefers the calling worker's own local
    /// queue slot when scheduling the destination mailbox (spec.md §6
    /// `tail_send`).
    pub fn tail_send<T: Send + 'static>(&self, from: Address, to: Address, value: T) -> bool {
        self.0.tail_send(from, to, value)
    }

    /// Read a counter's current value (spec.md §6 `get_counter`).
    pub fn get_counter(&self, counter: Counter) -> u32 {
        self.0.queue.counters().get(counter)
    }

    /// Zero every counter (spec.md §6 `reset_counters`).
    pub fn reset_counters(&self) {
        self.0.queue.counters().reset();
    }

    /// Raise the worker-count floor, spawning immediately if the current
    /// target sits below it. Never decreases (spec.md §4.5
    /// `set_min_threads`).
    pub fn set_min_threads(&self, n: u32) -> u32 {
        self.0.pool.set_min_threads(&self.0, n)
    }

    /// Resize the worker-count target, clamped to `[min_threads,
    /// max_threads_per_framework]` (spec.md §4.5 `set_max_threads`).
    pub fn set_max_threads(&self, n: u32) -> u32 {
        self.0.pool.set_target(&self.0, n)
    }

    pub fn get_num_threads(&self) -> u32 {
        self.0.pool.get_num_threads()
    }

    pub fn get_peak_threads(&self) -> u32 {
        self.0.pool.get_peak_threads()
    }

    pub fn get_min_threads(&self) -> u32 {
        self.0.pool.get_min_threads()
    }

    pub fn get_max_threads(&self) -> u32 {
        self.0.pool.get_max_threads()
    }

    /// Replace the per-framework fallback handler, invoked for
    /// undeliverable or unhandled messages (spec.md §6). Synchronized by
    /// a `parking_lot::RwLock`, closing the race the source left open
    /// (spec.md §9 Open Questions).
    pub fn set_fallback_handler(&self, handler: Option<FallbackHandler>) {
        *self.0.fallback.write() = handler;
    }

    /// Register a receiver at `index` in the process-wide receiver table
    /// (spec.md §3: receivers live in framework slot 0, independent of
    /// any single `Framework` instance).
    ///
    /// # Errors
    ///
    /// [`FrameworkError::ReceiverTableExhausted`] once the table holds
    /// `max_receivers` entries (spec.md §6 `MAX_RECEIVERS`, raised to at
    /// least every live framework's configured value).
    pub fn register_receiver(index: u32, receiver: Arc<dyn Receiver>) -> Result<(), FrameworkError> {
        registry::register_receiver(index, receiver)
    }

    /// Remove a previously registered receiver.
    pub fn deregister_receiver(index: u32) {
        registry::deregister_receiver(index);
    }

    /// Begin the shutdown sequence (spec.md §4.9): block new
    /// registrations, wait for every registered actor to be released and
    /// GC'd, then stop and join every worker thread. Idempotent.
    pub fn shutdown(&self) {
        self.0.shutdown();
    }
}

impl Drop for Framework {
    fn drop(&mut self) {
        if Arc::strong_count(&self.0) == 1 {
            self.0.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::TypeTag;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Echo(Arc<AtomicU32>);
    impl HandlerTable for Echo {
        fn handle(&mut self, envelope: &Envelope, _ctx: &ActorContext<'_>) -> bool {
            if envelope.type_tag() == TypeTag::of::<u32>() {
                self.0.store(unsafe { *envelope.payload::<u32>() }, Ordering::SeqCst);
                true
            } else {
                false
            }
        }
    }

    #[test]
    fn register_send_and_observe_handler_runs() {
        let framework = Framework::new(FrameworkParams::builder().build().unwrap()).unwrap();
        let seen = Arc::new(AtomicU32::new(0));
        let (address, handle) = framework
            .register_actor(Box::new(Echo(Arc::clone(&seen))), None, Some("echo".into()))
            .unwrap();

        assert!(framework.send(Address::NULL, address, 7u32));

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(2);
        while seen.load(Ordering::SeqCst) == 0 && std::time::Instant::now() < deadline {
            std::thread::yield_now();
        }
        assert_eq!(seen.load(Ordering::SeqCst), 7);
        drop(handle);
    }

    #[test]
    fn send_to_unknown_address_returns_false() {
        let framework = Framework::new(FrameworkParams::builder().build().unwrap()).unwrap();
        let bogus = Address::local(framework.0.index, 999_999).unwrap();
        assert!(!framework.send(Address::NULL, bogus, 1u32));
    }

    #[test]
    fn thread_count_controls_respect_bounds() {
        let framework = Framework::new(
            FrameworkParams::builder()
                .initial_thread_count(1)
                .max_threads_per_framework(4)
                .build()
                .unwrap(),
        )
        .unwrap();

        assert_eq!(framework.get_min_threads(), 1);
        let applied = framework.set_min_threads(3);
        assert_eq!(applied, 3);

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(2);
        while framework.get_num_threads() < 3 && std::time::Instant::now() < deadline {
            std::thread::yield_now();
        }
        assert_eq!(framework.get_num_threads(), 3);
        assert!(framework.get_peak_threads() >= 3);

        let applied_max = framework.set_max_threads(100);
        assert_eq!(applied_max, 4);
        assert_eq!(framework.get_max_threads(), 4);

        let applied_max = framework.set_max_threads(2);
        assert_eq!(applied_max, 3);
        assert_eq!(framework.get_max_threads(), 3);
    }

    #[test]
    fn deregister_requires_quiescence() {
        let framework = Framework::new(FrameworkParams::builder().build().unwrap()).unwrap();
        let (_, handle) = framework
            .register_actor(Box::new(Echo(Arc::new(AtomicU32::new(0)))), None, None)
            .unwrap();

        assert!(matches!(
            framework.deregister_actor(handle.clone()),
            Err(FrameworkError::NotQuiescent(_))
        ));
        drop(handle);
    }
}
