//! The shared state behind every [`super::Framework`] handle: directory,
//! work queue, allocator caches, fallback handler, monitor, and worker
//! pool. [`super::Framework`] is a thin `Arc<FrameworkInner>` wrapper; this
//! is where spec.md §4.6's send path and §4.9's shutdown sequence live.

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicBool, Ordering};

// Layer 2: Third-party crate imports
use parking_lot::RwLock;

// Layer 3: Internal module imports
use super::config::FrameworkParams;
use super::registry::{self, deliver_foreign, deliver_to_receiver};
use crate::alloc::{BlockAllocator, SharedCache};
use crate::directory::Directory;
use crate::message::{ActorContext, Envelope, FallbackHandler, TypeTag};
use crate::monitoring::{event::DropReason, FrameworkEvent, Monitor};
use crate::pool::{worker, Pool};
use crate::queue::{PushTarget, WorkQueue};
use crate::util::Address;

pub(crate) struct FrameworkInner {
    pub(crate) index: u16,
    pub(crate) params: FrameworkParams,
    pub(crate) directory: Directory,
    pub(crate) queue: WorkQueue,
    pub(crate) shared_cache: SharedCache,
    pub(crate) fallback: RwLock<Option<FallbackHandler>>,
    pub(crate) monitor: Box<dyn Monitor>,
    pub(crate) pool: Pool,
    /// `true` while the framework accepts work; flipped to `false` only
    /// after [`Self::shutdown`] has waited for every actor to drain.
    /// Doubles as the work queue's `running` flag, so a worker blocked in
    /// [`WorkQueue::pop`] wakes immediately once it is cleared.
    pub(crate) running: AtomicBool,
    /// `true` while `register_actor` is accepted; flipped to `false` as
    /// the very first step of [`Self::shutdown`] (spec.md §4.9 step 1),
    /// ahead of `running`, so no new actor can appear while shutdown
    /// waits for the existing ones to be GC'd.
    pub(crate) accepting_registrations: AtomicBool,
}

impl FrameworkInner {
    /// `true` once [`Self::shutdown`] has started tearing the framework
    /// down; new registrations are rejected from this point (spec.md §4.9
    /// step 1).
    pub(crate) fn is_shutting_down(&self) -> bool {
        !self.running.load(Ordering::Acquire)
    }

    /// `true` while `register_actor` should be rejected (spec.md §4.9
    /// step 1 — set before the drain wait, not just at final teardown).
    pub(crate) fn rejects_registrations(&self) -> bool {
        !self.accepting_registrations.load(Ordering::Acquire)
    }

    /// Wake every worker blocked on the shared work-queue tier, so each
    /// re-checks [`Self::is_shutting_down`] or a new `target_threads`
    /// (spec.md §4.5, §4.9).
    pub(crate) fn wake_workers(&self) {
        self.queue.wake_all();
    }

    /// The send path (spec.md §4.6). Resolves `to` to a receiver, a
    /// sibling framework, or a local mailbox, in that order, allocating
    /// the envelope from whichever allocator the calling thread owns
    /// (this framework's worker-local cache if the caller is one of this
    /// framework's own workers, the shared cache otherwise) before the
    /// destination is known — matching spec.md's "allocate, then look up
    /// the destination" ordering.
    pub(crate) fn send<T: Send + 'static>(&self, from: Address, to: Address, value: T) -> bool {
        self.dispatch_send(from, to, value, false)
    }

    /// As [`Self::send`], but prefers the calling worker's local queue
    /// slot for scheduling (spec.md §4.4, §6 `tail_send`).
    pub(crate) fn tail_send<T: Send + 'static>(&self, from: Address, to: Address, value: T) -> bool {
        self.dispatch_send(from, to, value, true)
    }

    fn dispatch_send<T: Send + 'static>(&self, from: Address, to: Address, value: T, tail: bool) -> bool {
        let tag = TypeTag::of::<T>();

        worker::CONTEXT.with(|cell| {
            let borrowed = cell.borrow();
            let (allocator, target, slot): (&dyn BlockAllocator, PushTarget<'_>, usize) =
                match borrowed.as_ref() {
                    Some(ctx) if ctx.framework_index == self.index => {
                        let target = if tail {
                            PushTarget::Local(&ctx.local_tier)
                        } else {
                            PushTarget::Shared
                        };
                        (&ctx.local_cache, target, ctx.worker_id)
                    }
                    _ => (
                        &self.shared_cache as &dyn BlockAllocator,
                        PushTarget::Shared,
                        self.queue.counters().external_slot(),
                    ),
                };

            let envelope = match Envelope::new(allocator, tag, from, value) {
                Ok(envelope) => envelope,
                Err(_) => {
                    self.monitor
                        .record(FrameworkEvent::message_dropped(to, DropReason::AllocationExhausted));
                    return false;
                }
            };
            self.monitor.record(FrameworkEvent::message_enqueued(from, to));

            if to.is_receiver() {
                return match deliver_to_receiver(to.index(), envelope) {
                    Ok(()) => true,
                    Err(envelope) => self.undeliverable(envelope, to, allocator),
                };
            }

            if to.framework() != self.index {
                return match deliver_foreign(to.framework(), to.index(), envelope) {
                    Ok(()) => true,
                    Err(envelope) => self.undeliverable(envelope, to, allocator),
                };
            }

            match self.directory.get(to.index()) {
                Some(entry) if entry.is_registered() => {
                    let was_empty = entry.mailbox().push(envelope);
                    if was_empty && entry.mailbox().mark_scheduled() {
                        self.queue.schedule(to.index(), target, slot);
                    }
                    true
                }
                _ => self.undeliverable(envelope, to, allocator),
            }
        })
    }

    fn undeliverable(&self, envelope: Envelope, to: Address, allocator: &dyn BlockAllocator) -> bool {
        let sender = envelope.sender();
        envelope.destroy(allocator);
        self.monitor
            .record(FrameworkEvent::message_dropped(to, DropReason::UnknownDestination));
        self.invoke_fallback_undeliverable(sender);
        false
    }

    /// Push a pre-built `envelope` directly into the mailbox at
    /// `mailbox_index`, bypassing allocator selection and destination
    /// classification (used only by [`registry::deliver_foreign`] to land
    /// an envelope forwarded from a sibling framework). Always schedules
    /// onto the shared tier: the originating thread's local-tier context,
    /// if any, belongs to a different framework and has no bearing here.
    pub(crate) fn deliver_local_raw(&self, mailbox_index: u32, envelope: Envelope) -> Result<(), Envelope> {
        match self.directory.get(mailbox_index) {
            Some(entry) if entry.is_registered() => {
                let was_empty = entry.mailbox().push(envelope);
                if was_empty && entry.mailbox().mark_scheduled() {
                    self.queue
                        .schedule(mailbox_index, PushTarget::Shared, self.queue.counters().external_slot());
                }
                Ok(())
            }
            _ => Err(envelope),
        }
    }

    /// Build an [`ActorContext`] for the actor at `from`, used by the
    /// dispatch loop to hand handlers a way to reply.
    pub(crate) fn actor_context(&self, from: Address) -> ActorContext<'_> {
        ActorContext::new(self, from)
    }

    pub(crate) fn invoke_fallback_undeliverable(&self, sender: Address) {
        self.monitor.record(FrameworkEvent::fallback_invoked(sender));
        if let Some(handler) = self.fallback.read().as_ref() {
            handler.invoke_undeliverable(sender);
        }
    }

    pub(crate) fn invoke_fallback_unhandled(&self, envelope: &Envelope) {
        self.monitor.record(FrameworkEvent::fallback_invoked(envelope.sender()));
        if let Some(handler) = self.fallback.read().as_ref() {
            handler.invoke_unhandled(envelope);
        }
    }

    /// Shutdown sequence (spec.md §4.9): stop accepting registrations,
    /// wait for every already-registered actor to be released and GC'd,
    /// then stop and join every worker. Idempotent — only the caller that
    /// wins the `accepting_registrations` swap drives the sequence.
    pub(crate) fn shutdown(&self) {
        let was_accepting = self.accepting_registrations.swap(false, Ordering::AcqRel);
        if !was_accepting {
            return;
        }

        while !self.directory.is_drained() {
            std::thread::sleep(std::time::Duration::from_micros(100));
        }

        self.running.store(false, Ordering::Release);
        self.pool.shutdown(&self.queue);
        registry::unregister_framework(self.index);
    }
}
