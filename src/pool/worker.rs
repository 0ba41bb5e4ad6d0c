//! The dispatch loop (spec.md §4.7) and the thread-local worker context
//! (spec.md §9 design note: "thread-local storage that the worker loop
//! sets on entry and clears on exit") that lets the send path pick the
//! calling thread's own allocator cache and local queue slot when, and
//! only when, the caller is one of this framework's own workers.

// Layer 1: Standard library imports
use std::cell::RefCell;
use std::sync::atomic::Ordering;
use std::sync::Arc;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::alloc::LocalCache;
use crate::directory::Entry;
use crate::framework::inner::FrameworkInner;
use crate::monitoring::event::DropReason;
use crate::monitoring::FrameworkEvent;
use crate::queue::{LocalTier, PushTarget};
use crate::util::Address;

/// Everything a worker thread owns locally: which framework it belongs
/// to (so [`FrameworkInner::send`] can tell "is the calling thread one of
/// *my* workers" apart from a worker of a sibling framework), its id (a
/// [`crate::queue::Counters`] slot), and its allocator cache / queue slot.
pub(crate) struct WorkerContext {
    pub(crate) framework_index: u16,
    pub(crate) worker_id: usize,
    pub(crate) local_cache: LocalCache,
    pub(crate) local_tier: LocalTier,
}

thread_local! {
    pub(crate) static CONTEXT: RefCell<Option<WorkerContext>> = const { RefCell::new(None) };
}

/// A worker thread's body: install the thread-local context, loop
/// popping and dispatching mailbox indices until told to exit, then tear
/// the context down.
pub(crate) fn run(framework: Arc<FrameworkInner>, worker_id: usize) {
    CONTEXT.with(|cell| {
        *cell.borrow_mut() = Some(WorkerContext {
            framework_index: framework.index,
            worker_id,
            local_cache: LocalCache::new(
                framework.params.max_pools,
                framework.params.max_blocks,
                framework.params.cacheline_alignment,
            ),
            local_tier: LocalTier::new(),
        });
    });
    framework.monitor.record(FrameworkEvent::worker_spawned(worker_id));

    loop {
        if framework.pool.should_exit(framework.is_shutting_down(), worker_id) {
            break;
        }

        let popped = CONTEXT.with(|cell| {
            let borrowed = cell.borrow();
            let ctx = borrowed.as_ref().expect("context installed at thread start");
            framework.queue.pop(&ctx.local_tier, &framework.running, worker_id)
        });

        match popped {
            Some(mailbox_index) => dispatch(&framework, mailbox_index, worker_id),
            None => {
                // Woken with `running` false: the shared-tier slot this
                // self-exit would otherwise claim via the CAS loop above
                // was never reserved, since `pop` returning `None` only
                // happens on shutdown. Decrement directly.
                framework.pool.should_exit(true, worker_id);
                break;
            }
        }
    }

    framework.monitor.record(FrameworkEvent::worker_terminated(worker_id));
    CONTEXT.with(|cell| *cell.borrow_mut() = None);
}

fn dispatch(framework: &Arc<FrameworkInner>, mailbox_index: u32, worker_id: usize) {
    let Some(entry) = framework.directory.get(mailbox_index) else {
        return;
    };

    let envelope = match entry.mailbox().pop() {
        Some(envelope) => envelope,
        None => {
            // Scheduled with nothing to do (the message that triggered
            // scheduling was already drained by a prior cycle). Let
            // `finish_dispatch` settle the scheduled bit and GC if due.
            entry.mailbox().finish_dispatch();
            maybe_collect(framework, mailbox_index, entry);
            return;
        }
    };

    let from = Address::local(framework.index, mailbox_index).unwrap_or(Address::NULL);
    framework.monitor.record(FrameworkEvent::message_dispatched(from));

    let handled = entry.with_registration(|registration| match registration {
        Some(registration) => {
            let ctx = framework.actor_context(from);
            if registration.handler_table.handle(&envelope, &ctx) {
                true
            } else if let Some(default_handler) = registration.default_handler.as_ref() {
                default_handler(&envelope, &ctx);
                true
            } else {
                false
            }
        }
        None => false,
    });

    if !handled {
        framework
            .monitor
            .record(FrameworkEvent::message_dropped(from, DropReason::UnhandledMessageType));
        framework.invoke_fallback_unhandled(&envelope);
    }

    framework.queue.counters().record_message_processed(worker_id);

    CONTEXT.with(|cell| {
        let borrowed = cell.borrow();
        let ctx = borrowed.as_ref().expect("context installed at thread start");
        envelope.destroy(&ctx.local_cache);
    });

    if entry.mailbox().finish_dispatch() {
        framework.queue.schedule(mailbox_index, PushTarget::Shared, worker_id);
    } else {
        maybe_collect(framework, mailbox_index, entry);
    }
}

/// Reclaim `entry`'s slot once its mailbox is drained and its reference
/// count has reached zero (spec.md §4.8). Runs on the dispatching worker,
/// right after the cycle that emptied the mailbox — no separate GC thread.
fn maybe_collect(framework: &Arc<FrameworkInner>, mailbox_index: u32, entry: &Entry) {
    if entry.ref_count() != 0 || !entry.is_quiescent() {
        return;
    }
    if entry.take_for_gc().is_some() {
        let address = Address::local(framework.index, mailbox_index).unwrap_or(Address::NULL);
        framework
            .monitor
            .record(FrameworkEvent::actor_garbage_collected(address));
        let _ = framework.directory.release(mailbox_index);
    }
}

/// `true` if the calling thread is currently running as a worker of
/// `framework_index` — used only by tests that need to assert the send
/// path's allocator/tier selection without a live worker thread.
#[cfg(test)]
pub(crate) fn is_worker_of(framework_index: u16) -> bool {
    CONTEXT.with(|cell| {
        cell.borrow()
            .as_ref()
            .is_some_and(|ctx| ctx.framework_index == framework_index)
    })
}
