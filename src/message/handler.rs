// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::envelope::Envelope;
use crate::framework::inner::FrameworkInner;
use crate::util::Address;

/// External boundary the core consumes for message dispatch (spec.md §3,
/// §1 "deliberately out of scope"): the per-type message tagging and the
/// user-visible actor base type live outside this crate; the core only
/// needs something that can inspect an [`Envelope`]'s type tag and decide
/// whether it recognizes it.
///
/// Implementations typically match on [`Envelope::type_tag`] and call
/// [`Envelope::payload`] for the matching type. Returning `false` tells
/// the dispatch loop no handler matched, triggering the actor's default
/// handler or the framework fallback handler (spec.md §4.7 step 7).
pub trait HandlerTable: Send {
    /// Attempt to handle `envelope`. `ctx` exposes the sending actor's own
    /// address and a way to reply.
    fn handle(&mut self, envelope: &Envelope, ctx: &ActorContext<'_>) -> bool;
}

/// Passed to [`HandlerTable::handle`] and an actor's default handler,
/// giving access to the actor's own address and the ability to send or
/// tail-send replies without reaching back into `Framework` directly.
pub struct ActorContext<'a> {
    framework: &'a FrameworkInner,
    from: Address,
}

impl<'a> ActorContext<'a> {
    pub(crate) fn new(framework: &'a FrameworkInner, from: Address) -> Self {
        Self { framework, from }
    }

    /// The address of the actor currently handling a message.
    pub fn address(&self) -> Address {
        self.from
    }

    /// Send a reply, queuing it onto the shared work-queue tier
    /// (spec.md §6 `send`).
    pub fn send<T: Send + 'static>(&self, to: Address, value: T) -> bool {
        self.framework.send(self.from, to, value)
    }

    /// Send a reply with tail-affinity, preferring the current worker's
    /// local queue slot (spec.md §4.4, §6 `tail_send`) — the common
    /// "handler finishes by replying" pattern.
    pub fn tail_send<T: Send + 'static>(&self, to: Address, value: T) -> bool {
        self.framework.tail_send(self.from, to, value)
    }
}
