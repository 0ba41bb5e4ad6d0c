//! Directory entry: the union of a [`Mailbox`] with the actor-registration
//! and reference-counting fields the directory and GC protocol need
//! (spec.md §3 "Actor registration entry", §4.8).

// Layer 1: Standard library imports
use std::sync::atomic::{fence, AtomicI64, AtomicU32, Ordering};

// Layer 2: Third-party crate imports
use parking_lot::RwLock;

// Layer 3: Internal module imports
use crate::mailbox::Mailbox;
use crate::message::{ActorContext, Envelope, HandlerTable};

/// Everything registered against a mailbox index: its handler table, an
/// optional default handler for unmatched type tags, and an optional name
/// kept for diagnostics (spec.md §2 of `SPEC_FULL.md`, named registration
/// for `Display`/logging only — not a lookup key).
pub struct ActorRegistration {
    pub handler_table: Box<dyn HandlerTable>,
    pub default_handler: Option<Box<dyn Fn(&Envelope, &ActorContext<'_>) + Send + Sync>>,
    pub name: Option<String>,
}

/// A directory slot: one [`Mailbox`] plus the pin count and epoch the
/// directory uses for safe index reuse, plus the actor registration and
/// ref count the GC protocol observes (spec.md §4.8).
///
/// `ref_count` follows spec.md's documented memory ordering: relaxed on
/// increment (no prior writes need to be visible — acquiring a new
/// reference to something already reachable), release on decrement (so a
/// decrement to zero happens-after every access the dropping holder made),
/// acquire-fenced on the zero observation (so the thread that schedules
/// final processing sees every write made by every other holder before
/// their decrement).
pub struct Entry {
    mailbox: Mailbox,
    registration: RwLock<Option<ActorRegistration>>,
    ref_count: AtomicI64,
    pin_count: AtomicU32,
    epoch: AtomicU32,
}

impl Entry {
    /// A fresh, unregistered, unreferenced entry.
    pub fn new() -> Self {
        Self {
            mailbox: Mailbox::new(),
            registration: RwLock::new(None),
            ref_count: AtomicI64::new(0),
            pin_count: AtomicU32::new(0),
            epoch: AtomicU32::new(0),
        }
    }

    /// The entry's mailbox.
    pub fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    /// Current directory epoch, bumped every time the slot is recycled —
    /// lets holders of a stale index detect that their entry was
    /// reassigned to a different actor.
    pub fn epoch(&self) -> u32 {
        self.epoch.load(Ordering::Acquire)
    }

    /// Install a fresh registration with an initial reference count of 1
    /// (the handle returned to the caller of `register_actor`).
    pub fn install(&self, registration: ActorRegistration) {
        *self.registration.write() = Some(registration);
        self.ref_count.store(1, Ordering::Release);
    }

    /// `true` if an actor is currently registered in this slot.
    pub fn is_registered(&self) -> bool {
        self.registration.read().is_some()
    }

    /// Run `f` with the registration, if present, and a context carrying
    /// `from` as the handling actor's own address.
    pub fn with_registration<R>(
        &self,
        f: impl FnOnce(Option<&mut ActorRegistration>) -> R,
    ) -> R {
        let mut guard = self.registration.write();
        f(guard.as_mut())
    }

    /// The registered actor's display name, if one was given at
    /// registration.
    pub fn name(&self) -> Option<String> {
        self.registration
            .read()
            .as_ref()
            .and_then(|r| r.name.clone())
    }

    /// Current reference count.
    pub fn ref_count(&self) -> i64 {
        self.ref_count.load(Ordering::Acquire)
    }

    /// Increment the reference count (relaxed: acquiring a new reference
    /// to something already known reachable needs no ordering against
    /// other threads).
    pub fn increment_ref(&self) {
        self.ref_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Decrement the reference count. Returns `true` if this decrement
    /// observed the count reach zero — the caller must then schedule the
    /// mailbox one final time so the dispatcher runs GC (spec.md §4.8).
    pub fn decrement_ref(&self) -> bool {
        let previous = self.ref_count.fetch_sub(1, Ordering::Release);
        if previous == 1 {
            fence(Ordering::Acquire);
            true
        } else {
            false
        }
    }

    /// Increment the pin count, preventing [`super::Directory::release`]
    /// from completing until a matching [`Self::unpin`].
    pub fn pin(&self) {
        self.pin_count.fetch_add(1, Ordering::AcqRel);
    }

    /// Decrement the pin count.
    pub fn unpin(&self) {
        self.pin_count.fetch_sub(1, Ordering::AcqRel);
    }

    /// `true` once the pin count has returned to zero.
    pub fn is_quiescent(&self) -> bool {
        self.pin_count.load(Ordering::Acquire) == 0
    }

    /// Remove and return the registration (dropping its handler table),
    /// reset counters, and bump the epoch so a stale holder of the old
    /// index can detect reuse. Called by the dispatcher once it has
    /// observed `ref_count == 0` and the mailbox drained (spec.md §4.8).
    pub fn take_for_gc(&self) -> Option<ActorRegistration> {
        let registration = self.registration.write().take();
        self.epoch.fetch_add(1, Ordering::AcqRel);
        registration
    }
}

impl Default for Entry {
    fn default() -> Self {
        Self::new()
    }
}
